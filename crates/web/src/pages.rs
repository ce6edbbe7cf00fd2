//! Server-rendered HTML pages.

use chrono::{Duration, NaiveDate};
use itinera_common::{AccommodationPreference, BudgetTier, TaskResult, TransportationPreference};

use crate::form::{DEFAULT_INTERESTS, INTEREST_OPTIONS, MAX_TRAVELERS};
use crate::jobs::{Job, StageState};

/// Seconds between reloads of a running job's progress page.
pub const PROGRESS_REFRESH_SECS: u32 = 3;

pub const MISSING_KEY_MESSAGE: &str = "Please enter your OpenAI API key";

/// Shown after any planning failure.
pub const TROUBLESHOOTING_TIPS: [&str; 3] = [
    "Check your API key and internet connection",
    "Try again with different preferences",
    "If the problem persists, try again later",
];

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
h1 { color: #1e6091; }
fieldset { border: 1px solid #cbd2d9; border-radius: 6px; margin-bottom: 1rem; }
label { display: block; margin: 0.5rem 0 0.2rem; font-weight: 600; }
input, select, textarea { width: 100%; padding: 0.4rem; box-sizing: border-box; }
.checks label { display: inline-block; font-weight: normal; margin-right: 1rem; }
.checks input { width: auto; }
button { background: #1e6091; color: white; border: none; padding: 0.7rem 1.4rem; border-radius: 6px; cursor: pointer; }
.itinerary { white-space: pre-wrap; background: #f5f7fa; padding: 1rem; border-radius: 6px; }
.error { background: #fde8e8; border-left: 4px solid #e02424; padding: 1rem; }
.note { color: #52606d; font-size: 0.9rem; }
.stages li { margin: 0.3rem 0; }
.running { font-weight: 600; color: #1e6091; }
.pending { color: #9aa5b1; }
"#;

/// Escape text for use in element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    layout_with_head(title, "", body)
}

fn layout_with_head(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n{head}\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

fn select(name: &str, options: &[&str], selected: &str) -> String {
    let options: String = options
        .iter()
        .map(|label| {
            let marker = if *label == selected { " selected" } else { "" };
            let label = escape_html(label);
            format!("<option value=\"{label}\"{marker}>{label}</option>")
        })
        .collect();
    format!("<select id=\"{name}\" name=\"{name}\">{options}</select>")
}

/// The preferences form. Dates default to a week-long trip a month out.
pub fn index_page(today: NaiveDate, server_has_key: bool) -> String {
    let start = today + Duration::days(30);
    let end = start + Duration::days(7);

    let budgets: Vec<&str> = BudgetTier::ALL.iter().map(|b| b.label()).collect();
    let stays: Vec<&str> = AccommodationPreference::ALL.iter().map(|a| a.label()).collect();
    let transport: Vec<&str> = TransportationPreference::ALL
        .iter()
        .map(|t| t.label())
        .collect();

    let interests: String = INTEREST_OPTIONS
        .iter()
        .map(|interest| {
            let checked = if DEFAULT_INTERESTS.contains(interest) {
                " checked"
            } else {
                ""
            };
            format!(
                "<label><input type=\"checkbox\" name=\"interests\" value=\"{interest}\"{checked}> {interest}</label>"
            )
        })
        .collect();

    let key_note = if server_has_key {
        "<p class=\"note\">A server key is configured; leave blank to use it.</p>"
    } else {
        ""
    };

    let body = format!(
        r#"<h1>AI Travel Planner</h1>
<p>Tell us about your trip and a team of planning agents will research and assemble a day-by-day itinerary.</p>
<form method="post" action="/plan">
<fieldset><legend>API keys</legend>
<label for="openai_api_key">OpenAI API key</label>
<input type="password" id="openai_api_key" name="openai_api_key" autocomplete="off">
{key_note}
<label for="exa_api_key">Exa API key (optional)</label>
<input type="password" id="exa_api_key" name="exa_api_key" autocomplete="off">
<p class="note">Without an Exa key the planner searches DuckDuckGo.</p>
</fieldset>
<fieldset><legend>Trip</legend>
<label for="destination">Destination</label>
<input type="text" id="destination" name="destination" placeholder="e.g. Tokyo, Japan (leave blank for recommendations)">
<label for="start_date">Start date</label>
<input type="date" id="start_date" name="start_date" value="{start}" required>
<label for="end_date">End date</label>
<input type="date" id="end_date" name="end_date" value="{end}" required>
<label for="travelers">Travelers</label>
<input type="number" id="travelers" name="travelers" min="1" max="{MAX_TRAVELERS}" value="2">
<label for="budget">Budget</label>
{budget}
</fieldset>
<fieldset><legend>Preferences</legend>
<label>Interests</label>
<div class="checks">{interests}</div>
<label for="accommodation">Accommodation</label>
{accommodation}
<label for="transportation">Transportation</label>
{transportation}
<label for="notes">Additional notes</label>
<textarea id="notes" name="notes" rows="3"></textarea>
</fieldset>
<button type="submit">Plan my trip</button>
<p class="note">Planning runs five research stages and can take a few minutes.</p>
</form>"#,
        start = start.format("%Y-%m-%d"),
        end = end.format("%Y-%m-%d"),
        budget = select("budget", &budgets, BudgetTier::default().label()),
        accommodation = select(
            "accommodation",
            &stays,
            AccommodationPreference::default().label()
        ),
        transportation = select(
            "transportation",
            &transport,
            TransportationPreference::default().label()
        ),
    );

    layout("AI Travel Planner", &body)
}

/// Completed itinerary with a stage summary and download link.
pub fn result_page(itinerary: &str, file_name: Option<&str>, stages: &[TaskResult]) -> String {
    let download = file_name
        .map(|name| {
            format!(
                "<p><a href=\"/plans/{0}\" download>Download itinerary ({0})</a></p>",
                escape_html(name)
            )
        })
        .unwrap_or_default();

    let stage_items: String = stages
        .iter()
        .map(|result| {
            format!(
                "<li>{} by {} ({:.1}s)</li>",
                result.stage.title(),
                escape_html(&result.agent_name),
                result.duration_ms as f64 / 1000.0
            )
        })
        .collect();

    let body = format!(
        "<h1>Your Travel Itinerary</h1>\n{download}\n<div class=\"itinerary\">{}</div>\n\
         <h2>Planning stages</h2>\n<ol>{stage_items}</ol>\n<p><a href=\"/\">Plan another trip</a></p>",
        escape_html(itinerary)
    );
    layout("Your Travel Itinerary", &body)
}

/// Stage list for a job that is still running. Reloads itself until done.
pub fn progress_page(job: &Job) -> String {
    let stage_items: String = job
        .stages
        .iter()
        .map(|status| {
            let agent = status.agent.as_deref().map(escape_html).unwrap_or_default();
            match status.state {
                StageState::Pending => {
                    format!("<li class=\"pending\">{}: waiting</li>", status.title)
                }
                StageState::Running => format!(
                    "<li class=\"running\">{}: in progress ({agent} is working)</li>",
                    status.title
                ),
                StageState::Completed => format!(
                    "<li>{}: done by {agent} ({:.1}s)</li>",
                    status.title,
                    status.duration_ms.unwrap_or_default() as f64 / 1000.0
                ),
            }
        })
        .collect();

    let destination = job
        .destination
        .as_deref()
        .map(|d| format!(" for {}", escape_html(d)))
        .unwrap_or_default();
    let head = format!("<meta http-equiv=\"refresh\" content=\"{PROGRESS_REFRESH_SECS}\">\n");
    let body = format!(
        "<h1>Planning your trip{destination}</h1>\n\
         <p class=\"note\">This page refreshes every {PROGRESS_REFRESH_SECS} seconds until the itinerary is ready.</p>\n\
         <ol class=\"stages\">{stage_items}</ol>"
    );
    layout_with_head("Planning in progress", &head, &body)
}

/// Failure page: what went wrong plus the fixed troubleshooting tips.
pub fn error_page(message: &str) -> String {
    let tips: String = TROUBLESHOOTING_TIPS
        .iter()
        .map(|tip| format!("<li>{tip}</li>"))
        .collect();
    let body = format!(
        "<h1>Something went wrong</h1>\n<div class=\"error\"><p>An error occurred: {}</p></div>\n\
         <h2>Troubleshooting</h2>\n<ul>{tips}</ul>\n<p><a href=\"/\">Back to the planner</a></p>",
        escape_html(message)
    );
    layout("Planning failed", &body)
}
