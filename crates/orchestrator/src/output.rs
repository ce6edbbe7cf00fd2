//! Saved itinerary documents.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use itinera_common::{Result, TripPreferences};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File-name token for a destination: alphanumeric runs joined with `_`.
///
/// "Tokyo, Japan" becomes "Tokyo_Japan"; no destination becomes "trip".
pub fn destination_token(destination: Option<&str>) -> String {
    let token = destination
        .unwrap_or_default()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if token.is_empty() {
        "trip".to_string()
    } else {
        token
    }
}

/// `<token>_<YYYYMMDD_HHMMSS>.md`
pub fn plan_file_name(destination: Option<&str>, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.md",
        destination_token(destination),
        at.format(TIMESTAMP_FORMAT)
    )
}

/// A finished itinerary: the preferences header followed by the final text.
#[derive(Debug, Clone)]
pub struct ItineraryDocument {
    header: Vec<(&'static str, String)>,
    destination: Option<String>,
    body: String,
}

impl ItineraryDocument {
    pub fn new(prefs: &TripPreferences, body: impl Into<String>) -> Self {
        Self {
            header: prefs.header_entries(),
            destination: prefs.destination().map(str::to_string),
            body: body.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn header(&self) -> &[(&'static str, String)] {
        &self.header
    }

    /// Markdown with the preferences as `key: value` lines between `---` fences.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        for (key, value) in &self.header {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str("---\n\n");
        out.push_str(self.body.trim_end());
        out.push('\n');
        out
    }

    pub fn file_name(&self, at: NaiveDateTime) -> String {
        plan_file_name(self.destination.as_deref(), at)
    }

    /// Write under `dir` (created if absent) and return the full path.
    pub fn save(&self, dir: &Path, at: NaiveDateTime) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(at));
        std::fs::write(&path, self.render())?;
        info!(path = %path.display(), bytes = self.body.len(), "Itinerary saved");
        Ok(path)
    }
}
