//! Instruction templates for the five planning stages.

use itinera_common::{StageId, TaskSpec, TripPreferences};

use crate::roles::{
    ACCOMMODATION_SPECIALIST, ACTIVITIES_PLANNER, DESTINATION_RESEARCHER, ITINERARY_COMPILER,
    TRANSPORTATION_COORDINATOR,
};

/// Number of candidates requested when no destination was given.
pub const CANDIDATE_DESTINATIONS: usize = 3;

/// Build the ordered task chain for `prefs`.
pub fn build_tasks(prefs: &TripPreferences) -> Vec<TaskSpec> {
    vec![
        destination_research(prefs),
        accommodation_search(prefs),
        activities_planning(prefs),
        transportation_planning(prefs),
        itinerary_compilation(prefs),
    ]
}

fn dates(prefs: &TripPreferences) -> (String, String) {
    (
        prefs.start_date().format("%Y-%m-%d").to_string(),
        prefs.end_date().format("%Y-%m-%d").to_string(),
    )
}

fn location(prefs: &TripPreferences) -> &str {
    prefs
        .destination()
        .unwrap_or("To be determined based on destination research")
}

fn destination_research(prefs: &TripPreferences) -> TaskSpec {
    let (start, end) = dates(prefs);
    let (subject, scope) = match prefs.destination() {
        Some(destination) => (destination.to_string(), "For the destination".to_string()),
        None => (
            "potential travel destinations".to_string(),
            format!(
                "No specific destination was provided: recommend exactly {CANDIDATE_DESTINATIONS} suitable destinations that match the criteria.\nFor each destination"
            ),
        ),
    };

    let description = format!(
        "Research {subject} based on the following criteria:
- Travel dates: {start} to {end} ({days} days)
- Budget: {budget}
- Interests: {interests}
- Number of travelers: {travelers}

{scope}, provide:
1. Overview of the destination
2. Best time to visit and current weather/seasonal considerations
3. Cultural highlights and unique aspects
4. Safety information and travel advisories
5. Estimated overall costs
6. Visa requirements if applicable

Your research should be thorough and up-to-date.",
        days = prefs.trip_days(),
        budget = prefs.budget_prompt(),
        interests = prefs.interests_prompt(),
        travelers = prefs.travelers_prompt(),
    );

    let expected = if prefs.destination().is_some() {
        "A comprehensive report on the destination with all requested information.".to_string()
    } else {
        format!(
            "A comprehensive report on {CANDIDATE_DESTINATIONS} candidate destinations with all requested information."
        )
    };

    TaskSpec::new(
        StageId::DestinationResearch,
        DESTINATION_RESEARCHER.key,
        description,
    )
    .with_expected_output(expected)
}

fn accommodation_search(prefs: &TripPreferences) -> TaskSpec {
    let (start, end) = dates(prefs);
    let description = format!(
        "Based on the destination research, find the best accommodation options that match these criteria:
- Location: {location}
- Check-in date: {start}
- Check-out date: {end}
- Budget: {budget}
- Preferences: {accommodation}
- Number of travelers: {travelers}

For each recommended accommodation, provide:
1. Name, type (hotel, hostel, apartment, etc.), and location
2. Price range and value assessment
3. Amenities and features
4. Proximity to attractions/city center
5. Guest ratings and reviews summary
6. Any special considerations (e.g., accessibility, family-friendliness)

Recommend at least 3 options at different price points when possible.",
        location = location(prefs),
        budget = prefs.budget_prompt(),
        accommodation = prefs.accommodation_prompt(),
        travelers = prefs.travelers_prompt(),
    );

    TaskSpec::new(
        StageId::AccommodationSearch,
        ACCOMMODATION_SPECIALIST.key,
        description,
    )
    .with_expected_output("A detailed list of accommodation options with all requested information.")
    .depends_on(&[StageId::DestinationResearch])
}

fn activities_planning(prefs: &TripPreferences) -> TaskSpec {
    let (start, end) = dates(prefs);
    let description = format!(
        "Based on the destination research, create a comprehensive list of activities and attractions that match these criteria:
- Location: {location}
- Travel dates: {start} to {end}
- Interests: {interests}
- Budget considerations: {budget}
- Number of travelers: {travelers}

For each recommended activity or attraction, provide:
1. Name and type of activity/attraction
2. Location and how to get there
3. Recommended duration
4. Cost (entry fees, guided tours, etc.)
5. Booking requirements (advance tickets, reservations)
6. Best time to visit (time of day, day of week)
7. Insider tips or special considerations

Include a mix of popular attractions and hidden gems. Consider seasonal events or festivals happening during the travel dates.",
        location = location(prefs),
        interests = prefs.interests_prompt(),
        budget = prefs.budget_prompt(),
        travelers = prefs.travelers_prompt(),
    );

    TaskSpec::new(StageId::ActivitiesPlanning, ACTIVITIES_PLANNER.key, description)
        .with_expected_output(
            "A comprehensive list of activities and attractions with all requested information.",
        )
        .depends_on(&[StageId::DestinationResearch])
}

fn transportation_planning(prefs: &TripPreferences) -> TaskSpec {
    let (start, end) = dates(prefs);
    let description = format!(
        "Based on the destination research, plan the most efficient transportation options for this trip:
- Origin to destination transportation (if needed)
- Local transportation within the destination
- Transportation between accommodations and activities

Consider these factors:
- Travel dates: {start} to {end}
- Budget: {budget}
- Preferences: {transportation}
- Number of travelers: {travelers}

For each transportation recommendation, provide:
1. Type of transportation (flight, train, bus, rental car, etc.)
2. Estimated costs
3. Booking information and tips
4. Schedules and duration
5. Convenience and comfort assessment
6. Any special considerations (e.g., accessibility, luggage restrictions)

Include both transportation to/from the destination and local transportation options.",
        budget = prefs.budget_prompt(),
        transportation = prefs.transportation_prompt(),
        travelers = prefs.travelers_prompt(),
    );

    TaskSpec::new(
        StageId::TransportationPlanning,
        TRANSPORTATION_COORDINATOR.key,
        description,
    )
    .with_expected_output("A detailed transportation plan with all requested information.")
    .depends_on(&[StageId::DestinationResearch, StageId::ActivitiesPlanning])
}

fn itinerary_compilation(prefs: &TripPreferences) -> TaskSpec {
    let (start, end) = dates(prefs);
    let description = format!(
        "Compile all the research and recommendations into a comprehensive day-by-day travel itinerary:
- Travel dates: {start} to {end} ({days} days)
- Destination: {destination}

The itinerary should include:
1. A brief overview of the trip
2. Day-by-day schedule with:
   - Accommodations
   - Activities and attractions with timing
   - Transportation details
   - Meal suggestions or reservations
   - Free time blocks
3. Estimated costs breakdown
4. Packing suggestions based on activities and weather
5. Important contact information and emergency resources

The itinerary should be realistic, well-paced, and consider travel times between locations.
Balance scheduled activities with free time for relaxation or spontaneous exploration.",
        days = prefs.trip_days(),
        destination = prefs.destination().unwrap_or("As determined by research"),
    );

    TaskSpec::new(
        StageId::ItineraryCompilation,
        ITINERARY_COMPILER.key,
        description,
    )
    .with_expected_output("A complete day-by-day travel itinerary with all requested information.")
    .depends_on(&[
        StageId::DestinationResearch,
        StageId::AccommodationSearch,
        StageId::ActivitiesPlanning,
        StageId::TransportationPlanning,
    ])
}
