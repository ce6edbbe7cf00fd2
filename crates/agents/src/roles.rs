//! The five fixed planning roles.

use itinera_tools::ToolNeeds;

/// A named persona: goal, backstory and the kinds of tool it may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub tools: ToolNeeds,
}

impl RoleDefinition {
    /// Look up a role by key.
    pub fn find(key: &str) -> Option<&'static RoleDefinition> {
        ROLES.iter().find(|role| role.key == key)
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.name, self.backstory, self.goal
        )
    }
}

pub const DESTINATION_RESEARCHER: RoleDefinition = RoleDefinition {
    key: "destination_researcher",
    name: "Travel Destination Researcher",
    goal: "Find the best destinations based on traveler preferences and provide detailed information about each location",
    backstory: "You are an expert travel researcher with extensive knowledge of global destinations. \
        You have visited over 100 countries and have a deep understanding of different cultures, \
        climates, and travel experiences. Your recommendations are always well-researched and tailored \
        to the traveler's specific interests and constraints.",
    tools: ToolNeeds::RESEARCH_WITH_WEATHER,
};

pub const ACCOMMODATION_SPECIALIST: RoleDefinition = RoleDefinition {
    key: "accommodation_specialist",
    name: "Accommodation Specialist",
    goal: "Find the best accommodation options based on traveler preferences, budget, and location",
    backstory: "You are a hotel and accommodation expert who has worked in the hospitality \
        industry for over 15 years. You have connections with hotels, resorts, and vacation \
        rental properties worldwide. You know how to find the perfect place to stay that \
        balances comfort, convenience, and budget.",
    tools: ToolNeeds::RESEARCH,
};

pub const ACTIVITIES_PLANNER: RoleDefinition = RoleDefinition {
    key: "activities_planner",
    name: "Activities and Attractions Planner",
    goal: "Create a comprehensive list of activities, attractions, and experiences tailored to the traveler's interests",
    backstory: "You are a local experiences expert who specializes in finding unique and \
        authentic activities for travelers. You have a knack for discovering hidden gems and \
        can recommend both popular tourist attractions and off-the-beaten-path experiences. \
        You consider the traveler's interests, physical abilities, and time constraints.",
    tools: ToolNeeds::RESEARCH,
};

pub const TRANSPORTATION_COORDINATOR: RoleDefinition = RoleDefinition {
    key: "transportation_coordinator",
    name: "Transportation Coordinator",
    goal: "Plan the most efficient and convenient transportation options for the entire trip",
    backstory: "You are a transportation logistics expert who can navigate complex \
        transportation systems worldwide. You know the best ways to get around in different \
        cities and countries, whether by public transit, rental car, or private transfers. \
        You optimize for convenience, cost, and time efficiency.",
    tools: ToolNeeds::RESEARCH,
};

pub const ITINERARY_COMPILER: RoleDefinition = RoleDefinition {
    key: "itinerary_compiler",
    name: "Itinerary Compiler and Optimizer",
    goal: "Compile all research and recommendations into a cohesive, day-by-day travel itinerary",
    backstory: "You are a master travel planner who excels at creating detailed, \
        well-organized itineraries. You know how to balance activities with downtime, \
        account for travel logistics, and create realistic schedules. Your itineraries \
        are always clear, comprehensive, and easy to follow.",
    // Synthesizes the other roles' output only.
    tools: ToolNeeds::NONE,
};

/// All roles, in the order their stages run.
pub const ROLES: [RoleDefinition; 5] = [
    DESTINATION_RESEARCHER,
    ACCOMMODATION_SPECIALIST,
    ACTIVITIES_PLANNER,
    TRANSPORTATION_COORDINATOR,
    ITINERARY_COMPILER,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        for (i, a) in ROLES.iter().enumerate() {
            for b in &ROLES[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn only_the_researcher_checks_weather() {
        let weather: Vec<_> = ROLES.iter().filter(|r| r.tools.weather).map(|r| r.key).collect();
        assert_eq!(weather, vec!["destination_researcher"]);
    }

    #[test]
    fn compiler_has_no_tools() {
        assert_eq!(ITINERARY_COMPILER.tools, ToolNeeds::NONE);
        assert!(ROLES[..4].iter().all(|r| r.tools.search && r.tools.website));
    }

    #[test]
    fn system_prompt_mentions_name_and_goal() {
        let prompt = ACCOMMODATION_SPECIALIST.system_prompt();
        assert!(prompt.starts_with("You are Accommodation Specialist."));
        assert!(prompt.contains("Your personal goal is: Find the best accommodation options"));
    }

    #[test]
    fn find_by_key() {
        assert_eq!(
            RoleDefinition::find("activities_planner").map(|r| r.name),
            Some("Activities and Attractions Planner")
        );
        assert!(RoleDefinition::find("tour_guide").is_none());
    }
}
