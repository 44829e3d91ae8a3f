use std::str::FromStr;

use itertools::Itertools;
use studentfit_model::{profile::parse_selector, Goal};

pub const DEFAULT_CUISINE: &str = "Global";
pub const DEFAULT_EQUIPMENT: &str = "No gym";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumIter,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub enum Budget {
    #[default]
    #[strum(to_string = "Student/Low")]
    StudentLow,
    #[strum(to_string = "Moderate")]
    Moderate,
    #[strum(to_string = "High")]
    High,
}

impl FromStr for Budget {
    type Err = studentfit_model::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector("budget", s)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub budget: Budget,
    pub cuisine: String,
    pub equipment: String,
    pub allergies: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            budget: Budget::default(),
            cuisine: DEFAULT_CUISINE.to_owned(),
            equipment: DEFAULT_EQUIPMENT.to_owned(),
            allergies: Vec::new(),
        }
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Builds an instruction-formatted prompt asking for a one-day meal and
/// workout plan.
pub fn build_prompt(calorie_target: i64, preferences: &Preferences, goal: Option<Goal>) -> String {
    let cuisine = or_default(&preferences.cuisine, DEFAULT_CUISINE);
    let equipment = or_default(&preferences.equipment, DEFAULT_EQUIPMENT);

    let mut profile_lines = vec![
        format!("- Calorie Goal: {} kcal", calorie_target),
        format!("- Budget: {}", preferences.budget),
        format!("- Cultural Preference: {}", cuisine),
        format!("- Equipment: {}", equipment),
    ];
    if let Some(goal) = goal {
        profile_lines.push(format!("- Goal: {}", goal));
    }
    let allergies = preferences
        .allergies
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .join(", ");
    if !allergies.is_empty() {
        profile_lines.push(format!("- Allergies (never use these ingredients): {}", allergies));
    }

    format!(
        "<s>[INST] You are a budget-conscious student health coach.
Create a 1-day plan for a student with:
{profile}

Structure your response as follows:
### 🍽️ Budget {cuisine} Meal Plan
(List Breakfast, Lunch, and Dinner with cheap ingredients)

### 🏃 Workout ({equipment})
(List 4-5 exercises)

### 💡 Student Hack
(One tip for dorm life)
[/INST]",
        profile = profile_lines.join("\n"),
        cuisine = cuisine,
        equipment = equipment,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_profile_lines() {
        let prompt = build_prompt(2039, &Preferences::default(), None);

        assert!(prompt.starts_with("<s>[INST]"));
        assert!(prompt.ends_with("[/INST]"));
        assert!(prompt.contains("- Calorie Goal: 2039 kcal"));
        assert!(prompt.contains("- Budget: Student/Low"));
        assert!(prompt.contains("- Cultural Preference: Global"));
        assert!(prompt.contains("### 🏃 Workout (No gym)"));
        assert!(!prompt.contains("Goal: Fat"));
        assert!(!prompt.contains("Allergies"));
    }

    #[test]
    fn prompt_includes_goal_and_allergies() {
        let preferences = Preferences {
            budget: Budget::Moderate,
            cuisine: "Nigerian".to_owned(),
            equipment: "Dumbbells".to_owned(),
            allergies: vec!["peanuts".to_owned(), " ".to_owned(), " shellfish".to_owned()],
        };
        let prompt = build_prompt(1638, &preferences, Some(Goal::FatLoss));

        assert!(prompt.contains("- Goal: Fat Loss"));
        assert!(prompt.contains("- Allergies (never use these ingredients): peanuts, shellfish"));
        assert!(prompt.contains("### 🍽️ Budget Nigerian Meal Plan"));
        assert!(prompt.contains("- Budget: Moderate"));
    }

    #[test]
    fn blank_preferences_fall_back_to_defaults() {
        let preferences = Preferences {
            cuisine: "  ".to_owned(),
            equipment: String::new(),
            ..Preferences::default()
        };
        let prompt = build_prompt(2000, &preferences, None);

        assert!(prompt.contains("- Cultural Preference: Global"));
        assert!(prompt.contains("- Equipment: No gym"));
    }

    #[test]
    fn budget_parses_form_labels() {
        assert_eq!("Student/Low".parse::<Budget>(), Ok(Budget::StudentLow));
        assert_eq!("student-low".parse::<Budget>(), Ok(Budget::StudentLow));
        assert_eq!("HIGH".parse::<Budget>(), Ok(Budget::High));
        assert!("luxury".parse::<Budget>().is_err());
    }

    #[test]
    fn preferences_deserialize_with_defaults() {
        let preferences: Preferences =
            serde_json::from_str(r#"{"budget":"Moderate","allergies":["gluten"]}"#).unwrap();
        assert_eq!(preferences.budget, Budget::Moderate);
        assert_eq!(preferences.cuisine, DEFAULT_CUISINE);
        assert_eq!(preferences.allergies, vec!["gluten".to_owned()]);
    }
}
