use std::{fmt::Display, str::FromStr};

use strum::IntoEnumIterator;

use crate::error::{Error, Result};

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' | '/' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Matches `s` against the display labels of `T`, ignoring case and
/// space/underscore/slash/dash differences.
pub fn parse_selector<T>(kind: &str, s: &str) -> Result<T>
where
    T: IntoEnumIterator + Display,
{
    let wanted = normalize(s);
    T::iter()
        .find(|variant| normalize(&variant.to_string()) == wanted)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown {}: \"{}\"", kind, s)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector("sex", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
pub enum ActivityLevel {
    #[strum(to_string = "Sedentary")]
    Sedentary,
    #[strum(to_string = "Lightly Active")]
    LightlyActive,
    #[strum(to_string = "Moderately Active")]
    ModeratelyActive,
    #[strum(to_string = "Very Active")]
    VeryActive,
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector("activity level", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
pub enum Goal {
    #[strum(to_string = "Fat Loss")]
    FatLoss,
    #[strum(to_string = "Muscle Gain")]
    MuscleGain,
    #[strum(to_string = "Maintain")]
    Maintain,
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector("goal", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub goal: Option<Goal>,
}

impl UserProfile {
    pub fn new(
        weight_kg: f64,
        height_cm: f64,
        age_years: u32,
        sex: Sex,
        activity_level: ActivityLevel,
    ) -> Self {
        Self {
            weight_kg,
            height_cm,
            age_years,
            sex,
            activity_level,
            goal: None,
        }
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }
}
