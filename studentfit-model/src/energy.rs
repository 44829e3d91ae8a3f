//! Energy-expenditure estimation based on the Mifflin-St Jeor equation.
//!
//! Two calorie-target modes are provided:
//! - [`EstimationMode::Activity`]: sex-specific BMR scaled by the activity
//!   multiplier and rounded half away from zero.
//! - [`EstimationMode::LegacyGoal`]: BMR with the male constant regardless of
//!   sex, the sedentary multiplier, an additive goal offset, truncated toward
//!   zero. Kept as-is for compatibility with previously generated targets.
//!
//! All functions are pure; no value is clamped.

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::profile::{parse_selector, ActivityLevel, Goal, Sex, UserProfile};

const WEIGHT_COEFFICIENT: f64 = 10.0;
const HEIGHT_COEFFICIENT: f64 = 6.25;
const AGE_COEFFICIENT: f64 = 5.0;

const MALE_CONSTANT: f64 = 5.0;
const FEMALE_CONSTANT: f64 = -161.0;

const LEGACY_MULTIPLIER: f64 = 1.2;

impl Sex {
    pub fn bmr_constant(self) -> f64 {
        match self {
            Sex::Male => MALE_CONSTANT,
            Sex::Female => FEMALE_CONSTANT,
        }
    }
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
        }
    }
}

impl Goal {
    pub fn calorie_offset(self) -> f64 {
        match self {
            Goal::FatLoss => -400.0,
            Goal::MuscleGain => 300.0,
            Goal::Maintain => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
pub enum EstimationMode {
    #[default]
    #[strum(to_string = "activity")]
    Activity,
    #[strum(to_string = "legacy-goal")]
    LegacyGoal,
}

impl FromStr for EstimationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector("estimation mode", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Estimate {
    pub mode: EstimationMode,
    pub bmr: f64,
    pub calorie_target: i64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bmi: Option<f64>,
}

fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidArgument(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: u32, constant: f64) -> Result<f64> {
    let weight_kg = ensure_finite("weight", weight_kg)?;
    let height_cm = ensure_finite("height", height_cm)?;

    ensure_finite(
        "bmr",
        WEIGHT_COEFFICIENT * weight_kg + HEIGHT_COEFFICIENT * height_cm
            - AGE_COEFFICIENT * f64::from(age_years)
            + constant,
    )
}

fn to_calories(value: f64) -> Result<i64> {
    let value = ensure_finite("calorie target", value)?;
    if value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(Error::InvalidArgument(format!(
            "calorie target out of range: {}",
            value
        )))
    }
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day. Zero or negative results
/// for extreme inputs are returned unchanged.
pub fn compute_bmr(profile: &UserProfile) -> Result<f64> {
    mifflin_st_jeor(
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.sex.bmr_constant(),
    )
}

/// Scales a precomputed BMR by the activity multiplier, rounding half away
/// from zero (2038.5 becomes 2039).
pub fn tdee_from_bmr(bmr: f64, activity_level: ActivityLevel) -> Result<i64> {
    let bmr = ensure_finite("bmr", bmr)?;
    to_calories((bmr * activity_level.multiplier()).round())
}

pub fn compute_tdee(profile: &UserProfile) -> Result<i64> {
    tdee_from_bmr(compute_bmr(profile)?, profile.activity_level)
}

/// Legacy target: male constant for everyone, sedentary multiplier, goal
/// offset, truncated toward zero.
pub fn compute_goal_adjusted_calories(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    goal: Goal,
) -> Result<i64> {
    let bmr = mifflin_st_jeor(weight_kg, height_cm, age_years, MALE_CONSTANT)?;
    to_calories((bmr * LEGACY_MULTIPLIER + goal.calorie_offset()).trunc())
}

/// Body mass index rounded to 2 decimal places.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    let weight_kg = ensure_finite("weight", weight_kg)?;
    let height_cm = ensure_finite("height", height_cm)?;
    if height_cm == 0.0 {
        return Err(Error::DivisionByZero);
    }

    let height_m = height_cm / 100.0;
    let height_squared = height_m * height_m;
    if height_squared == 0.0 {
        return Err(Error::DivisionByZero);
    }

    ensure_finite("bmi", (weight_kg / height_squared * 100.0).round() / 100.0)
}

pub fn estimate(profile: &UserProfile, mode: EstimationMode, include_bmi: bool) -> Result<Estimate> {
    let (bmr, calorie_target) = match mode {
        EstimationMode::Activity => {
            let bmr = compute_bmr(profile)?;
            (bmr, tdee_from_bmr(bmr, profile.activity_level)?)
        }
        EstimationMode::LegacyGoal => {
            let goal = profile.goal.ok_or_else(|| {
                Error::InvalidArgument("goal is required in legacy-goal mode".to_owned())
            })?;
            let bmr = mifflin_st_jeor(
                profile.weight_kg,
                profile.height_cm,
                profile.age_years,
                MALE_CONSTANT,
            )?;
            let target = compute_goal_adjusted_calories(
                profile.weight_kg,
                profile.height_cm,
                profile.age_years,
                goal,
            )?;
            (bmr, target)
        }
    };

    let bmi = if include_bmi {
        Some(compute_bmi(profile.weight_kg, profile.height_cm)?)
    } else {
        None
    };

    Ok(Estimate {
        mode,
        bmr,
        calorie_target,
        bmi,
    })
}
