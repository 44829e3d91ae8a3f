pub mod energy;
pub mod error;
pub mod profile;

pub use energy::{
    compute_bmi, compute_bmr, compute_goal_adjusted_calories, compute_tdee, estimate,
    tdee_from_bmr, Estimate, EstimationMode,
};
pub use error::{Error, Result};
pub use profile::{ActivityLevel, Goal, Sex, UserProfile};
