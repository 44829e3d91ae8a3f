use std::{error::Error, time::Duration};

use clap::Parser;
use dotenv::dotenv;
use log::info;
use studentfit_client::{models::DEFAULT_MODEL, Config, Token, DEFAULT_BASE_URL};
use studentfit_model::{ActivityLevel, Estimate, EstimationMode, Goal, Sex, UserProfile};
use studentfit_planner::{
    prompt::{Budget, Preferences, DEFAULT_CUISINE, DEFAULT_EQUIPMENT},
    PlanRequest, Planner,
};

/// Budget-friendly meal and workout planner for students.
#[derive(Parser, Debug)]
#[command(name = "studentfit-plan")]
#[command(about = "Estimate a calorie target and generate a one-day plan with an open model")]
#[command(version)]
struct Args {
    #[arg(long, default_value_t = 20)]
    age: u32,

    #[arg(long, default_value = "male")]
    sex: Sex,

    /// Weight in kilograms.
    #[arg(long, default_value_t = 70.0)]
    weight: f64,

    /// Height in centimeters.
    #[arg(long, default_value_t = 175.0)]
    height: f64,

    #[arg(long, default_value = "sedentary")]
    activity: ActivityLevel,

    #[arg(long)]
    goal: Option<Goal>,

    /// `activity` or `legacy-goal` (requires --goal).
    #[arg(long, default_value = "activity")]
    mode: EstimationMode,

    /// Also report BMI.
    #[arg(long)]
    bmi: bool,

    #[arg(long, default_value = "student-low")]
    budget: Budget,

    #[arg(long, default_value = DEFAULT_CUISINE)]
    cuisine: String,

    #[arg(long, default_value = DEFAULT_EQUIPMENT)]
    equipment: String,

    /// Comma-separated list of ingredients to avoid.
    #[arg(long, value_delimiter = ',')]
    allergies: Vec<String>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Hugging Face access token.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "STUDENTFIT_HF_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "STUDENTFIT_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Print the numbers without contacting the model.
    #[arg(long)]
    estimate_only: bool,
}

impl Args {
    fn plan_request(&self) -> PlanRequest {
        let mut profile =
            UserProfile::new(self.weight, self.height, self.age, self.sex, self.activity);
        profile.goal = self.goal;

        PlanRequest {
            profile,
            mode: self.mode,
            include_bmi: self.bmi,
            preferences: Preferences {
                budget: self.budget,
                cuisine: self.cuisine.clone(),
                equipment: self.equipment.clone(),
                allergies: self.allergies.clone(),
            },
            model: self.model.clone(),
        }
    }
}

fn print_estimate(estimate: &Estimate) {
    println!("BMR: {:.2} kcal", estimate.bmr);
    println!("Calorie target ({}): {} kcal", estimate.mode, estimate.calorie_target);
    if let Some(bmi) = estimate.bmi {
        println!("BMI: {:.2}", bmi);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let args = Args::parse();
    let request = args.plan_request();

    if args.estimate_only {
        match request.estimate() {
            Ok(estimate) => print_estimate(&estimate),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    log4rs::init_file("log4rs.yml", Default::default())?;

    let client = studentfit_client::create(Config {
        base_url: args.base_url.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    })?;
    let planner = Planner::new(Box::new(client));
    let token = args.token.as_deref().and_then(Token::new);

    info!("Requesting {}", args.model);
    match planner.generate_plan(token.as_ref(), &request).await {
        Ok(plan) => {
            print_estimate(&plan.estimate);
            println!("---");
            println!("{}", plan.text);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_request_from_arguments() {
        let args = Args::try_parse_from([
            "studentfit-plan",
            "--sex",
            "female",
            "--activity",
            "Very Active",
            "--goal",
            "fat-loss",
            "--mode",
            "legacy-goal",
            "--budget",
            "moderate",
            "--allergies",
            "peanuts,gluten",
            "--bmi",
        ])
        .unwrap();
        let request = args.plan_request();

        assert_eq!(request.profile.sex, Sex::Female);
        assert_eq!(request.profile.activity_level, ActivityLevel::VeryActive);
        assert_eq!(request.profile.goal, Some(Goal::FatLoss));
        assert_eq!(request.mode, EstimationMode::LegacyGoal);
        assert!(request.include_bmi);
        assert_eq!(request.preferences.budget, Budget::Moderate);
        assert_eq!(
            request.preferences.allergies,
            vec!["peanuts".to_owned(), "gluten".to_owned()]
        );
        assert_eq!(request.model, DEFAULT_MODEL);
    }

    #[test]
    fn defaults_match_reference_profile() {
        let request = Args::try_parse_from(["studentfit-plan"])
            .unwrap()
            .plan_request();

        assert_eq!(
            request.profile,
            UserProfile::new(70.0, 175.0, 20, Sex::Male, ActivityLevel::Sedentary)
        );
        assert_eq!(request.mode, EstimationMode::Activity);
        assert!(!request.include_bmi);
        assert_eq!(request.preferences, Preferences::default());
        assert_eq!(request.estimate().unwrap().calorie_target, 2039);
    }

    #[test]
    fn rejects_unknown_selectors() {
        let test_data = [
            vec!["studentfit-plan", "--activity", "couch"],
            vec!["studentfit-plan", "--goal", "bulk"],
            vec!["studentfit-plan", "--mode", "fast"],
        ];

        for (i, argv) in test_data.into_iter().enumerate() {
            assert!(Args::try_parse_from(argv).is_err(), "Test case #{}", i);
        }
    }
}
