pub mod prompt;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use studentfit_client::{models, Client, GenerationRequest, Token};
use studentfit_model::{Estimate, EstimationMode, UserProfile};

use crate::prompt::{build_prompt, Preferences};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("please provide a Hugging Face access token")]
    MissingToken,
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),
    #[error(transparent)]
    Estimation(#[from] studentfit_model::Error),
    #[error(transparent)]
    Generation(#[from] studentfit_client::Error),
}

fn default_model() -> String {
    models::DEFAULT_MODEL.to_owned()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlanRequest {
    pub profile: UserProfile,
    #[serde(default)]
    pub mode: EstimationMode,
    #[serde(default)]
    pub include_bmi: bool,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default = "default_model")]
    pub model: String,
}

impl PlanRequest {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            mode: EstimationMode::default(),
            include_bmi: false,
            preferences: Preferences::default(),
            model: default_model(),
        }
    }

    pub fn estimate(&self) -> Result<Estimate, Error> {
        Ok(studentfit_model::estimate(
            &self.profile,
            self.mode,
            self.include_bmi,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Plan {
    pub estimate: Estimate,
    pub model: String,
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

pub struct Planner {
    client: Box<dyn Client>,
}

impl Planner {
    pub fn new(client: Box<dyn Client>) -> Self {
        Self { client }
    }

    /// Estimates the calorie target, builds the prompt and asks the model for
    /// a plan. The token is used for this call only.
    pub async fn generate_plan(
        &self,
        token: Option<&Token>,
        request: &PlanRequest,
    ) -> Result<Plan, Error> {
        let Some(token) = token else {
            return Err(Error::MissingToken);
        };
        if !models::is_supported(&request.model) {
            return Err(Error::UnsupportedModel(request.model.clone()));
        }

        let estimate = request.estimate()?;
        info!(
            "Requesting plan for {} kcal ({} mode) from {}",
            estimate.calorie_target, estimate.mode, request.model
        );

        let prompt = build_prompt(
            estimate.calorie_target,
            &request.preferences,
            request.profile.goal,
        );
        debug!("Prompt: {}", prompt);

        let text = match self
            .client
            .generate(token, &GenerationRequest::new(&request.model, prompt))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to generate plan: {}", e);
                return Err(e.into());
            }
        };
        info!("Plan generated, {} characters", text.len());

        Ok(Plan {
            estimate,
            model: request.model.clone(),
            text,
            generated_at: Utc::now(),
        })
    }
}
