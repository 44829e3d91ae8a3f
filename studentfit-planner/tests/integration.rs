use studentfit_client::{Error as ClientError, MockClient, Token};
use studentfit_model::{ActivityLevel, EstimationMode, Goal, Sex, UserProfile};
use studentfit_planner::{
    prompt::{Budget, Preferences},
    Error, PlanRequest, Planner,
};

fn token() -> Token {
    Token::new("hf_test").unwrap()
}

fn request() -> PlanRequest {
    PlanRequest::new(UserProfile::new(
        70.0,
        175.0,
        20,
        Sex::Male,
        ActivityLevel::Sedentary,
    ))
}

#[tokio::test]
async fn plan_uses_activity_target_in_prompt() {
    let mut client = MockClient::new();
    client
        .expect_generate()
        .withf(|token, request| {
            token == &Token::new("hf_test").unwrap()
                && request.model == "mistralai/Mistral-7B-Instruct-v0.3"
                && request.prompt.contains("- Calorie Goal: 2039 kcal")
                && request.prompt.contains("- Budget: Student/Low")
                && request.parameters.max_new_tokens == 800
        })
        .times(1)
        .returning(|_, _| Ok("### Meal Plan\nRice".to_owned()));

    let planner = Planner::new(Box::new(client));
    let plan = planner
        .generate_plan(Some(&token()), &request())
        .await
        .unwrap();

    assert_eq!(plan.estimate.calorie_target, 2039);
    assert_eq!(plan.estimate.bmr, 1698.75);
    assert_eq!(plan.text, "### Meal Plan\nRice");
    assert_eq!(plan.model, "mistralai/Mistral-7B-Instruct-v0.3");
}

#[tokio::test]
async fn legacy_goal_mode_prompt() {
    let mut client = MockClient::new();
    client
        .expect_generate()
        .withf(|_, request| {
            request.model == "HuggingFaceH4/zephyr-7b-beta"
                && request.prompt.contains("- Calorie Goal: 1638 kcal")
                && request.prompt.contains("- Goal: Fat Loss")
                && request.prompt.contains("- Cultural Preference: Indian")
                && request.prompt.contains("peanuts")
        })
        .times(1)
        .returning(|_, _| Ok("plan".to_owned()));

    let mut request = request();
    request.profile = request.profile.with_goal(Goal::FatLoss);
    request.mode = EstimationMode::LegacyGoal;
    request.include_bmi = true;
    request.model = "HuggingFaceH4/zephyr-7b-beta".to_owned();
    request.preferences = Preferences {
        budget: Budget::High,
        cuisine: "Indian".to_owned(),
        allergies: vec!["peanuts".to_owned()],
        ..Preferences::default()
    };

    let planner = Planner::new(Box::new(client));
    let plan = planner
        .generate_plan(Some(&token()), &request)
        .await
        .unwrap();

    assert_eq!(plan.estimate.calorie_target, 1638);
    assert_eq!(plan.estimate.bmi, Some(22.86));
}

#[tokio::test]
async fn missing_token_never_calls_client() {
    let mut client = MockClient::new();
    client.expect_generate().never();

    let planner = Planner::new(Box::new(client));
    let result = planner.generate_plan(None, &request()).await;

    assert!(matches!(result, Err(Error::MissingToken)));
}

#[tokio::test]
async fn unsupported_model_is_rejected() {
    let mut client = MockClient::new();
    client.expect_generate().never();

    let mut request = request();
    request.model = "gpt2".to_owned();

    let planner = Planner::new(Box::new(client));
    let result = planner.generate_plan(Some(&token()), &request).await;

    assert!(matches!(result, Err(Error::UnsupportedModel(model)) if model == "gpt2"));
}

#[tokio::test]
async fn estimation_errors_propagate() {
    let mut client = MockClient::new();
    client.expect_generate().never();

    let mut request = request();
    request.profile.height_cm = 0.0;
    request.include_bmi = true;

    let planner = Planner::new(Box::new(client));
    let result = planner.generate_plan(Some(&token()), &request).await;

    assert!(matches!(
        result,
        Err(Error::Estimation(studentfit_model::Error::DivisionByZero))
    ));
}

#[tokio::test]
async fn client_errors_propagate() {
    let mut client = MockClient::new();
    client.expect_generate().times(1).returning(|_, _| {
        Err(ClientError::ModelLoading {
            estimated_time: None,
        })
    });

    let planner = Planner::new(Box::new(client));
    let result = planner.generate_plan(Some(&token()), &request()).await;

    let error = result.unwrap_err();
    assert!(matches!(
        error,
        Error::Generation(ClientError::ModelLoading { .. })
    ));
    assert_eq!(
        error.to_string(),
        "the model might be loading, try again in 30 seconds"
    );
}

#[test]
fn plan_request_deserializes_with_defaults() {
    let request: PlanRequest = serde_json::from_str(
        r#"{"profile":{"weight_kg":70,"height_cm":175,"age_years":20,"sex":"male","activity_level":"Sedentary"}}"#,
    )
    .unwrap();

    assert_eq!(request.mode, EstimationMode::Activity);
    assert_eq!(request.model, "mistralai/Mistral-7B-Instruct-v0.3");
    assert_eq!(request.preferences, Preferences::default());
}
