mod config;

use std::error::Error;

use actix_cors::Cors;
use actix_web::{
    error::InternalError, get, http::header, http::StatusCode, post, web, App, HttpRequest,
    HttpResponse, HttpServer, Responder, ResponseError,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use studentfit_client::{models, Token};
use studentfit_model::{EstimationMode, UserProfile};
use studentfit_planner::{PlanRequest, Planner};

use crate::config::Config;

struct AppState {
    planner: Planner,
    token: Option<Token>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ApiError(#[from] studentfit_planner::Error);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        use studentfit_client::Error as ClientError;
        use studentfit_planner::Error;

        match &self.0 {
            Error::MissingToken => StatusCode::UNAUTHORIZED,
            Error::UnsupportedModel(_) | Error::Estimation(_) => StatusCode::BAD_REQUEST,
            Error::Generation(ClientError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Error::Generation(ClientError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            Error::Generation(ClientError::ModelLoading { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct EstimateRequest {
    profile: UserProfile,
    #[serde(default)]
    mode: EstimationMode,
    #[serde(default)]
    include_bmi: bool,
}

fn bearer_token(req: &HttpRequest) -> Option<Token> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Token::new(token)
    } else {
        None
    }
}

#[get("/models")]
async fn list_models() -> impl Responder {
    web::Json(models::SUPPORTED_MODELS)
}

#[post("/estimate")]
async fn estimate(body: web::Json<EstimateRequest>) -> Result<impl Responder, ApiError> {
    let estimate = studentfit_model::estimate(&body.profile, body.mode, body.include_bmi)
        .map_err(studentfit_planner::Error::from)?;
    Ok(web::Json(estimate))
}

#[post("/plan")]
async fn plan(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PlanRequest>,
) -> Result<impl Responder, ApiError> {
    let token = bearer_token(&req).or_else(|| state.token.clone());
    let plan = state.planner.generate_plan(token.as_ref(), &body).await?;
    Ok(web::Json(plan))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| {
        let response = HttpResponse::BadRequest().json(ErrorBody {
            error: err.to_string(),
        });
        InternalError::from_response(err, response).into()
    })
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(list_models)
        .service(estimate)
        .service(plan);
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    log4rs::init_file("log4rs.yml", Default::default())?;

    let config = Config::from_env()?;
    if config.token.is_none() {
        warn!("HF_TOKEN not set, plan requests must carry a bearer token");
    }

    info!("Using inference endpoint {}", config.client.base_url);
    let client = studentfit_client::create(config.client.clone())?;
    let state = web::Data::new(AppState {
        planner: Planner::new(Box::new(client)),
        token: config.token.clone(),
    });

    info!("Listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(config.bind_address.as_str())?
    .run()
    .await?;

    Ok(())
}
