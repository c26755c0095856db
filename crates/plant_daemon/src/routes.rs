use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use plant_core::{factory_report, unit_report, FactoryRef, FactoryReport, UnitReport};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, HeaderValue::from_static("http://localhost:5173"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/factories", post(create_factory_handler))
        .route("/reports/:reference", get(factory_report_handler))
        .route(
            "/reports/:reference/productionunit/:name",
            get(unit_report_handler),
        )
        .route("/command/:reference", post(command_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    InvalidFactory(String),
    InvalidCommand(String),
    UnknownFactory(FactoryRef),
    UnknownProductionUnit(String),
    UnknownCommand(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownFactory(_) | ApiError::UnknownProductionUnit(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::InvalidFactory(_)
            | ApiError::InvalidCommand(_)
            | ApiError::UnknownCommand(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidFactory(_) => "InvalidFactory",
            ApiError::InvalidCommand(_) => "InvalidCommand",
            ApiError::UnknownFactory(_) => "UnknownFactory",
            ApiError::UnknownProductionUnit(_) => "UnknownProductionUnit",
            ApiError::UnknownCommand(_) => "UnknownCommand",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidFactory(message) | ApiError::InvalidCommand(message) => {
                message.clone()
            }
            ApiError::UnknownFactory(reference) => format!("no factory with reference {reference}"),
            ApiError::UnknownProductionUnit(name) => format!("no production unit named '{name}'"),
            ApiError::UnknownCommand(command) => format!("unknown command '{command}'"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({"error": self.code(), "message": self.message()});
        (self.status(), Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn create_factory_handler(
    State(app_state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let def = plant_world::parse_config(&body)
        .map_err(|err| ApiError::InvalidFactory(format!("{err:#}")))?;
    let factory = plant_world::build_factory(&def);
    let reference = app_state.registry.lock().register(factory);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"reference": reference.0})),
    ))
}

pub async fn factory_report_handler(
    State(app_state): State<AppState>,
    Path(reference): Path<u64>,
) -> Result<Json<FactoryReport>, ApiError> {
    let reference = FactoryRef(reference);
    let registry = app_state.registry.lock();
    let factory = registry
        .get(reference)
        .ok_or(ApiError::UnknownFactory(reference))?;
    Ok(Json(factory_report(factory)))
}

pub async fn unit_report_handler(
    State(app_state): State<AppState>,
    Path((reference, name)): Path<(u64, String)>,
) -> Result<Json<UnitReport>, ApiError> {
    let reference = FactoryRef(reference);
    let registry = app_state.registry.lock();
    let factory = registry
        .get(reference)
        .ok_or(ApiError::UnknownFactory(reference))?;
    unit_report(factory, &name)
        .map(Json)
        .ok_or(ApiError::UnknownProductionUnit(name))
}

/// Longest single `run` accepted: one week of one-minute ticks. The
/// simulation runs while the registry lock is held.
pub const MAX_RUN_TIME: u64 = 7 * 24 * 60;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    pub time: Option<u64>,
}

fn run_time(request: &CommandRequest) -> Result<u64, ApiError> {
    match request.time {
        None => Err(ApiError::InvalidCommand(
            "run needs a \"time\" argument".to_string(),
        )),
        Some(time) if time > MAX_RUN_TIME => Err(ApiError::InvalidCommand(format!(
            "time {time} exceeds the limit of {MAX_RUN_TIME}"
        ))),
        Some(time) => Ok(time),
    }
}

pub async fn command_handler(
    State(app_state): State<AppState>,
    Path(reference): Path<u64>,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reference = FactoryRef(reference);
    let request: CommandRequest = serde_json::from_str(&body)
        .map_err(|err| ApiError::InvalidCommand(err.to_string()))?;
    let time = match request.command.as_str() {
        "run" => run_time(&request)?,
        _ => return Err(ApiError::UnknownCommand(request.command)),
    };

    let mut registry = app_state.registry.lock();
    let factory = registry
        .get_mut(reference)
        .ok_or(ApiError::UnknownFactory(reference))?;
    let events = factory.run(time);
    tracing::debug!(
        reference = %reference,
        ticks = time,
        events = events.len(),
        "factory advanced"
    );
    Ok(Json(serde_json::json!({
        "time": factory.current_time(),
        "events": events.len(),
    })))
}
