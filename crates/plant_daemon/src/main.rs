mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use plant_core::Registry;
use plant_world::{build_factory, load_config};
use routes::make_router_with_cors;
use state::AppState;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plant_daemon", about = "Production floor simulation HTTP daemon")]
struct Cli {
    /// Factory description registered at startup.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 8889)]
    port: u16,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn initial_registry(config: Option<&Path>) -> Result<Registry> {
    let mut registry = Registry::new();
    if let Some(path) = config {
        let def = load_config(path)?;
        let reference = registry.register(build_factory(&def));
        println!("Registered '{}' as factory {reference}", def.name);
    }
    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let cors_origin: HeaderValue = cli
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin '{}'", cli.cors_origin))?;
    let state = AppState::new(initial_registry(cli.config.as_deref())?);
    let app = make_router_with_cors(state, cors_origin);

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "plant_daemon listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use http_body_util::BodyExt;
    use plant_core::test_fixtures::sawmill_def;
    use routes::make_router;
    use tower::ServiceExt;

    fn sawmill_body() -> String {
        serde_json::to_string(&sawmill_def()).unwrap()
    }

    fn post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn app_with_sawmill() -> Router {
        let mut registry = Registry::new();
        registry.register(plant_world::build_factory(&sawmill_def()));
        make_router(AppState::new(registry))
    }

    #[tokio::test]
    async fn test_create_factory_returns_reference() {
        let app = make_router(AppState::default());

        let (status, json) = send(&app, post("/factories", sawmill_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["reference"], 1);

        let (_, json) = send(&app, post("/factories", sawmill_body())).await;
        assert_eq!(json["reference"], 2);
    }

    #[tokio::test]
    async fn test_invalid_factory_is_rejected() {
        let app = make_router(AppState::default());

        let (status, json) = send(&app, post("/factories", "{\"name\": ".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "InvalidFactory");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("parsing factory description"));
    }

    #[tokio::test]
    async fn test_factory_report_of_fresh_factory() {
        let app = app_with_sawmill();

        let (status, json) = send(&app, get("/reports/1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["current_time"], 0);
        assert_eq!(json["production_unit_count"], 1);
        assert_eq!(json["worker_count"], 1);
    }

    #[tokio::test]
    async fn test_unknown_factory_is_404() {
        let app = app_with_sawmill();

        let (status, json) = send(&app, get("/reports/7")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "UnknownFactory");
    }

    #[tokio::test]
    async fn test_unknown_production_unit_is_404() {
        let app = app_with_sawmill();

        let (status, json) = send(&app, get("/reports/1/productionunit/loom")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "UnknownProductionUnit");
    }

    #[tokio::test]
    async fn test_run_command_advances_the_factory() {
        let app = app_with_sawmill();

        let (status, json) = send(
            &app,
            post("/command/1", r#"{"command": "run", "time": 61}"#.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["time"], 61);
        assert!(json["events"].as_u64().unwrap() > 0);

        let (status, json) = send(&app, get("/reports/1/productionunit/sawmill")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "sawmill");
        assert!((json["units_produced"].as_f64().unwrap() - 30.0).abs() < 1e-6);
        assert!((json["value_produced"].as_f64().unwrap() - 75.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_command_is_400() {
        let app = app_with_sawmill();

        let (status, json) = send(
            &app,
            post("/command/1", r#"{"command": "explode"}"#.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "UnknownCommand");
    }

    #[tokio::test]
    async fn test_command_on_unknown_factory_is_404() {
        let app = app_with_sawmill();

        let (status, json) = send(
            &app,
            post("/command/3", r#"{"command": "run", "time": 1}"#.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "UnknownFactory");
    }

    #[tokio::test]
    async fn test_run_longer_than_the_limit_is_400() {
        let app = app_with_sawmill();
        let body = serde_json::json!({"command": "run", "time": routes::MAX_RUN_TIME + 1});

        let (status, json) = send(&app, post("/command/1", body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "InvalidCommand");

        let (_, json) = send(&app, get("/reports/1")).await;
        assert_eq!(json["current_time"], 0);
    }

    #[tokio::test]
    async fn test_run_without_time_is_400() {
        let app = app_with_sawmill();

        let (status, json) = send(&app, post("/command/1", r#"{"command": "run"}"#.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "InvalidCommand");
    }

    #[test]
    fn test_initial_registry_without_config_is_empty() {
        assert!(initial_registry(None).unwrap().is_empty());
    }
}
