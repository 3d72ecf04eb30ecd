//! AWS Lambda handler for retirement spending projections
//!
//! Accepts the shareable-link query string (`?s=m&b=1960-01-01&...`) and
//! returns the projection as JSON. Supports Lambda Function URLs for direct
//! HTTP access.
//!
//! Tables are read once at cold start from `LIFE_TABLES_DIR`.

use std::path::PathBuf;
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{error, info};
use retirement_spending::{
    projection::PeriodRow, LifeExpectancyTables, ProjectionConfig, ProjectionEngine, ProjectionSummary,
    RetirementInput, DEFAULT_BASE_ADDRESS, DEFAULT_TABLES_PATH,
};
use serde::Serialize;

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub input: RetirementInput,
    pub share_link: String,
    pub summary: ProjectionSummary,
    pub rows: Vec<PeriodRow>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(serde_json::to_string(&ErrorBody { error: message })?))?)
}

fn json_response(body: &ProjectionResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Lambda handler function
async fn handler(tables: &LifeExpectancyTables, event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    let input = match RetirementInput::from_query_string(event.uri().query().unwrap_or("")) {
        Ok(input) => input,
        Err(e) => return error_response(400, &e.to_string()),
    };

    let projection = match ProjectionEngine::new(tables, ProjectionConfig::default()).project(&input) {
        Ok(projection) => projection,
        Err(e) if e.is_user_error() => return error_response(400, &e.to_string()),
        Err(e) => {
            error!("Projection failed: {}", e);
            return error_response(500, &e.to_string());
        }
    };

    let base = std::env::var("SHARE_BASE_ADDRESS").unwrap_or_else(|_| DEFAULT_BASE_ADDRESS.to_string());
    let share_link = match input.share_link(&base) {
        Ok(url) => url.to_string(),
        Err(e) => return error_response(500, &e.to_string()),
    };

    let response = ProjectionResponse {
        summary: projection.summary(),
        rows: projection.rows(),
        share_link,
        input,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    json_response(&response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let dir = std::env::var("LIFE_TABLES_DIR").unwrap_or_else(|_| DEFAULT_TABLES_PATH.to_string());
    let tables = Arc::new(LifeExpectancyTables::load_async(&PathBuf::from(&dir)).await?);
    info!("Loaded life expectancy tables from {}", dir);

    run(service_fn(move |event: Request| {
        let tables = Arc::clone(&tables);
        async move { handler(&tables, event).await }
    }))
    .await
}
