pub mod config;
pub mod error;
pub mod gpx_export;
pub mod map_export;
pub mod models;
pub mod point_store;
pub mod report;
pub mod routing;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::post,
};
use tower_http::cors::{Any, CorsLayer};

use crate::error::RouteError;
use crate::gpx_export::encode_route_as_gpx;
use crate::models::{
    ApiError, ParsePointsRequest, ParsePointsResponse, RouteSummary, SummaryRequest,
    SummaryResponse, TimeWindow,
};
use crate::point_store::PointStore;
use crate::report::render_report;
use crate::routing::RouteCalculator;

#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<RouteCalculator>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/summary", post(summary_handler))
        .route("/api/points/parse", post(parse_points_handler))
        .route("/api/report", post(report_handler))
        .route("/api/map", post(map_handler))
        .layer(cors)
        .with_state(state)
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

async fn summary_handler(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    let (store, summary) = summarize_request(&state, &req).map_err(api_error)?;
    let gpx_base64 = encode_route_as_gpx(store.points()).map_err(api_error)?;

    Ok(Json(SummaryResponse {
        point_count: summary.point_count,
        total_distance_nm: summary.total_distance_nm,
        average_speed_knots: summary.average_speed_knots,
        travel_hours: summary.travel_hours(),
        start: summary.window.map(|_| summary.start_label()),
        end: summary.window.map(|_| summary.end_label()),
        gpx_base64,
    }))
}

async fn parse_points_handler(Json(req): Json<ParsePointsRequest>) -> Json<ParsePointsResponse> {
    let mut store = PointStore::new();
    let loaded = store.load_from_text(req.text.lines());
    tracing::debug!(
        "parsed {} point(s) with {} warning(s)",
        loaded.added.len(),
        loaded.warnings.len()
    );

    Json(ParsePointsResponse {
        points: loaded.added.into_iter().map(Into::into).collect(),
        warnings: loaded.warnings.iter().map(ToString::to_string).collect(),
    })
}

async fn report_handler(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> ApiResult<String> {
    let (store, summary) = summarize_request(&state, &req).map_err(api_error)?;
    let generated_at = chrono::Local::now().naive_local();
    Ok(render_report(store.points(), &summary, generated_at))
}

async fn map_handler(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> ApiResult<Html<String>> {
    let (store, summary) = summarize_request(&state, &req).map_err(api_error)?;
    Ok(Html(map_export::render_map_html(store.points(), &summary)))
}

fn summarize_request(
    state: &AppState,
    req: &SummaryRequest,
) -> Result<(PointStore, RouteSummary), RouteError> {
    let mut store = PointStore::new();
    for coord in &req.points {
        store.add_point(coord.lat, coord.lon)?;
    }
    let window = TimeWindow::from_optional(req.start.as_deref(), req.end.as_deref())?;
    let summary = state.calculator.summarize(store.points(), window.as_ref())?;

    tracing::info!(
        "route of {} point(s): {:.2} nm at {:.2} kn",
        summary.point_count,
        summary.total_distance_nm,
        summary.average_speed_knots
    );
    Ok((store, summary))
}

fn api_error(err: RouteError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        RouteError::Validation(_) | RouteError::InsufficientPoints(_) => StatusCode::BAD_REQUEST,
        RouteError::Gpx(_) | RouteError::Io { .. } | RouteError::Task(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!("request failed: {err}");
    }

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}

