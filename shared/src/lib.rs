use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Waypoints plus an optional travel window.
///
/// Timestamps use the `YYYY-MM-DD HH:MM` form. Supplying only one of
/// `start`/`end` is rejected by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub points: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub point_count: usize,
    pub total_distance_nm: f64,
    pub average_speed_knots: f64,
    pub travel_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub gpx_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsePointsRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsePointsResponse {
    pub points: Vec<Coordinate>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
