use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde_json::json;
use tokio::task::JoinHandle;

use crate::{
    error::RouteError,
    models::{GeoPoint, RouteSummary},
};

const MAP_FILE_NAME: &str = "gps_distance_map.html";
const INITIAL_ZOOM: u8 = 5;
const LEAFLET_VERSION: &str = "1.9.4";

pub fn default_map_path() -> PathBuf {
    env::temp_dir().join(MAP_FILE_NAME)
}

/// Standalone Leaflet page: one marker per waypoint, the route polyline and a
/// summary marker on the first point. Tiles come from OpenStreetMap.
pub fn render_map_html(points: &[GeoPoint], summary: &RouteSummary) -> String {
    let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.lat(), p.lon()]).collect();
    let center = match (points.first(), points.last()) {
        (Some(first), Some(last)) => [
            (first.lat() + last.lat()) / 2.0,
            (first.lon() + last.lon()) / 2.0,
        ],
        _ => [0.0, 0.0],
    };
    let popups: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "Point {}<br>Lat: {:.4}<br>Lon: {:.4}",
                i + 1,
                p.lat(),
                p.lon()
            )
        })
        .collect();

    let data = json!({
        "center": center,
        "zoom": INITIAL_ZOOM,
        "coords": coords,
        "popups": popups,
        "summary": summary_html(summary),
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>GPS Distance Map</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const data = {data};
const map = L.map("map").setView(data.center, data.zoom);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
data.coords.forEach((c, i) => L.marker(c).bindPopup(data.popups[i]).addTo(map));
if (data.coords.length > 1) {{
  L.polyline(data.coords, {{ color: "blue", weight: 3, opacity: 0.8 }}).bindPopup("Route").addTo(map);
}}
if (data.coords.length > 0) {{
  L.circleMarker(data.coords[0], {{ color: "green", radius: 10 }})
    .bindPopup(data.summary, {{ maxWidth: 300 }})
    .addTo(map);
}}
</script>
</body>
</html>
"#
    )
}

fn summary_html(summary: &RouteSummary) -> String {
    format!(
        "<div style=\"font-family: Arial; font-size: 14px; font-weight: bold;\">\
         <strong>Total Distance:</strong> {:.2} nmi<br>\
         <strong>Start Time:</strong> {}<br>\
         <strong>End Time:</strong> {}<br>\
         <strong>Travel Time:</strong> {:.1} h<br>\
         <strong>Average Speed:</strong> {:.2} knots<br>\
         <strong>Points:</strong> {} total</div>",
        summary.total_distance_nm,
        summary.start_label(),
        summary.end_label(),
        summary.travel_hours(),
        summary.average_speed_knots,
        summary.point_count
    )
}

pub fn write_map(
    path: impl AsRef<Path>,
    points: &[GeoPoint],
    summary: &RouteSummary,
) -> Result<PathBuf, RouteError> {
    let path = path.as_ref();
    fs::write(path, render_map_html(points, summary)).map_err(RouteError::io(path))?;
    tracing::info!("map saved to {}", path.display());
    Ok(path.to_path_buf())
}

/// Write the map on the blocking pool. The handle resolves to the written
/// path or the failure; callers must await it to learn the outcome.
pub fn spawn_map_export(
    points: Vec<GeoPoint>,
    summary: RouteSummary,
    path: PathBuf,
) -> JoinHandle<Result<PathBuf, RouteError>> {
    tokio::task::spawn_blocking(move || write_map(&path, &points, &summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<GeoPoint>, RouteSummary) {
        let points = vec![
            GeoPoint::new(10.0, 20.0).unwrap(),
            GeoPoint::new(12.0, 24.0).unwrap(),
        ];
        let summary = RouteSummary {
            total_distance_nm: 267.5,
            average_speed_knots: 0.0,
            point_count: 2,
            window: None,
        };
        (points, summary)
    }

    #[test]
    fn html_contains_route_and_summary() {
        let (points, summary) = sample();
        let html = render_map_html(&points, &summary);

        assert!(html.contains(r#""center":[11.0,22.0]"#));
        assert!(html.contains(r#""coords":[[10.0,20.0],[12.0,24.0]]"#));
        assert!(html.contains("Point 2<br>Lat: 12.0000<br>Lon: 24.0000"));
        assert!(html.contains("267.50 nmi"));
        assert!(html.contains("Start Time:</strong> N/A"));
        assert!(html.contains("{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"));
    }

    #[tokio::test]
    async fn background_export_reports_path() {
        let (points, summary) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MAP_FILE_NAME);

        let written = spawn_map_export(points, summary, path.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(written, path);
        assert!(fs::read_to_string(&path).unwrap().contains("L.polyline"));
    }

    #[tokio::test]
    async fn background_export_surfaces_failure() {
        let (points, summary) = sample();
        let path = PathBuf::from("/definitely/not/here").join(MAP_FILE_NAME);

        let result = spawn_map_export(points, summary, path).await.unwrap();
        assert!(matches!(result, Err(RouteError::Io { .. })));
    }
}
