use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::{
    error::RouteError,
    models::{GeoPoint, RouteSummary},
};

const REPORT_HEADER: &str = "=== GPS Distance Calculation Results ===";

/// Plain-text summary of a route, one line per waypoint.
pub fn render_report(
    points: &[GeoPoint],
    summary: &RouteSummary,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "{REPORT_HEADER}\n");
    let _ = writeln!(
        out,
        "Generated on: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Start Time: {}", summary.start_label());
    let _ = writeln!(out, "End Time: {}", summary.end_label());
    let _ = writeln!(out, "Travel Time: {:.1} hours", summary.travel_hours());
    let _ = writeln!(
        out,
        "Total Distance: {:.2} nautical miles",
        summary.total_distance_nm
    );
    let _ = writeln!(out, "Average Speed: {:.2} knots\n", summary.average_speed_knots);
    let _ = writeln!(out, "List of Points (Latitude, Longitude):");
    for (i, point) in points.iter().enumerate() {
        let _ = writeln!(
            out,
            "  Point {}: {:.6}, {:.6}",
            i + 1,
            point.lat(),
            point.lon()
        );
    }
    out
}

pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    format!("gps_results_{}.txt", generated_at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Write the report into `dir` and return the file path.
pub fn write_report(
    dir: impl AsRef<Path>,
    points: &[GeoPoint],
    summary: &RouteSummary,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, RouteError> {
    let path = dir.as_ref().join(report_file_name(generated_at));
    fs::write(&path, render_report(points, summary, generated_at))
        .map_err(RouteError::io(&path))?;
    tracing::info!("results saved to {}", path.display());
    Ok(path)
}
