use std::path::PathBuf;

use clap::Parser;
use gps_speed::{
    error::RouteError,
    gpx_export::write_route_gpx,
    map_export::{default_map_path, spawn_map_export},
    models::TimeWindow,
    point_store::{PointStore, parse_coordinates},
    report::write_report,
    routing::{Metric, RouteCalculator},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Total distance and average speed over a list of GPS waypoints"
)]
struct Args {
    /// CSV/TXT file with one `lat,lon` pair per line (header line allowed)
    #[arg(long = "points", value_name = "FILE")]
    point_files: Vec<PathBuf>,

    /// Extra waypoint, appended after the files (e.g. "40.7128,-74.0060")
    #[arg(
        long = "point",
        value_name = "LAT,LON",
        value_parser = parse_point_arg,
        allow_hyphen_values = true
    )]
    points: Vec<(f64, f64)>,

    /// Start of travel, YYYY-MM-DD HH:MM
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// End of travel, YYYY-MM-DD HH:MM
    #[arg(long, requires = "start")]
    end: Option<String>,

    #[arg(long, value_enum, default_value_t = Metric::Wgs84)]
    metric: Metric,

    /// Directory receiving the gps_results_*.txt report
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,

    /// Where to write the HTML map (defaults to the temp directory)
    #[arg(long, conflicts_with = "no_map")]
    map: Option<PathBuf>,

    #[arg(long)]
    no_map: bool,

    /// Also export the route as a GPX track
    #[arg(long)]
    gpx: Option<PathBuf>,
}

fn parse_point_arg(value: &str) -> Result<(f64, f64), String> {
    parse_coordinates(value).ok_or_else(|| format!("expected 'lat,lon', got '{value}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut store = PointStore::new();
    for file in &args.point_files {
        let loaded = store.load_from_file(file)?;
        for warning in &loaded.warnings {
            tracing::warn!("{}: {warning}", file.display());
        }
        if loaded.added.is_empty() {
            tracing::warn!("no valid GPS points found in {}", file.display());
        } else {
            tracing::info!(
                "loaded {} point(s) from {}",
                loaded.added.len(),
                file.display()
            );
        }
    }
    for &(lat, lon) in &args.points {
        store.add_point(lat, lon)?;
    }
    tracing::info!("route has {} point(s)", store.count());

    let window = TimeWindow::from_optional(args.start.as_deref(), args.end.as_deref())?;
    if let Some(window) = &window {
        tracing::info!("{window}");
    }

    let calculator = RouteCalculator::new(args.metric);
    let summary = calculator.summarize(store.points(), window.as_ref())?;
    println!("{summary}");

    let map_task = (!args.no_map).then(|| {
        let path = args.map.clone().unwrap_or_else(default_map_path);
        spawn_map_export(store.points().to_vec(), summary.clone(), path)
    });

    let generated_at = chrono::Local::now().naive_local();
    let report_path = write_report(&args.report_dir, store.points(), &summary, generated_at)?;
    println!("Results saved to: {}", report_path.display());

    if let Some(gpx_path) = &args.gpx {
        write_route_gpx(gpx_path, store.points())?;
        println!("GPX track saved to: {}", gpx_path.display());
    }

    if let Some(task) = map_task {
        match task.await.map_err(RouteError::from).and_then(|written| written) {
            Ok(path) => println!("Map saved to: file://{}", path.display()),
            Err(err) => tracing::error!("failed to save map: {err}"),
        }
    }

    Ok(())
}
