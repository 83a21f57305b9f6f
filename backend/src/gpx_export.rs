use std::{fs::File, io::BufWriter, path::Path};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::RouteError;
use crate::models::GeoPoint;

const CREATOR: &str = "gps_speed";

pub fn build_gpx(points: &[GeoPoint]) -> Gpx {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some("Route".into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    segment.points.extend(points.iter().map(to_waypoint));
    track.segments.push(segment);
    gpx.tracks.push(track);
    gpx
}

pub fn encode_route_as_gpx(points: &[GeoPoint]) -> Result<String, RouteError> {
    let mut buffer = Vec::new();
    gpx::write(&build_gpx(points), &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

pub fn write_route_gpx(path: impl AsRef<Path>, points: &[GeoPoint]) -> Result<(), RouteError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(RouteError::io(path))?;
    gpx::write(&build_gpx(points), BufWriter::new(file))?;
    tracing::info!("GPX track written to {}", path.display());
    Ok(())
}

fn to_waypoint(point: &GeoPoint) -> Waypoint {
    Waypoint::new(Point::new(point.lon(), point.lat()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(43.2965, 5.3698).unwrap(),
            GeoPoint::new(43.1242, 5.928).unwrap(),
            GeoPoint::new(43.7102, 7.262).unwrap(),
        ]
    }

    #[test]
    fn track_keeps_point_order() {
        let gpx = build_gpx(&route());
        let points = &gpx.tracks[0].segments[0].points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].point().y(), 43.1242);
        assert_eq!(points[1].point().x(), 5.928);
    }

    #[test]
    fn encoded_payload_is_readable_gpx() {
        let encoded = encode_route_as_gpx(&route()).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        let parsed = gpx::read(bytes.as_slice()).unwrap();
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.tracks[0].segments[0].points.len(), 3);
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.gpx");
        write_route_gpx(&path, &route()).unwrap();
        let parsed = gpx::read(File::open(&path).unwrap()).unwrap();
        assert_eq!(parsed.creator.as_deref(), Some(CREATOR));
    }
}
