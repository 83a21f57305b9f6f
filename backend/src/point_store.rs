use std::{fs, path::Path};

use crate::{
    error::{ParseWarning, RouteError, ValidationError},
    models::GeoPoint,
};

/// Ordered, append-only list of validated waypoints.
///
/// Points are never reordered or deduplicated; the append order is the
/// travel path.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Vec<GeoPoint>,
}

/// Outcome of a bulk load: what was appended and which lines were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub added: Vec<GeoPoint>,
    pub warnings: Vec<ParseWarning>,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, lat: f64, lon: f64) -> Result<GeoPoint, ValidationError> {
        let point = GeoPoint::new(lat, lon)?;
        self.points.push(point);
        Ok(point)
    }

    /// Append every valid `lat,lon` line in order.
    ///
    /// Empty lines and headers (anything starting with `lat`, any case) are
    /// ignored. Bad lines are recorded as warnings and skipped; they never
    /// abort the load.
    pub fn load_from_text<I, S>(&mut self, lines: I) -> LoadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = LoadReport::default();

        for (index, raw) in lines.into_iter().enumerate() {
            let line = raw.as_ref().trim();
            if line.is_empty() || is_header(line) {
                continue;
            }
            let line_number = index + 1;

            let Some((lat, lon)) = parse_coordinates(line) else {
                report.warnings.push(ParseWarning::MalformedLine {
                    line: line_number,
                    content: line.to_string(),
                });
                continue;
            };

            match self.add_point(lat, lon) {
                Ok(point) => report.added.push(point),
                Err(source) => report.warnings.push(ParseWarning::OutOfRange {
                    line: line_number,
                    source,
                }),
            }
        }

        tracing::debug!(
            "loaded {} point(s), skipped {} line(s)",
            report.added.len(),
            report.warnings.len()
        );
        report
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, RouteError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(RouteError::io(path))?;
        Ok(self.load_from_text(contents.lines()))
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

/// Split `lat, lon` into two floats. `None` unless there are exactly two
/// numeric fields; range is not checked here.
pub fn parse_coordinates(text: &str) -> Option<(f64, f64)> {
    let mut fields = text.split(',');
    let lat = fields.next()?.trim().parse::<f64>().ok()?;
    let lon = fields.next()?.trim().parse::<f64>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((lat, lon))
}

fn is_header(line: &str) -> bool {
    line.get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("lat"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_point_appends_in_order() {
        let mut store = PointStore::new();
        store.add_point(40.7128, -74.0060).unwrap();
        store.add_point(51.5074, -0.1278).unwrap();
        store.add_point(40.7128, -74.0060).unwrap();

        assert_eq!(store.count(), 3);
        assert_eq!(store.points()[0], store.points()[2]);
        assert_eq!(store.points()[1].lat(), 51.5074);
    }

    #[test]
    fn add_point_rejects_out_of_range() {
        let mut store = PointStore::new();
        let err = store.add_point(91.0, 0.0).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn load_with_header_keeps_file_order() {
        let mut store = PointStore::new();
        let report = store.load_from_text([
            "Latitude,Longitude",
            "40.0,70.0",
            "41.5, 71.25",
            "",
            "-12.0,-45.0",
        ]);

        assert!(report.warnings.is_empty());
        assert_eq!(report.added.len(), 3);
        assert_eq!(store.count(), 3);
        let lats: Vec<f64> = store.points().iter().map(|p| p.lat()).collect();
        assert_eq!(lats, vec![40.0, 41.5, -12.0]);
        assert_eq!(store.points()[1].lon(), 71.25);
    }

    #[test]
    fn load_collects_warnings_and_continues() {
        let mut store = PointStore::new();
        let report = store.load_from_text(["40.0,70.0", "bad,line", "91.0,10.0"]);

        assert_eq!(report.added, vec![GeoPoint::new(40.0, 70.0).unwrap()]);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(
            report.warnings[0],
            ParseWarning::MalformedLine { line: 2, .. }
        ));
        assert!(matches!(
            report.warnings[1],
            ParseWarning::OutOfRange { line: 3, .. }
        ));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let mut store = PointStore::new();
        let report = store.load_from_text(["1.0,2.0,3.0", "5.0", "lat,lon"]);
        assert_eq!(report.warnings.len(), 2);
        assert!(report
            .warnings
            .iter()
            .all(|w| matches!(w, ParseWarning::MalformedLine { .. })));
    }

    #[test]
    fn load_appends_after_existing_points() {
        let mut store = PointStore::new();
        store.add_point(1.0, 1.0).unwrap();
        store.load_from_text(["2.0,2.0"]);
        assert_eq!(store.count(), 2);
        assert_eq!(store.points()[1].lat(), 2.0);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let mut store = PointStore::new();
        let err = store
            .load_from_file("/definitely/not/here/points.csv")
            .unwrap_err();
        assert!(matches!(err, RouteError::Io { .. }));
    }

    #[test]
    fn load_from_file_reads_lines() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lat,lon\n10.0,20.0\n11.0,21.0").unwrap();

        let mut store = PointStore::new();
        let report = store.load_from_file(file.path()).unwrap();
        assert_eq!(report.added.len(), 2);
        assert!(report.warnings.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_valid_point_increments_count(
                lat in -90.0..=90.0f64,
                lon in -180.0..=180.0f64,
                preload in 0usize..5
            ) {
                let mut store = PointStore::new();
                for _ in 0..preload {
                    store.add_point(0.0, 0.0).unwrap();
                }
                let before = store.count();
                prop_assert!(store.add_point(lat, lon).is_ok());
                prop_assert_eq!(store.count(), before + 1);
            }

            #[test]
            fn prop_out_of_range_leaves_store_unchanged(
                lat in prop_oneof![90.000001..1e6f64, -1e6..-90.000001f64],
                lon in -180.0..=180.0f64
            ) {
                let mut store = PointStore::new();
                store.add_point(0.0, 0.0).unwrap();
                let err = store.add_point(lat, lon).unwrap_err();
                prop_assert!(
                    matches!(err, ValidationError::OutOfRange { .. }),
                    "unexpected error: {:?}",
                    err
                );
                let err = store.add_point(lon.clamp(-90.0, 90.0), lat * 2.0).unwrap_err();
                prop_assert!(
                    matches!(err, ValidationError::OutOfRange { .. }),
                    "unexpected error: {:?}",
                    err
                );
                prop_assert_eq!(store.count(), 1);
            }
        }
    }
}
