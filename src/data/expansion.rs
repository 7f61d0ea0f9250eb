use super::types::{InputPath, PointPairStream, Site, SiteStream, TargetSource, TargetStream};
use super::{validate_latitude, validate_longitude};
use crate::error::InputError;
use crate::geo::GeoPoint;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::iter::Enumerate;
use std::sync::Arc;

fn parse_delimited_line(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn open_input(input_path: &InputPath) -> io::Result<Box<dyn BufRead>> {
    match input_path {
        InputPath::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
        InputPath::File(path) => {
            let file = File::open(path)?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Non-empty, non-comment lines of an input together with their 1-based line
/// numbers. Stops after the first read error.
struct RecordLines {
    source_name: String,
    lines: Enumerate<Lines<Box<dyn BufRead>>>,
    finished: bool,
}

impl RecordLines {
    fn open(input_path: &InputPath) -> Result<Self, InputError> {
        let source_name = input_path.display_name();
        let reader = open_input(input_path).map_err(|e| InputError::Open {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source_name,
            lines: reader.lines().enumerate(),
            finished: false,
        })
    }
}

impl Iterator for RecordLines {
    type Item = Result<(usize, String), InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for (idx, line_result) in self.lines.by_ref() {
            let line_number = idx + 1;
            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(InputError::Read {
                        source_name: self.source_name.clone(),
                        line: line_number,
                        message: e.to_string(),
                    }));
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(Ok((line_number, trimmed.to_string())));
        }

        self.finished = true;
        None
    }
}

/// Maps parsed lines through `parse`, ending the stream after the first error.
fn parse_records<T, F>(
    lines: RecordLines,
    mut parse: F,
) -> Box<dyn Iterator<Item = Result<T, InputError>>>
where
    T: 'static,
    F: FnMut(&str, usize, &str) -> Result<T, InputError> + 'static,
{
    let source_name = lines.source_name.clone();
    let mut failed = false;
    Box::new(lines.map_while(move |line_result| {
        if failed {
            return None;
        }
        let parsed =
            line_result.and_then(|(line_number, line)| parse(&source_name, line_number, &line));
        failed = parsed.is_err();
        Some(parsed)
    }))
}

fn parse_field(
    source_name: &str,
    line: usize,
    label: &'static str,
    raw: &str,
) -> Result<f64, InputError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| InputError::InvalidNumber {
            source_name: source_name.to_string(),
            line,
            label,
            value: raw.to_string(),
        })
}

fn parse_point(
    source_name: &str,
    line: usize,
    lat_raw: &str,
    lon_raw: &str,
) -> Result<GeoPoint, InputError> {
    let out_of_range = |message: String| InputError::OutOfRange {
        source_name: source_name.to_string(),
        line,
        message,
    };
    let lat = validate_latitude(parse_field(source_name, line, "latitude", lat_raw)?)
        .map_err(out_of_range)?;
    let lon = validate_longitude(parse_field(source_name, line, "longitude", lon_raw)?)
        .map_err(out_of_range)?;
    Ok(GeoPoint::new(lat, lon))
}

/// Number of points in `start..=end` by `step`. A step that does not divide
/// the span stops at the last point not past `end`.
fn range_point_count(start: f64, end: f64, step: f64) -> usize {
    if step == 0.0 || start == end {
        1
    } else {
        // slack for spans like 0.3 / 0.1 that land just below an integer
        ((end - start) / step + 1e-9).floor() as usize + 1
    }
}

fn coord_range_iter(start: f64, end: f64, step: f64) -> Box<dyn Iterator<Item = f64>> {
    let count = range_point_count(start, end, step);
    Box::new((0..count).map(move |i| (start + i as f64 * step).min(end)))
}

pub fn expand_target_source(source: TargetSource) -> Result<TargetStream, InputError> {
    match source {
        TargetSource::Single(lat, lon) => {
            Ok(Box::new(std::iter::once(Ok(GeoPoint::new(lat, lon)))))
        }
        TargetSource::Range { lat, lon } => {
            let lat_count = range_point_count(lat.0, lat.1, lat.2);
            let lon_count = range_point_count(lon.0, lon.1, lon.2);

            // Materialize the smaller dimension so it can be repeated cheaply.
            // Latitude stays the outer loop so output order does not depend on
            // which side is collected.
            if lon_count <= lat_count {
                let lons = Arc::new(coord_range_iter(lon.0, lon.1, lon.2).collect::<Vec<f64>>());
                Ok(Box::new(coord_range_iter(lat.0, lat.1, lat.2).flat_map(
                    move |lat| {
                        let lons = Arc::clone(&lons);
                        (0..lons.len()).map(move |idx| Ok(GeoPoint::new(lat, lons[idx])))
                    },
                )))
            } else {
                let lats = coord_range_iter(lat.0, lat.1, lat.2).collect::<Vec<f64>>();
                let (lon_start, lon_end, lon_step) = lon;
                Ok(Box::new(lats.into_iter().flat_map(move |lat| {
                    coord_range_iter(lon_start, lon_end, lon_step)
                        .map(move |lon| Ok(GeoPoint::new(lat, lon)))
                })))
            }
        }
        TargetSource::File(input_path) => {
            let lines = RecordLines::open(&input_path)?;
            Ok(parse_records(lines, |source_name, line_number, line| {
                let parts = parse_delimited_line(line);
                if parts.len() != 2 {
                    return Err(InputError::FieldCount {
                        source_name: source_name.to_string(),
                        line: line_number,
                        expected: "2 fields (lat lon)",
                        found: parts.len(),
                    });
                }
                parse_point(source_name, line_number, parts[0], parts[1])
            }))
        }
    }
}

/// Pairs a fixed origin with every target of `targets`.
pub fn expand_separate(
    origin: GeoPoint,
    targets: TargetSource,
) -> Result<PointPairStream, InputError> {
    let stream = expand_target_source(targets)?;
    Ok(Box::new(
        stream.map(move |target| target.map(|target| (origin, target))),
    ))
}

pub fn expand_paired_file(input_path: InputPath) -> Result<PointPairStream, InputError> {
    let lines = RecordLines::open(&input_path)?;
    Ok(parse_records(lines, |source_name, line_number, line| {
        let parts = parse_delimited_line(line);
        if parts.len() != 4 {
            return Err(InputError::FieldCount {
                source_name: source_name.to_string(),
                line: line_number,
                expected: "4 fields (lat1 lon1 lat2 lon2)",
                found: parts.len(),
            });
        }
        let origin = parse_point(source_name, line_number, parts[0], parts[1])?;
        let target = parse_point(source_name, line_number, parts[2], parts[3])?;
        Ok((origin, target))
    }))
}

/// Reads `lat,lon,name[,category]` lines. Whitespace-separated lines carry no
/// category and take every field after the coordinates as the name.
pub fn expand_site_file(input_path: InputPath) -> Result<SiteStream, InputError> {
    let lines = RecordLines::open(&input_path)?;
    Ok(parse_records(lines, |source_name, line_number, line| {
        let comma_separated = line.contains(',');
        let parts = parse_delimited_line(line);
        if parts.len() < 3 {
            return Err(InputError::FieldCount {
                source_name: source_name.to_string(),
                line: line_number,
                expected: "at least 3 fields (lat lon name)",
                found: parts.len(),
            });
        }

        let point = parse_point(source_name, line_number, parts[0], parts[1])?;
        let (name, category) = if comma_separated {
            let category = parts[3..].join(",");
            let category = category.trim();
            (
                parts[2].to_string(),
                (!category.is_empty()).then(|| category.to_string()),
            )
        } else {
            (parts[2..].join(" "), None)
        };

        if name.is_empty() {
            return Err(InputError::EmptyName {
                source_name: source_name.to_string(),
                line: line_number,
            });
        }

        Ok(Site {
            point,
            name,
            category,
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_input(contents: &str) -> (tempfile::TempDir, InputPath) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("input.txt");
        let mut file = File::create(&path).expect("create input file");
        file.write_all(contents.as_bytes()).expect("write input");
        (dir, InputPath::File(path))
    }

    #[test]
    fn range_with_fixed_longitude_handles_single_step() {
        let source = TargetSource::Range {
            lat: (52.0, 53.0, 1.0),
            lon: (13.4, 13.4, 0.0),
        };

        let targets = expand_target_source(source)
            .expect("expand range")
            .collect::<Result<Vec<_>, _>>()
            .expect("collect targets");

        assert_eq!(targets.len(), 2);
        assert!(
            targets
                .iter()
                .all(|p| (p.longitude - 13.4).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn range_stops_before_overshooting_end() {
        let source = TargetSource::Range {
            lat: (80.0, 90.0, 6.0),
            lon: (0.0, 0.0, 0.0),
        };
        let lats: Vec<f64> = expand_target_source(source)
            .expect("expand range")
            .map(|p| p.expect("target").latitude)
            .collect();
        assert_eq!(lats, vec![80.0, 86.0]);
    }

    #[test]
    fn range_count_matches_emitted_points() {
        for (start, end, step) in [
            (0.0, 1.0, 0.3),
            (0.0, 0.3, 0.1),
            (-90.0, 90.0, 7.0),
            (50.0, 60.0, 0.1),
            (10.0, 10.0, 0.0),
        ] {
            let values: Vec<f64> = coord_range_iter(start, end, step).collect();
            assert_eq!(values.len(), range_point_count(start, end, step));
            assert!(values.iter().all(|v| *v >= start && *v <= end), "{values:?}");
        }
        assert_eq!(range_point_count(0.0, 0.3, 0.1), 4);
        assert_eq!(range_point_count(50.0, 60.0, 0.1), 101);
        assert_eq!(range_point_count(-90.0, 90.0, 7.0), 26);
    }

    #[test]
    fn range_order_is_latitude_major() {
        for source in [
            TargetSource::Range {
                lat: (0.0, 1.0, 1.0),
                lon: (10.0, 12.0, 1.0),
            },
            TargetSource::Range {
                lat: (0.0, 2.0, 1.0),
                lon: (10.0, 11.0, 1.0),
            },
        ] {
            let targets = expand_target_source(source)
                .expect("expand range")
                .collect::<Result<Vec<_>, _>>()
                .expect("collect targets");
            let mut sorted = targets.clone();
            sorted.sort_by(|a, b| {
                a.latitude
                    .total_cmp(&b.latitude)
                    .then(a.longitude.total_cmp(&b.longitude))
            });
            assert_eq!(targets, sorted);
            assert_eq!(targets.len(), 6);
        }
    }

    #[test]
    fn target_file_skips_comments_and_blank_lines() {
        let (_dir, path) = write_input("# header\n\n52.0,13.4\n  48.85 2.35  \n");
        let targets = expand_target_source(TargetSource::File(path))
            .expect("open")
            .collect::<Result<Vec<_>, _>>()
            .expect("parse");
        assert_eq!(
            targets,
            vec![GeoPoint::new(52.0, 13.4), GeoPoint::new(48.85, 2.35)]
        );
    }

    #[test]
    fn target_file_reports_line_and_stops() {
        let (_dir, path) = write_input("52.0,13.4\n95.0,13.4\n10.0,10.0\n");
        let results: Vec<_> = expand_target_source(TargetSource::File(path))
            .expect("open")
            .collect();
        assert_eq!(results.len(), 2);
        let err = results[1].clone().expect_err("second line out of range");
        assert!(err.to_string().ends_with(":2: Latitude must be between -90 and 90 degrees, got 95"));
    }

    #[test]
    fn target_file_rejects_paired_lines() {
        let (_dir, path) = write_input("1 2 3 4\n");
        let mut stream = expand_target_source(TargetSource::File(path)).expect("open");
        let err = stream.next().expect("one item").expect_err("field count");
        assert!(matches!(err, InputError::FieldCount { found: 4, .. }));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let path = InputPath::File("/nonexistent/sitedist/targets.txt".into());
        let err = expand_target_source(TargetSource::File(path))
            .err()
            .expect("open must fail");
        assert!(matches!(err, InputError::Open { .. }));
    }

    #[test]
    fn paired_file_reads_both_points() {
        let (_dir, path) = write_input("39.2594709 -77.5641585 38.9072 -77.0369\n");
        let pairs = expand_paired_file(path)
            .expect("open")
            .collect::<Result<Vec<_>, _>>()
            .expect("parse");
        assert_eq!(
            pairs,
            vec![(
                GeoPoint::new(39.2594709, -77.5641585),
                GeoPoint::new(38.9072, -77.0369)
            )]
        );
    }

    #[test]
    fn paired_file_reports_invalid_number() {
        let (_dir, path) = write_input("1,2,abc,4\n");
        let err = expand_paired_file(path)
            .expect("open")
            .next()
            .expect("one item")
            .expect_err("invalid latitude");
        assert!(matches!(
            err,
            InputError::InvalidNumber { line: 1, label: "latitude", ref value, .. } if value == "abc"
        ));
    }

    #[test]
    fn site_file_reads_names_and_categories() {
        let (_dir, path) = write_input(
            "38.9,-77.0,Blue Plains,Waste,Water\n39.0,-77.1,Chalk Point\n39.1 -77.2 Old Mine Road\n",
        );
        let sites = expand_site_file(path)
            .expect("open")
            .collect::<Result<Vec<_>, _>>()
            .expect("parse");

        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0].name, "Blue Plains");
        assert_eq!(sites[0].category.as_deref(), Some("Waste,Water"));
        assert_eq!(sites[1].name, "Chalk Point");
        assert_eq!(sites[1].category, None);
        assert_eq!(sites[2].name, "Old Mine Road");
        assert_eq!(sites[2].category, None);
    }

    #[test]
    fn site_file_requires_a_name() {
        let (_dir, path) = write_input("38.9,-77.0,,Waste\n");
        let err = expand_site_file(path)
            .expect("open")
            .next()
            .expect("one item")
            .expect_err("empty name");
        assert!(matches!(err, InputError::EmptyName { line: 1, .. }));
    }
}
