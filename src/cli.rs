//! Command-line parsing and validation.

use crate::data::{
    self, Command, DataSource, InputPath, OutputFormat, Parameters, Rank, TargetSource,
    config::DEFAULT_SITE_RADIUS_KM,
};
use crate::error::CliError;
use crate::geo::GeoPoint;
use std::collections::HashSet;
use std::path::PathBuf;

type CliResult<T> = Result<T, CliError>;

type ApplyFn = fn(Option<&str>, &mut Parameters) -> CliResult<()>;

enum OptKind {
    Value(ApplyFn),
    Flag(ApplyFn),
}

struct OptionSpec {
    name: &'static str,
    kind: OptKind,
}

const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec {
        name: "format",
        kind: OptKind::Value(|value, params| {
            let v = required_value("format", value)?;
            params.output.format = v.parse::<OutputFormat>().map_err(CliError::from)?;
            Ok(())
        }),
    },
    OptionSpec {
        name: "origin-height",
        kind: OptKind::Value(|value, params| {
            let v = required_value("origin-height", value)?;
            params.heights.origin = parse_f64("origin-height", v)?;
            Ok(())
        }),
    },
    OptionSpec {
        name: "target-height",
        kind: OptKind::Value(|value, params| {
            let v = required_value("target-height", value)?;
            params.heights.target = parse_f64("target-height", v)?;
            Ok(())
        }),
    },
    OptionSpec {
        name: "radius",
        kind: OptKind::Value(|value, params| {
            let v = required_value("radius", value)?;
            let radius = parse_f64("radius", v)?;
            if radius.is_nan() || radius < 0.0 {
                return Err(format!("Radius must be a non-negative number, got {}", v).into());
            }
            params.selection.radius = Some(radius);
            Ok(())
        }),
    },
    OptionSpec {
        name: "limit",
        kind: OptKind::Value(|value, params| {
            let v = required_value("limit", value)?;
            let limit = v
                .parse::<usize>()
                .map_err(|_| CliError::from(format!("Invalid limit value: {}", v)))?;
            params.selection.limit = Some(limit);
            Ok(())
        }),
    },
    OptionSpec {
        name: "rank",
        kind: OptKind::Value(|value, params| {
            let v = required_value("rank", value)?;
            params.selection.rank = v.parse::<Rank>().map_err(CliError::from)?;
            Ok(())
        }),
    },
    OptionSpec {
        name: "category",
        kind: OptKind::Value(|value, params| {
            let v = required_value("category", value)?;
            params.selection.categories.extend(
                v.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
            );
            Ok(())
        }),
    },
    OptionSpec {
        name: "headers",
        kind: OptKind::Flag(|_, params| {
            params.output.headers = true;
            Ok(())
        }),
    },
    OptionSpec {
        name: "no-headers",
        kind: OptKind::Flag(|_, params| {
            params.output.headers = false;
            Ok(())
        }),
    },
    OptionSpec {
        name: "show-inputs",
        kind: OptKind::Flag(|_, params| {
            params.output.show_inputs = Some(true);
            Ok(())
        }),
    },
    OptionSpec {
        name: "no-show-inputs",
        kind: OptKind::Flag(|_, params| {
            params.output.show_inputs = Some(false);
            Ok(())
        }),
    },
    OptionSpec {
        name: "perf",
        kind: OptKind::Flag(|_, params| {
            params.perf = true;
            Ok(())
        }),
    },
    OptionSpec {
        name: "help",
        kind: OptKind::Flag(|_, _| Err(CliError::Exit(get_help_text()))),
    },
    OptionSpec {
        name: "version",
        kind: OptKind::Flag(|_, _| Err(CliError::Exit(get_version_text()))),
    },
];

pub fn parse_cli(args: Vec<String>) -> CliResult<(DataSource, Command, Parameters)> {
    if args.len() < 2 {
        return Err(CliError::Exit(
            "Usage: sitedist [OPTIONS] <lat> <lon> <target...> <measure|sites>".to_string(),
        ));
    }

    let mut params = Parameters::default();
    let mut positional = Vec::new();
    let mut applied_options: HashSet<&'static str> = HashSet::new();

    for arg in args.into_iter().skip(1) {
        if let Some(stripped) = arg.strip_prefix("--") {
            let (name, value) = stripped
                .split_once('=')
                .map(|(n, v)| (n, Some(v)))
                .unwrap_or((stripped, None));
            apply_option(name, value, &mut params, &mut applied_options)?;
        } else {
            positional.push(arg);
        }
    }

    if let Some(first) = positional.first()
        && first == "help"
    {
        let message = positional
            .get(1)
            .map(|command| get_command_help(command))
            .unwrap_or_else(get_help_text);
        return Err(CliError::Exit(message));
    }

    let (command, data_source) = parse_positional_args(&positional)?;

    validate_command_options(command, &applied_options)?;

    if params.output.show_inputs.is_none() {
        params.output.show_inputs = Some(should_auto_show_inputs(&data_source));
    }

    Ok((data_source, command, params))
}

fn parse_f64(label: &str, value: &str) -> CliResult<f64> {
    value.parse::<f64>().map_err(|_| {
        CliError::from(format!(
            "Invalid {} value: {}",
            label.replace('-', " "),
            value
        ))
    })
}

fn apply_option(
    name: &str,
    value: Option<&str>,
    params: &mut Parameters,
    applied: &mut HashSet<&'static str>,
) -> CliResult<()> {
    let Some(spec) = OPTION_SPECS.iter().find(|s| s.name == name) else {
        return Err(format!("Unknown option: --{}", name).into());
    };

    match spec.kind {
        OptKind::Value(handler) => {
            let val = required_value(spec.name, value)?;
            handler(Some(val), params)?;
        }
        OptKind::Flag(handler) => {
            if value.is_some() {
                return Err(format!("Option --{} does not take a value", spec.name).into());
            }
            handler(None, params)?;
        }
    }

    applied.insert(spec.name);
    Ok(())
}

fn required_value<'a>(flag: &'static str, value: Option<&'a str>) -> CliResult<&'a str> {
    value.ok_or_else(|| CliError::from(format!("Option --{} requires a value", flag)))
}

fn parse_file_arg(arg: &str) -> CliResult<InputPath> {
    let Some(stripped) = arg.strip_prefix('@') else {
        return Err("Not a file argument".into());
    };

    if stripped == "-" {
        return Ok(InputPath::Stdin);
    }
    if stripped.is_empty() {
        return Err("Missing file name after '@'".into());
    }

    Ok(InputPath::File(PathBuf::from(stripped)))
}

fn parse_origin(lat_str: &str, lon_str: &str) -> CliResult<GeoPoint> {
    if lat_str.starts_with('@') || lon_str.starts_with('@') {
        return Err("Origin must be given as <lat> <lon>, not as a file".into());
    }
    if lat_str.contains(':') || lon_str.contains(':') {
        return Err("Origin must be a single coordinate, not a range".into());
    }

    let lat_value = lat_str
        .parse::<f64>()
        .map_err(|_| CliError::from(format!("Invalid latitude: {}", lat_str)))?;
    let lon_value = lon_str
        .parse::<f64>()
        .map_err(|_| CliError::from(format!("Invalid longitude: {}", lon_str)))?;
    let lat = data::validate_latitude(lat_value).map_err(CliError::from)?;
    let lon = data::validate_longitude(lon_value).map_err(CliError::from)?;
    Ok(GeoPoint::new(lat, lon))
}

fn parse_target_args(lat_str: &str, lon_str: &str) -> CliResult<TargetSource> {
    if lat_str.starts_with('@') || lon_str.starts_with('@') {
        return Err("Target files are given as a single @file argument".into());
    }

    let lat_range = match parse_range(lat_str)? {
        Some(range) => Some(data::validate_latitude_range(range).map_err(CliError::from)?),
        None => None,
    };
    let lon_range = match parse_range(lon_str)? {
        Some(range) => Some(data::validate_longitude_range(range).map_err(CliError::from)?),
        None => None,
    };

    let single_lat = || -> CliResult<f64> {
        let value = lat_str
            .parse::<f64>()
            .map_err(|_| CliError::from(format!("Invalid latitude: {}", lat_str)))?;
        data::validate_latitude(value).map_err(CliError::from)
    };
    let single_lon = || -> CliResult<f64> {
        let value = lon_str
            .parse::<f64>()
            .map_err(|_| CliError::from(format!("Invalid longitude: {}", lon_str)))?;
        data::validate_longitude(value).map_err(CliError::from)
    };

    match (lat_range, lon_range) {
        (Some(lat), Some(lon)) => Ok(TargetSource::Range { lat, lon }),
        (Some(lat), None) => {
            let lon = single_lon()?;
            Ok(TargetSource::Range {
                lat,
                lon: (lon, lon, 0.0),
            })
        }
        (None, Some(lon)) => {
            let lat = single_lat()?;
            Ok(TargetSource::Range {
                lat: (lat, lat, 0.0),
                lon,
            })
        }
        (None, None) => Ok(TargetSource::Single(single_lat()?, single_lon()?)),
    }
}

fn parse_positional_args(positional_args: &[String]) -> CliResult<(Command, DataSource)> {
    if positional_args.is_empty() {
        return Err("Need at least command and one argument".into());
    }

    let command_index = positional_args
        .iter()
        .position(|arg| arg == "measure" || arg == "sites")
        .ok_or("No command found".to_string())?;

    let command = match positional_args[command_index].as_str() {
        "measure" => Command::Measure,
        "sites" => Command::Sites,
        other => return Err(format!("Unknown command: {}", other).into()),
    };

    if command_index + 1 < positional_args.len() {
        return Err(format!(
            "Unexpected argument after command: {}",
            positional_args[command_index + 1]
        )
        .into());
    }

    let data_args = &positional_args[..command_index];
    if data_args.is_empty() {
        return Err("Need at least command and one argument".into());
    }

    let data_source = match command {
        Command::Measure => parse_measure_source(data_args)?,
        Command::Sites => parse_sites_source(data_args)?,
    };

    Ok((command, data_source))
}

fn parse_measure_source(args: &[String]) -> CliResult<DataSource> {
    match args.len() {
        1 => {
            let arg = &args[0];
            if arg.starts_with('@') {
                Ok(DataSource::Paired(parse_file_arg(arg)?))
            } else {
                Err("Single argument must be a file (@file or @-)".into())
            }
        }
        2 => Err(
            "Two arguments: give an origin and a target (lat lon targetLat targetLon) or a target file (lat lon @targets.txt)"
                .into(),
        ),
        3 => {
            let origin = parse_origin(&args[0], &args[1])?;
            if !args[2].starts_with('@') {
                return Err("Third argument must be a target file (@file or @-)".into());
            }
            let targets = TargetSource::File(parse_file_arg(&args[2])?);
            Ok(DataSource::Separate(origin, targets))
        }
        4 => {
            let origin = parse_origin(&args[0], &args[1])?;
            let targets = parse_target_args(&args[2], &args[3])?;
            Ok(DataSource::Separate(origin, targets))
        }
        _ => Err("Too many arguments".into()),
    }
}

fn parse_sites_source(args: &[String]) -> CliResult<DataSource> {
    match args {
        [lat, lon, file] if file.starts_with('@') => {
            let origin = parse_origin(lat, lon)?;
            Ok(DataSource::Sites(origin, parse_file_arg(file)?))
        }
        _ => Err("The sites command expects <lat> <lon> @sites.csv".into()),
    }
}

fn parse_range(s: &str) -> Result<Option<(f64, f64, f64)>, CliError> {
    let Some((start_str, rest)) = s.split_once(':') else {
        return Ok(None);
    };
    let Some((end_str, step_str)) = rest.split_once(':') else {
        return Err(format!("Range must be start:end:step, got: {}", s).into());
    };

    let (start, end, step): (f64, f64, f64) = (
        start_str
            .parse()
            .map_err(|_| CliError::from(format!("Invalid range start: {}", start_str)))?,
        end_str
            .parse()
            .map_err(|_| CliError::from(format!("Invalid range end: {}", end_str)))?,
        step_str
            .parse()
            .map_err(|_| CliError::from(format!("Invalid range step: {}", step_str)))?,
    );

    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(format!("Range values must be finite numbers, got: {}", s).into());
    }
    if step <= 0.0 {
        return Err("Range step must be positive".into());
    }
    if start > end {
        return Err(format!("Range start {} is greater than end {}", start, end).into());
    }

    Ok(Some((start, end, step)))
}

fn should_auto_show_inputs(source: &DataSource) -> bool {
    matches!(source, DataSource::Paired(_))
}

fn get_version_text() -> String {
    format!(
        "sitedist {}\n Build: {} ({})\n Built: {}\n Features: {}",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TARGET"),
        env!("BUILD_DATE"),
        env!("BUILD_FEATURES")
    )
}

fn validate_command_options(command: Command, applied: &HashSet<&'static str>) -> CliResult<()> {
    if command == Command::Measure {
        for option in ["limit", "rank", "category"] {
            if applied.contains(option) {
                return Err(format!("Option --{} not valid for measure command", option).into());
            }
        }
    }

    Ok(())
}

fn get_help_text() -> String {
    let defaults = Parameters::default();
    let formats = OutputFormat::all().join(", ");
    format!(
        r#"sitedist {}
Calculates great-circle distances and pole-vector bearing angles from a location.

Usage:
  sitedist [OPTIONS] <latitude> <longitude> <targetLatitude> <targetLongitude> measure
  sitedist [OPTIONS] <latitude> <longitude> @targets.txt measure
  sitedist [OPTIONS] @pairs.txt measure
  sitedist [OPTIONS] <latitude> <longitude> @sites.csv sites

Examples:
  sitedist 39.2594709 -77.5641585 38.9072 -77.0369 measure
  sitedist 52.0 13.4 48:49:0.5 2:3:0.5 measure --format=csv
  sitedist 39.26 -77.56 @targets.txt measure --radius=100
  echo "52.0 13.4 48.85 2.35" | sitedist @- measure
  sitedist 39.26 -77.56 @sites.csv sites --limit=10 --rank=farthest

Arguments:
  <latitude>         Origin latitude in decimal degrees (-90 to +90).
  <longitude>        Origin longitude in decimal degrees (-180 to +180).
  <targetLatitude>   Target latitude: decimal degrees or range.
                       48.85           single coordinate
                       48:49:0.25      range from 48 to 49 in 0.25 steps
  <targetLongitude>  Target longitude: decimal degrees or range.

  File inputs:
    - Target files contain lat lon per line.
    - Pair files contain lat1 lon1 lat2 lon2 per line.
    - Site files contain lat,lon,name[,category] per line. Without commas,
      everything after lat lon is the name.
    - Files accept comma- or whitespace-separated fields.
    - Blank lines and lines starting with # are ignored.
    - Use @- to read from stdin.

Options:
  --format=<format>       Output format: {}. Default: {}
  --[no-]headers          Include headers in CSV output. Default: {}
  --[no-]show-inputs      Include origin coordinates in output. Auto-enabled
                          for pair files unless --no-show-inputs is used.
                          Text tables always show varying origins, and the
                          sites table always names its origin.
  --origin-height=<m>     Origin height above the ellipsoid in meters. Default: {}
  --target-height=<m>     Target height above the ellipsoid in meters. Default: {}
  --radius=<km>           Drop targets farther than this. measure: no limit,
                          sites: {} km by default.
  --perf                  Print performance statistics to stderr.
  --help                  Show this help message and exit.
  --version               Print version information and exit.

Commands:
  measure                 Distance and bearing angle to every target.
  sites                   Named sites around the origin, nearest first.

Run 'sitedist help <command>' for command-specific options.
Set RUST_LOG=debug for diagnostic logging.
"#,
        env!("CARGO_PKG_VERSION"),
        formats,
        defaults.output.format,
        defaults.output.headers,
        defaults.heights.origin,
        defaults.heights.target,
        DEFAULT_SITE_RADIUS_KM
    )
}

fn get_command_help(command: &str) -> String {
    match command {
        "measure" => r#"Usage:
  sitedist [OPTIONS] <latitude> <longitude> <targetLatitude> <targetLongitude> measure
  sitedist [OPTIONS] <latitude> <longitude> @targets.txt measure
  sitedist [OPTIONS] @pairs.txt measure

Calculates the great-circle distance (km, spherical Earth, R = 6373 km) and
the bearing angle between the vectors from both points to the reference pole
point (degrees, 0 to 360) for every target.

Options:
  --radius=<km>             Drop targets farther than this distance.
  --origin-height=<m>       Origin height above the ellipsoid in meters.
  --target-height=<m>       Target height above the ellipsoid in meters.

Examples:
  sitedist 39.2594709 -77.5641585 38.9072 -77.0369 measure
  sitedist 52.0 13.4 40:60:5 13.4 measure --format=csv
"#
        .to_string(),
        "sites" => format!(
            r#"Usage:
  sitedist [OPTIONS] <latitude> <longitude> @sites.csv sites

Lists named sites within a radius of the origin, sorted by distance.

Options:
  --radius=<km>             Search radius in kilometers. Default: {}
  --category=<a,b>          Keep sites whose category contains any of the
                            given names. Repeatable.
  --limit=<n>               Keep at most n sites.
  --rank=<rank>             Which end --limit keeps: nearest, farthest.
                            Default: {}

Examples:
  sitedist 39.26 -77.56 @sites.csv sites
  sitedist 39.26 -77.56 @sites.csv sites --radius=25 --category=Waste
  sitedist 39.26 -77.56 @sites.csv sites --limit=5 --rank=farthest
"#,
            DEFAULT_SITE_RADIUS_KM,
            Rank::Nearest
        ),
        _ => format!(
            "Unknown command: {}\n\nRun 'sitedist --help' for usage.",
            command
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sitedist")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_single_target() {
        let (source, command, params) =
            parse_cli(args(&["39.0", "-77.0", "38.9", "-77.1", "measure"])).unwrap();
        assert_eq!(command, Command::Measure);
        assert!(matches!(
            source,
            DataSource::Separate(origin, TargetSource::Single(lat, lon))
                if origin == GeoPoint::new(39.0, -77.0) && lat == 38.9 && lon == -77.1
        ));
        assert_eq!(params.output.show_inputs, Some(false));
    }

    #[test]
    fn range_with_fixed_longitude() {
        let (source, _, _) =
            parse_cli(args(&["52", "13", "40:50:5", "13.4", "measure"])).unwrap();
        assert!(matches!(
            source,
            DataSource::Separate(_, TargetSource::Range { lat, lon })
                if lat == (40.0, 50.0, 5.0) && lon == (13.4, 13.4, 0.0)
        ));
    }

    #[test]
    fn paired_file_enables_show_inputs() {
        let (source, _, params) = parse_cli(args(&["@pairs.txt", "measure"])).unwrap();
        assert!(matches!(source, DataSource::Paired(InputPath::File(_))));
        assert_eq!(params.output.show_inputs, Some(true));
    }

    #[test]
    fn sites_options_are_collected() {
        let (source, command, params) = parse_cli(args(&[
            "--category=Waste, Power",
            "--category=Mining",
            "39",
            "-77",
            "@-",
            "sites",
            "--limit=3",
            "--rank=farthest",
            "--radius=20",
        ]))
        .unwrap();
        assert_eq!(command, Command::Sites);
        assert!(matches!(source, DataSource::Sites(_, InputPath::Stdin)));
        assert_eq!(params.selection.categories, vec!["Waste", "Power", "Mining"]);
        assert_eq!(params.selection.limit, Some(3));
        assert_eq!(params.selection.rank, Rank::Farthest);
        assert_eq!(params.selection.radius, Some(20.0));
    }

    #[test]
    fn ranking_options_rejected_for_measure() {
        let err = parse_cli(args(&["39", "-77", "38", "-77", "measure", "--limit=3"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Option --limit not valid for measure command");
    }

    #[test]
    fn origin_must_be_single_point() {
        assert!(parse_cli(args(&["39:40:1", "-77", "38", "-77", "measure"])).is_err());
        assert!(parse_cli(args(&["@a.txt", "-77", "@b.txt", "measure"])).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_cli(args(&["95", "-77", "38", "-77", "measure"])).is_err());
        assert!(parse_cli(args(&["39", "-77", "38", "-77", "measure", "--radius=-1"])).is_err());
        assert!(parse_cli(args(&["39", "-77", "38", "-77", "measure", "--format=xml"])).is_err());
        assert!(parse_cli(args(&["39", "-77", "38:37:1", "-77", "measure"])).is_err());
        assert!(parse_cli(args(&["39", "-77", "38", "-77", "measure", "--perf=1"])).is_err());
        assert!(parse_cli(args(&["0", "0", "0:10:inf", "0", "measure"])).is_err());
        assert!(parse_cli(args(&["0", "0", "0:10:NaN", "0", "measure"])).is_err());
        assert!(parse_cli(args(&["0", "0", "0", "-inf:10:1", "measure"])).is_err());
        assert!(parse_cli(args(&["39", "-77", "38", "-77", "measure", "--bogus"])).is_err());
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        assert!(matches!(parse_cli(args(&["--help"])), Err(CliError::Exit(_))));
        assert!(matches!(parse_cli(args(&["--version"])), Err(CliError::Exit(_))));
        let Err(CliError::Exit(text)) = parse_cli(args(&["help", "sites"])) else {
            panic!("expected command help");
        };
        assert!(text.contains("--rank=<rank>"));
    }
}
