//! Output formatting for CSV, JSON, text table and Parquet formats.

pub mod formatters;

use crate::compute::{CalculationResult, ResultStream};
use crate::data::{Command, DataSource, OutputFormat, Parameters, TargetSource};
use crate::error::OutputError;
use crate::geo::GeoPoint;
use crate::planner::OutputPlan;
use crate::table_format::{self, TableFormatter, VarianceFlags};
use formatters::{CsvFormatter, Formatter, JsonFormatter, TextFormatter};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, BufWriter, Write};

/// Rendered in place of a missing site category.
pub const NO_CATEGORY: &str = "no entry";

/// The columns of one output record, independent of the output format.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFields<'a> {
    pub origin: Option<GeoPoint>,
    pub target: GeoPoint,
    pub site: Option<SiteLabel<'a>>,
    pub distance_km: f64,
    pub angle_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLabel<'a> {
    pub name: &'a str,
    pub category: Option<&'a str>,
}

pub fn row_fields(result: &CalculationResult, show_inputs: bool) -> RowFields<'_> {
    let site = match result {
        CalculationResult::Measure(_) => None,
        CalculationResult::Site(s) => Some(SiteLabel {
            name: &s.site.name,
            category: s.site.category.as_deref(),
        }),
    };

    RowFields {
        origin: show_inputs.then(|| result.origin()),
        target: result.target(),
        site,
        distance_km: result.distance_km(),
        angle_deg: result.angle_deg(),
    }
}

pub fn csv_header(command: Command, show_inputs: bool) -> String {
    let mut columns = Vec::new();
    if show_inputs {
        columns.extend(["origin_latitude", "origin_longitude"]);
    }
    columns.extend(["latitude", "longitude"]);
    if command == Command::Sites {
        columns.extend(["name", "category"]);
    }
    columns.extend(["distance", "angle"]);
    columns.join(",")
}

fn csv_escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn write_csv_row<W: Write>(
    fields: &RowFields,
    command: Command,
    headers: bool,
    first: bool,
    writer: &mut W,
) -> io::Result<()> {
    if first && headers {
        writeln!(writer, "{}", csv_header(command, fields.origin.is_some()))?;
    }

    if let Some(origin) = fields.origin {
        write!(writer, "{:.5},{:.5},", origin.latitude, origin.longitude)?;
    }
    write!(
        writer,
        "{:.5},{:.5},",
        fields.target.latitude, fields.target.longitude
    )?;
    if let Some(site) = fields.site {
        write!(
            writer,
            "{},{},",
            csv_escape(site.name),
            csv_escape(site.category.unwrap_or(NO_CATEGORY))
        )?;
    }
    writeln!(writer, "{:.3},{:.5}", fields.distance_km, fields.angle_deg)
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    origin_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin_longitude: Option<f64>,
    latitude: f64,
    longitude: f64,
    #[serde(flatten)]
    site: Option<JsonSite<'a>>,
    distance: f64,
    angle: f64,
}

#[derive(Serialize)]
struct JsonSite<'a> {
    name: &'a str,
    category: Option<&'a str>,
}

pub fn write_json_row<W: Write>(fields: &RowFields, writer: &mut W) -> io::Result<()> {
    let record = JsonRecord {
        origin_latitude: fields.origin.map(|o| o.latitude),
        origin_longitude: fields.origin.map(|o| o.longitude),
        latitude: fields.target.latitude,
        longitude: fields.target.longitude,
        site: fields.site.map(|s| JsonSite {
            name: s.name,
            category: s.category,
        }),
        distance: fields.distance_km,
        angle: fields.angle_deg,
    };
    serde_json::to_writer(&mut *writer, &record)?;
    writeln!(writer)
}

fn measurement_variance(source: &DataSource) -> VarianceFlags {
    match source {
        DataSource::Separate(_, TargetSource::Single(_, _)) => VarianceFlags::default(),
        DataSource::Separate(_, TargetSource::Range { lat, lon }) => VarianceFlags {
            origin: false,
            latitude: lat.0 != lat.1,
            longitude: lon.0 != lon.1,
        },
        DataSource::Separate(_, TargetSource::File(_)) | DataSource::Sites(_, _) => {
            VarianceFlags {
                origin: false,
                latitude: true,
                longitude: true,
            }
        }
        DataSource::Paired(_) => VarianceFlags {
            origin: true,
            latitude: true,
            longitude: true,
        },
    }
}

fn measurement_cells(result: &CalculationResult, variance: &VarianceFlags) -> Vec<String> {
    let mut cells = Vec::new();
    if variance.origin {
        let origin = result.origin();
        cells.push(table_format::format_coordinate(origin.latitude));
        cells.push(table_format::format_coordinate(origin.longitude));
    }
    let target = result.target();
    if variance.latitude {
        cells.push(table_format::format_coordinate(target.latitude));
    }
    if variance.longitude {
        cells.push(table_format::format_coordinate(target.longitude));
    }
    cells.push(table_format::format_distance(result.distance_km()));
    cells.push(table_format::format_angle(result.angle_deg()));
    cells
}

/// Writes `measure` results as a table that streams row by row. The header
/// block is taken from the first record. Origin columns appear when
/// `show_inputs` is set or the origin varies per record; otherwise the fixed
/// origin goes into the header block.
pub fn write_streaming_text_table<W: Write>(
    mut results: ResultStream,
    source: &DataSource,
    show_inputs: bool,
    writer: &mut W,
    flush_each: bool,
) -> Result<usize, OutputError> {
    let first = match results.next() {
        Some(r) => r?,
        None => return Ok(0),
    };

    let mut variance = measurement_variance(source);
    variance.origin |= show_inputs;
    table_format::write_header_section(
        writer,
        Some(first.origin()),
        Some(first.target()),
        &variance,
        None,
    )?;

    let table = TableFormatter::for_measurements(&variance);
    table.write_table_header(writer)?;
    table.write_table_row(writer, &measurement_cells(&first, &variance))?;
    if flush_each {
        writer.flush()?;
    }

    let mut count = 1;
    for result in results {
        let result = result?;
        table.write_table_row(writer, &measurement_cells(&result, &variance))?;
        count += 1;
        if flush_each {
            writer.flush()?;
        }
    }

    table.write_table_footer(writer)?;
    Ok(count)
}

/// Writes `sites` results as a table sized to fit every name.
pub fn write_site_table<W: Write>(
    results: ResultStream,
    origin: Option<GeoPoint>,
    radius_km: f64,
    writer: &mut W,
) -> Result<usize, OutputError> {
    let rows = results
        .map(|result| {
            result.map(|r| {
                let fields = row_fields(&r, false);
                let (name, category) = fields
                    .site
                    .map(|s| (s.name.to_string(), s.category.unwrap_or(NO_CATEGORY)))
                    .unwrap_or_default();
                vec![
                    name,
                    category.to_string(),
                    table_format::format_distance(fields.distance_km),
                    table_format::format_angle(fields.angle_deg),
                ]
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    table_format::write_header_section(
        writer,
        origin,
        None,
        &VarianceFlags::default(),
        Some(radius_km),
    )?;

    if rows.is_empty() {
        writeln!(writer, "No sites within {:.1} km.", radius_km)?;
        return Ok(0);
    }

    let mut table = TableFormatter::for_sites();
    for row in &rows {
        for (column, cell) in table.columns.iter_mut().zip(row) {
            column.fit(cell);
        }
    }

    table.write_table_header(writer)?;
    for row in &rows {
        table.write_table_row(writer, row)?;
    }
    table.write_table_footer(writer)?;

    Ok(rows.len())
}

/// Writes all results to stdout in the requested format and returns the
/// number of records written.
pub fn dispatch_output(
    results: ResultStream,
    params: &Parameters,
    output_plan: &OutputPlan,
) -> Result<usize, OutputError> {
    let flush_each = output_plan.flush_each_record;

    match params.output.format {
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => {
            let writer = BufWriter::new(io::stdout());
            crate::parquet::write_parquet(results, output_plan.command, params, writer)
        }
        OutputFormat::Csv => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let count = CsvFormatter::new(&mut writer, params, output_plan.command, flush_each)
                .write(results)?;
            writer.flush()?;
            Ok(count)
        }
        OutputFormat::Json => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let count = JsonFormatter::new(&mut writer, params, flush_each).write(results)?;
            writer.flush()?;
            Ok(count)
        }
        OutputFormat::Text => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let count = TextFormatter::new(
                &mut writer,
                params,
                output_plan.command,
                output_plan.source.clone(),
                flush_each,
            )
            .write(results)?;
            writer.flush()?;
            Ok(count)
        }
    }
}
