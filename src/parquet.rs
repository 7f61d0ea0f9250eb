//! Parquet output format support.

use crate::compute::ResultStream;
use crate::data::{Command, Parameters};
use crate::error::OutputError;
use crate::output::{RowFields, row_fields};
use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

const BATCH_SIZE: usize = 8192;

pub fn build_schema(command: Command, show_inputs: bool) -> Arc<Schema> {
    let mut fields = Vec::new();

    if show_inputs {
        fields.push(Field::new("origin_latitude", DataType::Float64, false));
        fields.push(Field::new("origin_longitude", DataType::Float64, false));
    }
    fields.push(Field::new("latitude", DataType::Float64, false));
    fields.push(Field::new("longitude", DataType::Float64, false));
    if command == Command::Sites {
        fields.push(Field::new("name", DataType::Utf8, false));
        fields.push(Field::new("category", DataType::Utf8, true));
    }
    fields.push(Field::new("distance", DataType::Float64, false));
    fields.push(Field::new("angle", DataType::Float64, false));

    Arc::new(Schema::new(fields))
}

/// Column builders for one record batch. Optional columns are `None` when
/// the schema leaves them out.
struct BatchBuilders {
    origin_lat: Option<Float64Builder>,
    origin_lon: Option<Float64Builder>,
    lat: Float64Builder,
    lon: Float64Builder,
    name: Option<StringBuilder>,
    category: Option<StringBuilder>,
    distance: Float64Builder,
    angle: Float64Builder,
    rows: usize,
}

impl BatchBuilders {
    fn new(command: Command, show_inputs: bool) -> Self {
        let float_column = |present: bool| present.then(|| Float64Builder::with_capacity(BATCH_SIZE));
        let string_column = |present: bool| {
            present.then(|| StringBuilder::with_capacity(BATCH_SIZE, BATCH_SIZE * 16))
        };
        let sites = command == Command::Sites;

        Self {
            origin_lat: float_column(show_inputs),
            origin_lon: float_column(show_inputs),
            lat: Float64Builder::with_capacity(BATCH_SIZE),
            lon: Float64Builder::with_capacity(BATCH_SIZE),
            name: string_column(sites),
            category: string_column(sites),
            distance: Float64Builder::with_capacity(BATCH_SIZE),
            angle: Float64Builder::with_capacity(BATCH_SIZE),
            rows: 0,
        }
    }

    fn append(&mut self, fields: &RowFields) {
        if let (Some(origin), Some(lat_b), Some(lon_b)) = (
            fields.origin,
            self.origin_lat.as_mut(),
            self.origin_lon.as_mut(),
        ) {
            lat_b.append_value(origin.latitude);
            lon_b.append_value(origin.longitude);
        }
        self.lat.append_value(fields.target.latitude);
        self.lon.append_value(fields.target.longitude);
        if let (Some(name_b), Some(category_b)) = (self.name.as_mut(), self.category.as_mut()) {
            match fields.site {
                Some(site) => {
                    name_b.append_value(site.name);
                    category_b.append_option(site.category);
                }
                None => {
                    name_b.append_value("");
                    category_b.append_null();
                }
            }
        }
        self.distance.append_value(fields.distance_km);
        self.angle.append_value(fields.angle_deg);
        self.rows += 1;
    }

    /// Finishes the current batch and leaves the builders empty.
    fn finish(&mut self, schema: &Arc<Schema>) -> Result<RecordBatch, OutputError> {
        let mut arrays: Vec<ArrayRef> = Vec::new();

        if let Some(b) = self.origin_lat.as_mut() {
            arrays.push(Arc::new(b.finish()) as ArrayRef);
        }
        if let Some(b) = self.origin_lon.as_mut() {
            arrays.push(Arc::new(b.finish()) as ArrayRef);
        }
        arrays.push(Arc::new(self.lat.finish()) as ArrayRef);
        arrays.push(Arc::new(self.lon.finish()) as ArrayRef);
        if let Some(b) = self.name.as_mut() {
            arrays.push(Arc::new(b.finish()) as ArrayRef);
        }
        if let Some(b) = self.category.as_mut() {
            arrays.push(Arc::new(b.finish()) as ArrayRef);
        }
        arrays.push(Arc::new(self.distance.finish()) as ArrayRef);
        arrays.push(Arc::new(self.angle.finish()) as ArrayRef);
        self.rows = 0;

        RecordBatch::try_new(schema.clone(), arrays)
            .map_err(|e| OutputError::from(format!("Failed to create batch: {}", e)))
    }
}

pub fn write_parquet<W: Write + Send>(
    results: ResultStream,
    command: Command,
    params: &Parameters,
    writer: W,
) -> Result<usize, OutputError> {
    let show_inputs = params.output.should_show_inputs();
    let schema = build_schema(command, show_inputs);
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut parquet_writer = ArrowWriter::try_new(writer, schema.clone(), Some(props))
        .map_err(|e| OutputError::from(format!("Parquet writer error: {}", e)))?;

    let mut builders = BatchBuilders::new(command, show_inputs);
    let mut total_count = 0;
    let mut batches = 0;

    for result in results {
        let result = result?;
        builders.append(&row_fields(&result, show_inputs));
        total_count += 1;

        if builders.rows >= BATCH_SIZE {
            let batch = builders.finish(&schema)?;
            parquet_writer
                .write(&batch)
                .map_err(|e| OutputError::from(format!("Failed to write batch: {}", e)))?;
            batches += 1;
        }
    }

    if builders.rows > 0 {
        let batch = builders.finish(&schema)?;
        parquet_writer
            .write(&batch)
            .map_err(|e| OutputError::from(format!("Failed to write batch: {}", e)))?;
        batches += 1;
    }

    parquet_writer
        .close()
        .map_err(|e| OutputError::from(format!("Failed to close parquet: {}", e)))?;

    debug!(rows = total_count, batches, "parquet output written");
    Ok(total_count)
}
