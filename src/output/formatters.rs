use super::{csv_header, row_fields, write_csv_row, write_json_row, write_site_table, write_streaming_text_table};
use crate::compute::ResultStream;
use crate::data::{Command, DataSource, Parameters};
use crate::error::OutputError;
use std::io::Write;

pub trait Formatter {
    fn write(&mut self, results: ResultStream) -> Result<usize, OutputError>;
}

pub struct CsvFormatter<'a, W: Write> {
    writer: &'a mut W,
    command: Command,
    show_inputs: bool,
    headers: bool,
    flush_each: bool,
}

impl<'a, W: Write> CsvFormatter<'a, W> {
    pub fn new(
        writer: &'a mut W,
        params: &'a Parameters,
        command: Command,
        flush_each: bool,
    ) -> Self {
        Self {
            writer,
            command,
            show_inputs: params.output.should_show_inputs(),
            headers: params.output.headers,
            flush_each,
        }
    }
}

impl<'a, W: Write> Formatter for CsvFormatter<'a, W> {
    fn write(&mut self, results: ResultStream) -> Result<usize, OutputError> {
        let mut count = 0;
        for (index, result_or_err) in results.enumerate() {
            let result = result_or_err?;
            let fields = row_fields(&result, self.show_inputs);
            write_csv_row(&fields, self.command, self.headers, index == 0, self.writer)?;
            count += 1;
            if self.flush_each {
                self.writer.flush()?;
            }
        }
        if count == 0 && self.headers {
            writeln!(self.writer, "{}", csv_header(self.command, self.show_inputs))?;
        }
        Ok(count)
    }
}

pub struct JsonFormatter<'a, W: Write> {
    writer: &'a mut W,
    show_inputs: bool,
    flush_each: bool,
}

impl<'a, W: Write> JsonFormatter<'a, W> {
    pub fn new(writer: &'a mut W, params: &'a Parameters, flush_each: bool) -> Self {
        Self {
            writer,
            show_inputs: params.output.should_show_inputs(),
            flush_each,
        }
    }
}

impl<'a, W: Write> Formatter for JsonFormatter<'a, W> {
    fn write(&mut self, results: ResultStream) -> Result<usize, OutputError> {
        let mut count = 0;
        for result_or_err in results {
            let result = result_or_err?;
            write_json_row(&row_fields(&result, self.show_inputs), self.writer)?;
            count += 1;
            if self.flush_each {
                self.writer.flush()?;
            }
        }
        Ok(count)
    }
}

pub struct TextFormatter<'a, W: Write> {
    writer: &'a mut W,
    params: &'a Parameters,
    command: Command,
    data_source: DataSource,
    flush_each: bool,
}

impl<'a, W: Write> TextFormatter<'a, W> {
    pub fn new(
        writer: &'a mut W,
        params: &'a Parameters,
        command: Command,
        data_source: DataSource,
        flush_each: bool,
    ) -> Self {
        Self {
            writer,
            params,
            command,
            data_source,
            flush_each,
        }
    }
}

impl<'a, W: Write> Formatter for TextFormatter<'a, W> {
    fn write(&mut self, results: ResultStream) -> Result<usize, OutputError> {
        match self.command {
            Command::Measure => write_streaming_text_table(
                results,
                &self.data_source,
                self.params.output.should_show_inputs(),
                self.writer,
                self.flush_each,
            ),
            Command::Sites => write_site_table(
                results,
                self.data_source.fixed_origin(),
                self.params.selection.site_radius(),
                self.writer,
            ),
        }
    }
}
