use crate::geo::GeoPoint;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

const MIN_COLUMN_WIDTH: usize = 10;

/// Which coordinates change from row to row and therefore need a column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VarianceFlags {
    pub origin: bool,
    pub latitude: bool,
    pub longitude: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Right,
}

pub fn write_header_section<W: Write>(
    writer: &mut W,
    origin: Option<GeoPoint>,
    target: Option<GeoPoint>,
    variance: &VarianceFlags,
    radius_km: Option<f64>,
) -> io::Result<()> {
    let mut wrote_any = false;

    if let Some(origin) = origin
        && !variance.origin
    {
        writeln!(writer, "  Origin:      {:.6}°, {:.6}°", origin.latitude, origin.longitude)?;
        wrote_any = true;
    }
    if let Some(target) = target {
        if !variance.latitude {
            writeln!(writer, "  Latitude:    {:.6}°", target.latitude)?;
            wrote_any = true;
        }
        if !variance.longitude {
            writeln!(writer, "  Longitude:   {:.6}°", target.longitude)?;
            wrote_any = true;
        }
    }
    if let Some(radius) = radius_km {
        writeln!(writer, "  Radius:      {:.1} km", radius)?;
        wrote_any = true;
    }

    if wrote_any {
        writeln!(writer)?;
    }

    Ok(())
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(text)));
    match align {
        Align::Left => format!("{}{}", text, fill),
        Align::Right => format!("{}{}", fill, text),
    }
}

pub struct Column {
    pub header: &'static str,
    pub width: usize,
    pub align: Align,
}

impl Column {
    pub fn new(header: &'static str, align: Align) -> Self {
        Self {
            header,
            width: header.len().max(MIN_COLUMN_WIDTH),
            align,
        }
    }

    /// Widens the column so that `cell` fits.
    pub fn fit(&mut self, cell: &str) {
        self.width = self.width.max(display_width(cell));
    }
}

pub struct TableFormatter {
    pub columns: Vec<Column>,
}

impl TableFormatter {
    /// Columns of a `measure` table. Distance and angle are always present.
    pub fn for_measurements(variance: &VarianceFlags) -> Self {
        let mut columns = Vec::new();

        if variance.origin {
            columns.push(Column::new("Origin Lat", Align::Right));
            columns.push(Column::new("Origin Lon", Align::Right));
        }
        if variance.latitude {
            columns.push(Column::new("Latitude", Align::Right));
        }
        if variance.longitude {
            columns.push(Column::new("Longitude", Align::Right));
        }

        columns.push(Column::new("Distance", Align::Right));
        columns.push(Column::new("Angle", Align::Right));

        Self { columns }
    }

    pub fn for_sites() -> Self {
        Self {
            columns: vec![
                Column::new("Name", Align::Left),
                Column::new("Category", Align::Left),
                Column::new("Distance", Align::Right),
                Column::new("Angle", Align::Right),
            ],
        }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    fn write_border<W: Write>(
        &self,
        writer: &mut W,
        left: char,
        middle: char,
        right: char,
    ) -> io::Result<()> {
        write!(writer, "{}", left)?;
        for (i, column) in self.columns.iter().enumerate() {
            write!(writer, "{}", "─".repeat(column.width + 2))?;
            if i < self.columns.len() - 1 {
                write!(writer, "{}", middle)?;
            }
        }
        writeln!(writer, "{}", right)
    }

    pub fn write_table_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_border(writer, '┌', '┬', '┐')?;

        write!(writer, "│")?;
        for column in &self.columns {
            write!(writer, " {} │", pad(column.header, column.width, Align::Left))?;
        }
        writeln!(writer)?;

        self.write_border(writer, '├', '┼', '┤')
    }

    pub fn write_table_row<W: Write>(&self, writer: &mut W, cells: &[String]) -> io::Result<()> {
        write!(writer, "│")?;
        for (column, cell) in self.columns.iter().zip(cells) {
            write!(writer, " {} │", pad(cell, column.width, column.align))?;
        }
        writeln!(writer)
    }

    pub fn write_table_footer<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_border(writer, '└', '┴', '┘')
    }
}

pub fn format_coordinate(value: f64) -> String {
    format!("{:.5}°", value)
}

pub fn format_distance(distance_km: f64) -> String {
    format!("{:.2} km", distance_km)
}

pub fn format_angle(angle_deg: f64) -> String {
    format!("{:.2}°", angle_deg)
}
