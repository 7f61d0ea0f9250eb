use std::fmt;
use std::str::FromStr;

/// Radius applied by `sites` when `--radius` is not given, in kilometers.
pub const DEFAULT_SITE_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
    #[cfg(feature = "parquet")]
    Parquet,
}

impl OutputFormat {
    pub fn all() -> Vec<&'static str> {
        let mut formats = vec!["text", "csv", "json"];
        #[cfg(feature = "parquet")]
        formats.push("parquet");
        formats
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            #[cfg(feature = "parquet")]
            "parquet" => Ok(Self::Parquet),
            _ => Err(format!(
                "Invalid format: '{}'. Supported formats: {}",
                s,
                Self::all().join(", ")
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
            #[cfg(feature = "parquet")]
            Self::Parquet => "parquet",
        };
        write!(f, "{}", name)
    }
}

/// Which end of the distance-sorted site list `--limit` keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Nearest,
    Farthest,
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "farthest" => Ok(Self::Farthest),
            _ => Err(format!(
                "Invalid rank: '{}'. Supported ranks: nearest, farthest",
                s
            )),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Farthest => write!(f, "farthest"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub headers: bool,
    pub show_inputs: Option<bool>,
}

impl OutputOptions {
    pub fn should_show_inputs(&self) -> bool {
        self.show_inputs.unwrap_or(false)
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            headers: true,
            show_inputs: None,
        }
    }
}

/// Heights above the reference ellipsoid used by the bearing proxy, in meters.
#[derive(Debug, Clone, Default)]
pub struct Heights {
    pub origin: f64,
    pub target: f64,
}

#[derive(Debug, Clone)]
pub struct SelectionOptions {
    pub radius: Option<f64>,
    pub limit: Option<usize>,
    pub rank: Rank,
    pub categories: Vec<String>,
}

impl SelectionOptions {
    /// Radius for `sites`, falling back to [`DEFAULT_SITE_RADIUS_KM`].
    pub fn site_radius(&self) -> f64 {
        self.radius.unwrap_or(DEFAULT_SITE_RADIUS_KM)
    }
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            radius: None,
            limit: None,
            rank: Rank::Nearest,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parameters {
    pub output: OutputOptions,
    pub heights: Heights,
    pub selection: SelectionOptions,
    pub perf: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Measure,
    Sites,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Measure => write!(f, "measure"),
            Command::Sites => write!(f, "sites"),
        }
    }
}
