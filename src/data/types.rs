use crate::error::InputError;
use crate::geo::GeoPoint;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum InputPath {
    Stdin,
    File(PathBuf),
}

impl InputPath {
    pub fn display_name(&self) -> String {
        match self {
            InputPath::Stdin => "stdin".to_string(),
            InputPath::File(p) => p.display().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TargetSource {
    Single(f64, f64),
    Range {
        lat: (f64, f64, f64),
        lon: (f64, f64, f64),
    },
    File(InputPath),
}

#[derive(Debug, Clone)]
pub enum DataSource {
    /// Fixed origin measured against one or many targets.
    Separate(GeoPoint, TargetSource),
    /// Lines of `lat1 lon1 lat2 lon2`.
    Paired(InputPath),
    /// Fixed origin and a file of named sites.
    Sites(GeoPoint, InputPath),
}

impl DataSource {
    pub fn uses_stdin(&self) -> bool {
        match self {
            DataSource::Separate(_, target) => {
                matches!(target, TargetSource::File(InputPath::Stdin))
            }
            DataSource::Paired(path) | DataSource::Sites(_, path) => *path == InputPath::Stdin,
        }
    }

    /// The origin, if every record shares it.
    pub fn fixed_origin(&self) -> Option<GeoPoint> {
        match self {
            DataSource::Separate(origin, _) | DataSource::Sites(origin, _) => Some(*origin),
            DataSource::Paired(_) => None,
        }
    }
}

/// A named location read from a site file.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub point: GeoPoint,
    pub name: String,
    pub category: Option<String>,
}

pub type PointPair = (GeoPoint, GeoPoint);
pub type PointPairResult = Result<PointPair, InputError>;
pub type PointPairStream = Box<dyn Iterator<Item = PointPairResult>>;

pub type TargetResult = Result<GeoPoint, InputError>;
pub type TargetStream = Box<dyn Iterator<Item = TargetResult>>;

pub type SiteResult = Result<Site, InputError>;
pub type SiteStream = Box<dyn Iterator<Item = SiteResult>>;
