//! Great-circle distance and pole-vector bearing proxy between two points.
//!
//! All public functions take coordinates in decimal degrees.

/// Radius of the spherical Earth model used for distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6373.0;

/// Semi-major (equatorial) axis of the ellipsoid, in meters.
pub const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// Semi-minor (polar) axis of the ellipsoid, in meters.
pub const SEMI_MINOR_AXIS_M: f64 = 6_356_752.314245;

/// Reference point the bearing proxy measures towards.
///
/// This reuses the equatorial radius as a y-coordinate instead of placing the
/// point on the polar axis, so it is not the geometric North Pole. Every
/// reported angle depends on this exact value.
pub const NORTH_POLE_REFERENCE: Vector3 = Vector3 {
    x: 0.0,
    y: SEMI_MAJOR_AXIS_M,
    z: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Earth-centered Cartesian vector in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Haversine distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`].
///
/// Symmetric in its arguments. NaN inputs produce NaN.
pub fn great_circle_distance_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lon1 = p1.longitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let lon2 = p2.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    // rounding can push `a` past 1 for antipodal points
    let a = ((dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Vector from the point (at `height_m` above the ellipsoid) to
/// [`NORTH_POLE_REFERENCE`].
pub fn vector_to_north_pole(point: GeoPoint, height_m: f64) -> Vector3 {
    let lat = point.latitude.to_radians();
    let lon = point.longitude.to_radians();

    let axis_ratio_sq = SEMI_MINOR_AXIS_M.powi(2) / SEMI_MAJOR_AXIS_M.powi(2);
    let e_squared = 1.0 - axis_ratio_sq;
    let n_phi = SEMI_MAJOR_AXIS_M / (1.0 - e_squared * lat.sin().powi(2)).sqrt();

    let surface = Vector3::new(
        (n_phi + height_m) * lat.cos() * lon.cos(),
        (n_phi + height_m) * lat.cos() * lon.sin(),
        (axis_ratio_sq * n_phi + height_m) * lat.sin(),
    );

    NORTH_POLE_REFERENCE - surface
}

/// Angle between the pole vectors of two points, scaled so that a half turn
/// reads 360.
///
/// The cosine is clamped to [-1, 1] before `acos`, so identical points give
/// exactly 0 instead of NaN from rounding. A zero-length pole vector still
/// yields NaN.
pub fn bearing_proxy_angle_deg(p1: GeoPoint, p2: GeoPoint, h1: f64, h2: f64) -> f64 {
    let v1 = vector_to_north_pole(p1, h1);
    let v2 = vector_to_north_pole(p2, h2);

    // sqrt(|v1|² |v2|²) keeps the ratio at exactly 1 for identical vectors
    let magnitudes = (v1.dot(&v1) * v2.dot(&v2)).sqrt();
    let cos_theta = (v1.dot(&v2) / magnitudes).clamp(-1.0, 1.0);
    let theta = cos_theta.acos();

    theta / std::f64::consts::PI * 360.0
}
