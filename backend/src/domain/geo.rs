//! Geographic coordinates and great-circle distance.

use std::fmt;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate range violations for stored ride locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatitudeOutOfRange => write!(f, "latitude must be between -90 and 90"),
            Self::LongitudeOutOfRange => write!(f, "longitude must be between -180 and 180"),
        }
    }
}

impl std::error::Error for CoordinateError {}

/// Latitude/longitude pair in decimal degrees.
///
/// Reference points supplied by callers are not range checked; stored ride
/// locations go through [`GeoPoint::validated`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point without range checks.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point, requiring latitude in [-90, 90] and longitude in
    /// [-180, 180].
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange);
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to `other` in kilometres.
    ///
    /// `d = 2·R·asin(√(sin²(Δφ/2) + cos φ₁·cos φ₂·sin²(Δλ/2)))`
    ///
    /// Both deltas are squared, so swapping the two points yields the same
    /// value. The radicand is clamped to 1 so antipodal points never produce
    /// `NaN` through rounding.
    ///
    /// # Examples
    /// ```
    /// use rideshare::domain::GeoPoint;
    ///
    /// let pickup = GeoPoint::new(10.3168, 123.8906);
    /// let reference = GeoPoint::new(45.0, 130.0);
    /// assert!((pickup.haversine_km(&reference) - 3900.613_174_938_805_5).abs() < 1e-6);
    /// ```
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let delta_phi = (other.latitude - self.latitude).to_radians();
        let delta_lambda = (other.longitude - self.longitude).to_radians();
        let a = (delta_phi / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (delta_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}
