//! Annotate listed rides with their distance from a reference point.

use super::{RideListParams, RideQuery, RideQueryError, RideQueryStage, provided};
use crate::domain::GeoPoint;

/// Applies `lat`/`lon`. The reference point is not range checked.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistanceAnnotator;

impl DistanceAnnotator {
    /// Whether the caller asked for an annotation at all.
    pub fn requested(params: &RideListParams) -> bool {
        provided(params.lat.as_ref()).is_some() || provided(params.lon.as_ref()).is_some()
    }
}

fn parse_degrees(raw: &str) -> Result<f64, RideQueryError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RideQueryError::NonNumericCoordinates)
}

impl RideQueryStage for DistanceAnnotator {
    fn apply(
        &self,
        query: RideQuery,
        params: &RideListParams,
    ) -> Result<RideQuery, RideQueryError> {
        let (Some(lat), Some(lon)) = (
            provided(params.lat.as_ref()),
            provided(params.lon.as_ref()),
        ) else {
            return Err(RideQueryError::MissingCoordinates);
        };
        let reference = GeoPoint::new(parse_degrees(lat)?, parse_degrees(lon)?);
        Ok(query.annotate_distance(reference))
    }
}
