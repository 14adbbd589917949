//! Spatial-subsystem error type.

use thiserror::Error;

use cl_core::{LineId, StationId};

/// Errors produced by `cl-spatial`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("line {0} has no cached geometry")]
    LineNotCached(LineId),

    #[error("station {0} is not in the routing graph")]
    UnknownStation(StationId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
