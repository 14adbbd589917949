use cl_core::{CartId, LineId};
use cl_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MobilityError {
    #[error("cart {0} is already placed")]
    AlreadyPlaced(CartId),

    #[error("line {0} is degenerate; carts cannot run on it")]
    DegenerateLine(LineId),

    #[error("geometry lookup failed: {0}")]
    Spatial(#[from] SpatialError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
