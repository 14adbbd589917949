use cl_core::{CartId, CoreError, StationId};
use cl_mobility::MobilityError;
use cl_spatial::SpatialError;
use thiserror::Error;

use crate::state::CreditKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("cart {cart} cannot arrive at {station} heading to {next_station}: not on its line")]
    InvalidArrival {
        cart:         CartId,
        station:      StationId,
        next_station: StationId,
    },

    #[error("no {0} credit available")]
    NoCredit(CreditKind),

    #[error("all line slots are taken")]
    NoFreeLineSlot,

    #[error("invalid line: {0}")]
    InvalidLine(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("routing graph error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),
}

pub type GameResult<T> = Result<T, GameError>;
