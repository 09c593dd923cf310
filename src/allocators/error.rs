use std::fmt;

use super::WindowId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdError {
    /// A reservation asked for zero IDs.
    InvalidArgument { count: usize },
    /// A pool was described with an empty namespace.
    InvalidRange { start: WindowId, end: WindowId },
    /// No run of `count` free IDs exists in the namespace.
    Exhausted { count: usize },
    /// The ID is currently reserved by the pool.
    Conflict { id: WindowId },
    /// A handle was asked to adopt an ID that carries no raw reservation.
    NotReserved { id: WindowId },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::InvalidArgument { count } => {
                write!(f, "invalid id count {count}, at least one id must be requested")
            }
            IdError::InvalidRange { start, end } => {
                write!(f, "empty id namespace [{start}, {end}]")
            }
            IdError::Exhausted { count } => {
                write!(f, "no block of {count} consecutive free ids left")
            }
            IdError::Conflict { id } => {
                write!(f, "id {id} is already reserved by the allocator")
            }
            IdError::NotReserved { id } => {
                write!(f, "id {id} has no pending reservation to adopt")
            }
        }
    }
}

impl std::error::Error for IdError {}
