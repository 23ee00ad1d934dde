//! Crate-wide error types.
//!
//! The store raises this when a matcher commit's preconditions don't hold;
//! routing never surfaces an error of its own (every call resolves to a
//! route, real or fallback), so there is no separate routing variant here.

use thiserror::Error;

use crate::model::{OrderId, TaxiId};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("taxi {0} is not free")]
    TaxiNotFree(TaxiId),

    #[error("order {0} is not pending")]
    OrderNotPending(OrderId),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
