//! Error types for the booking flow.

use thiserror::Error;

use crate::booking::Step;
use crate::model::TicketTypeId;
use crate::storage::StorageError;

/// Top-level error returned by [`BookingFlow`](super::BookingFlow) operations.
///
/// None of these escape the flow as failures: each is logged and shown to
/// the user as a notification.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("Your ticket reservation has expired. Please start over.")]
    Expired,

    #[error("{action} is not possible during the {step:?} step")]
    WrongStep { action: &'static str, step: Step },

    #[error("{0} is not in the ticket catalog")]
    UnknownTicket(TicketTypeId),

    #[error("could not save booking: {0}")]
    Storage(#[from] StorageError),
}

/// A required field is missing or malformed. Blocks the transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select at least one ticket")]
    EmptyCart,

    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// A quantity request went past a cap; the cart keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("Maximum {max} tickets allowed per person")]
    PerOrderMaximum { ticket: TicketTypeId, max: u32 },
}
