//! Error types for freebusy-engine operations.

use thiserror::Error;

use crate::restriction::PropTag;

#[derive(Error, Debug)]
pub enum FreeBusyError {
    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Expansion error: {0}")]
    Expansion(String),

    #[error("Invalid time window: start {start} is after end {end}")]
    InvalidWindow { start: i64, end: i64 },

    #[error("Missing property: {0:?}")]
    MissingProperty(PropTag),

    #[error("Property {tag:?} has an unexpected value type")]
    PropertyType { tag: PropTag },

    #[error("Store error: {0}")]
    Store(String),

    /// The sink has no free/busy provider for this user. Callers usually skip
    /// the user rather than abort a batch.
    #[error("Free/busy provider not found for user: {0}")]
    ProviderNotFound(String),

    #[error("Publish error: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, FreeBusyError>;
