//! Errors returned by the calendar client.

use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

use crate::service::ServiceType;

#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be sent or the body could not be read.
    #[error("calendar request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("calendar server responded with {0}")]
    Status(StatusCode),

    /// The payload is not JSON or does not have the expected shape.
    #[error("unexpected calendar payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// An item uses a service type or status this crate does not know.
    ///
    /// `fragment` is the offending item as JSON so it can be reported upstream.
    #[error("unknown service or status on {date}: {fragment}")]
    UnknownServiceOrStatus { date: NaiveDate, fragment: String },

    /// The requested date range ends after the last date `chrono` can represent.
    #[error("a range of {window_days} days from {from} is out of range")]
    DateOutOfRange { from: NaiveDate, window_days: u32 },

    /// A day has no entry for one of the services.
    #[error("no {service} entry on {date}")]
    IncompleteDay { date: NaiveDate, service: ServiceType },
}

impl Error {
    /// Whether the server rejected the request itself, most likely because of the API key.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Status(status) if status.is_client_error())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
