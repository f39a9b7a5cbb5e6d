//! This crate implements a client for the NYC 311 public calendar.
//! It reports alternate side parking, trash collection and school statuses per day.
//!
//! The data is read from <https://api.nyc.gov/public/api/GetCalendar> and reshaped into
//! a by-date view, a days-ahead view and a next-exceptions view.

pub use chrono;

pub mod calendar_client;
pub mod error;
pub mod service;
pub mod view;

pub use calendar_client::{Client, ClientConfig, DateRange};
pub use error::{Error, Result};
pub use service::{ExceptionType, ServiceType, Status, StatusDetail};
pub use view::{
    ByDate, Calendar, CalendarView, DayRecord, DaysAhead, NextExceptions, ServiceEntry,
};
