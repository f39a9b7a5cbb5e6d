//! This client fetches the 311 calendar and normalizes it into days.

use std::{fmt, sync::LazyLock, time::Duration};

use chrono::{Days, NaiveDate, Utc};
use chrono_tz::America::New_York;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::{
    error::{Error, Result},
    service::{ServiceType, Status},
    view::{ByDate, Calendar, CalendarView, DayRecord, ServiceEntry},
};

pub static URL: &str = "https://api.nyc.gov/public/api/GetCalendar";
static API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
static REQUEST_FORMAT: &str = "%m/%d/%Y";
static RESPONSE_FORMAT: &str = "%Y%m%d";
static ISSUES_URL: &str = "https://github.com/elahd/nyc311calendar/issues/new/choose";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

/// Matches "(Observed)" and four-digit years together with the spaces around them.
static OBSERVED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"( *\(Observed\) *)|( *\d{4} *)").unwrap());

/// Settings for [`Client`].
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Number of days fetched after the first day of the default range.
    pub window_days: u32,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("window_days", &self.window_days)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            base_url: String::from(URL),
            timeout: DEFAULT_TIMEOUT,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }
}

/// The inclusive range of dates requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Yesterday through `window_days` days after yesterday.
    ///
    /// Fails if the end of the range is past the last representable date.
    pub fn around(today: NaiveDate, window_days: u32) -> Result<Self> {
        let from = today.pred_opt().unwrap_or(today);
        let to = from
            .checked_add_days(Days::new(u64::from(window_days)))
            .ok_or(Error::DateOutOfRange { from, window_days })?;
        Ok(DateRange { from, to })
    }

    fn query(&self) -> [(&'static str, String); 2] {
        [
            ("fromdate", self.from.format(REQUEST_FORMAT).to_string()),
            ("todate", self.to.format(REQUEST_FORMAT).to_string()),
        ]
    }
}

/// The payload as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub days: Vec<ApiDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDay {
    #[serde(rename = "today_id", deserialize_with = "deserialize_day_id")]
    pub date: NaiveDate,
    pub items: Vec<ApiItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiItem {
    #[serde(rename = "type")]
    pub service: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(
        rename = "exceptionName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exception_name: Option<String>,
    /// Fields this crate does not use, kept so an item can be reported as it was received.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn deserialize_day_id<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let day_id = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&day_id, RESPONSE_FORMAT).map_err(serde::de::Error::custom)
}

/// The current date in New York, which is what the calendar is about.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&New_York).date_naive()
}

/// Strip "(Observed)" and the year from an exception name.
///
/// `Christmas Day (Observed) 2021` becomes `Christmas Day`.
pub fn remove_observed(exception_name: &str) -> String {
    OBSERVED_REGEX.replace_all(exception_name, "").into_owned()
}

/// A client for the 311 calendar API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Client {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Use an existing HTTP client, e.g. to share its connection pool.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Client { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the requested calendar views for the current date in New York.
    ///
    /// An empty `views` selection returns every view. With `scrub`, exception names lose
    /// their "(Observed)" marker and year.
    pub async fn get_calendar(&self, views: CalendarView, scrub: bool) -> Result<Calendar> {
        self.get_calendar_on(today(), views, scrub).await
    }

    /// Get the requested calendar views as seen on `today`.
    pub async fn get_calendar_on(
        &self,
        today: NaiveDate,
        views: CalendarView,
        scrub: bool,
    ) -> Result<Calendar> {
        let range = DateRange::around(today, self.config.window_days)?;
        let response = self.fetch(range).await?;
        let by_date = normalize(&response, scrub)?;
        let calendar = Calendar::build(by_date, today, views);
        info!(%today, "got calendar");
        Ok(calendar)
    }

    /// Get the raw calendar payload for a date range.
    pub async fn fetch(&self, range: DateRange) -> Result<ApiResponse> {
        debug!(from = %range.from, to = %range.to, "requesting calendar");
        let response = self
            .http
            .get(&self.config.base_url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(&range.query())
            .timeout(self.config.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let body = response.text().await?;
        let api_response: ApiResponse = serde_json::from_str(&body)?;
        debug!(days = api_response.days.len(), "called API");
        Ok(api_response)
    }
}

/// Normalize the raw payload into one record per date.
pub fn normalize(response: &ApiResponse, scrub: bool) -> Result<ByDate> {
    let mut by_date = ByDate::new();
    for day in &response.days {
        let record = normalize_day(day, scrub)?;
        by_date.insert(record.date, record);
    }
    debug!(days = by_date.len(), "normalized calendar");
    Ok(by_date)
}

fn normalize_day(day: &ApiDay, scrub: bool) -> Result<DayRecord> {
    let mut parking = None;
    let mut trash = None;
    let mut school = None;
    for item in &day.items {
        let entry = normalize_item(day.date, item, scrub)?;
        let slot = match entry.service {
            ServiceType::Parking => &mut parking,
            ServiceType::Trash => &mut trash,
            ServiceType::School => &mut school,
        };
        *slot = Some(entry);
    }
    let missing = |service| Error::IncompleteDay {
        date: day.date,
        service,
    };
    Ok(DayRecord {
        date: day.date,
        parking: parking.ok_or_else(|| missing(ServiceType::Parking))?,
        trash: trash.ok_or_else(|| missing(ServiceType::Trash))?,
        school: school.ok_or_else(|| missing(ServiceType::School))?,
    })
}

fn normalize_item(date: NaiveDate, item: &ApiItem, scrub: bool) -> Result<ServiceEntry> {
    let Some((service, (status, detail))) = ServiceType::from_upstream(&item.service)
        .and_then(|service| Some((service, Status::from_upstream(service, &item.status)?)))
    else {
        return Err(unknown_service_or_status(date, item));
    };
    let exception_name = item
        .exception_name
        .as_deref()
        .map(|name| if scrub { remove_observed(name) } else { String::from(name) })
        .filter(|name| !name.is_empty());
    Ok(ServiceEntry {
        date,
        service,
        status,
        detail: *detail,
        description: item.details.clone(),
        exception_name,
    })
}

fn unknown_service_or_status(date: NaiveDate, item: &ApiItem) -> Error {
    let fragment = serde_json::to_string(item).unwrap_or_else(|_| format!("{item:?}"));
    error!(
        "\n\nEncountered unknown service or status. Please report this to the developers using \
         the \"Unknown Service or Status\" bug template at {ISSUES_URL}.\n\n\
         ===BEGIN COPYING HERE===\nDay: {date}\nItem: {fragment}\n===END COPYING HERE===\n"
    );
    Error::UnknownServiceOrStatus { date, fragment }
}
