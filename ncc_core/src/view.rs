//! The calendar views built from the normalized days.
//!
//! All transforms here are pure; "today" is always passed in.

use std::{collections::BTreeMap, ops::RangeInclusive};

use bitmask_enum::bitmask;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::service::{ServiceType, Status, StatusDetail};

/// Offsets from today covered by the days-ahead view.
pub const DAYS_AHEAD_WINDOW: RangeInclusive<i64> = -1..=6;

#[bitmask]
pub enum CalendarView {
    ByDate,
    DaysAhead,
    NextExceptions,
}

impl CalendarView {
    /// An empty selection means every view.
    fn or_all(self) -> Self {
        if self.is_none() {
            CalendarView::all_flags()
        } else {
            self
        }
    }
}

/// The state of one service on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceEntry {
    pub date: NaiveDate,
    pub service: ServiceType,
    pub status: Status,
    pub detail: StatusDetail,
    /// The free-text explanation from the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The holiday or event behind a deviation, e.g. "Memorial Day".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_name: Option<String>,
}

impl ServiceEntry {
    pub fn is_exception(&self) -> bool {
        !self.detail.exception_type.is_normal()
    }
}

/// All services on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub parking: ServiceEntry,
    pub trash: ServiceEntry,
    pub school: ServiceEntry,
}

impl DayRecord {
    pub fn get(&self, service: ServiceType) -> &ServiceEntry {
        match service {
            ServiceType::Parking => &self.parking,
            ServiceType::Trash => &self.trash,
            ServiceType::School => &self.school,
        }
    }

    /// The entries in [`ServiceType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceEntry> {
        ServiceType::ALL.into_iter().map(|service| self.get(service))
    }
}

/// The canonical view: every fetched day keyed by its date, in ascending order.
pub type ByDate = BTreeMap<NaiveDate, DayRecord>;

/// Days keyed by their signed offset from today.
pub type DaysAhead = BTreeMap<i64, DayRecord>;

/// The next deviation from normal service, per service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NextExceptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<ServiceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trash: Option<ServiceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<ServiceEntry>,
}

impl NextExceptions {
    pub fn get(&self, service: ServiceType) -> Option<&ServiceEntry> {
        self.slot(service).as_ref()
    }

    fn slot(&self, service: ServiceType) -> &Option<ServiceEntry> {
        match service {
            ServiceType::Parking => &self.parking,
            ServiceType::Trash => &self.trash,
            ServiceType::School => &self.school,
        }
    }

    fn slot_mut(&mut self, service: ServiceType) -> &mut Option<ServiceEntry> {
        match service {
            ServiceType::Parking => &mut self.parking,
            ServiceType::Trash => &mut self.trash,
            ServiceType::School => &mut self.school,
        }
    }

    fn is_complete(&self) -> bool {
        ServiceType::ALL
            .into_iter()
            .all(|service| self.slot(service).is_some())
    }
}

/// The views requested from the client. Views that were not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Calendar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_date: Option<ByDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_ahead: Option<DaysAhead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_exceptions: Option<NextExceptions>,
}

impl Calendar {
    /// Build the selected views from the canonical mapping.
    pub fn build(by_date: ByDate, today: NaiveDate, views: CalendarView) -> Self {
        let views = views.or_all();
        let days_ahead = views
            .contains(CalendarView::DaysAhead)
            .then(|| days_ahead(&by_date, today));
        let next_exceptions = views
            .contains(CalendarView::NextExceptions)
            .then(|| next_exceptions(&by_date, today));
        Calendar {
            by_date: views.contains(CalendarView::ByDate).then_some(by_date),
            days_ahead,
            next_exceptions,
        }
    }
}

/// Re-key the days around today by their offset from it.
///
/// Offsets whose date was not fetched are left out.
pub fn days_ahead(by_date: &ByDate, today: NaiveDate) -> DaysAhead {
    let days_ahead: DaysAhead = DAYS_AHEAD_WINDOW
        .filter_map(|offset| {
            let date = today + Duration::days(offset);
            by_date.get(&date).map(|day| (offset, day.clone()))
        })
        .collect();
    debug!(days = days_ahead.len(), "built days ahead");
    days_ahead
}

/// Find the first exception of every service, starting today.
pub fn next_exceptions(by_date: &ByDate, today: NaiveDate) -> NextExceptions {
    let mut next_exceptions = NextExceptions::default();
    for day in by_date.range(today..).map(|(_, day)| day) {
        for entry in day.iter().filter(|entry| entry.is_exception()) {
            let slot = next_exceptions.slot_mut(entry.service);
            if slot.is_none() {
                *slot = Some(entry.clone());
            }
        }
        if next_exceptions.is_complete() {
            break;
        }
    }
    debug!("built next exceptions");
    next_exceptions
}
