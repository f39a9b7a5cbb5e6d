//! The services reported by the calendar and the statuses they can be in.
//!
//! Upstream strings are matched exactly against static tables. Anything else is unknown.

use std::fmt;

use serde::Serialize;

static UPSTREAM_PARKING: &str = "Alternate Side Parking";
static UPSTREAM_TRASH: &str = "Collections";
static UPSTREAM_SCHOOL: &str = "Schools";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Alternate side parking and meters.
    Parking,
    /// Trash, recycling and compost collections.
    Trash,
    /// Public schools.
    School,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::Parking,
        ServiceType::Trash,
        ServiceType::School,
    ];

    /// Map the `type` field of a calendar item.
    pub fn from_upstream(value: &str) -> Option<Self> {
        ServiceType::ALL
            .into_iter()
            .find(|service| service.upstream() == value)
    }

    /// The `type` string the API uses for this service.
    pub fn upstream(self) -> &'static str {
        match self {
            ServiceType::Parking => UPSTREAM_PARKING,
            ServiceType::Trash => UPSTREAM_TRASH,
            ServiceType::School => UPSTREAM_SCHOOL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ServiceType::Parking => "Parking",
            ServiceType::Trash => "Sanitation",
            ServiceType::School => "School",
        }
    }

    /// The term used when this service deviates from its schedule.
    pub fn exception_name(self) -> &'static str {
        match self {
            ServiceType::Parking => "Rule Suspension",
            ServiceType::Trash => "Collection Suspension",
            ServiceType::School => "Closure",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    InEffect,
    NotInEffect,
    OnSchedule,
    Delayed,
    Suspended,
    CompostSuspended,
    TrashAndRecyclingSuspended,
    Open,
    Closed,
    PartlyOpen,
    NotInSession,
    RemoteOnly,
    StaffOnly,
    Tentative,
    NoInformation,
}

impl Status {
    /// Look up the status an upstream `status` string stands for, for the given service.
    ///
    /// The same string can be valid for one service and unknown for another.
    pub fn from_upstream(
        service: ServiceType,
        value: &str,
    ) -> Option<(Status, &'static StatusDetail)> {
        STATUS_TABLE
            .iter()
            .find(|mapping| mapping.service == service && mapping.upstream == value)
            .map(|mapping| (mapping.status, &mapping.detail))
    }

    /// The detail of this status for a service, if the service can be in this status at all.
    pub fn detail(self, service: ServiceType) -> Option<&'static StatusDetail> {
        STATUS_TABLE
            .iter()
            .find(|mapping| mapping.service == service && mapping.status == self)
            .map(|mapping| &mapping.detail)
    }
}

/// The impact of a status, comparable across services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionType {
    /// School open, trash collected, parking rules in effect.
    NormalActive,
    /// Regularly scheduled downtime, e.g. no collection on Sundays.
    NormalSuspended,
    Suspended,
    Delayed,
    /// Service runs only partly, e.g. school open for staff only.
    Partial,
    Unsure,
    Recess,
    Remote,
}

impl ExceptionType {
    /// Whether the service runs the way it normally does on this kind of day.
    pub fn is_normal(self) -> bool {
        matches!(self, ExceptionType::NormalActive | ExceptionType::NormalSuspended)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDetail {
    pub name: &'static str,
    pub exception_type: ExceptionType,
    pub description: &'static str,
}

struct StatusMapping {
    service: ServiceType,
    upstream: &'static str,
    status: Status,
    detail: StatusDetail,
}

const fn mapping(
    service: ServiceType,
    upstream: &'static str,
    status: Status,
    name: &'static str,
    exception_type: ExceptionType,
    description: &'static str,
) -> StatusMapping {
    StatusMapping {
        service,
        upstream,
        status,
        detail: StatusDetail {
            name,
            exception_type,
            description,
        },
    }
}

// Upstream strings must match the API exactly.
static STATUS_TABLE: [StatusMapping; 19] = [
    mapping(
        ServiceType::Parking,
        "IN EFFECT",
        Status::InEffect,
        "In Effect",
        ExceptionType::NormalActive,
        "Alternate side parking and meters are in effect.",
    ),
    mapping(
        ServiceType::Parking,
        "NO INFORMATION",
        Status::NoInformation,
        "No Information",
        ExceptionType::Unsure,
        "Information is not available for this date.",
    ),
    mapping(
        ServiceType::Parking,
        "NOT IN EFFECT",
        Status::NotInEffect,
        "Not In Effect",
        ExceptionType::NormalSuspended,
        "Alternate side parking and meters are not in effect on Sundays.",
    ),
    mapping(
        ServiceType::Parking,
        "SUSPENDED",
        Status::Suspended,
        "Suspended",
        ExceptionType::Suspended,
        "Alternate side parking and meters are suspended.",
    ),
    mapping(
        ServiceType::Trash,
        "COMPOST SUSPENDED",
        Status::CompostSuspended,
        "Compost Collection Suspended",
        ExceptionType::Partial,
        "Compost collection is suspended. Trash and recycling collections are on schedule.",
    ),
    mapping(
        ServiceType::Trash,
        "DELAYED",
        Status::Delayed,
        "Delayed",
        ExceptionType::Delayed,
        "Trash, recycling, and compost collections are delayed.",
    ),
    mapping(
        ServiceType::Trash,
        "NO INFORMATION",
        Status::NoInformation,
        "To Be Determined",
        ExceptionType::Unsure,
        "Schedule for this day has not yet been determined.",
    ),
    mapping(
        ServiceType::Trash,
        "NOT IN EFFECT",
        Status::NotInEffect,
        "Not In Effect",
        ExceptionType::NormalSuspended,
        "Trash, recycling, and compost collections are not in effect on Sundays.",
    ),
    mapping(
        ServiceType::Trash,
        "ON SCHEDULE",
        Status::OnSchedule,
        "On Schedule",
        ExceptionType::NormalActive,
        "Trash, recycling, and compost collection are operating as usual.",
    ),
    mapping(
        ServiceType::Trash,
        "SUSPENDED",
        Status::Suspended,
        "Suspended",
        ExceptionType::Suspended,
        "Trash, recycling, and compost collections are suspended.",
    ),
    mapping(
        ServiceType::Trash,
        "COLLECTION AND RECYCLING SUSPENDED",
        Status::TrashAndRecyclingSuspended,
        "Trash and Recycling Collection Suspended",
        ExceptionType::Partial,
        "Trash and recycling collections are suspended. Compost collection is on schedule.",
    ),
    mapping(
        ServiceType::School,
        "CLOSED",
        Status::Closed,
        "Closed",
        ExceptionType::Suspended,
        "School is closed for the summer.",
    ),
    mapping(
        ServiceType::School,
        "NO INFORMATION",
        Status::NoInformation,
        "No Information",
        ExceptionType::Unsure,
        "Information is not available for this date.",
    ),
    mapping(
        ServiceType::School,
        "NOT IN SESSION",
        Status::NotInSession,
        "Not In Session",
        ExceptionType::Suspended,
        "Schools are closed.",
    ),
    mapping(
        ServiceType::School,
        "OPEN",
        Status::Open,
        "Open",
        ExceptionType::NormalActive,
        "School is open as usual.",
    ),
    mapping(
        ServiceType::School,
        "PARTLY OPEN",
        Status::PartlyOpen,
        "Partly Open",
        ExceptionType::Partial,
        "School is open for some students and not others.",
    ),
    mapping(
        ServiceType::School,
        "REMOTE ONLY",
        Status::RemoteOnly,
        "Remote Only",
        ExceptionType::Remote,
        "Students are scheduled for remote learning.",
    ),
    mapping(
        ServiceType::School,
        "STAFF ONLY",
        Status::StaffOnly,
        "Closed for Students",
        ExceptionType::Partial,
        "Schools are closed for students but open for staff.",
    ),
    mapping(
        ServiceType::School,
        "TENTATIVE",
        Status::Tentative,
        "Tentative",
        ExceptionType::Unsure,
        "Schedule for this day has not yet been determined.",
    ),
];

#[cfg(test)]
mod tests {
    use crate::service::{ExceptionType, ServiceType, Status, STATUS_TABLE};

    #[test]
    fn test_service_from_upstream() {
        assert_eq!(
            ServiceType::from_upstream("Alternate Side Parking"),
            Some(ServiceType::Parking)
        );
        assert_eq!(ServiceType::from_upstream("Collections"), Some(ServiceType::Trash));
        assert_eq!(ServiceType::from_upstream("Schools"), Some(ServiceType::School));
        assert_eq!(ServiceType::from_upstream("schools"), None);
        assert_eq!(ServiceType::from_upstream("Ferries"), None);
    }

    #[test]
    fn test_status_from_upstream() {
        let (status, detail) = Status::from_upstream(ServiceType::Parking, "IN EFFECT").unwrap();
        assert_eq!(status, Status::InEffect);
        assert_eq!(detail.exception_type, ExceptionType::NormalActive);
        let (status, detail) = Status::from_upstream(ServiceType::Trash, "ON SCHEDULE").unwrap();
        assert_eq!(status, Status::OnSchedule);
        assert_eq!(detail.name, "On Schedule");
        let (status, detail) = Status::from_upstream(ServiceType::School, "STAFF ONLY").unwrap();
        assert_eq!(status, Status::StaffOnly);
        assert_eq!(detail.exception_type, ExceptionType::Partial);
    }

    #[test]
    fn test_status_from_upstream_is_per_service() {
        assert!(Status::from_upstream(ServiceType::School, "OPEN").is_some());
        assert!(Status::from_upstream(ServiceType::Parking, "OPEN").is_none());
        assert!(Status::from_upstream(ServiceType::Trash, "IN EFFECT").is_none());
        assert!(Status::from_upstream(ServiceType::Parking, "SNOWED IN").is_none());
    }

    #[test]
    fn test_no_information_name_differs_per_service() {
        assert_eq!(
            Status::NoInformation.detail(ServiceType::Trash).unwrap().name,
            "To Be Determined"
        );
        assert_eq!(
            Status::NoInformation.detail(ServiceType::School).unwrap().name,
            "No Information"
        );
        assert!(Status::StaffOnly.detail(ServiceType::Parking).is_none());
    }

    #[test]
    fn test_status_table_has_no_duplicate_keys() {
        for (i, a) in STATUS_TABLE.iter().enumerate() {
            for b in &STATUS_TABLE[i + 1..] {
                assert!(!(a.service == b.service && a.upstream == b.upstream));
                assert!(!(a.service == b.service && a.status == b.status));
            }
        }
    }

    #[test]
    fn test_every_service_has_a_normal_active_status() {
        for service in ServiceType::ALL {
            assert!(STATUS_TABLE.iter().any(|mapping| mapping.service == service
                && mapping.detail.exception_type == ExceptionType::NormalActive));
        }
    }

    #[test]
    fn test_is_normal() {
        assert!(ExceptionType::NormalActive.is_normal());
        assert!(ExceptionType::NormalSuspended.is_normal());
        assert!(!ExceptionType::Partial.is_normal());
        assert!(!ExceptionType::Unsure.is_normal());
    }
}
