use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Recurring weekly class template. A concrete session is this template on
/// one calendar date falling on `day_of_week`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassSchedule {
    pub id: Uuid,
    pub name: String,
    pub instructor: String,
    #[schema(value_type = String, example = "Mon")]
    pub day_of_week: Weekday,
    #[schema(value_type = String, format = "time", example = "06:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, format = "time", example = "07:00:00")]
    pub end_time: NaiveTime,
    pub max_capacity: u32,
    pub cancel_hours_before: u32,
    pub is_active: bool,
}

impl ClassSchedule {
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        date.weekday() == self.day_of_week
    }

    pub fn occurrence(&self, date: NaiveDate) -> ClassOccurrence<'_> {
        ClassOccurrence { class: self, date }
    }
}

/// A class template pinned to a calendar date.
#[derive(Debug, Clone, Copy)]
pub struct ClassOccurrence<'a> {
    pub class: &'a ClassSchedule,
    pub date: NaiveDate,
}

impl ClassOccurrence<'_> {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.class.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.class.end_time)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    Cancelled,
    Attended,
    NoShow,
}

impl BookingStatus {
    /// Reserved or confirmed: the booking can still change state.
    pub fn is_open(self) -> bool {
        matches!(self, BookingStatus::Reserved | BookingStatus::Confirmed)
    }

    /// Statuses that hold a seat when the booking is not on the waiting list.
    pub fn holds_seat(self) -> bool {
        matches!(
            self,
            BookingStatus::Reserved | BookingStatus::Confirmed | BookingStatus::Attended
        )
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Reserved, Confirmed | Cancelled | Attended | NoShow)
                | (Confirmed, Cancelled | Attended | NoShow)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Reserved => "reserved",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Attended => "attended",
            BookingStatus::NoShow => "no_show",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub status: BookingStatus,
    pub is_waiting_list: bool,
    pub waiting_position: Option<u32>,
    #[schema(value_type = String, format = "date-time", example = "2025-11-24T06:00:00")]
    pub reserved_at: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancellation_reason: Option<String>,
}

impl Booking {
    /// Counted against the session's capacity.
    pub fn is_active(&self) -> bool {
        !self.is_waiting_list && self.status.holds_seat()
    }

    /// Still queued for a seat.
    pub fn is_waiting(&self) -> bool {
        self.is_waiting_list && self.status.is_open()
    }
}

/// A booking together with the class it was made for.
#[derive(Debug, Clone)]
pub struct ScheduledBooking {
    pub booking: Booking,
    pub class: ClassSchedule,
}

impl ScheduledBooking {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.class.occurrence(self.booking.date).starts_at()
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.class.occurrence(self.booking.date).ends_at()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub has_active_membership: bool,
    pub classes_used: u32,
}

/// Capacity snapshot of one class session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SessionSummary {
    pub class_id: Uuid,
    pub class_name: String,
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub starts_at: NaiveDateTime,
    pub capacity: u32,
    pub active: u32,
    pub waiting: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewClass {
    pub name: String,
    pub instructor: String,
    #[schema(value_type = String, example = "Mon")]
    pub day_of_week: Weekday,
    #[schema(value_type = String, format = "time", example = "06:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, format = "time", example = "07:00:00")]
    pub end_time: NaiveTime,
    pub max_capacity: u32,
    #[serde(default)]
    pub cancel_hours_before: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub has_active_membership: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReserveRequest {
    pub client_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Result of a cancellation: the cancelled booking and the waiting-list
/// entry that took its seat, if any.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Cancellation {
    pub cancelled: Booking,
    pub promoted: Option<Booking>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;
        assert!(Reserved.can_transition_to(Confirmed));
        assert!(Reserved.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(Attended));
        assert!(!Confirmed.can_transition_to(Reserved));
        for terminal in [Cancelled, Attended, NoShow] {
            for next in [Reserved, Confirmed, Cancelled, Attended, NoShow] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_occurrence_start() {
        let class = ClassSchedule {
            id: Uuid::new_v4(),
            name: "WOD".to_string(),
            instructor: "Coach".to_string(),
            day_of_week: Weekday::Mon,
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            max_capacity: 10,
            cancel_hours_before: 2,
            is_active: true,
        };
        let monday = NaiveDate::from_ymd_opt(2025, 11, 24).unwrap();
        assert!(class.runs_on(monday));
        assert!(!class.runs_on(monday.succ_opt().unwrap()));
        assert_eq!(
            class.occurrence(monday).starts_at(),
            NaiveDateTime::parse_from_str("2025-11-24 06:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&BookingStatus::NoShow).unwrap();
        assert_eq!(json, r#""no_show""#);
    }
}
