use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::ScheduledBooking;

#[derive(Clone)]
pub struct ICalExporter {
    gym_title: String,
    gym_location: String,
}

impl ICalExporter {
    pub fn new(gym_title: impl Into<String>, gym_location: impl Into<String>) -> Self {
        Self {
            gym_title: gym_title.into(),
            gym_location: gym_location.into(),
        }
    }

    pub fn generate(&self, client_name: &str, agenda: &[ScheduledBooking]) -> Vec<u8> {
        if agenda.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(&format!("{} bookings: {}", self.gym_title, client_name));

        for entry in agenda {
            let mut event = Event::new();
            event.summary(&format!("{}: {}", self.gym_title, entry.class.name));
            event.starts(entry.starts_at());
            event.ends(entry.ends_at());
            event.location(&self.gym_location);

            let mut description = format!(
                "Instructor: {}\nStatus: {}",
                entry.class.instructor, entry.booking.status
            );
            if let Some(position) = entry.booking.waiting_position {
                description.push_str(&format!("\nWaiting list position: {position}"));
            }
            event.description(&description);
            event.uid(&format!("{}-gym-booking", entry.booking.id));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
    use uuid::Uuid;

    use super::*;
    use crate::models::{Booking, BookingStatus, ClassSchedule};

    fn entry(waiting_position: Option<u32>) -> ScheduledBooking {
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
        let booking = Booking {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            class_id: class.id,
            date: NaiveDate::from_ymd_opt(2025, 11, 24).unwrap(),
            status: BookingStatus::Reserved,
            is_waiting_list: waiting_position.is_some(),
            waiting_position,
            reserved_at: NaiveDateTime::parse_from_str("2025-11-20 10:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            cancelled_at: None,
            cancellation_reason: None,
        };
        ScheduledBooking { booking, class }
    }

    #[test]
    fn test_generate_single_booking() {
        let exporter = ICalExporter::new("Test Gym", "Main Street 1");
        let bytes = exporter.generate("Anna", &[entry(None)]);
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("BEGIN:VEVENT"));
        assert!(body.contains("Test Gym: WOD"));
        assert!(body.contains("20251124T060000"));
    }

    #[test]
    fn test_generate_marks_waiting_list() {
        let exporter = ICalExporter::new("Test Gym", "Main Street 1");
        let body = String::from_utf8(exporter.generate("Anna", &[entry(Some(2))])).unwrap();
        assert!(body.contains("Waiting list position: 2"));
    }

    #[test]
    fn test_generate_empty() {
        let exporter = ICalExporter::new("Test Gym", "Main Street 1");
        assert!(exporter.generate("Anna", &[]).is_empty());
    }
}
