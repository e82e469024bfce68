use thiserror::Error;

use crate::models::{NewClass, NewClient};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub fn validate_new_class(class: &NewClass) -> Result<(), ValidationError> {
    if class.name.trim().is_empty() {
        return Err(ValidationError("class name must not be empty".into()));
    }
    if class.instructor.trim().is_empty() {
        return Err(ValidationError("instructor must not be empty".into()));
    }
    if class.start_time >= class.end_time {
        return Err(ValidationError("class must end after it starts".into()));
    }
    if class.max_capacity == 0 {
        return Err(ValidationError("max_capacity must be at least 1".into()));
    }
    Ok(())
}

pub fn validate_new_client(client: &NewClient) -> Result<(), ValidationError> {
    if client.name.trim().is_empty() {
        return Err(ValidationError("client name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Weekday};

    use super::*;

    fn class() -> NewClass {
        NewClass {
            name: "WOD".to_string(),
            instructor: "Coach".to_string(),
            day_of_week: Weekday::Wed,
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            max_capacity: 12,
            cancel_hours_before: 2,
        }
    }

    #[test]
    fn test_validate_new_class() {
        assert!(validate_new_class(&class()).is_ok());
        assert!(validate_new_class(&NewClass { max_capacity: 0, ..class() }).is_err());
        assert!(validate_new_class(&NewClass { name: " ".into(), ..class() }).is_err());
        assert!(
            validate_new_class(&NewClass {
                end_time: NaiveTime::from_hms_opt(5, 0, 0).unwrap(),
                ..class()
            })
            .is_err()
        );
    }

    #[test]
    fn test_validate_new_client() {
        let client = NewClient {
            name: "Anna".into(),
            has_active_membership: true,
        };
        assert!(validate_new_client(&client).is_ok());
        assert!(validate_new_client(&NewClient { name: String::new(), ..client }).is_err());
    }
}
