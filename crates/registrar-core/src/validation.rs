use crate::error::EventError;
use crate::types::{CreateEventInput, UpdateEventInput};

pub fn validate_event_input(input: &CreateEventInput) -> Result<(), EventError> {
    if input.title.trim().is_empty() {
        return Err(EventError::InvalidInput {
            message: "title must not be empty".to_string(),
        });
    }
    if input.time.trim().is_empty() {
        return Err(EventError::InvalidInput {
            message: "time must not be empty".to_string(),
        });
    }
    if input.price < 0 {
        return Err(EventError::InvalidInput {
            message: "price must not be negative".to_string(),
        });
    }
    Ok(())
}

pub fn validate_event_update(input: &UpdateEventInput) -> Result<(), EventError> {
    if input.is_empty() {
        return Err(EventError::InvalidInput {
            message: "update must change at least one field".to_string(),
        });
    }
    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(EventError::InvalidInput {
                message: "title must not be empty".to_string(),
            });
        }
    }
    if let Some(price) = input.price {
        if price < 0 {
            return Err(EventError::InvalidInput {
                message: "price must not be negative".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input() -> CreateEventInput {
        CreateEventInput {
            title: "UX Trends Workshop".to_string(),
            description: "A look ahead.".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
            time: "15:00 EST".to_string(),
            max_seats: 200,
            price: 500,
            is_virtual: true,
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(validate_event_input(&input()).is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        let mut bad = input();
        bad.title = "   ".to_string();
        assert!(matches!(
            validate_event_input(&bad),
            Err(EventError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rejects_negative_price() {
        let mut bad = input();
        bad.price = -1;
        assert!(validate_event_input(&bad).is_err());
    }

    #[test]
    fn rejects_empty_update() {
        let update = UpdateEventInput {
            title: None,
            description: None,
            date: None,
            time: None,
            max_seats: None,
            price: None,
            is_virtual: None,
        };
        assert!(validate_event_update(&update).is_err());
    }
}
