#[cfg(test)]
mod form_tests {
    use chrono::NaiveDate;

    use crate::error::ServiceError;
    use crate::models::booking::{BookingUpdate, NewBooking};
    use crate::models::common::PaginationParams;
    use crate::models::form::{
        is_valid_email, validate_booking_update, validate_contact, validate_new_booking,
        BookingForm, ADMIN_MIN_NAME_LEN, VISITOR_MIN_NAME_LEN,
    };

    fn complete_form() -> BookingForm {
        BookingForm {
            meeting_type_id: Some("1".to_string()),
            date: NaiveDate::from_ymd_opt(2035, 6, 10),
            time: Some("2:30 PM".to_string()),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            notes: None,
            calendar: None,
        }
    }

    #[test]
    fn test_selection_complete() {
        let selection = complete_form().selection().unwrap();
        assert_eq!(selection.meeting_type_id, "1");
        assert_eq!(selection.time, "2:30 PM");
    }

    #[test]
    fn test_selection_reports_all_missing_parts() {
        let form = BookingForm {
            meeting_type_id: None,
            date: None,
            time: Some("   ".to_string()),
            ..complete_form()
        };

        match form.selection() {
            Err(ServiceError::MissingSelection(message)) => {
                assert!(message.contains("meeting type"));
                assert!(message.contains("date"));
                assert!(message.contains("time"));
            }
            other => panic!("expected MissingSelection, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_notes_are_absent() {
        let mut form = complete_form();
        form.notes = Some("  \n ".to_string());
        assert_eq!(form.notes(), None);

        form.notes = Some(" bring slides ".to_string());
        assert_eq!(form.notes().as_deref(), Some("bring slides"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email(".ada@example.com"));
        assert!(!is_valid_email("ada..l@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_validate_contact_visitor_rules() {
        assert!(validate_contact("Al", "al@example.com", VISITOR_MIN_NAME_LEN).is_ok());

        match validate_contact("A", "nope", VISITOR_MIN_NAME_LEN) {
            Err(ServiceError::Validation(message)) => {
                assert!(message.contains("at least 2 characters"));
                assert!(message.contains("valid email"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_contact_admin_rules() {
        assert!(validate_contact("A", "a@example.com", ADMIN_MIN_NAME_LEN).is_ok());
        assert!(validate_contact("", "a@example.com", ADMIN_MIN_NAME_LEN).is_err());
    }

    #[test]
    fn test_validate_new_booking_requires_time_and_type() {
        let mut booking = NewBooking {
            date: NaiveDate::from_ymd_opt(2035, 1, 2).unwrap(),
            time: "9:00 AM".to_string(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            meeting_type: "2".to_string(),
            notes: None,
        };
        assert!(validate_new_booking(&booking).is_ok());

        booking.time = String::new();
        assert!(validate_new_booking(&booking).is_err());

        booking.time = "9:00 AM".to_string();
        booking.meeting_type = " ".to_string();
        assert!(validate_new_booking(&booking).is_err());
    }

    #[test]
    fn test_validate_booking_update() {
        assert!(validate_booking_update(&BookingUpdate::default()).is_err());

        let update = BookingUpdate {
            email: Some("bad".to_string()),
            ..Default::default()
        };
        assert!(validate_booking_update(&update).is_err());

        let update = BookingUpdate {
            notes: Some("moved to the afternoon".to_string()),
            ..Default::default()
        };
        assert!(validate_booking_update(&update).is_ok());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=45).collect();

        let first = PaginationParams { page: 1, page_size: 20 };
        assert_eq!(first.paginate(&items), (1..=20).collect::<Vec<_>>());

        let last = PaginationParams { page: 3, page_size: 20 };
        assert_eq!(last.paginate(&items), (41..=45).collect::<Vec<_>>());

        let beyond = PaginationParams { page: 9, page_size: 20 };
        assert!(beyond.paginate(&items).is_empty());

        // Page 0 is treated as the first page
        let zero = PaginationParams { page: 0, page_size: 5 };
        assert_eq!(zero.paginate(&items), vec![1, 2, 3, 4, 5]);
    }
}
