#[cfg(test)]
mod booking_tests {
    use chrono::{NaiveDate, Timelike, Utc};
    use tempfile::tempdir;

    use crate::error::{CalendarError, ServiceError, StoreError};
    use crate::models::calendar::{AddToCalendar, CalendarConnection, CalendarProvider};
    use crate::models::form::BookingForm;
    use crate::models::meeting::default_meeting_types;
    use crate::services::booking::{booking_ics, submit_booking, BookingContext};
    use crate::services::calendar::{CalendarService, ProviderDelays};
    use crate::services::database::{BookingStore, DatabaseService, MockBookingStore};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2035, 1, 1).unwrap()
    }

    fn meeting_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2035, 6, 12).unwrap()
    }

    fn valid_form() -> BookingForm {
        BookingForm {
            meeting_type_id: Some("2".to_string()),
            date: Some(meeting_day()),
            time: Some("10:00 AM".to_string()),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            notes: None,
            calendar: None,
        }
    }

    fn connection(provider: CalendarProvider) -> CalendarConnection {
        CalendarConnection {
            provider,
            connected_at: Utc::now(),
            calendar_url: match provider {
                CalendarProvider::Apple => Some("webcal://example.com/cal".to_string()),
                CalendarProvider::Google => None,
            },
        }
    }

    // Store that must never be written to
    fn untouched_store() -> MockBookingStore {
        let mut store = MockBookingStore::new();
        store.expect_create().times(0);
        store
    }

    async fn submit(
        store: &dyn BookingStore,
        form: BookingForm,
    ) -> Result<crate::services::booking::BookingConfirmation, ServiceError> {
        let calendar = CalendarService::new(ProviderDelays::none());
        let meeting_types = default_meeting_types();
        let ctx = BookingContext {
            store,
            calendar: &calendar,
            meeting_types: &meeting_types,
            today: today(),
        };
        submit_booking(&ctx, form).await
    }

    #[tokio::test]
    async fn test_submit_booking_without_connection() {
        let mut store = MockBookingStore::new();
        store
            .expect_create()
            .times(1)
            .withf(|b| {
                b.meeting_type == "2" && b.time == "10:00 AM" && b.name == "Ada Lovelace"
            })
            .returning(|_| Ok("booking123".to_string()));

        let confirmation = submit(&store, valid_form()).await.unwrap();

        assert_eq!(confirmation.booking_id, "booking123");
        assert_eq!(confirmation.meeting_type.name, "Standard Meeting");
        assert_eq!(confirmation.start.hour(), 10);
        assert_eq!(confirmation.start.minute(), 0);
        assert_eq!((confirmation.end - confirmation.start).num_minutes(), 30);
        assert!(confirmation.calendar_event_id.is_none());
        assert_eq!(confirmation.ics_path, "/bookings/booking123/calendar.ics");
        assert!(confirmation
            .google_calendar_url
            .starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(confirmation
            .google_calendar_url
            .contains("details=Meeting+with+Ada+Lovelace"));
        assert_eq!(
            confirmation.add_to_calendar,
            AddToCalendar::DownloadIcs {
                path: "/bookings/booking123/calendar.ics".to_string(),
                filename: "meeting.ics".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_submit_booking_trims_contact_and_notes() {
        let mut store = MockBookingStore::new();
        store
            .expect_create()
            .withf(|b| {
                b.name == "Grace" && b.email == "grace@example.com" && b.notes.is_none()
            })
            .returning(|_| Ok("id".to_string()));

        let mut form = valid_form();
        form.name = "  Grace ".to_string();
        form.email = " grace@example.com ".to_string();
        form.notes = Some("   ".to_string());

        let confirmation = submit(&store, form).await.unwrap();
        assert_eq!(confirmation.name, "Grace");
        assert!(confirmation.notes.is_none());
    }

    #[tokio::test]
    async fn test_quick_chat_lasts_fifteen_minutes() {
        let mut store = MockBookingStore::new();
        store.expect_create().returning(|_| Ok("quick".to_string()));

        let mut form = valid_form();
        form.meeting_type_id = Some("1".to_string());
        form.time = Some("2:30 PM".to_string());

        let confirmation = submit(&store, form).await.unwrap();
        assert_eq!(confirmation.start.hour(), 14);
        assert_eq!(confirmation.start.minute(), 30);
        assert_eq!((confirmation.end - confirmation.start).num_minutes(), 15);
    }

    #[tokio::test]
    async fn test_google_connection_opens_deep_link() {
        let mut store = MockBookingStore::new();
        store.expect_create().returning(|_| Ok("g1".to_string()));

        let mut form = valid_form();
        form.calendar = Some(connection(CalendarProvider::Google));

        let confirmation = submit(&store, form).await.unwrap();

        let event_id = confirmation.calendar_event_id.clone().unwrap();
        assert!(event_id.starts_with("event_"));
        assert_eq!(
            confirmation.add_to_calendar,
            AddToCalendar::OpenUrl {
                url: confirmation.google_calendar_url.clone(),
            }
        );
    }

    #[tokio::test]
    async fn test_apple_connection_downloads_apple_file() {
        let mut store = MockBookingStore::new();
        store.expect_create().returning(|_| Ok("a1".to_string()));

        let mut form = valid_form();
        form.calendar = Some(connection(CalendarProvider::Apple));

        let confirmation = submit(&store, form).await.unwrap();

        assert!(confirmation.calendar_event_id.is_some());
        assert_eq!(
            confirmation.add_to_calendar,
            AddToCalendar::DownloadIcs {
                path: "/bookings/a1/calendar.ics?provider=apple".to_string(),
                filename: "apple-calendar-event.ics".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_selection_is_rejected_first() {
        let store = untouched_store();

        // Contact details are also invalid, but the selection is checked first
        let form = BookingForm {
            time: Some("10:00 AM".to_string()),
            ..Default::default()
        };

        match submit(&store, form).await {
            Err(ServiceError::MissingSelection(message)) => {
                assert!(message.contains("meeting type"));
                assert!(message.contains("date"));
                assert!(!message.contains("time"));
            }
            other => panic!("expected MissingSelection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_meeting_type() {
        let store = untouched_store();
        let mut form = valid_form();
        form.meeting_type_id = Some("99".to_string());

        assert!(matches!(
            submit(&store, form).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_contact() {
        let store = untouched_store();
        let mut form = valid_form();
        form.name = "A".to_string();
        form.email = "not-an-email".to_string();

        match submit(&store, form).await {
            Err(ServiceError::Validation(message)) => {
                assert!(message.contains("at least 2 characters"));
                assert!(message.contains("valid email"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_past_date_is_rejected() {
        let store = untouched_store();
        let mut form = valid_form();
        form.date = NaiveDate::from_ymd_opt(2034, 12, 31);

        assert!(matches!(
            submit(&store, form).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_booking_today_is_allowed() {
        let mut store = MockBookingStore::new();
        store.expect_create().returning(|_| Ok("today".to_string()));

        let mut form = valid_form();
        form.date = Some(today());

        assert!(submit(&store, form).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_time_label_is_not_stored() {
        let store = untouched_store();
        let mut form = valid_form();
        form.time = Some("13:00".to_string());

        assert!(matches!(
            submit(&store, form).await,
            Err(ServiceError::Calendar(CalendarError::InvalidTimeFormat(label))) if label == "13:00"
        ));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_external_service() {
        let mut store = MockBookingStore::new();
        store
            .expect_create()
            .returning(|_| Err(StoreError::Lock("poisoned".to_string())));

        assert!(matches!(
            submit(&store, valid_form()).await,
            Err(ServiceError::ExternalService(_))
        ));
    }

    #[tokio::test]
    async fn test_booking_ics_for_stored_booking() {
        let dir = tempdir().unwrap();
        let store = DatabaseService::new(dir.path().join("bookings.csv")).unwrap();

        let mut form = valid_form();
        form.notes = Some("Bring the roadmap".to_string());
        let confirmation = submit(&store, form).await.unwrap();

        let types = default_meeting_types();
        let (ics, filename) = booking_ics(&store, &types, &confirmation.booking_id, None).unwrap();

        assert_eq!(filename, "meeting.ics");
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("SUMMARY:Meeting: Standard Meeting\r\n"));
        assert!(ics.contains("DESCRIPTION:Bring the roadmap\r\n"));
        assert_eq!(ics.split("\r\n").count(), 14);

        let (_, apple) = booking_ics(
            &store,
            &types,
            &confirmation.booking_id,
            Some(CalendarProvider::Apple),
        )
        .unwrap();
        assert_eq!(apple, "apple-calendar-event.ics");
    }

    #[test]
    fn test_booking_ics_unknown_booking() {
        let mut store = MockBookingStore::new();
        store.expect_get().returning(|_| Ok(None));

        let result = booking_ics(&store, &default_meeting_types(), "missing", None);
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
