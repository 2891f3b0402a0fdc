#[cfg(test)]
mod availability_tests {
    use chrono::NaiveDate;
    use std::time::Duration;

    use crate::services::availability::{
        format_slot_label, AvailabilitySource, FixedAvailability, SimulatedAvailability,
    };
    use crate::services::time_slots::label_minutes_of_day;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2035, 6, 12).unwrap()
    }

    #[test]
    fn test_format_slot_label() {
        assert_eq!(format_slot_label(0, 0), "12:00 AM");
        assert_eq!(format_slot_label(9, 30), "9:30 AM");
        assert_eq!(format_slot_label(12, 0), "12:00 PM");
        assert_eq!(format_slot_label(13, 30), "1:30 PM");
        assert_eq!(format_slot_label(16, 0), "4:00 PM");
    }

    #[tokio::test]
    async fn test_simulated_slots_are_within_working_hours() {
        for seed in 0..20 {
            let source = SimulatedAvailability::with_seed(seed, Duration::ZERO);
            let times = source.available_times(date()).await.unwrap();

            assert!(times.len() >= 3, "seed {} produced {:?}", seed, times);

            let minutes: Vec<u32> = times
                .iter()
                .map(|t| label_minutes_of_day(t).expect("label should parse"))
                .collect();

            // Between 9:00 AM and 4:30 PM, half-hour aligned
            assert!(minutes.iter().all(|m| (540..=990).contains(m) && m % 30 == 0));

            // Strictly increasing means sorted with no duplicates
            assert!(minutes.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[tokio::test]
    async fn test_simulated_is_reproducible_with_seed() {
        let a = SimulatedAvailability::with_seed(42, Duration::ZERO);
        let b = SimulatedAvailability::with_seed(42, Duration::ZERO);

        assert_eq!(
            a.available_times(date()).await.unwrap(),
            b.available_times(date()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_fixed_availability_sorts_by_clock() {
        let source = FixedAvailability::new(["3:00 PM", "10:00 AM", "1:30 PM", "10:00 AM"]);
        let times = source.available_times(date()).await.unwrap();
        assert_eq!(times, vec!["10:00 AM", "1:30 PM", "3:00 PM"]);
    }
}
