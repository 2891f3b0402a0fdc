use chrono::NaiveDate;
use futures::future::BoxFuture;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::services::time_slots::sort_time_slot_labels;

/// Source of bookable time slots for a calendar date.
///
/// Implementations return display labels such as `"10:00 AM"`, ordered by
/// time of day.
pub trait AvailabilitySource: Send + Sync {
    fn available_times(&self, date: NaiveDate) -> BoxFuture<'_, ServiceResult<Vec<String>>>;
}

const FIRST_HOUR: u32 = 9;
const LAST_HOUR: u32 = 17; // exclusive
const SLOT_PROBABILITY: f64 = 0.4;
const MIN_SLOTS: usize = 3;
const FALLBACK_SLOTS: [&str; 3] = ["10:00 AM", "1:30 PM", "3:00 PM"];

pub const SIMULATED_AVAILABILITY_DELAY: Duration = Duration::from_millis(800);

// 12-hour display label for a 24-hour clock value
pub fn format_slot_label(hour: u32, minute: u32) -> String {
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minute, meridiem)
}

/// Stand-in for a real calendar provider.
///
/// Simulates a busy working day: every half hour between 9 AM and 5 PM is
/// free with a fixed probability, and at least three slots are always offered.
pub struct SimulatedAvailability {
    rng: Mutex<StdRng>,
    delay: Duration,
}

impl SimulatedAvailability {
    pub fn new(delay: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            delay,
        }
    }

    /// Reproducible availability for tests and demos
    pub fn with_seed(seed: u64, delay: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            delay,
        }
    }

    fn generate(&self) -> ServiceResult<Vec<String>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| ServiceError::ExternalService(format!("Availability RNG poisoned: {}", e)))?;

        let mut times = Vec::new();
        for hour in FIRST_HOUR..LAST_HOUR {
            if rng.gen_bool(SLOT_PROBABILITY) {
                times.push(format_slot_label(hour, 0));
            }
            if rng.gen_bool(SLOT_PROBABILITY) {
                times.push(format_slot_label(hour, 30));
            }
        }

        // Ensure we always offer something
        if times.len() < MIN_SLOTS {
            times.extend(FALLBACK_SLOTS.iter().map(|s| s.to_string()));
        }

        Ok(sort_time_slot_labels(times))
    }
}

impl AvailabilitySource for SimulatedAvailability {
    fn available_times(&self, date: NaiveDate) -> BoxFuture<'_, ServiceResult<Vec<String>>> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let times = self.generate()?;
            info!("Simulated availability for {}: {} slots", date, times.len());
            debug!("Available times for {}: {:?}", date, times);
            Ok(times)
        })
    }
}

/// Deterministic availability: the same slots for every date
pub struct FixedAvailability {
    times: Vec<String>,
}

impl FixedAvailability {
    pub fn new<I, S>(times: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            times: sort_time_slot_labels(times.into_iter().map(Into::into).collect()),
        }
    }
}

impl AvailabilitySource for FixedAvailability {
    fn available_times(&self, date: NaiveDate) -> BoxFuture<'_, ServiceResult<Vec<String>>> {
        debug!("Fixed availability requested for {}", date);
        let times = self.times.clone();
        Box::pin(async move { Ok(times) })
    }
}
