use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use rand::{distributions::Alphanumeric, Rng};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::models::booking::{Booking, BookingUpdate, NewBooking};
use crate::services::time_slots::label_minutes_of_day;

const BOOKING_ID_LEN: usize = 20;

const CSV_HEADERS: [&str; 8] = [
    "id",
    "date",
    "time",
    "name",
    "email",
    "meeting_type",
    "notes",
    "created_at",
];

/// Persistence for bookings.
///
/// Ids are opaque strings assigned by the store; `created_at` is stamped on
/// create and never changed afterwards.
#[cfg_attr(test, mockall::automock)]
pub trait BookingStore: Send + Sync {
    fn create(&self, booking: NewBooking) -> Result<String, StoreError>;
    fn list(&self) -> Result<Vec<Booking>, StoreError>;
    fn get(&self, id: &str) -> Result<Option<Booking>, StoreError>;
    fn update(&self, id: &str, update: BookingUpdate) -> Result<(), StoreError>;
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

// Database service storing bookings in a CSV file
pub struct DatabaseService {
    csv_path: PathBuf,
    file_mutex: Mutex<()>,
}

fn generate_booking_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOOKING_ID_LEN)
        .map(char::from)
        .collect()
}

impl DatabaseService {
    /// Open the store, creating the CSV file (and its directory) with a
    /// header row if it does not exist yet
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let csv_path = csv_path.as_ref().to_path_buf();

        if !csv_path.exists() {
            info!("Creating new bookings database file at {}", csv_path.display());

            if let Some(dir) = csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }

            let file = File::create(&csv_path)?;
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(CSV_HEADERS)?;
            writer.flush()?;
        }

        Ok(Self {
            csv_path,
            file_mutex: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.csv_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.file_mutex
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    // Caller must hold the file lock
    fn read_records(&self) -> Result<Vec<Booking>, StoreError> {
        let file = File::open(&self.csv_path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut bookings = Vec::new();
        for result in reader.deserialize() {
            let booking: Booking = result?;
            bookings.push(booking);
        }
        Ok(bookings)
    }

    // Caller must hold the file lock. Rewrites the whole file.
    fn write_records(&self, bookings: &[Booking]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.csv_path)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(CSV_HEADERS)?;
        for booking in bookings {
            writer.serialize(booking)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn append_record(&self, booking: &Booking) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(&self.csv_path)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(booking)?;
        writer.flush()?;
        Ok(())
    }
}

impl BookingStore for DatabaseService {
    fn create(&self, booking: NewBooking) -> Result<String, StoreError> {
        let _lock = self.lock()?;

        let existing = self.read_records()?;
        let mut id = generate_booking_id();
        while existing.iter().any(|b| b.id == id) {
            id = generate_booking_id();
        }

        let record = Booking {
            id: id.clone(),
            date: booking.date,
            time: booking.time,
            name: booking.name,
            email: booking.email,
            meeting_type: booking.meeting_type,
            notes: booking.notes.filter(|n| !n.is_empty()),
            created_at: Utc::now(),
        };

        self.append_record(&record).map_err(|e| {
            error!("Failed to store booking: {}", e);
            e
        })?;

        info!(
            "Stored booking {} for {} on {} at {}",
            record.id, record.email, record.date, record.time
        );
        Ok(id)
    }

    /// All bookings ordered by date, then by time of day
    fn list(&self) -> Result<Vec<Booking>, StoreError> {
        let _lock = self.lock()?;

        let mut bookings = self.read_records()?;
        bookings.sort_by_key(|b| {
            (
                b.date,
                label_minutes_of_day(&b.time).unwrap_or(u32::MAX),
                b.created_at,
            )
        });

        debug!("Loaded {} bookings", bookings.len());
        Ok(bookings)
    }

    fn get(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        let _lock = self.lock()?;
        Ok(self.read_records()?.into_iter().find(|b| b.id == id))
    }

    fn update(&self, id: &str, update: BookingUpdate) -> Result<(), StoreError> {
        let _lock = self.lock()?;

        let mut bookings = self.read_records()?;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        update.apply_to(booking);
        self.write_records(&bookings)?;

        info!("Updated booking {}", id);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _lock = self.lock()?;

        let mut bookings = self.read_records()?;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);

        if bookings.len() == before {
            // Deleting something that is already gone is not an error
            warn!("Delete requested for unknown booking {}", id);
            return Ok(());
        }

        self.write_records(&bookings)?;
        info!("Deleted booking {}", id);
        Ok(())
    }
}

/// Open the booking store at `csv_path`
pub fn create_database_service(csv_path: &str) -> Result<Arc<DatabaseService>, StoreError> {
    let service = DatabaseService::new(csv_path)?;
    info!("Booking database ready at {}", service.path().display());
    Ok(Arc::new(service))
}
