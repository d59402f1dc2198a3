use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Booking, BookingDraft, BookingStatus};
use crate::services::booking::{BookingStore, StoreError};
use crate::services::draft::SessionStore;

/// Sqlite-backed booking persistence. Plays the role of the authoritative
/// server record; the conditional `apply` gives racing clients real stale
/// detection.
pub struct SqliteBookingStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteBookingStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        SqliteBookingStore { db }
    }
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let db = self.db.lock().unwrap();
        queries::create_booking(&db, booking)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>, StoreError> {
        let db = self.db.lock().unwrap();
        Ok(queries::get_booking(&db, id)?)
    }

    async fn list(&self) -> Result<Vec<Booking>, StoreError> {
        let db = self.db.lock().unwrap();
        Ok(queries::list_bookings(&db)?)
    }

    async fn apply(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<Booking, StoreError> {
        let db = self.db.lock().unwrap();
        let written = queries::apply_booking(&db, booking, expected)?;
        if written {
            return Ok(booking.clone());
        }

        // The guard missed: either the row is gone or it advanced under us.
        match queries::get_booking(&db, &booking.id)? {
            Some(current) => Err(StoreError::Stale(format!(
                "expected {} but server has {}",
                expected.as_str(),
                current.status.as_str()
            ))),
            None => Err(StoreError::NotFound(booking.id.clone())),
        }
    }

    async fn dismiss(&self, worker_id: &str, booking_id: &str) -> Result<(), StoreError> {
        let db = self.db.lock().unwrap();
        queries::dismiss_request(&db, worker_id, booking_id)?;
        Ok(())
    }

    async fn dismissed(&self, worker_id: &str) -> Result<Vec<String>, StoreError> {
        let db = self.db.lock().unwrap();
        Ok(queries::dismissed_for_worker(&db, worker_id)?)
    }
}

/// Durable wizard session storage: the draft survives a reload and a process
/// restart, keyed per customer.
pub struct SqliteSessionStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        SqliteSessionStore { db }
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, customer_id: &str) -> anyhow::Result<Option<BookingDraft>> {
        let db = self.db.lock().unwrap();
        queries::get_draft(&db, customer_id)
    }

    fn set(&self, customer_id: &str, draft: &BookingDraft) -> anyhow::Result<()> {
        let db = self.db.lock().unwrap();
        queries::set_draft(&db, customer_id, draft)
    }

    fn clear(&self, customer_id: &str) -> anyhow::Result<()> {
        let db = self.db.lock().unwrap();
        queries::clear_draft(&db, customer_id)
    }
}
