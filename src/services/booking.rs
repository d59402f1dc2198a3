use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::broadcast;

use crate::models::{Booking, BookingEvent, BookingStatus, CreateBookingRequest, Role, User};
use crate::services::lifecycle::{transition, Actor, BookingAction, TransitionError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The server-side record had already advanced past our snapshot.
    #[error("stale snapshot: {0}")]
    Stale(String),
    #[error("booking not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Booking persistence collaborator. The sqlite implementation lives in
/// `db::store`; swapping in an HTTP-backed client changes nothing here.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Booking>, StoreError>;
    async fn list(&self) -> Result<Vec<Booking>, StoreError>;
    /// Persists a transition outcome, conditional on the record still being
    /// in `expected` status. A mismatch is reported as `Stale`.
    async fn apply(&self, booking: &Booking, expected: BookingStatus) -> Result<Booking, StoreError>;
    /// Records a worker's dismissal of an open request so it is not
    /// re-offered. No booking status change.
    async fn dismiss(&self, worker_id: &str, booking_id: &str) -> Result<(), StoreError>;
    async fn dismissed(&self, worker_id: &str) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid transition")]
    InvalidTransition,
    /// The only error class that required rolling back an optimistic update.
    #[error("already taken: {0}")]
    StaleSnapshot(String),
    #[error("booking not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(anyhow::Error),
}

impl From<TransitionError> for BookingError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Unauthorized => BookingError::Unauthorized,
            TransitionError::InvalidTransition => BookingError::InvalidTransition,
        }
    }
}

/// Owns the locally known booking snapshot and the persistence collaborator.
/// Transitions are judged synchronously against the snapshot before any store
/// call; a store-side stale rejection rolls the snapshot back.
pub struct BookingService {
    store: Box<dyn BookingStore>,
    snapshot: Mutex<HashMap<String, Booking>>,
    events: broadcast::Sender<BookingEvent>,
}

impl BookingService {
    pub fn new(store: Box<dyn BookingStore>, events: broadcast::Sender<BookingEvent>) -> Self {
        BookingService {
            store,
            snapshot: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: BookingEvent) {
        // Ignore if nobody is listening.
        let _ = self.events.send(event);
    }

    /// Reloads the snapshot from the store.
    pub async fn refresh(&self) -> Result<Vec<Booking>, BookingError> {
        let bookings = self.store.list().await.map_err(storage)?;
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.clear();
        for booking in &bookings {
            snapshot.insert(booking.id.clone(), booking.clone());
        }
        Ok(bookings)
    }

    pub fn snapshot(&self) -> Vec<Booking> {
        self.snapshot.lock().unwrap().values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Result<Booking, BookingError> {
        if let Some(booking) = self.snapshot.lock().unwrap().get(id) {
            return Ok(booking.clone());
        }
        match self.store.get(id).await.map_err(storage)? {
            Some(booking) => {
                self.snapshot
                    .lock()
                    .unwrap()
                    .insert(booking.id.clone(), booking.clone());
                Ok(booking)
            }
            None => Err(BookingError::NotFound(id.to_string())),
        }
    }

    /// The single create call a finalized draft turns into.
    pub async fn create(
        &self,
        request: &CreateBookingRequest,
        customer: &User,
        now: NaiveDateTime,
    ) -> Result<Booking, BookingError> {
        if customer.role != Role::Customer {
            return Err(BookingError::Unauthorized);
        }

        let booking = Booking::create(request, customer, now);
        self.store.insert(&booking).await.map_err(storage)?;
        self.snapshot
            .lock()
            .unwrap()
            .insert(booking.id.clone(), booking.clone());

        tracing::info!(
            booking_id = %booking.id,
            customer_id = %booking.customer_id,
            amount = booking.total_amount,
            "booking created"
        );
        self.emit(BookingEvent::BookingCreated {
            booking_id: booking.id.clone(),
            customer_id: booking.customer_id.clone(),
            amount: booking.total_amount,
        });
        Ok(booking)
    }

    /// Runs an action through the state machine, applies it optimistically,
    /// then confirms against the store. Local rejections never reach the
    /// network; a store `Stale` rolls back and resyncs from the server copy.
    pub async fn apply_action(
        &self,
        booking_id: &str,
        action: BookingAction,
        actor: &Actor,
        now: NaiveDateTime,
    ) -> Result<Booking, BookingError> {
        let previous = self.get(booking_id).await?;

        let outcome = match transition(&previous, &action, actor, now) {
            Ok(outcome) => outcome,
            Err(reason) => {
                tracing::warn!(
                    booking_id,
                    action = action.as_str(),
                    actor = %actor.id,
                    %reason,
                    "transition rejected locally"
                );
                self.emit(BookingEvent::TransitionRejected {
                    booking_id: booking_id.to_string(),
                    reason: reason.to_string(),
                });
                return Err(reason.into());
            }
        };

        // Optimistic apply.
        self.snapshot
            .lock()
            .unwrap()
            .insert(booking_id.to_string(), outcome.booking.clone());

        match self.store.apply(&outcome.booking, previous.status).await {
            Ok(confirmed) => {
                self.snapshot
                    .lock()
                    .unwrap()
                    .insert(booking_id.to_string(), confirmed.clone());
                tracing::info!(
                    booking_id,
                    action = action.as_str(),
                    status = confirmed.status.as_str(),
                    "transition confirmed"
                );
                self.emit(outcome.event);
                Ok(confirmed)
            }
            Err(StoreError::Stale(detail)) => {
                self.rollback(booking_id, previous).await;
                self.emit(BookingEvent::TransitionRejected {
                    booking_id: booking_id.to_string(),
                    reason: "stale_snapshot".to_string(),
                });
                Err(BookingError::StaleSnapshot(detail))
            }
            Err(StoreError::NotFound(id)) => {
                self.snapshot.lock().unwrap().remove(booking_id);
                Err(BookingError::NotFound(id))
            }
            Err(StoreError::Other(err)) => {
                self.rollback(booking_id, previous).await;
                Err(BookingError::Storage(err))
            }
        }
    }

    /// Restores the pre-action value, preferring the server's current copy
    /// when it can be fetched.
    async fn rollback(&self, booking_id: &str, previous: Booking) {
        let restored = match self.store.get(booking_id).await {
            Ok(Some(server)) => server,
            _ => previous,
        };
        self.snapshot
            .lock()
            .unwrap()
            .insert(booking_id.to_string(), restored);
    }

    /// PENDING requests visible to a worker: open requests not yet dismissed
    /// by them, plus direct requests addressed to them.
    pub async fn requests_for_worker(&self, worker_id: &str) -> Result<Vec<Booking>, BookingError> {
        let dismissed = self.store.dismissed(worker_id).await.map_err(storage)?;
        let snapshot = self.snapshot.lock().unwrap();
        let mut requests: Vec<Booking> = snapshot
            .values()
            .filter(|b| b.status == BookingStatus::Pending)
            .filter(|b| match &b.worker_id {
                Some(assigned) => assigned == worker_id,
                None => !dismissed.iter().any(|id| id == &b.id),
            })
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    pub async fn dismiss_request(
        &self,
        worker_id: &str,
        booking_id: &str,
    ) -> Result<(), BookingError> {
        self.store
            .dismiss(worker_id, booking_id)
            .await
            .map_err(storage)
    }
}

fn storage(err: StoreError) -> BookingError {
    match err {
        StoreError::Stale(detail) => BookingError::StaleSnapshot(detail),
        StoreError::NotFound(id) => BookingError::NotFound(id),
        StoreError::Other(err) => BookingError::Storage(err),
    }
}
