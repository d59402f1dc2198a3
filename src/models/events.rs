use serde::Serialize;

/// Semantic events emitted by the booking service. Presentation (toasts,
/// push, SSE) is entirely the subscriber's concern.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    BookingCreated {
        booking_id: String,
        customer_id: String,
        amount: i64,
    },
    JobAccepted {
        booking_id: String,
        worker_id: String,
    },
    JobStarted {
        booking_id: String,
        worker_id: String,
    },
    /// Settlement hook: crediting the worker's ledger is an external
    /// collaborator's job, triggered off this event.
    JobCompleted {
        booking_id: String,
        worker_id: String,
        amount: i64,
    },
    BookingCancelled {
        booking_id: String,
        refunded: bool,
    },
    TransitionRejected {
        booking_id: String,
        reason: String,
    },
}

impl BookingEvent {
    pub fn booking_id(&self) -> &str {
        match self {
            BookingEvent::BookingCreated { booking_id, .. }
            | BookingEvent::JobAccepted { booking_id, .. }
            | BookingEvent::JobStarted { booking_id, .. }
            | BookingEvent::JobCompleted { booking_id, .. }
            | BookingEvent::BookingCancelled { booking_id, .. }
            | BookingEvent::TransitionRejected { booking_id, .. } => booking_id,
        }
    }
}
