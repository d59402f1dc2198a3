use chrono::NaiveDateTime;

use crate::models::{Booking, BookingEvent, BookingStatus, Role};

/// Who is asking for the transition.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAction {
    Accept,
    Start,
    Complete,
    Cancel,
    AdminRefund,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Accept => "accept",
            BookingAction::Start => "start",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
            BookingAction::AdminRefund => "admin-refund",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Actor's role (or identity) is not in the allowed set for the action.
    #[error("unauthorized")]
    Unauthorized,
    /// Action is illegal from the booking's current state, regardless of actor.
    #[error("invalid transition")]
    InvalidTransition,
}

/// A legal transition: the new booking value plus the semantic event to emit.
#[derive(Debug, Clone)]
pub struct Transition {
    pub booking: Booking,
    pub event: BookingEvent,
}

/// Evaluates an action against a booking snapshot. Pure: no I/O, no clock
/// reads. Authorization is checked before state legality, so a customer
/// calling `accept` on a CONFIRMED booking still sees `Unauthorized`.
pub fn transition(
    booking: &Booking,
    action: &BookingAction,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<Transition, TransitionError> {
    authorize_actor(booking, action, actor)?;
    check_source_state(booking.status, action)?;

    let mut next = booking.clone();
    next.updated_at = now;

    let event = match action {
        BookingAction::Accept => {
            if next.worker_id.is_none() {
                next.worker_id = Some(actor.id.clone());
            }
            next.status = BookingStatus::Confirmed;
            BookingEvent::JobAccepted {
                booking_id: next.id.clone(),
                worker_id: actor.id.clone(),
            }
        }
        BookingAction::Start => {
            next.status = BookingStatus::InProgress;
            BookingEvent::JobStarted {
                booking_id: next.id.clone(),
                worker_id: actor.id.clone(),
            }
        }
        BookingAction::Complete => {
            next.status = BookingStatus::Completed;
            next.completed_at = Some(now);
            BookingEvent::JobCompleted {
                booking_id: next.id.clone(),
                worker_id: actor.id.clone(),
                amount: next.total_amount,
            }
        }
        BookingAction::Cancel => {
            next.status = BookingStatus::Cancelled;
            BookingEvent::BookingCancelled {
                booking_id: next.id.clone(),
                refunded: false,
            }
        }
        BookingAction::AdminRefund => {
            next.status = BookingStatus::Cancelled;
            next.refunded = true;
            // completed_at is set iff COMPLETED; the refunded flag keeps the
            // audit trail.
            next.completed_at = None;
            BookingEvent::BookingCancelled {
                booking_id: next.id.clone(),
                refunded: true,
            }
        }
    };

    Ok(Transition {
        booking: next,
        event,
    })
}

fn authorize_actor(
    booking: &Booking,
    action: &BookingAction,
    actor: &Actor,
) -> Result<(), TransitionError> {
    match action {
        BookingAction::Accept => {
            if actor.role != Role::Worker {
                return Err(TransitionError::Unauthorized);
            }
            // A directly-booked open request may only be accepted by the
            // chosen worker. Once the booking has left PENDING, worker_id
            // records the winner of the race and the state check reports the
            // conflict; a lost race is not an authorization failure.
            if booking.status == BookingStatus::Pending {
                if let Some(worker_id) = &booking.worker_id {
                    if worker_id != &actor.id {
                        return Err(TransitionError::Unauthorized);
                    }
                }
            }
            Ok(())
        }
        BookingAction::Start | BookingAction::Complete => {
            if actor.role != Role::Worker {
                return Err(TransitionError::Unauthorized);
            }
            if booking.worker_id.as_deref() != Some(actor.id.as_str()) {
                return Err(TransitionError::Unauthorized);
            }
            Ok(())
        }
        BookingAction::Cancel => match actor.role {
            Role::Customer => {
                if booking.customer_id == actor.id {
                    Ok(())
                } else {
                    Err(TransitionError::Unauthorized)
                }
            }
            Role::Worker => {
                if booking.worker_id.as_deref() == Some(actor.id.as_str()) {
                    Ok(())
                } else {
                    Err(TransitionError::Unauthorized)
                }
            }
            Role::Admin => Err(TransitionError::Unauthorized),
        },
        BookingAction::AdminRefund => {
            if actor.role == Role::Admin {
                Ok(())
            } else {
                Err(TransitionError::Unauthorized)
            }
        }
    }
}

fn check_source_state(
    status: BookingStatus,
    action: &BookingAction,
) -> Result<(), TransitionError> {
    let legal = match action {
        BookingAction::Accept => status == BookingStatus::Pending,
        BookingAction::Start => status == BookingStatus::Confirmed,
        BookingAction::Complete => status == BookingStatus::InProgress,
        BookingAction::Cancel => {
            matches!(status, BookingStatus::Pending | BookingStatus::Confirmed)
        }
        BookingAction::AdminRefund => status == BookingStatus::Completed,
    };

    if legal {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition)
    }
}
