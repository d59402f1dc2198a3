use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::draft::CreateBookingRequest;
use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    /// Unset for open requests until a worker accepts; immutable once set.
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub service_id: String,
    pub service_name: String,
    pub scheduled_at: NaiveDateTime,
    /// Snapshot of the address text at creation time, not a live reference.
    pub address: String,
    /// Fixed at creation; later service or rate edits never change it.
    pub total_amount: i64,
    pub status: BookingStatus,
    pub refunded: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Set iff status == Completed.
    pub completed_at: Option<NaiveDateTime>,
}

impl Booking {
    /// Materializes a PENDING booking from a finalized draft. The caller is
    /// responsible for checking that the actor is a customer.
    pub fn create(request: &CreateBookingRequest, customer: &User, now: NaiveDateTime) -> Self {
        Booking {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            worker_id: request.worker_id.clone(),
            worker_name: request.worker_name.clone(),
            service_id: request.service_id.clone(),
            service_name: request.service_name.clone(),
            scheduled_at: request.scheduled_at,
            address: request.address.clone(),
            total_amount: request.amount,
            status: BookingStatus::Pending,
            refunded: false,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "IN_PROGRESS" => Some(BookingStatus::InProgress),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::InProgress)
    }
}
