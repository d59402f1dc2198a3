use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Customer rating for a completed booking, 1..=5. Feeds the worker's average
/// rating on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub worker_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub booking_id: String,
    pub customer_id: String,
    pub subject: String,
    pub status: ComplaintStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Open,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::Resolved => "resolved",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "resolved" => ComplaintStatus::Resolved,
            _ => ComplaintStatus::Open,
        }
    }
}
