use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Ephemeral accumulation of a booking-in-progress. Keyed to the acting
/// customer in the session store; destroyed on creation or abandonment. Never
/// to be confused with a persisted `Booking`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingDraft {
    pub worker_id: Option<String>,
    pub worker_name: String,
    pub service_id: Option<String>,
    pub service_name: String,
    pub price: i64,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub address_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl BookingDraft {
    /// Shallow merge: only fields present in the partial are written, so each
    /// wizard step can touch the fields it owns without clobbering earlier
    /// steps.
    pub fn merge(&mut self, partial: DraftUpdate) {
        if let Some(date) = partial.date {
            self.date = Some(date);
        }
        if let Some(time) = partial.time {
            self.time = Some(time);
        }
        if let Some(address_id) = partial.address_id {
            self.address_id = Some(address_id);
        }
        if let Some(payment_method) = partial.payment_method {
            self.payment_method = Some(payment_method);
        }
        if let Some(notes) = partial.notes {
            self.notes = Some(notes);
        }
    }

    /// Names of required fields that are still unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.worker_id.is_none() {
            missing.push("workerId");
        }
        if self.service_id.is_none() {
            missing.push("serviceId");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        if self.address_id.is_none() {
            missing.push("addressId");
        }
        if self.payment_method.is_none() {
            missing.push("paymentMethod");
        }
        missing
    }
}

/// Partial write from a single wizard step. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftUpdate {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub address_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Razorpay,
    Card,
    Upi,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Razorpay => "razorpay",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cash => "cash",
        }
    }
}

/// What a finalized draft turns into: the single create call issued against
/// the booking store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub service_id: String,
    pub service_name: String,
    pub scheduled_at: NaiveDateTime,
    pub address_id: String,
    /// Address text snapshotted at finalize time.
    pub address: String,
    pub payment_method: PaymentMethod,
    pub amount: i64,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_earlier_fields() {
        let mut draft = BookingDraft {
            worker_id: Some("w1".to_string()),
            service_id: Some("s1".to_string()),
            ..Default::default()
        };

        draft.merge(DraftUpdate {
            date: Some(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            time: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            ..Default::default()
        });
        draft.merge(DraftUpdate {
            address_id: Some("a1".to_string()),
            ..Default::default()
        });

        assert_eq!(draft.worker_id.as_deref(), Some("w1"));
        assert!(draft.date.is_some());
        assert!(draft.time.is_some());
        assert_eq!(draft.address_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_missing_fields_reported_by_name() {
        let draft = BookingDraft {
            worker_id: Some("w1".to_string()),
            service_id: Some("s1".to_string()),
            date: Some(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            time: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            address_id: Some("a1".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.missing_fields(), vec!["paymentMethod"]);
    }

    #[test]
    fn test_empty_draft_reports_all_required() {
        let draft = BookingDraft::default();
        assert_eq!(
            draft.missing_fields(),
            vec!["workerId", "serviceId", "date", "time", "addressId", "paymentMethod"]
        );
    }
}
