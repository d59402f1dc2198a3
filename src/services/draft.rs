use chrono::NaiveDateTime;

use crate::models::{BookingDraft, CreateBookingRequest, DraftUpdate};

/// Session storage collaborator: durable, keyed per customer, so a draft
/// survives a full reload.
pub trait SessionStore: Send + Sync {
    fn get(&self, customer_id: &str) -> anyhow::Result<Option<BookingDraft>>;
    fn set(&self, customer_id: &str, draft: &BookingDraft) -> anyhow::Result<()>;
    fn clear(&self, customer_id: &str) -> anyhow::Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("no draft in progress")]
    NotStarted,
    /// Required fields are reported by name rather than silently defaulted.
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The multi-step booking wizard. Each call loads the current draft from the
/// store and writes it back, so any screen can resume where the last one
/// left off.
pub struct DraftService {
    store: Box<dyn SessionStore>,
}

impl DraftService {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        DraftService { store }
    }

    /// Begins a wizard run against a chosen worker and service. Overwrites
    /// any prior draft: two drafts never coexist for one customer.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &self,
        customer_id: &str,
        worker_id: Option<&str>,
        worker_name: &str,
        service_id: &str,
        service_name: &str,
        price: i64,
    ) -> Result<BookingDraft, DraftError> {
        let draft = BookingDraft {
            worker_id: worker_id.map(str::to_string),
            worker_name: worker_name.to_string(),
            service_id: Some(service_id.to_string()),
            service_name: service_name.to_string(),
            price,
            ..Default::default()
        };
        self.store.set(customer_id, &draft)?;
        tracing::debug!(customer_id, service_id, "booking draft started");
        Ok(draft)
    }

    pub fn current(&self, customer_id: &str) -> Result<Option<BookingDraft>, DraftError> {
        Ok(self.store.get(customer_id)?)
    }

    /// Shallow merge of a single step's fields into the stored draft.
    pub fn update(
        &self,
        customer_id: &str,
        partial: DraftUpdate,
    ) -> Result<BookingDraft, DraftError> {
        let mut draft = self
            .store
            .get(customer_id)?
            .ok_or(DraftError::NotStarted)?;
        draft.merge(partial);
        self.store.set(customer_id, &draft)?;
        Ok(draft)
    }

    /// Validates the draft and turns it into the single create request. The
    /// caller supplies the address snapshot resolved from `address_id`. The
    /// draft is left in place; only a successful booking create consumes it,
    /// via `complete`.
    pub fn finalize(
        &self,
        customer_id: &str,
        address: &str,
    ) -> Result<CreateBookingRequest, DraftError> {
        let draft = self
            .store
            .get(customer_id)?
            .ok_or(DraftError::NotStarted)?;

        let missing = draft.missing_fields();
        let (Some(service_id), Some(date), Some(time), Some(address_id), Some(payment_method)) = (
            draft.service_id.clone(),
            draft.date,
            draft.time,
            draft.address_id.clone(),
            draft.payment_method,
        ) else {
            return Err(DraftError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        let request = CreateBookingRequest {
            worker_id: draft.worker_id.clone(),
            worker_name: if draft.worker_name.is_empty() {
                None
            } else {
                Some(draft.worker_name.clone())
            },
            service_id,
            service_name: draft.service_name.clone(),
            scheduled_at: NaiveDateTime::new(date, time),
            address_id,
            address: address.to_string(),
            payment_method,
            amount: draft.price,
            notes: draft.notes.clone(),
        };

        Ok(request)
    }

    /// Consumes the draft after the booking it produced has been created.
    pub fn complete(&self, customer_id: &str) -> Result<(), DraftError> {
        self.store.clear(customer_id)?;
        tracing::debug!(customer_id, "booking draft finalized");
        Ok(())
    }

    pub fn abandon(&self, customer_id: &str) -> Result<(), DraftError> {
        self.store.clear(customer_id)?;
        tracing::debug!(customer_id, "booking draft abandoned");
        Ok(())
    }
}
