use serde::{Deserialize, Serialize};

/// A customer's saved service address. Bookings snapshot the `line` text at
/// finalize time rather than referencing the row, so later edits never rewrite
/// booking history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub customer_id: String,
    pub label: String,
    pub line: String,
}
