pub mod booking;
pub mod dashboard;
pub mod draft;
pub mod gate;
pub mod lifecycle;
pub mod query;
