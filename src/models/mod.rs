pub mod address;
pub mod booking;
pub mod draft;
pub mod events;
pub mod review;
pub mod user;

pub use address::Address;
pub use booking::{Booking, BookingStatus};
pub use draft::{BookingDraft, CreateBookingRequest, DraftUpdate, PaymentMethod};
pub use events::BookingEvent;
pub use review::{Complaint, ComplaintStatus, Review};
pub use user::{KycStatus, Role, User, WorkerProfile};
