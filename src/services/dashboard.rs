use serde::Serialize;

use crate::models::{Booking, BookingStatus, Review, Role, WorkerProfile};

/// Landing-page numbers per role. Everything here is recomputed from the
/// booking collection on each call; there are no running counters to drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardStats {
    Customer(CustomerStats),
    Worker(WorkerStats),
    Admin(AdminStats),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerStats {
    pub total_bookings: usize,
    /// CONFIRMED + IN_PROGRESS.
    pub active_bookings: usize,
    pub completed_bookings: usize,
    pub total_spent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStats {
    pub total_jobs: usize,
    pub completed_jobs: usize,
    /// Mean of all review ratings; 0.0 when there are none.
    pub avg_rating: f64,
    pub total_earnings: i64,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_bookings: usize,
    pub active_bookings: usize,
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    pub total_revenue: i64,
    pub total_users: usize,
    pub open_complaints: usize,
}

pub fn customer_stats(bookings: &[Booking]) -> CustomerStats {
    CustomerStats {
        total_bookings: bookings.len(),
        active_bookings: bookings.iter().filter(|b| b.status.is_active()).count(),
        completed_bookings: completed(bookings).count(),
        total_spent: completed(bookings).map(|b| b.total_amount).sum(),
    }
}

pub fn worker_stats(
    bookings: &[Booking],
    reviews: &[Review],
    profile: &WorkerProfile,
) -> WorkerStats {
    let avg_rating = if reviews.is_empty() {
        0.0
    } else {
        reviews.iter().map(|r| r.rating as f64).sum::<f64>() / reviews.len() as f64
    };

    WorkerStats {
        total_jobs: bookings.len(),
        completed_jobs: completed(bookings).count(),
        avg_rating,
        total_earnings: completed(bookings).map(|b| b.total_amount).sum(),
        is_verified: profile.kyc_status == crate::models::KycStatus::Verified,
    }
}

pub fn admin_stats(bookings: &[Booking], total_users: usize, open_complaints: usize) -> AdminStats {
    AdminStats {
        total_bookings: bookings.len(),
        active_bookings: bookings.iter().filter(|b| b.status.is_active()).count(),
        completed_bookings: completed(bookings).count(),
        cancelled_bookings: bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Cancelled)
            .count(),
        total_revenue: completed(bookings).map(|b| b.total_amount).sum(),
        total_users,
        open_complaints,
    }
}

fn completed(bookings: &[Booking]) -> impl Iterator<Item = &Booking> {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
}

/// Role-dispatched aggregation; exhaustive on `Role` so a new role forces
/// this site to be revisited.
pub fn aggregate(
    role: Role,
    bookings: &[Booking],
    reviews: &[Review],
    profile: Option<&WorkerProfile>,
    total_users: usize,
    open_complaints: usize,
) -> DashboardStats {
    match role {
        Role::Customer => DashboardStats::Customer(customer_stats(bookings)),
        Role::Worker => {
            let fallback = WorkerProfile {
                kyc_status: crate::models::KycStatus::NotStarted,
                profession: String::new(),
                hourly_rate: 0,
                is_available: false,
                rating: 0.0,
                total_jobs: 0,
            };
            DashboardStats::Worker(worker_stats(
                bookings,
                reviews,
                profile.unwrap_or(&fallback),
            ))
        }
        Role::Admin => DashboardStats::Admin(admin_stats(bookings, total_users, open_complaints)),
    }
}
