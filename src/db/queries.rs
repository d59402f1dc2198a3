use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    Address, Booking, BookingDraft, BookingStatus, Complaint, KycStatus, Review, Role, User,
    WorkerProfile,
};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn format_dt(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

fn parse_dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Users ──

pub fn save_user(conn: &Connection, user: &User, api_token: &str) -> anyhow::Result<()> {
    let profile = user.worker_profile.as_ref();
    conn.execute(
        "INSERT INTO users (id, name, phone, email, role, api_token, kyc_status, profession, hourly_rate, is_available, rating, total_jobs)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           phone = excluded.phone,
           email = excluded.email,
           api_token = excluded.api_token,
           kyc_status = excluded.kyc_status,
           profession = excluded.profession,
           hourly_rate = excluded.hourly_rate,
           is_available = excluded.is_available,
           rating = excluded.rating,
           total_jobs = excluded.total_jobs",
        params![
            user.id,
            user.name,
            user.phone,
            user.email,
            user.role.as_str(),
            api_token,
            profile.map(|p| p.kyc_status.as_str()),
            profile.map(|p| p.profession.as_str()),
            profile.map(|p| p.hourly_rate).unwrap_or(0),
            profile.map(|p| p.is_available).unwrap_or(true),
            profile.map(|p| p.rating).unwrap_or(0.0),
            profile.map(|p| p.total_jobs).unwrap_or(0),
        ],
    )?;
    Ok(())
}

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get(4)?;
    let role = Role::parse(&role_str).unwrap_or(Role::Customer);

    let worker_profile = if role == Role::Worker {
        let kyc_str: Option<String> = row.get(5)?;
        Some(WorkerProfile {
            kyc_status: KycStatus::from_str(kyc_str.as_deref().unwrap_or("")),
            profession: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            hourly_rate: row.get(7)?,
            is_available: row.get(8)?,
            rating: row.get(9)?,
            total_jobs: row.get(10)?,
        })
    } else {
        None
    };

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        role,
        worker_profile,
    })
}

const USER_COLUMNS: &str =
    "id, name, phone, email, role, kyc_status, profession, hourly_rate, is_available, rating, total_jobs";

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id], parse_user_row).optional()?)
}

pub fn get_user_by_token(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE api_token = ?1"))?;
    Ok(stmt.query_row(params![token], parse_user_row).optional()?)
}

pub fn count_users(conn: &Connection) -> anyhow::Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count as usize)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, customer_id, customer_name, worker_id, worker_name, service_id, service_name, scheduled_at, address, total_amount, status, refunded, notes, created_at, updated_at, completed_at";

fn parse_booking_row(row: &Row) -> rusqlite::Result<Booking> {
    let scheduled_at: String = row.get(7)?;
    let status_str: String = row.get(10)?;
    let created_at: String = row.get(13)?;
    let updated_at: String = row.get(14)?;
    let completed_at: Option<String> = row.get(15)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        worker_id: row.get(3)?,
        worker_name: row.get(4)?,
        service_id: row.get(5)?,
        service_name: row.get(6)?,
        scheduled_at: parse_dt(&scheduled_at),
        address: row.get(8)?,
        total_amount: row.get(9)?,
        status: BookingStatus::parse(&status_str).unwrap_or(BookingStatus::Pending),
        refunded: row.get(11)?,
        notes: row.get(12)?,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
        completed_at: completed_at.as_deref().map(parse_dt),
    })
}

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, customer_id, customer_name, worker_id, worker_name, service_id, service_name, scheduled_at, address, total_amount, status, refunded, notes, created_at, updated_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            booking.id,
            booking.customer_id,
            booking.customer_name,
            booking.worker_id,
            booking.worker_name,
            booking.service_id,
            booking.service_name,
            format_dt(&booking.scheduled_at),
            booking.address,
            booking.total_amount,
            booking.status.as_str(),
            booking.refunded,
            booking.notes,
            format_dt(&booking.created_at),
            format_dt(&booking.updated_at),
            booking.completed_at.as_ref().map(format_dt),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id], parse_booking_row).optional()?)
}

pub fn list_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map([], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// Writes a transitioned booking, conditional on the row still holding the
/// status the caller transitioned from. Returns false when the guard missed,
/// which the store layer reports as a stale snapshot.
pub fn apply_booking(
    conn: &Connection,
    booking: &Booking,
    expected: BookingStatus,
) -> anyhow::Result<bool> {
    let changed = conn.execute(
        "UPDATE bookings SET
           worker_id = ?1,
           worker_name = ?2,
           status = ?3,
           refunded = ?4,
           updated_at = ?5,
           completed_at = ?6
         WHERE id = ?7 AND status = ?8",
        params![
            booking.worker_id,
            booking.worker_name,
            booking.status.as_str(),
            booking.refunded,
            format_dt(&booking.updated_at),
            booking.completed_at.as_ref().map(format_dt),
            booking.id,
            expected.as_str(),
        ],
    )?;
    Ok(changed > 0)
}

// ── Booking drafts (wizard session storage) ──

pub fn get_draft(conn: &Connection, customer_id: &str) -> anyhow::Result<Option<BookingDraft>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT draft FROM booking_drafts WHERE customer_id = ?1",
            params![customer_id],
            |row| row.get(0),
        )
        .optional()?;

    match json {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn set_draft(conn: &Connection, customer_id: &str, draft: &BookingDraft) -> anyhow::Result<()> {
    let json = serde_json::to_string(draft)?;
    let now = format_dt(&Utc::now().naive_utc());
    conn.execute(
        "INSERT INTO booking_drafts (customer_id, draft, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(customer_id) DO UPDATE SET
           draft = excluded.draft,
           updated_at = excluded.updated_at",
        params![customer_id, json, now],
    )?;
    Ok(())
}

pub fn clear_draft(conn: &Connection, customer_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM booking_drafts WHERE customer_id = ?1",
        params![customer_id],
    )?;
    Ok(())
}

// ── Addresses ──

pub fn save_address(
    conn: &Connection,
    id: &str,
    customer_id: &str,
    label: &str,
    line: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO addresses (id, customer_id, label, line)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET label = excluded.label, line = excluded.line",
        params![id, customer_id, label, line],
    )?;
    Ok(())
}

pub fn list_addresses(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Address>> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, label, line FROM addresses WHERE customer_id = ?1 ORDER BY label",
    )?;
    let rows = stmt.query_map(params![customer_id], |row| {
        Ok(Address {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            label: row.get(2)?,
            line: row.get(3)?,
        })
    })?;

    let mut addresses = vec![];
    for row in rows {
        addresses.push(row?);
    }
    Ok(addresses)
}

/// Address text for snapshotting into a booking; scoped to the owning
/// customer so one user cannot book against another's address.
pub fn get_address_line(
    conn: &Connection,
    id: &str,
    customer_id: &str,
) -> anyhow::Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT line FROM addresses WHERE id = ?1 AND customer_id = ?2",
            params![id, customer_id],
            |row| row.get(0),
        )
        .optional()?)
}

// ── Reviews ──

pub fn create_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, booking_id, worker_id, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            review.id,
            review.booking_id,
            review.worker_id,
            review.rating,
            review.comment,
            format_dt(&review.created_at),
        ],
    )?;
    Ok(())
}

pub fn reviews_for_worker(conn: &Connection, worker_id: &str) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, worker_id, rating, comment, created_at
         FROM reviews WHERE worker_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![worker_id], |row| {
        let created_at: String = row.get(5)?;
        Ok(Review {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            worker_id: row.get(2)?,
            rating: row.get(3)?,
            comment: row.get(4)?,
            created_at: parse_dt(&created_at),
        })
    })?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row?);
    }
    Ok(reviews)
}

// ── Complaints ──

pub fn create_complaint(conn: &Connection, complaint: &Complaint) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO complaints (id, booking_id, customer_id, subject, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            complaint.id,
            complaint.booking_id,
            complaint.customer_id,
            complaint.subject,
            complaint.status.as_str(),
            format_dt(&complaint.created_at),
        ],
    )?;
    Ok(())
}

/// Marks a complaint resolved. Returns false when no such complaint exists.
pub fn resolve_complaint(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let changed = conn.execute(
        "UPDATE complaints SET status = 'resolved' WHERE id = ?1",
        params![id],
    )?;
    Ok(changed > 0)
}

pub fn count_open_complaints(conn: &Connection) -> anyhow::Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM complaints WHERE status = 'open'",
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

// ── Dismissed requests ──

pub fn dismiss_request(conn: &Connection, worker_id: &str, booking_id: &str) -> anyhow::Result<()> {
    let now = format_dt(&Utc::now().naive_utc());
    conn.execute(
        "INSERT OR IGNORE INTO dismissed_requests (worker_id, booking_id, dismissed_at)
         VALUES (?1, ?2, ?3)",
        params![worker_id, booking_id, now],
    )?;
    Ok(())
}

pub fn dismissed_for_worker(conn: &Connection, worker_id: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT booking_id FROM dismissed_requests WHERE worker_id = ?1")?;
    let rows = stmt.query_map(params![worker_id], |row| row.get(0))?;

    let mut ids = vec![];
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}
