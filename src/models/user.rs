use serde::{Deserialize, Serialize};

/// Closed set of account roles. A user's role never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Worker,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Worker => "WORKER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CUSTOMER" => Some(Role::Customer),
            "WORKER" => Some(Role::Worker),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Landing path for the role, used by the gate when sending a user back
    /// to their own area.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Customer => "/customer",
            Role::Worker => "/worker",
            Role::Admin => "/admin",
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Customer => "/customer/login",
            Role::Worker => "/worker/login",
            Role::Admin => "/admin/login",
        }
    }
}

/// Worker document-verification state. Transitions are driven by the admin
/// side; the core only reads the current value to gate access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    NotStarted,
    Pending,
    Verified,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::NotStarted => "NOT_STARTED",
            KycStatus::Pending => "PENDING",
            KycStatus::Verified => "VERIFIED",
            KycStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "PENDING" => KycStatus::Pending,
            "VERIFIED" => KycStatus::Verified,
            "REJECTED" => KycStatus::Rejected,
            _ => KycStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub kyc_status: KycStatus,
    pub profession: String,
    pub hourly_rate: i64,
    pub is_available: bool,
    pub rating: f64,
    pub total_jobs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub role: Role,
    /// Present only for WORKER users.
    pub worker_profile: Option<WorkerProfile>,
}

impl User {
    pub fn kyc_status(&self) -> KycStatus {
        self.worker_profile
            .as_ref()
            .map(|p| p.kyc_status)
            .unwrap_or(KycStatus::NotStarted)
    }

    pub fn is_verified_worker(&self) -> bool {
        self.role == Role::Worker && self.kyc_status() == KycStatus::Verified
    }
}
