use crate::models::{KycStatus, Role, User};

/// What the auth collaborator currently knows. While `loading` is true the
/// gate refuses to decide anything.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub loading: bool,
    pub user: Option<User>,
}

impl AuthSnapshot {
    pub fn loading() -> Self {
        AuthSnapshot {
            loading: true,
            user: None,
        }
    }

    pub fn anonymous() -> Self {
        AuthSnapshot::default()
    }

    pub fn signed_in(user: User) -> Self {
        AuthSnapshot {
            loading: false,
            user: Some(user),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Auth state not yet known; render nothing decisive.
    Pending,
    Allow,
    Redirect(String),
    /// Unverified worker: substitute the verification screen for the
    /// requested content instead of redirecting.
    Verification(VerificationScreen),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationScreen {
    pub kyc_status: KycStatus,
    /// Where the screen's call-to-action sends the worker.
    pub cta_path: &'static str,
}

impl VerificationScreen {
    fn for_status(kyc_status: KycStatus) -> Self {
        let cta_path = match kyc_status {
            KycStatus::NotStarted | KycStatus::Rejected => "/worker/kyc/form",
            KycStatus::Pending => "/worker/kyc/status",
            // Never substituted for a verified worker; kept for exhaustiveness.
            KycStatus::Verified => "/worker/dashboard",
        };
        VerificationScreen {
            kyc_status,
            cta_path,
        }
    }
}

/// Worker paths reachable regardless of verification status.
const KYC_ALLOWED_PATHS: &[&str] = &[
    "/worker/kyc/form",
    "/worker/kyc/status",
    "/worker/login",
    "/worker/register",
];

fn path_scope(path: &str) -> Option<Role> {
    if path == "/customer" || path.starts_with("/customer/") {
        Some(Role::Customer)
    } else if path == "/worker" || path.starts_with("/worker/") {
        Some(Role::Worker)
    } else if path == "/admin" || path.starts_with("/admin/") {
        Some(Role::Admin)
    } else {
        None
    }
}

fn is_kyc_allowed(path: &str) -> bool {
    KYC_ALLOWED_PATHS
        .iter()
        .any(|allowed| path == *allowed || path.starts_with(&format!("{allowed}/")))
}

/// Pure access decision over `(auth, path)`. Denials are redirects to the
/// right place, never error screens.
pub fn authorize(auth: &AuthSnapshot, path: &str) -> GateDecision {
    if auth.loading {
        return GateDecision::Pending;
    }

    let scope = path_scope(path);

    let user = match &auth.user {
        Some(user) => user,
        None => {
            // Anonymous users may browse unscoped paths and sign-in screens;
            // a role-scoped path bounces to that role's login, carrying the
            // original destination for resumption.
            return match scope {
                Some(role) => {
                    if path == role.login_path() || path == register_path(role) {
                        GateDecision::Allow
                    } else {
                        GateDecision::Redirect(format!("{}?next={path}", role.login_path()))
                    }
                }
                None => GateDecision::Allow,
            };
        }
    };

    // Root is ambiguous for a signed-in user; send them home.
    if path == "/" {
        return GateDecision::Redirect(user.role.home_path().to_string());
    }

    let scope = match scope {
        Some(scope) => scope,
        None => return GateDecision::Allow,
    };

    if scope != user.role {
        return GateDecision::Redirect(user.role.home_path().to_string());
    }

    match user.role {
        Role::Customer | Role::Admin => GateDecision::Allow,
        Role::Worker => worker_decision(user, path),
    }
}

fn register_path(role: Role) -> &'static str {
    match role {
        Role::Customer => "/customer/register",
        Role::Worker => "/worker/register",
        Role::Admin => "/admin/register",
    }
}

/// Second-order check for workers: verification status gates everything
/// outside the KYC flow itself.
fn worker_decision(user: &User, path: &str) -> GateDecision {
    if is_kyc_allowed(path) {
        return GateDecision::Allow;
    }

    match user.kyc_status() {
        KycStatus::Verified => {
            if path == "/worker" {
                // Bare root is ambiguous once verified.
                GateDecision::Redirect("/worker/dashboard".to_string())
            } else {
                GateDecision::Allow
            }
        }
        status => GateDecision::Verification(VerificationScreen::for_status(status)),
    }
}
