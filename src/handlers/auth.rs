//! Caller authentication context.
//!
//! Each RPC carries an authenticated identity and role in request metadata,
//! placed there by the session edge. Handlers check the role before any
//! core logic runs; credential and login mechanics live outside this
//! platform.

use tonic::{Request, Status};

pub use warung_client::auth::{ROLE_METADATA_KEY, STAFF_METADATA_KEY};

/// Staff role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Staff,
    Manager,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" => Some(Self::Staff),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller of an RPC.
#[derive(Debug, Clone)]
pub struct Caller {
    pub staff_id: String,
    pub role: Role,
}

/// Extract the authenticated caller from request metadata.
pub fn authenticate<T>(request: &Request<T>) -> Result<Caller, Status> {
    let staff_id = request
        .metadata()
        .get(STAFF_METADATA_KEY)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Status::unauthenticated("missing staff identity"))?
        .to_string();

    let role = request
        .metadata()
        .get(ROLE_METADATA_KEY)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Status::unauthenticated("missing role"))?;
    let role =
        Role::parse(role).ok_or_else(|| Status::unauthenticated(format!("unknown role: {role}")))?;

    Ok(Caller { staff_id, role })
}

/// Authenticate and require at least the given role.
pub fn require_min_role<T>(request: &Request<T>, min: Role) -> Result<Caller, Status> {
    let caller = authenticate(request)?;
    if caller.role < min {
        return Err(Status::permission_denied(format!(
            "requires at least the {min:?} role"
        )));
    }
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(staff: Option<&str>, role: Option<&str>) -> Request<()> {
        let mut request = Request::new(());
        if let Some(staff) = staff {
            request
                .metadata_mut()
                .insert(STAFF_METADATA_KEY, staff.parse().unwrap());
        }
        if let Some(role) = role {
            request
                .metadata_mut()
                .insert(ROLE_METADATA_KEY, role.parse().unwrap());
        }
        request
    }

    #[test]
    fn test_authenticate_ok() {
        let caller = authenticate(&request_with(Some("EMP-1"), Some("manager"))).unwrap();
        assert_eq!(caller.staff_id, "EMP-1");
        assert_eq!(caller.role, Role::Manager);
    }

    #[test]
    fn test_missing_identity_is_unauthenticated() {
        let err = authenticate(&request_with(None, Some("staff"))).unwrap_err();
        assert_eq!(err.code(), tonic::Code::Unauthenticated);

        let err = authenticate(&request_with(Some("EMP-1"), None)).unwrap_err();
        assert_eq!(err.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn test_role_hierarchy() {
        let request = request_with(Some("EMP-1"), Some("staff"));
        assert!(require_min_role(&request, Role::Staff).is_ok());
        let err = require_min_role(&request, Role::Manager).unwrap_err();
        assert_eq!(err.code(), tonic::Code::PermissionDenied);

        let request = request_with(Some("EMP-2"), Some("admin"));
        assert!(require_min_role(&request, Role::Manager).is_ok());
    }
}
