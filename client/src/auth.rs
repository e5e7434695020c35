//! Caller identity attached to outgoing calls.
//!
//! The session edge authenticates people; services authenticate to each
//! other with a fixed service identity carried in request metadata. The
//! receiving handler checks the role before running any core logic.

use tonic::Request;

/// Metadata key carrying the authenticated staff identity.
pub const STAFF_METADATA_KEY: &str = "x-warung-staff";
/// Metadata key carrying the authenticated role.
pub const ROLE_METADATA_KEY: &str = "x-warung-role";

/// Identity stamped onto every outgoing request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub staff_id: String,
    pub role: String,
}

impl Identity {
    /// Service-to-service identity with the baseline staff role.
    pub fn service(name: &str) -> Self {
        Self {
            staff_id: name.to_string(),
            role: "staff".to_string(),
        }
    }

    /// Attach this identity to a request's metadata.
    pub fn apply<T>(&self, request: &mut Request<T>) {
        if let Ok(value) = self.staff_id.parse() {
            request.metadata_mut().insert(STAFF_METADATA_KEY, value);
        }
        if let Ok(value) = self.role.parse() {
            request.metadata_mut().insert(ROLE_METADATA_KEY, value);
        }
    }
}
