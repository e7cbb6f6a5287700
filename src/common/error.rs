//! Error types for dstripe

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Validation ===
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    // === Conflicts ===
    #[error("name already registered: {0}")]
    DuplicateName(String),

    #[error("port conflict at {ip} (ports {mport}/{cport})")]
    PortConflict { ip: String, mport: u16, cport: u16 },

    #[error("storage array already exists: {0}")]
    DssExists(String),

    // === Not found ===
    #[error("unknown user: {0}")]
    UserNotFound(String),

    #[error("unknown disk: {0}")]
    DiskNotFound(String),

    // === Lifecycle state ===
    #[error("disk {disk} is committed to array {dss}")]
    DiskInDss { disk: String, dss: String },

    // === Resource exhaustion ===
    #[error("insufficient free disks: need {needed}, have {available}")]
    InsufficientDisks { needed: usize, available: usize },

    // === Protocol ===
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("request failed: {reason}")]
    RequestFailed { reason: String },

    // === I/O & runtime ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out: {0}")]
    Timeout(String),

    // === Config ===
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Is this a retryable error?
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::PortConflict { .. }
            | Error::InsufficientDisks { .. }
            | Error::Io(_)
            | Error::Timeout(_) => true,
            Error::RequestFailed { reason } => {
                matches!(reason.as_str(), "port-conflict" | "insufficient-disks")
            }
            _ => false,
        }
    }

    /// Wire-level reason code for a failure response. The string codes
    /// exist only at the serialization boundary; errors with no dedicated
    /// code are reported as `exception:<detail>`.
    pub fn reason_code(&self) -> String {
        match self {
            Error::InvalidParams(_) => "invalid-params".to_string(),
            Error::DuplicateName(_) => "duplicate-name".to_string(),
            Error::PortConflict { .. } => "port-conflict".to_string(),
            Error::DssExists(_) => "dss-exist".to_string(),
            Error::UserNotFound(_) => "username-not-found".to_string(),
            Error::DiskNotFound(_) => "diskname-not-found".to_string(),
            Error::DiskInDss { .. } => "disk-in-dss".to_string(),
            Error::InsufficientDisks { .. } => "insufficient-disks".to_string(),
            other => format!("exception:{}", other),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(
            Error::InvalidParams("bad port".into()).reason_code(),
            "invalid-params"
        );
        assert_eq!(
            Error::DuplicateName("d1".into()).reason_code(),
            "duplicate-name"
        );
        assert_eq!(Error::DssExists("a".into()).reason_code(), "dss-exist");
        assert_eq!(
            Error::UserNotFound("u".into()).reason_code(),
            "username-not-found"
        );
        assert_eq!(
            Error::DiskNotFound("d".into()).reason_code(),
            "diskname-not-found"
        );
        assert_eq!(
            Error::DiskInDss {
                disk: "d1".into(),
                dss: "a".into()
            }
            .reason_code(),
            "disk-in-dss"
        );
        assert_eq!(
            Error::InsufficientDisks {
                needed: 3,
                available: 2
            }
            .reason_code(),
            "insufficient-disks"
        );
        assert_eq!(
            Error::PortConflict {
                ip: "127.0.0.1".into(),
                mport: 2500,
                cport: 2501
            }
            .reason_code(),
            "port-conflict"
        );
    }

    #[test]
    fn test_internal_faults_map_to_exception() {
        let code = Error::Internal("stale registry view".into()).reason_code();
        assert!(code.starts_with("exception:"));
        assert!(code.contains("stale registry view"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::PortConflict {
            ip: "1.2.3.4".into(),
            mport: 2500,
            cport: 2501
        }
        .is_retryable());
        assert!(Error::InsufficientDisks {
            needed: 3,
            available: 0
        }
        .is_retryable());
        assert!(Error::Timeout("no response".into()).is_retryable());
        assert!(Error::RequestFailed {
            reason: "port-conflict".into()
        }
        .is_retryable());

        assert!(!Error::DuplicateName("d1".into()).is_retryable());
        assert!(!Error::RequestFailed {
            reason: "duplicate-name".into()
        }
        .is_retryable());
        assert!(!Error::InvalidParams("bad".into()).is_retryable());
    }
}
