//! Certification records attached to a company

use serde::{Deserialize, Serialize};

/// A certification held by a company
///
/// Read-only input to scoring: the thesis maps `cert_type` to a
/// regulatory score and flags sovereignty certifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    /// Certification type (e.g. "ISO 27001", "Cyber Essentials Plus")
    pub cert_type: String,

    /// Issuing or accrediting body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_body: Option<String>,

    /// Scope statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Expiry timestamp (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Certification {
    /// Create a certification with only its type
    pub fn new(cert_type: impl Into<String>) -> Self {
        Self {
            cert_type: cert_type.into(),
            issuing_body: None,
            scope: None,
            expires_at: None,
        }
    }

    /// Set the issuing body
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuing_body = Some(issuer.into());
        self
    }

    /// Whether the certification has expired at `now`
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}
