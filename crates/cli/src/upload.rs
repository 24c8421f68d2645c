// Bearer-token gate for workbook uploads.
//
// The expected token comes from an environment variable named in settings.
// Nothing is extracted or stored unless `authorize` succeeds.

use std::fmt;

use subtle::ConstantTimeEq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// No expected token is configured, so every upload is refused.
    NotConfigured,
    MissingHeader,
    Malformed,
    BadToken,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "uploads are disabled: no upload token configured"),
            Self::MissingHeader => write!(f, "missing authorization"),
            Self::Malformed => write!(f, "authorization must be 'Bearer <token>'"),
            Self::BadToken => write!(f, "invalid upload token"),
        }
    }
}

impl std::error::Error for Refusal {}

pub struct UploadGate {
    expected: Option<Vec<u8>>,
}

impl UploadGate {
    /// A blank token disables uploads.
    pub fn new(token: &str) -> Self {
        let token = token.trim();
        let expected = if token.is_empty() { None } else { Some(token.as_bytes().to_vec()) };
        Self { expected }
    }

    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(token) => Self::new(&token),
            Err(_) => Self { expected: None },
        }
    }

    /// Check an `Authorization` header value (constant-time on the token).
    pub fn authorize(&self, header: Option<&str>) -> Result<(), Refusal> {
        let expected = self.expected.as_deref().ok_or(Refusal::NotConfigured)?;
        let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(Refusal::MissingHeader)?;

        let (scheme, token) = header.split_once(' ').ok_or(Refusal::Malformed)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(Refusal::Malformed);
        }

        if bool::from(expected.ct_eq(token.as_bytes())) {
            Ok(())
        } else {
            Err(Refusal::BadToken)
        }
    }
}
