//! Error taxonomy shared by the rate refresh and report refresh passes.

use serde::{Deserialize, Serialize};

/// Conditions that abort a refresh pass.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The session was rejected (HTTP 403). Requires re-authentication.
    #[error("session rejected by the account API; log in again")]
    LoggedOut,

    /// The upstream API is throttling us (HTTP 429).
    ///
    /// `resume_from_tab` is the stash tab the pass stopped at, if the pass was
    /// fetching tabs when it was throttled.
    #[error("rate limited by upstream API")]
    RateLimited { resume_from_tab: Option<u32> },

    /// Empty or malformed payload where data was expected.
    #[error("incomplete response: {context}")]
    Transient { context: String },

    #[error("unexpected HTTP status {status} while {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether the caller may re-issue the same request.
    pub fn retry(&self) -> bool {
        match self {
            EngineError::LoggedOut => false,
            EngineError::RateLimited { .. }
            | EngineError::Transient { .. }
            | EngineError::UnexpectedStatus { .. } => true,
            EngineError::Other(_) => false,
        }
    }

    pub fn is_logged_out(&self) -> bool {
        matches!(self, EngineError::LoggedOut)
    }

    pub fn transient(context: impl Into<String>) -> Self {
        EngineError::Transient {
            context: context.into(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Non-fatal data problems. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataWarning {
    /// The currency feed had no "Exalted Orb" line to derive the chaos cross-rate from.
    MissingReferenceRate,
    /// A change was computed against a snapshot whose total was zero.
    ZeroBaseline,
}

/// Response from an external collaborator: an HTTP-style status plus the decoded body.
#[derive(Debug, Clone)]
pub struct FetchResponse<T> {
    pub status: u16,
    pub data: Option<T>,
}

impl<T> FetchResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
        }
    }

    pub fn status(status: u16) -> Self {
        Self { status, data: None }
    }
}

/// Map a collaborator response onto the engine's status contract.
///
/// `Ok(None)` means "not found, treat as empty".
pub fn classify_status<T>(response: FetchResponse<T>, context: &str) -> EngineResult<Option<T>> {
    match response.status {
        200 => match response.data {
            Some(data) => Ok(Some(data)),
            None => Err(EngineError::transient(format!("{context}: empty payload"))),
        },
        404 => Ok(None),
        403 => Err(EngineError::LoggedOut),
        429 => Err(EngineError::RateLimited {
            resume_from_tab: None,
        }),
        status => Err(EngineError::UnexpectedStatus {
            status,
            context: context.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_status_contract() {
        assert_eq!(
            classify_status(FetchResponse::ok(5), "x").unwrap(),
            Some(5)
        );
        assert_eq!(
            classify_status(FetchResponse::<i32>::status(404), "x").unwrap(),
            None
        );
        assert!(classify_status(FetchResponse::<i32>::status(403), "x")
            .unwrap_err()
            .is_logged_out());
        assert!(matches!(
            classify_status(FetchResponse::<i32>::status(429), "x").unwrap_err(),
            EngineError::RateLimited { .. }
        ));
    }

    #[test]
    fn empty_success_is_retryable() {
        let err = classify_status(FetchResponse::<i32>::status(200), "fetching rates").unwrap_err();
        assert!(matches!(err, EngineError::Transient { .. }));
        assert!(err.retry());
    }

    #[test]
    fn logged_out_is_not_retryable() {
        assert!(!EngineError::LoggedOut.retry());
        assert!(EngineError::RateLimited { resume_from_tab: Some(3) }.retry());
        assert!(EngineError::UnexpectedStatus {
            status: 502,
            context: "x".into()
        }
        .retry());
    }
}
