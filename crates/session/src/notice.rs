use config::ConfigError;
use serde::Serialize;
use std::error::Error;
use token::ServiceError;

/// How prominently an error is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Replaces the whole screen; nothing else can run
    Blocking,
    /// Shown next to the input that caused it
    Inline,
    /// Transient message
    Toast,
}

/// The one user-visible signal for an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Extra lines, e.g. the missing configuration keys
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Notice {
    /// Classify `err` by the first configuration or service error in its
    /// source chain. Anything else is a toast.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        for cause in std::iter::successors(Some(err), |&e| e.source()) {
            if let Some(config) = cause.downcast_ref::<ConfigError>() {
                return Self::configuration(config);
            }
            if let Some(service) = cause.downcast_ref::<ServiceError>() {
                return Self::service(service);
            }
        }

        Self::toast("Error", err.to_string())
    }

    fn configuration(err: &ConfigError) -> Self {
        Self {
            severity: Severity::Blocking,
            title: "Configuration Error".to_string(),
            message: err.to_string(),
            details: err
                .missing_keys()
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }

    fn service(err: &ServiceError) -> Self {
        match err {
            ServiceError::Validation { .. } | ServiceError::MissingIdentity => Self {
                severity: Severity::Inline,
                title: "Invalid input".to_string(),
                message: err.to_string(),
                details: Vec::new(),
            },
            ServiceError::Reverted { .. } => Self::toast("Transaction would fail", err.to_string()),
            ServiceError::Rpc { .. } | ServiceError::Decode { .. } => {
                Self::toast("Request failed", err.to_string())
            }
        }
    }

    fn toast(title: &str, message: String) -> Self {
        Self {
            severity: Severity::Toast,
            title: title.to_string(),
            message,
            details: Vec::new(),
        }
    }
}
