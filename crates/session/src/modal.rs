use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

/// Progress of the most recently submitted write.
///
/// Opened when a write is submitted, resolved once with the wallet's
/// outcome, and reset when the user dismisses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionModal {
    pub is_open: bool,
    pub transaction_hash: String,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TransactionModal {
    pub fn submitted() -> Self {
        Self {
            is_open: true,
            ..Default::default()
        }
    }

    /// Record the outcome. Only a pending, open modal is updated.
    pub fn resolve<E: fmt::Display>(&mut self, outcome: &Result<String, E>) {
        if !self.is_open || self.status != TransactionStatus::Pending {
            return;
        }

        match outcome {
            Ok(hash) => {
                self.transaction_hash = hash.clone();
                self.status = TransactionStatus::Success;
            }
            Err(err) => {
                self.status = TransactionStatus::Failed;
                self.error_message = Some(err.to_string());
            }
        }
    }

    pub fn dismiss(&mut self) {
        *self = Self::default();
    }

    pub const fn is_pending(&self) -> bool {
        self.is_open && matches!(self.status, TransactionStatus::Pending)
    }
}
