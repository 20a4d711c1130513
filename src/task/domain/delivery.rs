//! Delivery submissions recorded against an in-progress task.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One delivery submission by the assigned worker.
///
/// A task keeps every submission made before the client confirms receipt;
/// the last entry is the current delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    delivered_by: UserId,
    message: Option<String>,
    delivered_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Creates a delivery record. Blank messages are dropped.
    #[must_use]
    pub fn new(
        delivered_by: UserId,
        message: Option<String>,
        delivered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            delivered_by,
            message: message
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
            delivered_at,
        }
    }

    /// Returns the worker who delivered.
    #[must_use]
    pub const fn delivered_by(&self) -> UserId {
        self.delivered_by
    }

    /// Returns the accompanying message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn delivered_at(&self) -> DateTime<Utc> {
        self.delivered_at
    }
}
