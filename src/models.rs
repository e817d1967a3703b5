use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Credential Schemas ---

/// SubscriptionTier
///
/// Subscription level embedded in a credential at issuance time. The gateway never
/// looks tiers up live; whatever was signed is what counts.
///
/// `none` is accepted as a spelling of `free`. Any other unknown value fails decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SubscriptionTier {
    #[default]
    #[serde(alias = "none")]
    Free,
    Basic,
    Premium,
}

impl SubscriptionTier {
    /// The video gate is binary: anything above the lowest tier counts as paid.
    pub fn is_paid(self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }
}

/// Role
///
/// Capability class of the principal. Part of the credential shape but not consulted
/// by any access decision in this gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    User,
    Admin,
}

// --- Response Payloads (Output Schemas) ---

/// ErrorResponse
///
/// Body of every rejected request. The shape is identical across failure kinds so a
/// caller cannot tell a traversal attempt from a missing file by looking at it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// HealthResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
