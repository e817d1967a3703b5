use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::GatewayError,
    models::{Role, SubscriptionTier},
};

/// Claims
///
/// The closed payload schema of a media credential. Signed by the external issuer with
/// the shared secret and re-verified on every request; nothing here is ever cached.
///
/// Every field except `subscription_tier` is required, so a token missing one of them
/// fails decoding and is treated as invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): opaque identifier of the acting principal.
    pub sub: String,
    /// Display/audit value only.
    pub email: String,
    /// Carried for completeness; not part of any access decision here.
    pub role: Role,
    /// Subscription tier baked in at issuance. Absent or `null` means `Free`.
    #[serde(default, alias = "subscription", deserialize_with = "tier_or_free")]
    pub subscription_tier: SubscriptionTier,
    /// Issued At (iat), Unix seconds.
    pub iat: i64,
    /// Expiration Time (exp), Unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Freshness check, independent of whatever the JWT library already enforced.
    pub fn is_fresh_at(&self, now: i64) -> bool {
        now < self.exp
    }
}

fn tier_or_free<'de, D>(deserializer: D) -> Result<SubscriptionTier, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SubscriptionTier>::deserialize(deserializer)?.unwrap_or_default())
}

/// verify_credential
///
/// Checks signature and structure of a raw credential against the shared secret.
///
/// Only HS256 is accepted and expiry is validated with zero leeway. A correctly signed
/// but expired token maps to `ExpiredCredential`; every other failure (bad signature,
/// malformed token, missing claim, wrong algorithm) maps to `InvalidCredential`.
pub fn verify_credential(token: &str, secret: &str) -> Result<Claims, GatewayError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(GatewayError::ExpiredCredential),
            other => Err(GatewayError::InvalidCredential(format!("{:?}", other))),
        },
    }
}
