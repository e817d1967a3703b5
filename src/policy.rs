use crate::{
    auth::{Claims, verify_credential},
    error::GatewayError,
    extract::RawCredential,
};

/// ResourceClass
///
/// Access class of a media object, derived from the first segment of its relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// `images/...`: served to anyone, cacheable by intermediaries.
    Public,
    /// `videos/...` and everything unrecognized: paid subscribers only.
    Protected,
}

impl ResourceClass {
    /// Unrecognized leading segments fail closed to `Protected`.
    pub fn from_path(relative_path: &str) -> Self {
        match relative_path.split('/').next() {
            Some("images") => ResourceClass::Public,
            Some("videos") => ResourceClass::Protected,
            _ => ResourceClass::Protected,
        }
    }

    pub fn cache_control(self) -> &'static str {
        match self {
            ResourceClass::Public => "public, max-age=86400",
            ResourceClass::Protected => "private, max-age=3600",
        }
    }
}

/// Access
///
/// Outcome of a successful decision. `Subscriber` keeps the verified claims around
/// for audit logging.
#[derive(Debug, Clone)]
pub enum Access {
    Public,
    Subscriber(Claims),
}

/// authorize
///
/// The per-request access decision. Pure: no I/O, no shared state, `now` supplied by
/// the caller as Unix seconds.
///
/// Public resources are allowed without looking at the credential at all. Protected
/// resources go through, in order: presence, signature/structure, explicit freshness,
/// then the paid-tier gate.
pub fn authorize(
    credential: Option<&RawCredential>,
    class: ResourceClass,
    secret: &str,
    now: i64,
) -> Result<Access, GatewayError> {
    if class == ResourceClass::Public {
        return Ok(Access::Public);
    }

    let credential = credential.ok_or(GatewayError::NoCredential)?;

    let claims = verify_credential(&credential.token, secret)?;

    // Must agree with the verifier even if its expiry handling changes.
    if !claims.is_fresh_at(now) {
        return Err(GatewayError::ExpiredCredential);
    }

    if !claims.subscription_tier.is_paid() {
        return Err(GatewayError::InsufficientTier);
    }

    Ok(Access::Subscriber(claims))
}
