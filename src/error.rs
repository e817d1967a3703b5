use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Realm advertised on every 401 challenge.
pub const AUTH_REALM: &str = "Secure Media Access";

/// Minimum subscription tier hinted to callers rejected for insufficient tier.
pub const REQUIRED_SUBSCRIPTION: &str = "premium";

/// GatewayError
///
/// The complete failure taxonomy of the media gateway. Every rejection path in the
/// request pipeline ends in exactly one of these variants.
///
/// The `Display` output (via thiserror) is meant for operator logs and may carry
/// internal detail. Callers only ever see `public_message()`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential on any carrier while requesting a protected resource.
    #[error("no credential presented")]
    NoCredential,

    /// Signature or structure verification failed.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Correctly signed credential whose `exp` has passed.
    #[error("expired credential")]
    ExpiredCredential,

    /// Valid credential without a paid subscription.
    #[error("subscription tier insufficient")]
    InsufficientTier,

    /// Missing file, non-regular file, or an attempt to escape the storage root.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unexpected I/O or internal failure.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NoCredential
            | GatewayError::InvalidCredential(_)
            | GatewayError::ExpiredCredential => StatusCode::UNAUTHORIZED,
            GatewayError::InsufficientTier => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-line message safe to send to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::NoCredential => "Token requis",
            GatewayError::InvalidCredential(_) => "Token invalide",
            GatewayError::ExpiredCredential => "Token expiré",
            GatewayError::InsufficientTier => "Abonnement premium requis pour ce contenu",
            GatewayError::NotFound(_) => "Fichier non trouvé",
            GatewayError::Internal(_) => "Erreur interne du serveur",
        }
    }

    fn challenge(&self) -> Option<String> {
        match self {
            GatewayError::NoCredential => Some(format!("Bearer realm=\"{}\"", AUTH_REALM)),
            GatewayError::InvalidCredential(_) | GatewayError::ExpiredCredential => Some(format!(
                "Bearer realm=\"{}\", error=\"invalid_token\"",
                AUTH_REALM
            )),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.public_message().to_string(),
        };
        let mut response = (self.status(), Json(body)).into_response();

        if let Some(challenge) = self.challenge() {
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }
        if matches!(self, GatewayError::InsufficientTier) {
            response.headers_mut().insert(
                HeaderName::from_static("x-required-subscription"),
                HeaderValue::from_static(REQUIRED_SUBSCRIPTION),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_deny_reason_has_a_distinct_message() {
        let errors = [
            GatewayError::NoCredential,
            GatewayError::InvalidCredential("bad signature".into()),
            GatewayError::ExpiredCredential,
            GatewayError::InsufficientTier,
        ];
        let messages: HashSet<_> = errors.iter().map(|e| e.public_message()).collect();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn internal_detail_is_not_rendered() {
        let err = GatewayError::NotFound("/srv/media/../../etc/passwd".into());
        assert!(err.to_string().contains("etc/passwd"));
        assert!(!err.public_message().contains("etc"));
    }

    #[test]
    fn forbidden_carries_subscription_hint() {
        let response = GatewayError::InsufficientTier.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get("x-required-subscription").unwrap(),
            "premium"
        );
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn expired_challenge_flags_invalid_token() {
        let response = GatewayError::ExpiredCredential.into_response();
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(challenge.starts_with("Bearer realm=\"Secure Media Access\""));
        assert!(challenge.contains("error=\"invalid_token\""));
    }
}
