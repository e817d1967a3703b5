use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use media_gateway::{
    GatewayError,
    auth::verify_credential,
    extract::{CredentialSource, RawCredential},
    models::{Role, SubscriptionTier},
    policy::{Access, ResourceClass, authorize},
};
use serde_json::{Value, json};

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn now() -> i64 {
    Utc::now().timestamp()
}

fn claims(tier: Option<&str>, exp_offset: i64) -> Value {
    let now = now();
    let mut claims = json!({
        "sub": "user-42",
        "email": "viewer@example.com",
        "role": "user",
        "iat": now,
        "exp": now + exp_offset,
    });
    if let Some(tier) = tier {
        claims["subscription_tier"] = json!(tier);
    }
    claims
}

fn sign(payload: &Value, secret: &str) -> String {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), payload, &key).unwrap()
}

fn credential(token: String) -> RawCredential {
    RawCredential {
        source: CredentialSource::AuthorizationHeader,
        token,
    }
}

fn decide(token: String) -> Result<Access, GatewayError> {
    authorize(
        Some(&credential(token)),
        ResourceClass::Protected,
        TEST_JWT_SECRET,
        now(),
    )
}

// --- verify_credential ---

#[test]
fn test_verify_valid_token() {
    let token = sign(&claims(Some("premium"), 3600), TEST_JWT_SECRET);
    let claims = verify_credential(&token, TEST_JWT_SECRET).unwrap();

    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.email, "viewer@example.com");
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.subscription_tier, SubscriptionTier::Premium);
}

#[test]
fn test_verify_wrong_secret_is_invalid() {
    let token = sign(&claims(Some("premium"), 3600), "some-other-secret");
    let result = verify_credential(&token, TEST_JWT_SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidCredential(_))));
}

#[test]
fn test_verify_garbage_is_invalid() {
    let result = verify_credential("definitely.not.ajwt", TEST_JWT_SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidCredential(_))));
}

#[test]
fn test_verify_expired_is_expired() {
    let token = sign(&claims(Some("premium"), -60), TEST_JWT_SECRET);
    let result = verify_credential(&token, TEST_JWT_SECRET);
    assert!(matches!(result, Err(GatewayError::ExpiredCredential)));
}

#[test]
fn test_verify_expired_with_bad_signature_is_invalid() {
    // Signature is checked before expiry; a forged old token is not "expired".
    let token = sign(&claims(Some("premium"), -60), "forger");
    let result = verify_credential(&token, TEST_JWT_SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidCredential(_))));
}

#[test]
fn test_verify_missing_required_field_is_invalid() {
    let mut payload = claims(Some("premium"), 3600);
    payload.as_object_mut().unwrap().remove("email");
    let token = sign(&payload, TEST_JWT_SECRET);

    let result = verify_credential(&token, TEST_JWT_SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidCredential(_))));
}

#[test]
fn test_verify_other_algorithm_is_invalid() {
    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims(Some("premium"), 3600),
        &key,
    )
    .unwrap();

    let result = verify_credential(&token, TEST_JWT_SECRET);
    assert!(matches!(result, Err(GatewayError::InvalidCredential(_))));
}

#[test]
fn test_verify_missing_tier_defaults_to_free() {
    let token = sign(&claims(None, 3600), TEST_JWT_SECRET);
    let claims = verify_credential(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.subscription_tier, SubscriptionTier::Free);
}

#[test]
fn test_verify_null_tier_defaults_to_free() {
    let mut payload = claims(None, 3600);
    payload["subscription_tier"] = Value::Null;
    let token = sign(&payload, TEST_JWT_SECRET);

    let claims = verify_credential(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.subscription_tier, SubscriptionTier::Free);
}

#[test]
fn test_verify_accepts_short_subscription_field_name() {
    let mut payload = claims(None, 3600);
    payload["subscription"] = json!("basic");
    let token = sign(&payload, TEST_JWT_SECRET);

    let claims = verify_credential(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.subscription_tier, SubscriptionTier::Basic);
}

// --- authorize ---

#[test]
fn test_tier_gate_is_binary() {
    for tier in ["basic", "premium"] {
        let token = sign(&claims(Some(tier), 3600), TEST_JWT_SECRET);
        assert!(
            matches!(decide(token), Ok(Access::Subscriber(_))),
            "{tier} should be allowed"
        );
    }

    for tier in [Some("free"), Some("none"), None] {
        let token = sign(&claims(tier, 3600), TEST_JWT_SECRET);
        assert!(
            matches!(decide(token), Err(GatewayError::InsufficientTier)),
            "{tier:?} should be denied"
        );
    }
}

#[test]
fn test_admin_role_does_not_bypass_tier() {
    let mut payload = claims(Some("free"), 3600);
    payload["role"] = json!("admin");
    let token = sign(&payload, TEST_JWT_SECRET);

    assert!(matches!(decide(token), Err(GatewayError::InsufficientTier)));
}

#[test]
fn test_freshness_checked_independently_of_verifier() {
    // The library sees a token valid for another 100s, but the decision clock is
    // already past `exp`: the explicit check must reject it on its own.
    let token = sign(&claims(Some("premium"), 100), TEST_JWT_SECRET);
    let result = authorize(
        Some(&credential(token)),
        ResourceClass::Protected,
        TEST_JWT_SECRET,
        now() + 200,
    );
    assert!(matches!(result, Err(GatewayError::ExpiredCredential)));
}

#[test]
fn test_freshness_boundary_is_exclusive() {
    let payload = claims(Some("premium"), 100);
    let exp = payload["exp"].as_i64().unwrap();
    let token = sign(&payload, TEST_JWT_SECRET);

    let result = authorize(
        Some(&credential(token)),
        ResourceClass::Protected,
        TEST_JWT_SECRET,
        exp,
    );
    assert!(matches!(result, Err(GatewayError::ExpiredCredential)));
}

#[test]
fn test_expired_token_denied_as_expired() {
    let token = sign(&claims(Some("premium"), -10), TEST_JWT_SECRET);
    assert!(matches!(decide(token), Err(GatewayError::ExpiredCredential)));
}

#[test]
fn test_public_class_never_denies() {
    let expired = sign(&claims(Some("free"), -10), TEST_JWT_SECRET);
    let result = authorize(
        Some(&credential(expired)),
        ResourceClass::Public,
        TEST_JWT_SECRET,
        now(),
    );
    assert!(matches!(result, Ok(Access::Public)));
    assert!(matches!(
        authorize(None, ResourceClass::Public, TEST_JWT_SECRET, now()),
        Ok(Access::Public)
    ));
}
