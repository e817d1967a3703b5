use std::{convert::Infallible, fmt};

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};

/// Name shared by the query parameter and the cookie that may carry a credential.
pub const TOKEN_PARAM: &str = "token";

/// CredentialSource
///
/// The carriers a bearer credential may arrive on. Only used for logging and tests;
/// the token itself is never logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Query,
    AuthorizationHeader,
    Cookie,
}

type SourceFn = fn(&Parts) -> Option<String>;

/// Carriers in priority order. The first one yielding a non-empty value wins.
pub const CREDENTIAL_SOURCES: [(CredentialSource, SourceFn); 3] = [
    (CredentialSource::Query, from_query as SourceFn),
    (
        CredentialSource::AuthorizationHeader,
        from_authorization_header as SourceFn,
    ),
    (CredentialSource::Cookie, from_cookie as SourceFn),
];

/// RawCredential
///
/// An unverified credential string together with the carrier it was found on.
#[derive(Clone)]
pub struct RawCredential {
    pub source: CredentialSource,
    pub token: String,
}

impl fmt::Debug for RawCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCredential")
            .field("source", &self.source)
            .field("token", &"<redacted>")
            .finish()
    }
}

// Decoded as raw pairs so a repeated `token` parameter still yields its first value
// instead of failing the whole query.
fn from_query(parts: &Parts) -> Option<String> {
    Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(pairs)| {
            pairs
                .into_iter()
                .find(|(name, _)| name == TOKEN_PARAM)
                .map(|(_, value)| value)
        })
}

// The auth scheme is case-insensitive (RFC 9110 11.1).
fn from_authorization_header(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim().to_string())
}

fn from_cookie(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == TOKEN_PARAM).then(|| value.to_string())
        })
}

/// extract_credential
///
/// Tries every carrier in `CREDENTIAL_SOURCES` order. Returns `None` when none of them
/// holds a value; rejecting on that basis is the decider's job, not this one.
pub fn extract_credential(parts: &Parts) -> Option<RawCredential> {
    CREDENTIAL_SOURCES.iter().find_map(|(source, extract)| {
        extract(parts)
            .filter(|token| !token.is_empty())
            .map(|token| RawCredential {
                source: *source,
                token,
            })
    })
}

/// MaybeCredential Extractor
///
/// Axum extractor wrapper around `extract_credential`. It never rejects: an absent
/// credential is a normal outcome for public media.
#[derive(Debug, Clone)]
pub struct MaybeCredential(pub Option<RawCredential>);

impl<S> FromRequestParts<S> for MaybeCredential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCredential(extract_credential(parts)))
    }
}
