/// Router Module Index
///
/// Splits the gateway's routes by exposure. Public routes carry no access checks at
/// all; media routes run every request through the credential/authorization pipeline
/// inside the handler itself.

/// Unauthenticated service routes (health).
pub mod public;

/// The protected media access gateway.
pub mod media;
