// Session token helpers. The role is only shown to the user; the client
// never uses it to allow or deny anything.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::TokenError;

#[derive(Debug, Deserialize)]
struct RoleClaims {
    #[serde(default)]
    groups: Vec<String>,
}

/// Verify `token` with the shared HS512 secret and return its first group.
pub fn decode_role(token: &str, secret: &str) -> Result<String, TokenError> {
    let validation = Validation::new(Algorithm::HS512);
    let data = decode::<RoleClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    data.claims
        .groups
        .into_iter()
        .next()
        .ok_or(TokenError::MissingGroups)
}
