use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{
    error::{Error, Result},
    AppState,
};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Err(Error::Unauthorized("missing_authorization".into()));
    };
    let auth_str = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".into()))?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".into()))
}

/// Shared-secret check for the scheduler-facing endpoints.
pub fn verify_bearer_secret(headers: &HeaderMap, expected: &str) -> Result<()> {
    let provided = bearer_token(headers)?;
    if !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(Error::Unauthorized("invalid_token".into()))
    }
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized("invalid_token".into()))
}

pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = match bearer_token(req.headers())
        .and_then(|token| decode_claims(token, &state.config.jwt_secret))
    {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let role = claims.role.clone().unwrap_or_default();
    if !role.eq_ignore_ascii_case(ADMIN_ROLE) {
        return Error::Forbidden("forbidden".into()).into_response();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}
