//! Identity middleware — Bearer token verification and device-key
//! extraction.
//!
//! Tokens are issued by the external identity provider; this layer only
//! verifies them against the shared secret and hands the resulting
//! `Identity` to handlers. No header means an anonymous caller, which is a
//! valid state everywhere except the privileged routes.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use courtside_core::entitlement::Identity;

use crate::AppState;
use crate::error::AppError;
use crate::models::IdentityClaims;

/// Header carrying the caller's opaque device identifier.
pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Key used to store the verified `Identity` in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct CurrentIdentity(pub Identity);

/// Key used to store the normalized device key in request extensions.
#[derive(Debug, Clone)]
pub struct RequestDeviceKey(pub Option<String>);

/// Verify an identity token, returning the claims on success.
pub fn verify_identity_token(token: &str, secret: &[u8]) -> Option<IdentityClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<IdentityClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Normalize a raw device identifier to a fixed-size storage key.
///
/// Clients send arbitrary strings; hashing keeps the stored key uniform and
/// avoids persisting the raw identifier.
pub fn device_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn identity_from_claims(claims: &IdentityClaims) -> Result<Identity, AppError> {
    let account_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid subject claim".into()))?;
    Ok(Identity {
        account_id: Some(account_id),
        is_admin: claims.roles.iter().any(|r| r == "admin"),
    })
}

/// Axum middleware: verifies `Authorization: Bearer <token>` when present,
/// hashes `X-Device-Id`, and injects both into request extensions. A missing
/// header yields an anonymous identity; a malformed or expired token is
/// rejected.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match request.headers().get(AUTHORIZATION) {
        None => Identity::anonymous(),
        Some(value) => {
            let header = value
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".into()))?;
            let token = header
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;
            let claims = verify_identity_token(token, state.config.identity_jwt_secret.as_bytes())
                .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;
            identity_from_claims(&claims)?
        }
    };

    let device = request
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|raw| !raw.trim().is_empty())
        .map(device_key);

    request.extensions_mut().insert(CurrentIdentity(identity));
    request.extensions_mut().insert(RequestDeviceKey(device));

    Ok(next.run(request).await)
}

/// Axum middleware for administrator-only routes. Relies on
/// `resolve_identity` having run first.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<CurrentIdentity>()
        .map(|c| c.0)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    if identity.account_id.is_none() {
        return Err(AppError::Unauthorized("Authentication required".into()));
    }
    if !identity.is_admin {
        return Err(AppError::Forbidden("Administrator role required".into()));
    }

    Ok(next.run(request).await)
}
