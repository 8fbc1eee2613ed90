// src/utils/auth.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::config::Config;

/// Axum Middleware: Admin Authorization.
///
/// Requires `Authorization: Bearer <ADMIN_TOKEN>`. Returns 401 when the header
/// is missing or the token does not match.
pub async fn admin_token_middleware(
    State(config): State<Config>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = config
        .admin_token
        .as_deref()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !tokens_match(token.trim(), expected) {
        tracing::warn!("Rejected admin request with invalid token");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}

// Length leaks, contents do not.
fn tokens_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
