// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Anonymous session identifiers and caller identity resolution

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use rand::RngCore;
use tracing::warn;

use super::auth::AuthProvider;

/// Cookie carrying the anonymous session identifier
pub const SESSION_COOKIE: &str = "kontext_session_id";

const SESSION_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Who is calling, for quota accounting.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Quota key: user id when authenticated, session id otherwise
    pub identifier: String,
    pub user_id: Option<String>,
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Mint a session identifier: base36 millisecond timestamp followed by
/// 32 hex chars of cryptographically strong randomness.
pub fn mint_session_id() -> String {
    let timestamp = chrono::Utc::now().timestamp_millis().max(0) as u128;

    let mut random_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    format!("{}-{}", to_base36(timestamp), hex::encode(random_bytes))
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}

/// Reuse the session cookie if present, otherwise mint one and add it to
/// the jar (7 days, site-wide path). An existing value is reused verbatim.
pub fn session_id(jar: CookieJar) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = mint_session_id();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .max_age(time::Duration::days(SESSION_COOKIE_MAX_AGE_DAYS))
        .build();
    (jar.add(cookie), id)
}

/// Bearer token from the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Resolve the caller's identity: an authenticated user id when the bearer
/// token checks out, otherwise the (possibly fresh) session cookie. Auth
/// service failures degrade to anonymous rather than failing the request.
pub async fn resolve_identity(
    headers: &HeaderMap,
    jar: CookieJar,
    auth: &dyn AuthProvider,
) -> (CookieJar, Identity) {
    if let Some(token) = bearer_token(headers) {
        match auth.resolve_user(token).await {
            Ok(Some(user_id)) => {
                return (
                    jar,
                    Identity {
                        identifier: user_id.clone(),
                        user_id: Some(user_id),
                    },
                );
            }
            Ok(None) => {}
            Err(e) => warn!("auth resolution failed, treating caller as anonymous: {e:#}"),
        }
    }

    let (jar, session) = session_id(jar);
    (
        jar,
        Identity {
            identifier: session,
            user_id: None,
        },
    )
}

/// Resolve only an authenticated user id, for the endpoints that require a
/// signed-in caller.
pub async fn authenticated_user(headers: &HeaderMap, auth: &dyn AuthProvider) -> Option<String> {
    let token = bearer_token(headers)?;
    match auth.resolve_user(token).await {
        Ok(user) => user,
        Err(e) => {
            warn!("auth resolution failed: {e:#}");
            None
        }
    }
}
