//! Credential resolution for inbound turns.
//!
//! The bridge does not validate sessions itself; it forwards the caller's
//! access token to the agent backend, which does.

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};

/// Access token for the request: a bearer token, else the session cookie.
pub fn resolve_credential(headers: &HeaderMap, session_cookie: &str) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_value(headers, session_cookie))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .map(String::from)
}
