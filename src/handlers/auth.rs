use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::{Identity, Session, token_from_headers, verify_password};
use crate::error::AppError;
use crate::handlers::parse_json;
use crate::metrics::{LOGIN_ATTEMPTS, LOGIN_FAILURES};
use crate::models::{LoginRequest, MessageResponse};
use crate::rate_limit::{client_identifier, rate_limit_headers, throttled_response};
use crate::state::AppState;

/// Throttled password login. Order matters: the attempt is counted before
/// the body is even parsed, so malformed requests spend quota too.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let policy = state.login_policy;
    let key = format!("login:{}", client_identifier(&headers));

    let decision = state.rate_limiter.check(&policy, &key);
    if !decision.allowed {
        return Ok(throttled_response(
            &policy,
            &decision,
            state.rate_limiter.now_ms(),
            "Too many login attempts. Please try again later.",
        ));
    }

    let request: LoginRequest = parse_json(&body)?;
    if request.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }
    // password-only logins sign in as the first allow-listed admin
    let email = match request.email.trim() {
        "" => state
            .sessions
            .primary_admin()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?,
        email => email.to_string(),
    };

    LOGIN_ATTEMPTS.inc();

    if !verify_password(request.password, state.admin_password_hash.clone()).await? {
        LOGIN_FAILURES.inc();
        tracing::warn!(key = %key, remaining = decision.remaining, "invalid login credentials");

        // blunt automated guessing
        tokio::time::sleep(state.login_failure_delay).await;

        return Ok((
            StatusCode::UNAUTHORIZED,
            rate_limit_headers(&policy, &decision),
            Json(json!({ "error": "Invalid password" })),
        )
            .into_response());
    }

    let identity = Identity {
        name: request.name.unwrap_or_else(|| email.clone()),
        email,
        image: None,
    };
    let (token, session) = state.sessions.issue(&identity)?;
    let decision = state.rate_limiter.refund(&policy, &key, decision);

    tracing::info!(email = %session.email, is_admin = session.is_admin, "login succeeded");

    let mut response_headers = rate_limit_headers(&policy, &decision);
    response_headers.insert(header::SET_COOKIE, cookie_header(&state.sessions.session_cookie(&token))?);

    Ok((
        StatusCode::OK,
        response_headers,
        Json(json!({ "message": "Login successful", "isAdmin": session.is_admin })),
    )
        .into_response())
}

pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let cookie = cookie_header(&state.sessions.clear_cookie())?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("Logout successful")),
    )
        .into_response())
}

/// Re-issues the presented session, re-checking the admin allow-list.
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = token_from_headers(&headers).ok_or(AppError::Unauthorized)?;
    let (token, session) = state.sessions.refresh(&token)?;
    let cookie = cookie_header(&state.sessions.session_cookie(&token))?;

    Ok(([(header::SET_COOKIE, cookie)], Json(session)).into_response())
}

// Current session, or null
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Option<Session>> {
    let session = token_from_headers(&headers).and_then(|t| state.sessions.verify(&t).ok());
    Json(session)
}

fn cookie_header(cookie: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(cookie).map_err(|e| AppError::Internal(format!("bad cookie header: {}", e)))
}
