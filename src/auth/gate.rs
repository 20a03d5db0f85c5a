use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::auth::session::{Session, token_from_headers};
use crate::metrics::GATE_REJECTIONS;
use crate::state::AppState;

pub const LOGIN_PAGE: &str = "/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AdminPageLogin,
    AdminPageProtected,
    AdminApiProtected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    User,
    Admin,
}

impl SessionState {
    pub fn of(session: Option<&Session>) -> Self {
        match session {
            None => SessionState::Absent,
            Some(s) if s.is_admin => SessionState::Admin,
            Some(_) => SessionState::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    RedirectToLogin,
    Unauthorized,
}

// `/admin` matches `/admin` and `/admin/...`, never `/administrator`
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn classify(path: &str) -> RouteClass {
    if under(path, "/api/admin") {
        RouteClass::AdminApiProtected
    } else if under(path, LOGIN_PAGE) || under(path, "/admin/error") {
        RouteClass::AdminPageLogin
    } else if under(path, "/admin") {
        RouteClass::AdminPageProtected
    } else {
        RouteClass::Public
    }
}

pub fn decide(class: RouteClass, session: SessionState) -> GateDecision {
    match (class, session) {
        (RouteClass::Public, _) | (RouteClass::AdminPageLogin, _) => GateDecision::Proceed,
        (_, SessionState::Admin) => GateDecision::Proceed,
        (RouteClass::AdminPageProtected, _) => GateDecision::RedirectToLogin,
        (RouteClass::AdminApiProtected, _) => GateDecision::Unauthorized,
    }
}

/// Resolves the caller's session, stores it in the request extensions and
/// lets the request through only when the gate allows it.
pub async fn gate_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let class = classify(request.uri().path());

    let session = token_from_headers(request.headers())
        .and_then(|token| state.sessions.verify(&token).ok());

    match decide(class, SessionState::of(session.as_ref())) {
        GateDecision::Proceed => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        GateDecision::RedirectToLogin => {
            GATE_REJECTIONS.inc();
            tracing::info!(path = %request.uri().path(), "redirecting to login");
            Redirect::temporary(LOGIN_PAGE).into_response()
        }
        GateDecision::Unauthorized => {
            GATE_REJECTIONS.inc();
            tracing::warn!(path = %request.uri().path(), "unauthorized admin api call");
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_paths_by_segment() {
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/posts/hello"), RouteClass::Public);
        assert_eq!(classify("/api/auth/login"), RouteClass::Public);
        assert_eq!(classify("/administrator"), RouteClass::Public);
        assert_eq!(classify("/admin/login"), RouteClass::AdminPageLogin);
        assert_eq!(classify("/admin/error"), RouteClass::AdminPageLogin);
        assert_eq!(classify("/admin/login-help"), RouteClass::AdminPageProtected);
        assert_eq!(classify("/admin"), RouteClass::AdminPageProtected);
        assert_eq!(classify("/admin/posts/new"), RouteClass::AdminPageProtected);
        assert_eq!(classify("/api/admin/posts"), RouteClass::AdminApiProtected);
        assert_eq!(classify("/api/administer"), RouteClass::Public);
    }

    #[test]
    fn public_and_login_pages_always_proceed() {
        for session in [SessionState::Absent, SessionState::User, SessionState::Admin] {
            assert_eq!(decide(RouteClass::Public, session), GateDecision::Proceed);
            assert_eq!(decide(RouteClass::AdminPageLogin, session), GateDecision::Proceed);
        }
    }

    #[test]
    fn protected_pages_redirect_non_admins() {
        assert_eq!(decide(RouteClass::AdminPageProtected, SessionState::Absent), GateDecision::RedirectToLogin);
        assert_eq!(decide(RouteClass::AdminPageProtected, SessionState::User), GateDecision::RedirectToLogin);
        assert_eq!(decide(RouteClass::AdminPageProtected, SessionState::Admin), GateDecision::Proceed);
    }

    #[test]
    fn protected_api_rejects_non_admins_without_redirect() {
        assert_eq!(decide(RouteClass::AdminApiProtected, SessionState::Absent), GateDecision::Unauthorized);
        assert_eq!(decide(RouteClass::AdminApiProtected, SessionState::User), GateDecision::Unauthorized);
        assert_eq!(decide(RouteClass::AdminApiProtected, SessionState::Admin), GateDecision::Proceed);
    }

    #[test]
    fn session_state_follows_admin_flag() {
        let mut session = Session {
            email: "a@example.com".into(),
            name: "A".into(),
            image: None,
            is_admin: false,
        };
        assert_eq!(SessionState::of(None), SessionState::Absent);
        assert_eq!(SessionState::of(Some(&session)), SessionState::User);
        session.is_admin = true;
        assert_eq!(SessionState::of(Some(&session)), SessionState::Admin);
    }
}
