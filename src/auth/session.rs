use std::collections::HashSet;

use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "admin-token";
const MIN_SECRET_LENGTH: usize = 32;

// Identity as reported by whoever authenticated the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub is_admin: bool,
    pub iat: usize,
    pub exp: usize,
}

/// Session resolved from a verified token. `is_admin` is whatever the
/// token carries; it is not re-checked per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_admin: bool,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
            image: claims.picture,
            is_admin: claims.is_admin,
        }
    }
}

/// Issues, verifies and refreshes signed session tokens.
///
/// The admin allow-list is consulted only in [`SessionManager::issue`] and
/// [`SessionManager::refresh`].
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_emails: HashSet<String>,
    primary_admin: Option<String>, // first allow-list entry
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(
        secret: &str,
        admin_emails: &str,
        ttl: Duration,
        secure_cookies: bool,
    ) -> Result<Self, AppError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Config(format!(
                "session secret too short: {} bytes (minimum {})",
                secret.len(),
                MIN_SECRET_LENGTH
            )));
        }

        let allow_list = parse_allow_list(admin_emails);
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            primary_admin: allow_list.first().cloned(),
            admin_emails: allow_list.into_iter().collect(),
            ttl,
            secure_cookies,
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_ascii_lowercase())
    }

    /// Identity a password-only login signs in as.
    pub fn primary_admin(&self) -> Option<&str> {
        self.primary_admin.as_deref()
    }

    /// Signs a new token for `identity`, deciding admin status now.
    pub fn issue(&self, identity: &Identity) -> Result<(String, Session), AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.email.clone(),
            name: identity.name.clone(),
            picture: identity.image.clone(),
            is_admin: self.is_admin_email(&identity.email),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, Session::from(claims)))
    }

    pub fn verify(&self, token: &str) -> Result<Session, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AppError::Unauthorized
            })?;
        Ok(Session::from(data.claims))
    }

    /// Re-issues a still-valid token with a new expiry and a freshly
    /// computed admin flag.
    pub fn refresh(&self, token: &str) -> Result<(String, Session), AppError> {
        let session = self.verify(token)?;
        let identity = Identity {
            email: session.email,
            name: session.name,
            image: session.image,
        };
        self.issue(&identity)
    }

    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.ttl.num_seconds())
    }

    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
            SESSION_COOKIE, value, max_age
        );
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn parse_allow_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Session token presented with a request: the session cookie, or else a
/// bearer `Authorization` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn manager() -> SessionManager {
        SessionManager::new(SECRET, " Editor@Example.com ,ops@example.com", Duration::hours(24), false).unwrap()
    }

    fn identity(email: &str) -> Identity {
        Identity {
            email: email.to_string(),
            name: "Test User".to_string(),
            image: None,
        }
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = SessionManager::new("short", "", Duration::hours(1), false);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn allow_listed_email_gets_admin_session() {
        let manager = manager();
        let (token, session) = manager.issue(&identity("editor@example.com")).unwrap();
        assert!(session.is_admin);
        assert!(manager.verify(&token).unwrap().is_admin);
    }

    #[test]
    fn other_email_gets_plain_session() {
        let manager = manager();
        let (token, session) = manager.issue(&identity("reader@example.com")).unwrap();
        assert!(!session.is_admin);
        assert_eq!(manager.verify(&token).unwrap().email, "reader@example.com");
    }

    #[test]
    fn token_from_other_secret_is_unauthorized() {
        let other = SessionManager::new(
            "another-secret-that-is-also-long-enough",
            "editor@example.com",
            Duration::hours(1),
            false,
        )
        .unwrap();
        let (token, _) = other.issue(&identity("editor@example.com")).unwrap();
        assert!(matches!(manager().verify(&token), Err(AppError::Unauthorized)));
        assert!(matches!(manager().verify("garbage"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn refresh_recomputes_admin_flag() {
        let old = SessionManager::new(SECRET, "former@example.com", Duration::hours(1), false).unwrap();
        let (token, session) = old.issue(&identity("former@example.com")).unwrap();
        assert!(session.is_admin);

        // same secret, allow-list changed since issuance
        let (_, refreshed) = manager().refresh(&token).unwrap();
        assert!(!refreshed.is_admin);
    }

    #[test]
    fn primary_admin_is_first_allow_list_entry() {
        assert_eq!(manager().primary_admin(), Some("editor@example.com"));
        let empty = SessionManager::new(SECRET, " , ", Duration::hours(1), false).unwrap();
        assert_eq!(empty.primary_admin(), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = manager().session_cookie("abc");
        assert_eq!(cookie, "admin-token=abc; Path=/; HttpOnly; SameSite=Strict; Max-Age=86400");

        let secure = SessionManager::new(SECRET, "", Duration::hours(24), true).unwrap();
        assert!(secure.clear_cookie().ends_with("Max-Age=0; Secure"));
    }

    #[test]
    fn token_is_read_from_cookie_then_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; admin-token=from-cookie".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));

        headers.remove(header::COOKIE);
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));

        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }
}
