//! Session context: the bearer token plus its claims, decoded once.
//!
//! Components needing identity or role checks take a [`Session`] instead of
//! re-parsing the token ad hoc at every call site. The token's signature is
//! not verified client-side; the server remains the authority on every
//! request the token accompanies.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Role claim carried by the campus API's tokens. Unknown roles fall back
/// to `Student` (least privilege).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Organizer,
    Admin,
}

impl Role {
    fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "organizer" | "organiser" | "creator" => Role::Organizer,
            other => {
                if other != "student" {
                    debug!("unknown role {:?}, treating as student", other);
                }
                Role::Student
            }
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::from_wire(&raw))
    }
}

/// Claims the client cares about from the token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserClaims {
    /// Subject: the user's id.
    pub sub: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Student
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("token is not usable: {reason}")]
    InvalidToken { reason: String },
}

/// An authenticated session: the raw bearer token plus its decoded claims.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    claims: UserClaims,
}

impl Session {
    /// Decode the token's claims once and cache them for the session's
    /// lifetime.
    pub fn from_token(token: impl Into<String>) -> Result<Self, SessionError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        debug!("session established for user {}", claims.sub);
        Ok(Self { token, claims })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn claims(&self) -> &UserClaims {
        &self.claims
    }

    /// Whether this user manages events (sees the creator dashboard).
    pub fn can_manage_events(&self) -> bool {
        matches!(self.claims.role, Role::Organizer | Role::Admin)
    }
}

fn decode_claims(token: &str) -> Result<UserClaims, SessionError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(SessionError::InvalidToken {
            reason: format!("expected 3 segments, found {}", segments.len()),
        });
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| SessionError::InvalidToken {
            reason: format!("payload is not base64url: {}", e),
        })?;

    serde_json::from_slice(&payload).map_err(|e| SessionError::InvalidToken {
        reason: format!("claims did not parse: {}", e),
    })
}
