//! The session manager — owner of the authenticated session.
//!
//! State machine: `Unknown → Restoring → {Authenticated, Anonymous}`,
//! with `Authenticated → Anonymous` on logout, detected expiry, or a 401
//! reported by a collaborator. The rest of the application only ever sees
//! read-only borrows of the [`Session`].
//!
//! The client holds no signing secret, so access-token claims are read
//! without signature verification — the token is trusted exactly as far
//! as the server honouring it on the next request. Expiry is checked
//! explicitly against the current time instead.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use wardbook_core::staff::{Credentials, Role, Session, StaffUser};

use crate::{api::AuthApi, error::ApiError, token::TokenStore};

// ─── Claims ──────────────────────────────────────────────────────────────────

/// Identity claims carried by the access token.
#[derive(Debug, Deserialize)]
struct Claims {
  staff_id: String,
  username: String,
  email:    String,
  role:     Role,
  /// Seconds since the Unix epoch.
  exp:      i64,
}

fn decode_claims(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
  let mut validation = Validation::new(Algorithm::HS256);
  validation.insecure_disable_signature_validation();
  // Expiry is checked by the caller so an expired-but-readable token can
  // be told apart from a malformed one in logs.
  validation.validate_exp = false;
  Ok(decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?.claims)
}

fn expiry_instant(claims: &Claims) -> Option<DateTime<Utc>> {
  DateTime::from_timestamp(claims.exp, 0)
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  /// Before [`SessionManager::restore`] has been attempted.
  Unknown,
  /// Restoration in progress; gated screens must not render yet.
  Restoring,
  Authenticated(Session),
  Anonymous,
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Owns login/logout transitions and the stored token pair.
pub struct SessionManager<A, T> {
  api:    A,
  tokens: T,
  state:  SessionState,
}

impl<A: AuthApi, T: TokenStore> SessionManager<A, T> {
  pub fn new(api: A, tokens: T) -> Self {
    Self {
      api,
      tokens,
      state: SessionState::Unknown,
    }
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn session(&self) -> Option<&Session> {
    match &self.state {
      SessionState::Authenticated(session) => Some(session),
      _ => None,
    }
  }

  pub fn is_authenticated(&self) -> bool {
    matches!(self.state, SessionState::Authenticated(_))
  }

  /// True only while [`SessionManager::restore`] is running.
  pub fn is_restoring(&self) -> bool {
    matches!(self.state, SessionState::Restoring)
  }

  /// Attempt to restore a session from the stored access token. Runs once
  /// at process start and always resolves to `Authenticated` or
  /// `Anonymous`; an invalid or expired token is cleared silently.
  pub fn restore(&mut self) {
    self.state = SessionState::Restoring;

    let token = match self.tokens.access_token() {
      Ok(Some(token)) => token,
      Ok(None) => {
        self.state = SessionState::Anonymous;
        return;
      }
      Err(e) => {
        tracing::warn!("token store read failed during restore: {e}");
        self.state = SessionState::Anonymous;
        return;
      }
    };

    let claims = match decode_claims(&token) {
      Ok(claims) => claims,
      Err(e) => {
        tracing::debug!("stored access token is unreadable: {e}");
        self.drop_tokens();
        self.state = SessionState::Anonymous;
        return;
      }
    };

    let expires_at = match expiry_instant(&claims) {
      Some(instant) if instant > Utc::now() => instant,
      _ => {
        // Expired (or nonsense expiry): same as no session at all.
        self.drop_tokens();
        self.state = SessionState::Anonymous;
        return;
      }
    };

    self.state = SessionState::Authenticated(Session {
      user: StaffUser {
        id:        claims.staff_id,
        username:  claims.username,
        // The token does not carry the full name; only a fresh login
        // populates it.
        full_name: String::new(),
        email:     claims.email,
        role:      claims.role,
      },
      expires_at,
    });
  }

  /// Authenticate against the server. On failure the current state is
  /// left untouched and the caller (the login screen) surfaces the error
  /// and may retry.
  pub async fn login(
    &mut self,
    credentials: &Credentials,
  ) -> Result<(), ApiError> {
    let resp = self.api.login(credentials).await?;

    let claims = decode_claims(&resp.access_token).map_err(|e| {
      ApiError::BadResponse(format!("unreadable access token: {e}"))
    })?;
    let expires_at = expiry_instant(&claims).ok_or_else(|| {
      ApiError::BadResponse("access token has no usable expiry".into())
    })?;

    self
      .tokens
      .set_tokens(&resp.access_token, &resp.refresh_token)?;
    self.state = SessionState::Authenticated(Session {
      user: resp.user,
      expires_at,
    });
    Ok(())
  }

  /// Log out: notify the server best-effort, then always clear local
  /// state. Never fails — by the time this returns, no live session can
  /// be observed whatever the server did.
  pub async fn logout(&mut self) {
    if let Err(e) = self.api.logout().await {
      tracing::warn!("server-side logout failed: {e}");
    }
    self.drop_tokens();
    self.state = SessionState::Anonymous;
  }

  /// Tear the session down without a server call. Used when a request
  /// comes back 401 — the token is already dead server-side.
  pub fn invalidate(&mut self) {
    self.drop_tokens();
    self.state = SessionState::Anonymous;
  }

  fn drop_tokens(&mut self) {
    if let Err(e) = self.tokens.clear() {
      tracing::warn!("failed to clear stored tokens: {e}");
    }
  }
}
