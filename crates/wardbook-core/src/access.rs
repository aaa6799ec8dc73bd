//! Access control — a pure decision function over the current session.
//!
//! The guard runs at the boundary of every gated screen, after session
//! restoration has resolved. Allowed roles are declared per route in
//! [`GatedRoute::allowed_roles`]; today every route admits all three
//! roles, but narrowing a route is a one-line table edit, not a redesign.

use crate::staff::{Role, Session};

// ─── Decision ────────────────────────────────────────────────────────────────

/// The outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  /// No session at all — send the user to the login screen.
  RedirectToLogin,
  /// A session exists but its role is outside the route's allowed set.
  Deny,
}

/// Decide whether `session` may enter a screen restricted to `allowed`.
pub fn authorize(session: Option<&Session>, allowed: &[Role]) -> Decision {
  match session {
    None => Decision::RedirectToLogin,
    Some(s) if allowed.contains(&s.user.role) => Decision::Allow,
    Some(_) => Decision::Deny,
  }
}

// ─── Route table ─────────────────────────────────────────────────────────────

/// Screens that require an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedRoute {
  Dashboard,
  PatientDirectory,
  PatientRegistration,
  PatientProfile,
}

impl GatedRoute {
  /// Roles admitted to this route.
  pub fn allowed_roles(self) -> &'static [Role] {
    match self {
      GatedRoute::Dashboard
      | GatedRoute::PatientDirectory
      | GatedRoute::PatientRegistration
      | GatedRoute::PatientProfile => &Role::ALL,
    }
  }

  /// Convenience wrapper around [`authorize`] for this route's role set.
  pub fn authorize(self, session: Option<&Session>) -> Decision {
    authorize(session, self.allowed_roles())
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};

  use super::*;
  use crate::staff::StaffUser;

  fn session(role: Role) -> Session {
    Session {
      user:       StaffUser {
        id:        "staff-1".into(),
        username:  "drjane".into(),
        full_name: "Jane Doe".into(),
        email:     "jane@hospital.test".into(),
        role,
      },
      expires_at: Utc::now() + Duration::hours(1),
    }
  }

  #[test]
  fn missing_session_redirects_to_login() {
    assert_eq!(authorize(None, &Role::ALL), Decision::RedirectToLogin);
  }

  #[test]
  fn role_outside_the_allowed_set_is_denied() {
    let s = session(Role::Nurse);
    assert_eq!(authorize(Some(&s), &[Role::Admin]), Decision::Deny);
  }

  #[test]
  fn role_inside_the_allowed_set_is_allowed() {
    let s = session(Role::Doctor);
    assert_eq!(
      authorize(Some(&s), &[Role::Admin, Role::Doctor]),
      Decision::Allow
    );
  }

  #[test]
  fn every_declared_route_admits_all_current_roles() {
    for route in [
      GatedRoute::Dashboard,
      GatedRoute::PatientDirectory,
      GatedRoute::PatientRegistration,
      GatedRoute::PatientProfile,
    ] {
      for role in Role::ALL {
        let s = session(role);
        assert_eq!(route.authorize(Some(&s)), Decision::Allow);
      }
      assert_eq!(route.authorize(None), Decision::RedirectToLogin);
    }
  }
}
