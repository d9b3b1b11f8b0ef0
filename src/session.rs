//! Per-user conversation state. A user without an entry is idle.
//!
//! Sessions live in memory only and are lost on restart.

use crate::{entity::Role, prelude::*};

#[derive(Debug, Clone, PartialEq)]
pub enum Session {
  /// Buyer is looking at the package list
  SelectingPackage,
  /// Buyer picked a package and owes a transaction id or a screenshot
  AwaitingProof { package_id: i32 },
  /// Buyer is about to type a token id
  AwaitingToken,
  Admin(AdminFlow),
}

/// Linear admin mutations, one variant per flow
#[derive(Debug, Clone, PartialEq)]
pub enum AdminFlow {
  Token(TokenStep),
  Package(PackageStep),
  Upi(UpiStep),
  Admin(AdminStep),
  Channel,
  ApiToken,
}

impl AdminFlow {
  pub fn required_role(&self) -> Role {
    match self {
      AdminFlow::Token(_) => Role::Limited,
      _ => Role::Super,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenStep {
  Username,
  Package { username: String },
  Transaction { username: String, package_id: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PackageStep {
  Name,
  Description { name: String },
  Amount { name: String, description: String },
  Validity { name: String, description: String, amount: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpiStep {
  Id,
  Name { upi_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminStep {
  Id,
  Role { tg_user_id: i64 },
}

#[derive(Debug, Clone)]
struct Entry {
  session: Session,
  touched: DateTime,
}

#[derive(Debug, Default)]
pub struct Sessions {
  inner: DashMap<i64, Entry>,
}

impl Sessions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, user: i64) -> Option<Session> {
    self.inner.get(&user).map(|entry| entry.session.clone())
  }

  pub fn set(&self, user: i64, session: Session) {
    let touched = Utc::now().naive_utc();
    self.inner.insert(user, Entry { session, touched });
  }

  pub fn take(&self, user: i64) -> Option<Session> {
    self.inner.remove(&user).map(|(_, entry)| entry.session)
  }

  /// Returns whether there was anything to discard
  pub fn clear(&self, user: i64) -> bool {
    self.inner.remove(&user).is_some()
  }

  /// Drops sessions idle for longer than `ttl`
  pub fn gc(&self, ttl: Duration) -> usize {
    let now = Utc::now().naive_utc();
    let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    let before = self.inner.len();

    self.inner.retain(|_, entry| now - entry.touched < ttl);
    before - self.inner.len()
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_take_discards_state() {
    let sessions = Sessions::new();
    sessions.set(1, Session::AwaitingProof { package_id: 7 });

    assert_eq!(sessions.get(1), Some(Session::AwaitingProof { package_id: 7 }));
    assert_eq!(sessions.take(1), Some(Session::AwaitingProof { package_id: 7 }));
    assert_eq!(sessions.get(1), None);
    assert!(!sessions.clear(1));
  }

  #[test]
  fn test_sessions_are_isolated_per_user() {
    let sessions = Sessions::new();
    sessions.set(1, Session::AwaitingToken);
    sessions.set(2, Session::Admin(AdminFlow::Channel));

    assert!(sessions.clear(1));
    assert_eq!(sessions.get(2), Some(Session::Admin(AdminFlow::Channel)));
  }

  #[test]
  fn test_gc_drops_idle_sessions() {
    let sessions = Sessions::new();
    sessions.set(1, Session::SelectingPackage);

    assert_eq!(sessions.gc(Duration::from_secs(3600)), 0);
    assert_eq!(sessions.len(), 1);

    assert_eq!(sessions.gc(Duration::ZERO), 1);
    assert_eq!(sessions.len(), 0);
  }

  #[test]
  fn test_required_roles() {
    let manual = AdminFlow::Token(TokenStep::Username);
    assert_eq!(manual.required_role(), Role::Limited);
    assert_eq!(AdminFlow::Package(PackageStep::Name).required_role(), Role::Super);
    assert_eq!(AdminFlow::ApiToken.required_role(), Role::Super);
  }
}
