//! Fixtures for unit tests: a migrated in-memory database, a verifier with a
//! canned answer and a chat transport that records instead of sending.

use std::{
  collections::HashSet,
  sync::{
    Arc, Mutex,
    atomic::{AtomicI32, Ordering},
  },
};

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use teloxide::types::InlineKeyboardMarkup;

use crate::{
  chat::{Chat, MessageRef},
  entity::{key, token},
  flow::Actor,
  prelude::*,
  state::{AppState, Config},
  verify::{Receipt, Verdict, Verifier},
};

pub async fn db() -> DatabaseConnection {
  let mut options = ConnectOptions::new("sqlite::memory:");
  // every connection would get its own empty memory database
  options.max_connections(1).min_connections(1).sqlx_logging(false);

  let db = Database::connect(options).await.unwrap();
  Migrator::up(&db, None).await.unwrap();
  db
}

pub async fn token(db: &DatabaseConnection, token_id: &str) -> token::Model {
  token::Entity::find_by_id(token_id).one(db).await.unwrap().unwrap()
}

/// Keys of `owner`, oldest first
pub async fn keys_of(db: &DatabaseConnection, owner: i64) -> Vec<key::Model> {
  key::Entity::find()
    .filter(key::Column::OwnerId.eq(owner))
    .order_by_asc(key::Column::CreatedAt)
    .all(db)
    .await
    .unwrap()
}

pub struct FixedVerifier {
  verdict: Verdict,
  calls: Mutex<Vec<(Option<String>, String, f64)>>,
}

impl FixedVerifier {
  pub fn new(verdict: Verdict) -> Self {
    Self { verdict, calls: Mutex::new(Vec::new()) }
  }

  pub fn success(amount: f64) -> Self {
    Self::new(Verdict::Success(Receipt {
      amount,
      payer: Some("Test Payer".into()),
      app: Some("PhonePe".into()),
    }))
  }

  pub fn failed() -> Self {
    Self::new(Verdict::Failed(
      "Verification failed. Status: FAILED, Amount: 0".into(),
    ))
  }

  pub fn calls(&self) -> Vec<(Option<String>, String, f64)> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl Verifier for FixedVerifier {
  async fn verify(
    &self,
    credential: Option<&str>,
    reference: &str,
    expected: f64,
  ) -> Verdict {
    self.calls.lock().unwrap().push((
      credential.map(str::to_string),
      reference.to_string(),
      expected,
    ));
    self.verdict.clone()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
  Text {
    to: i64,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
  },
  Photo {
    to: i64,
    photo: String,
    caption: String,
    keyboard: Option<InlineKeyboardMarkup>,
  },
  EditText { at: MessageRef, text: String },
  EditCaption { at: MessageRef, caption: String },
}

impl Sent {
  pub fn to(&self) -> i64 {
    match self {
      Sent::Text { to, .. } | Sent::Photo { to, .. } => *to,
      Sent::EditText { at, .. } | Sent::EditCaption { at, .. } => at.chat_id,
    }
  }

  pub fn body(&self) -> &str {
    match self {
      Sent::Text { text, .. } | Sent::EditText { text, .. } => text,
      Sent::Photo { caption, .. } | Sent::EditCaption { caption, .. } => {
        caption
      }
    }
  }

  pub fn keyboard(&self) -> Option<&InlineKeyboardMarkup> {
    match self {
      Sent::Text { keyboard, .. } | Sent::Photo { keyboard, .. } => {
        keyboard.as_ref()
      }
      _ => None,
    }
  }
}

#[derive(Default)]
pub struct RecordingChat {
  sent: Mutex<Vec<Sent>>,
  unreachable: HashSet<i64>,
  members: HashSet<i64>,
  membership_broken: bool,
  next_id: AtomicI32,
}

impl RecordingChat {
  pub fn new() -> Self {
    Self::default()
  }

  /// Deliveries to these chats fail
  pub fn unreachable(mut self, ids: &[i64]) -> Self {
    self.unreachable.extend(ids);
    self
  }

  /// Users reported as members of any channel
  pub fn members(mut self, ids: &[i64]) -> Self {
    self.members.extend(ids);
    self
  }

  /// Membership lookups fail with an API error
  pub fn membership_broken(mut self) -> Self {
    self.membership_broken = true;
    self
  }

  pub fn sent(&self) -> Vec<Sent> {
    self.sent.lock().unwrap().clone()
  }

  pub fn sent_to(&self, to: i64) -> Vec<Sent> {
    self.sent().into_iter().filter(|sent| sent.to() == to).collect()
  }

  pub fn last_to(&self, to: i64) -> Option<Sent> {
    self.sent_to(to).pop()
  }

  pub fn reset(&self) {
    self.sent.lock().unwrap().clear();
  }

  fn record(&self, to: i64, sent: Sent) -> Result<MessageRef> {
    if self.unreachable.contains(&to) {
      return Err(Error::Internal(format!("chat {to} unreachable")));
    }
    self.sent.lock().unwrap().push(sent);
    let message_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
    Ok(MessageRef { chat_id: to, message_id })
  }
}

#[async_trait]
impl Chat for RecordingChat {
  async fn send_text(
    &self,
    to: i64,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<MessageRef> {
    self.record(to, Sent::Text { to, text, keyboard })
  }

  async fn send_photo(
    &self,
    to: i64,
    photo: String,
    caption: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<MessageRef> {
    self.record(to, Sent::Photo { to, photo, caption, keyboard })
  }

  async fn edit_text(
    &self,
    at: MessageRef,
    text: String,
    _keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<()> {
    self.record(at.chat_id, Sent::EditText { at, text }).map(drop)
  }

  async fn edit_caption(&self, at: MessageRef, caption: String) -> Result<()> {
    self.record(at.chat_id, Sent::EditCaption { at, caption }).map(drop)
  }

  async fn is_member(&self, _channel: &str, user: i64) -> Result<bool> {
    if self.membership_broken {
      return Err(Error::Internal("chat not found".into()));
    }
    Ok(self.members.contains(&user))
  }
}

/// Application wired to test doubles over a fresh database
pub async fn app(chat: RecordingChat, verifier: FixedVerifier) -> Harness {
  let chat = Arc::new(chat);
  let verifier = Arc::new(verifier);
  let app = AppState::new(
    db().await,
    chat.clone(),
    verifier.clone(),
    Config::default(),
  );
  Harness { app, chat, verifier }
}

pub struct Harness {
  pub app: AppState,
  pub chat: Arc<RecordingChat>,
  pub verifier: Arc<FixedVerifier>,
}

pub fn buyer(id: i64) -> Actor {
  Actor {
    id,
    username: Some(format!("buyer{id}")),
    first_name: "Buyer".into(),
    last_name: None,
  }
}
