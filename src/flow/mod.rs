//! Conversation logic behind the Telegram transport.
//!
//! Every update enters through [`on_command`], [`on_message`] or
//! [`on_callback`]. Output goes through [`Reply`], which only knows the
//! [`Chat`] trait, so the whole conversation runs against a recording chat in
//! tests.

pub mod admin;
pub mod callback;
pub mod gate;
pub mod keyboard;
pub mod purchase;
pub mod review;

pub use callback::Callback;
use teloxide::types::InlineKeyboardMarkup;

use crate::{
  chat::{self, Chat, MessageRef},
  prelude::*,
  session::Session,
  state::AppState,
  sv,
};

/// Telegram user behind an update
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
  pub id: i64,
  pub username: Option<String>,
  pub first_name: String,
  pub last_name: Option<String>,
}

impl Actor {
  pub fn handle(&self) -> String {
    utils::display_handle(self.username.as_deref(), self.id)
  }
}

/// Non-command message content
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
  Text(String),
  /// Telegram file id of the largest photo size
  Photo(String),
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Start,
  Admin,
  Cancel,
  Help,
}

/// Answers in the chat an update came from. `origin` is the message whose
/// button was pressed, if any.
pub struct Reply<'a> {
  chat: &'a dyn Chat,
  pub chat_id: i64,
  pub origin: Option<MessageRef>,
}

impl<'a> Reply<'a> {
  pub fn new(
    chat: &'a dyn Chat,
    chat_id: i64,
    origin: Option<MessageRef>,
  ) -> Self {
    Self { chat, chat_id, origin }
  }

  pub async fn html(&self, text: impl Into<String>) -> Result<MessageRef> {
    self.chat.send_text(self.chat_id, text.into(), None).await
  }

  pub async fn with_keyboard(
    &self,
    text: impl Into<String>,
    keyboard: InlineKeyboardMarkup,
  ) -> Result<MessageRef> {
    self.chat.send_text(self.chat_id, text.into(), Some(keyboard)).await
  }

  /// Replaces the pressed message, or sends a new one for plain messages
  pub async fn edit_with_keyboard(
    &self,
    text: impl Into<String>,
    keyboard: InlineKeyboardMarkup,
  ) -> Result<()> {
    match self.origin {
      Some(at) => self.chat.edit_text(at, text.into(), Some(keyboard)).await,
      None => self.with_keyboard(text, keyboard).await.map(drop),
    }
  }
}

const WELCOME: &str = "🎯 <b>Welcome to Key Generator Bot!</b>\n\n\
  What would you like to do?\n\n\
  • <b>Generate Key</b> - Generate key using token\n\
  • <b>Buy Package</b> - Purchase new package";

const HELP: &str = "<b>📋 Commands</b>\n\n\
  /start - Open the main menu\n\
  /cancel - Abort the current step\n\
  /help - Show this message\n\n\
  Buy a package, pay with any UPI app and send the transaction ID (UTR) \
  or a screenshot of the payment. Got a token from an admin? \
  Press <b>Generate Key</b> and send it.";

const ADMIN_HELP: &str = "\n\n<b>Admin:</b>\n/admin - Open the admin panel";

/// Upserts the user and tells the admins about first contact
async fn touch(app: &AppState, actor: &Actor) -> Result<()> {
  let sv = app.sv();

  let (_, created) = sv
    .user
    .touch(
      actor.id,
      actor.username.clone(),
      actor.first_name.clone(),
      actor.last_name.clone(),
    )
    .await?;

  if created {
    let text = format!(
      "🆕 <b>New User Started Bot</b>\n\n\
      👤 Name: {}\n\
      🆔 User ID: <code>{}</code>\n\
      📱 Username: {}\n\
      🕐 Time: {}",
      utils::escape(&actor.first_name),
      actor.id,
      actor.handle(),
      utils::format_date(Utc::now().naive_utc()),
    );
    let admins = sv.admin.active_ids().await?;
    chat::broadcast_text(app.chat.as_ref(), &admins, &text, None).await;
  }

  Ok(())
}

pub async fn on_command(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  command: Command,
) -> Result<()> {
  touch(app, actor).await?;

  match command {
    Command::Start => start(app, actor, reply).await,
    Command::Admin => admin::open_panel(app, actor, reply).await,
    Command::Cancel => cancel(app, actor, reply).await,
    Command::Help => {
      let mut text = HELP.to_string();
      if app.sv().admin.role_of(actor.id).await?.is_some() {
        text.push_str(ADMIN_HELP);
      }
      reply.html(text).await?;
      Ok(())
    }
  }
}

pub async fn on_message(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  input: Input,
) -> Result<()> {
  touch(app, actor).await?;

  match app.sessions.get(actor.id) {
    Some(Session::AwaitingProof { package_id }) => {
      purchase::submit_proof(app, actor, reply, package_id, input).await?;
    }
    Some(Session::AwaitingToken) => match input {
      Input::Text(token) => {
        purchase::redeem_token(app, actor, reply, &token).await?;
      }
      _ => {
        reply
          .with_keyboard(
            "🔑 Please send your Token ID as text.",
            keyboard::cancel(),
          )
          .await?;
      }
    },
    Some(Session::SelectingPackage) => {
      reply
        .with_keyboard(
          "📦 Please select a package using the buttons above.",
          keyboard::cancel(),
        )
        .await?;
    }
    Some(Session::Admin(flow)) => {
      admin::step(app, actor, reply, flow, input).await?;
    }
    None => {
      reply.html("Use /start to open the menu.").await?;
    }
  }

  Ok(())
}

pub async fn on_callback(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  callback: Callback,
) -> Result<()> {
  touch(app, actor).await?;

  match callback {
    Callback::Buy => purchase::list_packages(app, actor, reply).await,
    Callback::SelectPackage(id) => {
      purchase::select_package(app, actor, reply, id).await.map(drop)
    }
    Callback::Redeem => {
      app.sessions.set(actor.id, Session::AwaitingToken);
      reply
        .with_keyboard(
          "🔑 <b>Generate Key</b>\n\nPlease enter your Token ID:",
          keyboard::cancel(),
        )
        .await?;
      Ok(())
    }
    Callback::Back => {
      app.sessions.clear(actor.id);
      reply.edit_with_keyboard(WELCOME, keyboard::main_menu()).await
    }
    Callback::VerifyJoin => match gate::check(app, actor.id).await? {
      gate::Access::Granted => {
        reply.html("✅ Verification successful!").await?;
        reply.with_keyboard(WELCOME, keyboard::main_menu()).await?;
        Ok(())
      }
      gate::Access::Denied { channel } => {
        reply
          .with_keyboard(
            format!(
              "❌ You haven't joined {} yet!",
              utils::escape(&channel)
            ),
            keyboard::join(&channel),
          )
          .await?;
        Ok(())
      }
    },
    Callback::Cancel => cancel(app, actor, reply).await,
    Callback::Approve(id) => {
      review::decide(app, actor, reply, id, sv::Decision::Approve)
        .await
        .map(drop)
    }
    Callback::Reject(id) => {
      review::decide(app, actor, reply, id, sv::Decision::Reject)
        .await
        .map(drop)
    }
    Callback::Pending => review::list_pending(app, actor, reply).await,
    other => admin::on_callback(app, actor, reply, other).await,
  }
}

/// Entry point of `/start`: force-join gate, then the main menu
pub async fn start(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
) -> Result<()> {
  app.sessions.clear(actor.id);

  if let gate::Access::Denied { channel } = gate::check(app, actor.id).await? {
    let text = format!(
      "🚫 <b>Access Denied!</b>\n\n\
      Please join our channel first: {}\n\n\
      After joining, click 'Verify' button.",
      utils::escape(&channel)
    );
    reply.with_keyboard(text, keyboard::join(&channel)).await?;
    return Ok(());
  }

  reply.with_keyboard(WELCOME, keyboard::main_menu()).await?;
  Ok(())
}

/// Leaves any conversation without side effects
pub async fn cancel(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
) -> Result<()> {
  let text = match app.sessions.take(actor.id) {
    Some(_) => "❌ Cancelled!",
    None => "Nothing to cancel.",
  };
  reply.with_keyboard(text, keyboard::main_menu()).await?;
  Ok(())
}

/// Turns a failed update into a chat message. Authorization failures also
/// drop whatever the user was in the middle of.
pub async fn report(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  err: Error,
) {
  match &err {
    Error::Database(_) | Error::Telegram(_) | Error::Internal(_) => {
      error!("Update from {} failed: {err}", actor.id);
    }
    Error::Unauthorized => {
      app.sessions.clear(actor.id);
    }
    _ => debug!("Update from {} rejected: {err}", actor.id),
  }

  if let Err(err) = reply.html(err.user_message()).await {
    warn!("Failed to report error to {}: {err}", actor.id);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{self, FixedVerifier, RecordingChat, Sent, buyer};

  #[tokio::test]
  async fn test_new_user_notifies_admins_once() {
    let h = testing::app(RecordingChat::new(), FixedVerifier::failed()).await;
    h.app.sv().admin.bootstrap(&[900]).await.unwrap();

    let reply = Reply::new(h.chat.as_ref(), 10, None);
    on_command(&h.app, &buyer(10), &reply, Command::Start).await.unwrap();
    on_command(&h.app, &buyer(10), &reply, Command::Start).await.unwrap();

    let notices = h.chat.sent_to(900);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].body().contains("New User Started Bot"));
    assert!(notices[0].body().contains("@buyer10"));
  }

  #[tokio::test]
  async fn test_unreachable_admin_does_not_block_others() {
    let chat = RecordingChat::new().unreachable(&[901]);
    let h = testing::app(chat, FixedVerifier::failed()).await;
    h.app.sv().admin.bootstrap(&[900, 901, 902]).await.unwrap();

    let reply = Reply::new(h.chat.as_ref(), 10, None);
    on_command(&h.app, &buyer(10), &reply, Command::Start).await.unwrap();

    assert_eq!(h.chat.sent_to(900).len(), 1);
    assert_eq!(h.chat.sent_to(902).len(), 1);
    assert!(h.chat.last_to(10).unwrap().body().contains("Welcome"));
  }

  #[tokio::test]
  async fn test_cancel_from_any_state() {
    let h = testing::app(RecordingChat::new(), FixedVerifier::failed()).await;
    let reply = Reply::new(h.chat.as_ref(), 10, None);

    h.app.sessions.set(10, Session::AwaitingToken);
    on_command(&h.app, &buyer(10), &reply, Command::Cancel).await.unwrap();
    assert_eq!(h.app.sessions.get(10), None);
    assert!(h.chat.last_to(10).unwrap().body().contains("Cancelled"));

    on_callback(&h.app, &buyer(10), &reply, Callback::Cancel).await.unwrap();
    assert!(h.chat.last_to(10).unwrap().body().contains("Nothing to cancel"));
  }

  #[tokio::test]
  async fn test_idle_message_points_to_menu() {
    let h = testing::app(RecordingChat::new(), FixedVerifier::failed()).await;
    let reply = Reply::new(h.chat.as_ref(), 10, None);

    on_message(&h.app, &buyer(10), &reply, Input::Text("hi".into()))
      .await
      .unwrap();
    assert!(matches!(
      h.chat.last_to(10),
      Some(Sent::Text { text, .. }) if text.contains("/start")
    ));
  }

  #[tokio::test]
  async fn test_unauthorized_report_clears_session() {
    let h = testing::app(RecordingChat::new(), FixedVerifier::failed()).await;
    let reply = Reply::new(h.chat.as_ref(), 10, None);

    h.app.sessions.set(10, Session::AwaitingToken);
    report(&h.app, &buyer(10), &reply, Error::Unauthorized).await;

    assert_eq!(h.app.sessions.get(10), None);
    assert_eq!(h.chat.last_to(10).unwrap().body(), "Unauthorized!");
  }
}
