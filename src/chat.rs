//! Outbound side of the chat transport and admin notification fan-out.

use futures::future;
use teloxide::{
  prelude::*,
  types::{
    ChatId, FileId, InlineKeyboardMarkup, InputFile, MessageId, ParseMode,
    Recipient, UserId,
  },
};

use crate::prelude::*;

/// Address of a message that can be edited later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
  pub chat_id: i64,
  pub message_id: i32,
}

#[async_trait]
pub trait Chat: Send + Sync {
  async fn send_text(
    &self,
    to: i64,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<MessageRef>;

  /// `photo` is a Telegram file id
  async fn send_photo(
    &self,
    to: i64,
    photo: String,
    caption: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<MessageRef>;

  async fn edit_text(
    &self,
    at: MessageRef,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<()>;

  async fn edit_caption(&self, at: MessageRef, caption: String) -> Result<()>;

  async fn is_member(&self, channel: &str, user: i64) -> Result<bool>;
}

fn message_ref(msg: &Message) -> MessageRef {
  MessageRef { chat_id: msg.chat.id.0, message_id: msg.id.0 }
}

#[async_trait]
impl Chat for Bot {
  async fn send_text(
    &self,
    to: i64,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<MessageRef> {
    let mut request =
      self.send_message(ChatId(to), text).parse_mode(ParseMode::Html);
    if let Some(keyboard) = keyboard {
      request = request.reply_markup(keyboard);
    }
    Ok(message_ref(&request.await?))
  }

  async fn send_photo(
    &self,
    to: i64,
    photo: String,
    caption: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<MessageRef> {
    let photo = InputFile::file_id(FileId(photo));
    let mut request = Requester::send_photo(self, ChatId(to), photo)
      .caption(caption)
      .parse_mode(ParseMode::Html);
    if let Some(keyboard) = keyboard {
      request = request.reply_markup(keyboard);
    }
    Ok(message_ref(&request.await?))
  }

  async fn edit_text(
    &self,
    at: MessageRef,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
  ) -> Result<()> {
    let mut request = self
      .edit_message_text(ChatId(at.chat_id), MessageId(at.message_id), text)
      .parse_mode(ParseMode::Html);
    if let Some(keyboard) = keyboard {
      request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
  }

  async fn edit_caption(&self, at: MessageRef, caption: String) -> Result<()> {
    self
      .edit_message_caption(ChatId(at.chat_id), MessageId(at.message_id))
      .caption(caption)
      .parse_mode(ParseMode::Html)
      .await?;
    Ok(())
  }

  async fn is_member(&self, channel: &str, user: i64) -> Result<bool> {
    let recipient: Recipient = match channel.parse::<i64>() {
      Ok(id) => ChatId(id).into(),
      Err(_) => Recipient::ChannelUsername(channel.to_string()),
    };

    let member = self.get_chat_member(recipient, UserId(user as u64)).await?;
    Ok(member.is_present())
  }
}

/// Sends `text` to every recipient independently. A failed delivery is logged
/// and skipped; the successful ones are returned.
pub async fn broadcast_text(
  chat: &dyn Chat,
  recipients: &[i64],
  text: &str,
  keyboard: Option<InlineKeyboardMarkup>,
) -> Vec<MessageRef> {
  let sends = recipients.iter().map(|&to| {
    let keyboard = keyboard.clone();
    async move {
      chat
        .send_text(to, text.to_string(), keyboard)
        .await
        .inspect_err(|err| warn!("Failed to notify admin {to}: {err}"))
        .ok()
    }
  });

  future::join_all(sends).await.into_iter().flatten().collect()
}

/// Photo variant of [`broadcast_text`]
pub async fn broadcast_photo(
  chat: &dyn Chat,
  recipients: &[i64],
  photo: &str,
  caption: &str,
  keyboard: Option<InlineKeyboardMarkup>,
) -> Vec<MessageRef> {
  let sends = recipients.iter().map(|&to| {
    let keyboard = keyboard.clone();
    async move {
      chat
        .send_photo(to, photo.to_string(), caption.to_string(), keyboard)
        .await
        .inspect_err(|err| warn!("Failed to notify admin {to}: {err}"))
        .ok()
    }
  });

  future::join_all(sends).await.into_iter().flatten().collect()
}
