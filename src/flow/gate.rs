//! Optional requirement to be subscribed to a channel before using the bot.

use crate::{prelude::*, state::AppState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
  Granted,
  Denied { channel: String },
}

/// A failing membership lookup (bot not in the channel, wrong id) lets the
/// user through; the misconfiguration is only logged.
pub async fn check(app: &AppState, user: i64) -> Result<Access> {
  let settings = app.sv().settings.get().await?;

  let Some(channel) =
    settings.force_channel.filter(|channel| !channel.trim().is_empty())
  else {
    return Ok(Access::Granted);
  };

  match app.chat.is_member(&channel, user).await {
    Ok(true) => Ok(Access::Granted),
    Ok(false) => Ok(Access::Denied { channel }),
    Err(err) => {
      error!("Membership check in `{channel}` failed for {user}: {err}");
      Ok(Access::Granted)
    }
  }
}
