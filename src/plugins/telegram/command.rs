use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use super::{actor, private_sender, reply_to};
use crate::{flow, state::AppState};

#[derive(BotCommands, Clone, Copy, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
  #[command(description = "open the main menu")]
  Start,
  #[command(description = "open the admin panel")]
  Admin,
  #[command(description = "abort the current step")]
  Cancel,
  #[command(description = "show help")]
  Help,
}

impl From<Command> for flow::Command {
  fn from(command: Command) -> Self {
    match command {
      Command::Start => flow::Command::Start,
      Command::Admin => flow::Command::Admin,
      Command::Cancel => flow::Command::Cancel,
      Command::Help => flow::Command::Help,
    }
  }
}

pub async fn handle(
  app: Arc<AppState>,
  msg: Message,
  cmd: Command,
) -> ResponseResult<()> {
  let Some(user) = private_sender(&msg) else {
    return Ok(());
  };

  let actor = actor(user);
  let reply = reply_to(&app, &msg);

  if let Err(err) = flow::on_command(&app, &actor, &reply, cmd.into()).await {
    flow::report(&app, &actor, &reply, err).await;
  }

  Ok(())
}
