mod command;

use std::sync::Arc;

use command::Command;
use teloxide::{
  dispatching::{Dispatcher, HandlerExt, UpdateFilterExt},
  prelude::*,
  types::{CallbackQuery, Message, Update, User},
  utils::command::BotCommands,
};

use crate::{
  chat::MessageRef,
  flow::{self, Actor, Callback, Input, Reply},
  prelude::*,
  state::AppState,
};

pub struct Plugin {
  bot: Bot,
}

impl Plugin {
  pub fn new(bot: Bot) -> Self {
    Self { bot }
  }
}

#[async_trait]
impl super::Plugin for Plugin {
  fn name(&self) -> &'static str {
    "telegram"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    run_bot(self.bot.clone(), app).await;
    Ok(())
  }
}

pub async fn run_bot(bot: Bot, app: Arc<AppState>) {
  info!("Starting Telegram bot...");

  if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
    warn!("Failed to register bot commands: {err}");
  }

  let handler = teloxide::dptree::entry()
    .branch(Update::filter_message().filter_command::<Command>().endpoint({
      let app = app.clone();
      move |msg: Message, cmd: Command| {
        let app = app.clone();
        command::handle(app, msg, cmd)
      }
    }))
    .branch(Update::filter_message().endpoint({
      let app = app.clone();
      move |msg: Message| {
        let app = app.clone();
        message_handle(app, msg)
      }
    }))
    .branch(Update::filter_callback_query().endpoint({
      let app = app.clone();
      move |bot: Bot, query: CallbackQuery| {
        let app = app.clone();
        callback_handle(app, bot, query)
      }
    }));

  Dispatcher::builder(bot, handler).build().dispatch().await;
}

fn actor(user: &User) -> Actor {
  Actor {
    id: user.id.0 as i64,
    username: user.username.clone(),
    first_name: user.first_name.clone(),
    last_name: user.last_name.clone(),
  }
}

/// Sender of a private-chat message. Group traffic has none.
fn private_sender(msg: &Message) -> Option<&User> {
  if msg.chat.is_private() { msg.from.as_ref() } else { None }
}

fn reply_to<'a>(app: &'a AppState, msg: &Message) -> Reply<'a> {
  Reply::new(app.chat.as_ref(), msg.chat.id.0, None)
}

fn input(msg: &Message) -> Input {
  if let Some(text) = msg.text() {
    Input::Text(text.to_string())
  } else if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
    Input::Photo(largest.file.id.0.clone())
  } else {
    Input::Other
  }
}

async fn message_handle(app: Arc<AppState>, msg: Message) -> ResponseResult<()> {
  let Some(user) = private_sender(&msg) else {
    return Ok(());
  };

  let actor = actor(user);
  let reply = reply_to(&app, &msg);

  if let Err(err) = flow::on_message(&app, &actor, &reply, input(&msg)).await {
    flow::report(&app, &actor, &reply, err).await;
  }

  Ok(())
}

async fn callback_handle(
  app: Arc<AppState>,
  bot: Bot,
  query: CallbackQuery,
) -> ResponseResult<()> {
  // answer callback to remove loading state
  bot.answer_callback_query(query.id.clone()).await?;

  let (Some(data), Some(msg)) = (query.data.as_deref(), query.message.as_ref())
  else {
    return Ok(());
  };
  let Some(callback) = Callback::from_data(data) else {
    debug!("Ignoring unknown callback `{data}`");
    return Ok(());
  };

  let actor = actor(&query.from);
  let origin = MessageRef { chat_id: msg.chat().id.0, message_id: msg.id().0 };
  let reply = Reply::new(app.chat.as_ref(), origin.chat_id, Some(origin));

  if let Err(err) = flow::on_callback(&app, &actor, &reply, callback).await {
    flow::report(&app, &actor, &reply, err).await;
  }

  Ok(())
}
