//! Admin panel and its linear multi-step flows.
//!
//! The role is looked up again on every button and every step, so demoting
//! an admin takes effect in the middle of a flow.

use super::{Actor, Callback, Input, Reply, keyboard};
use crate::{
  entity::{Role, TokenSource, token::UNCLAIMED},
  prelude::*,
  session::{AdminFlow, AdminStep, PackageStep, Session, TokenStep, UpiStep},
  state::AppState,
  verify::Verdict,
};

const PANEL: &str = "🛠 <b>Admin Panel</b>\n\nChoose an action:";

pub async fn open_panel(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
) -> Result<()> {
  let role = app.sv().admin.require(actor.id, Role::Limited).await?;
  app.sessions.clear(actor.id);

  let text = format!("{PANEL}\n\n👤 Role: {}", role.title());
  reply.with_keyboard(text, keyboard::admin_menu(role)).await?;
  Ok(())
}

/// Enters a flow and asks its first question
async fn begin(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  flow: AdminFlow,
  prompt: &str,
) -> Result<()> {
  app.sv().admin.require(actor.id, flow.required_role()).await?;
  app.sessions.set(actor.id, Session::Admin(flow));
  reply.with_keyboard(prompt, keyboard::admin_cancel()).await?;
  Ok(())
}

pub async fn on_callback(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  callback: Callback,
) -> Result<()> {
  let sv = app.sv();

  match callback {
    Callback::AdminMenu => {
      let role = sv.admin.require(actor.id, Role::Limited).await?;
      app.sessions.clear(actor.id);
      reply.edit_with_keyboard(PANEL, keyboard::admin_menu(role)).await?;
    }
    Callback::AdminCancel => {
      let role = sv.admin.require(actor.id, Role::Limited).await?;
      app.sessions.clear(actor.id);
      reply.with_keyboard("❌ Cancelled!", keyboard::admin_menu(role)).await?;
    }

    Callback::GenToken => {
      let prompt = "🎫 <b>Generate Token</b>\n\n\
        Send the buyer's Telegram username:";
      let flow = AdminFlow::Token(TokenStep::Username);
      begin(app, actor, reply, flow, prompt).await?;
    }
    Callback::TokenPackage(package_id) => {
      token_package(app, actor, reply, package_id).await?;
    }
    Callback::Stats => {
      sv.admin.require(actor.id, Role::Limited).await?;
      let stats = sv.stats.overview().await?;
      let text = format!(
        "📊 <b>Statistics</b>\n\n\
        👥 Users: {}\n\
        🎫 Tokens: {} ({} active)\n\
        🔐 Keys: {}\n\
        📸 Pending reviews: {}",
        stats.users,
        stats.tokens,
        stats.active_tokens,
        stats.keys,
        stats.pending_reviews
      );
      reply.edit_with_keyboard(text, keyboard::admin_back()).await?;
    }

    Callback::Packages => {
      sv.admin.require(actor.id, Role::Super).await?;
      reply
        .edit_with_keyboard("📦 <b>Packages</b>", keyboard::packages_menu())
        .await?;
    }
    Callback::ViewPackages => {
      sv.admin.require(actor.id, Role::Super).await?;
      show_packages(app, reply).await?;
    }
    Callback::AddPackage => {
      let prompt = "➕ <b>Add Package</b>\n\nSend the plan name:";
      let flow = AdminFlow::Package(PackageStep::Name);
      begin(app, actor, reply, flow, prompt).await?;
    }
    Callback::TogglePackage(id) => {
      sv.admin.require(actor.id, Role::Super).await?;
      let package =
        sv.package.by_id(id).await?.ok_or(Error::PackageNotFound)?;
      sv.package.set_active(id, !package.is_active).await?;
      show_packages(app, reply).await?;
    }

    Callback::Upi => {
      sv.admin.require(actor.id, Role::Super).await?;
      reply
        .edit_with_keyboard("💳 <b>UPI Routes</b>", keyboard::upi_menu())
        .await?;
    }
    Callback::ViewUpi => {
      sv.admin.require(actor.id, Role::Super).await?;
      show_upi(app, reply).await?;
    }
    Callback::AddUpi => {
      let prompt = "➕ <b>Add UPI</b>\n\nSend the UPI ID (e.g. shop@okaxis):";
      let flow = AdminFlow::Upi(UpiStep::Id);
      begin(app, actor, reply, flow, prompt).await?;
    }
    Callback::ActivateUpi(id) => {
      sv.admin.require(actor.id, Role::Super).await?;
      sv.upi.activate(id).await?;
      show_upi(app, reply).await?;
    }

    Callback::Admins => {
      sv.admin.require(actor.id, Role::Super).await?;
      reply
        .edit_with_keyboard("👥 <b>Admins</b>", keyboard::admins_menu())
        .await?;
    }
    Callback::ViewAdmins => {
      sv.admin.require(actor.id, Role::Super).await?;
      show_admins(app, actor, reply).await?;
    }
    Callback::AddAdmin => {
      let prompt = "➕ <b>Add Admin</b>\n\nSend the Telegram user ID:";
      let flow = AdminFlow::Admin(AdminStep::Id);
      begin(app, actor, reply, flow, prompt).await?;
    }
    Callback::AdminRole(role) => {
      admin_role(app, actor, reply, role).await?;
    }
    Callback::DeactivateAdmin(id) => {
      sv.admin.require(actor.id, Role::Super).await?;
      if id == actor.id {
        return Err(Error::InvalidArgs(
          "❌ You cannot remove yourself.".into(),
        ));
      }
      sv.admin.deactivate(id).await?;
      show_admins(app, actor, reply).await?;
    }

    Callback::Settings => {
      sv.admin.require(actor.id, Role::Super).await?;
      reply
        .edit_with_keyboard("⚙️ <b>Settings</b>", keyboard::settings_menu())
        .await?;
    }
    Callback::ViewSettings => {
      sv.admin.require(actor.id, Role::Super).await?;
      let settings = sv.settings.get().await?;
      let channel = settings
        .force_channel
        .as_deref()
        .map(utils::escape)
        .unwrap_or_else(|| "Not set".into());
      let api = match settings.api_token.as_deref() {
        Some(token) if !token.is_empty() => "✅ Configured",
        _ => "❌ Not set",
      };
      let text = format!(
        "⚙️ <b>Settings</b>\n\n📢 Force channel: {channel}\n🔑 API token: {api}"
      );
      reply.edit_with_keyboard(text, keyboard::settings_menu()).await?;
    }
    Callback::EditChannel => {
      let prompt = "📢 <b>Force Channel</b>\n\n\
        Send the channel username (@name) or ID (-100…).\n\
        Send <code>off</code> to disable the requirement.";
      begin(app, actor, reply, AdminFlow::Channel, prompt).await?;
    }
    Callback::EditApi => {
      let prompt = "🔑 <b>API Token</b>\n\nSend the verification API token:";
      begin(app, actor, reply, AdminFlow::ApiToken, prompt).await?;
    }

    // buyer and review callbacks are routed before reaching here
    _ => {}
  }

  Ok(())
}

async fn show_packages(app: &AppState, reply: &Reply<'_>) -> Result<()> {
  let packages = app.sv().package.all().await?;

  let mut text = String::from("📦 <b>Packages</b>\n");
  if packages.is_empty() {
    text.push_str("\nNo packages yet.");
  }
  for package in &packages {
    text.push_str(&format!(
      "\n{} <b>{}</b> - ₹{} / {} days",
      if package.is_active { "🟢" } else { "🔴" },
      utils::escape(&package.plan_name),
      utils::format_amount(package.amount),
      package.validity_days,
    ));
  }

  reply.edit_with_keyboard(text, keyboard::package_toggles(&packages)).await
}

async fn show_upi(app: &AppState, reply: &Reply<'_>) -> Result<()> {
  let routes = app.sv().upi.all().await?;

  let mut text = String::from("💳 <b>UPI Routes</b>\n");
  if routes.is_empty() {
    text.push_str("\nNo UPI configured.");
  }
  for route in &routes {
    text.push_str(&format!(
      "\n{} <code>{}</code> ({})",
      if route.is_active { "🟢" } else { "⚪" },
      utils::escape(&route.upi_id),
      utils::escape(&route.name),
    ));
  }

  reply.edit_with_keyboard(text, keyboard::upi_routes(&routes)).await
}

async fn show_admins(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
) -> Result<()> {
  let admins = app.sv().admin.all().await?;

  let mut text = String::from("👥 <b>Admins</b>\n");
  for admin in &admins {
    text.push_str(&format!(
      "\n{} <code>{}</code> - {}",
      if admin.is_active { "🟢" } else { "🔴" },
      admin.tg_user_id,
      admin.role.title(),
    ));
  }

  reply
    .edit_with_keyboard(text, keyboard::admin_roster(&admins, actor.id))
    .await
}

async fn token_package(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  package_id: i32,
) -> Result<()> {
  let sv = app.sv();
  sv.admin.require(actor.id, Role::Limited).await?;

  let Some(Session::Admin(AdminFlow::Token(TokenStep::Package { username }))) =
    app.sessions.get(actor.id)
  else {
    reply.html("⚠️ Session expired. Start again from /admin.").await?;
    return Ok(());
  };

  let package = sv.package.purchasable(package_id).await?;

  app.sessions.set(
    actor.id,
    Session::Admin(AdminFlow::Token(TokenStep::Transaction {
      username,
      package_id,
    })),
  );

  let text = format!(
    "📦 {} - ₹{}\n\nSend the transaction ID/UTR to verify:",
    utils::escape(&package.plan_name),
    utils::format_amount(package.amount)
  );
  reply.with_keyboard(text, keyboard::admin_cancel()).await?;
  Ok(())
}

async fn admin_role(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  role: Role,
) -> Result<()> {
  let sv = app.sv();
  sv.admin.require(actor.id, Role::Super).await?;

  let Some(Session::Admin(AdminFlow::Admin(AdminStep::Role { tg_user_id }))) =
    app.sessions.take(actor.id)
  else {
    reply.html("⚠️ Session expired. Start again from /admin.").await?;
    return Ok(());
  };

  sv.admin.upsert(tg_user_id, role).await?;

  let text = format!(
    "✅ <code>{tg_user_id}</code> is now {}.",
    role.title()
  );
  reply.with_keyboard(text, keyboard::admin_menu(Role::Super)).await?;
  Ok(())
}

/// Next text answer inside an admin flow
pub async fn step(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  flow: AdminFlow,
  input: Input,
) -> Result<()> {
  let role = app.sv().admin.require(actor.id, flow.required_role()).await?;

  let text = match input {
    Input::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
    _ => {
      reply
        .with_keyboard(
          "✏️ Please send a text answer.",
          keyboard::admin_cancel(),
        )
        .await?;
      return Ok(());
    }
  };

  match flow {
    AdminFlow::Token(step) => token_step(app, actor, reply, step, text).await,
    AdminFlow::Package(step) => {
      package_step(app, actor, reply, role, step, text).await
    }
    AdminFlow::Upi(step) => upi_step(app, actor, reply, role, step, text).await,
    AdminFlow::Admin(step) => admin_step(app, actor, reply, step, text).await,
    AdminFlow::Channel => {
      app.sessions.take(actor.id);
      let channel = match text.to_lowercase().as_str() {
        "off" | "none" | "-" => None,
        _ => Some(utils::normalize_channel(&text)),
      };
      app.sv().settings.set_force_channel(channel.clone()).await?;

      let text = match channel {
        Some(channel) => {
          format!("✅ Force channel set to {}", utils::escape(&channel))
        }
        None => "✅ Force channel disabled.".into(),
      };
      reply.with_keyboard(text, keyboard::admin_menu(role)).await?;
      Ok(())
    }
    AdminFlow::ApiToken => {
      app.sessions.take(actor.id);
      app.sv().settings.set_api_token(text).await?;
      reply
        .with_keyboard("✅ API token updated!", keyboard::admin_menu(role))
        .await?;
      Ok(())
    }
  }
}

fn advance(app: &AppState, actor: &Actor, flow: AdminFlow) {
  app.sessions.set(actor.id, Session::Admin(flow));
}

async fn token_step(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  step: TokenStep,
  text: String,
) -> Result<()> {
  let sv = app.sv();

  match step {
    TokenStep::Username => {
      let username = text.trim_start_matches('@').to_string();
      let packages = sv.package.active().await?;
      if packages.is_empty() {
        app.sessions.take(actor.id);
        reply.html("❌ No active packages. Add one first.").await?;
        return Ok(());
      }

      advance(app, actor, AdminFlow::Token(TokenStep::Package { username }));
      reply
        .with_keyboard(
          "📦 Select the package:",
          keyboard::token_packages(&packages),
        )
        .await?;
    }
    TokenStep::Package { .. } => {
      reply
        .with_keyboard(
          "📦 Please choose a package using the buttons.",
          keyboard::admin_cancel(),
        )
        .await?;
    }
    TokenStep::Transaction { username, package_id } => {
      app.sessions.take(actor.id);
      let package =
        sv.package.by_id(package_id).await?.ok_or(Error::PackageNotFound)?;

      if sv.ledger.payment_ref_taken(&text).await? {
        return Err(Error::DuplicatePayment);
      }

      reply.html("⏳ Verifying transaction...").await?;
      let settings = sv.settings.get().await?;
      let verdict = app
        .verifier
        .verify(settings.api_token.as_deref(), &text, package.amount)
        .await;

      if let Verdict::Failed(message) | Verdict::Error(message) = verdict {
        let text =
          format!("❌ Verification failed: {}", utils::escape(&message));
        reply.with_keyboard(text, keyboard::admin_back()).await?;
        return Ok(());
      }

      let token = sv
        .ledger
        .issue(
          UNCLAIMED,
          Some(username.clone()),
          &package,
          &text,
          TokenSource::Manual,
        )
        .await?;

      let text = format!(
        "✅ <b>Token Generated!</b>\n\n\
        🎫 Token: <code>{}</code>\n\
        👤 User: @{}\n\
        📦 Package: {}\n\
        💰 Amount: ₹{}\n\n\
        Send this token to the buyer. They redeem it with \
        <b>Generate Key</b>.",
        token.token_id,
        utils::escape(&username),
        utils::escape(&package.plan_name),
        utils::format_amount(package.amount),
      );
      reply.with_keyboard(text, keyboard::admin_back()).await?;
    }
  }

  Ok(())
}

async fn package_step(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  role: Role,
  step: PackageStep,
  text: String,
) -> Result<()> {
  match step {
    PackageStep::Name => {
      let next = PackageStep::Description { name: text };
      advance(app, actor, AdminFlow::Package(next));
      reply
        .with_keyboard("📝 Send the description:", keyboard::admin_cancel())
        .await?;
    }
    PackageStep::Description { name } => {
      advance(
        app,
        actor,
        AdminFlow::Package(PackageStep::Amount { name, description: text }),
      );
      reply
        .with_keyboard("💰 Send the amount in ₹:", keyboard::admin_cancel())
        .await?;
    }
    PackageStep::Amount { name, description } => {
      let Some(amount) = utils::parse_amount(&text) else {
        reply
          .with_keyboard(
            "❌ Invalid amount! Send a number, e.g. 99 or 149.50",
            keyboard::admin_cancel(),
          )
          .await?;
        return Ok(());
      };

      advance(
        app,
        actor,
        AdminFlow::Package(PackageStep::Validity { name, description, amount }),
      );
      reply
        .with_keyboard("⏱ Send the validity in days:", keyboard::admin_cancel())
        .await?;
    }
    PackageStep::Validity { name, description, amount } => {
      let Some(days) = utils::parse_days(&text) else {
        reply
          .with_keyboard(
            "❌ Invalid number of days! Send a whole number above 0.",
            keyboard::admin_cancel(),
          )
          .await?;
        return Ok(());
      };

      app.sessions.take(actor.id);
      let package =
        app.sv().package.create(name, description, amount, days).await?;

      let text = format!(
        "✅ Package created!\n\n📦 {} - ₹{} / {} days",
        utils::escape(&package.plan_name),
        utils::format_amount(package.amount),
        package.validity_days
      );
      reply.with_keyboard(text, keyboard::admin_menu(role)).await?;
    }
  }

  Ok(())
}

async fn upi_step(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  role: Role,
  step: UpiStep,
  text: String,
) -> Result<()> {
  match step {
    UpiStep::Id => {
      if !text.contains('@') || text.contains(char::is_whitespace) {
        reply
          .with_keyboard(
            "❌ Invalid UPI ID! Expected something like shop@okaxis",
            keyboard::admin_cancel(),
          )
          .await?;
        return Ok(());
      }

      advance(app, actor, AdminFlow::Upi(UpiStep::Name { upi_id: text }));
      reply
        .with_keyboard("👤 Send the payee name:", keyboard::admin_cancel())
        .await?;
    }
    UpiStep::Name { upi_id } => {
      app.sessions.take(actor.id);
      let route = app.sv().upi.add(upi_id, text).await?;

      let text = format!(
        "✅ UPI added and activated!\n\n💳 <code>{}</code> ({})",
        utils::escape(&route.upi_id),
        utils::escape(&route.name)
      );
      reply.with_keyboard(text, keyboard::admin_menu(role)).await?;
    }
  }

  Ok(())
}

async fn admin_step(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  step: AdminStep,
  text: String,
) -> Result<()> {
  match step {
    AdminStep::Id => {
      let Some(tg_user_id) = utils::parse_user_id(&text) else {
        reply
          .with_keyboard(
            "❌ Invalid user ID! Send the numeric Telegram ID.",
            keyboard::admin_cancel(),
          )
          .await?;
        return Ok(());
      };

      advance(app, actor, AdminFlow::Admin(AdminStep::Role { tg_user_id }));
      reply.with_keyboard("🎭 Choose the role:", keyboard::roles()).await?;
    }
    AdminStep::Role { .. } => {
      reply
        .with_keyboard(
          "🎭 Please choose a role using the buttons.",
          keyboard::roles(),
        )
        .await?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::TokenStatus,
    flow::{self, Command},
    sv::Redemption,
    testing::{self, FixedVerifier, Harness, RecordingChat, buyer},
  };

  const OWNER: i64 = 900;
  const HELPER: i64 = 901;

  fn admin(id: i64) -> Actor {
    Actor { id, username: None, first_name: "Admin".into(), last_name: None }
  }

  async fn panel(verifier: FixedVerifier) -> Harness {
    let h = testing::app(RecordingChat::new(), verifier).await;
    h.app.sv().admin.bootstrap(&[OWNER]).await.unwrap();
    h.app.sv().admin.upsert(HELPER, Role::Limited).await.unwrap();
    h
  }

  async fn say(h: &Harness, id: i64, text: &str) -> Result<()> {
    let reply = flow::Reply::new(h.chat.as_ref(), id, None);
    flow::on_message(&h.app, &admin(id), &reply, Input::Text(text.into())).await
  }

  async fn press(h: &Harness, id: i64, callback: Callback) -> Result<()> {
    let reply = flow::Reply::new(h.chat.as_ref(), id, None);
    flow::on_callback(&h.app, &admin(id), &reply, callback).await
  }

  #[tokio::test]
  async fn test_add_package_flow_reprompts_bad_numbers() {
    let h = panel(FixedVerifier::failed()).await;

    press(&h, OWNER, Callback::AddPackage).await.unwrap();
    say(&h, OWNER, "Monthly").await.unwrap();
    say(&h, OWNER, "30 days of access").await.unwrap();

    say(&h, OWNER, "a lot").await.unwrap();
    assert!(h.chat.last_to(OWNER).unwrap().body().contains("Invalid amount"));
    assert!(matches!(
      h.app.sessions.get(OWNER),
      Some(Session::Admin(AdminFlow::Package(PackageStep::Amount { .. })))
    ));

    say(&h, OWNER, "₹149.50").await.unwrap();
    say(&h, OWNER, "0").await.unwrap();
    assert!(h.chat.last_to(OWNER).unwrap().body().contains("Invalid number"));
    say(&h, OWNER, "30").await.unwrap();

    assert_eq!(h.app.sessions.get(OWNER), None);
    let packages = h.app.sv().package.all().await.unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].plan_name, "Monthly");
    assert_eq!(packages[0].description, "30 days of access");
    assert_eq!(packages[0].amount, 149.5);
    assert_eq!(packages[0].validity_days, 30);
  }

  #[tokio::test]
  async fn test_limited_admin_is_kept_out_of_super_flows() {
    let h = panel(FixedVerifier::failed()).await;

    for callback in [
      Callback::AddPackage,
      Callback::AddUpi,
      Callback::AddAdmin,
      Callback::EditChannel,
      Callback::EditApi,
      Callback::ViewPackages,
      Callback::ViewAdmins,
      Callback::DeactivateAdmin(OWNER),
    ] {
      assert!(matches!(
        press(&h, HELPER, callback).await,
        Err(Error::Unauthorized)
      ));
    }

    // a session smuggled in still hits the role check on the next step
    let smuggled = UpiStep::Name { upi_id: "evil@ybl".into() };
    h.app.sessions.set(HELPER, Session::Admin(AdminFlow::Upi(smuggled)));
    assert!(matches!(say(&h, HELPER, "Evil").await, Err(Error::Unauthorized)));

    let sv = h.app.sv();
    assert!(sv.package.all().await.unwrap().is_empty());
    assert!(sv.upi.all().await.unwrap().is_empty());
    assert_eq!(sv.admin.all().await.unwrap().len(), 2);
    assert_eq!(sv.settings.get().await.unwrap().api_token, None);
  }

  #[tokio::test]
  async fn test_demotion_mid_flow_stops_it() {
    let h = panel(FixedVerifier::failed()).await;

    press(&h, OWNER, Callback::AddUpi).await.unwrap();
    say(&h, OWNER, "shop@okaxis").await.unwrap();

    h.app.sv().admin.upsert(OWNER, Role::Limited).await.unwrap();

    let reply = flow::Reply::new(h.chat.as_ref(), OWNER, None);
    let err = say(&h, OWNER, "Shop").await.unwrap_err();
    flow::report(&h.app, &admin(OWNER), &reply, err).await;

    assert_eq!(h.app.sessions.get(OWNER), None);
    assert!(h.app.sv().upi.all().await.unwrap().is_empty());
    assert_eq!(h.chat.last_to(OWNER).unwrap().body(), "Unauthorized!");
  }

  #[tokio::test]
  async fn test_add_upi_activates_only_new_route() {
    let h = panel(FixedVerifier::failed()).await;
    h.app.sv().upi.add("old@ybl".into(), "Old".into()).await.unwrap();

    press(&h, OWNER, Callback::AddUpi).await.unwrap();
    say(&h, OWNER, "not a upi").await.unwrap();
    say(&h, OWNER, "new@okaxis").await.unwrap();
    say(&h, OWNER, "New Shop").await.unwrap();

    let routes = h.app.sv().upi.all().await.unwrap();
    let active: Vec<_> = routes.iter().filter(|r| r.is_active).collect();
    assert_eq!(routes.len(), 2);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].upi_id, "new@okaxis");
  }

  #[tokio::test]
  async fn test_add_admin_with_role_button() {
    let h = panel(FixedVerifier::failed()).await;

    press(&h, OWNER, Callback::AddAdmin).await.unwrap();
    say(&h, OWNER, "@someone").await.unwrap();
    assert!(h.chat.last_to(OWNER).unwrap().body().contains("Invalid user ID"));

    say(&h, OWNER, "12345").await.unwrap();
    press(&h, OWNER, Callback::AdminRole(Role::Limited)).await.unwrap();

    assert_eq!(
      h.app.sv().admin.role_of(12345).await.unwrap(),
      Some(Role::Limited)
    );
    assert_eq!(h.app.sessions.get(OWNER), None);
  }

  #[tokio::test]
  async fn test_settings_flows() {
    let h = panel(FixedVerifier::failed()).await;

    press(&h, OWNER, Callback::EditChannel).await.unwrap();
    say(&h, OWNER, "mychannel").await.unwrap();
    press(&h, OWNER, Callback::EditApi).await.unwrap();
    say(&h, OWNER, "tok-123").await.unwrap();

    let settings = h.app.sv().settings.get().await.unwrap();
    assert_eq!(settings.force_channel.as_deref(), Some("@mychannel"));
    assert_eq!(settings.api_token.as_deref(), Some("tok-123"));

    press(&h, OWNER, Callback::EditChannel).await.unwrap();
    say(&h, OWNER, "off").await.unwrap();
    assert_eq!(h.app.sv().settings.get().await.unwrap().force_channel, None);
  }

  #[tokio::test]
  async fn test_manual_token_is_claimable_by_anyone() {
    let h = panel(FixedVerifier::success(100.0)).await;
    let package = h
      .app
      .sv()
      .package
      .create("Monthly".into(), "".into(), 100.0, 30)
      .await
      .unwrap();

    press(&h, HELPER, Callback::GenToken).await.unwrap();
    say(&h, HELPER, "@buyer10").await.unwrap();
    press(&h, HELPER, Callback::TokenPackage(package.id)).await.unwrap();
    say(&h, HELPER, "TXN42").await.unwrap();

    assert_eq!(h.app.sessions.get(HELPER), None);
    assert_eq!(h.app.sv().ledger.count_active_tokens().await.unwrap(), 1);

    let body = h.chat.last_to(HELPER).unwrap().body().to_string();
    let token_id = body
      .split("<code>")
      .nth(1)
      .and_then(|rest| rest.split("</code>").next())
      .unwrap()
      .to_string();

    let token = testing::token(&h.app.db, &token_id).await;
    assert_eq!(token.owner_id, UNCLAIMED);
    assert_eq!(token.source, TokenSource::Manual);
    assert_eq!(token.username.as_deref(), Some("buyer10"));

    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    let redeemed =
      flow::purchase::redeem_token(&h.app, &buyer(10), &reply, &token_id)
        .await
        .unwrap();
    assert!(matches!(redeemed, Redemption::Redeemed(_)));

    let token = testing::token(&h.app.db, &token_id).await;
    assert_eq!(token.status, TokenStatus::Used);
    assert_eq!(token.owner_id, 10);
  }

  #[tokio::test]
  async fn test_manual_token_needs_verified_payment() {
    let h = panel(FixedVerifier::failed()).await;
    let package = h
      .app
      .sv()
      .package
      .create("Monthly".into(), "".into(), 100.0, 30)
      .await
      .unwrap();

    press(&h, HELPER, Callback::GenToken).await.unwrap();
    say(&h, HELPER, "buyer10").await.unwrap();
    press(&h, HELPER, Callback::TokenPackage(package.id)).await.unwrap();
    say(&h, HELPER, "TXN-BAD").await.unwrap();

    assert_eq!(h.app.sv().ledger.count_tokens().await.unwrap(), 0);
    assert!(h.chat.last_to(HELPER).unwrap().body().contains("Verification failed"));
  }

  #[tokio::test]
  async fn test_panel_and_stats_for_limited_admin() {
    let h = panel(FixedVerifier::failed()).await;

    let reply = flow::Reply::new(h.chat.as_ref(), HELPER, None);
    flow::on_command(&h.app, &admin(HELPER), &reply, Command::Admin)
      .await
      .unwrap();
    let menu = h.chat.last_to(HELPER).unwrap();
    // token, pending and statistics only
    assert_eq!(menu.keyboard().unwrap().inline_keyboard.len(), 3);

    press(&h, HELPER, Callback::Stats).await.unwrap();
    assert!(h.chat.last_to(HELPER).unwrap().body().contains("Statistics"));

    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    assert!(matches!(
      flow::on_command(&h.app, &buyer(10), &reply, Command::Admin).await,
      Err(Error::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn test_toggle_and_deactivate() {
    let h = panel(FixedVerifier::failed()).await;
    let package = h
      .app
      .sv()
      .package
      .create("Monthly".into(), "".into(), 100.0, 30)
      .await
      .unwrap();

    press(&h, OWNER, Callback::TogglePackage(package.id)).await.unwrap();
    assert!(h.app.sv().package.active().await.unwrap().is_empty());

    press(&h, OWNER, Callback::DeactivateAdmin(HELPER)).await.unwrap();
    assert_eq!(h.app.sv().admin.role_of(HELPER).await.unwrap(), None);

    assert!(matches!(
      press(&h, OWNER, Callback::DeactivateAdmin(OWNER)).await,
      Err(Error::InvalidArgs(_))
    ));
  }
}
