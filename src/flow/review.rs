//! Admin side of the screenshot queue.

use super::{Actor, Reply, keyboard};
use crate::{
  entity::{ReviewStatus, Role, package, review},
  prelude::*,
  state::AppState,
  sv::{Decision, Resolved},
};

/// How many pending screenshots one "View pending" press re-sends
const PENDING_PAGE: usize = 10;

pub fn caption(
  review: &review::Model,
  package: Option<&package::Model>,
) -> String {
  let mut caption = format!(
    "📸 <b>New Payment Screenshot</b> #{}\n\n\
    👤 User: {}\n\
    🆔 User ID: <code>{}</code>\n",
    review.id,
    utils::display_handle(review.username.as_deref(), review.user_id),
    review.user_id,
  );

  match package {
    Some(package) => caption.push_str(&format!(
      "📦 Package: {}\n💰 Amount: ₹{}\n⏱ Validity: {} days",
      utils::escape(&package.plan_name),
      utils::format_amount(package.amount),
      package.validity_days,
    )),
    None => caption.push_str(&format!("📦 Package: #{}", review.package_id)),
  }

  caption
}

fn outcome(status: ReviewStatus, reviewer: Option<i64>) -> String {
  let by = reviewer
    .map(|id| format!(" by <code>{id}</code>"))
    .unwrap_or_default();
  match status {
    ReviewStatus::Approved => format!("\n\n✅ APPROVED{by}"),
    ReviewStatus::Rejected => format!("\n\n❌ REJECTED{by}"),
    ReviewStatus::Pending => String::new(),
  }
}

/// Rewrites the caption of the pressed notification. Copies sent to other
/// admins keep their buttons; pressing them later reports the final state.
async fn mark(app: &AppState, reply: &Reply<'_>, review: &review::Model) {
  let Some(at) = reply.origin else {
    return;
  };

  let package = app.sv().package.by_id(review.package_id).await.ok().flatten();
  let text = caption(review, package.as_ref())
    + &outcome(review.status, review.reviewed_by);

  if let Err(err) = app.chat.edit_caption(at, text).await {
    warn!("Failed to update review #{} caption: {err}", review.id);
  }
}

async fn notify_buyer(app: &AppState, to: i64, text: String) {
  if let Err(err) = app.chat.send_text(to, text, None).await {
    warn!("Failed to notify buyer {to}: {err}");
  }
}

pub async fn decide(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  review_id: i32,
  decision: Decision,
) -> Result<Resolved> {
  let sv = app.sv();
  sv.admin.require(actor.id, Role::Limited).await?;

  let resolved = sv.review.resolve(review_id, actor.id, decision).await?;

  match &resolved {
    Resolved::Approved { review, key } => {
      let text = format!(
        "✅ <b>Payment Approved!</b>\n\n\
        🔐 <b>Your Key:</b>\n<code>{}</code>\n\
        ⏱ Validity: {} days\n\n\
        ⚠️ Keep this key safe!",
        key.key, key.validity_days
      );
      notify_buyer(app, review.user_id, text).await;
      mark(app, reply, review).await;
    }
    Resolved::Rejected(review) => {
      let text = "❌ <b>Payment Rejected</b>\n\n\
        Your payment screenshot could not be verified.\n\
        Contact support if you believe this is a mistake."
        .to_string();
      notify_buyer(app, review.user_id, text).await;
      mark(app, reply, review).await;
    }
    Resolved::AlreadyResolved(review) => {
      let state = match review.status {
        ReviewStatus::Approved => "approved",
        ReviewStatus::Rejected => "rejected",
        ReviewStatus::Pending => "pending",
      };
      reply
        .html(format!("⚠️ Review #{} was already {state}.", review.id))
        .await?;
      mark(app, reply, review).await;
    }
    Resolved::NotFound => {
      reply.html(Error::ReviewNotFound.user_message()).await?;
    }
  }

  Ok(resolved)
}

pub async fn list_pending(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
) -> Result<()> {
  let sv = app.sv();
  sv.admin.require(actor.id, Role::Limited).await?;

  let pending = sv.review.pending().await?;
  if pending.is_empty() {
    reply
      .edit_with_keyboard("✅ No pending reviews.", keyboard::admin_back())
      .await?;
    return Ok(());
  }

  reply
    .html(format!("📸 <b>Pending reviews:</b> {}", pending.len()))
    .await?;

  for review in pending.iter().take(PENDING_PAGE) {
    let package = sv.package.by_id(review.package_id).await?;
    app
      .chat
      .send_photo(
        reply.chat_id,
        review.screenshot.clone(),
        caption(review, package.as_ref()),
        Some(keyboard::review(review.id)),
      )
      .await?;
  }

  if pending.len() > PENDING_PAGE {
    reply
      .html(format!(
        "…and {} more. Resolve these to see the rest.",
        pending.len() - PENDING_PAGE
      ))
      .await?;
  }

  Ok(())
}
