//! Buyer side: pick a package, pay, prove the payment, get a key.

use super::{Actor, Input, Reply, keyboard, review};
use crate::{
  chat,
  entity::{TokenSource, key, package, review as pending},
  prelude::*,
  session::Session,
  state::AppState,
  sv::{Redemption, Rejected},
  verify::{Receipt, Verdict},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
  AwaitingProof { uri: String },
  Unavailable,
  NotConfigured,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Proof {
  Issued(key::Model),
  Failed(String),
  Duplicate,
  Queued(pending::Model),
  /// Unsupported message kind, still waiting for proof
  Reprompt,
}

const PROOF_PROMPT: &str = "❌ Please send either:\n\
  📤 Transaction ID/UTR (text)\n\
  📸 Payment screenshot (image)";

pub async fn list_packages(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
) -> Result<()> {
  let packages = app.sv().package.active().await?;

  if packages.is_empty() {
    app.sessions.clear(actor.id);
    return reply
      .edit_with_keyboard(
        "❌ No packages available at the moment.",
        keyboard::back(),
      )
      .await;
  }

  app.sessions.set(actor.id, Session::SelectingPackage);
  reply
    .edit_with_keyboard(
      "💳 <b>Select a Package</b>\n\nChoose the plan you want to buy:",
      keyboard::packages(&packages),
    )
    .await
}

pub async fn select_package(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  package_id: i32,
) -> Result<Selection> {
  let sv = app.sv();

  let package = match sv.package.purchasable(package_id).await {
    Ok(package) => package,
    Err(Error::PackageNotFound) => {
      app.sessions.clear(actor.id);
      reply.html(Error::PackageNotFound.user_message()).await?;
      return Ok(Selection::Unavailable);
    }
    Err(err) => return Err(err),
  };

  let Some(route) = sv.upi.active().await? else {
    app.sessions.clear(actor.id);
    reply.html(Error::PaymentNotConfigured.user_message()).await?;
    return Ok(Selection::NotConfigured);
  };

  let uri = utils::upi_uri(&route.upi_id, &route.name, package.amount)?;
  app.sessions.set(actor.id, Session::AwaitingProof { package_id });

  let text = format!(
    "📦 <b>{}</b>\n\n\
    💰 Amount: ₹{}\n\
    ⏱ Validity: {} days\n\
    📝 Description: {}\n\n\
    💳 UPI ID: <code>{}</code>\n\
    👤 Name: {}\n\
    🔗 Pay link: <code>{}</code>\n\n\
    📱 <b>Payment Steps:</b>\n\
    1️⃣ Open the pay link or copy the UPI ID\n\
    2️⃣ Complete payment in your UPI app\n\n\
    💡 <b>After Payment:</b>\n\
    📤 Send Transaction ID/UTR (instant verification)\n\
    📸 Or send payment screenshot (manual review)\n\n\
    👇 Waiting for your payment proof...",
    utils::escape(&package.plan_name),
    utils::format_amount(package.amount),
    package.validity_days,
    utils::escape(&package.description),
    utils::escape(&route.upi_id),
    utils::escape(&route.name),
    utils::escape(&uri),
  );
  reply.with_keyboard(text, keyboard::cancel()).await?;

  debug!("User {} selected package #{package_id}", actor.id);
  Ok(Selection::AwaitingProof { uri })
}

pub async fn submit_proof(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  package_id: i32,
  input: Input,
) -> Result<Proof> {
  let input = match input {
    // unknown commands are not payment references
    Input::Text(text)
      if !text.trim().is_empty() && !text.trim().starts_with('/') =>
    {
      Input::Text(text.trim().to_string())
    }
    Input::Photo(file_id) => Input::Photo(file_id),
    _ => {
      reply.with_keyboard(PROOF_PROMPT, keyboard::cancel()).await?;
      return Ok(Proof::Reprompt);
    }
  };

  app.sessions.take(actor.id);

  let Some(package) = app.sv().package.by_id(package_id).await? else {
    reply.html("❌ Error: Package not found!").await?;
    return Ok(Proof::Failed("package not found".into()));
  };

  match input {
    Input::Text(reference) => {
      verify_transaction(app, actor, reply, &package, &reference).await
    }
    Input::Photo(file_id) => {
      queue_screenshot(app, actor, reply, &package, file_id).await
    }
    Input::Other => Ok(Proof::Reprompt),
  }
}

fn duplicate_text() -> String {
  format!(
    "⚠️ {}\n\nIf you believe this is a mistake, send a payment screenshot \
    for manual review.",
    Error::DuplicatePayment.user_message()
  )
}

async fn verify_transaction(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  package: &package::Model,
  reference: &str,
) -> Result<Proof> {
  let sv = app.sv();

  if sv.ledger.payment_ref_taken(reference).await? {
    reply.with_keyboard(duplicate_text(), keyboard::main_menu()).await?;
    return Ok(Proof::Duplicate);
  }

  if let Err(err) = reply.html("⏳ Verifying transaction...").await {
    warn!("Failed to acknowledge `{reference}` to {}: {err}", actor.id);
  }

  let settings = sv.settings.get().await?;
  let verdict = app
    .verifier
    .verify(settings.api_token.as_deref(), reference, package.amount)
    .await;

  let receipt = match verdict {
    Verdict::Success(receipt) => receipt,
    Verdict::Failed(message) | Verdict::Error(message) => {
      info!("Auto verification failed for {}: {message}", actor.id);
      let text = format!(
        "❌ <b>Automatic Verification Failed!</b>\n\n\
        {}\n\n\
        💡 You can send payment screenshot instead for manual review.",
        utils::escape(&message)
      );
      reply.with_keyboard(text, keyboard::main_menu()).await?;
      return Ok(Proof::Failed(message));
    }
  };

  let redemption = sv
    .ledger
    .issue_and_redeem(
      actor.id,
      actor.username.clone(),
      package,
      reference,
      TokenSource::Auto,
    )
    .await;

  let key = match redemption {
    Ok(Redemption::Redeemed(key)) => key,
    Ok(Redemption::Rejected(reason)) => {
      return Err(Error::Internal(format!(
        "fresh token for `{reference}` rejected: {reason:?}"
      )));
    }
    Err(Error::DuplicatePayment) => {
      reply.with_keyboard(duplicate_text(), keyboard::main_menu()).await?;
      return Ok(Proof::Duplicate);
    }
    Err(err) => return Err(err),
  };

  reply.html(paid_text(&receipt, package, &key)).await?;
  Ok(Proof::Issued(key))
}

fn paid_text(
  receipt: &Receipt,
  package: &package::Model,
  key: &key::Model,
) -> String {
  let or_na = |value: &Option<String>| {
    value.as_deref().map(utils::escape).unwrap_or_else(|| "N/A".into())
  };

  format!(
    "✅ <b>Payment Verified &amp; Approved!</b>\n\n\
    💰 Amount: ₹{}\n\
    👤 Payer: {}\n\
    📱 App: {}\n\n\
    📦 Package: {}\n\
    ⏱ Validity: {} days\n\n\
    🔐 <b>Your Key:</b>\n<code>{}</code>\n\n\
    ⚠️ Keep this key safe!",
    utils::format_amount(receipt.amount),
    or_na(&receipt.payer),
    or_na(&receipt.app),
    utils::escape(&package.plan_name),
    key.validity_days,
    key.key,
  )
}

async fn queue_screenshot(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  package: &package::Model,
  file_id: String,
) -> Result<Proof> {
  let sv = app.sv();

  let queued = sv
    .review
    .submit(actor.id, actor.username.clone(), package.id, file_id)
    .await?;

  let admins = sv.admin.active_ids().await?;
  let delivered = chat::broadcast_photo(
    app.chat.as_ref(),
    &admins,
    &queued.screenshot,
    &review::caption(&queued, Some(package)),
    Some(keyboard::review(queued.id)),
  )
  .await;

  if delivered.is_empty() {
    warn!("Review #{} reached no admin", queued.id);
  }

  let ack = reply
    .html(
      "✅ <b>Screenshot Received!</b>\n\n\
      Your payment is under review.\n\
      ⏱ Review time: 1-2 hours\n\n\
      You will receive your key once approved by admin.",
    )
    .await;
  if let Err(err) = ack {
    warn!("Failed to acknowledge review #{}: {err}", queued.id);
  }

  Ok(Proof::Queued(queued))
}

pub async fn redeem_token(
  app: &AppState,
  actor: &Actor,
  reply: &Reply<'_>,
  token_id: &str,
) -> Result<Redemption> {
  app.sessions.take(actor.id);

  let redemption = app.sv().ledger.redeem(token_id, actor.id).await?;

  match &redemption {
    Redemption::Redeemed(key) => {
      let text = format!(
        "✅ <b>Key Generated Successfully!</b>\n\n\
        🔐 Your Key:\n<code>{}</code>\n\
        ⏱ Validity: {} days\n\n\
        ⚠️ Keep this key safe!",
        key.key, key.validity_days
      );
      reply.html(text).await?;
    }
    Redemption::Rejected(reason) => {
      let hint = match reason {
        Rejected::NotFound => "\nPlease check and try again.",
        _ => "",
      };
      reply
        .with_keyboard(
          format!("{}{hint}", reason.message()),
          keyboard::main_menu(),
        )
        .await?;
    }
  }

  Ok(redemption)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{ReviewStatus, TokenStatus, token::UNCLAIMED},
    flow::{self, Callback},
    testing::{self, FixedVerifier, Harness, RecordingChat, Sent, buyer},
  };

  async fn shop(verifier: FixedVerifier) -> (Harness, package::Model) {
    let h = testing::app(RecordingChat::new(), verifier).await;
    let sv = h.app.sv();

    let package =
      sv.package.create("Monthly".into(), "30 days".into(), 100.0, 30).await.unwrap();
    sv.upi.add("shop@okaxis".into(), "Key Shop".into()).await.unwrap();
    sv.settings.set_api_token("secret".into()).await.unwrap();
    sv.admin.bootstrap(&[900, 901]).await.unwrap();

    (h, package)
  }

  #[tokio::test]
  async fn test_transaction_id_success() {
    let (h, package) = shop(FixedVerifier::success(100.0)).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    let actor = buyer(10);

    let selection =
      select_package(&h.app, &actor, &reply, package.id).await.unwrap();
    let Selection::AwaitingProof { uri } = selection else {
      panic!("expected payment instructions");
    };
    assert!(uri.contains("am=100"));
    assert_eq!(
      h.app.sessions.get(10),
      Some(Session::AwaitingProof { package_id: package.id })
    );

    flow::on_message(&h.app, &actor, &reply, Input::Text(" TXN1 ".into()))
      .await
      .unwrap();

    assert_eq!(
      h.verifier.calls(),
      vec![(Some("secret".to_string()), "TXN1".to_string(), 100.0)]
    );
    assert_eq!(h.app.sessions.get(10), None);

    let keys = testing::keys_of(&h.app.db, 10).await;
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].validity_days, 30);

    let token = testing::token(&h.app.db, &keys[0].token_id).await;
    assert_eq!(token.status, TokenStatus::Used);
    assert_eq!(token.source, TokenSource::Auto);
    assert_eq!(token.payment_ref, "TXN1");

    let last = h.chat.last_to(10).unwrap();
    assert!(last.body().contains(&keys[0].key));
  }

  #[tokio::test]
  async fn test_failed_verification_mints_nothing() {
    let (h, package) = shop(FixedVerifier::failed()).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    let actor = buyer(10);

    select_package(&h.app, &actor, &reply, package.id).await.unwrap();
    let proof =
      submit_proof(&h.app, &actor, &reply, package.id, Input::Text("BAD".into()))
        .await
        .unwrap();

    assert!(matches!(proof, Proof::Failed(msg) if msg.contains("FAILED")));
    assert_eq!(h.app.sessions.get(10), None);
    assert_eq!(h.app.sv().ledger.count_tokens().await.unwrap(), 0);
    assert!(h.chat.last_to(10).unwrap().body().contains("screenshot"));
  }

  #[tokio::test]
  async fn test_reused_transaction_is_refused() {
    let (h, package) = shop(FixedVerifier::success(100.0)).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    for user in [10, 11] {
      h.app.sessions.set(user, Session::AwaitingProof { package_id: package.id });
    }

    let first = submit_proof(
      &h.app,
      &buyer(10),
      &reply,
      package.id,
      Input::Text("TXN1".into()),
    )
    .await
    .unwrap();
    assert!(matches!(first, Proof::Issued(_)));

    let second = submit_proof(
      &h.app,
      &buyer(11),
      &reply,
      package.id,
      Input::Text("TXN1".into()),
    )
    .await
    .unwrap();
    assert_eq!(second, Proof::Duplicate);
    assert_eq!(h.verifier.calls().len(), 1);
    assert_eq!(h.app.sv().ledger.count_keys().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn test_screenshot_is_queued_and_fanned_out() {
    let (h, package) = shop(FixedVerifier::failed()).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    let actor = buyer(10);

    h.app.sessions.set(10, Session::AwaitingProof { package_id: package.id });
    let proof = submit_proof(
      &h.app,
      &actor,
      &reply,
      package.id,
      Input::Photo("file-1".into()),
    )
    .await
    .unwrap();

    let Proof::Queued(queued) = proof else { panic!("expected a review") };
    assert_eq!(queued.status, ReviewStatus::Pending);
    assert_eq!(h.app.sessions.get(10), None);

    for admin in [900, 901] {
      let Some(Sent::Photo { photo, keyboard, .. }) = h.chat.last_to(admin)
      else {
        panic!("admin {admin} got no screenshot");
      };
      assert_eq!(photo, "file-1");
      let buttons: Vec<_> = keyboard
        .unwrap()
        .inline_keyboard
        .into_iter()
        .flatten()
        .collect();
      assert_eq!(buttons.len(), 2);
    }
    assert!(h.verifier.calls().is_empty());
  }

  #[tokio::test]
  async fn test_unreachable_buyer_still_reaches_admins() {
    let h = testing::app(
      RecordingChat::new().unreachable(&[10]),
      FixedVerifier::failed(),
    )
    .await;
    let sv = h.app.sv();
    let package =
      sv.package.create("Monthly".into(), "".into(), 100.0, 30).await.unwrap();
    sv.admin.bootstrap(&[900, 901]).await.unwrap();
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    let proof = submit_proof(
      &h.app,
      &buyer(10),
      &reply,
      package.id,
      Input::Photo("file-2".into()),
    )
    .await
    .unwrap();

    assert!(matches!(proof, Proof::Queued(_)));
    assert_eq!(sv.review.count_pending().await.unwrap(), 1);
    for admin in [900, 901] {
      assert!(matches!(
        h.chat.last_to(admin),
        Some(Sent::Photo { photo, .. }) if photo == "file-2"
      ));
    }
  }

  #[tokio::test]
  async fn test_unreachable_buyer_is_still_verified() {
    let h = testing::app(
      RecordingChat::new().unreachable(&[10]),
      FixedVerifier::success(100.0),
    )
    .await;
    let sv = h.app.sv();
    let package =
      sv.package.create("Monthly".into(), "".into(), 100.0, 30).await.unwrap();
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    // the "verifying" notice fails, the final key message fails too
    let result = submit_proof(
      &h.app,
      &buyer(10),
      &reply,
      package.id,
      Input::Text("TXN9".into()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(h.verifier.calls().len(), 1);
    assert_eq!(testing::keys_of(&h.app.db, 10).await.len(), 1);
  }

  #[tokio::test]
  async fn test_verifier_error_takes_failure_path() {
    let (h, package) = shop(FixedVerifier::new(Verdict::Error(
      "Verification service timed out".into(),
    )))
    .await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    let actor = buyer(10);

    select_package(&h.app, &actor, &reply, package.id).await.unwrap();
    let proof = submit_proof(
      &h.app,
      &actor,
      &reply,
      package.id,
      Input::Text("TXN2".into()),
    )
    .await
    .unwrap();

    assert_eq!(proof, Proof::Failed("Verification service timed out".into()));
    assert_eq!(h.app.sessions.get(10), None);
    assert_eq!(h.app.sv().ledger.count_tokens().await.unwrap(), 0);
    let last = h.chat.last_to(10).unwrap();
    assert!(last.body().contains("timed out"));
    assert!(last.body().contains("screenshot"));
  }

  #[tokio::test]
  async fn test_unknown_command_is_not_a_reference() {
    let (h, package) = shop(FixedVerifier::success(100.0)).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    h.app.sessions.set(10, Session::AwaitingProof { package_id: package.id });
    let proof = submit_proof(
      &h.app,
      &buyer(10),
      &reply,
      package.id,
      Input::Text("/status".into()),
    )
    .await
    .unwrap();

    assert_eq!(proof, Proof::Reprompt);
    assert!(h.verifier.calls().is_empty());
    assert_eq!(
      h.app.sessions.get(10),
      Some(Session::AwaitingProof { package_id: package.id })
    );
  }

  #[tokio::test]
  async fn test_other_input_reprompts() {
    let (h, package) = shop(FixedVerifier::failed()).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    h.app.sessions.set(10, Session::AwaitingProof { package_id: package.id });
    let proof =
      submit_proof(&h.app, &buyer(10), &reply, package.id, Input::Other)
        .await
        .unwrap();

    assert_eq!(proof, Proof::Reprompt);
    assert_eq!(
      h.app.sessions.get(10),
      Some(Session::AwaitingProof { package_id: package.id })
    );
  }

  #[tokio::test]
  async fn test_unconfigured_payment_stays_idle() {
    let h = testing::app(RecordingChat::new(), FixedVerifier::failed()).await;
    let package = h
      .app
      .sv()
      .package
      .create("Weekly".into(), "".into(), 40.0, 7)
      .await
      .unwrap();
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    let selection =
      select_package(&h.app, &buyer(10), &reply, package.id).await.unwrap();

    assert_eq!(selection, Selection::NotConfigured);
    assert_eq!(h.app.sessions.get(10), None);
    assert!(h.chat.last_to(10).unwrap().body().contains("not configured"));
  }

  #[tokio::test]
  async fn test_inactive_package_is_unavailable() {
    let (h, package) = shop(FixedVerifier::failed()).await;
    h.app.sv().package.set_active(package.id, false).await.unwrap();
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    let selection =
      select_package(&h.app, &buyer(10), &reply, package.id).await.unwrap();
    assert_eq!(selection, Selection::Unavailable);
  }

  #[tokio::test]
  async fn test_buy_lists_active_packages() {
    let (h, _) = shop(FixedVerifier::failed()).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);

    flow::on_callback(&h.app, &buyer(10), &reply, Callback::Buy)
      .await
      .unwrap();

    assert_eq!(h.app.sessions.get(10), Some(Session::SelectingPackage));
    let listing = h.chat.last_to(10).unwrap();
    // package row plus back button
    assert_eq!(listing.keyboard().unwrap().inline_keyboard.len(), 2);
  }

  #[tokio::test]
  async fn test_redeem_manual_token() {
    let (h, package) = shop(FixedVerifier::failed()).await;
    let reply = flow::Reply::new(h.chat.as_ref(), 10, None);
    let token = h
      .app
      .sv()
      .ledger
      .issue(UNCLAIMED, Some("buyer10".into()), &package, "TXN7", TokenSource::Manual)
      .await
      .unwrap();

    flow::on_callback(&h.app, &buyer(10), &reply, Callback::Redeem)
      .await
      .unwrap();
    assert_eq!(h.app.sessions.get(10), Some(Session::AwaitingToken));

    flow::on_message(&h.app, &buyer(10), &reply, Input::Text(token.token_id.clone()))
      .await
      .unwrap();
    assert_eq!(testing::keys_of(&h.app.db, 10).await.len(), 1);

    h.app.sessions.set(11, Session::AwaitingToken);
    let again = redeem_token(&h.app, &buyer(11), &reply, &token.token_id)
      .await
      .unwrap();
    assert_eq!(again, Redemption::Rejected(Rejected::AlreadyUsed));
  }
}
