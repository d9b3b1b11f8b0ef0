use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::Callback;
use crate::{
  entity::{Role, admin, package, upi},
  prelude::*,
};

fn button(text: impl Into<String>, callback: Callback) -> InlineKeyboardButton {
  InlineKeyboardButton::callback(text, callback.to_data())
}

fn single(text: &str, callback: Callback) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![vec![button(text, callback)]])
}

pub fn main_menu() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button("🔑 Generate Key", Callback::Redeem)],
    vec![button("💳 Buy Package", Callback::Buy)],
  ])
}

pub fn back() -> InlineKeyboardMarkup {
  single("« Back to Menu", Callback::Back)
}

pub fn cancel() -> InlineKeyboardMarkup {
  single("❌ Cancel", Callback::Cancel)
}

pub fn admin_cancel() -> InlineKeyboardMarkup {
  single("❌ Cancel", Callback::AdminCancel)
}

pub fn admin_back() -> InlineKeyboardMarkup {
  single("« Admin Panel", Callback::AdminMenu)
}

pub fn packages(packages: &[package::Model]) -> InlineKeyboardMarkup {
  let mut rows: Vec<_> = packages
    .iter()
    .map(|package| {
      vec![button(
        format!(
          "{} - ₹{} ({} days)",
          package.plan_name,
          utils::format_amount(package.amount),
          package.validity_days
        ),
        Callback::SelectPackage(package.id),
      )]
    })
    .collect();

  rows.push(vec![button("« Back to Menu", Callback::Back)]);
  InlineKeyboardMarkup::new(rows)
}

/// Unverified users see a join link (public channels only) and a re-check
pub fn join(channel: &str) -> InlineKeyboardMarkup {
  let mut rows = Vec::new();
  if let Some(url) = utils::channel_url(channel) {
    rows.push(vec![InlineKeyboardButton::url("📢 Join Channel", url)]);
  }
  rows.push(vec![button("✅ I Joined, Verify", Callback::VerifyJoin)]);
  InlineKeyboardMarkup::new(rows)
}

pub fn admin_menu(role: Role) -> InlineKeyboardMarkup {
  let mut rows = vec![
    vec![button("🎫 Generate Token", Callback::GenToken)],
    vec![button("📸 Pending Reviews", Callback::Pending)],
  ];

  if role == Role::Super {
    rows.push(vec![
      button("📦 Packages", Callback::Packages),
      button("💳 UPI", Callback::Upi),
    ]);
    rows.push(vec![
      button("👥 Admins", Callback::Admins),
      button("⚙️ Settings", Callback::Settings),
    ]);
  }

  rows.push(vec![button("📊 Statistics", Callback::Stats)]);
  InlineKeyboardMarkup::new(rows)
}

pub fn token_packages(packages: &[package::Model]) -> InlineKeyboardMarkup {
  let mut rows: Vec<_> = packages
    .iter()
    .map(|package| {
      vec![button(
        format!(
          "{} - ₹{}",
          package.plan_name,
          utils::format_amount(package.amount)
        ),
        Callback::TokenPackage(package.id),
      )]
    })
    .collect();

  rows.push(vec![button("❌ Cancel", Callback::AdminCancel)]);
  InlineKeyboardMarkup::new(rows)
}

pub fn packages_menu() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button("📋 View Packages", Callback::ViewPackages)],
    vec![button("➕ Add Package", Callback::AddPackage)],
    vec![button("« Admin Panel", Callback::AdminMenu)],
  ])
}

pub fn package_toggles(packages: &[package::Model]) -> InlineKeyboardMarkup {
  let mut rows: Vec<_> = packages
    .iter()
    .map(|package| {
      let action = if package.is_active { "🔴 Disable" } else { "🟢 Enable" };
      vec![button(
        format!("{action} {}", package.plan_name),
        Callback::TogglePackage(package.id),
      )]
    })
    .collect();

  rows.push(vec![button("« Back", Callback::Packages)]);
  InlineKeyboardMarkup::new(rows)
}

pub fn upi_menu() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button("📋 View UPI", Callback::ViewUpi)],
    vec![button("➕ Add UPI", Callback::AddUpi)],
    vec![button("« Admin Panel", Callback::AdminMenu)],
  ])
}

pub fn upi_routes(routes: &[upi::Model]) -> InlineKeyboardMarkup {
  let mut rows: Vec<_> = routes
    .iter()
    .filter(|route| !route.is_active)
    .map(|route| {
      vec![button(
        format!("✅ Activate {}", route.upi_id),
        Callback::ActivateUpi(route.id),
      )]
    })
    .collect();

  rows.push(vec![button("« Back", Callback::Upi)]);
  InlineKeyboardMarkup::new(rows)
}

pub fn admins_menu() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button("📋 View Admins", Callback::ViewAdmins)],
    vec![button("➕ Add Admin", Callback::AddAdmin)],
    vec![button("« Admin Panel", Callback::AdminMenu)],
  ])
}

pub fn admin_roster(admins: &[admin::Model], me: i64) -> InlineKeyboardMarkup {
  let mut rows: Vec<_> = admins
    .iter()
    .filter(|admin| admin.is_active && admin.tg_user_id != me)
    .map(|admin| {
      vec![button(
        format!("🚫 Remove {}", admin.tg_user_id),
        Callback::DeactivateAdmin(admin.tg_user_id),
      )]
    })
    .collect();

  rows.push(vec![button("« Back", Callback::Admins)]);
  InlineKeyboardMarkup::new(rows)
}

pub fn roles() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button(Role::Super.title(), Callback::AdminRole(Role::Super))],
    vec![button(Role::Limited.title(), Callback::AdminRole(Role::Limited))],
    vec![button("❌ Cancel", Callback::AdminCancel)],
  ])
}

pub fn settings_menu() -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button("📋 View Settings", Callback::ViewSettings)],
    vec![button("📢 Force Channel", Callback::EditChannel)],
    vec![button("🔑 API Token", Callback::EditApi)],
    vec![button("« Admin Panel", Callback::AdminMenu)],
  ])
}

pub fn review(review_id: i32) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![
    vec![button("✅ Approve", Callback::Approve(review_id))],
    vec![button("❌ Reject", Callback::Reject(review_id))],
  ])
}
