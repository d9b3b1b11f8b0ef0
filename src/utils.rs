use reqwest::Url;
pub use teloxide::utils::html::escape;

use crate::prelude::*;

pub fn format_date(date: DateTime) -> String {
  date.format("%d.%m.%Y %H:%M").to_string()
}

/// Rupee amount without a trailing `.0` for whole numbers
pub fn format_amount(amount: f64) -> String {
  if amount.fract() == 0.0 {
    format!("{amount:.0}")
  } else {
    format!("{amount:.2}")
  }
}

/// Parses a price typed by an admin. Accepts a leading rupee sign.
pub fn parse_amount(input: &str) -> Option<f64> {
  let input = input.trim().trim_start_matches('₹').trim();
  input.parse::<f64>().ok().filter(|amount| amount.is_finite() && *amount > 0.0)
}

pub fn parse_days(input: &str) -> Option<i32> {
  input.trim().parse::<i32>().ok().filter(|days| *days > 0)
}

pub fn parse_user_id(input: &str) -> Option<i64> {
  input.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Channel ids (`-100…`) are kept verbatim, bare usernames get an `@`.
pub fn normalize_channel(input: &str) -> String {
  let channel = input.trim();
  if channel.starts_with('-') || channel.starts_with('@') {
    channel.to_string()
  } else {
    format!("@{channel}")
  }
}

/// Public join link for a channel. Private channels referenced by id have none.
pub fn channel_url(channel: &str) -> Option<Url> {
  let channel = channel.trim();
  if channel.starts_with('-') {
    return None;
  }
  Url::parse(&format!("https://t.me/{}", channel.trim_start_matches('@'))).ok()
}

/// `upi://pay` link understood by every UPI app
pub fn upi_uri(upi_id: &str, name: &str, amount: f64) -> Result<String> {
  let params = [
    ("pa", upi_id.to_string()),
    ("pn", name.to_string()),
    ("am", format_amount(amount)),
    ("cu", "INR".to_string()),
  ];
  Url::parse_with_params("upi://pay", &params)
    .map(String::from)
    .map_err(|err| Error::Internal(format!("Bad UPI link: {err}")))
}

pub fn display_handle(username: Option<&str>, fallback: i64) -> String {
  match username {
    Some(name) if !name.is_empty() => format!("@{}", escape(name)),
    _ => format!("<code>{fallback}</code>"),
  }
}
