use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Telegram error: {0}")]
  Telegram(#[from] teloxide::RequestError),

  #[error("Unauthorized")]
  Unauthorized,

  #[error("Package not found")]
  PackageNotFound,

  #[error("Payment method not configured")]
  PaymentNotConfigured,

  #[error("Transaction reference already used")]
  DuplicatePayment,

  #[error("Review not found")]
  ReviewNotFound,

  #[error("UPI route not found")]
  UpiNotFound,

  #[error("Admin not found")]
  AdminNotFound,

  #[error("Invalid arguments: {0}")]
  InvalidArgs(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  /// Text safe to show in chat. Infrastructure details stay in the logs.
  pub fn user_message(&self) -> String {
    match self {
      Error::Database(_) | Error::Telegram(_) | Error::Internal(_) => {
        "An error occurred. Please try again later.".into()
      }
      Error::Unauthorized => "Unauthorized!".into(),
      Error::PackageNotFound => "❌ Package not found!".into(),
      Error::PaymentNotConfigured => {
        "❌ Payment method not configured!".into()
      }
      Error::DuplicatePayment => {
        "This transaction ID has already been used.".into()
      }
      Error::ReviewNotFound => "Review not found.".into(),
      Error::UpiNotFound => "UPI route not found.".into(),
      Error::AdminNotFound => "Admin not found.".into(),
      Error::InvalidArgs(msg) => msg.clone(),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
