//! Settlement API client confirming a buyer's transaction reference.
//!
//! One attempt per submission. Transport failures and timeouts come back as
//! [`Verdict::Error`] and share the failure path with [`Verdict::Failed`].

use reqwest::Client;
use serde::Deserialize;

use crate::prelude::*;

/// What the settlement API reported for a successful payment
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
  pub amount: f64,
  pub payer: Option<String>,
  pub app: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
  Success(Receipt),
  Failed(String),
  Error(String),
}

#[async_trait]
pub trait Verifier: Send + Sync {
  /// `credential` is the API token from the settings table, if configured.
  async fn verify(
    &self,
    credential: Option<&str>,
    reference: &str,
    expected: f64,
  ) -> Verdict;
}

/// Raw API response. `amount` arrives either as a number or as a string.
#[derive(Debug, Default, Deserialize)]
pub struct Response {
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub amount: Option<json::Value>,
  #[serde(default)]
  pub payer: Option<String>,
  #[serde(default)]
  pub app: Option<String>,
}

fn coerce_amount(value: Option<&json::Value>) -> Option<f64> {
  match value? {
    json::Value::Number(number) => number.as_f64(),
    json::Value::String(text) => text.trim().parse().ok(),
    _ => None,
  }
}

/// Success requires a `SUCCESS` status and an exact amount match.
pub fn evaluate(response: Response, expected: f64) -> Verdict {
  let amount = coerce_amount(response.amount.as_ref());
  let status = response.status.as_deref().unwrap_or("UNKNOWN");

  match amount {
    Some(amount) if status == "SUCCESS" && amount == expected => {
      Verdict::Success(Receipt {
        amount,
        payer: response.payer,
        app: response.app,
      })
    }
    _ => Verdict::Failed(format!(
      "Verification failed. Status: {}, Amount: {}",
      status,
      amount.map(utils::format_amount).unwrap_or_else(|| "N/A".into())
    )),
  }
}

pub struct HttpVerifier {
  client: Client,
  endpoint: String,
}

impl HttpVerifier {
  pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build().map_err(|err| {
      Error::Internal(format!("Failed to build HTTP client: {err}"))
    })?;

    Ok(Self { client, endpoint: endpoint.into() })
  }

  async fn fetch(
    &self,
    credential: &str,
    reference: &str,
  ) -> reqwest::Result<Response> {
    self
      .client
      .get(&self.endpoint)
      .query(&[("token", credential), ("txn_id", reference)])
      .send()
      .await?
      .json()
      .await
  }
}

#[async_trait]
impl Verifier for HttpVerifier {
  async fn verify(
    &self,
    credential: Option<&str>,
    reference: &str,
    expected: f64,
  ) -> Verdict {
    let Some(credential) = credential.filter(|token| !token.is_empty()) else {
      return Verdict::Error("API configuration not found".into());
    };

    match self.fetch(credential, reference).await {
      Ok(response) => {
        let verdict = evaluate(response, expected);
        debug!("Verification of `{reference}`: {verdict:?}");
        verdict
      }
      Err(err) => {
        error!("Verification API error for `{reference}`: {err}");
        Verdict::Error(if err.is_timeout() {
          "Verification service timed out".into()
        } else {
          "Verification service unavailable".into()
        })
      }
    }
  }
}
