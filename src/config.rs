use crate::application::workflow::PaymentSettings;
use crate::domain::payment::Amount;
use crate::error::Result;
use crate::infrastructure::razorpay::DEFAULT_RAZORPAY_URL;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

/// Loan document intake service.
///
/// Every option can also be supplied through the environment variable named
/// next to it.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Razorpay API key id
    #[arg(long, env = "RAZORPAY_KEYID")]
    pub razorpay_key_id: String,

    /// Razorpay API key secret
    #[arg(long, env = "RAZORPAY_KEY", hide_env_values = true)]
    pub razorpay_key_secret: String,

    /// Razorpay API base URL
    #[arg(long, env = "RAZORPAY_URL", default_value = DEFAULT_RAZORPAY_URL)]
    pub razorpay_url: String,

    /// Default order amount in major currency units
    #[arg(long, env = "PAYMENT_AMOUNT", default_value = "100.00")]
    pub payment_amount: Decimal,

    /// Default order currency
    #[arg(long, env = "PAYMENT_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Payment link emailed to applicants
    #[arg(long, env = "PAYMENT_URL", default_value = "https://rzp.io/i/W4I0vEutf")]
    pub payment_url: String,

    /// Sender address of payment-link emails
    #[arg(long, env = "SENDMAIL")]
    pub mail_from: String,

    /// HTTP mail relay endpoint. Emails are only logged when unset.
    #[arg(long, env = "MAIL_RELAY_URL")]
    pub mail_relay_url: Option<String>,

    /// Bearer token for the mail relay
    #[arg(long, env = "MAIL_RELAY_TOKEN", hide_env_values = true)]
    pub mail_relay_token: Option<String>,

    /// Timeout for calls to the payment gateway and mail relay, in seconds
    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = 15)]
    pub gateway_timeout_secs: u64,
}

impl Config {
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn payment_settings(&self) -> Result<PaymentSettings> {
        Ok(PaymentSettings {
            amount: Amount::new(self.payment_amount)?,
            currency: self.currency.trim().to_uppercase(),
            payment_url: self.payment_url.clone(),
            mail_from: self.mail_from.clone(),
        })
    }
}
