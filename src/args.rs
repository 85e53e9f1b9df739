//! This struct provides the CLI interface for the sheets-ledger server.

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

/// sheets-ledger: An HTTP API for financial transactions kept in a Google sheet.
///
/// Each sheet (tab) of the spreadsheet is a collection of transactions with the columns name,
/// date, source, payment_method, type and value. The server lists and creates sheets, and lists,
/// creates, updates and deletes the transactions in them.
///
/// Every option can also be given as an environment variable, and a `.env` file in the working
/// directory is loaded into the environment at startup.
///
/// Access to the spreadsheet is through a Google service account. Share the spreadsheet with the
/// service account's email address and give it editor access.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The ID of the Google spreadsheet, or its full URL. The URL looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long, env = "SPREADSHEET_ID")]
    spreadsheet_id: String,

    /// The email address of the Google service account.
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT_EMAIL")]
    service_account_email: Option<String>,

    /// The PEM private key of the Google service account. Escaped newlines (`\n`) are allowed.
    #[arg(
        long,
        env = "GOOGLE_PRIVATE_KEY",
        hide_env_values = true,
        allow_hyphen_values = true
    )]
    private_key: Option<String>,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// The port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn service_account_email(&self) -> Option<&str> {
        self.service_account_email.as_deref()
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
