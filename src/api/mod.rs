//! The gateway to the spreadsheet that stores the transactions.
//!
//! [`Spreadsheet`] is implemented twice: [`GoogleSpreadsheet`] talks to the Google Sheets API and
//! [`TestSpreadsheet`] keeps everything in memory so that the whole app can run, top-to-bottom,
//! without Google.

mod auth;
mod google;
mod test_sheet;

use crate::error::Res;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub(crate) use auth::TokenProvider;
pub(crate) use google::GoogleSpreadsheet;
pub use test_sheet::TestSpreadsheet;

/// OAuth scope required for reading and writing spreadsheet values and structure.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// Environment variable that switches the app to the in-memory spreadsheet.
const TEST_MODE_ENV: &str = "SHEETS_LEDGER_IN_TEST_MODE";

/// The metadata of one sheet (tab) of the spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

/// The operations the app needs from a spreadsheet document. Row positions are 1-based, with the
/// header row at position 1.
#[async_trait::async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Lists the sheets of the spreadsheet, in tab order.
    async fn sheets(&self) -> Res<Vec<SheetProperties>>;

    /// Adds a sheet named `title` whose first row is `headers`.
    async fn add_sheet(&self, title: &str, headers: &[String]) -> Res<SheetProperties>;

    /// Gets every row of the sheet named `title`, header row included. Trailing empty rows are not
    /// returned.
    async fn get(&self, title: &str) -> Res<Vec<Vec<String>>>;

    /// Writes `values` into the row at `position`, starting at column A. Cells to the right of
    /// `values` are left alone.
    async fn write_row(&self, title: &str, position: usize, values: &[String]) -> Res<()>;

    /// Appends `values` as a new row after the last row with content and returns the position it
    /// was stored at. The store picks the position, so concurrent appends never collide.
    async fn append_row(&self, title: &str, values: &[String]) -> Res<usize>;

    /// Deletes the row at `position`, moving the rows below it up by one.
    async fn delete_row(&self, sheet: &SheetProperties, position: usize) -> Res<()>;
}

/// Whether we are using a live Google sheet or the in-memory test sheet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Google,
    Test,
}

impl Mode {
    /// `Mode::Test` when `SHEETS_LEDGER_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// Creates the spreadsheet gateway for `mode`.
pub async fn spreadsheet(config: &Config, mode: Mode) -> Res<Arc<dyn Spreadsheet>> {
    match mode {
        Mode::Google => {
            let token_provider = TokenProvider::new(config).await?;
            let spreadsheet = GoogleSpreadsheet::new(config, token_provider);
            info!("Using Google spreadsheet {}", config.spreadsheet_id());
            Ok(Arc::new(spreadsheet))
        }
        Mode::Test => {
            info!("Using the in-memory test spreadsheet");
            Ok(Arc::new(TestSpreadsheet::default()))
        }
    }
}

/// Builds an A1 range for a row of the sheet named `title`, quoting the title.
fn row_range(title: &str, position: usize) -> String {
    format!("{}!A{position}", quote_title(title))
}

/// Builds an A1 range covering every column of the sheet named `title`.
fn sheet_range(title: &str) -> String {
    format!("{}!A:ZZ", quote_title(title))
}

fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!(sheet_range("Income"), "'Income'!A:ZZ");
        assert_eq!(row_range("Bob's Card", 4), "'Bob''s Card'!A4");
    }

    #[test]
    fn test_sheet_properties_serde() {
        let json = r#"{"sheetId": 42, "title": "Income", "index": 1}"#;
        let props: SheetProperties = serde_json::from_str(json).unwrap();
        assert_eq!(
            props,
            SheetProperties {
                sheet_id: 42,
                title: "Income".to_string(),
                index: 1
            }
        );

        // Google omits zero values, e.g. for the first sheet.
        let props: SheetProperties = serde_json::from_str(r#"{"title": "Sheet1"}"#).unwrap();
        assert_eq!(props.sheet_id, 0);
        assert_eq!(props.index, 0);
    }
}
