//! Command handlers for the sheets-ledger API.
//!
//! Each command takes the spreadsheet gateway, re-reads whatever it needs from the spreadsheet and
//! returns an [`Error`](crate::Error) that the HTTP layer can render. Nothing here knows about HTTP.

mod sheets;
mod transactions;

use crate::api::{SheetProperties, Spreadsheet};
use crate::error::Error;
use crate::model::Rows;
use crate::Result;

pub use sheets::{create_sheet, list_sheets};
pub use transactions::{
    create_transaction, delete_transaction, list_transactions, update_transaction,
};

/// Finds the sheet titled exactly `title`.
async fn find_sheet(spreadsheet: &dyn Spreadsheet, title: &str) -> Result<SheetProperties> {
    spreadsheet
        .sheets()
        .await
        .map_err(Error::gateway)?
        .into_iter()
        .find(|sheet| sheet.title == title)
        .ok_or_else(|| Error::sheet_not_found(title))
}

/// Reads every row of the sheet titled `title`.
async fn read_rows(spreadsheet: &dyn Spreadsheet, title: &str) -> Result<Rows> {
    let data = spreadsheet.get(title).await.map_err(Error::gateway)?;
    Rows::new(data).map_err(Error::gateway)
}

/// Parses the synthetic row number from a path segment. Anything that is not a non-negative
/// integer cannot name a row.
fn parse_row_number(transaction_row: &str) -> Result<usize> {
    transaction_row
        .trim()
        .parse()
        .map_err(|_| Error::row_not_found(transaction_row))
}
