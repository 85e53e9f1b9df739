use crate::api::Spreadsheet;
use crate::commands::{find_sheet, parse_row_number, read_rows};
use crate::error::Error;
use crate::model::{
    normalize_date, validate_fields, Field, Rows, SheetRow, Transaction, EMPTY_TEXT, HEADER_VALUES,
};
use crate::Result;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Lists the transactions of the sheet titled `sheet`. Blank rows and rows that do not hold a
/// valid transaction are skipped but still count toward the row numbers of the rows after them.
pub async fn list_transactions(
    spreadsheet: &dyn Spreadsheet,
    sheet: &str,
) -> Result<Vec<Transaction>> {
    let sheet = find_sheet(spreadsheet, sheet).await?;
    let rows = read_rows(spreadsheet, &sheet.title).await?;
    let transactions: Vec<Transaction> = rows
        .iter()
        .filter_map(|row| match Transaction::from_row(row) {
            Ok(transaction) => Some(transaction),
            Err(e) => {
                warn!(
                    "Skipping row {} of {}: {e}",
                    row.row_number(),
                    sheet.title
                );
                None
            }
        })
        .collect();
    debug!("Read {} transactions from {}", transactions.len(), sheet.title);
    Ok(transactions)
}

/// Appends a transaction built from `body` to the sheet titled `sheet`.
///
/// `name`, `value` and `payment_method` must be present. A missing `date` becomes today, and a
/// missing or empty `source` or `type` becomes `-`.
pub async fn create_transaction(
    spreadsheet: &dyn Spreadsheet,
    sheet: &str,
    body: &Map<String, Value>,
) -> Result<Transaction> {
    let sheet = find_sheet(spreadsheet, sheet).await?;

    let mut patch = validate_fields(body)?;
    if let Some(field) = patch.first_missing_required() {
        return Err(Error::MissingRequiredField(field));
    }
    patch.date = Some(normalize_date(patch.date.as_deref()));
    patch.source = Some(or_empty_text(patch.source.take()));
    patch.r#type = Some(or_empty_text(patch.r#type.take()));

    let mut rows = read_rows(spreadsheet, &sheet.title).await?;
    let mut row = rows.new_row();
    row.apply(&patch);
    let mut transaction = translate(&row)?;

    write_headers(spreadsheet, &sheet.title, &mut rows, HEADER_VALUES).await?;
    let position = spreadsheet
        .append_row(&sheet.title, &row.values(rows.headers()))
        .await
        .map_err(Error::gateway)?;
    row.set_position(position);
    transaction.row_number = row.row_number();

    info!(
        "Created transaction {} in {}",
        transaction.row_number, sheet.title
    );
    Ok(transaction)
}

/// Merges the fields in `body` onto the transaction at `transaction_row`. Fields and columns that
/// `body` does not mention keep their stored values.
pub async fn update_transaction(
    spreadsheet: &dyn Spreadsheet,
    sheet: &str,
    transaction_row: &str,
    body: &Map<String, Value>,
) -> Result<Transaction> {
    let sheet = find_sheet(spreadsheet, sheet).await?;
    let row_number = parse_row_number(transaction_row)?;
    let mut rows = read_rows(spreadsheet, &sheet.title).await?;
    let mut row = rows
        .get(row_number)
        .cloned()
        .ok_or_else(|| Error::row_not_found(transaction_row))?;

    let mut patch = validate_fields(body)?;
    if let Some(date) = patch.date.take() {
        patch.date = Some(normalize_date(Some(&date)));
    }

    row.apply(&patch);
    let transaction = translate(&row)?;
    let fields = patch.cells().into_iter().map(|(field, _)| field);
    write_headers(spreadsheet, &sheet.title, &mut rows, fields).await?;
    spreadsheet
        .write_row(&sheet.title, row.position(), &row.values(rows.headers()))
        .await
        .map_err(Error::gateway)?;

    info!(
        "Updated transaction {} in {}",
        transaction.row_number, sheet.title
    );
    Ok(transaction)
}

/// Deletes the transaction at `transaction_row`. The rows after it move up, so their row numbers
/// drop by one.
pub async fn delete_transaction(
    spreadsheet: &dyn Spreadsheet,
    sheet: &str,
    transaction_row: &str,
) -> Result<()> {
    let sheet = find_sheet(spreadsheet, sheet).await?;
    let row_number = parse_row_number(transaction_row)?;
    let rows = read_rows(spreadsheet, &sheet.title).await?;
    let row = rows
        .get(row_number)
        .ok_or_else(|| Error::row_not_found(transaction_row))?;

    spreadsheet
        .delete_row(&sheet, row.position())
        .await
        .map_err(Error::gateway)?;

    info!("Deleted transaction {row_number} from {}", sheet.title);
    Ok(())
}

/// Writes the header row when the sheet has none yet or when it lacks a column for one of
/// `fields`, so that every cell written next lands under its header.
async fn write_headers(
    spreadsheet: &dyn Spreadsheet,
    title: &str,
    rows: &mut Rows,
    fields: impl IntoIterator<Item = Field>,
) -> Result<()> {
    let added = rows.add_headers(fields);
    if added || rows.needs_header_row() {
        debug!("Writing the header row of {title}");
        spreadsheet
            .write_row(title, 1, rows.headers())
            .await
            .map_err(Error::gateway)?;
    }
    Ok(())
}

fn translate(row: &SheetRow) -> Result<Transaction> {
    Transaction::from_row(row).map_err(|source| Error::MalformedRow {
        row_number: row.row_number(),
        source,
    })
}

fn or_empty_text(value: Option<String>) -> String {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => EMPTY_TEXT.to_string(),
    }
}
