use crate::api::Spreadsheet;
use crate::error::Error;
use crate::model::HEADER_VALUES;
use crate::Result;
use tracing::info;

/// Lists the titles of every sheet in the spreadsheet, in tab order.
pub async fn list_sheets(spreadsheet: &dyn Spreadsheet) -> Result<Vec<String>> {
    let sheets = spreadsheet.sheets().await.map_err(Error::gateway)?;
    Ok(sheets.into_iter().map(|sheet| sheet.title).collect())
}

/// Adds a sheet named `name` with the standard header row.
///
/// Sheet titles are compared case-insensitively, so `expenses` collides with `Expenses`.
pub async fn create_sheet(spreadsheet: &dyn Spreadsheet, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MissingParameter(
            "Sheet name must be in body.".to_string(),
        ));
    }

    let lowercase = name.to_lowercase();
    let sheets = spreadsheet.sheets().await.map_err(Error::gateway)?;
    if sheets
        .iter()
        .any(|sheet| sheet.title.to_lowercase() == lowercase)
    {
        return Err(Error::DuplicateName(name.to_string()));
    }

    let headers: Vec<String> = HEADER_VALUES.iter().map(|f| f.header()).collect();
    let sheet = spreadsheet
        .add_sheet(name, &headers)
        .await
        .map_err(Error::gateway)?;
    info!("Created sheet {} with id {}", sheet.title, sheet.sheet_id);
    Ok(())
}
