//! Implements the `Spreadsheet` trait against the Google Sheets API.
//!
//! Cell values are read and written with `sheets::Client`. Spreadsheet metadata and structural
//! changes (adding a sheet, deleting a row) go straight to the REST API with `reqwest`.

use crate::api::{row_range, sheet_range, SheetProperties, Spreadsheet, TokenProvider};
use crate::error::Res;
use crate::Config;
use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{json, Value};
use sheets::types::{
    BatchUpdateValuesRequest, DateTimeRenderOption, Dimension, InsertDataOption, ValueInputOption,
    ValueRange, ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Implements the `Spreadsheet` trait using the `sheets::Client` to interact with a Google sheet.
/// A fresh client is created for every call from the token that the `TokenProvider` keeps current.
pub(crate) struct GoogleSpreadsheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
    http: reqwest::Client,
}

impl GoogleSpreadsheet {
    pub(crate) fn new(config: &Config, token_provider: TokenProvider) -> Self {
        Self {
            spreadsheet_id: config.spreadsheet_id().to_string(),
            token_provider,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a new sheets client with a current access token.
    async fn client(&self) -> Res<sheets::Client> {
        let access_token = self.token_provider.token().await?;

        // The sheets crate requires client_id, client_secret, redirect_uri and refresh_token, but
        // only the access token is used for API calls.
        Ok(sheets::Client::new(
            String::new(),
            String::new(),
            String::new(),
            access_token,
            String::new(),
        ))
    }

    /// Sends a `spreadsheets.batchUpdate` with a single request and returns its reply.
    async fn batch_update(&self, request: Value) -> Res<Value> {
        let url = format!("{SHEETS_API}/{}:batchUpdate", self.spreadsheet_id);
        let token = self.token_provider.token().await?;
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "requests": [request] }))
            .send()
            .await
            .context("Failed to send batchUpdate request to Google Sheets API")?;

        let body: BatchUpdateResponse = parse_response(response, "batchUpdate").await?;
        Ok(body.replies.into_iter().next().unwrap_or(Value::Null))
    }

    async fn write_values(&self, range: String, values: Vec<Vec<String>>) -> Res<()> {
        let request = BatchUpdateValuesRequest {
            data: vec![ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: range.clone(),
                values,
            }],
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::UserEntered),
        };

        self.client()
            .await?
            .spreadsheets()
            .values_batch_update(&self.spreadsheet_id, &request)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to write range {range}"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Spreadsheet for GoogleSpreadsheet {
    async fn sheets(&self) -> Res<Vec<SheetProperties>> {
        trace!("sheets for {}", self.spreadsheet_id);
        let url = format!("{SHEETS_API}/{}", self.spreadsheet_id);
        let token = self.token_provider.token().await?;
        let response = self
            .http
            .get(&url)
            .query(&[("fields", "sheets.properties(sheetId,title,index)")])
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send spreadsheet metadata request to Google Sheets API")?;

        let metadata: SpreadsheetMetadata = parse_response(response, "get").await?;
        let mut sheets: Vec<SheetProperties> =
            metadata.sheets.into_iter().map(|s| s.properties).collect();
        sheets.sort_by_key(|s| s.index);
        Ok(sheets)
    }

    async fn add_sheet(&self, title: &str, headers: &[String]) -> Res<SheetProperties> {
        trace!("add_sheet {title}");
        let reply = self
            .batch_update(json!({ "addSheet": { "properties": { "title": title } } }))
            .await
            .with_context(|| format!("Failed to add sheet {title}"))?;

        let properties = reply
            .get("addSheet")
            .and_then(|v| v.get("properties"))
            .cloned()
            .context("Google Sheets API addSheet reply is missing 'properties'")?;
        let properties: SheetProperties = serde_json::from_value(properties)
            .context("Failed to parse the properties of the new sheet")?;

        self.write_values(row_range(title, 1), vec![headers.to_vec()])
            .await
            .with_context(|| format!("Failed to write the header row of {title}"))?;
        Ok(properties)
    }

    async fn get(&self, title: &str) -> Res<Vec<Vec<String>>> {
        trace!("get for {title}");
        let response = self
            .client()
            .await?
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                &sheet_range(title),
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {title} sheet data"))?;
        Ok(response.body.values)
    }

    async fn write_row(&self, title: &str, position: usize, values: &[String]) -> Res<()> {
        trace!("write_row {title} at {position}");
        self.write_values(row_range(title, position), vec![values.to_vec()])
            .await
    }

    async fn append_row(&self, title: &str, values: &[String]) -> Res<usize> {
        trace!("append_row {title}");
        let range = sheet_range(title);
        let body = ValueRange {
            major_dimension: Some(Dimension::Rows),
            range: range.clone(),
            values: vec![values.to_vec()],
        };
        let response = self
            .client()
            .await?
            .spreadsheets()
            .values_append(
                &self.spreadsheet_id,
                &range,
                false,
                InsertDataOption::InsertRows,
                DateTimeRenderOption::FormattedString,
                ValueRenderOption::FormattedValue,
                ValueInputOption::UserEntered,
                &body,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to append a row to {title}"))?;

        let updates = response
            .body
            .updates
            .context("Google Sheets API append reply is missing 'updates'")?;
        position_from_range(&updates.updated_range)
    }

    async fn delete_row(&self, sheet: &SheetProperties, position: usize) -> Res<()> {
        trace!("delete_row {} at {position}", sheet.title);
        if position < 2 {
            bail!("Refusing to delete the header row of {}", sheet.title);
        }
        self.batch_update(json!({
            "deleteDimension": {
                "range": {
                    "sheetId": sheet.sheet_id,
                    "dimension": "ROWS",
                    "startIndex": position - 1,
                    "endIndex": position,
                }
            }
        }))
        .await
        .with_context(|| format!("Failed to delete row {position} of {}", sheet.title))?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetEntry {
    #[serde(default)]
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Value>,
}

/// Checks the status of a Google API response and parses its JSON body.
async fn parse_response<T>(response: reqwest::Response, what: &str) -> Res<T>
where
    T: serde::de::DeserializeOwned,
{
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        bail!("Google Sheets API {what} failed with status {status}: {body}");
    }
    response
        .json()
        .await
        .with_context(|| format!("Failed to parse Google Sheets API {what} response"))
}

/// Returns the row of the first cell of an A1 range such as `'Income'!A5:F5`.
fn position_from_range(range: &str) -> Res<usize> {
    let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
    let start = cells.split(':').next().unwrap_or_default();
    start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .with_context(|| format!("Unable to find the row of range '{range}'"))
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}
