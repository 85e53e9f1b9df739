//! Implements the `Spreadsheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{SheetProperties, Spreadsheet};
use crate::error::Res;
use anyhow::{bail, Context};
use std::io::Cursor;
use tokio::sync::Mutex;

/// An implementation of the `Spreadsheet` trait that does not use Google sheets. It holds its
/// sheets in memory and, by default, is seeded with some existing data.
pub struct TestSpreadsheet {
    tabs: Mutex<Vec<Tab>>,
}

/// One sheet of the in-memory spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tab {
    properties: SheetProperties,
    rows: Vec<Vec<String>>,
}

impl TestSpreadsheet {
    /// Create a new `TestSpreadsheet` from `(title, rows)` pairs, header row first.
    pub fn new<I, T, R>(sheets: I) -> Self
    where
        I: IntoIterator<Item = (T, R)>,
        T: Into<String>,
        R: IntoIterator<Item = Vec<String>>,
    {
        let tabs = sheets
            .into_iter()
            .enumerate()
            .map(|(ix, (title, rows))| Tab {
                properties: SheetProperties {
                    sheet_id: ix as i64,
                    title: title.into(),
                    index: ix as i64,
                },
                rows: rows.into_iter().collect(),
            })
            .collect();
        Self {
            tabs: Mutex::new(tabs),
        }
    }

    /// Returns a copy of every sheet's rows, in tab order.
    pub async fn snapshot(&self) -> Vec<(String, Vec<Vec<String>>)> {
        self.tabs
            .lock()
            .await
            .iter()
            .map(|tab| (tab.properties.title.clone(), trimmed(&tab.rows)))
            .collect()
    }
}

impl Default for TestSpreadsheet {
    /// Seeds an `Income` and an `Expenses` sheet from the CSV data in this module.
    fn default() -> Self {
        let mut sheets = Vec::new();
        for (title, data) in [(INCOME, INCOME_DATA), (EXPENSES, EXPENSES_DATA)] {
            match load_csv(data) {
                Ok(rows) => sheets.push((title, rows)),
                Err(e) => tracing::error!("Unable to load seed data for {title}: {e:#}"),
            }
        }
        Self::new(sheets)
    }
}

#[async_trait::async_trait]
impl Spreadsheet for TestSpreadsheet {
    async fn sheets(&self) -> Res<Vec<SheetProperties>> {
        Ok(self
            .tabs
            .lock()
            .await
            .iter()
            .map(|tab| tab.properties.clone())
            .collect())
    }

    async fn add_sheet(&self, title: &str, headers: &[String]) -> Res<SheetProperties> {
        let mut tabs = self.tabs.lock().await;
        if tabs.iter().any(|tab| tab.properties.title == title) {
            bail!("A sheet with the name \"{title}\" already exists");
        }
        let next_id = tabs
            .iter()
            .map(|tab| tab.properties.sheet_id + 1)
            .max()
            .unwrap_or_default();
        let properties = SheetProperties {
            sheet_id: next_id,
            title: title.to_string(),
            index: tabs.len() as i64,
        };
        tabs.push(Tab {
            properties: properties.clone(),
            rows: vec![headers.to_vec()],
        });
        Ok(properties)
    }

    async fn get(&self, title: &str) -> Res<Vec<Vec<String>>> {
        let tabs = self.tabs.lock().await;
        let tab = tabs
            .iter()
            .find(|tab| tab.properties.title == title)
            .with_context(|| format!("Unable to parse range: '{title}'!A:ZZ"))?;
        Ok(trimmed(&tab.rows))
    }

    async fn write_row(&self, title: &str, position: usize, values: &[String]) -> Res<()> {
        let mut tabs = self.tabs.lock().await;
        let tab = tabs
            .iter_mut()
            .find(|tab| tab.properties.title == title)
            .with_context(|| format!("Unable to parse range: '{title}'!A{position}"))?;
        if position == 0 {
            bail!("Row positions start at 1");
        }
        if tab.rows.len() < position {
            tab.rows.resize(position, Vec::new());
        }
        let row = &mut tab.rows[position - 1];
        if row.len() < values.len() {
            row.resize(values.len(), String::new());
        }
        row[..values.len()].clone_from_slice(values);
        Ok(())
    }

    async fn append_row(&self, title: &str, values: &[String]) -> Res<usize> {
        let mut tabs = self.tabs.lock().await;
        let tab = tabs
            .iter_mut()
            .find(|tab| tab.properties.title == title)
            .with_context(|| format!("Unable to parse range: '{title}'!A1"))?;
        tab.rows = trimmed(&tab.rows);
        tab.rows.push(values.to_vec());
        Ok(tab.rows.len())
    }

    async fn delete_row(&self, sheet: &SheetProperties, position: usize) -> Res<()> {
        let mut tabs = self.tabs.lock().await;
        let tab = tabs
            .iter_mut()
            .find(|tab| tab.properties.sheet_id == sheet.sheet_id)
            .with_context(|| format!("No grid with id: {}", sheet.sheet_id))?;
        if position == 0 || position > tab.rows.len() {
            bail!("Row {position} is outside of the grid of {}", sheet.title);
        }
        tab.rows.remove(position - 1);
        Ok(())
    }
}

/// Drops trailing rows without any content, as the Google Sheets API does.
fn trimmed(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let len = rows
        .iter()
        .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|ix| ix + 1)
        .unwrap_or_default();
    rows[..len].to_vec()
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false) // Ensure headers are treated as part of the data
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

const INCOME: &str = "Income";
const EXPENSES: &str = "Expenses";

/// Seed income data.
const INCOME_DATA: &str = r##"name,date,source,payment_method,type,value
Salary,10/1/2025,Acme Corp,pix,salary,"$5,200.00"
Freelance Website,10/9/2025,Jane Doe Design,pix,freelance,850
Interest,10/31/2025,Bank A,credit,-,12.37
"##;

/// Seed expense data.
const EXPENSES_DATA: &str = r##"name,date,source,payment_method,type,value
Whole Foods Market,10/20/2025,-,credit,groceries,87.43
Starbucks #2847,10/19/2025,-,debit,coffee,6.75
Shell Gas Station,10/18/2025,-,credit,fuel,52.30
PG&E Electric,10/16/2025,Checking 1,pix,utilities,142.67
"##;
