//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{Spreadsheet, TestSpreadsheet};
use axum::Router;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Test environment that holds an in-memory spreadsheet. The spreadsheet can be handed to the
/// commands directly, or served through the HTTP router, and inspected afterwards.
pub struct TestEnv {
    spreadsheet: Arc<TestSpreadsheet>,
}

impl TestEnv {
    /// Creates a test environment seeded with the `Income` and `Expenses` sample sheets.
    pub fn new() -> Self {
        Self {
            spreadsheet: Arc::new(TestSpreadsheet::default()),
        }
    }

    /// Creates a test environment holding exactly the given sheets.
    pub fn with_sheets<T>(sheets: Vec<(T, Vec<Vec<String>>)>) -> Self
    where
        T: Into<String>,
    {
        Self {
            spreadsheet: Arc::new(TestSpreadsheet::new(sheets)),
        }
    }

    pub fn spreadsheet(&self) -> &dyn Spreadsheet {
        self.spreadsheet.as_ref()
    }

    /// An HTTP router backed by this environment's spreadsheet.
    pub fn router(&self) -> Router {
        crate::server::router(self.spreadsheet.clone())
    }

    /// The current rows of the sheet titled `title`, header row included.
    pub async fn rows(&self, title: &str) -> Vec<Vec<String>> {
        self.spreadsheet
            .snapshot()
            .await
            .into_iter()
            .find(|(t, _)| t == title)
            .map(|(_, rows)| rows)
            .unwrap_or_else(|| panic!("no sheet named {title}"))
    }
}

/// Unwraps a `json!` object literal into the map the commands take.
pub fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}
