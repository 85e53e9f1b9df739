//! Maps the raw values of a sheet onto header-keyed rows that remember their storage position.

use crate::error::Res;
use crate::model::{Field, HEADER_VALUES};
use anyhow::bail;
use std::collections::{BTreeMap, HashSet};

/// Storage position of the header row.
const HEADER_POSITION: usize = 1;

/// Offset between a row's storage position and the zero-based index shown to clients: one for the
/// header row and one for the 1-based storage positions.
const ROW_NUMBER_OFFSET: usize = 2;

/// Converts a 1-based storage position to the zero-based synthetic row number.
pub fn row_number(position: usize) -> usize {
    position.saturating_sub(ROW_NUMBER_OFFSET)
}

/// The contents of one sheet: its header row and its data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    headers: Vec<String>,
    /// Whether `headers` came from the sheet or were supplied because the sheet was empty.
    has_header_row: bool,
    rows: Vec<SheetRow>,
}

impl Rows {
    /// Parses the values of a sheet as returned by the gateway, header row first. An empty sheet
    /// is given the standard header row.
    pub fn new<S, R>(sheet_data: impl IntoIterator<Item = R>) -> Res<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let mut values = sheet_data.into_iter();
        let (headers, has_header_row) = match values.next() {
            Some(header_row) => {
                let headers: Vec<String> = header_row.into_iter().map(Into::into).collect();
                if headers.iter().all(|h| h.trim().is_empty()) {
                    (default_headers(), false)
                } else {
                    (headers, true)
                }
            }
            None => (default_headers(), false),
        };

        let mut seen = HashSet::new();
        if let Some(duplicate) = headers
            .iter()
            .filter(|h| !h.is_empty())
            .find(|h| !seen.insert(h.as_str()))
        {
            bail!("The header '{duplicate}' appears more than once");
        }

        // Cells to the right of the last header belong to no field and are not read
        let rows = values
            .enumerate()
            .map(|(ix, row)| SheetRow {
                position: HEADER_POSITION + 1 + ix,
                cells: headers
                    .iter()
                    .cloned()
                    .zip(
                        row.into_iter()
                            .map(Into::into)
                            .chain(std::iter::repeat(String::new())),
                    )
                    .collect(),
            })
            .collect();

        Ok(Self {
            headers,
            has_header_row,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether the header row must still be written before any data row.
    pub fn needs_header_row(&self) -> bool {
        !self.has_header_row
    }

    /// The data rows that hold anything at all, in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = &SheetRow> {
        self.rows.iter().filter(|row| !row.is_blank())
    }

    /// Finds the row with the given synthetic row number. Blank rows do not exist.
    pub fn get(&self, row_number: usize) -> Option<&SheetRow> {
        self.rows.get(row_number).filter(|row| !row.is_blank())
    }

    /// Appends a header for every field in `fields` that the sheet does not have yet. Returns
    /// whether any header was added, in which case the header row must be written again.
    pub fn add_headers(&mut self, fields: impl IntoIterator<Item = Field>) -> bool {
        let mut added = false;
        for field in fields {
            let header = field.header();
            if !self.headers.contains(&header) {
                self.headers.push(header);
                added = true;
            }
        }
        added
    }

    /// An empty row that is not stored yet. Its position is set once it has been appended.
    pub fn new_row(&self) -> SheetRow {
        SheetRow {
            position: 0,
            cells: self
                .headers
                .iter()
                .map(|h| (h.clone(), String::new()))
                .collect(),
        }
    }
}

fn default_headers() -> Vec<String> {
    HEADER_VALUES.iter().map(|f| f.header()).collect()
}

/// One data row of a sheet, keyed by header text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    position: usize,
    cells: BTreeMap<String, String>,
}

impl SheetRow {
    /// The 1-based storage position of this row.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Records where the row was stored.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn row_number(&self) -> usize {
        row_number(self.position)
    }

    pub fn cell(&self, field: Field) -> &str {
        self.cells
            .get(&field.header())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.cells.insert(field.header(), value.into());
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }

    /// The cell values in the order of `headers`, ready to be written to the sheet.
    pub fn values(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.cells.get(h).cloned().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Vec<Vec<&'static str>> {
        vec![
            vec!["name", "date", "source", "payment_method", "type", "value", "note"],
            vec!["Salary", "1/5/2024", "Employer", "credit", "income", "1000", ""],
            vec!["Rent", "1/6/2024", "-", "pix", "housing", "-800", "January"],
            vec![],
            vec!["Coffee", "1/7/2024", "-", "debit", "-", "4.5"],
        ]
    }

    #[test]
    fn test_row_number_is_position_minus_two() {
        assert_eq!(row_number(2), 0);
        assert_eq!(row_number(5), 3);
    }

    #[test]
    fn test_positions() {
        let rows = Rows::new(sheet()).unwrap();
        let positions: Vec<usize> = rows.iter().map(SheetRow::position).collect();
        assert_eq!(positions, vec![2, 3, 5]);
        let numbers: Vec<usize> = rows.iter().map(SheetRow::row_number).collect();
        assert_eq!(numbers, vec![0, 1, 3]);
        assert!(!rows.needs_header_row());
    }

    #[test]
    fn test_cells_by_header() {
        let rows = Rows::new(sheet()).unwrap();
        let rent = rows.get(1).unwrap();
        assert_eq!(rent.cell(Field::Name), "Rent");
        assert_eq!(rent.cell(Field::PaymentMethod), "pix");
        assert_eq!(rent.cell(Field::Value), "-800");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let rows = Rows::new(sheet()).unwrap();
        let coffee = rows.get(3).unwrap();
        assert_eq!(
            coffee.values(rows.headers()),
            vec!["Coffee", "1/7/2024", "-", "debit", "-", "4.5", ""]
        );
    }

    #[test]
    fn test_blank_rows_do_not_exist() {
        let rows = Rows::new(sheet()).unwrap();
        assert!(rows.get(2).is_none());
        assert!(rows.get(4).is_none());
    }

    #[test]
    fn test_cells_past_the_header_are_ignored() {
        let data = vec![vec!["name", "value"], vec!["Salary", "1000", "a note"]];
        let rows = Rows::new(data).unwrap();
        let salary = rows.get(0).unwrap();
        assert_eq!(salary.values(rows.headers()), vec!["Salary", "1000"]);
    }

    #[test]
    fn test_add_headers() {
        let data = vec![vec!["name", "value"], vec!["Salary", "1000"]];
        let mut rows = Rows::new(data).unwrap();
        assert!(!rows.add_headers([Field::Name, Field::Value]));
        assert!(rows.add_headers([Field::Name, Field::Source, Field::Type]));
        assert_eq!(rows.headers(), ["name", "value", "source", "type"]);
        let salary = rows.get(0).unwrap();
        assert_eq!(salary.values(rows.headers()), vec!["Salary", "1000", "", ""]);
    }

    #[test]
    fn test_duplicate_header_is_an_error() {
        let data = vec![vec!["name", "value", "name"]];
        assert!(Rows::new(data).is_err());
    }

    #[test]
    fn test_empty_sheet_gets_default_headers() {
        let rows = Rows::new(Vec::<Vec<String>>::new()).unwrap();
        assert!(rows.needs_header_row());
        assert_eq!(
            rows.headers(),
            ["name", "date", "source", "payment_method", "type", "value"]
        );
        assert!(rows.new_row().is_blank());
    }

    #[test]
    fn test_values_follow_header_order() {
        let headers: Vec<String> = vec!["value".into(), "name".into(), "other".into()];
        let mut row = SheetRow::default();
        row.set(Field::Name, "Salary");
        row.set(Field::Value, "1000");
        assert_eq!(row.values(&headers), vec!["1000", "Salary", ""]);
    }
}
