use crate::model::{Amount, Field, FieldError, PaymentMethod, SheetRow, TransactionPatch};
use serde::Serialize;
use std::str::FromStr;

/// Default text for the optional `source` and `type` fields.
pub const EMPTY_TEXT: &str = "-";

/// A transaction as shown to clients: one row of a sheet plus its synthetic row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub row_number: usize,
    pub name: String,
    pub date: String,
    pub source: String,
    pub payment_method: PaymentMethod,
    #[serde(rename = "type")]
    pub r#type: String,
    pub value: Amount,
}

impl Transaction {
    /// Reads a transaction out of a stored row. Fails when a cell holds something that cannot be
    /// represented, e.g. a `value` that is not a number.
    pub fn from_row(row: &SheetRow) -> Result<Self, FieldError> {
        let payment_method = row.cell(Field::PaymentMethod).trim();
        if payment_method.is_empty() {
            return Err(FieldError::MissingRequired(Field::PaymentMethod));
        }
        let payment_method = PaymentMethod::parse(payment_method)?;

        let value = Amount::from_str(row.cell(Field::Value)).map_err(|e| FieldError::Invalid {
            field: Field::Value,
            reason: format!("not a number ({e})"),
        })?;

        Ok(Self {
            row_number: row.row_number(),
            name: row.cell(Field::Name).to_string(),
            date: row.cell(Field::Date).to_string(),
            source: row.cell(Field::Source).to_string(),
            payment_method,
            r#type: row.cell(Field::Type).to_string(),
            value,
        })
    }
}

impl SheetRow {
    /// Overwrites the cells named by `patch`, leaving every other cell untouched.
    pub fn apply(&mut self, patch: &TransactionPatch) {
        for (field, value) in patch.cells() {
            self.set(field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rows;
    use rust_decimal::Decimal;

    fn rows() -> Rows {
        Rows::new(vec![
            vec!["name", "date", "source", "payment_method", "type", "value", "note"],
            vec!["Salary", "1/5/2024", "Employer", "credit", "income", "$1,000.00", "x"],
            vec!["Rent", "1/6/2024", "-", "cash", "housing", "-800", ""],
            vec!["Gift", "1/8/2024", "-", "pix", "-", "lots", ""],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_row() {
        let rows = rows();
        let transaction = Transaction::from_row(rows.get(0).unwrap()).unwrap();
        assert_eq!(transaction.row_number, 0);
        assert_eq!(transaction.name, "Salary");
        assert_eq!(transaction.date, "1/5/2024");
        assert_eq!(transaction.source, "Employer");
        assert_eq!(transaction.payment_method, PaymentMethod::Credit);
        assert_eq!(transaction.r#type, "income");
        assert_eq!(transaction.value.value(), Decimal::from(1000));
    }

    #[test]
    fn test_from_row_bad_payment_method() {
        let rows = rows();
        let err = Transaction::from_row(rows.get(1).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            FieldError::Invalid {
                field: Field::PaymentMethod,
                ..
            }
        ));
    }

    #[test]
    fn test_from_row_payment_method_ignores_case() {
        let rows = Rows::new(vec![
            vec!["name", "date", "source", "payment_method", "type", "value"],
            vec!["Salary", "1/5/2024", "Employer", "Credit", "income", "1000"],
        ])
        .unwrap();
        let transaction = Transaction::from_row(rows.get(0).unwrap()).unwrap();
        assert_eq!(transaction.payment_method, PaymentMethod::Credit);
    }

    #[test]
    fn test_from_row_bad_value() {
        let rows = rows();
        let err = Transaction::from_row(rows.get(2).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            FieldError::Invalid {
                field: Field::Value,
                ..
            }
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let rows = rows();
        let transaction = Transaction::from_row(rows.get(0).unwrap()).unwrap();
        assert_eq!(
            serde_json::to_value(&transaction).unwrap(),
            serde_json::json!({
                "row_number": 0,
                "name": "Salary",
                "date": "1/5/2024",
                "source": "Employer",
                "payment_method": "credit",
                "type": "income",
                "value": 1000,
            })
        );
    }

    #[test]
    fn test_apply_keeps_untouched_cells() {
        let rows = rows();
        let mut row = rows.get(0).unwrap().clone();
        row.apply(&TransactionPatch {
            value: Some(Amount::from_str("1200").unwrap()),
            ..Default::default()
        });
        assert_eq!(
            row.values(rows.headers()),
            vec!["Salary", "1/5/2024", "Employer", "credit", "income", "1200", "x"]
        );
    }
}
