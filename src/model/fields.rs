//! The recognized transaction fields and the validation of client-supplied field maps.

use crate::model::Amount;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// The columns of a transactions sheet, in the order they are written to a new sheet's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Date,
    Source,
    PaymentMethod,
    Type,
    Value,
}

serde_plain::derive_display_from_serialize!(Field);
serde_plain::derive_fromstr_from_deserialize!(Field);

/// Header row written to every sheet created through the API.
pub const HEADER_VALUES: [Field; 6] = [
    Field::Name,
    Field::Date,
    Field::Source,
    Field::PaymentMethod,
    Field::Type,
    Field::Value,
];

impl Field {
    /// Fields that may not be present-but-empty, and must be present to create a transaction.
    pub const REQUIRED: [Field; 3] = [Field::Name, Field::Value, Field::PaymentMethod];

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    /// The header text of this field's column.
    pub fn header(self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    Debit,
    Pix,
}

serde_plain::derive_display_from_serialize!(PaymentMethod);
serde_plain::derive_fromstr_from_deserialize!(PaymentMethod);

impl PaymentMethod {
    /// Parses a payment method ignoring case and surrounding whitespace, e.g. ` Credit `.
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        PaymentMethod::from_str(&s.trim().to_lowercase()).map_err(|_| {
            FieldError::invalid(
                Field::PaymentMethod,
                format!("'{s}' is not one of credit, debit, pix"),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("the {0} field is required")]
    MissingRequired(Field),

    #[error("the {field} field is invalid: {reason}")]
    Invalid { field: Field, reason: String },
}

impl FieldError {
    fn invalid(field: Field, reason: impl Into<String>) -> Self {
        FieldError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A partial transaction: only the recognized fields that a client actually sent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionPatch {
    pub name: Option<String>,
    pub date: Option<String>,
    pub source: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub r#type: Option<String>,
    pub value: Option<Amount>,
}

impl TransactionPatch {
    /// The cell text for every field present in the patch, in header order.
    pub fn cells(&self) -> Vec<(Field, String)> {
        let mut cells = Vec::new();
        if let Some(name) = &self.name {
            cells.push((Field::Name, name.clone()));
        }
        if let Some(date) = &self.date {
            cells.push((Field::Date, date.clone()));
        }
        if let Some(source) = &self.source {
            cells.push((Field::Source, source.clone()));
        }
        if let Some(payment_method) = self.payment_method {
            cells.push((Field::PaymentMethod, payment_method.to_string()));
        }
        if let Some(r#type) = &self.r#type {
            cells.push((Field::Type, r#type.clone()));
        }
        if let Some(value) = self.value {
            cells.push((Field::Value, value.to_string()));
        }
        cells
    }

    /// The first required field, in header order, that this patch does not carry.
    pub fn first_missing_required(&self) -> Option<Field> {
        if self.name.is_none() {
            Some(Field::Name)
        } else if self.value.is_none() {
            Some(Field::Value)
        } else if self.payment_method.is_none() {
            Some(Field::PaymentMethod)
        } else {
            None
        }
    }

    fn set(&mut self, field: Field, value: &Value) -> Result<(), FieldError> {
        match field {
            Field::Name => self.name = Some(text(field, value)?),
            Field::Date => self.date = Some(text(field, value)?),
            Field::Source => self.source = Some(text(field, value)?),
            Field::Type => self.r#type = Some(text(field, value)?),
            Field::PaymentMethod => {
                let s = value
                    .as_str()
                    .ok_or_else(|| FieldError::invalid(field, "expected one of credit, debit, pix"))?;
                self.payment_method = Some(PaymentMethod::parse(s)?);
            }
            Field::Value => {
                let amount = match value {
                    Value::Number(n) => Amount::from_str(&n.to_string()),
                    Value::String(s) => Amount::from_str(s),
                    _ => return Err(FieldError::invalid(field, "expected a number")),
                }
                .map_err(|e| FieldError::invalid(field, format!("not a number ({e})")))?;
                self.value = Some(amount);
            }
        }
        Ok(())
    }
}

/// Filters `input` down to the recognized transaction fields.
///
/// Keys are visited in request order. A required field that is present but empty (`null`,
/// `false`, `""` or `0`) fails with [`FieldError::MissingRequired`]; unrecognized keys are
/// dropped. Absent fields stay `None`, so the result can be merged onto an existing row.
pub fn validate_fields(input: &Map<String, Value>) -> Result<TransactionPatch, FieldError> {
    let mut patch = TransactionPatch::default();
    for (key, value) in input {
        let Ok(field) = Field::from_str(key) else {
            continue;
        };
        if field.is_required() && is_empty(value) {
            return Err(FieldError::MissingRequired(field));
        }
        patch.set(field, value)?;
    }
    Ok(patch)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn text(field: Field, value: &Value) -> Result<String, FieldError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => Err(FieldError::invalid(field, "expected text")),
    }
}
