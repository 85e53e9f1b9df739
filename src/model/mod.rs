//! Types that represent the core data model: the transaction record, its fields, and the rows of
//! a sheet they are stored in.
mod amount;
mod date;
mod fields;
mod rows;
mod transaction;

pub use amount::{Amount, AmountError};
pub use date::{normalize_date, normalize_date_on, INVALID_DATE};
pub use fields::{validate_fields, Field, FieldError, PaymentMethod, TransactionPatch, HEADER_VALUES};
pub use rows::{row_number, Rows, SheetRow};
pub use transaction::{Transaction, EMPTY_TEXT};
