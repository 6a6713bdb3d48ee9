//! Transformation module
//!
//! Contains:
//! - `columns`: source, intermediate and upload column names
//! - `lookups`: locality, commune, grade and rename tables
//! - `normalize`: address, phone, date and name normalizers
//! - `ledger`: collected record-level validation issues
//! - `stages`: the ordered stage list
//! - `pipeline`: the driver running the stages over a table

pub mod columns;
pub mod ledger;
pub mod lookups;
pub mod normalize;
pub mod pipeline;
pub mod stages;

pub use ledger::{ErrorLedger, ValidationIssue};
pub use lookups::{Lookups, OUTPUT_COLUMNS};
pub use normalize::{
    classify_phone, normalize_phone, parse_day_first, split_first_space, AddressCleaner,
    PhoneKind, PhoneNumber,
};
pub use pipeline::{TransformOutput, Transformer, EMAIL_MESSAGE, PHONE_MESSAGE, RUT_MESSAGE};
pub use stages::{stages_description, Stage};
