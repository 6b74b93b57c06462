//! Tenforty - tax-return data model and Form 1040 PDF filler
//!
//! Tenforty collects U.S. federal tax-return data into a schema-flexible
//! nested model and exports it as a filled PDF form. The core pipeline:
//! populate `TaxData` (interview steps or programmatic construction),
//! translate it with `FieldMapper` into a flat field table, and hand that
//! table to `PdfExporter` to fill an AcroForm template on disk.

pub mod error;
pub mod export;
pub mod mapper;
pub mod model;
pub mod money;
pub mod store;
pub mod tables;
pub mod validation;

// Re-exports for convenience
pub use error::{TenfortyError, TenfortyResult};
pub use export::{export_1040_only, export_1040_value, PdfExporter};
pub use mapper::{FieldMapper, FieldTable, FieldValue, FormLayout, FORM_1040};
pub use model::{
    Dependent, DeductionMethod, Deductions, FilingStatus, PersonalInfo, SpouseInfo, TaxData,
    W2Form,
};
pub use money::Amount;
pub use tables::TaxYearTables;
pub use validation::{FindingKind, ValidationFinding};
