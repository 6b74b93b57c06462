//! TaxData -> PDF field table translation
//!
//! `FieldMapper` is a pure function from a `TaxData` snapshot to a flat
//! table of PDF field name -> value. The binding between store paths and
//! template field names is data (`FormLayout`), not scattered conditionals,
//! so a template revision is a one-table change and every entry can be
//! unit-tested on its own.
//!
//! Output is a `BTreeMap`, so two calls on the same snapshot produce
//! byte-identical tables.

use crate::error::{TenfortyError, TenfortyResult};
use crate::model::{DeductionMethod, FilingStatus, TaxData, DEPENDENTS_PATH, W2_FORMS_PATH};
use crate::money::Amount;
use crate::tables::TaxYearTables;
use crate::validation::amount_from_value;
use serde_json::Value;
use std::collections::BTreeMap;

/// A single PDF form field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text field content
    Text(String),
    /// Checkbox state; the exporter renders the form's on/off convention
    Check(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Check(_) => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Check(true))
    }
}

/// Flat field table ready for form filling (deterministic iteration order)
pub type FieldTable = BTreeMap<String, FieldValue>;

/// Template field names for one visible W-2 row
#[derive(Debug, Clone, Copy)]
pub struct W2RowFields {
    pub employer: &'static str,
    pub wages: &'static str,
    pub federal_withholding: &'static str,
}

/// Template field names for one visible dependent row
#[derive(Debug, Clone, Copy)]
pub struct DependentRowFields {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub ssn: &'static str,
    pub relationship: &'static str,
    pub child_tax_credit: &'static str,
}

/// The complete binding between the store and one PDF template.
///
/// Everything the mapper emits is named here; nothing else in the code
/// knows a PDF field name.
#[derive(Debug, Clone)]
pub struct FormLayout {
    /// One-to-one text copies: (PDF field, store path)
    pub direct: &'static [(&'static str, &'static str)],
    /// Mutually exclusive filing-status checkboxes
    pub filing_status: &'static [(&'static str, FilingStatus)],
    pub filer_age_65: &'static str,
    pub filer_blind: &'static str,
    pub spouse_age_65: &'static str,
    pub spouse_blind: &'static str,
    /// Visible W-2 rows; entries beyond this fold into the overflow fields
    pub w2_rows: &'static [W2RowFields],
    pub w2_overflow_wages: &'static str,
    pub w2_overflow_withholding: &'static str,
    pub total_wages: &'static str,
    pub total_federal_withholding: &'static str,
    /// Visible dependent rows; extra dependents fold into a count field
    pub dependent_rows: &'static [DependentRowFields],
    pub dependent_overflow_count: &'static str,
    pub standard_deduction: &'static str,
    pub itemized_total: &'static str,
}

impl FormLayout {
    /// Layout for the shipped Form 1040 template (template rev. 2024-1)
    pub fn form_1040() -> &'static FormLayout {
        &FORM_1040
    }
}

/// Field binding for the versioned house template `f1040_2024.pdf`.
///
/// A change to the template's field names changes this table and nothing
/// else.
pub static FORM_1040: FormLayout = FormLayout {
    direct: &[
        ("first_name", "personal_info.first_name"),
        ("last_name", "personal_info.last_name"),
        ("ssn", "personal_info.ssn"),
        ("street", "personal_info.street"),
        ("city", "personal_info.city"),
        ("state", "personal_info.state"),
        ("zip", "personal_info.zip"),
        ("spouse_first_name", "spouse_info.first_name"),
        ("spouse_last_name", "spouse_info.last_name"),
        ("spouse_ssn", "spouse_info.ssn"),
    ],
    filing_status: &[
        ("filing_status_single", FilingStatus::Single),
        (
            "filing_status_married_filing_jointly",
            FilingStatus::MarriedFilingJointly,
        ),
        (
            "filing_status_married_filing_separately",
            FilingStatus::MarriedFilingSeparately,
        ),
        (
            "filing_status_head_of_household",
            FilingStatus::HeadOfHousehold,
        ),
        (
            "filing_status_qualifying_surviving_spouse",
            FilingStatus::QualifyingSurvivingSpouse,
        ),
    ],
    filer_age_65: "filer_age_65_or_older",
    filer_blind: "filer_blind",
    spouse_age_65: "spouse_age_65_or_older",
    spouse_blind: "spouse_blind",
    w2_rows: &[
        W2RowFields {
            employer: "w2_1_employer",
            wages: "w2_1_wages",
            federal_withholding: "w2_1_federal_withholding",
        },
        W2RowFields {
            employer: "w2_2_employer",
            wages: "w2_2_wages",
            federal_withholding: "w2_2_federal_withholding",
        },
        W2RowFields {
            employer: "w2_3_employer",
            wages: "w2_3_wages",
            federal_withholding: "w2_3_federal_withholding",
        },
        W2RowFields {
            employer: "w2_4_employer",
            wages: "w2_4_wages",
            federal_withholding: "w2_4_federal_withholding",
        },
    ],
    w2_overflow_wages: "w2_additional_wages",
    w2_overflow_withholding: "w2_additional_withholding",
    total_wages: "total_wages",
    total_federal_withholding: "total_federal_withholding",
    dependent_rows: &[
        DependentRowFields {
            first_name: "dependent_1_first_name",
            last_name: "dependent_1_last_name",
            ssn: "dependent_1_ssn",
            relationship: "dependent_1_relationship",
            child_tax_credit: "dependent_1_child_tax_credit",
        },
        DependentRowFields {
            first_name: "dependent_2_first_name",
            last_name: "dependent_2_last_name",
            ssn: "dependent_2_ssn",
            relationship: "dependent_2_relationship",
            child_tax_credit: "dependent_2_child_tax_credit",
        },
        DependentRowFields {
            first_name: "dependent_3_first_name",
            last_name: "dependent_3_last_name",
            ssn: "dependent_3_ssn",
            relationship: "dependent_3_relationship",
            child_tax_credit: "dependent_3_child_tax_credit",
        },
        DependentRowFields {
            first_name: "dependent_4_first_name",
            last_name: "dependent_4_last_name",
            ssn: "dependent_4_ssn",
            relationship: "dependent_4_relationship",
            child_tax_credit: "dependent_4_child_tax_credit",
        },
    ],
    dependent_overflow_count: "additional_dependents_count",
    standard_deduction: "standard_deduction",
    itemized_total: "itemized_deductions",
};

/// Pure translator from a `TaxData` snapshot to a `FieldTable`.
pub struct FieldMapper<'a> {
    layout: &'a FormLayout,
    tables: &'a TaxYearTables,
}

impl<'a> FieldMapper<'a> {
    pub fn new(layout: &'a FormLayout, tables: &'a TaxYearTables) -> Self {
        Self { layout, tables }
    }

    /// Mapper for the shipped 1040 layout and current-year tables
    pub fn form_1040(tables: &'a TaxYearTables) -> Self {
        Self::new(FormLayout::form_1040(), tables)
    }

    /// Translate `data` into a flat field table.
    ///
    /// Side-effect free; `data` is only read. Exactly one filing-status
    /// checkbox is true in the output, and at most one of the standard /
    /// itemized deduction fields is populated.
    pub fn map(&self, data: &TaxData) -> TenfortyResult<FieldTable> {
        let mut table = FieldTable::new();

        self.map_direct(data, &mut table)?;

        // Absent or unparseable status maps as single so the
        // exactly-one-checkbox invariant holds even when validation was
        // skipped; validate() reports the omission separately.
        let status = data.filing_status().unwrap_or(FilingStatus::Single);
        for (field, candidate) in self.layout.filing_status {
            table.insert(field.to_string(), FieldValue::Check(*candidate == status));
        }

        self.map_deduction_boxes(data, status, &mut table);
        self.map_w2_rows(data, &mut table)?;
        self.map_dependent_rows(data, &mut table)?;
        self.map_deductions(data, status, &mut table)?;

        Ok(table)
    }

    fn map_direct(&self, data: &TaxData, table: &mut FieldTable) -> TenfortyResult<()> {
        for (field, path) in self.layout.direct {
            let Some(raw) = data.get(path) else { continue };
            let text = match raw {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(TenfortyError::MappingField {
                        field: field.to_string(),
                        source_path: path.to_string(),
                        message: format!("expected text, found {}", crate::store::json_kind(other)),
                    })
                }
            };
            table.insert(field.to_string(), FieldValue::Text(text));
        }
        Ok(())
    }

    fn map_deduction_boxes(&self, data: &TaxData, status: FilingStatus, table: &mut FieldTable) {
        let filer_65 = bool_at(data, "personal_info.age_65_or_older");
        let filer_blind = bool_at(data, "personal_info.blind");
        // Spouse boxes only count for statuses that carry a spouse.
        let spouse_65 = status.requires_spouse() && bool_at(data, "spouse_info.age_65_or_older");
        let spouse_blind = status.requires_spouse() && bool_at(data, "spouse_info.blind");

        table.insert(
            self.layout.filer_age_65.to_string(),
            FieldValue::Check(filer_65),
        );
        table.insert(
            self.layout.filer_blind.to_string(),
            FieldValue::Check(filer_blind),
        );
        table.insert(
            self.layout.spouse_age_65.to_string(),
            FieldValue::Check(spouse_65),
        );
        table.insert(
            self.layout.spouse_blind.to_string(),
            FieldValue::Check(spouse_blind),
        );
    }

    /// Number of age-65/blindness boxes checked for the deduction lookup
    fn deduction_boxes(&self, data: &TaxData, status: FilingStatus) -> u32 {
        let mut boxes = 0;
        boxes += bool_at(data, "personal_info.age_65_or_older") as u32;
        boxes += bool_at(data, "personal_info.blind") as u32;
        if status.requires_spouse() {
            boxes += bool_at(data, "spouse_info.age_65_or_older") as u32;
            boxes += bool_at(data, "spouse_info.blind") as u32;
        }
        boxes
    }

    fn map_w2_rows(&self, data: &TaxData, table: &mut FieldTable) -> TenfortyResult<()> {
        let entries = list_at(data, W2_FORMS_PATH);
        if entries.is_empty() {
            return Ok(());
        }

        let visible = self.layout.w2_rows.len();
        let mut total_wages = Amount::ZERO;
        let mut total_withholding = Amount::ZERO;
        let mut overflow_wages = Amount::ZERO;
        let mut overflow_withholding = Amount::ZERO;

        for (index, entry) in entries.iter().enumerate() {
            let source = |field: &str| format!("{W2_FORMS_PATH}.{index}.{field}");
            let wages = entry_amount(entry, &source("wages"), "wages")?;
            let withholding =
                entry_amount(entry, &source("federal_withholding"), "federal_withholding")?;
            total_wages += wages;
            total_withholding += withholding;

            if index < visible {
                let row = &self.layout.w2_rows[index];
                let employer = entry
                    .get("employer_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                table.insert(
                    row.employer.to_string(),
                    FieldValue::Text(employer.to_string()),
                );
                table.insert(row.wages.to_string(), money(wages));
                table.insert(row.federal_withholding.to_string(), money(withholding));
            } else {
                // Folded, not dropped: row detail is lost past the visible
                // limit but every amount still lands in an output field.
                overflow_wages += wages;
                overflow_withholding += withholding;
            }
        }

        if entries.len() > visible {
            table.insert(
                self.layout.w2_overflow_wages.to_string(),
                money(overflow_wages),
            );
            table.insert(
                self.layout.w2_overflow_withholding.to_string(),
                money(overflow_withholding),
            );
        }

        table.insert(self.layout.total_wages.to_string(), money(total_wages));
        table.insert(
            self.layout.total_federal_withholding.to_string(),
            money(total_withholding),
        );
        Ok(())
    }

    fn map_dependent_rows(&self, data: &TaxData, table: &mut FieldTable) -> TenfortyResult<()> {
        let entries = list_at(data, DEPENDENTS_PATH);
        let visible = self.layout.dependent_rows.len();

        for (index, entry) in entries.iter().take(visible).enumerate() {
            let row = &self.layout.dependent_rows[index];
            let text = |key: &str| {
                entry
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            table.insert(row.first_name.to_string(), FieldValue::Text(text("first_name")));
            table.insert(row.last_name.to_string(), FieldValue::Text(text("last_name")));
            table.insert(row.ssn.to_string(), FieldValue::Text(text("ssn")));
            table.insert(
                row.relationship.to_string(),
                FieldValue::Text(text("relationship")),
            );
            let ctc = entry
                .get("qualifies_child_tax_credit")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            table.insert(row.child_tax_credit.to_string(), FieldValue::Check(ctc));
        }

        if entries.len() > visible {
            let extra = entries.len() - visible;
            table.insert(
                self.layout.dependent_overflow_count.to_string(),
                FieldValue::Text(extra.to_string()),
            );
        }
        Ok(())
    }

    fn map_deductions(
        &self,
        data: &TaxData,
        status: FilingStatus,
        table: &mut FieldTable,
    ) -> TenfortyResult<()> {
        let method = data
            .get("deductions.method")
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
            .unwrap_or(DeductionMethod::Standard);

        match method {
            DeductionMethod::Standard => {
                let boxes = self.deduction_boxes(data, status);
                let amount = self.tables.standard_deduction(status, boxes);
                table.insert(self.layout.standard_deduction.to_string(), money(amount));
            }
            DeductionMethod::Itemized => {
                let mut total = Amount::ZERO;
                for component in ["medical", "state_local_taxes", "mortgage_interest", "charitable"]
                {
                    let path = format!("deductions.{component}");
                    match data.get(&path) {
                        None => {}
                        Some(raw) => {
                            total += amount_from_value(raw).ok_or_else(|| {
                                TenfortyError::MappingField {
                                    field: self.layout.itemized_total.to_string(),
                                    source_path: path.clone(),
                                    message: "not a non-negative amount".to_string(),
                                }
                            })?;
                        }
                    }
                }
                table.insert(self.layout.itemized_total.to_string(), money(total));
            }
        }
        Ok(())
    }
}

fn money(amount: Amount) -> FieldValue {
    FieldValue::Text(amount.to_string())
}

fn bool_at(data: &TaxData, path: &str) -> bool {
    data.get(path).and_then(Value::as_bool).unwrap_or(false)
}

fn list_at(data: &TaxData, path: &str) -> Vec<Value> {
    data.get(path)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn entry_amount(entry: &Value, source: &str, key: &str) -> TenfortyResult<Amount> {
    match entry.get(key) {
        None => Ok(Amount::ZERO),
        Some(raw) => amount_from_value(raw).ok_or_else(|| TenfortyError::MappingField {
            field: key.to_string(),
            source_path: source.to_string(),
            message: "not a non-negative amount".to_string(),
        }),
    }
}
