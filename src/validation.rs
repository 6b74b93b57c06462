//! Return validation
//!
//! Validation is a pure read over the store that produces a list of
//! findings - it never mutates, never raises, and never blocks anything
//! itself. The caller (CLI, GUI, export harness) decides whether findings
//! block an export.
//!
//! Findings reference store paths only; they never quote the stored value.

use crate::model::{FilingStatus, TaxData, DEPENDENTS_PATH, W2_FORMS_PATH};
use crate::money::Amount;
use serde_json::Value;
use std::fmt;

/// What kind of problem a finding reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// A required field is absent or empty
    MissingField,
    /// Filing status requires spouse info that is not present
    SpouseRequired,
    /// Spouse info present under a status that must not carry it
    SpouseForbidden,
    /// A monetary field does not parse as a non-negative amount
    InvalidAmount,
    /// An SSN/EIN is not a 9-digit string
    InvalidId,
    /// `filing_status` holds something outside the enumerated set
    InvalidFilingStatus,
}

/// One validation finding: a store path plus what is wrong with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub path: String,
    pub kind: FindingKind,
    pub message: String,
}

impl ValidationFinding {
    fn new(path: impl Into<String>, kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Required personal-info leaves and the order findings report them in
const REQUIRED_PERSONAL: &[&str] = &[
    "personal_info.first_name",
    "personal_info.last_name",
    "personal_info.ssn",
    "personal_info.street",
    "personal_info.city",
    "personal_info.state",
    "personal_info.zip",
    "personal_info.filing_status",
];

impl TaxData {
    /// Check the return and report everything wrong with it.
    ///
    /// An empty return yields one `MissingField` finding per required
    /// personal-info field. Raw store values are scanned directly, so a
    /// hand-edited or loaded document gets the same coverage as one built
    /// through the typed setters.
    pub fn validate(&self) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for path in REQUIRED_PERSONAL {
            if !present_non_empty(self.get(path)) {
                findings.push(ValidationFinding::new(
                    *path,
                    FindingKind::MissingField,
                    "required field is missing or empty",
                ));
            }
        }

        self.check_filing_status(&mut findings);
        self.check_id(&mut findings, "personal_info.ssn");
        self.check_id(&mut findings, "spouse_info.ssn");
        self.check_lists(&mut findings);
        self.check_deductions(&mut findings);

        findings
    }

    fn check_filing_status(&self, findings: &mut Vec<ValidationFinding>) {
        let raw = match self.get("personal_info.filing_status") {
            Some(raw) => raw,
            None => return, // already a MissingField finding
        };
        let status: Option<FilingStatus> = serde_json::from_value(raw.clone()).ok();
        let status = match status {
            Some(status) => status,
            None => {
                findings.push(ValidationFinding::new(
                    "personal_info.filing_status",
                    FindingKind::InvalidFilingStatus,
                    "not a recognized filing status",
                ));
                return;
            }
        };

        let has_spouse = self
            .get("spouse_info")
            .and_then(Value::as_object)
            .is_some_and(|m| !m.is_empty());

        if status.requires_spouse() && !has_spouse {
            findings.push(ValidationFinding::new(
                "spouse_info",
                FindingKind::SpouseRequired,
                format!("filing status '{}' requires spouse info", status.label()),
            ));
        }
        if !status.requires_spouse() && has_spouse {
            findings.push(ValidationFinding::new(
                "spouse_info",
                FindingKind::SpouseForbidden,
                format!(
                    "spouse info must not be present with filing status '{}'",
                    status.label()
                ),
            ));
        }
    }

    fn check_id(&self, findings: &mut Vec<ValidationFinding>, path: &str) {
        if let Some(raw) = self.get(path) {
            let ok = raw
                .as_str()
                .is_some_and(|s| s.len() == 9 && s.chars().all(|c| c.is_ascii_digit()));
            if !ok && present_non_empty(Some(raw)) {
                findings.push(ValidationFinding::new(
                    path,
                    FindingKind::InvalidId,
                    "must be a 9-digit identifier",
                ));
            }
        }
    }

    fn check_lists(&self, findings: &mut Vec<ValidationFinding>) {
        for (index, entry) in self.entries(W2_FORMS_PATH).iter().enumerate() {
            let base = format!("{W2_FORMS_PATH}.{index}");
            check_id_value(findings, &format!("{base}.employer_ein"), entry.get("employer_ein"));
            for field in ["wages", "federal_withholding", "state_withholding"] {
                check_amount_value(findings, &format!("{base}.{field}"), entry.get(field));
            }
        }
        for (index, entry) in self.entries(DEPENDENTS_PATH).iter().enumerate() {
            let base = format!("{DEPENDENTS_PATH}.{index}");
            check_id_value(findings, &format!("{base}.ssn"), entry.get("ssn"));
        }
    }

    fn check_deductions(&self, findings: &mut Vec<ValidationFinding>) {
        for field in ["medical", "state_local_taxes", "mortgage_interest", "charitable"] {
            let path = format!("deductions.{field}");
            check_amount_value(findings, &path, self.get(&path));
        }
    }

    fn entries(&self, path: &str) -> Vec<Value> {
        self.get(path)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// Parse a raw store value as a non-negative fixed-precision amount.
///
/// A number past `Amount::MAX` is not a valid amount, so huge documents
/// produce a finding instead of a clamped value.
pub(crate) fn amount_from_value(raw: &Value) -> Option<Amount> {
    match raw {
        Value::String(s) => Amount::parse(s).ok(),
        Value::Number(n) => n.as_u64().and_then(|d| Amount::try_from_dollars(d).ok()),
        _ => None,
    }
}

fn check_amount_value(findings: &mut Vec<ValidationFinding>, path: &str, raw: Option<&Value>) {
    let Some(raw) = raw else { return };
    if amount_from_value(raw).is_none() {
        findings.push(ValidationFinding::new(
            path,
            FindingKind::InvalidAmount,
            "must be a non-negative amount",
        ));
    }
}

fn check_id_value(findings: &mut Vec<ValidationFinding>, path: &str, raw: Option<&Value>) {
    let Some(raw) = raw else { return };
    if !present_non_empty(Some(raw)) {
        return;
    }
    let ok = raw
        .as_str()
        .is_some_and(|s| s.len() == 9 && s.chars().all(|c| c.is_ascii_digit()));
    if !ok {
        findings.push(ValidationFinding::new(
            path,
            FindingKind::InvalidId,
            "must be a 9-digit identifier",
        ));
    }
}

/// Present with a non-empty value. `0` and `false` count as present;
/// empty strings do not satisfy a *required* field.
fn present_non_empty(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}
