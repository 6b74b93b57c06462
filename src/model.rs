//! Core data model for a tax return
//!
//! `TaxData` is the domain wrapper over `PathStore`: typed entities for
//! personal info, income forms, dependents and deductions serialize into
//! well-known subtrees, while the raw dotted-path surface stays available
//! for interview code and validation scanning.
//!
//! A `TaxData` starts empty, is populated incrementally, and is read-only
//! during export - `FieldMapper` never mutates it.

use crate::error::{TenfortyError, TenfortyResult};
use crate::money::Amount;
use crate::store::PathStore;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;

/// Version stamp written into saved return documents
pub const FORMAT_VERSION: u32 = 1;

/// Store path holding the W-2 list
pub const W2_FORMS_PATH: &str = "income.w2_forms";
/// Store path holding the dependent list
pub const DEPENDENTS_PATH: &str = "dependents";

/// Federal filing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
}

impl FilingStatus {
    /// All statuses, in the order they appear on Form 1040
    pub const ALL: [FilingStatus; 5] = [
        FilingStatus::Single,
        FilingStatus::MarriedFilingJointly,
        FilingStatus::MarriedFilingSeparately,
        FilingStatus::HeadOfHousehold,
        FilingStatus::QualifyingSurvivingSpouse,
    ];

    /// True for the statuses that require spouse info on the return
    pub fn requires_spouse(self) -> bool {
        matches!(
            self,
            FilingStatus::MarriedFilingJointly | FilingStatus::MarriedFilingSeparately
        )
    }

    /// Human-readable label (used in findings and CLI output)
    pub fn label(self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married filing jointly",
            FilingStatus::MarriedFilingSeparately => "married filing separately",
            FilingStatus::HeadOfHousehold => "head of household",
            FilingStatus::QualifyingSurvivingSpouse => "qualifying surviving spouse",
        }
    }
}

/// Filer identity and address
///
/// All string fields default to empty so a partially-filled interview
/// subtree still deserializes; `validate` reports what is missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Normalized digit string (no dashes)
    #[serde(default)]
    pub ssn: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_status: Option<FilingStatus>,
    /// Filer was 65 or older at year end (standard-deduction box)
    #[serde(default)]
    pub age_65_or_older: bool,
    #[serde(default)]
    pub blind: bool,
}

/// Spouse identity, present only for married filing statuses
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpouseInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub ssn: String,
    #[serde(default)]
    pub age_65_or_older: bool,
    #[serde(default)]
    pub blind: bool,
}

/// One W-2 wage statement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct W2Form {
    #[serde(default)]
    pub employer_name: String,
    /// Employer identification number, normalized digit string
    #[serde(default)]
    pub employer_ein: String,
    #[serde(default)]
    pub wages: Amount,
    #[serde(default)]
    pub federal_withholding: Amount,
    #[serde(default)]
    pub state_withholding: Amount,
}

/// One claimed dependent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dependent {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub ssn: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub qualifies_child_tax_credit: bool,
}

/// Standard vs. itemized selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMethod {
    Standard,
    Itemized,
}

/// Deduction selection plus itemized component amounts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Deductions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<DeductionMethod>,
    #[serde(default)]
    pub medical: Amount,
    #[serde(default)]
    pub state_local_taxes: Amount,
    #[serde(default)]
    pub mortgage_interest: Amount,
    #[serde(default)]
    pub charitable: Amount,
}

impl Deductions {
    /// Sum of the itemized components
    pub fn itemized_total(&self) -> Amount {
        self.medical + self.state_local_taxes + self.mortgage_interest + self.charitable
    }
}

/// Strip everything but digits from an SSN/EIN input
pub fn normalize_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Domain model of one tax return, built on `PathStore`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxData {
    store: PathStore,
}

impl TaxData {
    /// Create an empty return (all paths absent)
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a plain nested mapping into a `TaxData`.
    ///
    /// Accepts the same shape the typed setters produce; the root must be
    /// an object.
    pub fn from_value(value: Value) -> TenfortyResult<Self> {
        Ok(Self {
            store: PathStore::from_value(value)?,
        })
    }

    /// The underlying store (read-only)
    pub fn store(&self) -> &PathStore {
        &self.store
    }

    /// Raw dotted-path read
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.store.get(path)
    }

    /// Raw dotted-path write
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> TenfortyResult<()> {
        self.store.set(path, value)
    }

    /// Raw dotted-path presence check
    pub fn has(&self, path: &str) -> bool {
        self.store.has(path)
    }

    fn subtree<T: DeserializeOwned>(&self, path: &str) -> TenfortyResult<Option<T>> {
        match self.store.get(path) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| {
                    TenfortyError::malformed(format!("'{path}' does not match the expected shape"))
                }),
        }
    }

    fn set_subtree<T: Serialize>(&mut self, path: &str, entity: &T) -> TenfortyResult<()> {
        self.store.set(path, serde_json::to_value(entity)?)
    }

    /// Filer info, if any has been entered
    pub fn personal_info(&self) -> TenfortyResult<Option<PersonalInfo>> {
        self.subtree("personal_info")
    }

    /// Store filer info, normalizing the SSN to digits
    pub fn set_personal_info(&mut self, info: &PersonalInfo) -> TenfortyResult<()> {
        let mut info = info.clone();
        info.ssn = normalize_id(&info.ssn);
        self.set_subtree("personal_info", &info)
    }

    /// The selected filing status, if one has been chosen and is valid
    pub fn filing_status(&self) -> Option<FilingStatus> {
        let raw = self.store.get("personal_info.filing_status")?;
        serde_json::from_value(raw.clone()).ok()
    }

    /// Spouse info, if any has been entered
    pub fn spouse_info(&self) -> TenfortyResult<Option<SpouseInfo>> {
        self.subtree("spouse_info")
    }

    /// Store spouse info, normalizing the SSN to digits
    pub fn set_spouse_info(&mut self, info: &SpouseInfo) -> TenfortyResult<()> {
        let mut info = info.clone();
        info.ssn = normalize_id(&info.ssn);
        self.set_subtree("spouse_info", &info)
    }

    /// Drop spouse info (e.g. after a filing-status change)
    pub fn clear_spouse_info(&mut self) {
        self.store.remove("spouse_info");
    }

    /// All W-2 entries in insertion order
    pub fn w2_forms(&self) -> TenfortyResult<Vec<W2Form>> {
        Ok(self.subtree(W2_FORMS_PATH)?.unwrap_or_default())
    }

    /// Append a W-2 entry; returns its stable row index
    pub fn add_w2(&mut self, entry: &W2Form) -> TenfortyResult<usize> {
        let mut entry = entry.clone();
        entry.employer_ein = normalize_id(&entry.employer_ein);
        self.push_entry(W2_FORMS_PATH, serde_json::to_value(&entry)?)
    }

    /// All dependents in insertion order
    pub fn dependents(&self) -> TenfortyResult<Vec<Dependent>> {
        Ok(self.subtree(DEPENDENTS_PATH)?.unwrap_or_default())
    }

    /// Append a dependent; returns its stable row index
    pub fn add_dependent(&mut self, entry: &Dependent) -> TenfortyResult<usize> {
        let mut entry = entry.clone();
        entry.ssn = normalize_id(&entry.ssn);
        self.push_entry(DEPENDENTS_PATH, serde_json::to_value(&entry)?)
    }

    /// Deduction selection and amounts
    pub fn deductions(&self) -> TenfortyResult<Option<Deductions>> {
        self.subtree("deductions")
    }

    pub fn set_deductions(&mut self, deductions: &Deductions) -> TenfortyResult<()> {
        self.set_subtree("deductions", deductions)
    }

    fn push_entry(&mut self, path: &str, entry: Value) -> TenfortyResult<usize> {
        if !self.store.has(path) {
            self.store.set(path, Value::Array(Vec::new()))?;
        }
        let list = self
            .store
            .get_mut(path)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| TenfortyError::malformed(format!("'{path}' is not a list")))?;
        list.push(entry);
        Ok(list.len() - 1)
    }

    /// Serialize the full return to `path` (pretty JSON, atomic write).
    ///
    /// The on-disk shape wraps the store tree in a versioned envelope:
    /// `{ "meta": { "format_version", "saved_at" }, "return": { ... } }`.
    pub fn save(&self, path: &Path) -> TenfortyResult<()> {
        let document = json!({
            "meta": {
                "format_version": FORMAT_VERSION,
                "saved_at": Utc::now(),
            },
            "return": self.store.as_value(),
        });
        let mut text = serde_json::to_string_pretty(&document)?;
        text.push('\n');

        let dir = parent_dir(path);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Load a previously saved return.
    ///
    /// Fails with `Deserialization` on malformed input; never yields a
    /// partially-populated `TaxData`. Bare trees without the `meta`
    /// envelope (pre-versioned saves) are still accepted.
    pub fn load(path: &Path) -> TenfortyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&text)
            .map_err(|e| TenfortyError::malformed(format!("not valid JSON: {e}")))?;

        let tree = match document {
            Value::Object(mut map) if map.contains_key("return") => {
                let meta: DocumentMeta = map
                    .remove("meta")
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|_| TenfortyError::malformed("unreadable 'meta' section"))?
                    .unwrap_or_default();
                if meta.format_version > FORMAT_VERSION {
                    return Err(TenfortyError::malformed(format!(
                        "unsupported format_version {}",
                        meta.format_version
                    )));
                }
                map.remove("return").unwrap_or(Value::Null)
            }
            other => other,
        };

        Ok(Self {
            store: PathStore::from_value(tree)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct DocumentMeta {
    #[serde(default)]
    format_version: u32,
    #[serde(default)]
    #[allow(dead_code)]
    saved_at: Option<DateTime<Utc>>,
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_personal() -> PersonalInfo {
        PersonalInfo {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ssn: "123-45-6789".into(),
            street: "1 Analytical Way".into(),
            city: "Marion".into(),
            state: "OH".into(),
            zip: "43302".into(),
            filing_status: Some(FilingStatus::Single),
            age_65_or_older: false,
            blind: false,
        }
    }

    #[test]
    fn test_filing_status_serde_snake_case() {
        let status: FilingStatus =
            serde_json::from_str("\"married_filing_jointly\"").unwrap();
        assert_eq!(status, FilingStatus::MarriedFilingJointly);

        let json = serde_json::to_string(&FilingStatus::QualifyingSurvivingSpouse).unwrap();
        assert_eq!(json, "\"qualifying_surviving_spouse\"");
    }

    #[test]
    fn test_filing_status_spouse_requirement() {
        assert!(FilingStatus::MarriedFilingJointly.requires_spouse());
        assert!(FilingStatus::MarriedFilingSeparately.requires_spouse());
        assert!(!FilingStatus::Single.requires_spouse());
        assert!(!FilingStatus::HeadOfHousehold.requires_spouse());
        assert!(!FilingStatus::QualifyingSurvivingSpouse.requires_spouse());
    }

    #[test]
    fn test_set_personal_info_normalizes_ssn() {
        let mut data = TaxData::new();
        data.set_personal_info(&sample_personal()).unwrap();

        assert_eq!(
            data.get("personal_info.ssn").unwrap().as_str(),
            Some("123456789")
        );
        assert_eq!(data.filing_status(), Some(FilingStatus::Single));
    }

    #[test]
    fn test_personal_info_round_trip() {
        let mut data = TaxData::new();
        let mut info = sample_personal();
        data.set_personal_info(&info).unwrap();

        info.ssn = "123456789".into();
        assert_eq!(data.personal_info().unwrap(), Some(info));
    }

    #[test]
    fn test_personal_info_absent_is_none() {
        let data = TaxData::new();
        assert_eq!(data.personal_info().unwrap(), None);
        assert_eq!(data.filing_status(), None);
    }

    #[test]
    fn test_add_w2_assigns_sequential_indexes() {
        let mut data = TaxData::new();
        let w2 = W2Form {
            employer_name: "Acme".into(),
            employer_ein: "12-3456789".into(),
            wages: Amount::from_dollars(50000),
            ..W2Form::default()
        };

        assert_eq!(data.add_w2(&w2).unwrap(), 0);
        assert_eq!(data.add_w2(&w2).unwrap(), 1);

        let forms = data.w2_forms().unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].employer_ein, "123456789");
        assert_eq!(forms[0].wages, Amount::from_dollars(50000));
    }

    #[test]
    fn test_w2_list_preserves_insertion_order() {
        let mut data = TaxData::new();
        for name in ["First", "Second", "Third"] {
            data.add_w2(&W2Form {
                employer_name: name.into(),
                ..W2Form::default()
            })
            .unwrap();
        }
        let names: Vec<String> = data
            .w2_forms()
            .unwrap()
            .into_iter()
            .map(|w| w.employer_name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn test_add_dependent() {
        let mut data = TaxData::new();
        let index = data
            .add_dependent(&Dependent {
                first_name: "Kid".into(),
                last_name: "Lovelace".into(),
                ssn: "987-65-4321".into(),
                relationship: "daughter".into(),
                qualifies_child_tax_credit: true,
            })
            .unwrap();

        assert_eq!(index, 0);
        let deps = data.dependents().unwrap();
        assert_eq!(deps[0].ssn, "987654321");
        assert!(deps[0].qualifies_child_tax_credit);
    }

    #[test]
    fn test_push_entry_rejects_non_list() {
        let mut data = TaxData::new();
        data.set(W2_FORMS_PATH, "oops").unwrap();
        assert!(data.add_w2(&W2Form::default()).is_err());
    }

    #[test]
    fn test_itemized_total() {
        let deductions = Deductions {
            method: Some(DeductionMethod::Itemized),
            medical: Amount::from_dollars(1000),
            state_local_taxes: Amount::from_dollars(5000),
            mortgage_interest: Amount::from_dollars(8000),
            charitable: Amount::from_dollars(500),
        };
        assert_eq!(deductions.itemized_total(), Amount::from_dollars(14500));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("return.json");

        let mut data = TaxData::new();
        data.set_personal_info(&sample_personal()).unwrap();
        data.add_w2(&W2Form {
            employer_name: "Acme".into(),
            wages: Amount::from_cents(5_000_050),
            ..W2Form::default()
        })
        .unwrap();
        data.set("notes.preparer", "self").unwrap();

        data.save(&file).unwrap();
        let loaded = TaxData::load(&file).unwrap();

        assert_eq!(loaded, data);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("return.json");

        let mut data = TaxData::new();
        data.set("a", 1).unwrap();
        data.save(&file).unwrap();
        data.set("a", 2).unwrap();
        data.save(&file).unwrap();

        let loaded = TaxData::load(&file).unwrap();
        assert_eq!(loaded.get("a"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_load_bare_tree_without_envelope() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("old.json");
        std::fs::write(&file, r#"{"personal_info": {"first_name": "Ada"}}"#).unwrap();

        let loaded = TaxData::load(&file).unwrap();
        assert_eq!(
            loaded.get("personal_info.first_name").unwrap().as_str(),
            Some("Ada")
        );
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.json");
        std::fs::write(&file, "{ not json").unwrap();

        let err = TaxData::load(&file).unwrap_err();
        assert!(matches!(err, TenfortyError::Deserialization { .. }));
    }

    #[test]
    fn test_load_non_object_root_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.json");
        std::fs::write(&file, "[1, 2, 3]").unwrap();

        assert!(TaxData::load(&file).is_err());
    }

    #[test]
    fn test_load_future_format_version_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("future.json");
        std::fs::write(
            &file,
            r#"{"meta": {"format_version": 99}, "return": {}}"#,
        )
        .unwrap();

        let err = TaxData::load(&file).unwrap_err();
        assert!(err.to_string().contains("format_version"));
    }

    #[test]
    fn test_from_value_normalizes_plain_mapping() {
        let data = TaxData::from_value(serde_json::json!({
            "personal_info": { "first_name": "Ada", "filing_status": "single" }
        }))
        .unwrap();
        assert_eq!(data.filing_status(), Some(FilingStatus::Single));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(TaxData::from_value(serde_json::json!("nope")).is_err());
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("123-45-6789"), "123456789");
        assert_eq!(normalize_id(" 12 3456789 "), "123456789");
        assert_eq!(normalize_id(""), "");
    }
}
