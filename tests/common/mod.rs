//! Common test utilities for Tenforty integration tests.
//!
//! Provides return fixtures, an AcroForm template builder matching the
//! shipped 1040 layout, and a helper to run the CLI binary.

#![allow(dead_code)] // each test binary uses a subset

use std::path::Path;
use std::process::{Command, Output};

use lopdf::{dictionary, Document, Object};
use tenforty::{
    Dependent, FilingStatus, PersonalInfo, SpouseInfo, TaxData, W2Form, FORM_1040,
};

/// A complete single filer with one W-2 and one dependent
pub fn sample_return() -> TaxData {
    let mut data = TaxData::new();
    data.set_personal_info(&sample_personal(FilingStatus::Single))
        .unwrap();
    data.add_w2(&W2Form {
        employer_name: "Acme Corp".into(),
        employer_ein: "12-3456789".into(),
        wages: tenforty::Amount::from_dollars(50_000),
        federal_withholding: tenforty::Amount::from_dollars(5_000),
        state_withholding: tenforty::Amount::from_dollars(1_500),
    })
    .unwrap();
    data.add_dependent(&Dependent {
        first_name: "Kid".into(),
        last_name: "Lovelace".into(),
        ssn: "111-22-3333".into(),
        relationship: "daughter".into(),
        qualifies_child_tax_credit: true,
    })
    .unwrap();
    data
}

pub fn sample_personal(status: FilingStatus) -> PersonalInfo {
    PersonalInfo {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        ssn: "123456789".into(),
        street: "1 Analytical Way".into(),
        city: "Marion".into(),
        state: "OH".into(),
        zip: "43302".into(),
        filing_status: Some(status),
        age_65_or_older: false,
        blind: false,
    }
}

pub fn sample_spouse() -> SpouseInfo {
    SpouseInfo {
        first_name: "Will".into(),
        last_name: "Lovelace".into(),
        ssn: "987654321".into(),
        age_65_or_older: false,
        blind: false,
    }
}

/// Text field names of the shipped 1040 layout
pub fn form_1040_text_fields() -> Vec<&'static str> {
    let layout = &FORM_1040;
    let mut names: Vec<&str> = layout.direct.iter().map(|(field, _)| *field).collect();
    for row in layout.w2_rows {
        names.extend([row.employer, row.wages, row.federal_withholding]);
    }
    names.extend([
        layout.w2_overflow_wages,
        layout.w2_overflow_withholding,
        layout.total_wages,
        layout.total_federal_withholding,
    ]);
    for row in layout.dependent_rows {
        names.extend([row.first_name, row.last_name, row.ssn, row.relationship]);
    }
    names.extend([
        layout.dependent_overflow_count,
        layout.standard_deduction,
        layout.itemized_total,
    ]);
    names
}

/// Checkbox field names of the shipped 1040 layout
pub fn form_1040_checkbox_fields() -> Vec<&'static str> {
    let layout = &FORM_1040;
    let mut names: Vec<&str> = layout.filing_status.iter().map(|(field, _)| *field).collect();
    names.extend([
        layout.filer_age_65,
        layout.filer_blind,
        layout.spouse_age_65,
        layout.spouse_blind,
    ]);
    for row in layout.dependent_rows {
        names.push(row.child_tax_credit);
    }
    names
}

/// Write a minimal fillable AcroForm PDF with the given field names.
pub fn build_template(path: &Path, text_fields: &[&str], checkbox_fields: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut field_refs: Vec<Object> = Vec::new();
    for name in text_fields {
        let id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal(*name),
            "Rect" => vec![0.into(), 0.into(), 200.into(), 18.into()],
        });
        field_refs.push(id.into());
    }
    for name in checkbox_fields {
        let id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal(*name),
            "V" => "Off",
            "AS" => "Off",
            "Rect" => vec![0.into(), 0.into(), 12.into(), 12.into()],
        });
        field_refs.push(id.into());
    }

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Annots" => field_refs.clone(),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let acroform_id = doc.add_object(dictionary! {
        "Fields" => field_refs,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Template carrying every field of the shipped 1040 layout
pub fn build_form_1040_template(path: &Path) {
    build_template(
        path,
        &form_1040_text_fields(),
        &form_1040_checkbox_fields(),
    );
}

/// Read back the `/V` of a named field in a filled PDF.
pub fn read_field_value(path: &Path, name: &str) -> Option<Object> {
    let doc = Document::load(path).unwrap();
    for object in doc.objects.values() {
        let Ok(dict) = object.as_dict() else { continue };
        let matches = dict
            .get(b"T")
            .ok()
            .and_then(|t| t.as_str().ok())
            .is_some_and(|t| t == name.as_bytes());
        if matches {
            return dict.get(b"V").ok().cloned();
        }
    }
    None
}

/// Run the tenforty binary with the given arguments.
pub fn run_tenforty(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tenforty"))
        .args(args)
        .output()
        .expect("failed to run tenforty binary")
}
