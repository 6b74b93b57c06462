//! PDF form filling
//!
//! `PdfExporter` binds a field table onto an AcroForm template with
//! `lopdf`. It is deliberately thin: resolve the template's fields by
//! fully-qualified name, write `/V` (and `/AS` for checkboxes), flag
//! `/NeedAppearances`, and save through a temp file so a failed export
//! never leaves partial output behind.
//!
//! Unmatched field names are an error that lists every offender - a table
//! entry is never silently dropped.

use crate::error::{TenfortyError, TenfortyResult};
use crate::mapper::{FieldMapper, FieldTable, FieldValue};
use crate::model::TaxData;
use crate::tables::TaxYearTables;
use lopdf::{Document, Object, ObjectId};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Checkbox "on" appearance state written to `/V` and `/AS`
const CHECKBOX_ON: &[u8] = b"Yes";
/// Checkbox "off" appearance state
const CHECKBOX_OFF: &[u8] = b"Off";

/// Where the catalog's AcroForm dictionary lives
enum AcroFormSlot {
    /// Indirect object
    Referenced(ObjectId),
    /// Inline dictionary inside the catalog
    InlineIn(ObjectId),
}

/// Fills a named AcroForm template from a `FieldTable`.
pub struct PdfExporter {
    template: PathBuf,
}

impl PdfExporter {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill the template and write the result to `output`.
    ///
    /// Overwrites an existing `output`. On any failure - missing template,
    /// unmatched field names, parse or write error - no file is left at
    /// `output` (a pre-existing file there is also left untouched).
    pub fn export(&self, table: &FieldTable, output: &Path) -> TenfortyResult<()> {
        if !self.template.is_file() {
            return Err(TenfortyError::TemplateNotFound {
                path: self.template.clone(),
            });
        }

        let mut doc = Document::load(&self.template)?;
        let (slot, fields) = collect_form_fields(&doc)?;

        let mut missing = Vec::new();
        let mut updates = Vec::new();
        for (name, value) in table {
            match fields.get(name.as_str()) {
                Some(id) => updates.push((*id, value.clone())),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(TenfortyError::UnknownTemplateFields { fields: missing });
        }

        for (id, value) in updates {
            set_field_value(&mut doc, id, &value)?;
        }
        set_need_appearances(&mut doc, slot)?;

        let dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        doc.save_to(&mut tmp)?;
        tmp.persist(output).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Map of fully-qualified field name -> field dictionary id.
///
/// Hierarchical fields join partial `/T` names with `.`; a node whose
/// kids carry no `/T` of their own is a terminal field with split
/// widgets.
fn collect_form_fields(
    doc: &Document,
) -> TenfortyResult<(AcroFormSlot, BTreeMap<String, ObjectId>)> {
    let mut fields = BTreeMap::new();

    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;
    let acroform_obj = match catalog.get(b"AcroForm") {
        Ok(obj) => obj,
        Err(_) => return Ok((AcroFormSlot::InlineIn(catalog_id), fields)),
    };
    let slot = match acroform_obj {
        Object::Reference(id) => AcroFormSlot::Referenced(*id),
        _ => AcroFormSlot::InlineIn(catalog_id),
    };
    let acroform = resolve(doc, acroform_obj)?.as_dict()?;

    if let Ok(list) = acroform.get(b"Fields") {
        let mut visited = HashSet::new();
        for item in resolve(doc, list)?.as_array()? {
            walk_field(doc, item.as_reference()?, None, &mut fields, &mut visited)?;
        }
    }
    Ok((slot, fields))
}

fn walk_field(
    doc: &Document,
    id: ObjectId,
    prefix: Option<&str>,
    fields: &mut BTreeMap<String, ObjectId>,
    visited: &mut HashSet<ObjectId>,
) -> TenfortyResult<()> {
    // A crafted template can link /Kids back to an ancestor; refuse it
    // rather than recurse forever.
    if !visited.insert(id) {
        return Err(TenfortyError::MalformedTemplate {
            message: "circular field hierarchy".to_string(),
        });
    }
    let dict = doc.get_dictionary(id)?;

    let partial = dict
        .get(b"T")
        .ok()
        .and_then(|t| t.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
    let full = match (prefix, partial) {
        (Some(prefix), Some(name)) => Some(format!("{prefix}.{name}")),
        (None, Some(name)) => Some(name),
        (prefix, None) => prefix.map(str::to_string),
    };

    let kids: Vec<ObjectId> = dict
        .get(b"Kids")
        .ok()
        .and_then(|k| resolve(doc, k).ok())
        .and_then(|k| k.as_array().ok())
        .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
        .unwrap_or_default();

    // Kids that carry their own /T are child fields; bare kids are split
    // widgets of this terminal field.
    let has_child_fields = kids.iter().any(|kid| {
        doc.get_dictionary(*kid)
            .ok()
            .is_some_and(|d| d.has(b"T"))
    });

    if has_child_fields {
        for kid in kids {
            walk_field(doc, kid, full.as_deref(), fields, visited)?;
        }
    } else if let Some(full) = full {
        fields.insert(full, id);
    }
    Ok(())
}

fn set_field_value(doc: &mut Document, id: ObjectId, value: &FieldValue) -> TenfortyResult<()> {
    // Split widgets need /AS mirrored onto each kid.
    let kids: Vec<ObjectId> = doc
        .get_dictionary(id)?
        .get(b"Kids")
        .ok()
        .and_then(|k| k.as_array().ok())
        .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
        .unwrap_or_default();

    match value {
        FieldValue::Text(text) => {
            let dict = doc.get_object_mut(id)?.as_dict_mut()?;
            dict.set("V", Object::string_literal(text.as_str()));
        }
        FieldValue::Check(on) => {
            let state = if *on { CHECKBOX_ON } else { CHECKBOX_OFF };
            {
                let dict = doc.get_object_mut(id)?.as_dict_mut()?;
                dict.set("V", Object::Name(state.to_vec()));
                dict.set("AS", Object::Name(state.to_vec()));
            }
            for kid in kids {
                let widget = doc.get_object_mut(kid)?.as_dict_mut()?;
                widget.set("AS", Object::Name(state.to_vec()));
            }
        }
    }
    Ok(())
}

fn set_need_appearances(doc: &mut Document, slot: AcroFormSlot) -> TenfortyResult<()> {
    match slot {
        AcroFormSlot::Referenced(id) => {
            let acroform = doc.get_object_mut(id)?.as_dict_mut()?;
            acroform.set("NeedAppearances", Object::Boolean(true));
        }
        AcroFormSlot::InlineIn(catalog_id) => {
            let catalog = doc.get_object_mut(catalog_id)?.as_dict_mut()?;
            let mut acroform = match catalog.get(b"AcroForm").and_then(Object::as_dict) {
                Ok(dict) => dict.clone(),
                Err(_) => lopdf::Dictionary::new(),
            };
            acroform.set("NeedAppearances", Object::Boolean(true));
            catalog.set("AcroForm", Object::Dictionary(acroform));
        }
    }
    Ok(())
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> TenfortyResult<&'a Object> {
    Ok(match obj {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    })
}

/// Map a return with the shipped 1040 layout and current-year tables,
/// then fill `template` into `output`.
///
/// This is the export entry point the GUI and CLI call; the mapping and
/// the write either both happen or neither does.
pub fn export_1040_only(data: &TaxData, template: &Path, output: &Path) -> TenfortyResult<()> {
    let tables = TaxYearTables::default();
    let table = FieldMapper::form_1040(&tables).map(data)?;
    PdfExporter::new(template).export(&table, output)
}

/// `export_1040_only` for callers holding a plain nested mapping instead
/// of a `TaxData`.
pub fn export_1040_value(
    value: serde_json::Value,
    template: &Path,
    output: &Path,
) -> TenfortyResult<()> {
    let data = TaxData::from_value(value)?;
    export_1040_only(&data, template, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_template_fails_without_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let exporter = PdfExporter::new(dir.path().join("no_such_template.pdf"));

        let err = exporter.export(&FieldTable::new(), &output).unwrap_err();
        assert!(matches!(err, TenfortyError::TemplateNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_export_1040_only_propagates_template_failure() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let data = TaxData::new();

        let result = export_1040_only(&data, &dir.path().join("missing.pdf"), &output);
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
