//! Desired state and observed-state normalization.

use serde_json::{Map, Value};

use crate::error::ReconcileError;
use crate::schema::{FieldKind, ObjectSchema};

/// Whether the caller wants the object to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

/// Declarative input to one reconciliation pass. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredState {
    presence: Presence,
    entry: Value,
}

impl DesiredState {
    /// The object should exist with the given entry document. Unset and
    /// empty fields are pruned so the document only carries what the
    /// caller actually set.
    pub fn present(entry: Value) -> Self {
        Self {
            presence: Presence::Present,
            entry: prune_empty(&entry),
        }
    }

    /// The object should not exist.
    pub fn absent() -> Self {
        Self {
            presence: Presence::Absent,
            entry: Value::Null,
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// The materialized entry document.
    pub fn entry(&self) -> &Value {
        &self.entry
    }
}

/// Fail fast when a required field is unset for a present object.
///
/// This is a caller-contract check; it runs before any device call.
pub fn validate_desired(
    schema: &ObjectSchema,
    desired: &DesiredState,
) -> Result<(), ReconcileError> {
    if desired.presence() == Presence::Absent {
        return Ok(());
    }

    for field in schema.required_fields() {
        let value = desired.entry().get(field.key());
        if value.is_none() || value.is_some_and(is_empty) {
            return Err(ReconcileError::Validation(field.key()));
        }
    }
    Ok(())
}

/// Recursively drop null, empty-string, and empty-collection values.
pub fn prune_empty(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter_map(|(key, value)| {
                    let pruned = prune_empty(value);
                    (!is_empty(&pruned)).then(|| (key.clone(), pruned))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(prune_empty)
                .filter(|item| !is_empty(item))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// The managed projection of an entry: name plus managed fields, shapes
/// untouched. This is the form diffs report.
pub fn managed_projection(entry: &Value, schema: &ObjectSchema) -> Value {
    let mut projected = Map::new();

    if let Some(name) = entry.get("@name") {
        projected.insert("@name".to_string(), name.clone());
    }
    for field in schema.fields() {
        if let Some(value) = entry.get(field.key()) {
            projected.insert(field.key().to_string(), value.clone());
        }
    }

    Value::Object(projected)
}

/// The comparison form of an entry: managed fields with every sequence
/// normalized to a plain ordered array.
///
/// Parsing collapses a single-element list to a scalar, and the API nests
/// some lists inside a wrapper element; both ambiguities are resolved here
/// so the equality check sees one fixed shape.
pub fn comparison_form(entry: &Value, schema: &ObjectSchema) -> Value {
    let mut normalized = Map::new();

    if let Some(name) = entry.get("@name") {
        normalized.insert("@name".to_string(), name.clone());
    }
    for field in schema.fields() {
        let Some(value) = entry.get(field.key()) else {
            continue;
        };
        let value = match field.kind() {
            FieldKind::Scalar | FieldKind::Block => value.clone(),
            FieldKind::Sequence { wrapper } => normalize_sequence(value, wrapper),
        };
        normalized.insert(field.key().to_string(), value);
    }

    Value::Object(normalized)
}

fn normalize_sequence(value: &Value, wrapper: Option<&'static str>) -> Value {
    let inner = match (wrapper, value) {
        (Some(wrapper), Value::Object(map)) => map.get(wrapper).cloned().unwrap_or(Value::Null),
        _ => value.clone(),
    };

    match inner {
        Value::Array(items) => Value::Array(items),
        Value::Null => Value::Array(Vec::new()),
        scalar => Value::Array(vec![scalar]),
    }
}
