//! Object kind descriptors.
//!
//! An [`ObjectSchema`] describes one kind of configuration object: where it
//! lives in the REST API and which fields the reconciler manages. One
//! generic reconciler parameterized by a schema replaces per-kind
//! reconciliation code.

/// How a managed field is shaped and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string value.
    Scalar,

    /// An ordered list of strings. `wrapper` names the inner element when
    /// the API nests the list (`{"members": {"member": [...]}}`); `None`
    /// when the list is a plain array.
    Sequence { wrapper: Option<&'static str> },

    /// An opaque nested document, compared structurally as-is.
    Block,
}

/// One managed field of an object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    key: &'static str,
    kind: FieldKind,
    required: bool,
}

impl FieldSpec {
    pub fn scalar(key: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::Scalar,
            required: false,
        }
    }

    pub fn sequence(key: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::Sequence { wrapper: None },
            required: false,
        }
    }

    pub fn wrapped_sequence(key: &'static str, wrapper: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::Sequence {
                wrapper: Some(wrapper),
            },
            required: false,
        }
    }

    pub fn block(key: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::Block,
            required: false,
        }
    }

    /// Mark the field as required when the object should be present.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Descriptor for one object kind.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    kind: &'static str,
    endpoint: &'static str,
    fields: Vec<FieldSpec>,
    ignore_defaulted: bool,
}

impl ObjectSchema {
    /// Schema for `kind`, served at `endpoint`, managing `fields`.
    pub fn new(kind: &'static str, endpoint: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            kind,
            endpoint,
            fields,
            ignore_defaulted: false,
        }
    }

    /// Widen the ignore scope: managed fields the desired document does not
    /// set are also excluded from comparison. Off by default, so only
    /// fields absent from the schema are ignored.
    pub fn ignore_defaulted(mut self, ignore: bool) -> Self {
        self.ignore_defaulted = ignore;
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn ignores_defaulted(&self) -> bool {
        self.ignore_defaulted
    }

    /// Managed fields that must be set when presence is `present`.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }
}
