use crate::{
    schema::relationship::{Factory, Relationship},
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// FieldDecl
///
/// One declared field: an optional default or zero-argument factory, the
/// binding relationship (converter/validator/type constraint), and the
/// behavioral flags. Immutable once built.
///
/// `default` and `factory` are mutually exclusive; supplying both is a
/// declaration error raised when the owning type registers, never at
/// instance-construction time.
///

#[derive(Clone)]
pub struct FieldDecl {
    relationship: Relationship,
    default: Option<Value>,
    factory: Option<Factory>,
    init: bool,
    repr: bool,
    eq: bool,
    hash: Option<bool>,
    settable: bool,
    deletable: bool,
    doc: Option<String>,
    metadata: Option<Value>,
}

impl FieldDecl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            relationship: Relationship::new(),
            default: None,
            factory: None,
            init: true,
            repr: true,
            eq: true,
            hash: None,
            settable: true,
            deletable: false,
            doc: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationship = relationship;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_factory(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Exclude the field from positional construction.
    #[must_use]
    pub const fn no_init(mut self) -> Self {
        self.init = false;
        self
    }

    /// Exclude the field from the display form.
    #[must_use]
    pub const fn no_repr(mut self) -> Self {
        self.repr = false;
        self
    }

    /// Exclude the field from structural equality.
    #[must_use]
    pub const fn no_eq(mut self) -> Self {
        self.eq = false;
        self
    }

    /// Override hash significance; defaults to the `eq` flag.
    #[must_use]
    pub const fn with_hash(mut self, hash: bool) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Forbid direct assignment even on mutability-opted-in types.
    #[must_use]
    pub const fn not_settable(mut self) -> Self {
        self.settable = false;
        self
    }

    /// Allow the field's value to be deleted (by evolution or direct unset).
    #[must_use]
    pub const fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Attach opaque metadata; the core never interprets it.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    // accessors

    #[must_use]
    pub const fn relationship(&self) -> &Relationship {
        &self.relationship
    }

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some() || self.factory.is_some()
    }

    /// Resolve the default value, running the factory if one is declared.
    #[must_use]
    pub fn resolve_default(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }

        self.factory.as_ref().map(|factory| factory())
    }

    #[must_use]
    pub const fn is_ambiguous_default(&self) -> bool {
        self.default.is_some() && self.factory.is_some()
    }

    #[must_use]
    pub const fn init(&self) -> bool {
        self.init
    }

    #[must_use]
    pub const fn repr(&self) -> bool {
        self.repr
    }

    #[must_use]
    pub const fn eq(&self) -> bool {
        self.eq
    }

    /// Hash significance falls back to equality significance.
    #[must_use]
    pub const fn hash_significant(&self) -> bool {
        match self.hash {
            Some(hash) => hash,
            None => self.eq,
        }
    }

    #[must_use]
    pub const fn settable(&self) -> bool {
        self.settable
    }

    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        self.deletable
    }

    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }
}

impl Default for FieldDecl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("relationship", &self.relationship)
            .field("default", &self.default)
            .field("factory", &self.factory.as_ref().map(|_| ".."))
            .field("init", &self.init)
            .field("repr", &self.repr)
            .field("eq", &self.eq)
            .field("hash", &self.hash)
            .field("settable", &self.settable)
            .field("deletable", &self.deletable)
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
