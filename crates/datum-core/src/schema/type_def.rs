use crate::schema::{constant::ConstantDecl, field::FieldDecl};

///
/// TypeDef
///
/// A candidate data-bearing type: name, ordered direct bases
/// (most-derived first), declared fields/constants, and the per-type
/// mutability opt-in. Resolution happens when the definition registers.
///

#[derive(Clone, Debug)]
pub struct TypeDef {
    pub(crate) name: String,
    pub(crate) bases: Vec<String>,
    pub(crate) mutable: bool,
    pub(crate) fields: Vec<(String, FieldDecl)>,
    pub(crate) constants: Vec<(String, ConstantDecl)>,
}

impl TypeDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            mutable: false,
            fields: Vec::new(),
            constants: Vec::new(),
        }
    }

    #[must_use]
    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.bases.push(name.into());
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, decl: FieldDecl) -> Self {
        self.fields.push((name.into(), decl));
        self
    }

    #[must_use]
    pub fn constant(mut self, name: impl Into<String>, decl: ConstantDecl) -> Self {
        self.constants.push((name.into(), decl));
        self
    }

    /// Opt instances of this type into direct field assignment.
    #[must_use]
    pub const fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

///
/// PlainDef
///
/// A non-schema-bearing ancestor: ordinary members only. `slotted` asserts
/// the fixed-storage discipline; unslotted plain types poison any descendant
/// data type at registration.
///

#[derive(Clone, Debug)]
pub struct PlainDef {
    pub(crate) name: String,
    pub(crate) bases: Vec<String>,
    pub(crate) slotted: bool,
    pub(crate) members: Vec<String>,
}

impl PlainDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            slotted: true,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.bases.push(name.into());
        self
    }

    #[must_use]
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(name.into());
        self
    }

    /// Mark the type as carrying unconstrained dynamic attribute storage.
    #[must_use]
    pub const fn dynamic(mut self) -> Self {
        self.slotted = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
