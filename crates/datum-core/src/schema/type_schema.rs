use crate::schema::{constant::ConstantDecl, field::FieldDecl};
use crate::value::Value;
use std::{collections::HashMap, sync::Arc};

///
/// Slot
///
/// One storage cell in the fixed per-type layout. `owner` is the type that
/// first introduced the field, so same-named private fields from unrelated
/// ancestors never collide; `index` is the dense position in instance
/// storage.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Slot {
    pub owner: String,
    pub index: usize,
}

///
/// ResolvedField
///
/// A field after resolution: the winning declaration, the ordinal captured
/// the first time the name was seen, and the assigned storage slot.
///

#[derive(Clone, Debug)]
pub struct ResolvedField {
    pub(crate) name: String,
    pub(crate) decl: Arc<FieldDecl>,
    pub(crate) ordinal: u64,
    pub(crate) slot: Slot,
}

impl ResolvedField {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn decl(&self) -> &FieldDecl {
        &self.decl
    }

    #[must_use]
    pub const fn ordinal(&self) -> u64 {
        self.ordinal
    }

    #[must_use]
    pub const fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Owner-scoped storage name, e.g. `Point::x`.
    #[must_use]
    pub fn slot_name(&self) -> String {
        format!("{}::{}", self.slot.owner, self.name)
    }
}

///
/// DeclaredField
///
/// A field as declared by one type, with the ordinal it received at that
/// type's registration. Descendant resolution walks these.
///

#[derive(Clone, Debug)]
pub(crate) struct DeclaredField {
    pub(crate) name: String,
    pub(crate) decl: Arc<FieldDecl>,
    pub(crate) ordinal: u64,
}

///
/// TypeSchema
///
/// The resolved, ordered schema of one data type. Append-only across the
/// hierarchy by construction: descendants re-resolve from their ancestors'
/// declarations and can add members but never remove or reorder inherited
/// ones.
///

#[derive(Debug)]
pub struct TypeSchema {
    pub(crate) name: String,
    /// Most-derived first; starts with this type itself.
    pub(crate) linearization: Vec<String>,
    pub(crate) fields: Vec<ResolvedField>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) constants: Vec<(String, Arc<ConstantDecl>)>,
    pub(crate) declared_fields: Vec<DeclaredField>,
    pub(crate) declared_constants: Vec<(String, Arc<ConstantDecl>)>,
    pub(crate) mutable: bool,
}

impl TypeSchema {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved fields, in schema order.
    #[must_use]
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Fields that participate in positional construction, in schema order.
    pub fn init_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.decl.init())
    }

    /// The resolved value of a class-level constant.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, decl)| decl.value())
    }

    pub fn constants(&self) -> impl Iterator<Item = (&str, &ConstantDecl)> {
        self.constants
            .iter()
            .map(|(name, decl)| (name.as_str(), decl.as_ref()))
    }

    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Ancestor chain, most-derived first, starting with this type.
    #[must_use]
    pub fn linearization(&self) -> &[String] {
        &self.linearization
    }

    /// Is `name` this type or one of its ancestors?
    #[must_use]
    pub fn descends_from(&self, name: &str) -> bool {
        self.linearization.iter().any(|t| t == name)
    }
}

///
/// PlainSchema
///
/// A registered non-schema-bearing type: member names and the slot
/// discipline flag, plus its own linearization so it can sit anywhere in a
/// data type's ancestry.
///

#[derive(Debug)]
pub struct PlainSchema {
    pub(crate) name: String,
    pub(crate) linearization: Vec<String>,
    pub(crate) slotted: bool,
    pub(crate) members: Vec<String>,
}

impl PlainSchema {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn is_slotted(&self) -> bool {
        self.slotted
    }

    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }
}
