use crate::schema::{
    constant::ConstantDecl,
    error::DeclareError,
    field::FieldDecl,
    linearize::linearize,
    type_def::{PlainDef, TypeDef},
    type_schema::{DeclaredField, PlainSchema, ResolvedField, Slot, TypeSchema},
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

///
/// ResolvedType
///

#[derive(Clone, Debug)]
pub enum ResolvedType {
    Data(Arc<TypeSchema>),
    Plain(Arc<PlainSchema>),
}

impl ResolvedType {
    fn linearization(&self) -> &[String] {
        match self {
            Self::Data(schema) => &schema.linearization,
            Self::Plain(schema) => &schema.linearization,
        }
    }
}

/// What the ancestor walk has resolved a member name to so far.
enum Seen {
    Field {
        ordinal: u64,
        owner: String,
        decl: Arc<FieldDecl>,
    },
    Constant {
        decl: Arc<ConstantDecl>,
    },
    Plain,
}

///
/// Registry
///
/// Owns every resolved type. Registration is the schema-resolution pass:
/// it linearizes the declared bases, walks them most-general first applying
/// the override-legality rules, fixes field ordering by first-seen ordinal,
/// and assigns the dense storage layout. All failures abort registration
/// and leave the registry unchanged.
///
/// Ordinals are handed out by the registry itself, so field ordering is
/// deterministic per registry with no process-wide counter.
///

#[derive(Debug, Default)]
pub struct Registry {
    types: HashMap<String, ResolvedType>,
    next_ordinal: u64,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedType> {
        self.types.get(name)
    }

    /// The resolved schema of a registered data type.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&Arc<TypeSchema>> {
        match self.types.get(name) {
            Some(ResolvedType::Data(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Register a non-schema-bearing type.
    ///
    /// No member legality runs here; conflicts surface when a data
    /// descendant resolves over the chain.
    pub fn register_plain(&mut self, def: PlainDef) -> Result<Arc<PlainSchema>, DeclareError> {
        if self.types.contains_key(&def.name) {
            return Err(DeclareError::DuplicateType {
                type_name: def.name,
            });
        }

        let linearization = self.linearize_bases(&def.name, &def.bases)?;

        let schema = Arc::new(PlainSchema {
            name: def.name.clone(),
            linearization,
            slotted: def.slotted,
            members: def.members,
        });
        self.types
            .insert(def.name, ResolvedType::Plain(Arc::clone(&schema)));

        Ok(schema)
    }

    /// Register a data type, producing its resolved schema.
    pub fn register(&mut self, def: TypeDef) -> Result<Arc<TypeSchema>, DeclareError> {
        if self.types.contains_key(&def.name) {
            return Err(DeclareError::DuplicateType {
                type_name: def.name,
            });
        }
        check_duplicate_members(&def)?;

        let linearization = self.linearize_bases(&def.name, &def.bases)?;

        let mut seen: HashMap<String, Seen> = HashMap::new();
        let mut constant_order: Vec<String> = Vec::new();

        // Ancestors, most-general first, excluding the candidate itself.
        for ancestor in linearization.iter().skip(1).rev() {
            // linearization only contains registered types
            let resolved = &self.types[ancestor];
            match resolved {
                ResolvedType::Plain(plain) => {
                    if !plain.slotted {
                        return Err(DeclareError::UnslottedBase {
                            type_name: def.name,
                            base: plain.name.clone(),
                        });
                    }
                    walk_plain_members(&def.name, plain, &mut seen)?;
                }
                ResolvedType::Data(data) => {
                    walk_data_members(&def.name, data, &mut seen, &mut constant_order)?;
                }
            }
        }

        // The candidate's own declarations come last.
        let mut declared_fields = Vec::with_capacity(def.fields.len());
        for (name, decl) in def.fields {
            if decl.is_ambiguous_default() {
                return Err(DeclareError::DefaultAndFactory {
                    type_name: def.name,
                    field: name,
                });
            }

            self.next_ordinal += 1;
            let fresh = self.next_ordinal;
            let decl = Arc::new(decl);

            let ordinal = match seen.get(&name) {
                None => fresh,
                Some(Seen::Field { ordinal, .. }) => *ordinal,
                Some(Seen::Constant { .. }) => {
                    return Err(DeclareError::FieldOverridesConstant {
                        type_name: def.name.clone(),
                        base: def.name.clone(),
                        member: name,
                    });
                }
                Some(Seen::Plain) => {
                    return Err(DeclareError::FieldOverridesMember {
                        type_name: def.name.clone(),
                        base: def.name.clone(),
                        member: name,
                    });
                }
            };

            declared_fields.push(DeclaredField {
                name: name.clone(),
                decl: Arc::clone(&decl),
                ordinal: fresh,
            });
            insert_field(&mut seen, name, ordinal, def.name.clone(), decl);
        }

        let mut declared_constants = Vec::with_capacity(def.constants.len());
        for (name, decl) in def.constants {
            let decl = Arc::new(decl);
            match seen.get(&name) {
                None => constant_order.push(name.clone()),
                Some(Seen::Constant { .. }) => {}
                Some(Seen::Field { .. }) => {
                    return Err(DeclareError::ConstantOverridesField {
                        type_name: def.name.clone(),
                        base: def.name.clone(),
                        member: name,
                    });
                }
                Some(Seen::Plain) => {
                    return Err(DeclareError::ConstantOverridesMember {
                        type_name: def.name.clone(),
                        base: def.name.clone(),
                        member: name,
                    });
                }
            }

            declared_constants.push((name.clone(), Arc::clone(&decl)));
            seen.insert(name, Seen::Constant { decl });
        }

        // Final order: ascending first-seen ordinal, then dense slot indices.
        let mut resolved: Vec<(String, u64, String, Arc<FieldDecl>)> = seen
            .iter()
            .filter_map(|(name, member)| match member {
                Seen::Field {
                    ordinal,
                    owner,
                    decl,
                } => Some((name.clone(), *ordinal, owner.clone(), Arc::clone(decl))),
                _ => None,
            })
            .collect();
        resolved.sort_by_key(|(_, ordinal, _, _)| *ordinal);

        let mut fields = Vec::with_capacity(resolved.len());
        let mut index = HashMap::with_capacity(resolved.len());
        for (i, (name, ordinal, owner, decl)) in resolved.into_iter().enumerate() {
            index.insert(name.clone(), i);
            fields.push(ResolvedField {
                name,
                decl,
                ordinal,
                slot: Slot { owner, index: i },
            });
        }

        let constants = constant_order
            .into_iter()
            .map(|name| match seen.get(&name) {
                Some(Seen::Constant { decl }) => (name.clone(), Arc::clone(decl)),
                _ => unreachable!("constant order only tracks resolved constants"),
            })
            .collect();

        let schema = Arc::new(TypeSchema {
            name: def.name.clone(),
            linearization,
            fields,
            index,
            constants,
            declared_fields,
            declared_constants,
            mutable: def.mutable,
        });
        self.types
            .insert(def.name, ResolvedType::Data(Arc::clone(&schema)));

        Ok(schema)
    }

    fn linearize_bases(
        &self,
        type_name: &str,
        bases: &[String],
    ) -> Result<Vec<String>, DeclareError> {
        let mut base_lins = Vec::with_capacity(bases.len());
        for base in bases {
            let resolved = self.types.get(base).ok_or_else(|| DeclareError::UnknownBase {
                type_name: type_name.to_string(),
                base: base.clone(),
            })?;
            base_lins.push(resolved.linearization().to_vec());
        }

        linearize(type_name, bases, &base_lins).ok_or_else(|| DeclareError::InconsistentHierarchy {
            type_name: type_name.to_string(),
        })
    }
}

fn check_duplicate_members(def: &TypeDef) -> Result<(), DeclareError> {
    let mut names = HashSet::new();
    for name in def
        .fields
        .iter()
        .map(|(n, _)| n)
        .chain(def.constants.iter().map(|(n, _)| n))
    {
        if !names.insert(name) {
            return Err(DeclareError::DuplicateMember {
                type_name: def.name.clone(),
                member: name.clone(),
            });
        }
    }

    Ok(())
}

fn walk_plain_members(
    type_name: &str,
    plain: &PlainSchema,
    seen: &mut HashMap<String, Seen>,
) -> Result<(), DeclareError> {
    for member in &plain.members {
        match seen.get(member) {
            Some(Seen::Field { .. }) => {
                return Err(DeclareError::MemberOverridesField {
                    type_name: type_name.to_string(),
                    base: plain.name.clone(),
                    member: member.clone(),
                });
            }
            Some(Seen::Constant { .. }) => {
                return Err(DeclareError::MemberOverridesConstant {
                    type_name: type_name.to_string(),
                    base: plain.name.clone(),
                    member: member.clone(),
                });
            }
            _ => {
                seen.insert(member.clone(), Seen::Plain);
            }
        }
    }

    Ok(())
}

fn walk_data_members(
    type_name: &str,
    data: &TypeSchema,
    seen: &mut HashMap<String, Seen>,
    constant_order: &mut Vec<String>,
) -> Result<(), DeclareError> {
    for declared in &data.declared_fields {
        match seen.get(&declared.name) {
            None => insert_field(
                seen,
                declared.name.clone(),
                declared.ordinal,
                data.name.clone(),
                Arc::clone(&declared.decl),
            ),
            Some(Seen::Field { ordinal, owner, .. }) => {
                // Override keeps the first-seen position and slot owner.
                let (ordinal, owner) = (*ordinal, owner.clone());
                insert_field(
                    seen,
                    declared.name.clone(),
                    ordinal,
                    owner,
                    Arc::clone(&declared.decl),
                );
            }
            Some(Seen::Constant { .. }) => {
                return Err(DeclareError::FieldOverridesConstant {
                    type_name: type_name.to_string(),
                    base: data.name.clone(),
                    member: declared.name.clone(),
                });
            }
            Some(Seen::Plain) => {
                return Err(DeclareError::FieldOverridesMember {
                    type_name: type_name.to_string(),
                    base: data.name.clone(),
                    member: declared.name.clone(),
                });
            }
        }
    }

    for (name, decl) in &data.declared_constants {
        match seen.get(name) {
            None => constant_order.push(name.clone()),
            Some(Seen::Constant { .. }) => {}
            Some(Seen::Field { .. }) => {
                return Err(DeclareError::ConstantOverridesField {
                    type_name: type_name.to_string(),
                    base: data.name.clone(),
                    member: name.clone(),
                });
            }
            Some(Seen::Plain) => {
                return Err(DeclareError::ConstantOverridesMember {
                    type_name: type_name.to_string(),
                    base: data.name.clone(),
                    member: name.clone(),
                });
            }
        }
        seen.insert(
            name.clone(),
            Seen::Constant {
                decl: Arc::clone(decl),
            },
        );
    }

    Ok(())
}

fn insert_field(
    seen: &mut HashMap<String, Seen>,
    name: String,
    ordinal: u64,
    owner: String,
    decl: Arc<FieldDecl>,
) {
    seen.insert(
        name,
        Seen::Field {
            ordinal,
            owner,
            decl,
        },
    );
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn field() -> FieldDecl {
        FieldDecl::new()
    }

    #[test]
    fn ancestor_fields_keep_their_position() {
        let mut registry = Registry::new();
        registry
            .register(TypeDef::new("A").field("x", field()))
            .unwrap();
        registry
            .register(TypeDef::new("B").base("A").field("y", field()))
            .unwrap();
        let c = registry
            .register(
                TypeDef::new("C")
                    .base("B")
                    // redeclaration of x must not move it to the back
                    .field("z", field())
                    .field("x", field()),
            )
            .unwrap();

        let names: Vec<&str> = c.fields().iter().map(ResolvedField::name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn override_keeps_ancestor_slot_owner() {
        let mut registry = Registry::new();
        registry
            .register(TypeDef::new("A").field("x", field()))
            .unwrap();
        let b = registry
            .register(TypeDef::new("B").base("A").field("x", field().deletable()))
            .unwrap();

        let x = b.field("x").unwrap();
        assert_eq!(x.slot().owner, "A");
        assert!(x.decl().is_deletable());
    }

    #[test]
    fn diamond_linearizes_and_resolves_once() {
        let mut registry = Registry::new();
        registry
            .register(TypeDef::new("A").field("x", field()))
            .unwrap();
        registry
            .register(TypeDef::new("B").base("A").field("y", field()))
            .unwrap();
        registry
            .register(TypeDef::new("C").base("A").field("z", field()))
            .unwrap();
        let d = registry
            .register(TypeDef::new("D").base("B").base("C"))
            .unwrap();

        assert_eq!(d.linearization(), &["D", "B", "C", "A"]);
        let names: Vec<&str> = d.fields().iter().map(ResolvedField::name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn field_may_not_override_plain_member() {
        let mut registry = Registry::new();
        registry
            .register_plain(PlainDef::new("Helper").member("x"))
            .unwrap();
        let err = registry
            .register(TypeDef::new("T").base("Helper").field("x", field()))
            .unwrap_err();

        assert!(matches!(err, DeclareError::FieldOverridesMember { .. }));
    }

    #[test]
    fn plain_member_may_not_override_field() {
        let mut registry = Registry::new();
        registry
            .register(TypeDef::new("A").field("x", field()))
            .unwrap();
        registry
            .register_plain(PlainDef::new("Helper").base("A").member("x"))
            .unwrap();
        let err = registry
            .register(TypeDef::new("T").base("Helper"))
            .unwrap_err();

        assert!(matches!(err, DeclareError::MemberOverridesField { .. }));
    }

    #[test]
    fn unslotted_base_fails_registration() {
        let mut registry = Registry::new();
        registry
            .register_plain(PlainDef::new("Loose").dynamic())
            .unwrap();
        let err = registry
            .register(TypeDef::new("T").base("Loose"))
            .unwrap_err();

        assert_eq!(
            err,
            DeclareError::UnslottedBase {
                type_name: "T".to_string(),
                base: "Loose".to_string(),
            }
        );
    }

    #[test]
    fn constant_overrides_are_kind_checked() {
        let mut registry = Registry::new();
        registry
            .register(TypeDef::new("A").constant("K", ConstantDecl::new(1i64)))
            .unwrap();

        let err = registry
            .register(TypeDef::new("B").base("A").field("K", field()))
            .unwrap_err();
        assert!(matches!(err, DeclareError::FieldOverridesConstant { .. }));

        let b = registry
            .register(
                TypeDef::new("B2")
                    .base("A")
                    .constant("K", ConstantDecl::new(2i64)),
            )
            .unwrap();
        assert_eq!(b.constant("K"), Some(&Value::Int(2)));
    }

    #[test]
    fn ambiguous_default_fails_at_registration() {
        let mut registry = Registry::new();
        let err = registry
            .register(TypeDef::new("T").field(
                "x",
                field().with_default(1i64).with_factory(|| Value::Int(2)),
            ))
            .unwrap_err();

        assert!(matches!(err, DeclareError::DefaultAndFactory { .. }));
    }
}
