//! Named types and the two resolution operations built on them.
//!
//! Types live in an arena and are referred to by `TypeId`. Identity is
//! nominal: two separately declared array or record types get distinct ids
//! even when their structure is identical.

use std::fmt::Display;

/// Handle into a `TypeTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

impl TypeId {
    pub const INT: TypeId = TypeId(0);
    pub const STRING: TypeId = TypeId(1);
    pub const UNIT: TypeId = TypeId(2);
}

impl Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Int,
    String,
    Unit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Reserved by name but not yet defined. Only visible while the
    /// declarations of a `let` are being registered.
    Pending,
    Primitive(Primitive),
    Alias(TypeId),
    Array(TypeId),
    /// Ordered fields with unique names.
    Record(Vec<(String, TypeId)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Pending,
    Primitive,
    Alias,
    Array,
    Record,
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    definition: Type,
}

#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    /// A table holding `int`, `string` and `unit` at their fixed ids.
    pub fn new() -> Self {
        let mut table = TypeTable { entries: vec![] };
        table.insert("int", Type::Primitive(Primitive::Int));
        table.insert("string", Type::Primitive(Primitive::String));
        table.insert("unit", Type::Primitive(Primitive::Unit));
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: &str, definition: Type) -> TypeId {
        self.entries.push(TypeEntry {
            name: String::from(name),
            definition,
        });
        TypeId(self.entries.len() - 1)
    }

    /// Reserves a fresh id for `name`; the definition follows with `define`.
    pub fn declare(&mut self, name: &str) -> TypeId {
        self.insert(name, Type::Pending)
    }

    pub fn define(&mut self, id: TypeId, definition: Type) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.definition = definition;
        }
    }

    pub fn get(&self, id: TypeId) -> &Type {
        match self.entries.get(id.0) {
            Some(entry) => &entry.definition,
            None => &Type::Pending,
        }
    }

    pub fn name(&self, id: TypeId) -> &str {
        match self.entries.get(id.0) {
            Some(entry) => &entry.name,
            None => "<unknown>",
        }
    }

    pub fn kind(&self, id: TypeId) -> TypeKind {
        match self.get(id) {
            Type::Pending => TypeKind::Pending,
            Type::Primitive(_) => TypeKind::Primitive,
            Type::Alias(_) => TypeKind::Alias,
            Type::Array(_) => TypeKind::Array,
            Type::Record(_) => TypeKind::Record,
        }
    }

    /// Follows an alias chain to the first non-alias type.
    ///
    /// The walk is bounded by the table size, so a cyclic chain ends on an
    /// alias instead of looping.
    pub fn resolve_alias(&self, id: TypeId) -> TypeId {
        let mut current = id;
        for _ in 0..=self.entries.len() {
            match self.get(current) {
                Type::Alias(target) => current = *target,
                _ => return current,
            }
        }
        current
    }

    /// Kind reached through aliases. Arrays and records are terminal.
    pub fn actual_kind(&self, id: TypeId) -> TypeKind {
        self.kind(self.resolve_alias(id))
    }

    /// Resolves aliases and, for arrays, descends into the element type.
    ///
    /// Primitives and records resolve to themselves, so for an array this
    /// yields the scalar or record reached by indexing all the way down.
    pub fn actual_type(&self, id: TypeId) -> TypeId {
        let mut current = id;
        for _ in 0..=self.entries.len() {
            match self.get(current) {
                Type::Alias(target) | Type::Array(target) => current = *target,
                _ => return current,
            }
        }
        current
    }

    /// Whether a value of type `ty` may flow into a location typed `node`.
    ///
    /// Two array types must be the same declaration. Otherwise the actual
    /// types must agree, and any record accepts `unit` (the type of `nil`).
    pub fn is_assignable(&self, node: TypeId, ty: TypeId) -> bool {
        if self.kind(node) == TypeKind::Array && self.kind(ty) == TypeKind::Array && node != ty {
            return false;
        }

        self.actual_type(node) == self.actual_type(ty)
            || (self.actual_kind(node) == TypeKind::Record && ty == TypeId::UNIT)
    }

    pub fn is_int(&self, id: TypeId) -> bool {
        self.actual_kind(id) == TypeKind::Primitive && self.actual_type(id) == TypeId::INT
    }

    pub fn is_unit(&self, id: TypeId) -> bool {
        self.actual_type(id) == TypeId::UNIT
    }

    /// Fields of the record reached through aliases, if any.
    pub fn record_fields(&self, id: TypeId) -> Option<&[(String, TypeId)]> {
        match self.get(self.resolve_alias(id)) {
            Type::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn field_type(&self, id: TypeId, field: &str) -> Option<TypeId> {
        self.record_fields(id)?
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| *ty)
    }

    /// Whether the alias chain starting at `id` revisits a type.
    pub fn has_alias_cycle(&self, id: TypeId) -> bool {
        let mut seen = vec![id];
        let mut current = id;
        while let Type::Alias(target) = self.get(current) {
            if seen.contains(target) {
                return true;
            }
            seen.push(*target);
            current = *target;
        }
        false
    }
}
