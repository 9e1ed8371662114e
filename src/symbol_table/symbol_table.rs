use std::collections::HashMap;

use log::debug;

use crate::{
    ast::ast::Expr,
    builtins::{Builtin, BUILTINS},
    errors::errors::{Error, ErrorImpl},
    interpreter::value::Slot,
    Line,
};

use super::types::{TypeId, TypeTable};

/// Index of a scope on the stack. Valid for as long as that scope has not
/// been popped.
pub type ScopeId = usize;

/// Construct that opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOrigin {
    Let,
    While,
    For,
    Function,
}

#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub ty: TypeId,
    /// Runtime storage. Empty while type checking.
    pub slot: Option<Slot>,
    pub read_only: bool,
}

#[derive(Debug, Clone)]
pub enum FunctionBody<'ast> {
    Builtin(Builtin),
    Declared(&'ast Expr),
    /// Only the signature is known.
    Signature,
}

#[derive(Debug, Clone)]
pub struct FuncSymbol<'ast> {
    pub return_type: TypeId,
    pub params: Vec<(String, TypeId)>,
    pub body: FunctionBody<'ast>,
    /// Scope the function was declared in. Activations link to it.
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub enum Symbol<'ast> {
    Variable(VarSymbol),
    Function(FuncSymbol<'ast>),
}

impl<'ast> Symbol<'ast> {
    /// The variable's type, or the function's result type.
    pub fn get_type(&self) -> TypeId {
        match self {
            Symbol::Variable(variable) => variable.ty,
            Symbol::Function(function) => function.return_type,
        }
    }
}

#[derive(Debug)]
pub struct Scope<'ast> {
    pub symbols: HashMap<String, Symbol<'ast>>,
    pub types: HashMap<String, TypeId>,
    pub origin: ScopeOrigin,
    pub parent: Option<ScopeId>,
}

impl<'ast> Scope<'ast> {
    pub fn new(origin: ScopeOrigin, parent: Option<ScopeId>) -> Self {
        Scope {
            symbols: HashMap::new(),
            types: HashMap::new(),
            origin,
            parent,
        }
    }
}

/// Stack of lexical scopes over a shared type arena.
///
/// Lookups start at the innermost scope and follow `parent` links, so a
/// function activation only sees the scopes enclosing its declaration.
#[derive(Debug)]
pub struct SymbolTable<'ast> {
    types: TypeTable,
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> Default for SymbolTable<'ast> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<'ast> SymbolTable<'ast> {
    /// A stack holding one scope with the primitive types and the builtins.
    pub fn with_defaults() -> Self {
        Self::new(TypeTable::new())
    }

    /// Like `with_defaults`, reusing a type arena filled by an earlier pass.
    pub fn new(types: TypeTable) -> Self {
        let mut root = Scope::new(ScopeOrigin::Let, None);

        root.types.insert(String::from("int"), TypeId::INT);
        root.types.insert(String::from("string"), TypeId::STRING);
        root.types.insert(String::from("unit"), TypeId::UNIT);

        for (name, builtin) in BUILTINS.iter() {
            root.symbols.insert(
                String::from(*name),
                Symbol::Function(FuncSymbol {
                    return_type: builtin.return_type(),
                    params: builtin.params(),
                    body: FunctionBody::Builtin(*builtin),
                    scope: 0,
                }),
            );
        }

        SymbolTable {
            types,
            scopes: vec![root],
        }
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    pub fn into_types(self) -> TypeTable {
        self.types
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Id of the innermost scope.
    pub fn current_id(&self) -> Option<ScopeId> {
        self.scopes.len().checked_sub(1)
    }

    pub fn current(&self) -> Option<&Scope<'ast>> {
        self.scopes.last()
    }

    /// Origin of the innermost scope, without touching the stack.
    pub fn current_origin(&self) -> Option<ScopeOrigin> {
        self.current().map(|scope| scope.origin)
    }

    /// Opens a scope nested in the current one.
    pub fn push_scope(&mut self, origin: ScopeOrigin) -> ScopeId {
        let parent = self.current_id();
        self.push_scope_within(origin, parent)
    }

    /// Opens a scope whose lookups continue in `parent` rather than in the
    /// scope below it on the stack.
    pub fn push_scope_within(&mut self, origin: ScopeOrigin, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope::new(origin, parent));
        debug!(
            "push {:?} scope at depth {} (parent {:?})",
            origin,
            self.scopes.len(),
            parent
        );
        self.scopes.len() - 1
    }

    pub fn pop_scope(&mut self) -> Result<Scope<'ast>, Error> {
        match self.scopes.pop() {
            Some(scope) => {
                debug!(
                    "pop {:?} scope at depth {}",
                    scope.origin,
                    self.scopes.len() + 1
                );
                Ok(scope)
            }
            None => Err(Error::new(ErrorImpl::EmptyScopeStack, Line::null())),
        }
    }

    fn chain(&self) -> ScopeChain<'_, 'ast> {
        ScopeChain {
            scopes: &self.scopes,
            next: self.current_id(),
        }
    }

    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.chain().find_map(|scope| scope.symbols.get(name))
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.chain().find_map(|scope| scope.types.get(name).copied())
    }

    /// Inserts into the innermost scope.
    ///
    /// A name may be declared again in the same scope only with a different
    /// type; the newer symbol then hides the older one.
    pub fn add_symbol(&mut self, name: &str, symbol: Symbol<'ast>, line: Line) -> Result<(), Error> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| Error::new(ErrorImpl::EmptyScopeStack, line))?;

        if let Some(existing) = scope.symbols.get(name) {
            if existing.get_type() == symbol.get_type() {
                let error = match symbol {
                    Symbol::Variable(_) => ErrorImpl::VariableAlreadyDeclared {
                        variable: String::from(name),
                    },
                    Symbol::Function(_) => ErrorImpl::FunctionAlreadyDeclared {
                        function: String::from(name),
                    },
                };
                return Err(Error::new(error, line));
            }
        }

        scope.symbols.insert(String::from(name), symbol);
        Ok(())
    }

    /// Inserts into the innermost scope. Type names never repeat in a scope.
    pub fn add_type(&mut self, name: &str, ty: TypeId, line: Line) -> Result<(), Error> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| Error::new(ErrorImpl::EmptyScopeStack, line))?;

        if scope.types.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::TypeAlreadyDeclared {
                    type_: String::from(name),
                },
                line,
            ));
        }

        scope.types.insert(String::from(name), ty);
        Ok(())
    }
}

/// Walks from a scope outwards along `parent` links.
struct ScopeChain<'t, 'ast> {
    scopes: &'t [Scope<'ast>],
    next: Option<ScopeId>,
}

impl<'t, 'ast> Iterator for ScopeChain<'t, 'ast> {
    type Item = &'t Scope<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let scope = self.scopes.get(index)?;
        self.next = scope.parent.filter(|parent| *parent < index);
        Some(scope)
    }
}
