//! Cross-program lookups and typedef resolution.

use indexmap::IndexMap;

use crate::model::{Enum, Program, Service, Struct, Type, TypeRef, Typedef};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown program `{0}`")]
    UnknownProgram(String),

    #[error("unknown {kind} `{reference}`")]
    UnknownDefinition {
        kind: &'static str,
        reference: TypeRef,
    },

    #[error("typedef `{0}` resolves to itself")]
    TypedefCycle(TypeRef),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Name-indexed view over a root program and its transitive includes.
#[derive(Debug)]
pub struct ModelIndex<'a> {
    root: &'a Program,
    programs: IndexMap<&'a str, &'a Program>,
}

impl<'a> ModelIndex<'a> {
    pub fn new(root: &'a Program) -> Self {
        let mut programs = IndexMap::new();
        let mut pending = vec![root];
        while let Some(program) = pending.pop() {
            if programs.contains_key(program.name.as_str()) {
                continue;
            }
            programs.insert(program.name.as_str(), program);
            // Reverse keeps include order when popping.
            pending.extend(program.includes.iter().rev());
        }
        Self { root, programs }
    }

    pub fn root(&self) -> &'a Program {
        self.root
    }

    /// Root first, then includes depth-first in declaration order.
    pub fn programs(&self) -> impl Iterator<Item = &'a Program> + '_ {
        self.programs.values().copied()
    }

    pub fn program(&self, name: &str) -> Result<&'a Program> {
        self.programs
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnknownProgram(name.to_owned()))
    }

    pub fn structure(&self, reference: &TypeRef) -> Result<&'a Struct> {
        self.program(&reference.program)?
            .structs
            .iter()
            .find(|s| s.name == reference.name)
            .ok_or_else(|| unknown("struct", reference))
    }

    pub fn enumeration(&self, reference: &TypeRef) -> Result<&'a Enum> {
        self.program(&reference.program)?
            .enums
            .iter()
            .find(|e| e.name == reference.name)
            .ok_or_else(|| unknown("enum", reference))
    }

    pub fn typedef(&self, reference: &TypeRef) -> Result<&'a Typedef> {
        self.program(&reference.program)?
            .typedefs
            .iter()
            .find(|t| t.name == reference.name)
            .ok_or_else(|| unknown("typedef", reference))
    }

    pub fn service(&self, reference: &TypeRef) -> Result<&'a Service> {
        self.program(&reference.program)?
            .services
            .iter()
            .find(|s| s.name == reference.name)
            .ok_or_else(|| unknown("service", reference))
    }

    /// Follows typedef chains down to the underlying type.
    pub fn true_type<'t>(&self, ty: &'t Type) -> Result<&'t Type>
    where
        'a: 't,
    {
        let mut current = ty;
        let mut hops = 0usize;
        while let Type::Typedef(reference) = current {
            hops += 1;
            if hops > self.typedef_count() {
                return Err(ResolveError::TypedefCycle(reference.clone()));
            }
            current = &self.typedef(reference)?.ty;
        }
        Ok(current)
    }

    /// Whether any typedef on the chain from `ty` was declared forward.
    pub fn is_forward(&self, ty: &Type) -> Result<bool> {
        let mut current = ty;
        let mut hops = 0usize;
        while let Type::Typedef(reference) = current {
            hops += 1;
            if hops > self.typedef_count() {
                return Err(ResolveError::TypedefCycle(reference.clone()));
            }
            let typedef = self.typedef(reference)?;
            if typedef.forward {
                return Ok(true);
            }
            current = &typedef.ty;
        }
        Ok(false)
    }

    /// Base services of `service`, nearest first.
    pub fn ancestors(&self, service: &Service) -> Result<Vec<&'a Service>> {
        let mut chain: Vec<&'a Service> = Vec::new();
        let mut next = service.extends.as_ref();
        while let Some(reference) = next {
            let base = self.service(reference)?;
            if chain.iter().any(|s| std::ptr::eq(*s, base)) {
                break;
            }
            chain.push(base);
            next = base.extends.as_ref();
        }
        Ok(chain)
    }

    fn typedef_count(&self) -> usize {
        self.programs.values().map(|p| p.typedefs.len()).sum()
    }
}

fn unknown(kind: &'static str, reference: &TypeRef) -> ResolveError {
    ResolveError::UnknownDefinition {
        kind,
        reference: reference.clone(),
    }
}
