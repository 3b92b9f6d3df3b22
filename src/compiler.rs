// SPDX-License-Identifier: MIT OR Apache-2.0

//! The compiler seam: parsing, bindings and hierarchy queries.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::ast::{ContainerMask, ParsedUnit};
use crate::binding::{MethodBinding, ResolvedUnit, TypeBinding};
use crate::errors::{CompileAbort, EnvironmentError};
use crate::scope::SearchDocument;

/// A front end bound to one source root.
pub trait Compiler {
    /// Lower a document, skipping bodies outside `containers`.
    fn parse(&self, document: &SearchDocument, containers: ContainerMask) -> Result<ParsedUnit, CompileAbort>;

    fn build_bindings(&self, unit: &ParsedUnit) -> Result<ResolvedUnit, CompileAbort>;

    fn lookup_type(&self, qualified_name: &str) -> Option<Arc<TypeBinding>>;

    fn super_class(&self, ty: &TypeBinding) -> Option<Arc<TypeBinding>>;

    fn super_interfaces(&self, ty: &TypeBinding) -> Vec<Arc<TypeBinding>>;

    /// Every type the root declares.
    fn all_types(&self) -> Vec<Arc<TypeBinding>>;

    fn declared_methods(&self, ty: &TypeBinding) -> Vec<Arc<MethodBinding>>;

    /// Reflexive subtype test over superclasses and interfaces.
    fn is_subtype_of(&self, ty: &TypeBinding, candidate_super: &TypeBinding) -> bool {
        let target = candidate_super.key();
        let mut seen = HashSet::new();
        let mut pending = vec![Arc::new(ty.clone())];
        while let Some(current) = pending.pop() {
            let key = current.key();
            if key == target {
                return true;
            }
            if !seen.insert(key) {
                continue;
            }
            if let Some(superclass) = self.super_class(&current) {
                pending.push(superclass);
            }
            pending.extend(self.super_interfaces(&current));
        }
        false
    }

    /// Superclass chain, nearest first, not including `ty`.
    fn superclass_chain(&self, ty: &TypeBinding) -> Vec<Arc<TypeBinding>> {
        let mut chain: Vec<Arc<TypeBinding>> = Vec::new();
        let mut current = self.super_class(ty);
        while let Some(superclass) = current {
            if chain.iter().any(|t| t.key() == superclass.key()) {
                break;
            }
            current = self.super_class(&superclass);
            chain.push(superclass);
        }
        chain
    }
}

/// Creates one compiler per source root.
pub trait CompilerFactory {
    fn create(&self, root: &Path, documents: &[SearchDocument]) -> Result<Box<dyn Compiler>, EnvironmentError>;

    /// A parse-only compiler used when `create` fails.
    fn degraded(&self, root: &Path) -> Box<dyn Compiler>;
}
