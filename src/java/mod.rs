// SPDX-License-Identifier: MIT OR Apache-2.0

//! Java front end: tree-sitter lowering, a per-root lookup environment and a
//! light binder, exposed through the `Compiler` seam.

mod binder;
pub mod environment;
mod javadoc;
pub(crate) mod lower;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::ast::{ContainerMask, ParsedUnit};
use crate::binding::{MethodBinding, ResolvedUnit, TypeBinding};
use crate::compiler::{Compiler, CompilerFactory};
use crate::errors::{CompileAbort, EnvironmentError};
use crate::scanner::FileScanner;
use crate::scope::SearchDocument;
use binder::Binder;
use environment::LookupEnvironment;

/// Compiler over one root's lookup environment.
pub struct JavaCompiler {
    env: Arc<LookupEnvironment>,
}

impl JavaCompiler {
    pub fn new(env: LookupEnvironment) -> Self {
        Self { env: Arc::new(env) }
    }

    /// Parse-only compiler; bindings only know library types.
    pub fn degraded() -> Self {
        Self::new(LookupEnvironment::library())
    }

    pub fn environment(&self) -> &LookupEnvironment {
        &self.env
    }
}

impl Compiler for JavaCompiler {
    fn parse(&self, document: &SearchDocument, containers: ContainerMask) -> Result<ParsedUnit, CompileAbort> {
        lower::lower(&document.path(), Arc::clone(&document.contents), containers)
    }

    fn build_bindings(&self, unit: &ParsedUnit) -> Result<ResolvedUnit, CompileAbort> {
        if unit.types.is_empty() && unit.package.is_none() {
            return Err(CompileAbort::new(&unit.path, "nothing to bind"));
        }
        Ok(Binder::new(&self.env, unit).bind())
    }

    fn lookup_type(&self, qualified_name: &str) -> Option<Arc<TypeBinding>> {
        self.env.lookup(qualified_name)
    }

    fn super_class(&self, ty: &TypeBinding) -> Option<Arc<TypeBinding>> {
        self.env.super_class(ty)
    }

    fn super_interfaces(&self, ty: &TypeBinding) -> Vec<Arc<TypeBinding>> {
        self.env.super_interfaces(ty)
    }

    fn all_types(&self) -> Vec<Arc<TypeBinding>> {
        self.env.all_types().cloned().collect()
    }

    fn declared_methods(&self, ty: &TypeBinding) -> Vec<Arc<MethodBinding>> {
        self.env
            .members(&ty.key())
            .map(|members| members.methods.clone())
            .unwrap_or_default()
    }
}

/// Builds a `JavaCompiler` per root from every Java file under it.
///
/// Documents handed to `create` shadow the files on disk, so unsaved working
/// copies take part in name lookup. A root that does not exist on disk is
/// built from the handed documents alone.
#[derive(Debug, Default, Clone)]
pub struct JavaCompilerFactory {
    exclude_patterns: Vec<String>,
}

impl JavaCompilerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excludes(exclude_patterns: Vec<String>) -> Self {
        Self { exclude_patterns }
    }
}

impl CompilerFactory for JavaCompilerFactory {
    fn create(&self, root: &Path, documents: &[SearchDocument]) -> Result<Box<dyn Compiler>, EnvironmentError> {
        let mut sources: BTreeMap<String, SearchDocument> = BTreeMap::new();
        if root.exists() {
            let scanned = FileScanner::with_excludes(root, self.exclude_patterns.clone())
                .scan()
                .map_err(|e| EnvironmentError {
                    root: root.to_path_buf(),
                    reason: e.to_string(),
                })?;
            for file in scanned {
                sources.insert(file.name.clone(), SearchDocument::new(root, file.name, file.content));
            }
        }
        for document in documents {
            sources.insert(document.name.clone(), document.clone());
        }
        let documents: Vec<SearchDocument> = sources.into_values().collect();
        Ok(Box::new(JavaCompiler::new(LookupEnvironment::build(&documents))))
    }

    fn degraded(&self, _root: &Path) -> Box<dyn Compiler> {
        Box::new(JavaCompiler::degraded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;

    #[test]
    fn factory_overlays_documents_on_a_missing_root() {
        let root = Path::new("/no/such/root");
        let documents = vec![
            SearchDocument::new(root, "a/Base.java", "package a; public class Base {}"),
            SearchDocument::new(root, "a/Widget.java", "package a; public class Widget extends Base {}"),
        ];
        let compiler = JavaCompilerFactory::new().create(root, &documents).unwrap();
        let widget = compiler.lookup_type("a.Widget").unwrap();
        let base = compiler.lookup_type("a.Base").unwrap();
        assert!(compiler.is_subtype_of(&widget, &base));
        assert!(!compiler.is_subtype_of(&base, &widget));
        assert_eq!(compiler.superclass_chain(&widget).len(), 2);
    }

    #[test]
    fn degraded_compiler_still_parses() {
        let compiler = JavaCompilerFactory::new().degraded(Path::new("/x"));
        let document = SearchDocument::new("/x", "A.java", "class A { String s; }");
        let unit = compiler.parse(&document, ContainerMask::ALL).unwrap();
        let resolved = compiler.build_bindings(&unit).unwrap();
        let field_type = unit
            .ids()
            .find(|&id| matches!(unit.kind(id), crate::ast::NodeKind::TypeRef { .. }))
            .unwrap();
        assert!(matches!(
            resolved.binding(field_type),
            Some(Binding::Type(t)) if t.key() == "java.lang.String"
        ));
    }
}
