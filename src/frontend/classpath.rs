//! Library types visible to the front-end.
//!
//! A class path is a YAML list of type descriptions. Source files resolve
//! names against it; anything it does not describe becomes a recovered
//! binding. A subset of the JDK is embedded and always available.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::MemoryResolver;
use crate::semantic::{BindingId, TypeKind, ROOT_TYPE_NAME};

const JDK_YAML: &str = include_str!("jdk.yaml");

pub const ENUM_BASE: &str = "java.lang.Enum";
pub const RECORD_BASE: &str = "java.lang.Record";

static JDK: Lazy<ClassPath> = Lazy::new(|| match ClassPath::from_yaml_str(JDK_YAML) {
    Ok(class_path) => class_path,
    Err(e) => {
        warn!("embedded JDK class path is invalid: {}", e);
        ClassPath::default()
    }
});

/// Kind of a library type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryTypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl From<LibraryTypeKind> for TypeKind {
    fn from(kind: LibraryTypeKind) -> Self {
        match kind {
            LibraryTypeKind::Class => TypeKind::Class,
            LibraryTypeKind::Interface => TypeKind::Interface,
            LibraryTypeKind::Enum => TypeKind::Enum,
            LibraryTypeKind::Record => TypeKind::Record,
            LibraryTypeKind::Annotation => TypeKind::Annotation,
        }
    }
}

/// A field of a library type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A method of a library type. Type references are qualified names,
/// primitives, or either with `[]` suffixes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryMethod {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Absent for `void`
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibraryConstructor {
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub varargs: bool,
}

/// A library type description.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryType {
    pub name: String,
    #[serde(default)]
    pub kind: LibraryTypeKind,
    /// Defaults to `java.lang.Object` for classes, `java.lang.Enum` for
    /// enums and `java.lang.Record` for records
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<LibraryField>,
    #[serde(default)]
    pub constructors: Vec<LibraryConstructor>,
    #[serde(default)]
    pub methods: Vec<LibraryMethod>,
}

impl LibraryType {
    fn default_superclass(&self) -> Option<&str> {
        match self.kind {
            LibraryTypeKind::Class if self.name != ROOT_TYPE_NAME => Some(ROOT_TYPE_NAME),
            LibraryTypeKind::Enum => Some(ENUM_BASE),
            LibraryTypeKind::Record => Some(RECORD_BASE),
            _ => None,
        }
    }
}

/// An ordered set of library types, unique by qualified name.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClassPath {
    #[serde(default)]
    pub types: Vec<LibraryType>,
}

impl ClassPath {
    /// The embedded JDK subset.
    pub fn jdk() -> Self {
        JDK.clone()
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let class_path: ClassPath = serde_yaml::from_str(content)?;
        Ok(class_path)
    }

    /// Parse a class path from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.get(qualified_name).is_some()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&LibraryType> {
        self.types.iter().find(|t| t.name == qualified_name)
    }

    /// Add `other`'s types; a type already present is replaced.
    pub fn merge(&mut self, other: ClassPath) {
        for ty in other.types {
            match self.types.iter_mut().find(|t| t.name == ty.name) {
                Some(existing) => *existing = ty,
                None => self.types.push(ty),
            }
        }
    }

    /// A copy without the named type, as an incomplete class path would be.
    pub fn without(&self, qualified_name: &str) -> Self {
        Self {
            types: self
                .types
                .iter()
                .filter(|t| t.name != qualified_name)
                .cloned()
                .collect(),
        }
    }

    /// Declare every type into `resolver`.
    ///
    /// Types are declared before any is linked, so references between them
    /// resolve regardless of order. References to types missing from the
    /// class path become recovered bindings.
    pub fn load_into(&self, resolver: &mut MemoryResolver) {
        let declared: Vec<BindingId> = self
            .types
            .iter()
            .map(|t| resolver.declare_type(&t.name, t.kind.into()))
            .collect();

        for (ty, binding) in self.types.iter().zip(declared) {
            if let Some(superclass) = ty.superclass.as_deref().or_else(|| ty.default_superclass()) {
                let superclass = resolver.type_reference(superclass);
                resolver.set_superclass(binding, superclass);
            }
            for interface in &ty.interfaces {
                let interface = resolver.type_reference(interface);
                resolver.add_interface(binding, interface);
            }
            for annotation in &ty.annotations {
                let annotation = resolver.type_reference(annotation);
                resolver.add_annotation(binding, annotation);
            }
            for field in &ty.fields {
                let field_type = resolver.type_reference(&field.ty);
                resolver.declare_field(binding, &field.name, field_type);
            }
            for constructor in &ty.constructors {
                let parameters = type_references(resolver, &constructor.parameters);
                let id = resolver.declare_constructor(binding, &parameters);
                resolver.set_varargs(id, constructor.varargs);
            }
            for method in &ty.methods {
                let parameters = type_references(resolver, &method.parameters);
                let returns = resolver.type_reference(method.returns.as_deref().unwrap_or("void"));
                let id = resolver.declare_method(binding, &method.name, &parameters, Some(returns));
                resolver.set_varargs(id, method.varargs);
                for annotation in &method.annotations {
                    let annotation = resolver.type_reference(annotation);
                    resolver.add_annotation(id, annotation);
                }
            }
        }
        debug!(types = self.types.len(), bindings = resolver.len(), "class path loaded");
    }
}

fn type_references(resolver: &mut MemoryResolver, names: &[String]) -> Vec<BindingId> {
    names.iter().map(|n| resolver.type_reference(n)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::semantic::SemanticContext;

    #[test]
    fn test_jdk_subset() {
        let jdk = ClassPath::jdk();
        for name in [
            ROOT_TYPE_NAME,
            "java.lang.String",
            "java.lang.CharSequence",
            "java.lang.StringBuilder",
            "java.lang.StringBuffer",
            ENUM_BASE,
            RECORD_BASE,
            "java.lang.Override",
            "java.lang.SuppressWarnings",
            "java.lang.Deprecated",
            "java.util.Optional",
        ] {
            assert!(jdk.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_load_links_hierarchy() {
        let mut resolver = MemoryResolver::new();
        ClassPath::jdk().load_into(&mut resolver);
        let ctx = SemanticContext::new(Arc::new(resolver));

        let builder = ctx.resolve_type("java.lang.StringBuilder");
        assert!(builder.is_subtype_of("java.lang.CharSequence"));
        let symbol = builder.symbol().unwrap();
        assert_eq!(symbol.super_types().iter().last().map(|t| t.is_root()), Some(true));
        assert!(builder.is_subtype_of("java.lang.AbstractStringBuilder"));
        assert_eq!(symbol.lookup_member("toString").len(), 1);

        let string = ctx.resolve_type("java.lang.String");
        assert!(string.is_subtype_of("java.lang.Comparable"));
        assert_eq!(string.symbol().unwrap().super_class().map(|t| t.is_root()), Some(true));
    }

    #[test]
    fn test_merge_and_missing_references() {
        let mut class_path = ClassPath::jdk();
        class_path.merge(
            ClassPath::from_yaml_str(
                r#"
types:
  - name: com.acme.Service
    superclass: com.acme.Missing
    annotations: [com.acme.Marker]
  - name: com.acme.Marker
    kind: annotation
"#,
            )
            .unwrap(),
        );
        assert!(class_path.contains("com.acme.Service"));

        let mut resolver = MemoryResolver::new();
        class_path.load_into(&mut resolver);
        let ctx = SemanticContext::new(Arc::new(resolver));
        let service = ctx.resolve_type("com.acme.Service").symbol().unwrap();
        assert!(service.super_class().unwrap().is_unknown());
        assert!(service.super_types().is_empty());
        assert!(service.metadata().is_annotated_with("com.acme.Marker"));
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let mut class_path = ClassPath::from_yaml_str("types:\n  - name: a.A\n").unwrap();
        let replacement = ClassPath::from_yaml_str("types:\n  - name: a.A\n    kind: interface\n");
        class_path.merge(replacement.unwrap());
        assert_eq!(class_path.len(), 1);
        assert_eq!(class_path.get("a.A").map(|t| t.kind), Some(LibraryTypeKind::Interface));
        assert!(class_path.without("a.A").is_empty());
    }
}
