use ir::{NodeKind, SyntaxNode};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Types visible without an import.
const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "CloneNotSupportedException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Process",
    "Record",
    "Runnable",
    "Runtime",
    "RuntimeException",
    "Short",
    "StrictMath",
    "String",
    "StringBuffer",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

static TYPE_TOKEN: OnceLock<Regex> = OnceLock::new();

fn type_token() -> &'static Regex {
    TYPE_TOKEN.get_or_init(|| {
        Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*")
            .expect("valid type token regex")
    })
}

/// Strips type arguments, array brackets and varargs dots:
/// `List<String>[]` gives `List`.
pub fn erase(text: &str) -> &str {
    let base = text.split('<').next().unwrap_or(text);
    base.trim_end_matches("...")
        .trim_end_matches(|c: char| c == '[' || c == ']' || c.is_whitespace())
        .trim()
}

/// `package a.b;` gives `a.b`.
pub fn package_of(root: &SyntaxNode) -> String {
    root.children
        .iter()
        .find(|c| c.kind == NodeKind::Package)
        .map(|p| {
            p.text
                .trim()
                .trim_start_matches("package")
                .trim()
                .trim_end_matches(';')
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Name environment of one compilation unit: its package and imports.
#[derive(Debug, Default, Clone)]
pub struct FileNames {
    pub package: String,
    /// Simple name → qualified name of single-type imports.
    imports: HashMap<String, String>,
    /// Packages imported on demand.
    wildcards: Vec<String>,
}

impl FileNames {
    pub fn from_tree(root: &SyntaxNode) -> Self {
        let mut names = Self {
            package: package_of(root),
            ..Default::default()
        };
        for import in root.children.iter().filter(|c| c.kind == NodeKind::Import) {
            let raw = import.text.trim().trim_start_matches("import").trim();
            if raw.starts_with("static ") {
                continue;
            }
            let raw = raw.trim_end_matches(';').trim();
            if let Some(pkg) = raw.strip_suffix(".*") {
                names.wildcards.push(pkg.to_string());
            } else {
                let alias = raw.rsplit('.').next().unwrap_or(raw);
                names.imports.insert(alias.to_string(), raw.to_string());
            }
        }
        names
    }

    /// Qualified name `simple` gets when declared in this file's package.
    pub fn in_package(&self, simple: &str) -> String {
        if self.package.is_empty() {
            simple.to_string()
        } else {
            format!("{}.{}", self.package, simple)
        }
    }
}

/// Qualifies names as seen from one file: classes declared in the analyzed
/// files, then imports, then `java.lang`, then on-demand imports, then the
/// file's own package.
#[derive(Debug, Clone, Copy)]
pub struct Qualifier<'a> {
    pub names: &'a FileNames,
    pub declared: &'a HashMap<String, String>,
}

impl<'a> Qualifier<'a> {
    /// Whether `simple` names a type this file can see for sure.
    pub fn knows(&self, simple: &str) -> bool {
        self.declared.contains_key(simple)
            || self.names.imports.contains_key(simple)
            || JAVA_LANG.contains(&simple)
    }

    /// Qualified, erased form of a type as written.
    pub fn qualify(&self, text: &str) -> String {
        let base = erase(text);
        if base.contains('.') || PRIMITIVES.contains(&base) || is_type_variable(base) {
            return base.to_string();
        }
        if let Some(q) = self.declared.get(base) {
            return q.clone();
        }
        if let Some(q) = self.names.imports.get(base) {
            return q.clone();
        }
        if JAVA_LANG.contains(&base) {
            return format!("java.lang.{base}");
        }
        if let Some(pkg) = self.names.wildcards.first() {
            return format!("{pkg}.{base}");
        }
        self.names.in_package(base)
    }

    /// Qualifies every type name inside a possibly generic type text:
    /// `Map<String, List<Item>>` gives
    /// `java.util.Map<java.lang.String, java.util.List<pkg.Item>>`.
    /// Primitives, type variables and already dotted names are kept.
    pub fn qualify_text(&self, text: &str) -> String {
        type_token()
            .replace_all(text.trim(), |caps: &regex::Captures| {
                let token = &caps[0];
                if token.contains('.')
                    || PRIMITIVES.contains(&token)
                    || token == "extends"
                    || token == "super"
                    || is_type_variable(token)
                {
                    token.to_string()
                } else {
                    self.qualify(token)
                }
            })
            .into_owned()
    }
}

/// Single upper-case letters are taken for type variables.
fn is_type_variable(token: &str) -> bool {
    token.len() == 1 && token.chars().all(|c| c.is_ascii_uppercase())
}
