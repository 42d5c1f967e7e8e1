//! Shared type definitions for the gobundle crate
//!
//! Value types passed between the resolver, parser, aggregator, extractor and
//! printer. Nothing here depends on tree-sitter; the parser lowers its tree
//! into these types before handing anything on.

use std::{
    cmp::Ordering,
    hash::BuildHasherDefault,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use rustc_hash::FxHasher;

/// Type alias for IndexSet with FxHasher for better performance
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// A regular file discovered by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    /// Callers must have checked that `path` is a regular file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One imported package, optionally under a local name
///
/// Identity is the `(alias, path)` pair. `"fmt"` and `f2 "fmt"` are two
/// different declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportDeclaration {
    /// Unquoted import path, e.g. `math/rand`
    pub path: String,
    /// Local name: an identifier, `_` or `.`
    pub alias: Option<String>,
}

impl ImportDeclaration {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: Some(alias.into()),
        }
    }

    /// True for `_` and `.` imports, which never bind a usable name
    pub fn is_anonymous(&self) -> bool {
        matches!(self.alias.as_deref(), Some("_" | "."))
    }
}

impl std::fmt::Display for ImportDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

impl Ord for ImportDeclaration {
    /// Import block order: by path, then unaliased before aliased, then by alias
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.alias.cmp(&other.alias))
    }
}

impl PartialOrd for ImportDeclaration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Byte and row extent of a node in its source text
///
/// `end_row` is the row holding the last byte of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl Span {
    pub fn is_multiline(&self) -> bool {
        self.end_row > self.start_row
    }
}

/// What the printer needs to know about a token to lay it out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// `(`, `[` or `{`
    Open,
    /// `)`, `]` or `}`
    Close,
    /// `case` or `default` introducing a switch/select clause
    CaseKeyword,
    /// Name of a labeled statement
    Label,
    /// Binary operator, assignment or selector dot; a line ending with one
    /// continues on the next line
    Continuation,
    Comment,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub span: Span,
}

/// Kind of a top-level item of a compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    PackageClause,
    /// An `import` declaration; its specs live in `CompilationUnit::imports`
    Import,
    /// `func`, method, `type`, `const` or `var` declaration
    Declaration,
    Comment,
}

/// A top-level item with the tokens needed to re-print it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
    pub tokens: Vec<Token>,
}

impl Item {
    pub fn is_comment(&self) -> bool {
        self.kind == ItemKind::Comment
    }
}
