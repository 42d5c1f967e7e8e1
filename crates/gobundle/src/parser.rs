//! Go compilation unit parsing
//!
//! Source text is parsed with tree-sitter and lowered right away into a
//! [`CompilationUnit`]: the package clause, the flattened import specs, and
//! every top-level item with its byte/row span and the tokens the printer
//! needs. The tree itself is dropped before this module returns.
//!
//! tree-sitter's Go grammar is more permissive than the Go language at the top
//! level (it accepts statements, several package clauses, imports after
//! declarations). Those cases are rejected here so that a successful parse
//! means the text is a syntactically valid Go source file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use cow_utils::CowUtils;
use log::trace;
use tree_sitter::{Node, Parser, Tree};

use crate::{
    error::{BundleError, Result},
    types::{ImportDeclaration, Item, ItemKind, Span, Token, TokenClass},
};

/// Nodes kept as a single token even though tree-sitter gives them children
const ATOMIC_KINDS: &[&str] = &[
    "comment",
    "interpreted_string_literal",
    "raw_string_literal",
    "rune_literal",
];

const DECLARATION_KINDS: &[&str] = &[
    "function_declaration",
    "method_declaration",
    "type_declaration",
    "const_declaration",
    "var_declaration",
];

const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    pub name: String,
}

/// Structural model of one Go source file
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    path: PathBuf,
    source: String,
    line_starts: Vec<usize>,
    package: PackageClause,
    imports: Vec<ImportDeclaration>,
    items: Vec<Item>,
}

impl CompilationUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized source text the spans refer to
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn package(&self) -> &PackageClause {
        &self.package
    }

    pub fn package_name(&self) -> &str {
        &self.package.name
    }

    /// Import specs of every import declaration, in source order
    pub fn imports(&self) -> &[ImportDeclaration] {
        &self.imports
    }

    /// All top-level items, including the package clause and imports
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Top-level declarations and comments, without package clause and imports
    pub(crate) fn declarations(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|item| matches!(item.kind, ItemKind::Declaration | ItemKind::Comment))
    }

    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    /// Byte range of `row` without its line terminator
    pub(crate) fn line_bounds(&self, row: usize) -> (usize, usize) {
        let start = self.line_starts[row];
        let end = self
            .line_starts
            .get(row + 1)
            .map_or(self.source.len(), |next| next - 1);
        (start, end)
    }
}

/// Read and parse one Go source file
pub fn parse_file(path: &Path) -> Result<CompilationUnit> {
    let text = fs::read_to_string(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(path, &text)
}

/// Parse Go source text; `path` is only used for diagnostics and provenance
pub fn parse_source(path: impl Into<PathBuf>, text: &str) -> Result<CompilationUnit> {
    let path = path.into();
    let source = normalize_source(text);
    let tree = parse_tree(&path, &source)?;
    let root = tree.root_node();

    if root.has_error() {
        return Err(syntax_error(&path, root));
    }

    let lowered = Lowering::new(&path, &source).lower(root)?;
    trace!(
        "Parsed {}: package {}, {} import(s), {} item(s)",
        path.display(),
        lowered.package.name,
        lowered.imports.len(),
        lowered.items.len()
    );

    let line_starts = line_starts(&source);
    Ok(CompilationUnit {
        path,
        source,
        line_starts,
        package: lowered.package,
        imports: lowered.imports,
        items: lowered.items,
    })
}

/// Check that `name` can appear in a `package` clause
pub fn validate_package_name(name: &str) -> std::result::Result<(), &'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("name is empty");
    };
    if !(first == '_' || first.is_alphabetic()) || !chars.all(|c| c == '_' || c.is_alphanumeric())
    {
        return Err("not a Go identifier");
    }
    if name == "_" {
        return Err("blank identifier is not allowed");
    }
    if GO_KEYWORDS.contains(&name) {
        return Err("name is a Go keyword");
    }
    Ok(())
}

fn normalize_source(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.cow_replace("\r\n", "\n").into_owned()
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

fn parse_tree(path: &Path, source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|err| error_at_start(path, format!("cannot load Go grammar: {err}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| error_at_start(path, "parser returned no tree".to_owned()))
}

fn error_at_start(path: &Path, message: String) -> BundleError {
    BundleError::Parse {
        path: path.to_path_buf(),
        line: 1,
        column: 1,
        message,
    }
}

fn error_at(path: &Path, node: Node<'_>, message: impl Into<String>) -> BundleError {
    let position = node.start_position();
    BundleError::Parse {
        path: path.to_path_buf(),
        line: position.row + 1,
        column: position.column + 1,
        message: message.into(),
    }
}

fn syntax_error(path: &Path, root: Node<'_>) -> BundleError {
    let Some(node) = first_error(root) else {
        return error_at(path, root, "syntax error");
    };
    if node.is_missing() {
        return error_at(path, node, format!("missing \"{}\"", node.kind()));
    }
    error_at(path, node, "syntax error")
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn span_of(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    // A node ending right after a newline ends on the previous row.
    let end_row = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
        start_row: start.row,
        end_row,
    }
}

/// Collect the layout-relevant tokens under `node` in source order
fn collect_tokens(node: Node<'_>, source: &str, out: &mut Vec<Token>) {
    if node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind()) {
        let span = span_of(node);
        // Statement terminators show up as newline tokens.
        if source[span.start..span.end].trim().is_empty() {
            return;
        }
        out.push(Token {
            class: classify_token(node),
            span,
        });
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, out);
    }
}

fn classify_token(node: Node<'_>) -> TokenClass {
    let kind = node.kind();
    if kind == "comment" {
        return TokenClass::Comment;
    }
    if !node.is_named() {
        match kind {
            "(" | "[" | "{" => return TokenClass::Open,
            ")" | "]" | "}" => return TokenClass::Close,
            _ => {}
        }
    }

    let parent = node.parent().map(|parent| parent.kind());
    match (kind, parent) {
        (
            "case" | "default",
            Some("expression_case" | "type_case" | "default_case" | "communication_case"),
        ) => TokenClass::CaseKeyword,
        ("label_name", Some("labeled_statement")) => TokenClass::Label,
        _ if !node.is_named() && continues_line(kind, parent) => TokenClass::Continuation,
        _ => TokenClass::Other,
    }
}

/// Whether an anonymous token at the end of a line continues the expression
fn continues_line(kind: &str, parent: Option<&str>) -> bool {
    match parent {
        Some("binary_expression") => true,
        Some("assignment_statement" | "short_var_declaration" | "var_spec" | "const_spec") => {
            kind.ends_with('=')
        }
        Some("selector_expression") => kind == ".",
        Some("expression_list") => kind == ",",
        Some("send_statement") => kind == "<-",
        _ => false,
    }
}

/// Go's `isValidImport`: graphic, no spaces, none of the reserved punctuation
fn is_valid_import_path(path: &str) -> bool {
    const ILLEGAL: &str = "!\"#$%&'()*,:;<=>?[\\]^{|}`\u{FFFD}";
    !path.is_empty()
        && path
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !ILLEGAL.contains(c))
}

fn unquote_import_path(literal: &str) -> Option<&str> {
    literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            literal
                .strip_prefix('`')
                .and_then(|rest| rest.strip_suffix('`'))
        })
}

struct Lowered {
    package: PackageClause,
    imports: Vec<ImportDeclaration>,
    items: Vec<Item>,
}

/// Walks the top level of a tree and enforces Go's file layout
struct Lowering<'a> {
    path: &'a Path,
    source: &'a str,
    package: Option<PackageClause>,
    imports: Vec<ImportDeclaration>,
    items: Vec<Item>,
    seen_declaration: bool,
}

impl<'a> Lowering<'a> {
    fn new(path: &'a Path, source: &'a str) -> Self {
        Self {
            path,
            source,
            package: None,
            imports: Vec::new(),
            items: Vec::new(),
            seen_declaration: false,
        }
    }

    fn lower(mut self, root: Node<'_>) -> Result<Lowered> {
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            let kind = match node.kind() {
                "comment" => ItemKind::Comment,
                "package_clause" => {
                    self.lower_package(node)?;
                    continue;
                }
                "import_declaration" => {
                    self.expect_package(node)?;
                    if self.seen_declaration {
                        return Err(error_at(
                            self.path,
                            node,
                            "imports must appear before other declarations",
                        ));
                    }
                    self.lower_import(node)?;
                    ItemKind::Import
                }
                kind if DECLARATION_KINDS.contains(&kind) => {
                    self.expect_package(node)?;
                    self.seen_declaration = true;
                    ItemKind::Declaration
                }
                _ => {
                    return Err(error_at(
                        self.path,
                        node,
                        "non-declaration statement outside function body",
                    ));
                }
            };

            let mut tokens = Vec::new();
            collect_tokens(node, self.source, &mut tokens);
            self.items.push(Item {
                kind,
                span: span_of(node),
                tokens,
            });
        }

        let Some(package) = self.package else {
            return Err(error_at_start(
                self.path,
                "expected 'package' clause".to_owned(),
            ));
        };
        Ok(Lowered {
            package,
            imports: self.imports,
            items: self.items,
        })
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn expect_package(&self, node: Node<'_>) -> Result<()> {
        if self.package.is_none() {
            return Err(error_at(self.path, node, "expected 'package' clause"));
        }
        Ok(())
    }

    /// Record the package clause; comments tree-sitter nested inside the
    /// clause become standalone items after it.
    fn lower_package(&mut self, node: Node<'_>) -> Result<()> {
        if self.package.is_some() {
            return Err(error_at(self.path, node, "duplicate 'package' clause"));
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        let name_node = children
            .iter()
            .find(|child| child.kind() == "package_identifier")
            .ok_or_else(|| error_at(self.path, node, "package clause without a name"))?;
        let name = self.text(*name_node);
        if name == "_" {
            return Err(error_at(self.path, node, "invalid package name _"));
        }

        let clause = Span {
            end: name_node.end_byte(),
            end_row: name_node.end_position().row,
            ..span_of(node)
        };
        let mut tokens = Vec::new();
        collect_tokens(node, self.source, &mut tokens);
        tokens.retain(|token| token.class != TokenClass::Comment);
        self.items.push(Item {
            kind: ItemKind::PackageClause,
            span: clause,
            tokens,
        });

        for comment in children.iter().filter(|child| child.kind() == "comment") {
            self.items.push(Item {
                kind: ItemKind::Comment,
                span: span_of(*comment),
                tokens: vec![Token {
                    class: TokenClass::Comment,
                    span: span_of(*comment),
                }],
            });
        }

        self.package = Some(PackageClause {
            name: name.to_owned(),
        });
        Ok(())
    }

    fn lower_import(&mut self, node: Node<'_>) -> Result<()> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => {
                    let spec = self.lower_import_spec(child)?;
                    self.imports.push(spec);
                }
                "import_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "import_spec" {
                            let spec = self.lower_import_spec(spec)?;
                            self.imports.push(spec);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn lower_import_spec(&self, spec: Node<'_>) -> Result<ImportDeclaration> {
        let path_node = spec
            .child_by_field_name("path")
            .ok_or_else(|| error_at(self.path, spec, "missing import path"))?;
        let literal = self.text(path_node);
        let path = unquote_import_path(literal)
            .filter(|path| is_valid_import_path(path))
            .ok_or_else(|| {
                error_at(self.path, path_node, format!("invalid import path: {literal}"))
            })?;

        Ok(ImportDeclaration {
            path: path.to_owned(),
            alias: spec
                .child_by_field_name("name")
                .map(|name| self.text(name).to_owned()),
        })
    }
}
