//! Canonical printer for parsed compilation units
//!
//! The printer never copies indentation from the source. Each line is
//! re-indented with tabs from the bracket structure of its tokens:
//! - brackets opened on the same line share one indentation level;
//! - `case`/`default` clauses and labels sit one level left of their body;
//! - a line ending in a binary operator, assignment, selector dot or list
//!   comma indents the next line by one extra level.
//!
//! Trailing whitespace is stripped and blank-line runs collapse to one.
//! Lines inside raw strings and block comments are copied unchanged. The
//! output depends on tokens only, so printing printed output is a no-op.

use crate::{
    parser::CompilationUnit,
    types::{ImportDeclaration, Item, ItemKind, TokenClass},
};

/// Print `unit` as a canonical Go file without a trailing newline
///
/// All import declarations are merged into one parenthesized block at the
/// position of the first one, sorted by path then alias, exact duplicates
/// removed.
pub fn print_unit(unit: &CompilationUnit) -> String {
    let mut imports: Vec<&ImportDeclaration> = unit.imports().iter().collect();
    imports.sort();
    imports.dedup();

    let mut layout = Layout::new(unit);
    let mut import_block_printed = false;
    for item in unit.items() {
        match item.kind {
            ItemKind::PackageClause => {
                layout.push_lines(item, vec![format!("package {}", unit.package_name())]);
            }
            ItemKind::Import if !import_block_printed && !imports.is_empty() => {
                layout.push_lines(item, import_block(imports.iter().copied()));
                import_block_printed = true;
            }
            ItemKind::Import => layout.skip(item),
            ItemKind::Declaration | ItemKind::Comment => layout.push_item(item),
        }
    }
    layout.finish()
}

/// Render a parenthesized import block in the given order
pub fn import_block<'a>(imports: impl IntoIterator<Item = &'a ImportDeclaration>) -> Vec<String> {
    let mut lines = vec!["import (".to_owned()];
    lines.extend(imports.into_iter().map(|import| format!("\t{import}")));
    lines.push(")".to_owned());
    lines
}

#[derive(Debug, Clone, Copy)]
struct Previous {
    end_row: usize,
    emitted: bool,
    comment: bool,
    import: bool,
    /// Package clause or import declaration, or a comment on the same line
    /// as one
    header: bool,
}

/// Accumulates printed top-level items, spacing them as in the source
///
/// Between two items the source had either nothing (same line), a line
/// break, or at least one blank line; the printed output keeps that, with
/// blank runs reduced to one line. Skipped items still count, so removing an
/// item does not glue its neighbours together.
///
/// Like gofmt, the first item after the package clause or an import
/// declaration that starts on a later line is always preceded by a blank
/// line, so a comment there never turns into the doc comment of what follows.
#[derive(Debug)]
pub(crate) struct Layout<'a> {
    unit: &'a CompilationUnit,
    out: String,
    previous: Option<Previous>,
}

impl<'a> Layout<'a> {
    pub(crate) fn new(unit: &'a CompilationUnit) -> Self {
        Self::with_prefix(unit, String::new())
    }

    /// Start from already printed text that has no source position
    pub(crate) fn with_prefix(unit: &'a CompilationUnit, prefix: String) -> Self {
        Self {
            unit,
            out: prefix,
            previous: None,
        }
    }

    /// Account for `item` without printing it
    pub(crate) fn skip(&mut self, item: &Item) {
        self.record(item, false);
    }

    /// Print `item` from its tokens
    ///
    /// A comment sharing a line with an import declaration belongs to that
    /// import and is skipped.
    pub(crate) fn push_item(&mut self, item: &Item) {
        if self.trails_import(item) {
            self.skip(item);
            return;
        }
        let lines = render_item(self.unit, item);
        self.push_lines(item, lines);
    }

    /// Print `lines` in place of `item`
    pub(crate) fn push_lines(&mut self, item: &Item, lines: Vec<String>) {
        self.separate(item);
        self.out.push_str(&lines.join("\n"));
        self.record(item, true);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    fn record(&mut self, item: &Item, emitted: bool) {
        let header = matches!(item.kind, ItemKind::PackageClause | ItemKind::Import)
            || (item.is_comment()
                && self
                    .previous
                    .is_some_and(|prev| prev.header && item.span.start_row == prev.end_row));
        self.previous = Some(Previous {
            end_row: item.span.end_row,
            emitted,
            comment: item.is_comment(),
            import: item.kind == ItemKind::Import,
            header,
        });
    }

    fn trails_import(&self, item: &Item) -> bool {
        item.is_comment()
            && self
                .previous
                .is_some_and(|prev| prev.import && item.span.start_row == prev.end_row)
    }

    fn separate(&mut self, item: &Item) {
        if self.out.is_empty() {
            return;
        }
        let start_row = item.span.start_row;
        match self.previous {
            Some(prev) if start_row <= prev.end_row => {
                if prev.emitted && (prev.comment || item.is_comment()) {
                    self.out.push(' ');
                } else {
                    self.out.push('\n');
                }
            }
            Some(prev) => {
                self.out.push('\n');
                if prev.header || start_row > prev.end_row + 1 {
                    self.out.push('\n');
                }
            }
            None => self.out.push('\n'),
        }
    }
}

/// Per-row extent of an item's text
#[derive(Debug, Clone, Copy, Default)]
struct Row {
    /// Byte offset of the first token starting on this row
    start: Option<usize>,
    /// Byte offset where the row's text ends
    end: usize,
    /// The row begins inside a token opened on an earlier row
    inside: bool,
    /// The row ends inside a token that continues on the next row
    open_end: bool,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    row: usize,
    level: usize,
}

/// Render one item as canonical lines
pub(crate) fn render_item(unit: &CompilationUnit, item: &Item) -> Vec<String> {
    let base = item.span.start_row;
    let rows = measure_rows(unit, item);
    let indents = indent_levels(item, rows.len());

    let mut lines: Vec<String> = Vec::with_capacity(rows.len());
    for (offset, row) in rows.iter().enumerate() {
        let (line_start, line_end) = unit.line_bounds(base + offset);
        let blank = !row.inside && row.start.is_none();
        if blank && lines.last().is_some_and(String::is_empty) {
            continue;
        }
        let text = if row.inside {
            let end = if row.open_end { line_end } else { row.end };
            let text = &unit.source()[line_start..end];
            if row.open_end {
                text.to_owned()
            } else {
                text.trim_end().to_owned()
            }
        } else if let Some(start) = row.start {
            let text = &unit.source()[start..row.end];
            let text = if row.open_end { text } else { text.trim_end() };
            format!("{}{text}", "\t".repeat(indents[offset]))
        } else {
            String::new()
        };
        lines.push(text);
    }
    lines
}

fn measure_rows(unit: &CompilationUnit, item: &Item) -> Vec<Row> {
    let base = item.span.start_row;
    let mut rows = vec![Row::default(); item.span.end_row - base + 1];

    for token in &item.tokens {
        let span = token.span;
        let (_, line_end) = unit.line_bounds(span.start_row);
        let row = &mut rows[span.start_row - base];
        if row.start.is_none() && !row.inside {
            row.start = Some(span.start);
        }
        row.end = row.end.max(span.end.min(line_end));

        if span.is_multiline() {
            row.open_end = true;
            for row_index in span.start_row + 1..=span.end_row {
                let (_, line_end) = unit.line_bounds(row_index);
                let row = &mut rows[row_index - base];
                row.inside = true;
                if row_index < span.end_row {
                    row.open_end = true;
                    row.end = line_end;
                } else {
                    row.end = row.end.max(span.end.min(line_end));
                }
            }
        }
    }
    rows
}

/// Indentation level of every row of `item`, relative to the item
fn indent_levels(item: &Item, row_count: usize) -> Vec<usize> {
    let base = item.span.start_row;
    let mut levels = vec![0; row_count];
    let mut stack: Vec<Frame> = Vec::new();
    let mut continued = false;

    let mut tokens = item.tokens.iter().peekable();
    for (offset, level) in levels.iter_mut().enumerate() {
        let row_tokens: Vec<_> = std::iter::from_fn(|| {
            tokens.next_if(|token| token.span.start_row == base + offset)
        })
        .collect();
        let Some(first) = row_tokens.first() else {
            continue;
        };

        let leading_closers = row_tokens
            .iter()
            .take_while(|token| token.class == TokenClass::Close)
            .count();
        let open_frames = stack.len().saturating_sub(leading_closers);
        let row_base = open_frames
            .checked_sub(1)
            .map_or(0, |top| stack[top].level);

        *level = match first.class {
            TokenClass::CaseKeyword | TokenClass::Label => row_base.saturating_sub(1),
            TokenClass::Close => row_base,
            _ if continued => row_base + 1,
            _ => row_base,
        };

        for token in &row_tokens {
            match token.class {
                TokenClass::Open => {
                    let level = match stack.last() {
                        Some(top) if top.row == offset => top.level,
                        _ => row_base + 1,
                    };
                    stack.push(Frame { row: offset, level });
                }
                TokenClass::Close => {
                    stack.pop();
                }
                _ => {}
            }
        }

        if let Some(last) = row_tokens
            .iter()
            .rev()
            .find(|token| token.class != TokenClass::Comment)
        {
            continued = last.class == TokenClass::Continuation;
        }
    }
    levels
}
