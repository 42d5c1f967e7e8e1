//! Body extraction: everything of a unit except its package clause and imports

use std::path::{Path, PathBuf};

use log::trace;

use crate::{parser::CompilationUnit, printer::Layout, types::ItemKind};

/// Printed declarations of one source file, headed by a provenance comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyFragment {
    pub path: PathBuf,
    pub text: String,
}

pub fn provenance_comment(path: &Path) -> String {
    format!(
        "// The code below has been bundled from \"{}\" source file.",
        path.display()
    )
}

/// Drop the package clause and import declarations of `unit` and print the rest
///
/// Items keep their source order and their vertical spacing. The package
/// clause and imports are skipped by position, so a file without a blank line
/// after `package`, or with a comment on the package line, neither loses
/// declaration text nor gains stray lines. The first item after them is set
/// off by a blank line, which keeps the provenance line and file header
/// comments out of the first declaration's doc comment.
pub fn extract_body(unit: &CompilationUnit) -> BodyFragment {
    let mut layout = Layout::with_prefix(unit, provenance_comment(unit.path()));
    for item in unit.items() {
        match item.kind {
            ItemKind::PackageClause | ItemKind::Import => layout.skip(item),
            ItemKind::Declaration | ItemKind::Comment => layout.push_item(item),
        }
    }

    let text = layout.finish();
    trace!(
        "Extracted {} item(s), {} line(s) from {}",
        unit.declarations().count(),
        text.lines().count(),
        unit.path().display()
    );
    BodyFragment {
        path: unit.path().to_path_buf(),
        text,
    }
}
