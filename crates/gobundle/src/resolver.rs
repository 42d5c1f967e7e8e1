use std::fs;

use glob::MatchOptions;
use log::{debug, trace};

use crate::{
    error::{BundleError, Result},
    types::SourceFile,
};

/// Glob semantics matching Go's `filepath.Glob`: `*` stops at separators and
/// dotfiles are not special.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `patterns` into the files to bundle
///
/// Matches are concatenated in pattern order; within one pattern they keep
/// glob order. Overlapping patterns yield duplicates, which are kept. Any
/// match that is not a regular file aborts the whole resolution.
pub fn resolve_files<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::with_capacity(patterns.len());

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = glob::glob_with(pattern, MATCH_OPTIONS).map_err(|source| {
            BundleError::Pattern {
                pattern: pattern.to_owned(),
                source,
            }
        })?;

        let before = files.len();
        for entry in paths {
            let path = entry.map_err(|err| {
                let path = err.path().to_path_buf();
                BundleError::Io {
                    path,
                    source: err.into(),
                }
            })?;

            let metadata = fs::metadata(&path).map_err(|source| BundleError::Io {
                path: path.clone(),
                source,
            })?;
            if !metadata.is_file() {
                return Err(BundleError::NotAFile { path });
            }

            trace!("Resolved {}", path.display());
            files.push(SourceFile::new(path));
        }
        debug!(
            "Pattern \"{pattern}\" matched {} file(s)",
            files.len() - before
        );
    }

    Ok(files)
}
