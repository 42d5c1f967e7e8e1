//! Bundling pipeline
//!
//! validate config → resolve files → parse → aggregate imports → extract
//! bodies → generate → re-parse and re-print → write → delete sources.
//!
//! The bundle is built completely in memory; nothing reaches the writer
//! unless the final re-parse of the generated text succeeds.

use std::{fs, io::Write, path::Path};

use log::{debug, info, warn};

use crate::{
    code_generator::BundleGenerator,
    config::Config,
    error::{BundleError, Result},
    extractor::extract_body,
    import_aggregator::ImportAggregator,
    parser::{parse_file, parse_source},
    printer::print_unit,
    resolver::resolve_files,
    types::SourceFile,
};

/// Label used for diagnostics about the generated text itself
pub const BUNDLE_LABEL: &str = "<bundle>";

/// A finished, canonically printed bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Source files the bundle was built from, in bundle order
    pub files: Vec<SourceFile>,
    /// Output text, ending with exactly one newline
    pub content: String,
}

#[derive(Debug)]
pub struct BundleOrchestrator<'a> {
    config: &'a Config,
}

impl<'a> BundleOrchestrator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build the bundle, write it to `writer`, then delete sources if enabled
    pub fn bundle<W: Write>(&self, writer: &mut W) -> Result<Bundle> {
        let bundle = self.build()?;
        writer
            .write_all(bundle.content.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(BundleError::Write)?;
        self.delete_sources(&bundle.files);
        Ok(bundle)
    }

    /// Build the bundle in memory without writing or deleting anything
    pub fn build(&self) -> Result<Bundle> {
        self.config.validate()?;

        let files = resolve_files(&self.config.files)?;
        match files.as_slice() {
            [] => return Err(BundleError::NoFilesFound),
            [single] => {
                return Err(BundleError::SingleFile {
                    path: single.path().to_path_buf(),
                });
            }
            _ => {}
        }
        info!("Bundling {} files into package {}", files.len(), self.config.package);

        let imports = {
            let mut aggregator = ImportAggregator::new();
            for file in &files {
                aggregator.add_unit(&parse_file(file.path())?);
            }
            aggregator.finish()
        };

        let mut bodies = Vec::with_capacity(files.len());
        for file in &files {
            let unit = parse_file(file.path())?;
            if unit.package_name() != self.config.package {
                debug!(
                    "{} declares package {}, bundling as {}",
                    file.path().display(),
                    unit.package_name(),
                    self.config.package
                );
            }
            bodies.push(extract_body(&unit));
        }

        let generated = BundleGenerator::new(&self.config.package, &imports).generate(&bodies);
        let content = canonicalize(&generated)?;
        debug!("Bundle is {} bytes", content.len());

        Ok(Bundle { files, content })
    }

    /// Remove `files` when source deletion is enabled; failures are only logged
    pub fn delete_sources(&self, files: &[SourceFile]) {
        if !self.config.delete_sources {
            return;
        }
        for file in files {
            match fs::remove_file(file.path()) {
                Ok(()) => debug!("Deleted {}", file.path().display()),
                Err(err) => warn!("Could not delete {}: {err}", file.path().display()),
            }
        }
    }
}

/// Re-parse generated text and print it canonically, with one final newline
///
/// A parse failure here means the generated text is broken and is reported
/// against [`BUNDLE_LABEL`].
pub fn canonicalize(generated: &str) -> Result<String> {
    let unit = parse_source(Path::new(BUNDLE_LABEL), generated)?;
    let mut content = print_unit(&unit);
    content.push('\n');
    Ok(content)
}
