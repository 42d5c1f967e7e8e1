//! Bundle text generation
//!
//! Produces the raw, not yet canonical bundle: generated-code header, one
//! package clause, the aggregated import block and every extracted body.
//! The orchestrator re-parses and re-prints the result.

use log::debug;

use crate::{extractor::BodyFragment, import_aggregator::ImportSet, printer::import_block};

pub const GENERATED_HEADER: &str = "// Code generated by bundle generation tool; DO NOT EDIT.";

#[derive(Debug)]
pub struct BundleGenerator<'a> {
    package: &'a str,
    imports: &'a ImportSet,
}

impl<'a> BundleGenerator<'a> {
    pub fn new(package: &'a str, imports: &'a ImportSet) -> Self {
        Self { package, imports }
    }

    /// Header, package clause and import block
    ///
    /// Imports are written in first-seen order; the block is omitted when no
    /// unit imports anything.
    pub fn preamble(&self) -> String {
        let mut out = format!("{GENERATED_HEADER}\n\npackage {}\n", self.package);
        if !self.imports.is_empty() {
            out.push('\n');
            for line in import_block(self.imports) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Preamble followed by each body, each preceded by one blank line
    pub fn generate(&self, bodies: &[BodyFragment]) -> String {
        let mut out = self.preamble();
        for body in bodies {
            out.push('\n');
            out.push_str(&body.text);
            out.push('\n');
        }
        debug!(
            "Generated {} bytes from {} bodies and {} import(s)",
            out.len(),
            bodies.len(),
            self.imports.len()
        );
        out
    }
}
