//! Export document -> flat per-condition records -> line-oriented text.

pub(crate) mod layout;
mod model;
mod parser;

pub use layout::write_condition_block;
pub use model::{BAR_PER_ATM, CanonicalExport, resolve_pressure_atm, resolve_temperature_c};
pub use parser::{
    ExportDocument, ExportPage, ReactantDefinition, SolutionDefinition, SpeciesDefinition,
    SpeciesResult, parse_export_document,
};

use crate::common::config::AnalysisConfig;
use crate::domain::LiquidusResult;
use std::io::{self, Write};

pub fn canonicalize_xml(source: &str, config: &AnalysisConfig) -> LiquidusResult<CanonicalExport> {
    let export = parse_export_document(source)?;
    Ok(CanonicalExport::from_document(&export, config))
}

/// Streams every condition block to `writer`, one line at a time.
pub fn write_intermediate<W: Write>(writer: &mut W, export: &CanonicalExport) -> io::Result<()> {
    for condition in &export.conditions {
        write_condition_block(writer, &export.formula_display, condition)?;
    }
    Ok(())
}
