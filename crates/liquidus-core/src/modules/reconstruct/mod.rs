//! Line-oriented intermediate text -> condition records.

mod parser;

use crate::domain::Condition;
use std::io::{self, BufRead};

/// Reconstructs condition records from the canonicalizer's text form.
///
/// Unknown lines are ignored and absent sections produce empty lists; this
/// never fails.
pub fn reconstruct_conditions(source: &str) -> Vec<Condition> {
    parser::parse_conditions(source)
}

pub fn reconstruct_from_reader<R: BufRead>(mut reader: R) -> io::Result<Vec<Condition>> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    Ok(reconstruct_conditions(&source))
}
