use crate::common::normalize::parse_number;
use crate::domain::{CompositionRow, Condition, Phase, ReactantMass, SolidSpecies};
use crate::modules::canonicalize::layout::{
    PHASE_MARKER, PURE_SOLIDS_MARKER, REACTANTS_MARKER, SEPARATOR_PREFIX, THERMODYNAMICS_MARKER,
    TOTAL_MARKER,
};
use regex::Regex;
use std::sync::LazyLock;

static PAGE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Page\s+(\d+)\s*-\s*(-?[0-9.]+)\s*C").expect("page header pattern is valid")
});

static REACTANT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S.*?)\s+n\s*=\s*(\S+)\s*mol\s*\|\s*m\s*=\s*(\S+)\s*g\s*$")
        .expect("reactant line pattern is valid")
});

static PRESSURE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|\s*P\s*=\s*(\S+)\s*atm").expect("pressure field pattern is valid")
});

pub(super) fn parse_conditions(source: &str) -> Vec<Condition> {
    let lines = source.lines().collect::<Vec<_>>();
    let mut conditions = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let Some((page_number, temperature_c)) = page_header(lines[index]) else {
            index += 1;
            continue;
        };

        let end = block_end(&lines, index + 1);
        conditions.push(parse_block(
            page_number,
            temperature_c,
            &lines[index + 1..end],
        ));
        index = end;
    }

    tracing::debug!(conditions = conditions.len(), "reconstructed conditions");
    conditions
}

fn page_header(line: &str) -> Option<(u32, f64)> {
    let captures = PAGE_HEADER.captures(line.trim())?;
    let page_number = match captures[1].parse::<u32>() {
        Ok(number) => number,
        Err(error) => {
            tracing::warn!(header = line.trim(), %error, "skipping page with unusable number");
            return None;
        }
    };
    Some((page_number, parse_number(&captures[2])))
}

/// Index of the separator that opens the next page, or the end of input.
fn block_end(lines: &[&str], start: usize) -> usize {
    (start..lines.len())
        .find(|&index| is_page_boundary(lines, index))
        .unwrap_or(lines.len())
}

fn is_page_boundary(lines: &[&str], index: usize) -> bool {
    index + 1 < lines.len()
        && lines[index].starts_with(SEPARATOR_PREFIX)
        && lines[index + 1].contains("Page")
}

fn is_section_start(trimmed: &str) -> bool {
    trimmed.starts_with(PHASE_MARKER) || trimmed.starts_with(PURE_SOLIDS_MARKER)
}

fn parse_block(page_number: u32, temperature_c: f64, block: &[&str]) -> Condition {
    let mut condition = Condition {
        page_number,
        temperature_c,
        pressure_atm: 1.0,
        ..Condition::default()
    };

    let mut index = 0;
    while index < block.len() {
        let trimmed = block[index].trim();
        if is_section_start(trimmed) {
            break;
        }
        if let Some(captures) = PRESSURE_FIELD.captures(trimmed) {
            condition.pressure_atm = parse_number(&captures[1]);
        }
        if trimmed.starts_with(REACTANTS_MARKER) {
            index += 1;
            while index < block.len() {
                let reactant_line = block[index].trim();
                if reactant_line.is_empty() || is_section_start(reactant_line) {
                    break;
                }
                if let Some(reactant) = reactant_row(reactant_line) {
                    condition.reactants.push(reactant);
                }
                index += 1;
            }
            continue;
        }
        index += 1;
    }

    while index < block.len() {
        let trimmed = block[index].trim();

        if let Some(name) = trimmed.strip_prefix(PHASE_MARKER) {
            // Skip the marker and the column header.
            index += 2;
            let mut rows = Vec::new();
            while index < block.len() {
                let row_line = block[index].trim();
                if row_line.is_empty()
                    || is_section_start(row_line)
                    || row_line.starts_with(THERMODYNAMICS_MARKER)
                {
                    break;
                }
                if !row_line.starts_with(TOTAL_MARKER) {
                    if let Some(row) = composition_row(row_line) {
                        rows.push(row);
                    }
                }
                index += 1;
            }
            condition
                .solution_phases
                .push(Phase::new(name.trim(), rows));
            continue;
        }

        if trimmed.starts_with(PURE_SOLIDS_MARKER) {
            index += 2;
            while index < block.len() {
                let row_line = block[index].trim();
                if row_line.is_empty()
                    || row_line.starts_with(PHASE_MARKER)
                    || row_line.starts_with(THERMODYNAMICS_MARKER)
                {
                    break;
                }
                if let Some(solid) = solid_row(row_line) {
                    condition.pure_solids.push(solid);
                }
                index += 1;
            }
            continue;
        }

        index += 1;
    }

    condition
}

fn reactant_row(line: &str) -> Option<ReactantMass> {
    let captures = REACTANT_LINE.captures(line)?;
    Some(ReactantMass {
        name: captures[1].trim().to_string(),
        moles: parse_number(&captures[2]),
        mass_g: parse_number(&captures[3]),
    })
}

fn composition_row(line: &str) -> Option<CompositionRow> {
    let (name, values) = numeric_row::<5>(line)?;
    Some(CompositionRow {
        name: name.to_string(),
        mass_g: values[0],
        weight_fraction: values[1] / 100.0,
        mole_amount: values[2],
        mole_fraction: values[3],
        activity: values[4],
    })
}

fn solid_row(line: &str) -> Option<SolidSpecies> {
    let (name, values) = numeric_row::<2>(line)?;
    Some(SolidSpecies {
        name: name.to_string(),
        mass_g: values[0],
        activity: values[1],
    })
}

/// Splits `<name> <v1> ... <vN>`; rejects lines with any other token count or
/// with values outside the fixed-point column alphabet.
fn numeric_row<const N: usize>(line: &str) -> Option<(&str, [f64; N])> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let mut values = [0.0; N];
    for value in &mut values {
        *value = fixed_point_value(tokens.next()?)?;
    }
    if tokens.next().is_some() {
        return None;
    }
    Some((name, values))
}

fn fixed_point_value(token: &str) -> Option<f64> {
    if !token
        .chars()
        .all(|character| character.is_ascii_digit() || character == '.' || character == '-')
    {
        return None;
    }
    token.parse::<f64>().ok()
}
