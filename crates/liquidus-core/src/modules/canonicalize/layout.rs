//! Line-oriented intermediate form shared by the canonicalizer and the
//! reconstructor. The grammar is private to this crate.

use crate::common::normalize::{format_fixed3, format_fixed4};
use crate::domain::{Condition, Phase, SolidSpecies};
use crate::modules::serialization::{left_cell, right_cell};
use std::io::{self, Write};

pub(crate) const SEPARATOR_WIDTH: usize = 70;
pub(crate) const SEPARATOR_PREFIX: &str = "==========";
pub(crate) const REACTANTS_MARKER: &str = "Reactants (page scope):";
pub(crate) const PHASE_MARKER: &str = "PHASE:";
pub(crate) const PURE_SOLIDS_MARKER: &str = "PURE SOLIDS:";
pub(crate) const TOTAL_MARKER: &str = "TOTAL";
pub(crate) const THERMODYNAMICS_MARKER: &str = "System Thermodynamics:";

pub fn write_condition_block<W: Write>(
    writer: &mut W,
    formula_display: &str,
    condition: &Condition,
) -> io::Result<()> {
    let celsius = format_fixed3(condition.temperature_c);

    writeln!(writer, "{}", "=".repeat(SEPARATOR_WIDTH))?;
    writeln!(writer, "Page {} - {} C", condition.page_number, celsius)?;
    writeln!(writer, "{formula_display}")?;
    writeln!(
        writer,
        "T = {} C | T(K) = {} | P = {} atm",
        celsius,
        format_fixed3(condition.temperature_k()),
        format_fixed3(condition.pressure_atm)
    )?;
    writeln!(writer)?;
    writeln!(writer, "{REACTANTS_MARKER}")?;
    for reactant in &condition.reactants {
        writeln!(
            writer,
            "  {}n = {} mol | m = {} g",
            left_cell(&reactant.name, 5),
            format_fixed3(reactant.moles),
            format_fixed3(reactant.mass_g)
        )?;
    }
    writeln!(writer)?;

    for phase in &condition.solution_phases {
        write_phase_section(writer, phase)?;
    }

    if !condition.pure_solids.is_empty() {
        write_pure_solids_section(writer, &condition.pure_solids)?;
    }

    Ok(())
}

fn write_phase_section<W: Write>(writer: &mut W, phase: &Phase) -> io::Result<()> {
    writeln!(writer, "{} {}", PHASE_MARKER, phase.name)?;
    writeln!(
        writer,
        "{:<16}{:>10}{:>10}{:>8}{:>8}{:>12}",
        "Compound", "Mass(g)", "W(%)", "Mol", "X", "Activity"
    )?;

    let mut total_mass = 0.0;
    let mut total_moles = 0.0;
    let mut total_activity = 0.0;
    for row in &phase.rows {
        writeln!(
            writer,
            "{}",
            phase_row_line(
                &row.name,
                row.mass_g,
                row.weight_fraction * 100.0,
                row.mole_amount,
                row.mole_fraction,
                row.activity,
            )
        )?;
        total_mass += row.mass_g;
        total_moles += row.mole_amount;
        total_activity += row.activity;
    }

    // Totals are plain sums of the listed rows, not renormalized.
    writeln!(
        writer,
        "{}",
        phase_row_line(
            TOTAL_MARKER,
            total_mass,
            100.0,
            total_moles,
            1.0,
            total_activity
        )
    )?;
    writeln!(writer)
}

fn phase_row_line(
    name: &str,
    mass_g: f64,
    weight_percent: f64,
    mole_amount: f64,
    mole_fraction: f64,
    activity: f64,
) -> String {
    format!(
        "  {}{}{}{}{}{}",
        left_cell(name, 14),
        right_cell(&format_fixed3(mass_g), 10),
        right_cell(&format_fixed3(weight_percent), 10),
        right_cell(&format_fixed3(mole_amount), 8),
        right_cell(&format_fixed3(mole_fraction), 8),
        right_cell(&format_fixed4(activity), 12)
    )
}

fn write_pure_solids_section<W: Write>(writer: &mut W, solids: &[SolidSpecies]) -> io::Result<()> {
    writeln!(writer, "{PURE_SOLIDS_MARKER}")?;
    writeln!(writer, "{:<24}{:>12}{:>14}", "Compound", "g", "Activity")?;
    for solid in solids {
        writeln!(
            writer,
            "  {}{}{}",
            left_cell(&solid.name, 22),
            right_cell(&format_fixed3(solid.mass_g), 12),
            right_cell(&format_fixed4(solid.activity), 14)
        )?;
    }
    writeln!(writer)
}
