use super::parser::{ExportDocument, ExportPage, SpeciesResult};
use crate::common::config::AnalysisConfig;
use crate::common::normalize::{parse_number, subscript_formula_digits};
use crate::domain::{CompositionRow, Condition, Phase, ReactantMass, SolidSpecies};
use regex::Regex;
use std::sync::LazyLock;

pub const BAR_PER_ATM: f64 = 1.01325;

static DESCRIPTION_TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*C").expect("description temperature pattern is valid")
});

/// Flat per-condition records derived from one export document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalExport {
    pub formula_display: String,
    pub conditions: Vec<Condition>,
}

impl CanonicalExport {
    pub fn from_document(export: &ExportDocument, config: &AnalysisConfig) -> Self {
        let conditions = export
            .pages
            .iter()
            .filter_map(|page| canonical_condition(export, page, config))
            .collect::<Vec<_>>();

        tracing::debug!(
            pages = export.pages.len(),
            conditions = conditions.len(),
            "canonicalized export pages"
        );

        Self {
            formula_display: subscript_formula_digits(&export.formula),
            conditions,
        }
    }
}

fn canonical_condition(
    export: &ExportDocument,
    page: &ExportPage,
    config: &AnalysisConfig,
) -> Option<Condition> {
    let page_number = match page.id.as_deref().map(str::trim).map(str::parse::<u32>) {
        Some(Ok(number)) => number,
        _ => {
            tracing::warn!(
                id = page.id.as_deref().unwrap_or("?"),
                "skipping page without a numeric id"
            );
            return None;
        }
    };

    Some(Condition {
        page_number,
        temperature_c: resolve_temperature_c(page),
        pressure_atm: resolve_pressure_atm(page),
        reactants: page_reactants(export, page),
        solution_phases: qualifying_phases(export, page, config.mass_threshold),
        pure_solids: qualifying_solids(export, page, config.mass_threshold),
    })
}

/// Explicit kelvin wins; otherwise a "<number>C" in the description is read as
/// Celsius; otherwise 0 °C.
pub fn resolve_temperature_c(page: &ExportPage) -> f64 {
    if let Some(kelvin) = page.temperature_k {
        return kelvin - Condition::KELVIN_OFFSET;
    }

    DESCRIPTION_TEMPERATURE
        .captures(&page.description)
        .and_then(|captures| captures.get(1))
        .map(|celsius| parse_number(celsius.as_str()))
        .unwrap_or(0.0)
}

pub fn resolve_pressure_atm(page: &ExportPage) -> f64 {
    page.pressure_bar
        .map(|bar| bar / BAR_PER_ATM)
        .unwrap_or(1.0)
}

fn page_reactants(export: &ExportDocument, page: &ExportPage) -> Vec<ReactantMass> {
    export
        .reactants
        .iter()
        .filter_map(|reactant| {
            let moles = page.reactant_moles(&reactant.id)?;
            Some(ReactantMass {
                name: reactant.name.clone(),
                moles,
                mass_g: moles * reactant.molar_mass,
            })
        })
        .collect()
}

fn qualifying_phases(export: &ExportDocument, page: &ExportPage, threshold: f64) -> Vec<Phase> {
    let mut listed = page
        .solution_masses
        .iter()
        .filter(|(_, mass)| *mass >= threshold)
        .collect::<Vec<_>>();
    listed.sort_by(|a, b| b.1.total_cmp(&a.1));

    listed
        .into_iter()
        .map(|(phase_id, _)| {
            let Some(solution) = export.solution(phase_id) else {
                return Phase::new(format!("Phase-{phase_id}"), Vec::new());
            };

            let mut rows = solution
                .species
                .iter()
                .filter_map(|species| {
                    let result = page
                        .results
                        .get(&species.id)
                        .copied()
                        .unwrap_or_default();
                    (result.mass_g >= threshold).then(|| composition_row(&species.name, result))
                })
                .collect::<Vec<_>>();
            rows.sort_by(|a, b| b.mass_g.total_cmp(&a.mass_g));

            Phase::new(solution.label.clone(), rows)
        })
        .collect()
}

fn qualifying_solids(
    export: &ExportDocument,
    page: &ExportPage,
    threshold: f64,
) -> Vec<SolidSpecies> {
    let mut solids = export
        .solid_species
        .iter()
        .filter_map(|species| {
            let result = page.results.get(&species.id)?;
            (result.mass_g >= threshold).then(|| SolidSpecies {
                name: species.name.clone(),
                mass_g: result.mass_g,
                activity: result.activity,
            })
        })
        .collect::<Vec<_>>();
    solids.sort_by(|a, b| b.mass_g.total_cmp(&a.mass_g));
    solids
}

fn composition_row(name: &str, result: SpeciesResult) -> CompositionRow {
    CompositionRow {
        name: name.to_string(),
        mass_g: result.mass_g,
        weight_fraction: result.weight_fraction,
        mole_amount: result.mole_amount,
        mole_fraction: result.mole_fraction,
        activity: result.activity,
    }
}

#[cfg(test)]
mod tests {
    use super::{CanonicalExport, resolve_pressure_atm, resolve_temperature_c};
    use crate::common::config::AnalysisConfig;
    use crate::modules::canonicalize::parser::{ExportPage, parse_export_document};

    const THRESHOLD_FIXTURE: &str = r#"<export formula="Fe2O3">
  <header>
    <reactant id="r1" name="Fe" mw="55.845"/>
    <species_definition>
      <solution phase_id="p1" state="FTmisc-FeLQ">
        <species id="s1" name="Fe"/>
        <species id="s2" name="Si"/>
        <species id="s3" name="C"/>
        <species id="s4" name="Mn"/>
      </solution>
      <solution phase_id="p2" state="FToxid-SLAGA">
        <species id="s5" name="SiO2"/>
      </solution>
    </species_definition>
    <species id="s8" name="SiO2(s)" phase="s"/>
    <species id="s9" name="FeSi2(s)" phase="s"/>
  </header>
  <page id="3" T="1773.15">
    <reactant id="r1" n="2.0"/>
    <solution id="p2" g="0.01"/>
    <solution id="p1" g="90.0"/>
    <solution id="p3" g="0.0099999"/>
    <solution id="p4" g="5.0"/>
    <result id="s1" g="80.0" W="0.8"/>
    <result id="s2" g="0.01" W="0.0001"/>
    <result id="s3" g="0.0099999" W="0.0000999"/>
    <result id="s4" g="9.0" W="0.09"/>
    <result id="s8" g="0.5" a="1"/>
    <result id="s9" g="2.5" a="1"/>
  </page>
  <page id="x" T="1000"/>
</export>
"#;

    fn canonical() -> CanonicalExport {
        let export = parse_export_document(THRESHOLD_FIXTURE).expect("fixture should parse");
        CanonicalExport::from_document(&export, &AnalysisConfig::default())
    }

    #[test]
    fn phases_and_rows_are_filtered_inclusively_and_ranked_by_mass() {
        let canonical = canonical();
        assert_eq!(canonical.formula_display, "Fe₂O₃");
        assert_eq!(canonical.conditions.len(), 1, "non-numeric page ids are skipped");

        let condition = &canonical.conditions[0];
        assert_eq!(condition.page_number, 3);
        assert!((condition.temperature_c - 1500.0).abs() < 1.0e-9);
        assert_eq!(condition.pressure_atm, 1.0);

        let phase_names = condition
            .solution_phases
            .iter()
            .map(|phase| phase.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(phase_names, ["FeLQ", "Phase-p4", "SLAGA"]);

        let metal_rows = condition.solution_phases[0]
            .rows
            .iter()
            .map(|row| row.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(metal_rows, ["Fe", "Mn", "Si"]);
        assert!(!condition.solution_phases[1].has_rows());
        assert!(!condition.solution_phases[2].has_rows());
    }

    #[test]
    fn reactant_mass_is_moles_times_molar_mass() {
        let canonical = canonical();
        let reactant = &canonical.conditions[0].reactants[0];
        assert_eq!(reactant.name, "Fe");
        assert!((reactant.mass_g - 111.69).abs() < 1.0e-9);
    }

    #[test]
    fn pure_solids_are_ranked_independently_by_mass() {
        let canonical = canonical();
        let solids = canonical.conditions[0]
            .pure_solids
            .iter()
            .map(|solid| solid.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(solids, ["FeSi2(s)", "SiO2(s)"]);
    }

    #[test]
    fn temperature_falls_back_to_description_then_zero() {
        let explicit = ExportPage {
            temperature_k: Some(273.15),
            description: "1200 C".to_string(),
            ..ExportPage::default()
        };
        assert_eq!(resolve_temperature_c(&explicit), 0.0);

        let described = ExportPage {
            description: "Equilibrium at -12.5 C".to_string(),
            ..ExportPage::default()
        };
        assert_eq!(resolve_temperature_c(&described), -12.5);

        let blank = ExportPage::default();
        assert_eq!(resolve_temperature_c(&blank), 0.0);
    }

    #[test]
    fn pressure_converts_bar_to_atm_and_defaults_to_one_atm() {
        let explicit = ExportPage {
            pressure_bar: Some(2.0265),
            ..ExportPage::default()
        };
        assert!((resolve_pressure_atm(&explicit) - 2.0).abs() < 1.0e-12);
        assert_eq!(resolve_pressure_atm(&ExportPage::default()), 1.0);
    }
}
