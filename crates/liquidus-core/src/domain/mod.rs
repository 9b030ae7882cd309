pub mod errors;

pub use errors::{LiquidusError, LiquidusErrorCategory, LiquidusResult, ParserResult};

use crate::common::config::AnalysisConfig;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// One species row of a solution phase at a single condition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionRow {
    pub name: String,
    pub mass_g: f64,
    pub weight_fraction: f64,
    pub mole_amount: f64,
    pub mole_fraction: f64,
    pub activity: f64,
}

/// A solution phase with its listed species, heaviest first.
///
/// A phase whose aggregate mass qualified for listing is kept even when none
/// of its species rows passed the mass threshold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Phase {
    pub name: String,
    pub rows: Vec<CompositionRow>,
}

impl Phase {
    pub fn new(name: impl Into<String>, rows: Vec<CompositionRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolidSpecies {
    pub name: String,
    pub mass_g: f64,
    pub activity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReactantMass {
    pub name: String,
    pub moles: f64,
    pub mass_g: f64,
}

/// A single temperature/pressure point ("page") of a simulation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    pub page_number: u32,
    pub temperature_c: f64,
    pub pressure_atm: f64,
    pub reactants: Vec<ReactantMass>,
    pub solution_phases: Vec<Phase>,
    pub pure_solids: Vec<SolidSpecies>,
}

impl Condition {
    pub const KELVIN_OFFSET: f64 = 273.15;

    pub fn temperature_k(&self) -> f64 {
        self.temperature_c + Self::KELVIN_OFFSET
    }

    pub fn reactant_mass(&self, name: &str) -> Option<f64> {
        self.reactants
            .iter()
            .find(|reactant| reactant.name == name)
            .map(|reactant| reactant.mass_g)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub name: String,
    pub weight_fraction: f64,
    pub activity: f64,
    pub mass_g: f64,
}

/// Species name to (weight fraction, activity, mass) for one phase at one condition.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompositionSnapshot {
    pub entries: Vec<SnapshotEntry>,
}

impl CompositionSnapshot {
    pub fn from_phase(phase: &Phase) -> Self {
        let mut entries: Vec<SnapshotEntry> = Vec::with_capacity(phase.rows.len());
        for row in &phase.rows {
            let entry = SnapshotEntry {
                name: row.name.clone(),
                weight_fraction: row.weight_fraction,
                activity: row.activity,
                mass_g: row.mass_g,
            };
            // Later rows with the same species name replace earlier ones in place.
            match entries.iter_mut().find(|existing| existing.name == entry.name) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight_fraction_of(&self, species: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.name == species)
            .map(|entry| entry.weight_fraction)
    }

    pub fn total_mass(&self) -> f64 {
        self.entries.iter().map(|entry| entry.mass_g).sum()
    }

    /// Entries ordered by descending weight fraction, ties kept in row order.
    pub fn by_weight_fraction(&self) -> Vec<&SnapshotEntry> {
        let mut ordered = self.entries.iter().collect::<Vec<_>>();
        ordered.sort_by(|a, b| b.weight_fraction.total_cmp(&a.weight_fraction));
        ordered
    }
}

/// Outcome of scanning one simulation run from high to low temperature.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub reactant_mass_g: Option<f64>,
    pub best_temperature_c: Option<f64>,
    pub best_target_fraction: Option<f64>,
    pub best_composition: Option<CompositionSnapshot>,
    pub stop_temperature_c: Option<f64>,
    pub stop_phases: Vec<String>,
    pub slag_first_temperature_c: Option<f64>,
    pub slag_first_phases: Vec<String>,
    pub slag_before_first_solids: Option<CompositionSnapshot>,
}

impl AnalysisResult {
    /// Only runs with a non-empty best metallic-liquid snapshot take part in ranking.
    pub fn has_best_liquid(&self) -> bool {
        self.best_target_fraction.is_some()
            && self
                .best_composition
                .as_ref()
                .is_some_and(|snapshot| !snapshot.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Canonicalize,
    Analyze,
    AnalyzeText,
}

impl PipelineStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Canonicalize => "CANONICALIZE",
            Self::Analyze => "ANALYZE",
            Self::AnalyzeText => "ANALYZE_TEXT",
        }
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputEncoding {
    #[default]
    Xml,
    Base64Xml,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub stage: PipelineStage,
    pub input_path: PathBuf,
    pub input_encoding: InputEncoding,
    pub output_dir: PathBuf,
    pub intermediate_name: String,
    pub report_name: String,
    pub json_report_name: Option<String>,
    pub config: AnalysisConfig,
}

impl AnalysisRequest {
    pub const DEFAULT_INTERMEDIATE_NAME: &'static str = "parsed.txt";
    pub const DEFAULT_REPORT_NAME: &'static str = "analysis.csv";

    pub fn new(
        stage: PipelineStage,
        input_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stage,
            input_path: input_path.into(),
            input_encoding: InputEncoding::Xml,
            output_dir: output_dir.into(),
            intermediate_name: Self::DEFAULT_INTERMEDIATE_NAME.to_string(),
            report_name: Self::DEFAULT_REPORT_NAME.to_string(),
            json_report_name: None,
            config: AnalysisConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisArtifact {
    pub relative_path: PathBuf,
}

impl AnalysisArtifact {
    pub fn new(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }
}
