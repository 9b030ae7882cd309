use super::classify::{LabelKind, PhaseCategory};
use crate::common::config::AnalysisConfig;
use crate::domain::{AnalysisResult, CompositionSnapshot, Condition, Phase};

#[derive(Debug, Clone, PartialEq)]
struct LiquidCandidate {
    temperature_c: f64,
    target_fraction: f64,
    composition: CompositionSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
struct PrecipitationEvent {
    temperature_c: f64,
    phases: Vec<String>,
}

/// Scans one run from high to low temperature and picks the metallic-liquid
/// snapshot with the highest target-element weight fraction seen before the
/// first metal precipitate.
pub fn analyze_run(run: &[Condition], config: &AnalysisConfig) -> AnalysisResult {
    let mut ordered = run.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| b.temperature_c.total_cmp(&a.temperature_c));

    let reactant_mass_g = ordered
        .iter()
        .find_map(|condition| condition.reactant_mass(&config.tracked_reactant));

    let mut candidates: Vec<LiquidCandidate> = Vec::new();
    let mut stop: Option<PrecipitationEvent> = None;
    let mut first_slag_solid: Option<PrecipitationEvent> = None;
    let mut slag_before_first_solids: Option<CompositionSnapshot> = None;
    let mut latest_slag_liquid: Option<CompositionSnapshot> = None;

    for condition in ordered {
        if first_slag_solid.is_none() {
            let slag_solids =
                matching_names(condition, config.mass_threshold, PhaseCategory::SlagSolid);
            if !slag_solids.is_empty() {
                first_slag_solid = Some(PrecipitationEvent {
                    temperature_c: condition.temperature_c,
                    phases: slag_solids,
                });
                slag_before_first_solids = latest_slag_liquid.clone();
            }
        }

        let metal_solids = matching_names(
            condition,
            config.mass_threshold,
            PhaseCategory::MetalIntermetallic,
        );
        if !metal_solids.is_empty() {
            tracing::debug!(
                temperature_c = condition.temperature_c,
                phases = ?metal_solids,
                "metal precipitation stops the scan"
            );
            stop = Some(PrecipitationEvent {
                temperature_c: condition.temperature_c,
                phases: metal_solids,
            });
            break;
        }

        if let Some(liquid) = first_listed_phase(condition, PhaseCategory::MetalLiquid) {
            let composition = CompositionSnapshot::from_phase(liquid);
            candidates.push(LiquidCandidate {
                temperature_c: condition.temperature_c,
                target_fraction: composition
                    .weight_fraction_of(&config.target_element)
                    .unwrap_or(0.0),
                composition,
            });
        }

        if let Some(slag) = first_listed_phase(condition, PhaseCategory::SlagLiquid) {
            latest_slag_liquid = Some(CompositionSnapshot::from_phase(slag));
        }
    }

    let best = best_candidate(candidates);
    let (stop_temperature_c, stop_phases) = split_event(stop);
    let (slag_first_temperature_c, slag_first_phases) = split_event(first_slag_solid);

    AnalysisResult {
        reactant_mass_g,
        best_temperature_c: best.as_ref().map(|candidate| candidate.temperature_c),
        best_target_fraction: best.as_ref().map(|candidate| candidate.target_fraction),
        best_composition: best.map(|candidate| candidate.composition),
        stop_temperature_c,
        stop_phases,
        slag_first_temperature_c,
        slag_first_phases,
        slag_before_first_solids,
    }
}

/// First candidate with the maximum target fraction, i.e. the hottest on ties.
fn best_candidate(candidates: Vec<LiquidCandidate>) -> Option<LiquidCandidate> {
    let mut best: Option<LiquidCandidate> = None;
    for candidate in candidates {
        let better = best
            .as_ref()
            .is_none_or(|current| candidate.target_fraction > current.target_fraction);
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn first_listed_phase(condition: &Condition, category: PhaseCategory) -> Option<&Phase> {
    condition
        .solution_phases
        .iter()
        .find(|phase| phase.has_rows() && category.matches(&phase.name, LabelKind::SolutionPhase))
}

/// Sorted, de-duplicated names of listed solution phases and heavy-enough
/// pure solids in `category`.
fn matching_names(
    condition: &Condition,
    mass_threshold: f64,
    category: PhaseCategory,
) -> Vec<String> {
    let mut names = condition
        .solution_phases
        .iter()
        .filter(|phase| {
            phase.has_rows() && category.matches(&phase.name, LabelKind::SolutionPhase)
        })
        .map(|phase| phase.name.clone())
        .chain(
            condition
                .pure_solids
                .iter()
                .filter(|solid| {
                    solid.mass_g >= mass_threshold
                        && category.matches(&solid.name, LabelKind::PureSolid)
                })
                .map(|solid| solid.name.clone()),
        )
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    names
}

fn split_event(event: Option<PrecipitationEvent>) -> (Option<f64>, Vec<String>) {
    match event {
        Some(event) => (Some(event.temperature_c), event.phases),
        None => (None, Vec::new()),
    }
}
