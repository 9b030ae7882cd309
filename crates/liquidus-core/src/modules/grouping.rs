use crate::common::config::AnalysisConfig;
use crate::domain::Condition;

/// Splits the ordered condition sequence into contiguous simulation runs.
///
/// A run ends before a condition numbered page 1, or before a condition whose
/// tracked reactant mass differs from the last reported mass by more than the
/// tolerance. Conditions without the tracked reactant never split a run.
pub fn group_runs<'a>(conditions: &'a [Condition], config: &AnalysisConfig) -> Vec<&'a [Condition]> {
    let mut runs = Vec::new();
    let mut run_start = 0;
    let mut last_mass: Option<f64> = None;

    for (index, condition) in conditions.iter().enumerate() {
        let mass = condition.reactant_mass(&config.tracked_reactant);
        let page_reset = condition.page_number == 1 && index > run_start;
        let mass_changed = match (last_mass, mass) {
            (Some(previous), Some(current)) => (current - previous).abs() > config.reactant_tolerance,
            _ => false,
        };

        if page_reset || mass_changed {
            tracing::debug!(
                page = condition.page_number,
                page_reset,
                mass_changed,
                "starting new simulation run"
            );
            runs.push(&conditions[run_start..index]);
            run_start = index;
        }

        if mass.is_some() {
            last_mass = mass;
        }
    }

    if run_start < conditions.len() {
        runs.push(&conditions[run_start..]);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::group_runs;
    use crate::common::config::AnalysisConfig;
    use crate::domain::{Condition, ReactantMass};

    fn condition(page_number: u32, fe_mass: Option<f64>) -> Condition {
        Condition {
            page_number,
            reactants: fe_mass
                .map(|mass_g| {
                    vec![ReactantMass {
                        name: "Fe".to_string(),
                        moles: mass_g / 55.845,
                        mass_g,
                    }]
                })
                .unwrap_or_default(),
            ..Condition::default()
        }
    }

    fn run_lengths(conditions: &[Condition]) -> Vec<usize> {
        group_runs(conditions, &AnalysisConfig::default())
            .iter()
            .map(|run| run.len())
            .collect()
    }

    #[test]
    fn page_reset_and_mass_change_split_runs() {
        let conditions = [
            condition(1, Some(10.0)),
            condition(2, Some(10.0)),
            condition(3, Some(10.0)),
            condition(1, Some(20.0)),
            condition(2, Some(20.0)),
        ];
        assert_eq!(run_lengths(&conditions), [3, 2]);
    }

    #[test]
    fn mass_change_alone_splits_without_page_reset() {
        let conditions = [
            condition(1, Some(10.0)),
            condition(2, Some(10.0)),
            condition(3, Some(20.0)),
            condition(4, Some(20.0)),
        ];
        assert_eq!(run_lengths(&conditions), [2, 2]);
    }

    #[test]
    fn mass_drift_within_tolerance_stays_in_one_run() {
        let conditions = [
            condition(1, Some(10.0)),
            condition(2, Some(10.0005)),
            condition(3, Some(10.001)),
        ];
        assert_eq!(run_lengths(&conditions), [3]);
    }

    #[test]
    fn conditions_without_tracked_mass_never_split() {
        let conditions = [
            condition(1, Some(10.0)),
            condition(2, None),
            condition(3, Some(10.0)),
            condition(4, None),
            condition(5, Some(30.0)),
        ];
        assert_eq!(run_lengths(&conditions), [4, 1]);
    }

    #[test]
    fn leading_page_one_does_not_create_an_empty_run() {
        let conditions = [condition(1, None), condition(1, None)];
        assert_eq!(run_lengths(&conditions), [1, 1]);
        assert!(group_runs(&[], &AnalysisConfig::default()).is_empty());
    }
}
