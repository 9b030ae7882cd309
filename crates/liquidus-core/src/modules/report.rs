//! Ranking of analyzed runs and rendering of the tabular report.

use crate::common::config::AnalysisConfig;
use crate::common::normalize::{format_fixed3, format_fixed4};
use crate::domain::{AnalysisResult, CompositionSnapshot, LiquidusError, LiquidusResult};
use std::io::Write;

pub const NOT_FOUND: &str = "not found";
pub const REPORT_COLUMN_COUNT: usize = 10;

const ENTRY_SEPARATOR: &str = "  |  ";

/// Runs with a best liquid, ordered by descending target fraction and cut to `top_k`.
///
/// Equal fractions keep their batch order.
pub fn rank_results(results: &[AnalysisResult], top_k: usize) -> Vec<AnalysisResult> {
    let mut ranked = results
        .iter()
        .filter(|result| result.has_best_liquid())
        .cloned()
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| {
        let left = a.best_target_fraction.unwrap_or(0.0);
        let right = b.best_target_fraction.unwrap_or(0.0);
        right.total_cmp(&left)
    });
    ranked.truncate(top_k);
    ranked
}

pub fn report_header(config: &AnalysisConfig) -> [String; REPORT_COLUMN_COUNT] {
    [
        "Rank".to_string(),
        format!("{} mass (g)", config.tracked_reactant),
        "Best T (°C)".to_string(),
        format!("{} wt% (max)", config.target_element),
        "Liquid#1 composition".to_string(),
        "Stopped at T".to_string(),
        "First precipitates".to_string(),
        "Slag first T".to_string(),
        "Slag phases".to_string(),
        "Slag liquid (before first solids)".to_string(),
    ]
}

/// Literal cells of one ranked run; `rank` starts at 1.
pub fn report_row(rank: usize, result: &AnalysisResult) -> [String; REPORT_COLUMN_COUNT] {
    [
        rank.to_string(),
        or_not_found(result.reactant_mass_g.map(format_fixed3)),
        or_not_found(result.best_temperature_c.map(format_temperature)),
        or_not_found(
            result
                .best_target_fraction
                .map(|fraction| format_fixed3(fraction * 100.0)),
        ),
        or_not_found(
            result
                .best_composition
                .as_ref()
                .filter(|snapshot| !snapshot.is_empty())
                .map(composition_summary),
        ),
        or_not_found(result.stop_temperature_c.map(format_temperature)),
        join_names(&result.stop_phases),
        or_not_found(result.slag_first_temperature_c.map(format_temperature)),
        join_names(&result.slag_first_phases),
        or_not_found(
            result
                .slag_before_first_solids
                .as_ref()
                .filter(|snapshot| !snapshot.is_empty())
                .map(composition_summary),
        ),
    ]
}

/// `<name>:  <wt%>  (a=<activity>)  ` per species, heaviest weight% first,
/// followed by the summed species mass.
pub fn composition_summary(snapshot: &CompositionSnapshot) -> String {
    let entries = snapshot
        .by_weight_fraction()
        .into_iter()
        .map(|entry| {
            format!(
                "{}:  {}  (a={})  ",
                entry.name,
                format_fixed3(entry.weight_fraction * 100.0),
                format_fixed4(entry.activity)
            )
        })
        .collect::<Vec<_>>();

    format!(
        "{}{ENTRY_SEPARATOR}TOTAL: {} g",
        entries.join(ENTRY_SEPARATOR),
        format_fixed3(snapshot.total_mass())
    )
}

pub fn write_csv_report<W: Write>(
    writer: W,
    ranked: &[AnalysisResult],
    config: &AnalysisConfig,
) -> LiquidusResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv_writer
        .write_record(report_header(config))
        .map_err(report_write_error)?;
    for (index, result) in ranked.iter().enumerate() {
        csv_writer
            .write_record(report_row(index + 1, result))
            .map_err(report_write_error)?;
    }
    csv_writer
        .flush()
        .map_err(|source| report_write_error(source.into()))
}

pub fn write_json_report<W: Write>(writer: W, ranked: &[AnalysisResult]) -> LiquidusResult<()> {
    serde_json::to_writer_pretty(writer, ranked).map_err(|source| {
        LiquidusError::io_system(
            "IO.JSON_REPORT_WRITE",
            format!("failed to write JSON report: {}", source),
        )
    })
}

fn report_write_error(source: csv::Error) -> LiquidusError {
    LiquidusError::io_system(
        "IO.REPORT_WRITE",
        format!("failed to write CSV report: {}", source),
    )
}

fn format_temperature(value: f64) -> String {
    format!("{value:.2}")
}

fn or_not_found(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_FOUND.to_string())
}

fn join_names(names: &[String]) -> String {
    if names.is_empty() {
        NOT_FOUND.to_string()
    } else {
        names.join(", ")
    }
}
