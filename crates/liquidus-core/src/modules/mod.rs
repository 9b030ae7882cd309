pub mod analysis;
pub mod canonicalize;
pub mod classify;
pub mod grouping;
pub mod pipeline;
pub mod reconstruct;
pub mod report;
pub mod serialization;

mod traits;

pub use analysis::analyze_run;
pub use canonicalize::{CanonicalExport, canonicalize_xml, write_intermediate};
pub use classify::{LabelKind, PhaseCategory};
pub use grouping::group_runs;
pub use pipeline::{
    AnalysisOutcome, AnalyzeStage, AnalyzeTextStage, CanonicalizeStage, StageSummary,
    analyze_conditions, decode_input, run_stage,
};
pub use reconstruct::{reconstruct_conditions, reconstruct_from_reader};
pub use report::{composition_summary, rank_results, write_csv_report, write_json_report};
pub use traits::StageExecutor;
