//! Stage executors wiring the canonicalizer, reconstructor, grouper,
//! analyzer and report writer to files on disk.

use super::StageExecutor;
use super::analysis::analyze_run;
use super::canonicalize::{CanonicalExport, canonicalize_xml, write_intermediate};
use super::grouping::group_runs;
use super::reconstruct::{reconstruct_conditions, reconstruct_from_reader};
use super::report::{rank_results, write_csv_report, write_json_report};
use super::serialization::{artifact_write_error, create_artifact_writer, read_input_bytes};
use crate::common::config::AnalysisConfig;
use crate::domain::{
    AnalysisArtifact, AnalysisRequest, AnalysisResult, Condition, InputEncoding, LiquidusError,
    LiquidusResult, PipelineStage,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOutcome {
    pub condition_count: usize,
    pub run_count: usize,
    /// One entry per run, in run order.
    pub results: Vec<AnalysisResult>,
    pub ranked: Vec<AnalysisResult>,
}

/// What a stage did, for callers that report more than the artifact list.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage: PipelineStage,
    pub condition_count: usize,
    pub outcome: Option<AnalysisOutcome>,
    pub artifacts: Vec<AnalysisArtifact>,
}

/// Turns raw input bytes into document text, undoing the transport encoding.
pub fn decode_input(bytes: &[u8], encoding: InputEncoding) -> LiquidusResult<String> {
    let decoded = match encoding {
        InputEncoding::Xml => String::from_utf8_lossy(bytes).into_owned(),
        InputEncoding::Base64Xml => {
            let compact = bytes
                .iter()
                .copied()
                .filter(|byte| !byte.is_ascii_whitespace())
                .collect::<Vec<_>>();
            let raw = STANDARD.decode(&compact).map_err(|source| {
                LiquidusError::input_validation(
                    "INPUT.BASE64_DECODE",
                    format!("input is not valid base64: {}", source),
                )
            })?;
            String::from_utf8_lossy(&raw).into_owned()
        }
    };

    Ok(match decoded.strip_prefix(BYTE_ORDER_MARK) {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    })
}

/// Groups conditions into runs, analyzes each run and ranks the results.
pub fn analyze_conditions(conditions: &[Condition], config: &AnalysisConfig) -> AnalysisOutcome {
    let runs = group_runs(conditions, config);
    let results = runs
        .iter()
        .map(|run| analyze_run(run, config))
        .collect::<Vec<_>>();
    let ranked = rank_results(&results, config.top_k);

    tracing::debug!(
        conditions = conditions.len(),
        runs = runs.len(),
        ranked = ranked.len(),
        "analysis finished"
    );

    AnalysisOutcome {
        condition_count: conditions.len(),
        run_count: runs.len(),
        results,
        ranked,
    }
}

/// Runs whichever stage the request names.
pub fn run_stage(request: &AnalysisRequest) -> LiquidusResult<StageSummary> {
    match request.stage {
        PipelineStage::Canonicalize => CanonicalizeStage.run(request),
        PipelineStage::Analyze => AnalyzeStage.run(request),
        PipelineStage::AnalyzeText => AnalyzeTextStage.run(request),
    }
}

pub struct CanonicalizeStage;

impl CanonicalizeStage {
    pub fn run(&self, request: &AnalysisRequest) -> LiquidusResult<StageSummary> {
        validate_stage(request, PipelineStage::Canonicalize)?;
        let source = read_document(request)?;
        let export = canonicalize_xml(&source, &request.config)?;

        prepare_output_dir(&request.output_dir)?;
        let artifact = write_intermediate_artifact(request, &export)?;

        tracing::info!(
            conditions = export.conditions.len(),
            output = %request.output_dir.join(&request.intermediate_name).display(),
            "canonicalized export"
        );

        Ok(StageSummary {
            stage: PipelineStage::Canonicalize,
            condition_count: export.conditions.len(),
            outcome: None,
            artifacts: vec![artifact],
        })
    }
}

impl StageExecutor for CanonicalizeStage {
    fn execute(&self, request: &AnalysisRequest) -> LiquidusResult<Vec<AnalysisArtifact>> {
        self.run(request).map(|summary| summary.artifacts)
    }
}

pub struct AnalyzeStage;

impl AnalyzeStage {
    pub fn run(&self, request: &AnalysisRequest) -> LiquidusResult<StageSummary> {
        validate_stage(request, PipelineStage::Analyze)?;
        let source = read_document(request)?;
        let export = canonicalize_xml(&source, &request.config)?;

        prepare_output_dir(&request.output_dir)?;
        let mut artifacts = vec![write_intermediate_artifact(request, &export)?];

        // Analysis always reads back the serialized form, not the in-memory records.
        let conditions = read_intermediate(&request.output_dir.join(&request.intermediate_name))?;
        let outcome = analyze_conditions(&conditions, &request.config);
        artifacts.extend(write_reports(request, &outcome)?);

        Ok(StageSummary {
            stage: PipelineStage::Analyze,
            condition_count: outcome.condition_count,
            outcome: Some(outcome),
            artifacts,
        })
    }
}

impl StageExecutor for AnalyzeStage {
    fn execute(&self, request: &AnalysisRequest) -> LiquidusResult<Vec<AnalysisArtifact>> {
        self.run(request).map(|summary| summary.artifacts)
    }
}

pub struct AnalyzeTextStage;

impl AnalyzeTextStage {
    pub fn run(&self, request: &AnalysisRequest) -> LiquidusResult<StageSummary> {
        validate_stage(request, PipelineStage::AnalyzeText)?;
        let bytes = read_input_bytes(&request.input_path)?;
        let conditions = reconstruct_conditions(&String::from_utf8_lossy(&bytes));
        let outcome = analyze_conditions(&conditions, &request.config);

        prepare_output_dir(&request.output_dir)?;
        let artifacts = write_reports(request, &outcome)?;

        Ok(StageSummary {
            stage: PipelineStage::AnalyzeText,
            condition_count: outcome.condition_count,
            outcome: Some(outcome),
            artifacts,
        })
    }
}

impl StageExecutor for AnalyzeTextStage {
    fn execute(&self, request: &AnalysisRequest) -> LiquidusResult<Vec<AnalysisArtifact>> {
        self.run(request).map(|summary| summary.artifacts)
    }
}

fn validate_stage(request: &AnalysisRequest, expected: PipelineStage) -> LiquidusResult<()> {
    if request.stage != expected {
        return Err(LiquidusError::input_validation(
            "INPUT.STAGE_MISMATCH",
            format!("{} stage cannot run a {} request", expected, request.stage),
        ));
    }
    Ok(())
}

fn read_document(request: &AnalysisRequest) -> LiquidusResult<String> {
    let bytes = read_input_bytes(&request.input_path)?;
    decode_input(&bytes, request.input_encoding)
}

fn prepare_output_dir(output_dir: &Path) -> LiquidusResult<()> {
    fs::create_dir_all(output_dir).map_err(|source| {
        LiquidusError::io_system(
            "IO.OUTPUT_DIRECTORY",
            format!(
                "failed to create output directory '{}': {}",
                output_dir.display(),
                source
            ),
        )
    })
}

fn write_intermediate_artifact(
    request: &AnalysisRequest,
    export: &CanonicalExport,
) -> LiquidusResult<AnalysisArtifact> {
    let path = request.output_dir.join(&request.intermediate_name);
    let mut writer = create_artifact_writer(&path)?;
    write_intermediate(&mut writer, export)
        .and_then(|()| writer.flush())
        .map_err(|source| artifact_write_error(&path, source))?;
    Ok(AnalysisArtifact::new(&request.intermediate_name))
}

fn read_intermediate(path: &Path) -> LiquidusResult<Vec<Condition>> {
    let read_error = |source: std::io::Error| {
        LiquidusError::io_system(
            "IO.INTERMEDIATE_READ",
            format!("failed to read intermediate '{}': {}", path.display(), source),
        )
    };
    let file = File::open(path).map_err(read_error)?;
    reconstruct_from_reader(BufReader::new(file)).map_err(read_error)
}

fn write_reports(
    request: &AnalysisRequest,
    outcome: &AnalysisOutcome,
) -> LiquidusResult<Vec<AnalysisArtifact>> {
    let report_path = request.output_dir.join(&request.report_name);
    let writer = create_artifact_writer(&report_path)?;
    write_csv_report(writer, &outcome.ranked, &request.config)?;
    let mut artifacts = vec![AnalysisArtifact::new(&request.report_name)];

    if let Some(json_name) = &request.json_report_name {
        let json_path = request.output_dir.join(json_name);
        let mut writer = create_artifact_writer(&json_path)?;
        write_json_report(&mut writer, &outcome.ranked)?;
        writer
            .flush()
            .map_err(|source| artifact_write_error(&json_path, source))?;
        artifacts.push(AnalysisArtifact::new(json_name));
    }

    tracing::info!(
        runs = outcome.run_count,
        ranked = outcome.ranked.len(),
        report = %report_path.display(),
        "wrote analysis report"
    );
    Ok(artifacts)
}
