use super::CliError;
use super::helpers::{ConfigOverrides, load_analysis_config, print_stage_summary};
use liquidus_core::domain::{AnalysisRequest, InputEncoding, PipelineStage};
use liquidus_core::modules::pipeline::{AnalyzeStage, AnalyzeTextStage, CanonicalizeStage};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct CanonicalizeArgs {
    /// XML export to canonicalize
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Input file holds base64-encoded XML
    #[arg(long)]
    base64: bool,

    /// Directory receiving the intermediate file
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Intermediate file name, relative to the output directory
    #[arg(long, default_value = AnalysisRequest::DEFAULT_INTERMEDIATE_NAME)]
    output: String,

    #[command(flatten)]
    config: ConfigOverrides,
}

#[derive(clap::Args)]
pub(super) struct AnalyzeArgs {
    /// XML export to analyze
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Input file holds base64-encoded XML
    #[arg(long)]
    base64: bool,

    /// Directory receiving the intermediate file and reports
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Intermediate file name, relative to the output directory
    #[arg(long, default_value = AnalysisRequest::DEFAULT_INTERMEDIATE_NAME)]
    intermediate: String,

    /// CSV report name, relative to the output directory
    #[arg(long, default_value = AnalysisRequest::DEFAULT_REPORT_NAME)]
    report: String,

    /// Also write the ranked results as JSON
    #[arg(long, value_name = "NAME")]
    json: Option<String>,

    #[command(flatten)]
    config: ConfigOverrides,
}

#[derive(clap::Args)]
pub(super) struct AnalyzeTextArgs {
    /// Intermediate text produced by `canonicalize`
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory receiving the reports
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// CSV report name, relative to the output directory
    #[arg(long, default_value = AnalysisRequest::DEFAULT_REPORT_NAME)]
    report: String,

    /// Also write the ranked results as JSON
    #[arg(long, value_name = "NAME")]
    json: Option<String>,

    #[command(flatten)]
    config: ConfigOverrides,
}

fn input_encoding(base64: bool) -> InputEncoding {
    if base64 {
        InputEncoding::Base64Xml
    } else {
        InputEncoding::Xml
    }
}

pub(super) fn run_canonicalize_command(args: CanonicalizeArgs) -> Result<i32, CliError> {
    let mut request =
        AnalysisRequest::new(PipelineStage::Canonicalize, args.input, args.output_dir);
    request.input_encoding = input_encoding(args.base64);
    request.intermediate_name = args.output;
    request.config = load_analysis_config(&args.config)?;

    let summary = CanonicalizeStage
        .run(&request)
        .map_err(CliError::Compute)?;
    print_stage_summary(&request, &summary);
    Ok(0)
}

pub(super) fn run_analyze_command(args: AnalyzeArgs) -> Result<i32, CliError> {
    let mut request = AnalysisRequest::new(PipelineStage::Analyze, args.input, args.output_dir);
    request.input_encoding = input_encoding(args.base64);
    request.intermediate_name = args.intermediate;
    request.report_name = args.report;
    request.json_report_name = args.json;
    request.config = load_analysis_config(&args.config)?;

    let summary = AnalyzeStage.run(&request).map_err(CliError::Compute)?;
    print_stage_summary(&request, &summary);
    Ok(0)
}

pub(super) fn run_analyze_text_command(args: AnalyzeTextArgs) -> Result<i32, CliError> {
    let mut request =
        AnalysisRequest::new(PipelineStage::AnalyzeText, args.input, args.output_dir);
    request.report_name = args.report;
    request.json_report_name = args.json;
    request.config = load_analysis_config(&args.config)?;

    let summary = AnalyzeTextStage
        .run(&request)
        .map_err(CliError::Compute)?;
    print_stage_summary(&request, &summary);
    Ok(0)
}
