use liquidus_core::common::config::AnalysisConfig;
use liquidus_core::domain::LiquidusErrorCategory;
use liquidus_core::modules::report::NOT_FOUND;
use liquidus_core::modules::{
    analyze_conditions, canonicalize_xml, reconstruct_from_reader, write_csv_report,
    write_intermediate,
};

fn export_document(second_page_solids: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<result formula="Fe2O3 + Si">
  <header>
    <reactant id="r1" name="Fe" mw="55.845"/>
    <species_definition>
      <solution phase_id="p1" state="FTmisc-FeLQ-liquid">
        <species id="s1" name="Fe"/>
        <species id="s2" name="Si"/>
      </solution>
    </species_definition>
    <species id="x1" name="FeSi2(s)" phase="s"/>
  </header>
  <page id="1" T="1873.15" P="1.01325">
    <reactant id="r1" n="1.0"/>
    <solution id="p1" g="100.0"/>
    <result id="s1" g="98.0" W="0.98" n="1.75" X="0.96" a="0.95"/>
    <result id="s2" g="2.0" W="0.02" n="0.07" X="0.04" a="0.001"/>
  </page>
  <page id="2" T="1773.15" P="1.01325">
    <reactant id="r1" n="1.0"/>
    <solution id="p1" g="100.0"/>
    <result id="s1" g="95.0" W="0.95" n="1.7" X="0.9" a="0.9"/>
    <result id="s2" g="5.0" W="0.05" n="0.18" X="0.1" a="0.002"/>
    {second_page_solids}
  </page>
</result>
"#
    )
}

fn run_pipeline(source: &str) -> (Vec<liquidus_core::domain::Condition>, AnalysisConfig) {
    let config = AnalysisConfig::default();
    let export = canonicalize_xml(source, &config).expect("export should canonicalize");
    let mut intermediate = Vec::new();
    write_intermediate(&mut intermediate, &export).expect("intermediate should render");
    let conditions =
        reconstruct_from_reader(intermediate.as_slice()).expect("intermediate should read back");
    (conditions, config)
}

#[test]
fn single_run_without_precipitation_reports_coolest_richest_liquid() {
    let (conditions, config) = run_pipeline(&export_document(""));
    assert_eq!(conditions.len(), 2);

    let outcome = analyze_conditions(&conditions, &config);
    assert_eq!(outcome.run_count, 1);
    assert_eq!(outcome.ranked.len(), 1);

    let best = &outcome.ranked[0];
    assert_eq!(best.best_temperature_c, Some(1500.0));
    assert_eq!(best.best_target_fraction, Some(0.05));
    assert_eq!(best.stop_temperature_c, None);

    let mut buffer = Vec::new();
    write_csv_report(&mut buffer, &outcome.ranked, &config).expect("report should be written");
    let report = String::from_utf8(buffer).expect("report should be utf-8");
    let row = report.lines().nth(1).expect("one ranked row");
    let cells = row.split(',').collect::<Vec<_>>();
    assert_eq!(cells[2], "1500.00");
    assert_eq!(cells[3], "5.000");
    assert_eq!(cells[5], NOT_FOUND);
    assert_eq!(cells[6], NOT_FOUND);
}

#[test]
fn intermetallic_precipitation_stops_the_liquid_scan() {
    let (conditions, config) =
        run_pipeline(&export_document(r#"<result id="x1" g="1.0" a="1.0"/>"#));
    assert_eq!(conditions[1].pure_solids.len(), 1);

    let outcome = analyze_conditions(&conditions, &config);
    let best = &outcome.ranked[0];
    assert_eq!(best.best_temperature_c, Some(1600.0));
    assert_eq!(best.best_target_fraction, Some(0.02));
    assert_eq!(best.stop_temperature_c, Some(1500.0));
    assert_eq!(best.stop_phases, ["FeSi2(s)"]);
}

#[test]
fn empty_document_yields_an_empty_report() {
    let (conditions, config) = run_pipeline(r#"<result formula="Fe"/>"#);
    assert!(conditions.is_empty());

    let outcome = analyze_conditions(&conditions, &config);
    assert_eq!(outcome.run_count, 0);
    assert!(outcome.ranked.is_empty());

    let mut buffer = Vec::new();
    write_csv_report(&mut buffer, &outcome.ranked, &config).expect("report should be written");
    assert_eq!(String::from_utf8_lossy(&buffer).lines().count(), 1);
}

#[test]
fn malformed_document_is_rejected_without_partial_output() {
    let error = canonicalize_xml("<result><page id=\"1\">", &AnalysisConfig::default())
        .expect_err("malformed xml should fail");
    assert_eq!(error.category(), LiquidusErrorCategory::InputValidationError);
    assert_eq!(error.placeholder(), "INPUT.XML_PARSE");
}

#[test]
fn runs_without_metallic_liquid_are_left_out_of_the_ranking() {
    let source = r#"<result formula="SiO2">
  <header>
    <species_definition>
      <solution phase_id="p1" state="FToxid-SLAGA-liq">
        <species id="s1" name="SiO2"/>
      </solution>
    </species_definition>
  </header>
  <page id="1" T="1873.15">
    <solution id="p1" g="10.0"/>
    <result id="s1" g="10.0" W="1.0" a="1.0"/>
  </page>
</result>"#;
    let (conditions, config) = run_pipeline(source);
    let outcome = analyze_conditions(&conditions, &config);
    assert_eq!(outcome.run_count, 1);
    assert_eq!(outcome.results[0].best_temperature_c, None);
    assert!(outcome.ranked.is_empty());
}
