//! Integration tests for the estimation pipeline.

use estimation_stats::export::read_stats_tsv;
use estimation_stats::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Write a wide measurement table with entities P1..P4 and samples S1..S6.
///
/// - P1: clear increase in Treat
/// - P2: no change
/// - P3: Treat entirely missing
/// - P4: contains a zero (non-finite under log2)
fn write_measurements(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let sep = if name.ends_with(".csv") { "," } else { "\t" };
    let rows = [
        vec!["Protein", "S1", "S2", "S3", "S4", "S5", "S6"],
        vec!["P1", "10.1", "9.8", "10.4", "20.2", "19.7", "21.0"],
        vec!["P2", "5.0", "5.2", "4.9", "5.1", "4.8", "5.0"],
        vec!["P3", "3.0", "3.3", "2.9", "NA", "", "NaN"],
        vec!["P4", "0", "1.5", "2.0", "4.0", "4.4", "3.9"],
    ];
    let text: Vec<String> = rows.iter().map(|r| r.join(sep)).collect();
    fs::write(&path, text.join("\n") + "\n").unwrap();
    path
}

fn write_annotation(dir: &Path) -> PathBuf {
    let path = dir.join("annotation.tsv");
    fs::write(
        &path,
        "Sample\tCondition\nS1\tCtrl\nS2\tCtrl\nS3\tCtrl\nS4\tTreat\nS5\tTreat\nS6\tTreat\n",
    )
    .unwrap();
    path
}

fn options(dir: &Path, entities: &[&str], config: EstimationConfig) -> RunOptions {
    RunOptions {
        file_path: write_measurements(dir, "data.tsv"),
        index_column: "Protein".to_string(),
        entities: entities.iter().map(|s| s.to_string()).collect(),
        sample_annotation: write_annotation(dir),
        output_dir: dir.join("out"),
        config,
    }
}

fn quick_config() -> EstimationConfig {
    EstimationConfig {
        bootstrap: BootstrapConfig::quick(),
        ..Default::default()
    }
}

fn output_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

#[test]
fn test_single_entity_single_comparison() {
    let dir = TempDir::new().unwrap();
    // Only S1..S4 are annotated: two samples per condition.
    let annotation = dir.path().join("annotation.csv");
    fs::write(&annotation, "Sample,Condition\nS1,Ctrl\nS2,Ctrl\nS3,Treat\nS4,Treat\n").unwrap();

    let mut opts = options(dir.path(), &["P1"], quick_config());
    opts.sample_annotation = annotation;
    let summary = run_estimation(&opts).unwrap();

    assert_eq!(summary.exported(), 1);
    assert_eq!(output_files(&opts.output_dir), vec!["P1.svg", "P1_stats.tsv"]);

    let rows = read_stats_tsv(&opts.output_dir.join("P1_stats.tsv")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity, "P1");
    assert_eq!(rows[0].baseline, "Ctrl");
    assert_eq!(rows[0].comparator, "Treat");
    // mean(S3, S4) - mean(S1, S2)
    let expected = (10.4 + 20.2) / 2.0 - (10.1 + 9.8) / 2.0;
    assert!((rows[0].difference - expected).abs() < 1e-9);
    assert!(rows[0].ci_lower <= rows[0].ci_upper);
}

#[test]
fn test_unknown_entity_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path(), &["P9"], quick_config());

    let summary = run_estimation(&opts).unwrap();

    assert_eq!(summary.exported(), 0);
    assert_eq!(summary.matched, 0);
    assert!(!opts.output_dir.exists());
}

#[test]
fn test_all_missing_condition_skips_entity_only() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path(), &["P1", "P2", "P3"], quick_config());

    let summary = run_estimation(&opts).unwrap();

    assert_eq!(summary.matched, 3);
    assert_eq!(summary.exported(), 2);
    match summary.get("P3").unwrap() {
        EntityOutcome::Failed { cause, .. } => assert!(cause.contains("usable condition")),
        other => panic!("P3 should fail, got {:?}", other),
    }
    assert_eq!(
        output_files(&opts.output_dir),
        vec!["P1.svg", "P1_stats.tsv", "P2.svg", "P2_stats.tsv"]
    );
}

#[test]
fn test_log2_zero_fails_that_entity_only() {
    let dir = TempDir::new().unwrap();
    let config = EstimationConfig {
        log2: true,
        ..quick_config()
    };
    let opts = options(dir.path(), &["P1", "P4"], config);

    let summary = run_estimation(&opts).unwrap();

    assert_eq!(summary.exported(), 1);
    match summary.get("P4").unwrap() {
        EntityOutcome::Failed { stage, cause, .. } => {
            assert_eq!(*stage, EntityStage::Sanitized);
            assert!(cause.contains("Non-finite"));
        }
        other => panic!("P4 should fail, got {:?}", other),
    }

    let rows = read_stats_tsv(&opts.output_dir.join("P1_stats.tsv")).unwrap();
    assert!(rows[0].difference > 0.9 && rows[0].difference < 1.1);
}

#[test]
fn test_rerun_is_identical() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path(), &["P1", "P2"], quick_config());

    run_estimation(&opts).unwrap();
    let first = fs::read(opts.output_dir.join("P1_stats.tsv")).unwrap();
    run_estimation(&opts).unwrap();
    let second = fs::read(opts.output_dir.join("P1_stats.tsv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let dir = TempDir::new().unwrap();
    let table = MeasurementTable::from_path(write_measurements(dir.path(), "m.csv"), "Protein")
        .unwrap();
    let annotation = AnnotationIndex::from_path(write_annotation(dir.path())).unwrap();

    let pipeline = Pipeline::new(["P1", "P2"]).resamples(300);
    pipeline
        .clone()
        .parallel(true)
        .run(&table, &annotation, &dir.path().join("par"))
        .unwrap();
    pipeline
        .parallel(false)
        .run(&table, &annotation, &dir.path().join("seq"))
        .unwrap();

    for name in ["P1_stats.tsv", "P2_stats.tsv"] {
        assert_eq!(
            fs::read(dir.path().join("par").join(name)).unwrap(),
            fs::read(dir.path().join("seq").join(name)).unwrap()
        );
    }
}

#[test]
fn test_condition_order_sets_baseline() {
    let dir = TempDir::new().unwrap();
    let config = EstimationConfig {
        condition_order: vec!["Treat".to_string(), "Ctrl".to_string()],
        ..quick_config()
    };
    let opts = options(dir.path(), &["P1"], config);

    run_estimation(&opts).unwrap();

    let rows = read_stats_tsv(&opts.output_dir.join("P1_stats.tsv")).unwrap();
    assert_eq!(rows[0].baseline, "Treat");
    assert_eq!(rows[0].comparator, "Ctrl");
    assert!(rows[0].difference < 0.0);
}

#[test]
fn test_colliding_stems_get_distinct_files() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("ids.tsv");
    fs::write(
        &data,
        "Protein\tS1\tS2\tS3\tS4\tS5\tS6\n\
         P1|a\t1.0\t1.1\t0.9\t2.0\t2.1\t1.9\n\
         P1;a\t5.0\t5.2\t4.8\t3.0\t3.1\t2.9\n",
    )
    .unwrap();
    let mut opts = options(dir.path(), &["P1|a", "P1;a"], quick_config());
    opts.file_path = data;

    let summary = run_estimation(&opts).unwrap();

    let stats_files = output_files(&opts.output_dir)
        .into_iter()
        .filter(|name| name.ends_with("_stats.tsv"))
        .count();
    assert_eq!(summary.exported(), 2);
    assert_eq!(summary.exported(), stats_files);
    assert_eq!(
        output_files(&opts.output_dir),
        vec!["P1_a.svg", "P1_a_2.svg", "P1_a_2_stats.tsv", "P1_a_stats.tsv"]
    );

    // "P1;a" sorts first and keeps the plain stem.
    let first = read_stats_tsv(&opts.output_dir.join("P1_a_stats.tsv")).unwrap();
    let second = read_stats_tsv(&opts.output_dir.join("P1_a_2_stats.tsv")).unwrap();
    assert_eq!(first[0].entity, "P1;a");
    assert_eq!(second[0].entity, "P1|a");
}

#[test]
fn test_undersized_comparator_is_skipped() {
    let dir = TempDir::new().unwrap();
    let annotation = dir.path().join("three.tsv");
    fs::write(
        &annotation,
        "Sample\tCondition\nS1\tCtrl\nS2\tCtrl\nS3\tCtrl\nS4\tTreat\nS5\tTreat\nS6\tSolo\n",
    )
    .unwrap();
    let config = EstimationConfig {
        condition_order: vec!["Ctrl".to_string(), "Treat".to_string(), "Solo".to_string()],
        ..quick_config()
    };
    let mut opts = options(dir.path(), &["P1"], config);
    opts.sample_annotation = annotation;

    let summary = run_estimation(&opts).unwrap();

    match summary.get("P1").unwrap() {
        EntityOutcome::Exported {
            comparisons,
            skipped,
            ..
        } => {
            assert_eq!(*comparisons, 1);
            assert_eq!(skipped.len(), 1);
            assert_eq!(skipped[0].comparator, "Solo");
        }
        other => panic!("P1 should be exported, got {:?}", other),
    }
    let rows = read_stats_tsv(&opts.output_dir.join("P1_stats.tsv")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].comparator, "Treat");
}

struct FailingRenderer;

impl PlotRenderer for FailingRenderer {
    fn render(&self, spec: &PlotSpec) -> Result<Vec<u8>> {
        if spec.entity == "P2" {
            return Err(EstimationError::Render {
                entity: spec.entity.clone(),
                reason: "backend unavailable".to_string(),
            });
        }
        SvgRenderer::default().render(spec)
    }
}

#[test]
fn test_render_failure_is_isolated() {
    let dir = TempDir::new().unwrap();
    let table = MeasurementTable::from_path(write_measurements(dir.path(), "m.txt"), "Protein")
        .unwrap();
    let annotation = AnnotationIndex::from_path(write_annotation(dir.path())).unwrap();
    let out = dir.path().join("out");

    let summary = Pipeline::new(["P1", "P2"])
        .resamples(200)
        .renderer(Arc::new(FailingRenderer))
        .run(&table, &annotation, &out)
        .unwrap();

    assert_eq!(summary.exported(), 1);
    assert!(matches!(
        summary.get("P2"),
        Some(EntityOutcome::Failed {
            stage: EntityStage::Estimated,
            ..
        })
    ));
    assert_eq!(output_files(&out), vec!["P1.svg", "P1_stats.tsv"]);
}

#[test]
fn test_unsupported_format_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(dir.path(), &["P1"], quick_config());
    opts.file_path = dir.path().join("data.xlsx");
    fs::write(&opts.file_path, "irrelevant").unwrap();

    let err = run_estimation(&opts).unwrap_err();
    assert!(matches!(err, EstimationError::UnsupportedFormat { .. }));
    assert!(err.is_fatal());
    assert!(!opts.output_dir.exists());
}

#[test]
fn test_missing_index_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(dir.path(), &["P1"], quick_config());
    opts.index_column = "Gene".to_string();

    let err = run_estimation(&opts).unwrap_err();
    assert!(matches!(err, EstimationError::MissingColumn(ref c) if c == "Gene"));
}
