/// End-to-end tests: panel -> loader -> curve -> encoder -> outputs
use ancient_bio::curve::{construct, point_to_index};
use ancient_bio::encoding::intensities;
use ancient_bio::formats::load_matrix;
use ancient_bio::inference::{InferenceAdapter, LinearClassifier};
use ancient_bio::{EncodeOptions, IdentifierIndex, InputKind, Pipeline, Resolution};
use ancient_core::types::{ColorMode, GenotypeCode};
use ancient_test::{
    generate_panel, init_test_logging, panel_tsv, random_matrix, vector_file, MatrixFixture,
    PanelVariant, TestEnvironment,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn four_variant_panel(env: &TestEnvironment) -> PathBuf {
    let panel: Vec<PanelVariant> = (1..=4)
        .map(|i| PanelVariant::new(format!("rs{}", i), format!("AX-{}", i), "AlleleA"))
        .collect();
    env.create_input_file("panel.txt", &panel_tsv(&panel)).unwrap()
}

#[test]
fn test_four_variant_scenario() {
    init_test_logging();
    let env = TestEnvironment::new().unwrap();
    let index = IdentifierIndex::from_path(four_variant_panel(&env)).unwrap();

    let input = env
        .create_input_file(
            "sample.tsv",
            &MatrixFixture::new(["S1"])
                .row("rs1", &[0])
                .row("rs2", &[1])
                .row("rs3", &[2])
                .row("rs4", &[1])
                .to_tsv(),
        )
        .unwrap();
    let matrix = load_matrix(&input, &index).unwrap();
    let codes: Vec<u8> = matrix
        .get("S1")
        .unwrap()
        .codes
        .iter()
        .map(|c| c.as_u8())
        .collect();
    assert_eq!(codes, vec![0, 1, 2, 1]);

    // Each raster-order value lands at its curve rank
    let curve = construct(&codes, 1).unwrap();
    for (l, &value) in codes.iter().enumerate() {
        let rank = point_to_index((l % 2) as u32, (l / 2) as u32, 1);
        assert_eq!(curve[rank as usize], value);
    }
    assert_eq!(curve, vec![0, 2, 1, 1]);

    let vector = matrix.get("S1").unwrap();
    assert_eq!(intensities(&vector.codes).unwrap(), vec![1.0, 0.5, 0.0, 0.5]);
}

#[test]
fn test_unresolved_identifier_changes_nothing() {
    let env = TestEnvironment::new().unwrap();
    let index = IdentifierIndex::from_path(four_variant_panel(&env)).unwrap();

    let base = MatrixFixture::new(["S1", "S2"])
        .row("rs1", &[1, 2])
        .row("AX-3", &[2, 2]);
    let noisy = base.clone().row("rs42", &[2, 2]).with_comment("trailing");

    let a = env.create_input_file("a.tsv", &base.to_tsv()).unwrap();
    let b = env.create_input_file("b.tsv", &noisy.to_tsv()).unwrap();
    let a = load_matrix(&a, &index).unwrap();
    let b = load_matrix(&b, &index).unwrap();

    for sample in ["S1", "S2"] {
        assert_eq!(a.get(sample), b.get(sample));
    }
    assert_eq!(b.stats().unresolved_lines, 1);
}

#[test]
fn test_encode_matrix_writes_table_and_images() {
    let env = TestEnvironment::new().unwrap();
    let index = IdentifierIndex::from_path(four_variant_panel(&env)).unwrap();
    let input = env
        .create_gz_file(
            "cohort.tsv.gz",
            &MatrixFixture::new(["S1", "S2"])
                .row("rs1", &[0, 2])
                .row("rs2", &[1, 2])
                .to_tsv(),
        )
        .unwrap();

    let pipeline = Pipeline::new(EncodeOptions {
        output_dir: env.output_dir(),
        ..Default::default()
    })
    .with_index(index);
    let report = pipeline.process_batch(&[input], InputKind::Matrix).unwrap();

    assert_eq!(report.failures(), 0);
    let table = env.read_output("cohort.2x2.tsv").unwrap();
    assert_eq!(table, "S1\t1\t1\t1\t0.5\nS2\t0\t1\t1\t0\n");
    assert!(env.output_path("cohort.S1.2x2.png").exists());
    assert!(env.output_path("cohort.S2.2x2.png").exists());
}

#[test]
fn test_encode_vectors_with_width_into_shared_table() {
    let env = TestEnvironment::new().unwrap();
    let mut calls = vec![0u8; 16];
    calls[0] = 2;
    let first = env.create_input_file("NA1.txt", &vector_file(&calls)).unwrap();
    let second = env
        .create_gz_file("NA2.txt.gz", &vector_file(&[1u8; 16]))
        .unwrap();

    let pipeline = Pipeline::new(EncodeOptions {
        resolution: Resolution::Width(2),
        mode: ColorMode::Categorical,
        write_image: false,
        output_dir: env.output_dir(),
        table_name: Some("all.tsv".to_string()),
        ..Default::default()
    });
    let report = pipeline
        .process_batch(&[first, second], InputKind::Vector)
        .unwrap();

    assert_eq!(report.table, Some(env.output_path("all.tsv")));
    let table = env.read_output("all.tsv").unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "NA1\t0,0,255\t255,0,0\t255,0,0\t255,0,0");
    assert_eq!(lines[1], "NA2\t0,255,0\t0,255,0\t0,255,0\t0,255,0");
    assert!(!env.output_path("NA1.2x2.tsv").exists());
}

#[test]
fn test_predict_matrix() {
    let env = TestEnvironment::new().unwrap();
    let panel = generate_panel(16);
    let panel_path = env.create_input_file("panel.txt", &panel_tsv(&panel)).unwrap();
    let input = env
        .create_input_file("cohort.tsv", &random_matrix(&panel, 3, 11).to_tsv())
        .unwrap();

    let labels: Vec<String> = ["AFR", "AMR", "EAS", "EUR", "SAS"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let weights = (0..5).map(|c| vec![c as f32 * 0.1; 16]).collect();
    let model = LinearClassifier::new(labels, 2, weights, vec![0.0; 5]).unwrap();

    let pipeline = Pipeline::new(EncodeOptions::default())
        .with_index(IdentifierIndex::from_path(panel_path).unwrap())
        .with_classifier(InferenceAdapter::new(Box::new(model)));

    let outcomes = pipeline.predict_batch(&[input], InputKind::Matrix);
    let predictions = outcomes[0].result.as_ref().unwrap();
    assert_eq!(predictions.len(), 3);
    for prediction in predictions {
        let total: f32 = prediction.probabilities.values().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert_eq!(prediction.probabilities.len(), 5);
    }
}

#[test]
fn test_model_input_pads_with_reference() {
    let pipeline = Pipeline::new(EncodeOptions::default());
    let vector = ancient_bio::GenotypeVector::from_codes("S1", vec![GenotypeCode::HomAlt; 3]);
    let values = pipeline.model_input(&vector, 1).unwrap();
    // Raster cells 0, 1, 2 sit at ranks 0, 3, 1; rank 2 is padding
    assert_eq!(values, vec![0.0, 0.0, 1.0, 0.0]);
}
