use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use std::path::PathBuf;

use ancient_bio::inference::{Classifier, InferenceAdapter, LinearClassifier, Prediction};
use ancient_bio::pipeline::{EncodeOptions, InputKind, Pipeline};
use ancient_bio::IdentifierIndex;
use ancient_core::types::OutputFormat;
use ancient_core::{AncientError, Config};

use crate::cli::output::*;
use crate::cli::require_inputs;

#[derive(Args)]
pub struct PredictArgs {
    /// Reference panel (required unless --vectors is given)
    #[arg(short, long, value_name = "FILE")]
    pub panel: Option<PathBuf>,

    /// Classifier artifact (JSON with labels, order, weights and bias)
    #[arg(short, long, value_name = "FILE")]
    pub model: PathBuf,

    /// Inputs are single-sample raw vector files (one call per line)
    #[arg(long)]
    pub vectors: bool,

    /// Genotype files (plain or gzip)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write results to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: PredictArgs, config: Config) -> Result<()> {
    let mut inputs = args.files.clone();
    inputs.push(args.model.clone());
    require_inputs(&inputs)?;

    let kind = if args.vectors {
        InputKind::Vector
    } else {
        InputKind::Matrix
    };
    if kind == InputKind::Matrix && args.panel.is_none() {
        return Err(AncientError::Configuration(
            "--panel is required for genotype matrices (use --vectors for raw vector files)"
                .to_string(),
        )
        .into());
    }

    let model = LinearClassifier::load(&args.model)?;
    if model.labels() != config.model.class_labels.as_slice() {
        tracing::warn!(
            "Model labels {:?} differ from configured labels {:?}; using the model's",
            model.labels(),
            config.model.class_labels
        );
    }
    if model.order() != config.model.order {
        tracing::warn!(
            "Model order {} differs from configured order {}; using the model's",
            model.order(),
            config.model.order
        );
    }
    let labels = model.labels().to_vec();

    let mut pipeline = Pipeline::new(EncodeOptions::from_config(&config))
        .with_classifier(InferenceAdapter::new(Box::new(model)));
    if let Some(panel) = &args.panel {
        pipeline = pipeline.with_index(IdentifierIndex::from_path(panel)?);
    }

    let outcomes = pipeline.predict_batch(&args.files, kind);
    let total = outcomes.len();

    let mut predictions = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(mut found) => predictions.append(&mut found),
            Err(e) => {
                error(&format!("{}: {}", outcome.path.display(), e));
                errors.push(e);
            }
        }
    }

    if !predictions.is_empty() {
        let rendered = render(&predictions, &labels, args.format)?;
        match &args.output {
            Some(path) => {
                std::fs::write(path, rendered).map_err(AncientError::Io)?;
                success(&format!(
                    "Wrote {} predictions to {}",
                    predictions.len(),
                    path.display()
                ));
            }
            None => print!("{}", rendered),
        }
    }

    let failures = errors.len();
    match errors.into_iter().next() {
        Some(e) if failures == total => Err(e.into()),
        Some(_) => anyhow::bail!("{} of {} files failed", failures, total),
        None => Ok(()),
    }
}

/// Render predictions in the requested format
pub fn render(predictions: &[Prediction], labels: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(predictions)? + "\n"),
        OutputFormat::Tsv => {
            let mut out = String::from("sample");
            for label in labels {
                out.push('\t');
                out.push_str(label);
            }
            out.push_str("\ttop\n");
            for prediction in predictions {
                out.push_str(&prediction.sample);
                for label in labels {
                    let p = prediction.probabilities.get(label).copied().unwrap_or_default();
                    out.push_str(&format!("\t{:.6}", p));
                }
                out.push('\t');
                out.push_str(&prediction.top_label);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Text => {
            let mut table = create_standard_table();
            let mut header = vec![header_cell("Sample")];
            header.extend(labels.iter().map(|l| header_cell(l)));
            header.push(header_cell("Top"));
            table.set_header(header);

            for prediction in predictions {
                let mut row = vec![Cell::new(&prediction.sample)];
                for label in labels {
                    let p = prediction.probabilities.get(label).copied().unwrap_or_default();
                    row.push(Cell::new(format_percent(f64::from(p))));
                }
                row.push(Cell::new(&prediction.top_label));
                table.add_row(row);
            }
            Ok(format!("{table}\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn predictions() -> (Vec<Prediction>, Vec<String>) {
        let labels = vec!["AFR".to_string(), "EUR".to_string()];
        let prediction = Prediction {
            sample: "S1".to_string(),
            probabilities: labels.iter().cloned().zip([0.25f32, 0.75]).collect(),
            top_label: "EUR".to_string(),
        };
        (vec![prediction], labels)
    }

    #[test]
    fn test_render_tsv() {
        let (predictions, labels) = predictions();
        let out = render(&predictions, &labels, OutputFormat::Tsv).unwrap();
        assert_eq!(out, "sample\tAFR\tEUR\ttop\nS1\t0.250000\t0.750000\tEUR\n");
    }

    #[test]
    fn test_render_json() {
        let (predictions, labels) = predictions();
        let out = render(&predictions, &labels, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["top_label"], "EUR");
        assert_eq!(value[0]["probabilities"]["AFR"], 0.25);
    }

    #[test]
    fn test_render_text_contains_labels() {
        let (predictions, labels) = predictions();
        let out = render(&predictions, &labels, OutputFormat::Text).unwrap();
        assert!(out.contains("AFR"));
        assert!(out.contains("75.0%"));
    }
}
