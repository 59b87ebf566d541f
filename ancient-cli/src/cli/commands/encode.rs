use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use ancient_bio::pipeline::{EncodeOptions, InputKind, Pipeline};
use ancient_bio::IdentifierIndex;
use ancient_core::types::{ColorMode, ResampleStrategy};
use ancient_core::{AncientError, Config};

use crate::cli::output::*;
use crate::cli::require_inputs;

#[derive(Args)]
pub struct EncodeArgs {
    /// Reference panel (required unless --vectors is given)
    #[arg(short, long, value_name = "FILE")]
    pub panel: Option<PathBuf>,

    /// Inputs are single-sample raw vector files (one call per line)
    #[arg(long)]
    pub vectors: bool,

    /// Genotype files (plain or gzip)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Hilbert curve order (grid side 2^ORDER)
    #[arg(short = 'o', long, value_name = "ORDER", conflicts_with = "width")]
    pub order: Option<u32>,

    /// Bin every vector to WIDTH x WIDTH cells first
    #[arg(short = 'w', long, value_name = "WIDTH")]
    pub width: Option<u32>,

    /// Value encoding
    #[arg(short, long, value_enum)]
    pub mode: Option<ColorMode>,

    /// Bin reduction used with --width
    #[arg(long, value_enum)]
    pub strategy: Option<ResampleStrategy>,

    /// Write tables only, no images
    #[arg(long)]
    pub no_image: bool,

    /// Directory for tables and images
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write every row into this one table (a .gz suffix compresses it)
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Warn about samples with fewer non-reference calls than this fraction
    #[arg(long, value_name = "FRACTION")]
    pub min_non_ref: Option<f64>,
}

impl EncodeArgs {
    /// Fold command-line flags over the configuration file
    fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(order) = self.order {
            config.encoding.order = Some(order);
            config.encoding.width = None;
        }
        if let Some(width) = self.width {
            config.encoding.width = Some(width);
            config.encoding.order = None;
        }
        if let Some(mode) = self.mode {
            config.encoding.mode = mode;
        }
        if let Some(strategy) = self.strategy {
            config.encoding.strategy = strategy;
        }
        if self.no_image {
            config.output.image = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = Some(dir.display().to_string());
        }
        if let Some(table) = &self.table {
            config.output.table_name = Some(table.clone());
        }
        if let Some(fraction) = self.min_non_ref {
            config.validation.min_non_reference_fraction = Some(fraction);
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: EncodeArgs, config: Config) -> Result<()> {
    require_inputs(&args.files)?;
    let config = args.apply(config)?;

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

    let mut pipeline = Pipeline::new(EncodeOptions::from_config(&config));
    if let Some(panel) = &args.panel {
        pipeline = pipeline.with_index(IdentifierIndex::from_path(panel)?);
    }

    section_header("Encoding");
    let report = pipeline.process_batch(&args.files, kind)?;
    let total = report.outcomes.len();
    let failures = report.failures();

    let mut first_error = None;
    for outcome in report.outcomes {
        match outcome.result {
            Ok(file) => success(&format!(
                "{}: {} sample{} at {}x{}",
                outcome.path.display(),
                file.samples,
                if file.samples == 1 { "" } else { "s" },
                file.side,
                file.side
            )),
            Err(e) => {
                error(&format!("{}: {}", outcome.path.display(), e));
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(table) = &report.table {
        tree_item(true, "Table", Some(&table.display().to_string()));
    }

    match first_error {
        // Every file failed: surface the underlying error and its exit code
        Some(e) if failures == total => Err(e.into()),
        Some(_) => anyhow::bail!("{} of {} files failed", failures, total),
        None => Ok(()),
    }
}
