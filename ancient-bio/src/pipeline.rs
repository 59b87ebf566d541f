//! Batch encoding and prediction
//!
//! A [`Pipeline`] is built once per run and shared by reference across the
//! rayon workers. It owns the panel index, the encoding options, the Hilbert
//! tables and the optional classifier; none of these change after
//! construction. Each input file is processed independently and reports its
//! own outcome, so one bad file never stops its siblings.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ancient_core::config::{Config, MAX_ORDER, MAX_WIDTH};
use ancient_core::error::{AncientError, AncientResult};
use ancient_core::file_prefix;
use ancient_core::types::{ColorMode, GenotypeCode, ResampleStrategy};

use crate::curve::{order_for_len, resample, HilbertTable};
use crate::encoding::{intensities, rasterize, table_cell};
use crate::formats::genotypes::{histogram, load_vector, MatrixLoader, DEFAULT_PROGRESS_INTERVAL};
use crate::formats::{GenotypeVector, LoadStats};
use crate::inference::{InferenceAdapter, Prediction};
use crate::output::{raster_file_name, table_file_name, write_raster, write_table, TableRow};
use crate::panel::IdentifierIndex;

/// How the output grid size is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Smallest order that holds the whole vector
    #[default]
    Auto,
    /// Fixed curve order; the vector must fit `4^k` cells
    Order(u32),
    /// Bin the vector to `width^2` cells first
    Width(u32),
}

/// Layout of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Multi-sample genotype matrix, resolved through the panel
    Matrix,
    /// Single-sample raw vector, one call per line
    Vector,
}

#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub resolution: Resolution,
    pub mode: ColorMode,
    pub strategy: ResampleStrategy,
    /// Write a PNG per sample
    pub write_image: bool,
    pub output_dir: PathBuf,
    /// Write every row into this one table instead of one table per file
    pub table_name: Option<String>,
    pub min_non_reference_fraction: Option<f64>,
    pub min_line_coverage: Option<f64>,
    pub progress_interval: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::Auto,
            mode: ColorMode::Grayscale,
            strategy: ResampleStrategy::Max,
            write_image: true,
            output_dir: PathBuf::from("."),
            table_name: None,
            min_non_reference_fraction: None,
            min_line_coverage: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl EncodeOptions {
    pub fn from_config(config: &Config) -> Self {
        let resolution = match (config.encoding.order, config.encoding.width) {
            (Some(order), _) => Resolution::Order(order),
            (None, Some(width)) => Resolution::Width(width),
            (None, None) => Resolution::Auto,
        };
        Self {
            resolution,
            mode: config.encoding.mode,
            strategy: config.encoding.strategy,
            write_image: config.output.image,
            output_dir: config
                .output
                .directory
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            table_name: config.output.table_name.clone(),
            min_non_reference_fraction: config.validation.min_non_reference_fraction,
            min_line_coverage: config.validation.min_line_coverage,
            progress_interval: config.performance.progress_interval,
        }
    }
}

/// One sample laid out on the curve
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSample {
    pub sample_id: String,
    pub order: u32,
    /// Codes in curve order; `None` past the end of the input
    pub curve: Vec<Option<GenotypeCode>>,
    /// Row-major grid with each value at its curve position
    pub grid: Vec<Option<GenotypeCode>>,
}

impl EncodedSample {
    pub fn side(&self) -> u32 {
        1 << self.order
    }

    /// Table row in the given mode
    pub fn table_row(&self, mode: ColorMode) -> AncientResult<TableRow> {
        let cells = self
            .curve
            .iter()
            .map(|code| table_cell(*code, mode))
            .collect::<AncientResult<Vec<_>>>()?;
        Ok(TableRow {
            id: self.sample_id.clone(),
            cells,
        })
    }
}

/// Summary of one encoded file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub samples: usize,
    pub side: u32,
    pub stats: LoadStats,
    pub rows: Vec<TableRow>,
    pub written: Vec<PathBuf>,
}

/// Result of processing one input file
#[derive(Debug)]
pub struct FileOutcome<T> {
    pub path: PathBuf,
    pub result: AncientResult<T>,
}

impl<T> FileOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of an encode batch, plus the shared table if one was written
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome<FileReport>>,
    pub table: Option<PathBuf>,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }
}

/// Immutable run context shared by every worker
pub struct Pipeline {
    index: Option<IdentifierIndex>,
    options: EncodeOptions,
    classifier: Option<InferenceAdapter>,
    tables: Vec<OnceLock<HilbertTable>>,
}

impl Pipeline {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            index: None,
            options,
            classifier: None,
            tables: (0..=MAX_ORDER).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn with_index(mut self, index: IdentifierIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_classifier(mut self, classifier: InferenceAdapter) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn index(&self) -> Option<&IdentifierIndex> {
        self.index.as_ref()
    }

    /// Curve table for an order, built on first use
    pub fn table(&self, order: u32) -> AncientResult<&HilbertTable> {
        let slot = self.tables.get(order as usize).ok_or_else(|| {
            AncientError::InvalidInput(format!(
                "curve order {} exceeds the maximum of {}",
                order, MAX_ORDER
            ))
        })?;
        if let Some(table) = slot.get() {
            return Ok(table);
        }
        let table = HilbertTable::new(order)?;
        Ok(slot.get_or_init(|| table))
    }

    /// Load every sample of one input file
    pub fn load(&self, path: &Path, kind: InputKind) -> AncientResult<(Vec<GenotypeVector>, LoadStats)> {
        match kind {
            InputKind::Matrix => {
                let index = self.index.as_ref().ok_or_else(|| {
                    AncientError::Configuration(
                        "a reference panel is required to read genotype matrices".to_string(),
                    )
                })?;
                let matrix = MatrixLoader::new(index)
                    .with_progress_interval(self.options.progress_interval)
                    .load_path(path)?;
                let stats = matrix.stats().clone();
                Ok((matrix.into_vectors(), stats))
            }
            InputKind::Vector => {
                let (vector, stats) = load_vector(path)?;
                if let Some(index) = &self.index {
                    if vector.len() != index.len() {
                        return Err(AncientError::InvalidInput(format!(
                            "{}: {} calls but the panel has {} variants",
                            path.display(),
                            vector.len(),
                            index.len()
                        )));
                    }
                }
                Ok((vec![vector], stats))
            }
        }
    }

    /// Log warnings for inputs below the configured coverage thresholds
    pub fn check_coverage(&self, source: &str, stats: &LoadStats, vectors: &[GenotypeVector]) {
        tracing::debug!(
            "{}: line coverage {:.3}, panel coverage {:.3}, {} flipped, {} clamped",
            source,
            stats.line_coverage(),
            stats.panel_coverage(),
            stats.flipped_lines,
            stats.clamped_calls
        );

        if let Some(min) = self.options.min_line_coverage {
            if stats.line_coverage() < min {
                tracing::warn!(
                    "{}: only {:.1}% of input lines matched the panel",
                    source,
                    stats.line_coverage() * 100.0
                );
            }
        }
        if let Some(min) = self.options.min_non_reference_fraction {
            for vector in vectors {
                let fraction = vector.non_reference_fraction();
                if fraction < min {
                    tracing::warn!(
                        "{}: sample {} has {:.2}% non-reference calls",
                        source,
                        vector.sample_id,
                        fraction * 100.0
                    );
                }
            }
        }
    }

    /// Lay one sample onto the curve according to the resolution option
    pub fn encode_vector(&self, vector: &GenotypeVector) -> AncientResult<EncodedSample> {
        let (codes, table) = match self.options.resolution {
            Resolution::Auto => (vector.codes.clone(), self.table(order_for_len(vector.len()))?),
            Resolution::Order(order) => (vector.codes.clone(), self.table(order)?),
            Resolution::Width(width) => {
                if width == 0 || width > MAX_WIDTH {
                    return Err(AncientError::InvalidInput(format!(
                        "grid width {} is outside 1..={}",
                        width, MAX_WIDTH
                    )));
                }
                let cells = width as usize * width as usize;
                // Resolve the table before binning allocates `cells` codes
                let table = self.table(order_for_len(cells))?;
                (resample(&vector.codes, cells, self.options.strategy), table)
            }
        };
        let order = table.order();
        let wrapped: Vec<Option<GenotypeCode>> = codes.iter().copied().map(Some).collect();
        let curve = table.construct(&wrapped)?;
        let grid = table.place(&codes)?;

        tracing::debug!(
            "{}: raw genotypes {:?}, curve genotypes {:?}",
            vector.sample_id,
            vector.histogram(),
            histogram(&codes)
        );

        Ok(EncodedSample {
            sample_id: vector.sample_id.clone(),
            order,
            curve,
            grid,
        })
    }

    /// Encode one file: table rows for every sample, a PNG per sample when
    /// images are enabled, and a per-file table unless a shared table is set
    pub fn encode_file(&self, path: &Path, kind: InputKind) -> AncientResult<FileReport> {
        let source = path.display().to_string();
        tracing::info!("Encoding {}", source);

        let (vectors, stats) = self.load(path, kind)?;
        self.check_coverage(&source, &stats, &vectors);
        std::fs::create_dir_all(&self.options.output_dir)?;

        let prefix = file_prefix(path);
        let mut rows = Vec::with_capacity(vectors.len());
        let mut written = Vec::new();
        let mut side = 0;

        for vector in &vectors {
            let encoded = self.encode_vector(vector)?;
            side = encoded.side();
            rows.push(encoded.table_row(self.options.mode)?);

            if self.options.write_image {
                let raster = rasterize(&encoded.grid, side, self.options.mode)?;
                let target = self
                    .options
                    .output_dir
                    .join(raster_file_name(&image_stem(kind, &prefix, &encoded.sample_id), side));
                write_raster(&target, &raster)?;
                written.push(target);
            }
        }

        if self.options.table_name.is_none() && !rows.is_empty() {
            let target = self
                .options
                .output_dir
                .join(table_file_name(&prefix, side));
            write_table(&target, &rows)?;
            written.push(target);
        }

        tracing::info!("Encoded {} samples from {} ({}x{})", rows.len(), source, side, side);
        Ok(FileReport {
            samples: vectors.len(),
            side,
            stats,
            rows,
            written,
        })
    }

    /// Curve-ordered grayscale intensities at the classifier's order
    pub fn model_input(&self, vector: &GenotypeVector, order: u32) -> AncientResult<Vec<f32>> {
        let curve = self.table(order)?.construct(&vector.codes)?;
        intensities(&curve)
    }

    /// Predict every sample in one file
    pub fn predict_file(&self, path: &Path, kind: InputKind) -> AncientResult<Vec<Prediction>> {
        let adapter = self.classifier.as_ref().ok_or_else(|| {
            AncientError::Configuration("no classifier loaded".to_string())
        })?;
        let source = path.display().to_string();
        tracing::info!("Predicting {}", source);

        let (vectors, stats) = self.load(path, kind)?;
        self.check_coverage(&source, &stats, &vectors);

        vectors
            .iter()
            .map(|vector| {
                let values = self.model_input(vector, adapter.order())?;
                adapter.predict(&vector.sample_id, &values)
            })
            .collect()
    }

    /// Run `task` on every input in parallel, keeping each file's result
    pub fn run_batch<T, F>(&self, inputs: &[PathBuf], task: F) -> Vec<FileOutcome<T>>
    where
        T: Send,
        F: Fn(&Path) -> AncientResult<T> + Sync,
    {
        let progress = batch_progress(inputs.len());

        let outcomes = inputs
            .par_iter()
            .map(|path| {
                let result = task(path.as_path());
                if let Err(e) = &result {
                    tracing::warn!("Failed to process {}: {}", path.display(), e);
                }
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                FileOutcome {
                    path: path.clone(),
                    result,
                }
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        outcomes
    }

    /// Encode a batch of files, then write the shared table if one is configured
    pub fn process_batch(&self, inputs: &[PathBuf], kind: InputKind) -> AncientResult<BatchReport> {
        let outcomes = self.run_batch(inputs, |path| self.encode_file(path, kind));

        let table = match &self.options.table_name {
            Some(name) => {
                let rows: Vec<TableRow> = outcomes
                    .iter()
                    .filter_map(|o| o.result.as_ref().ok())
                    .flat_map(|report| report.rows.iter().cloned())
                    .collect();
                let target = self.options.output_dir.join(name);
                std::fs::create_dir_all(&self.options.output_dir)?;
                write_table(&target, &rows)?;
                tracing::info!("Wrote {} rows to {}", rows.len(), target.display());
                Some(target)
            }
            None => None,
        };

        Ok(BatchReport { outcomes, table })
    }

    /// Predict a batch of files
    pub fn predict_batch(
        &self,
        inputs: &[PathBuf],
        kind: InputKind,
    ) -> Vec<FileOutcome<Vec<Prediction>>> {
        self.run_batch(inputs, |path| self.predict_file(path, kind))
    }
}

/// Image name stem for one sample. Matrix samples carry their file prefix so
/// two files sharing a sample id never write the same image.
fn image_stem(kind: InputKind, prefix: &str, sample_id: &str) -> String {
    match kind {
        InputKind::Matrix => format!("{}.{}", prefix, sample_id),
        InputKind::Vector => sample_id.to_string(),
    }
}

fn batch_progress(files: usize) -> Option<ProgressBar> {
    if files < 2 || std::env::var("ANCIENT_SILENT").is_ok() {
        return None;
    }
    let pb = ProgressBar::new(files as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    Some(pb)
}
