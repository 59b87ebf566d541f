//! Genotype matrix and raw vector loading
//!
//! A genotype matrix is a tab-delimited table with `#` comment lines, a header
//! `ID  sample_1  sample_2 ...` and one line per variant:
//!
//! ```text
//! # comment
//! ID      S1  S2
//! rs1     0   2
//! AX-17   1   0
//! ```
//!
//! Variant ids are resolved through an [`IdentifierIndex`]; lines that do not
//! resolve are dropped. Calls are flipped for probes on the opposite strand and
//! anything outside {0, 1, 2} is clamped to 0. Positions without an input line
//! stay 0.

use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

use ancient_core::error::{AncientError, AncientResult};
use ancient_core::file_prefix;
use ancient_core::types::GenotypeCode;

use super::{next_line, open_input, reader_from_bytes};
use crate::panel::IdentifierIndex;

/// Input lines between progress log messages
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100_000;

/// Fixed-length genotype calls for one sample, aligned to the panel positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeVector {
    pub sample_id: String,
    pub codes: Vec<GenotypeCode>,
}

impl GenotypeVector {
    /// All-reference vector of the given length
    pub fn new(sample_id: impl Into<String>, len: usize) -> Self {
        Self {
            sample_id: sample_id.into(),
            codes: vec![GenotypeCode::HomRef; len],
        }
    }

    pub fn from_codes(sample_id: impl Into<String>, codes: Vec<GenotypeCode>) -> Self {
        Self {
            sample_id: sample_id.into(),
            codes,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Count of each code, indexed by the code value
    pub fn histogram(&self) -> [usize; 3] {
        histogram(&self.codes)
    }

    /// Fraction of calls that are not homozygous reference
    pub fn non_reference_fraction(&self) -> f64 {
        if self.codes.is_empty() {
            return 0.0;
        }
        let non_ref = self.codes.iter().filter(|c| c.is_non_reference()).count();
        non_ref as f64 / self.codes.len() as f64
    }
}

/// Count of each genotype code in a slice
pub fn histogram(codes: &[GenotypeCode]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for code in codes {
        counts[code.as_u8() as usize] += 1;
    }
    counts
}

/// Diagnostics collected while loading one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data lines read (excluding comments and the header)
    pub total_lines: usize,
    /// Data lines whose identifier resolved to a panel position
    pub resolved_lines: usize,
    /// Data lines dropped because the identifier is not in the panel
    pub unresolved_lines: usize,
    /// Resolved lines whose calls were strand-flipped
    pub flipped_lines: usize,
    /// Individual calls clamped to 0 (unparseable or out of range)
    pub clamped_calls: usize,
    /// Distinct panel positions that received at least one line
    pub distinct_positions: usize,
    /// Panel size the input was aligned to
    pub panel_size: usize,
}

impl LoadStats {
    /// Resolved data lines over all data lines
    pub fn line_coverage(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.resolved_lines as f64 / self.total_lines as f64
    }

    /// Distinct resolved positions over the panel size
    pub fn panel_coverage(&self) -> f64 {
        if self.panel_size == 0 {
            return 0.0;
        }
        self.distinct_positions as f64 / self.panel_size as f64
    }
}

/// Per-sample genotype vectors in header order, plus load diagnostics
#[derive(Debug, Clone)]
pub struct GenotypeMatrix {
    samples: IndexMap<String, GenotypeVector>,
    stats: LoadStats,
}

impl GenotypeMatrix {
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn get(&self, sample_id: &str) -> Option<&GenotypeVector> {
        self.samples.get(sample_id)
    }

    pub fn sample_ids(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    pub fn into_vectors(self) -> Vec<GenotypeVector> {
        self.samples.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Loader for genotype matrices against one panel
pub struct MatrixLoader<'a> {
    index: &'a IdentifierIndex,
    progress_interval: usize,
}

impl<'a> MatrixLoader<'a> {
    pub fn new(index: &'a IdentifierIndex) -> Self {
        Self {
            index,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Log progress every `interval` input lines (0 disables)
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> AncientResult<GenotypeMatrix> {
        let path = path.as_ref();
        let mut reader = open_input(path)?;
        self.load_reader(&mut reader, &path.display().to_string())
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> AncientResult<GenotypeMatrix> {
        let mut reader = reader_from_bytes(bytes);
        self.load_reader(&mut reader, "<input>")
    }

    /// Parse a matrix from a line reader. `source` names the input in errors.
    pub fn load_reader<R: BufRead + ?Sized>(
        &self,
        reader: &mut R,
        source: &str,
    ) -> AncientResult<GenotypeMatrix> {
        let panel_size = self.index.len();
        let mut stats = LoadStats {
            panel_size,
            ..Default::default()
        };
        let mut seen = vec![false; panel_size];
        let mut samples: Option<IndexMap<String, GenotypeVector>> = None;

        let mut line = String::new();
        let mut line_no = 0usize;

        tracing::debug!("Reading genotypes from {}", source);
        while next_line(reader, &mut line)? {
            line_no += 1;
            if self.progress_interval > 0 && line_no % self.progress_interval == 0 {
                tracing::info!("  processed {} lines of {}", line_no, source);
            }
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split('\t');
            let variant_id = fields.next().unwrap_or_default().trim();

            if samples.is_none() {
                samples = Some(parse_header(fields, panel_size, source, line_no)?);
                continue;
            }
            let Some(vectors) = samples.as_mut() else {
                continue;
            };

            stats.total_lines += 1;
            let identifier = self.index.resolve(variant_id);
            let Some(position) = identifier.position() else {
                stats.unresolved_lines += 1;
                continue;
            };

            let calls: Vec<&str> = fields.collect();
            if calls.len() != vectors.len() {
                return Err(AncientError::parse_at(
                    source,
                    line_no,
                    format!(
                        "variant '{}' has {} calls but the header names {} samples",
                        variant_id,
                        calls.len(),
                        vectors.len()
                    ),
                ));
            }

            let flip = identifier.needs_flip();
            stats.resolved_lines += 1;
            if flip {
                stats.flipped_lines += 1;
            }
            if !seen[position] {
                seen[position] = true;
                stats.distinct_positions += 1;
            }

            for (vector, call) in vectors.values_mut().zip(calls) {
                let (code, clamped) = GenotypeCode::normalize_call(call, flip);
                if clamped {
                    stats.clamped_calls += 1;
                }
                vector.codes[position] = code;
            }
        }

        let samples = samples.ok_or_else(|| {
            AncientError::parse_at(source, line_no, "no header line before end of input")
        })?;

        tracing::info!(
            "Read {} ({} samples, {} of {} lines resolved)",
            source,
            samples.len(),
            stats.resolved_lines,
            stats.total_lines
        );

        Ok(GenotypeMatrix { samples, stats })
    }
}

fn parse_header<'l>(
    columns: impl Iterator<Item = &'l str>,
    panel_size: usize,
    source: &str,
    line_no: usize,
) -> AncientResult<IndexMap<String, GenotypeVector>> {
    let mut vectors = IndexMap::new();
    for name in columns {
        let name = name.trim();
        if vectors.contains_key(name) {
            return Err(AncientError::parse_at(
                source,
                line_no,
                format!("duplicate sample '{}' in header", name),
            ));
        }
        vectors.insert(name.to_string(), GenotypeVector::new(name, panel_size));
    }
    if vectors.is_empty() {
        return Err(AncientError::parse_at(source, line_no, "header has no sample columns"));
    }
    Ok(vectors)
}

/// Load a genotype matrix file against a panel
pub fn load_matrix<P: AsRef<Path>>(
    path: P,
    index: &IdentifierIndex,
) -> AncientResult<GenotypeMatrix> {
    MatrixLoader::new(index).load_path(path)
}

/// Load a genotype matrix from memory (plain or gzip)
pub fn load_matrix_bytes(bytes: &[u8], index: &IdentifierIndex) -> AncientResult<GenotypeMatrix> {
    MatrixLoader::new(index).load_bytes(bytes)
}

/// Load a single-sample raw vector file: one call per line, optionally gzip.
/// The sample id is the file name up to its first dot.
pub fn load_vector<P: AsRef<Path>>(path: P) -> AncientResult<(GenotypeVector, LoadStats)> {
    let path = path.as_ref();
    let mut reader = open_input(path)?;
    load_vector_reader(&mut reader, &file_prefix(path))
}

/// Load a raw vector from memory under the given sample id
pub fn load_vector_bytes(
    bytes: &[u8],
    sample_id: &str,
) -> AncientResult<(GenotypeVector, LoadStats)> {
    let mut reader = reader_from_bytes(bytes);
    load_vector_reader(&mut reader, sample_id)
}

fn load_vector_reader<R: BufRead + ?Sized>(
    reader: &mut R,
    sample_id: &str,
) -> AncientResult<(GenotypeVector, LoadStats)> {
    let mut codes = Vec::new();
    let mut stats = LoadStats::default();
    let mut line = String::new();

    while next_line(reader, &mut line)? {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let (code, clamped) = GenotypeCode::normalize_call(&line, false);
        if clamped {
            stats.clamped_calls += 1;
        }
        codes.push(code);
    }

    stats.total_lines = codes.len();
    stats.resolved_lines = codes.len();
    stats.distinct_positions = codes.len();
    stats.panel_size = codes.len();

    tracing::info!("Read vector {} ({} calls)", sample_id, codes.len());
    Ok((GenotypeVector::from_codes(sample_id, codes), stats))
}
