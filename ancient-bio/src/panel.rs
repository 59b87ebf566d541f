//! Reference panel index
//!
//! Maps external variant identifiers onto the canonical array positions a panel
//! defines. A panel line is tab-delimited:
//!
//! ```text
//! chrom  pos  canonical_id  probe_id  probe_allele
//! ```
//!
//! The first two columns are ignored. Each variant line takes the next position
//! `0..N-1`; blank lines and `#` comments do not consume a position.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use ancient_core::error::{AncientError, AncientResult};

use crate::formats::{next_line, open_input, reader_from_bytes};

/// Allele label marking a probe reported on the opposite strand
pub const FLIPPED_ALLELE: &str = "AlleleB";

/// Probe identifiers that stand for "no probe on this platform"
const EMPTY_PROBE_IDS: [&str; 3] = ["", ".", "---"];

/// Result of looking up a raw identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier {
    /// Identifier is a canonical variant id
    Canonical(usize),
    /// Identifier is a platform probe id; calls need flipping when `flip` is set
    Probe { position: usize, flip: bool },
    /// Identifier is not part of the panel
    Unresolved,
}

impl Identifier {
    pub fn position(&self) -> Option<usize> {
        match self {
            Identifier::Canonical(position) | Identifier::Probe { position, .. } => {
                Some(*position)
            }
            Identifier::Unresolved => None,
        }
    }

    pub fn needs_flip(&self) -> bool {
        matches!(self, Identifier::Probe { flip: true, .. })
    }
}

/// Probe alias registered by a panel line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAlias {
    pub canonical_id: String,
    pub allele: String,
}

impl ProbeAlias {
    pub fn is_flipped(&self) -> bool {
        self.allele == FLIPPED_ALLELE
    }
}

/// Immutable identifier index built once from a reference panel
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    by_canonical: IndexMap<String, usize>,
    by_probe: HashMap<String, ProbeAlias>,
}

impl IdentifierIndex {
    /// Build the index from a panel file (plain or gzip)
    pub fn from_path<P: AsRef<Path>>(path: P) -> AncientResult<Self> {
        let path = path.as_ref();
        let mut reader = open_input(path)?;
        let index = Self::from_reader(&mut reader, &path.display().to_string())?;
        tracing::info!(
            "Loaded panel {} ({} variants, {} probe aliases)",
            path.display(),
            index.len(),
            index.probe_count()
        );
        Ok(index)
    }

    /// Build the index from an in-memory panel (plain or gzip)
    pub fn from_bytes(bytes: &[u8]) -> AncientResult<Self> {
        let mut reader = reader_from_bytes(bytes);
        Self::from_reader(&mut reader, "<panel>")
    }

    /// Build the index from a line reader. `source` names the input in errors.
    pub fn from_reader<R: BufRead + ?Sized>(reader: &mut R, source: &str) -> AncientResult<Self> {
        let mut index = Self::default();
        let mut line = String::new();
        let mut line_no = 0usize;

        while next_line(reader, &mut line)? {
            line_no += 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                return Err(AncientError::parse_at(
                    source,
                    line_no,
                    format!("expected 5 tab-delimited fields, found {}", fields.len()),
                ));
            }

            let canonical_id = fields[2].trim();
            let probe_id = fields[3].trim();
            let allele = fields[4].trim();

            if canonical_id.is_empty() {
                return Err(AncientError::parse_at(source, line_no, "empty variant id"));
            }

            let position = index.by_canonical.len();
            if index
                .by_canonical
                .insert(canonical_id.to_string(), position)
                .is_some()
            {
                return Err(AncientError::parse_at(
                    source,
                    line_no,
                    format!("duplicate variant id '{}'", canonical_id),
                ));
            }

            if EMPTY_PROBE_IDS.contains(&probe_id) {
                continue;
            }
            if index.by_probe.contains_key(probe_id) {
                tracing::warn!(
                    "{}:{}: probe '{}' already mapped, keeping the first alias",
                    source,
                    line_no,
                    probe_id
                );
                continue;
            }
            index.by_probe.insert(
                probe_id.to_string(),
                ProbeAlias {
                    canonical_id: canonical_id.to_string(),
                    allele: allele.to_string(),
                },
            );
        }

        Ok(index)
    }

    /// Resolve a raw identifier from a genotype file
    pub fn resolve(&self, raw_id: &str) -> Identifier {
        if let Some(&position) = self.by_canonical.get(raw_id) {
            return Identifier::Canonical(position);
        }
        match self.by_probe.get(raw_id) {
            Some(alias) => match self.by_canonical.get(&alias.canonical_id) {
                Some(&position) => Identifier::Probe {
                    position,
                    flip: alias.is_flipped(),
                },
                None => Identifier::Unresolved,
            },
            None => Identifier::Unresolved,
        }
    }

    /// Position of a canonical variant id
    pub fn position(&self, canonical_id: &str) -> Option<usize> {
        self.by_canonical.get(canonical_id).copied()
    }

    pub fn probe(&self, probe_id: &str) -> Option<&ProbeAlias> {
        self.by_probe.get(probe_id)
    }

    /// Canonical ids in position order
    pub fn canonical_ids(&self) -> impl Iterator<Item = &str> {
        self.by_canonical.keys().map(String::as_str)
    }

    /// Number of canonical variants (the genotype vector length)
    pub fn len(&self) -> usize {
        self.by_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_canonical.is_empty()
    }

    pub fn probe_count(&self) -> usize {
        self.by_probe.len()
    }

    /// Number of probe aliases reported on the flipped strand
    pub fn flipped_probe_count(&self) -> usize {
        self.by_probe.values().filter(|a| a.is_flipped()).count()
    }
}
