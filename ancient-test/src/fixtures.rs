//! Test fixtures and data generators
//!
//! Reference panels, genotype matrices and raw vector files in the on-disk text
//! formats the loaders read.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One reference panel line
#[derive(Debug, Clone)]
pub struct PanelVariant {
    pub canonical_id: String,
    pub probe_id: String,
    pub allele: String,
}

impl PanelVariant {
    pub fn new(
        canonical_id: impl Into<String>,
        probe_id: impl Into<String>,
        allele: impl Into<String>,
    ) -> Self {
        Self {
            canonical_id: canonical_id.into(),
            probe_id: probe_id.into(),
            allele: allele.into(),
        }
    }

    /// Panel line with the two leading columns the index ignores
    pub fn to_line(&self, ordinal: usize) -> String {
        format!(
            "1\t{}\t{}\t{}\t{}",
            10_000 + ordinal * 100,
            self.canonical_id,
            self.probe_id,
            self.allele
        )
    }
}

/// Panel of `n` variants named `rs1..rsN` with probes `AX-1..AX-N`.
/// Every third probe is reported on the B allele.
pub fn generate_panel(n: usize) -> Vec<PanelVariant> {
    (0..n)
        .map(|i| {
            let allele = if i % 3 == 2 { "AlleleB" } else { "AlleleA" };
            PanelVariant::new(format!("rs{}", i + 1), format!("AX-{}", i + 1), allele)
        })
        .collect()
}

/// Render a panel as the tab-delimited reference listing
pub fn panel_tsv(variants: &[PanelVariant]) -> String {
    variants
        .iter()
        .enumerate()
        .map(|(i, v)| v.to_line(i) + "\n")
        .collect()
}

/// Genotype matrix builder: header plus one line per variant
#[derive(Debug, Clone, Default)]
pub struct MatrixFixture {
    pub comments: Vec<String>,
    pub samples: Vec<String>,
    pub rows: Vec<(String, Vec<String>)>,
}

impl MatrixFixture {
    pub fn new<S: Into<String>>(samples: impl IntoIterator<Item = S>) -> Self {
        Self {
            comments: vec!["# generated by ancient-test".to_string()],
            samples: samples.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(format!("# {}", comment.into()));
        self
    }

    /// Add a variant line with one call per sample
    pub fn row<S: ToString>(mut self, variant_id: impl Into<String>, calls: &[S]) -> Self {
        self.rows.push((
            variant_id.into(),
            calls.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for comment in &self.comments {
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str("ID");
        for sample in &self.samples {
            out.push('\t');
            out.push_str(sample);
        }
        out.push('\n');
        for (id, calls) in &self.rows {
            out.push_str(id);
            for call in calls {
                out.push('\t');
                out.push_str(call);
            }
            out.push('\n');
        }
        out
    }
}

/// Random matrix over a panel with deterministic calls in {0, 1, 2}
pub fn random_matrix(panel: &[PanelVariant], samples: usize, seed: u64) -> MatrixFixture {
    let mut rng = StdRng::seed_from_u64(seed);
    let names: Vec<String> = (0..samples).map(|i| format!("S{}", i + 1)).collect();
    let mut fixture = MatrixFixture::new(names);
    for variant in panel {
        let calls: Vec<u8> = (0..samples).map(|_| rng.gen_range(0..3)).collect();
        fixture = fixture.row(variant.canonical_id.clone(), &calls);
    }
    fixture
}

/// Single-sample raw vector file: one call per line
pub fn vector_file<S: ToString>(calls: &[S]) -> String {
    calls.iter().map(|c| c.to_string() + "\n").collect()
}
