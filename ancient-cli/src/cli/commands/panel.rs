use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use std::path::PathBuf;

use ancient_bio::formats::MatrixLoader;
use ancient_bio::IdentifierIndex;

use crate::cli::output::*;
use crate::cli::require_inputs;

#[derive(Args)]
pub struct PanelArgs {
    /// Reference panel (plain or gzip)
    #[arg(value_name = "PANEL")]
    pub panel: PathBuf,

    /// Genotype matrix to check against the panel
    #[arg(long, value_name = "FILE")]
    pub check: Option<PathBuf>,
}

pub fn run(args: PanelArgs) -> Result<()> {
    let mut inputs = vec![args.panel.clone()];
    inputs.extend(args.check.iter().cloned());
    require_inputs(&inputs)?;

    let index = IdentifierIndex::from_path(&args.panel)?;

    section_header(&format!("Panel {}", args.panel.display()));
    let mut table = create_standard_table();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    table.add_row(vec![Cell::new("Variants"), Cell::new(format_number(index.len()))]);
    table.add_row(vec![
        Cell::new("Probe aliases"),
        Cell::new(format_number(index.probe_count())),
    ]);
    table.add_row(vec![
        Cell::new("AlleleB probes"),
        Cell::new(format_number(index.flipped_probe_count())),
    ]);
    println!("{table}");

    let Some(check) = &args.check else {
        return Ok(());
    };

    let matrix = MatrixLoader::new(&index).load_path(check)?;
    let stats = matrix.stats();

    section_header(&format!("Coverage of {}", check.display()));
    let mut table = create_standard_table();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    let rows = [
        ("Samples", format_number(matrix.len())),
        ("Data lines", format_number(stats.total_lines)),
        ("Resolved lines", format_number(stats.resolved_lines)),
        ("Unresolved lines", format_number(stats.unresolved_lines)),
        ("Flipped lines", format_number(stats.flipped_lines)),
        ("Clamped calls", format_number(stats.clamped_calls)),
        ("Line coverage", format_percent(stats.line_coverage())),
        ("Panel coverage", format_percent(stats.panel_coverage())),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");

    if stats.resolved_lines == 0 {
        warning("No input line matched the panel");
    }
    Ok(())
}
