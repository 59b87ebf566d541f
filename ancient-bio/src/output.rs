//! Table and raster writers

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ancient_core::error::{AncientError, AncientResult};
use ancient_core::types::ColorMode;

use crate::encoding::Raster;

/// One table row: identifier followed by one value per cell in curve order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
}

/// `{prefix}.{side}x{side}.tsv`
pub fn table_file_name(prefix: &str, side: u32) -> String {
    format!("{}.{}x{}.tsv", prefix, side, side)
}

/// `{prefix}.{side}x{side}.png`
pub fn raster_file_name(prefix: &str, side: u32) -> String {
    format!("{}.{}x{}.png", prefix, side, side)
}

/// Write rows to a tab-delimited table (gzip when the path ends in `.gz`)
pub fn write_table<P: AsRef<Path>>(path: P, rows: &[TableRow]) -> AncientResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_rows(&mut writer, rows)?;
        writer
            .into_inner()
            .map_err(|e| AncientError::Io(e.into_error()))?
            .finish()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_rows(&mut writer, rows)?;
        writer.flush()?;
    }

    tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn write_rows<W: Write>(writer: &mut W, rows: &[TableRow]) -> AncientResult<()> {
    for row in rows {
        writer.write_all(row.id.as_bytes())?;
        for cell in &row.cells {
            writer.write_all(b"\t")?;
            writer.write_all(cell.as_bytes())?;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Write a raster as a PNG
pub fn write_raster<P: AsRef<Path>>(path: P, raster: &Raster) -> AncientResult<()> {
    let path = path.as_ref();
    let side = raster.side;
    let pixels = raster.pixels.clone();

    let result = match raster.mode {
        ColorMode::Grayscale => image::GrayAlphaImage::from_raw(side, side, pixels)
            .map(|img| img.save(path)),
        ColorMode::Categorical => {
            image::RgbaImage::from_raw(side, side, pixels).map(|img| img.save(path))
        }
    };

    match result {
        Some(Ok(())) => {
            tracing::debug!("Wrote {}x{} raster to {}", side, side, path.display());
            Ok(())
        }
        Some(Err(e)) => Err(AncientError::Image(format!("{}: {}", path.display(), e))),
        None => Err(AncientError::Image(format!(
            "pixel buffer of {} bytes does not fit a {}x{} image",
            raster.pixels.len(),
            side,
            side
        ))),
    }
}
