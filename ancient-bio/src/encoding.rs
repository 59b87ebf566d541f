//! Genotype code to value/pixel encoding
//!
//! Grayscale: reference is white. Codes map to intensities `1.0, 0.5, 0.0` for
//! tables and the classifier and to 8-bit levels `255, 127, 0` for rasters.
//! Categorical: code 0, 1, 2 saturates the red, green, blue channel.
//! Rendered cells are always opaque, including cells with no genotype.

use ancient_core::error::{AncientError, AncientResult};
use ancient_core::types::{ColorMode, GenotypeCode};

pub const OPAQUE: u8 = 255;

/// Encoded form of one genotype
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodedValue {
    Intensity(f32),
    Channels([u8; 3]),
}

fn check_code(code: u8) -> AncientResult<GenotypeCode> {
    GenotypeCode::from_code(i64::from(code)).ok_or_else(|| {
        AncientError::Encoding(format!("genotype code {} is outside {{0, 1, 2}}", code))
    })
}

/// Scalar intensity in [0, 1]
pub fn intensity(code: u8) -> AncientResult<f32> {
    Ok(match check_code(code)? {
        GenotypeCode::HomRef => 1.0,
        GenotypeCode::Het => 0.5,
        GenotypeCode::HomAlt => 0.0,
    })
}

/// 8-bit gray level for rasters
pub fn gray_level(code: u8) -> AncientResult<u8> {
    Ok(match check_code(code)? {
        GenotypeCode::HomRef => 255,
        GenotypeCode::Het => 127,
        GenotypeCode::HomAlt => 0,
    })
}

/// RGB triple with the code's channel saturated
pub fn channels(code: u8) -> AncientResult<[u8; 3]> {
    let mut rgb = [0u8; 3];
    rgb[check_code(code)?.as_u8() as usize] = 255;
    Ok(rgb)
}

/// Encode one code in the given mode
pub fn encode(code: u8, mode: ColorMode) -> AncientResult<EncodedValue> {
    match mode {
        ColorMode::Grayscale => intensity(code).map(EncodedValue::Intensity),
        ColorMode::Categorical => channels(code).map(EncodedValue::Channels),
    }
}

/// Grayscale intensities for a curve-ordered sequence, as fed to the classifier
pub fn intensities(codes: &[GenotypeCode]) -> AncientResult<Vec<f32>> {
    codes.iter().map(|c| intensity(c.as_u8())).collect()
}

/// Text form of one table cell. Empty cells read as reference in grayscale
/// and as a black `0,0,0` in categorical mode.
pub fn table_cell(code: Option<GenotypeCode>, mode: ColorMode) -> AncientResult<String> {
    match (code, mode) {
        (None, ColorMode::Grayscale) => Ok("1".to_string()),
        (None, ColorMode::Categorical) => Ok("0,0,0".to_string()),
        (Some(code), mode) => Ok(match encode(code.as_u8(), mode)? {
            EncodedValue::Intensity(v) => v.to_string(),
            EncodedValue::Channels([r, g, b]) => format!("{},{},{}", r, g, b),
        }),
    }
}

/// Square pixel buffer ready to be written as an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub side: u32,
    pub mode: ColorMode,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Channels per pixel: luma + alpha, or RGBA
    pub fn channels(&self) -> usize {
        channels_for(self.mode)
    }

    /// Pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels();
        let offset = (y as usize * self.side as usize + x as usize) * c;
        &self.pixels[offset..offset + c]
    }
}

pub fn channels_for(mode: ColorMode) -> usize {
    match mode {
        ColorMode::Grayscale => 2,
        ColorMode::Categorical => 4,
    }
}

/// Render a row-major grid of optional codes. Grayscale empty cells are white,
/// categorical empty cells are black; alpha is always opaque.
pub fn rasterize(grid: &[Option<GenotypeCode>], side: u32, mode: ColorMode) -> AncientResult<Raster> {
    let cells = side as usize * side as usize;
    if grid.len() != cells {
        return Err(AncientError::InvalidInput(format!(
            "grid of {} cells does not match a {}x{} raster",
            grid.len(),
            side,
            side
        )));
    }

    let mut pixels = Vec::with_capacity(cells * channels_for(mode));
    for cell in grid {
        match mode {
            ColorMode::Grayscale => {
                let level = match cell {
                    Some(code) => gray_level(code.as_u8())?,
                    None => 255,
                };
                pixels.extend_from_slice(&[level, OPAQUE]);
            }
            ColorMode::Categorical => {
                let [r, g, b] = match cell {
                    Some(code) => channels(code.as_u8())?,
                    None => [0, 0, 0],
                };
                pixels.extend_from_slice(&[r, g, b, OPAQUE]);
            }
        }
    }

    Ok(Raster { side, mode, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ancient_test::assertions::assert_intensities_eq;
    use GenotypeCode::*;

    #[test]
    fn test_grayscale_intensities() {
        let values = intensities(&[HomRef, Het, HomAlt, Het]).unwrap();
        assert_intensities_eq(&values, &[1.0, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_categorical_channels() {
        assert_eq!(channels(0).unwrap(), [255, 0, 0]);
        assert_eq!(channels(1).unwrap(), [0, 255, 0]);
        assert_eq!(channels(2).unwrap(), [0, 0, 255]);
    }

    #[test]
    fn test_out_of_domain_code_is_rejected() {
        for mode in [ColorMode::Grayscale, ColorMode::Categorical] {
            assert!(matches!(encode(3, mode), Err(AncientError::Encoding(_))));
        }
        assert!(gray_level(9).is_err());
    }

    #[test]
    fn test_table_cells() {
        assert_eq!(table_cell(Some(HomRef), ColorMode::Grayscale).unwrap(), "1");
        assert_eq!(table_cell(Some(Het), ColorMode::Grayscale).unwrap(), "0.5");
        assert_eq!(table_cell(Some(HomAlt), ColorMode::Grayscale).unwrap(), "0");
        assert_eq!(table_cell(None, ColorMode::Grayscale).unwrap(), "1");
        assert_eq!(table_cell(Some(Het), ColorMode::Categorical).unwrap(), "0,255,0");
        assert_eq!(table_cell(None, ColorMode::Categorical).unwrap(), "0,0,0");
    }

    #[test]
    fn test_rasterize_is_opaque() {
        let grid = [Some(HomRef), None, Some(Het), Some(HomAlt)];

        let gray = rasterize(&grid, 2, ColorMode::Grayscale).unwrap();
        assert_eq!(gray.pixels, vec![255, 255, 255, 255, 127, 255, 0, 255]);

        let rgba = rasterize(&grid, 2, ColorMode::Categorical).unwrap();
        assert_eq!(rgba.pixel(1, 0), &[0, 0, 0, 255]);
        assert_eq!(rgba.pixel(0, 1), &[0, 255, 0, 255]);
        assert!(rgba.pixels.chunks(4).all(|p| p[3] == OPAQUE));
    }

    #[test]
    fn test_rasterize_size_mismatch() {
        assert!(rasterize(&[None; 3], 2, ColorMode::Grayscale).is_err());
    }
}
