//! Categorical map loading and distinctiveness map export
//!
//! Loads a pair of PNG images as category grids sharing one
//! deterministic color-to-code mapping, so signatures extracted from
//! either grid align by category index. Fully transparent pixels carry
//! no category and become nodata cells.

use crate::io::configuration::MAX_GRID_DIMENSION;
use crate::io::error::{CompareError, Result, invalid_parameter};
use crate::math::divergence::MAX_DIVERGENCE;
use crate::signature::TileLocation;
use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;

/// Sentinel code for cells without a category (transparent pixels)
pub const NODATA_CODE: u32 = u32::MAX;

/// A pair of category grids with their shared color mapping
#[derive(Debug, Clone)]
pub struct CategoryMaps {
    /// Category grid of the first region
    pub left: Array2<u32>,
    /// Category grid of the second region
    pub right: Array2<u32>,
    /// Category codes present across both grids, in order
    pub categories: Vec<u32>,
    /// RGBA color for each category code (indexed by code)
    pub palette: Vec<[u8; 4]>,
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| CompareError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rgba = img.to_rgba8();

    let limit = MAX_GRID_DIMENSION as u32;
    if rgba.width() > limit || rgba.height() > limit {
        return Err(invalid_parameter(
            "image dimensions",
            &format!("{}x{}", rgba.width(), rgba.height()),
            &format!("each dimension must be at most {MAX_GRID_DIMENSION} cells"),
        ));
    }

    Ok(rgba)
}

fn collect_colors(image: &RgbaImage, seen: &mut std::collections::HashSet<[u8; 4]>) {
    for pixel in image.pixels() {
        let rgba = pixel.0;
        if rgba.get(3).copied().unwrap_or(0) > 0 {
            seen.insert(rgba);
        }
    }
}

fn to_grid(image: &RgbaImage, color_to_code: &HashMap<[u8; 4], u32>) -> Array2<u32> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut grid = Array2::from_elem((height, width), NODATA_CODE);

    for (x, y, pixel) in image.enumerate_pixels() {
        let rgba = pixel.0;
        if rgba.get(3).copied().unwrap_or(0) == 0 {
            continue;
        }
        if let Some(&code) = color_to_code.get(&rgba) {
            if let Some(cell) = grid.get_mut((y as usize, x as usize)) {
                *cell = code;
            }
        }
    }

    grid
}

/// Load two categorical maps with a shared color-to-category mapping
///
/// Every distinct opaque color across both images becomes one category;
/// colors are sorted before codes are assigned, so the mapping is
/// reproducible regardless of pixel order. Fully transparent pixels map
/// to [`NODATA_CODE`].
///
/// # Errors
///
/// Returns an error if:
/// - either file cannot be opened or decoded
/// - either image exceeds the grid dimension safety limit
/// - the two images contain no opaque pixels at all
pub fn load_category_maps(left_path: &Path, right_path: &Path) -> Result<CategoryMaps> {
    let left_image = load_rgba(left_path)?;
    let right_image = load_rgba(right_path)?;

    let mut seen = std::collections::HashSet::new();
    collect_colors(&left_image, &mut seen);
    collect_colors(&right_image, &mut seen);

    // Deterministic color ordering ensures reproducible category codes
    let mut palette: Vec<[u8; 4]> = seen.into_iter().collect();
    palette.sort_unstable();

    if palette.is_empty() {
        return Err(invalid_parameter(
            "images",
            &"(fully transparent)",
            &"the maps contain no opaque pixels to categorize",
        ));
    }

    let mut color_to_code = HashMap::with_capacity(palette.len());
    for (code, &color) in palette.iter().enumerate() {
        color_to_code.insert(color, code as u32);
    }

    let left = to_grid(&left_image, &color_to_code);
    let right = to_grid(&right_image, &color_to_code);
    let categories: Vec<u32> = (0..palette.len() as u32).collect();

    Ok(CategoryMaps {
        left,
        right,
        categories,
        palette,
    })
}

/// Export best-match distances as a grayscale distinctiveness map
///
/// Each compared tile becomes one pixel at its window coordinates,
/// brightness proportional to its best-match distance normalized by the
/// divergence bound. Windows excluded from the comparison stay
/// transparent.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the
/// image cannot be saved.
pub fn export_distinctiveness_map(
    tiles: &[(TileLocation, f64)],
    window_rows: usize,
    window_cols: usize,
    output_path: &Path,
) -> Result<()> {
    let mut img: RgbaImage = ImageBuffer::new(window_cols as u32, window_rows as u32);

    for &(location, distance) in tiles {
        if location.row >= window_rows || location.col >= window_cols {
            continue;
        }
        let normalized = (distance / MAX_DIVERGENCE).clamp(0.0, 1.0);
        let level = (normalized * 255.0).round() as u8;
        img.put_pixel(
            location.col as u32,
            location.row as u32,
            Rgba([level, level, level, 255]),
        );
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| CompareError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    img.save(output_path).map_err(|e| CompareError::ImageExport {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
