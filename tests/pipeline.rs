//! Exercises the full pipeline from PNG categorical maps through
//! extraction, collection, matrix, and extremal selection

use image::{Rgba, RgbaImage};
use std::f64::consts::LN_2;
use std::path::Path;
use tilesig::analysis::extremal::{ReducedDistances, most_distinct};
use tilesig::analysis::matrix::DivergenceMatrix;
use tilesig::io::image::{NODATA_CODE, export_distinctiveness_map, load_category_maps};
use tilesig::signature::extract::{category_set, category_union, extract_signatures};
use tilesig::signature::{MissingPolicy, SignatureCollection, TileLocation};

const TOLERANCE: f64 = 1e-12;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn write_png(path: &Path, width: u32, height: u32, paint: impl Fn(u32, u32) -> Rgba<u8>) {
    let mut img = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x, y, paint(x, y));
        }
    }
    if let Err(e) = img.save(path) {
        unreachable!("failed to write test fixture: {e}");
    }
}

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => unreachable!("failed to create temp dir: {e}"),
    }
}

#[test]
fn test_distinct_region_is_found_through_the_full_pipeline() {
    let dir = temp_dir();
    let left_path = dir.path().join("left.png");
    let right_path = dir.path().join("right.png");

    // Left: top half red, bottom half blue. Right: all red.
    write_png(&left_path, 8, 8, |_x, y| if y < 4 { RED } else { BLUE });
    write_png(&right_path, 8, 8, |_x, _y| RED);

    let maps = match load_category_maps(&left_path, &right_path) {
        Ok(maps) => maps,
        Err(e) => unreachable!("map loading failed: {e}"),
    };
    assert_eq!(maps.categories.len(), 2);
    assert_eq!(maps.palette.len(), 2);

    let extraction = extract_signatures(&maps.left, &maps.categories, 4, Some(NODATA_CODE));
    let (left_vectors, left_locations) = match extraction {
        Ok(parts) => parts,
        Err(e) => unreachable!("extraction failed: {e}"),
    };
    assert_eq!(left_vectors.len(), 4);
    assert_eq!(
        left_locations,
        vec![
            TileLocation { row: 0, col: 0 },
            TileLocation { row: 0, col: 1 },
            TileLocation { row: 1, col: 0 },
            TileLocation { row: 1, col: 1 },
        ]
    );

    let (right_vectors, _) =
        match extract_signatures(&maps.right, &maps.categories, 4, Some(NODATA_CODE)) {
            Ok(parts) => parts,
            Err(e) => unreachable!("extraction failed: {e}"),
        };

    let left = match SignatureCollection::from_vectors(left_vectors, MissingPolicy::ExcludeTile) {
        Ok(built) => built,
        Err(e) => unreachable!("collection construction failed: {e}"),
    };
    let right = match SignatureCollection::from_vectors(right_vectors, MissingPolicy::ExcludeTile) {
        Ok(built) => built,
        Err(e) => unreachable!("collection construction failed: {e}"),
    };

    let matrix = match DivergenceMatrix::compute(&left, &right) {
        Ok(matrix) => matrix,
        Err(e) => unreachable!("matrix computation failed: {e}"),
    };
    let reduced = ReducedDistances::from_matrix(&matrix);

    // Red windows match the all-red map exactly; blue windows are
    // maximally divergent from everything in it
    let row_min = reduced.row_min();
    assert!(row_min.first().copied().unwrap_or(f64::NAN) < TOLERANCE);
    assert!((row_min.last().copied().unwrap_or(f64::NAN) - LN_2).abs() < TOLERANCE);

    let extremal = most_distinct(row_min);
    let Some(tile) = extremal else {
        unreachable!("extremal selection returned no tile");
    };
    // First blue window, in reading order
    assert_eq!(tile.index, 2);
    let location = left.source_index(tile.index).and_then(|s| left_locations.get(s));
    assert_eq!(location, Some(&TileLocation { row: 1, col: 0 }));

    // Every right tile has a perfect counterpart
    assert!(reduced.col_min().iter().all(|&d| d < TOLERANCE));
}

#[test]
fn test_transparent_windows_become_undefined_and_are_excluded() {
    let dir = temp_dir();
    let left_path = dir.path().join("bordered.png");
    let right_path = dir.path().join("solid.png");

    // Right half of the left map is outside the region (transparent)
    write_png(&left_path, 8, 8, |x, _y| if x < 4 { RED } else { CLEAR });
    write_png(&right_path, 8, 8, |_x, _y| RED);

    let maps = match load_category_maps(&left_path, &right_path) {
        Ok(maps) => maps,
        Err(e) => unreachable!("map loading failed: {e}"),
    };
    // Transparent pixels contribute no category
    assert_eq!(maps.categories.len(), 1);

    let (left_vectors, _) =
        match extract_signatures(&maps.left, &maps.categories, 4, Some(NODATA_CODE)) {
            Ok(parts) => parts,
            Err(e) => unreachable!("extraction failed: {e}"),
        };
    assert_eq!(left_vectors.len(), 4);

    let left = match SignatureCollection::from_vectors(left_vectors, MissingPolicy::ExcludeTile) {
        Ok(built) => built,
        Err(e) => unreachable!("collection construction failed: {e}"),
    };
    assert_eq!(left.len(), 2);
    assert_eq!(left.excluded_undefined(), 2);
    assert_eq!(left.source_index(0), Some(0));
    assert_eq!(left.source_index(1), Some(2));
}

#[test]
fn test_category_sets_merge_deterministically() {
    let left_grid = ndarray::arr2(&[[3u32, 1], [1, 3]]);
    let right_grid = ndarray::arr2(&[[2u32, 2], [5, 5]]);

    let left_set = category_set(&left_grid, None);
    let right_set = category_set(&right_grid, None);
    assert_eq!(left_set, vec![1, 3]);
    assert_eq!(right_set, vec![2, 5]);

    let union = category_union(&left_set, &right_set);
    assert_eq!(union, vec![1, 2, 3, 5]);
}

#[test]
fn test_extraction_ignores_unlisted_codes() {
    // Code 9 is absent from the category set and counts as nodata
    let grid = ndarray::arr2(&[[1u32, 9], [1, 2]]);
    let (vectors, _) = match extract_signatures(&grid, &[1u32, 2], 2, None) {
        Ok(parts) => parts,
        Err(e) => unreachable!("extraction failed: {e}"),
    };

    assert_eq!(vectors.len(), 1);
    let Some(signature) = vectors.first() else {
        unreachable!("extraction emitted no signature");
    };
    assert_eq!(signature.len(), 2);
    assert!((signature.first().copied().unwrap_or(f64::NAN) - 2.0 / 3.0).abs() < TOLERANCE);
    assert!((signature.last().copied().unwrap_or(f64::NAN) - 1.0 / 3.0).abs() < TOLERANCE);
}

#[test]
fn test_window_zero_is_rejected() {
    let grid = ndarray::arr2(&[[1u32, 2], [2, 1]]);
    let result = extract_signatures(&grid, &[1u32, 2], 0, None);
    assert!(result.is_err());
}

#[test]
fn test_distinctiveness_map_export() {
    let dir = temp_dir();
    let output = dir.path().join("maps").join("left_distinct.png");

    let tiles = [
        (TileLocation { row: 0, col: 0 }, 0.0),
        (TileLocation { row: 1, col: 0 }, LN_2),
    ];
    if let Err(e) = export_distinctiveness_map(&tiles, 2, 2, &output) {
        unreachable!("map export failed: {e}");
    }

    let exported = match image::open(&output) {
        Ok(img) => img.to_rgba8(),
        Err(e) => unreachable!("exported map could not be read back: {e}"),
    };
    assert_eq!(exported.width(), 2);
    assert_eq!(exported.height(), 2);

    // Zero distance renders black, the bound renders white, windows
    // without a compared tile stay transparent
    assert_eq!(exported.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(exported.get_pixel(0, 1).0, [255, 255, 255, 255]);
    assert_eq!(exported.get_pixel(1, 0).0.last().copied(), Some(0));
}
