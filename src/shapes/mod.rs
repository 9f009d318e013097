//! Precomputed tile-shape masks and rotation permutations.
//!
//! Thirteen canonical 32×32 black/white masks describe how an overlay covers
//! a tile (shape 0 is "no overlay", shape 1 is "fully covered", the rest are
//! corners, diagonals and curves). Each mask is downsampled once to every
//! supported resolution; rotations are index permutations computed
//! analytically for each resolution.

use crate::error::{MapError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Number of canonical tile shapes.
pub const SHAPE_COUNT: usize = 13;

/// Edge length of the source masks.
pub const SOURCE_RESOLUTION: u32 = 32;

/// Supported mask resolutions (pixels per tile edge).
pub const RESOLUTIONS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Resolution used for any scale not in [`RESOLUTIONS`].
pub const FALLBACK_RESOLUTION: u32 = 4;

/// Luma at or above which a source pixel counts as covered.
const LUMA_THRESHOLD: u8 = 128;

/// Masks and rotations for one resolution.
#[derive(Debug, Clone)]
struct ResolutionTable {
    resolution: u32,
    /// `SHAPE_COUNT` masks of `resolution²` entries, each 0 or 1.
    shapes: Vec<Vec<u8>>,
    /// Four permutations mapping output index to source mask index.
    rotations: [Vec<usize>; 4],
}

/// The tile-shape lookup table, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct TileShapes {
    tables: Vec<ResolutionTable>,
}

impl TileShapes {
    /// Load the 13 source masks `00.png` .. `12.png` from a directory.
    ///
    /// Every file must be present; the table cannot be built partially.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut images = Vec::with_capacity(SHAPE_COUNT);
        for shape in 0..SHAPE_COUNT {
            let path = dir.join(format!("{:02}.png", shape));
            if !path.is_file() {
                return Err(MapError::MissingTileShape(path.display().to_string()));
            }
            images.push(image::open(&path)?);
        }
        let shapes = Self::from_images(&images)?;
        log::info!("Loaded {} tile shapes from {}", SHAPE_COUNT, dir.display());
        Ok(shapes)
    }

    /// Build the table from 13 decoded source images.
    pub fn from_images(images: &[DynamicImage]) -> Result<Self> {
        if images.len() != SHAPE_COUNT {
            return Err(MapError::InvalidTileShape(format!(
                "expected {} shapes, got {}",
                SHAPE_COUNT,
                images.len()
            )));
        }
        let sources = images
            .iter()
            .enumerate()
            .map(|(shape, img)| {
                let gray = img.to_luma8();
                if gray.dimensions() != (SOURCE_RESOLUTION, SOURCE_RESOLUTION) {
                    return Err(MapError::InvalidTileShape(format!(
                        "shape {} is {}x{}, expected {}x{}",
                        shape,
                        gray.width(),
                        gray.height(),
                        SOURCE_RESOLUTION,
                        SOURCE_RESOLUTION
                    )));
                }
                Ok(gray)
            })
            .collect::<Result<Vec<_>>>()?;

        let tables = RESOLUTIONS
            .iter()
            .map(|&resolution| ResolutionTable {
                resolution,
                shapes: sources
                    .iter()
                    .map(|src| {
                        if resolution == SOURCE_RESOLUTION {
                            to_mask(src)
                        } else {
                            to_mask(&image::imageops::resize(
                                src,
                                resolution,
                                resolution,
                                FilterType::Nearest,
                            ))
                        }
                    })
                    .collect(),
                rotations: [0, 1, 2, 3].map(|rotation| rotation_permutation(resolution, rotation)),
            })
            .collect();

        Ok(Self { tables })
    }

    /// Build the table from 13 full-resolution boolean masks (row-major, 32×32).
    pub fn from_masks(masks: &[Vec<bool>]) -> Result<Self> {
        let images = masks
            .iter()
            .enumerate()
            .map(|(shape, mask)| {
                let expected = (SOURCE_RESOLUTION * SOURCE_RESOLUTION) as usize;
                if mask.len() != expected {
                    return Err(MapError::InvalidTileShape(format!(
                        "shape {} has {} entries, expected {}",
                        shape,
                        mask.len(),
                        expected
                    )));
                }
                let gray = GrayImage::from_fn(SOURCE_RESOLUTION, SOURCE_RESOLUTION, |x, y| {
                    let covered = mask[(y * SOURCE_RESOLUTION + x) as usize];
                    image::Luma([if covered { 255 } else { 0 }])
                });
                Ok(DynamicImage::ImageLuma8(gray))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_images(&images)
    }

    fn table(&self, resolution: u32) -> &ResolutionTable {
        self.tables
            .iter()
            .find(|t| t.resolution == resolution)
            .or_else(|| self.tables.iter().find(|t| t.resolution == FALLBACK_RESOLUTION))
            .unwrap_or(&self.tables[0])
    }

    /// Whether masks exist at exactly this resolution.
    pub fn supports(resolution: u32) -> bool {
        RESOLUTIONS.contains(&resolution)
    }

    /// Occupancy mask of `resolution²` entries (0 or 1) for a shape.
    ///
    /// Unsupported resolutions return the 4×4 mask.
    pub fn shape(&self, resolution: u32, shape_id: usize) -> &[u8] {
        let table = self.table(resolution);
        &table.shapes[shape_id.min(SHAPE_COUNT - 1)]
    }

    /// Rotation permutation (output index → source index) for a resolution.
    ///
    /// Unsupported resolutions return the 4×4 permutation.
    pub fn rotation(&self, resolution: u32, rotation_id: usize) -> &[usize] {
        &self.table(resolution).rotations[rotation_id & 3]
    }

    /// Whether pixel (px, py) of a `scale`-pixel tile lies on the overlay side
    /// of a rotated shape.
    ///
    /// At unsupported scales the fallback mask is stretched over the cell.
    pub fn covers(&self, scale: u32, shape_id: usize, rotation_id: usize, px: u32, py: u32) -> bool {
        let table = self.table(scale);
        let res = table.resolution;
        let (sx, sy) = if res == scale {
            (px, py)
        } else {
            (px * res / scale.max(1), py * res / scale.max(1))
        };
        let index = (sy * res + sx) as usize;
        let source = table.rotations[rotation_id & 3][index];
        table.shapes[shape_id.min(SHAPE_COUNT - 1)][source] != 0
    }
}

fn to_mask(img: &GrayImage) -> Vec<u8> {
    img.pixels()
        .map(|p| u8::from(p.0[0] >= LUMA_THRESHOLD))
        .collect()
}

/// Permutation for rotating an `n×n` row-major mask by `rotation` quarter turns.
pub fn rotation_permutation(n: u32, rotation: usize) -> Vec<usize> {
    let n = n as usize;
    let len = n * n;
    (0..len)
        .map(|i| {
            let x = i % n;
            let y = i / n;
            match rotation & 3 {
                0 => i,
                1 => (n - 1 - x) * n + y,
                2 => len - 1 - i,
                _ => x * n + (n - 1 - y),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::canonical_masks;

    #[test]
    fn test_rotation_zero_is_identity() {
        let shapes = TileShapes::from_masks(&canonical_masks()).unwrap();
        for &res in &RESOLUTIONS {
            let rot = shapes.rotation(res, 0);
            assert_eq!(rot.len(), (res * res) as usize);
            assert!(rot.iter().enumerate().all(|(i, &v)| i == v));
        }
    }

    #[test]
    fn test_rotations_are_permutations() {
        for &res in &RESOLUTIONS {
            for rotation in 0..4 {
                let mut perm = rotation_permutation(res, rotation);
                perm.sort_unstable();
                assert!(perm.iter().enumerate().all(|(i, &v)| i == v));
            }
        }
    }

    #[test]
    fn test_known_rotation_tables() {
        assert_eq!(rotation_permutation(2, 1), vec![2, 0, 3, 1]);
        assert_eq!(rotation_permutation(2, 2), vec![3, 2, 1, 0]);
        assert_eq!(rotation_permutation(2, 3), vec![1, 3, 0, 2]);
        assert_eq!(
            rotation_permutation(4, 1),
            vec![12, 8, 4, 0, 13, 9, 5, 1, 14, 10, 6, 2, 15, 11, 7, 3]
        );
        assert_eq!(
            rotation_permutation(4, 3),
            vec![3, 7, 11, 15, 2, 6, 10, 14, 1, 5, 9, 13, 0, 4, 8, 12]
        );
    }

    #[test]
    fn test_mask_sizes_and_values() {
        let shapes = TileShapes::from_masks(&canonical_masks()).unwrap();
        for &res in &RESOLUTIONS {
            for shape in 0..SHAPE_COUNT {
                let mask = shapes.shape(res, shape);
                assert_eq!(mask.len(), (res * res) as usize);
                assert!(mask.iter().all(|&v| v == 0 || v == 1));
            }
        }
    }

    #[test]
    fn test_empty_and_full_shapes_at_every_resolution() {
        let shapes = TileShapes::from_masks(&canonical_masks()).unwrap();
        for &res in &RESOLUTIONS {
            assert!(shapes.shape(res, 0).iter().all(|&v| v == 0));
            assert!(shapes.shape(res, 1).iter().all(|&v| v == 1));
        }
    }

    #[test]
    fn test_full_resolution_mask_is_exact() {
        let masks = canonical_masks();
        let shapes = TileShapes::from_masks(&masks).unwrap();
        for (shape, mask) in masks.iter().enumerate() {
            let table = shapes.shape(32, shape);
            assert!(mask.iter().zip(table).all(|(&m, &t)| u8::from(m) == t));
        }
    }

    #[test]
    fn test_unsupported_resolution_falls_back() {
        let shapes = TileShapes::from_masks(&canonical_masks()).unwrap();
        assert_eq!(shapes.shape(3, 2), shapes.shape(4, 2));
        assert_eq!(shapes.rotation(64, 1), shapes.rotation(4, 1));
        assert!(!TileShapes::supports(64));
        // every pixel of a 64px cell is defined through the stretched fallback
        assert!(shapes.covers(64, 1, 0, 63, 63));
        assert!(!shapes.covers(64, 0, 0, 63, 63));
    }

    #[test]
    fn test_covers_follows_rotation() {
        // shape 7 is the left half
        let shapes = TileShapes::from_masks(&canonical_masks()).unwrap();
        assert!(shapes.covers(32, 7, 0, 0, 10));
        assert!(!shapes.covers(32, 7, 0, 31, 10));
        // rotated half a turn the covered half moves to the right
        assert!(!shapes.covers(32, 7, 2, 0, 10));
        assert!(shapes.covers(32, 7, 2, 31, 10));
    }

    #[test]
    fn test_wrong_count_rejected() {
        let mut masks = canonical_masks();
        masks.pop();
        assert!(matches!(
            TileShapes::from_masks(&masks),
            Err(MapError::InvalidTileShape(_))
        ));
    }

    #[test]
    fn test_missing_files_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TileShapes::load_from_dir(dir.path()),
            Err(MapError::MissingTileShape(_))
        ));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        for (shape, mask) in canonical_masks().iter().enumerate() {
            let gray = GrayImage::from_fn(32, 32, |x, y| {
                image::Luma([if mask[(y * 32 + x) as usize] { 255 } else { 0 }])
            });
            gray.save(dir.path().join(format!("{:02}.png", shape))).unwrap();
        }
        let shapes = TileShapes::load_from_dir(dir.path()).unwrap();
        assert!(shapes.shape(32, 1).iter().all(|&v| v == 1));
    }
}
