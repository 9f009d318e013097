//! Placing many regions on one shared canvas.

use super::canvas::Canvas;
use super::compositor::Renderer;
use super::{layer_scale, RenderConfig, RenderContext};
use crate::error::Result;
use crate::region::{bounds_of, Region};
use crate::types::{RegionCoord, REGION_SIZE};
use std::ops::RangeInclusive;

/// Pixel layout of a set of regions on a shared canvas.
///
/// North is up: the region with the greatest base y maps to row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitchLayout {
    pub min_base_x: i32,
    pub max_base_y: i32,
    pub width: u32,
    pub height: u32,
    pub scale: u32,
}

impl StitchLayout {
    /// Compute the layout of a set of regions. No regions give a 0×0 layout.
    pub fn new(coords: impl IntoIterator<Item = RegionCoord>, scale: u32) -> Self {
        match bounds_of(coords) {
            None => Self {
                min_base_x: 0,
                max_base_y: 0,
                width: 0,
                height: 0,
                scale,
            },
            Some(bounds) => {
                let min_base_x = bounds.min.base_x();
                let max_base_y = bounds.max.base_y();
                Self {
                    min_base_x,
                    max_base_y,
                    width: ((bounds.max.base_x() - min_base_x + REGION_SIZE) as u32).saturating_mul(scale),
                    height: ((max_base_y - bounds.min.base_y() + REGION_SIZE) as u32).saturating_mul(scale),
                    scale,
                }
            }
        }
    }

    /// Top-left pixel of a region on the shared canvas.
    pub fn offset(&self, coord: RegionCoord) -> (i64, i64) {
        let scale = self.scale as i64;
        (
            (coord.base_x() - self.min_base_x) as i64 * scale,
            (self.max_base_y - coord.base_y()) as i64 * scale,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Assembles rendered regions into one canvas.
pub struct WorldStitcher<'r, 'a> {
    renderer: &'r Renderer<'a>,
}

impl<'r, 'a> WorldStitcher<'r, 'a> {
    pub fn new(renderer: &'r Renderer<'a>) -> Self {
        Self { renderer }
    }

    /// Draw the given regions at one plane onto a canvas sized to fit them.
    pub fn stitch<'b>(
        &self,
        regions: impl IntoIterator<Item = &'b Region>,
        plane: usize,
        transparent: bool,
    ) -> Canvas {
        let regions: Vec<&Region> = regions.into_iter().collect();
        let layout = StitchLayout::new(regions.iter().map(|r| r.coord), self.renderer.scale());
        let mut canvas = Canvas::with_background(layout.width, layout.height, transparent);
        if layout.is_empty() {
            log::debug!("Nothing to stitch at plane {}", plane);
            return canvas;
        }

        for region in regions {
            let (x, y) = layout.offset(region.coord);
            self.renderer.draw_region(&mut canvas, region, plane, x, y);
        }
        canvas
    }

    /// Draw every region of the render context.
    pub fn stitch_all(&self, plane: usize, transparent: bool) -> Canvas {
        let regions = self.renderer.context().regions;
        let ordered = regions
            .coords_sorted()
            .into_iter()
            .filter_map(|coord| regions.get(coord));
        self.stitch(ordered, plane, transparent)
    }
}

/// Stitch the same regions once per zoom layer, at `2^layer` pixels per tile.
///
/// Every layer is drawn natively at its own scale rather than resized.
/// Layers above [`MAX_LAYER`](super::MAX_LAYER) are rejected before drawing.
pub fn stitch_layers(
    ctx: RenderContext<'_>,
    config: &RenderConfig,
    regions: &[&Region],
    plane: usize,
    layers: RangeInclusive<u32>,
) -> Result<Vec<(u32, Canvas)>> {
    layer_scale(*layers.end())?;
    layers
        .map(|layer| {
            let renderer = Renderer::new(ctx, config.clone().with_scale(layer_scale(layer)?));
            let canvas = WorldStitcher::new(&renderer).stitch(regions.iter().copied(), plane, false);
            log::info!(
                "Stitched layer {} ({}x{})",
                layer,
                canvas.width(),
                canvas.height()
            );
            Ok((layer, canvas))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MapAssets;
    use crate::region::RegionSet;
    use crate::shapes::TileShapes;
    use crate::test_support::{test_assets, test_shapes, uniform_region};

    fn fixture() -> (MapAssets, RegionSet, TileShapes) {
        let regions = vec![uniform_region(10, 10, 0, 1), uniform_region(11, 10, 0, 4)];
        (test_assets(), regions.into_iter().collect(), test_shapes())
    }

    #[test]
    fn test_layout_of_two_regions() {
        let layout = StitchLayout::new(vec![RegionCoord::new(10, 10), RegionCoord::new(11, 10)], 4);
        assert_eq!((layout.width, layout.height), (512, 256));
        assert_eq!(layout.offset(RegionCoord::new(10, 10)), (0, 0));
        assert_eq!(layout.offset(RegionCoord::new(11, 10)), (256, 0));
    }

    #[test]
    fn test_layout_north_is_up() {
        let layout = StitchLayout::new(vec![RegionCoord::new(3, 7), RegionCoord::new(3, 8)], 1);
        assert_eq!(layout.offset(RegionCoord::new(3, 8)), (0, 0));
        assert_eq!(layout.offset(RegionCoord::new(3, 7)), (0, 64));
    }

    #[test]
    fn test_two_region_world() {
        let (assets, regions, shapes) = fixture();
        let renderer = Renderer::new(
            RenderContext::new(&assets, &regions, &shapes),
            RenderConfig::default().with_scale(4),
        );
        let canvas = WorldStitcher::new(&renderer).stitch_all(0, false);
        assert_eq!((canvas.width(), canvas.height()), (512, 256));

        let east = regions.get(RegionCoord::new(11, 10)).unwrap();
        let alone = renderer.render_region(Some(east), 0, false);
        for y in 0..256 {
            for x in 0..256 {
                assert_eq!(canvas.get(256 + x, y), alone.get(x, y));
            }
        }
        assert_ne!(canvas.get(0, 128), canvas.get(511, 128));
    }

    #[test]
    fn test_empty_stitch() {
        let (assets, regions, shapes) = fixture();
        let renderer = Renderer::new(
            RenderContext::new(&assets, &regions, &shapes),
            RenderConfig::default(),
        );
        let canvas = WorldStitcher::new(&renderer).stitch(Vec::new(), 0, false);
        assert!(canvas.is_empty());
        assert_eq!((canvas.width(), canvas.height()), (0, 0));
    }

    #[test]
    fn test_layers_render_natively() {
        let (assets, regions, shapes) = fixture();
        let ctx = RenderContext::new(&assets, &regions, &shapes);
        let west = regions.get(RegionCoord::new(10, 10)).unwrap();
        let layers = stitch_layers(ctx, &RenderConfig::default(), &[west], 0, 0..=2).unwrap();
        let sizes: Vec<_> = layers.iter().map(|(l, c)| (*l, c.width())).collect();
        assert_eq!(sizes, vec![(0, 64), (1, 128), (2, 256)]);
    }

    #[test]
    fn test_layers_above_maximum_are_rejected() {
        let (assets, regions, shapes) = fixture();
        let ctx = RenderContext::new(&assets, &regions, &shapes);
        let west = regions.get(RegionCoord::new(10, 10)).unwrap();
        let result = stitch_layers(ctx, &RenderConfig::default(), &[west], 0, 0..=32);
        assert!(matches!(result, Err(crate::error::MapError::InvalidConfig(_))));
    }
}
