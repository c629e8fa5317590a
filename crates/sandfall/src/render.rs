//! CPU-based pixel buffer renderer
//!
//! The buffer is only touched through the world's redraw list, so a frame
//! costs time proportional to what changed since the previous pull.

use std::path::Path;

use anyhow::{Context, Result};
use sandfall_core::world::{RedrawCell, World};
use sandfall_simulation::{MaterialDef, MaterialId, MatterState};

/// CPU-based renderer that outputs to a pixel buffer
pub struct PixelRenderer {
    /// Width of the image in pixels (one pixel per cell)
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGBA pixel buffer (4 bytes per pixel), top row first
    pub buffer: Vec<u8>,
}

impl PixelRenderer {
    /// Create a renderer sized to the world, cleared to opaque black
    pub fn new(width: usize, height: usize) -> Self {
        let mut buffer = vec![0u8; width * height * 4];
        for pixel in buffer.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        Self {
            width,
            height,
            buffer,
        }
    }

    pub fn for_world(world: &World) -> Self {
        Self::new(world.width() as usize, world.height() as usize)
    }

    /// Pull the world's dirty cells and paint them
    pub fn sync(&mut self, world: &mut World) -> usize {
        let redraw = world.take_redraw();
        self.apply_redraw(&redraw);
        redraw.len()
    }

    /// Paint a batch of redraw entries
    pub fn apply_redraw(&mut self, cells: &[RedrawCell]) {
        for cell in cells {
            self.set_pixel(cell.pos.x, cell.pos.y, cell.color);
        }
    }

    /// Set the pixel for grid position (x, y); y is flipped so row 0 lands at the bottom
    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let screen_y = self.height - 1 - y as usize;
        let idx = (screen_y * self.width + x as usize) * 4;
        self.buffer[idx..idx + 4].copy_from_slice(&color);
    }

    /// Color at grid position (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((self.height - 1 - y) * self.width + x) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.buffer[idx..idx + 4]);
        Some(color)
    }

    /// Save the buffer as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        use image::{ImageBuffer, Rgba};

        let path = path.as_ref();
        let img: ImageBuffer<Rgba<u8>, _> =
            ImageBuffer::from_raw(self.width as u32, self.height as u32, self.buffer.clone())
                .ok_or_else(|| anyhow::anyhow!("Failed to create image buffer"))?;

        img.save(path)
            .with_context(|| format!("Failed to write PNG: {}", path.display()))?;
        Ok(())
    }
}

/// Character used for a material in text snapshots
pub fn glyph(def: &MaterialDef) -> char {
    match def.id {
        MaterialId::AIR => ' ',
        MaterialId::WALL => '#',
        MaterialId::SAND => ':',
        MaterialId::WATER => '~',
        MaterialId::STONE => 'X',
        MaterialId::ACID => 'a',
        MaterialId::OIL => 'o',
        MaterialId::SMOKE => '^',
        MaterialId::STEAM => '"',
        MaterialId::GRAVEL => '%',
        MaterialId::WOOD => 'W',
        _ => match def.name.chars().next() {
            // Custom materials: solids upper case, everything else lower case
            Some(c) if def.state == MatterState::Solid => c.to_ascii_uppercase(),
            Some(c) => c.to_ascii_lowercase(),
            None => '?',
        },
    }
}

/// Text snapshot of the grid, top row first, framed by the wall glyph
pub fn ascii_snapshot(world: &World) -> String {
    let width = world.width() as usize;
    let height = world.height() as usize;
    let wall = glyph(world.materials().wall());
    let border: String = std::iter::repeat_n(wall, width + 2).collect();

    let mut out = String::with_capacity((width + 3) * (height + 2));
    out.push_str(&border);
    out.push('\n');
    for y in (0..height).rev() {
        out.push(wall);
        for x in 0..width {
            let id = world.grid().material_id(glam::IVec2::new(x as i32, y as i32));
            out.push(glyph(world.materials().get(id)));
        }
        out.push(wall);
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use glam::IVec2;
    use sandfall_core::world::{NoopStats, SimParams, seeded_rng};
    use sandfall_simulation::Materials;

    use super::*;

    fn world(width: u32, height: u32) -> World {
        World::new(SimParams::with_size(width, height), Materials::new()).unwrap()
    }

    #[test]
    fn test_first_sync_paints_every_cell() {
        let mut world = world(3, 2);
        let mut renderer = PixelRenderer::for_world(&world);

        assert_eq!(renderer.sync(&mut world), 6);
        let air = world.materials().air().color;
        assert_eq!(renderer.pixel(2, 1), Some(air));
        // Nothing changed since
        assert_eq!(renderer.sync(&mut world), 0);
    }

    #[test]
    fn test_rows_are_flipped() {
        let mut world = world(2, 3);
        let mut renderer = PixelRenderer::for_world(&world);
        world.apply_brush(IVec2::new(0, 0), 0, MaterialId::STONE).unwrap();
        renderer.sync(&mut world);

        let stone = world.materials().get(MaterialId::STONE).color;
        // Grid row 0 is the last buffer row
        let last_row = (2 * 2) * 4;
        assert_eq!(&renderer.buffer[last_row..last_row + 4], &stone);
        assert_eq!(renderer.pixel(0, 0), Some(stone));
    }

    #[test]
    fn test_sync_tracks_movement() {
        let mut world = world(1, 4);
        let mut renderer = PixelRenderer::for_world(&world);
        world.apply_brush(IVec2::new(0, 3), 0, MaterialId::SAND).unwrap();
        renderer.sync(&mut world);

        let mut rng = seeded_rng(1);
        for _ in 0..20 {
            world.step(&mut NoopStats, &mut rng).unwrap();
            renderer.sync(&mut world);
        }

        let sand = world.materials().get(MaterialId::SAND).color;
        let air = world.materials().air().color;
        assert_eq!(world.material_at(IVec2::new(0, 0)).id, MaterialId::SAND);
        assert_eq!(renderer.pixel(0, 0), Some(sand));
        assert_eq!(renderer.pixel(0, 3), Some(air));
    }

    #[test]
    fn test_out_of_range_pixels_ignored() {
        let mut renderer = PixelRenderer::new(2, 2);
        let before = renderer.buffer.clone();
        renderer.set_pixel(-1, 0, [1, 2, 3, 4]);
        renderer.set_pixel(0, 2, [1, 2, 3, 4]);
        assert_eq!(renderer.buffer, before);
        assert_eq!(renderer.pixel(2, 0), None);
    }

    #[test]
    fn test_ascii_snapshot_layout() {
        let mut world = world(3, 2);
        world.apply_brush(IVec2::new(0, 0), 0, MaterialId::SAND).unwrap();
        world.apply_brush(IVec2::new(2, 1), 0, MaterialId::WATER).unwrap();

        let text = ascii_snapshot(&world);

        assert_eq!(text, "#####\n#  ~#\n#:  #\n#####\n");
    }

    #[test]
    fn test_custom_material_glyph() {
        let mut def = Materials::new().get(MaterialId::SAND).clone();
        def.id = 42;
        def.name = "salt".to_string();
        assert_eq!(glyph(&def), 'S');
        def.state = MatterState::Liquid;
        assert_eq!(glyph(&def), 's');
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut world = world(4, 4);
        let mut renderer = PixelRenderer::for_world(&world);
        renderer.sync(&mut world);

        renderer.save_png(&path).unwrap();

        assert!(path.exists());
    }
}
