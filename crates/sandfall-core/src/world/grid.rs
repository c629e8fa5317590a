//! Grid - fixed-size arena of cells
//!
//! Cells live in one flat row-major vector (index = y * width + x, y = 0 is
//! the bottom row). Moving a material is a value swap between two slots, so
//! the tick loop never allocates.

use glam::IVec2;

use super::neighbor_queries::{Dir, NeighborQueries};
use crate::SimError;
use crate::simulation::{Cell, CellFlags, Materials};

/// A cell that the renderer should repaint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedrawCell {
    pub pos: IVec2,
    pub material_id: u16,
    pub color: [u8; 4],
}

/// Fixed-size 2D grid of cells
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell holding `fill`
    pub fn new(width: u32, height: u32, fill: u16) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            cells: vec![Cell::new(fill); width as usize * height as usize],
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Flat index of an in-bounds position
    ///
    /// Panics when `pos` is outside the grid: callers on the tick path only
    /// pass positions they already resolved, so this is a logic defect.
    #[inline]
    pub fn index(&self, pos: IVec2) -> usize {
        assert!(
            self.in_bounds(pos),
            "grid position {pos} outside {}x{} grid",
            self.width,
            self.height
        );
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Position of a flat index
    #[inline]
    pub fn position_of(&self, index: usize) -> IVec2 {
        let width = self.width as usize;
        IVec2::new((index % width) as i32, (index / width) as i32)
    }

    pub fn get(&self, pos: IVec2) -> Option<&Cell> {
        if self.in_bounds(pos) {
            Some(&self.cells[self.index(pos)])
        } else {
            None
        }
    }

    #[inline]
    pub fn cell(&self, pos: IVec2) -> &Cell {
        &self.cells[self.index(pos)]
    }

    #[inline]
    pub fn cell_mut(&mut self, pos: IVec2) -> &mut Cell {
        let idx = self.index(pos);
        &mut self.cells[idx]
    }

    #[inline]
    pub fn material_id(&self, pos: IVec2) -> u16 {
        self.cell(pos).material_id
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Exchange the full state of two cells
    ///
    /// Both end up flagged as simulated so neither is processed again this tick.
    #[inline]
    pub fn swap(&mut self, a: IVec2, b: IVec2) {
        let ia = self.index(a);
        let ib = self.index(b);
        self.cells.swap(ia, ib);
        self.cells[ia].mark_simulated();
        self.cells[ib].mark_simulated();
    }

    /// Replace the occupant at `pos`, clearing its motion state
    #[inline]
    pub fn set_material(&mut self, pos: IVec2, material_id: u16) {
        self.cell_mut(pos).set_material(material_id);
    }

    /// Expel: swap `pos` with `pos + dir`, then push what was left behind sideways
    ///
    /// The material that ends up at `pos` moves right (or else left) when it is
    /// strictly denser than a same-state neighbor on that side.
    pub fn displace(&mut self, materials: &Materials, pos: IVec2, dir: IVec2) {
        self.swap(pos, pos + dir);

        let left_behind = materials.get(self.material_id(pos));
        for side in [Dir::RIGHT, Dir::LEFT] {
            let target = pos + side;
            if self.in_bounds(target)
                && NeighborQueries::is_lower_density_same_state(self, materials, pos, side, left_behind)
            {
                self.swap(pos, target);
                return;
            }
        }
    }

    /// Reset every cell to `material_id`
    pub fn fill(&mut self, material_id: u16) {
        for cell in &mut self.cells {
            *cell = Cell::new(material_id);
        }
    }

    /// Count cells holding `material_id`
    pub fn count_material(&self, material_id: u16) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.material_id == material_id)
            .count()
    }

    /// Start-of-tick bookkeeping: clear SIMULATED, keeping the cell marked for redraw
    pub fn begin_tick(&mut self) {
        for cell in &mut self.cells {
            if cell.has_simulated() {
                cell.flags.remove(CellFlags::SIMULATED);
                cell.flags.insert(CellFlags::NEEDS_REDRAW);
            }
        }
    }

    /// Collect every dirty cell and clear its flags
    pub fn take_redraw(&mut self, materials: &Materials) -> Vec<RedrawCell> {
        self.collect_dirty(materials, CellFlags::all())
    }

    /// Collect every dirty cell but only clear `NEEDS_REDRAW`
    ///
    /// For pulls between the yields of an interruptible pass: `SIMULATED`
    /// must survive until the next tick starts, so those cells are reported
    /// again by the next pull.
    pub fn take_redraw_in_tick(&mut self, materials: &Materials) -> Vec<RedrawCell> {
        self.collect_dirty(materials, CellFlags::NEEDS_REDRAW)
    }

    fn collect_dirty(&mut self, materials: &Materials, clear: CellFlags) -> Vec<RedrawCell> {
        let mut redraw = Vec::new();
        for index in 0..self.cells.len() {
            let pos = self.position_of(index);
            let cell = &mut self.cells[index];
            if cell.is_dirty() {
                redraw.push(RedrawCell {
                    pos,
                    material_id: cell.material_id,
                    color: materials.get_color(cell.material_id),
                });
                cell.flags.remove(clear);
            }
        }
        redraw
    }
}
