use crate::config::NOISE_WINDOW;
use crate::simulation::cell::GpuCell;
use crate::simulation::noise_field::NoiseField;

/// How neighbor lookups behave past the edge of the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeMode {
    /// Out-of-range coordinates read the nearest edge cell
    #[default]
    Clamp,
    /// Out-of-range coordinates wrap to the opposite edge
    Wrap,
}

impl EdgeMode {
    /// Value passed to the compute shader
    pub fn shader_id(self) -> u32 {
        match self {
            EdgeMode::Clamp => 0,
            EdgeMode::Wrap => 1,
        }
    }

    fn resolve(self, coord: i64, width: u32) -> u32 {
        let w = width as i64;
        match self {
            EdgeMode::Clamp => coord.clamp(0, w - 1) as u32,
            EdgeMode::Wrap => coord.rem_euclid(w) as u32,
        }
    }
}

/// Number of cells in a `width` x `width` grid
pub fn cell_count(width: u32) -> usize {
    width as usize * width as usize
}

/// Double-buffered heightfield.
///
/// Reads always come from the buffer produced by the previous step and writes
/// go to the other one; `swap` flips which is which without copying.
pub struct HeightGrid {
    buffers: [Vec<GpuCell>; 2],
    read_index: usize,
    width: u32,
    edge_mode: EdgeMode,
}

/// Summary of the current heights, for logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub energy: f64,
    pub min: f32,
    pub max: f32,
}

impl HeightGrid {
    /// Flat grid at rest
    pub fn new(width: u32, edge_mode: EdgeMode) -> Self {
        Self::from_cells(width, edge_mode, vec![GpuCell::default(); cell_count(width)])
    }

    /// Grid whose read buffer holds `cells` (row-major, `j * width + i`)
    pub fn from_cells(width: u32, edge_mode: EdgeMode, cells: Vec<GpuCell>) -> Self {
        assert_eq!(
            cells.len(),
            cell_count(width),
            "Initial data size mismatch"
        );
        let scratch = cells.clone();
        Self {
            buffers: [cells, scratch],
            read_index: 0,
            width,
            edge_mode,
        }
    }

    /// Grid at rest on noise terrain; the same noise window is used for any width
    pub fn seeded(width: u32, edge_mode: EdgeMode, noise: &NoiseField) -> Self {
        let scale = NOISE_WINDOW / width as f32;
        let mut cells = Vec::with_capacity(cell_count(width));

        for j in 0..width {
            for i in 0..width {
                let h = noise.height(i as f32 * scale, j as f32 * scale);
                cells.push(GpuCell::at_rest(h));
            }
        }

        Self::from_cells(width, edge_mode, cells)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn edge_mode(&self) -> EdgeMode {
        self.edge_mode
    }

    fn index(&self, i: u32, j: u32) -> usize {
        debug_assert!(i < self.width && j < self.width);
        j as usize * self.width as usize + i as usize
    }

    /// Current and previous height of a cell in the read buffer
    pub fn read(&self, i: u32, j: u32) -> GpuCell {
        self.buffers[self.read_index][self.index(i, j)]
    }

    /// Current height at possibly out-of-range coordinates, resolved by the edge mode
    pub fn height_at(&self, i: i64, j: i64) -> f32 {
        let i = self.edge_mode.resolve(i, self.width);
        let j = self.edge_mode.resolve(j, self.width);
        self.read(i, j).height
    }

    /// Store a new height in the write buffer; the cell's current height becomes its previous
    pub fn write(&mut self, i: u32, j: u32, height: f32) {
        let idx = self.index(i, j);
        let current = self.buffers[self.read_index][idx];
        self.buffers[1 - self.read_index][idx] = current.advanced(height);
    }

    /// Make the just-written buffer the read buffer
    pub fn swap(&mut self) {
        self.read_index = 1 - self.read_index;
    }

    /// The read buffer, for GPU upload and sampling
    pub fn cells(&self) -> &[GpuCell] {
        &self.buffers[self.read_index]
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            energy: 0.0,
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        };
        for cell in self.cells() {
            stats.energy += (cell.height as f64).powi(2);
            stats.min = stats.min.min(cell.height);
            stats.max = stats.max.max(cell.height);
        }
        stats
    }
}
