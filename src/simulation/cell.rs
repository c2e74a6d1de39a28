/// GPU-compatible heightfield cell.
///
/// Layout: 8 bytes, matching `struct Cell` in the WGSL shaders.
/// - height: f32 = 4 bytes - Surface height after the latest step
/// - previous: f32 = 4 bytes - Height one step earlier (used by the damping term)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuCell {
    pub height: f32,
    pub previous: f32,
}

impl GpuCell {
    pub fn new(height: f32, previous: f32) -> Self {
        Self { height, previous }
    }

    /// A cell at rest: both history slots hold the same height
    pub fn at_rest(height: f32) -> Self {
        Self::new(height, height)
    }

    /// State after one step to `height`; the current height becomes the previous one
    pub fn advanced(self, height: f32) -> Self {
        Self::new(height, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_size() {
        assert_eq!(std::mem::size_of::<GpuCell>(), 8);
    }

    #[test]
    fn test_advanced_shifts_history() {
        let cell = GpuCell::new(0.3, 0.1).advanced(-0.2);
        assert_eq!(cell, GpuCell::new(-0.2, 0.3));
    }

    #[test]
    fn test_cast_to_bytes() {
        let cells = [GpuCell::at_rest(1.0), GpuCell::new(2.0, 3.0)];
        let floats: &[f32] = bytemuck::cast_slice(&cells);
        assert_eq!(floats, &[1.0, 1.0, 2.0, 3.0]);
    }
}
