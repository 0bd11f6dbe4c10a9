/// internal display resolution
pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const CELLS: usize = WIDTH * HEIGHT;

/// 64x32 one-bit cells with XOR-draw semantics and a dirty flag.
///
/// Sprites are blitted a row at a time; coordinates wrap at both edges
/// rather than clipping. Collision means a draw toggled a cell that was
/// already lit.
pub struct FrameBuffer {
    cells: Box<[bool; CELLS]>,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            cells: Box::new([false; CELLS]),
            dirty: false,
        }
    }

    /// blank every cell and owe the renderer a frame
    pub fn clear(&mut self) {
        self.cells.fill(false);
        self.dirty = true;
    }

    /// XOR eight sprite bits into the row at (x, y), MSB leftmost,
    /// wrapping both coordinates; returns whether any lit cell was toggled
    pub fn xor_row(&mut self, x: usize, y: usize, bits: u8) -> bool {
        let mut collision = false;
        let row = y % HEIGHT;
        for col in 0..8 {
            if bits & (0x80 >> col) == 0 {
                continue;
            }
            let cell = &mut self.cells[row * WIDTH + (x + col) % WIDTH];
            if *cell {
                collision = true;
            }
            *cell ^= true;
            self.dirty = true;
        }
        collision
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells[..]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// acknowledge that the current frame has been presented
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new()
    }
}
