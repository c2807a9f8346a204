pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Pixel grid indexed `[y][x]`, each cell 0 or 1.
pub type Frame = [[u8; WIDTH]; HEIGHT];

/// The monochrome frame buffer.
///
/// Only 00E0 and DXYN write to it. `draw_flag` is raised by both and is
/// lowered by whoever consumes frames, never by the interpreter itself.
pub struct Screen {
    bit_buffer: Frame,
    draw_flag: bool,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            bit_buffer: [[0; WIDTH]; HEIGHT],
            draw_flag: false,
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer = [[0; WIDTH]; HEIGHT];
        self.draw_flag = true;
    }

    /// XOR `sprite` (one byte per 8-pixel row) onto the grid at (x, y),
    /// wrapping past the right and bottom edges. Returns whether any lit
    /// pixel was hit by a set sprite bit.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (i, row) in sprite.iter().enumerate() {
            let ny = (y as usize + i) % HEIGHT;
            for j in 0..8 {
                let bit = (row >> (7 - j)) & 1;
                if bit == 0 {
                    continue;
                }
                let nx = (x as usize + j) % WIDTH;
                let pixel = &mut self.bit_buffer[ny][nx];
                if *pixel == 1 {
                    collision = true;
                }
                *pixel ^= bit;
            }
        }
        self.draw_flag = true;
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.bit_buffer[y][x]
    }

    pub fn frame(&self) -> &Frame {
        &self.bit_buffer
    }

    pub fn needs_redraw(&self) -> bool {
        self.draw_flag
    }

    pub fn clear_redraw(&mut self) {
        self.draw_flag = false;
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}
