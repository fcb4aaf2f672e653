/// chip-8 screen is 64x32 monochrome
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_PIXELS: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// The monochrome framebuffer. One byte per pixel (0 or 1), row-major, so a
/// renderer can read it without unpacking bits.
///
/// The dirty flag is raised by every clear and draw, and is only lowered by
/// [`Framebuffer::consume_dirty`].
pub struct Framebuffer {
    pixels: Box<[u8; DISPLAY_PIXELS]>,
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: Box::new([0; DISPLAY_PIXELS]),
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.dirty = true;
    }

    /// XOR an 8-pixel-wide sprite onto the screen at (x, y), one row per byte.
    /// The start position wraps onto the screen and each pixel wraps again at
    /// the edges. Returns true if any lit pixel was switched off.
    pub fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x0 = x as usize % DISPLAY_WIDTH;
        let y0 = y as usize % DISPLAY_HEIGHT;
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            let py = (y0 + row) % DISPLAY_HEIGHT;
            for col in 0..8 {
                let bit = (byte >> (7 - col)) & 1;
                if bit == 0 {
                    continue;
                }
                let px = (x0 + col) % DISPLAY_WIDTH;
                let cell = &mut self.pixels[py * DISPLAY_WIDTH + px];
                collision |= *cell == 1;
                *cell ^= 1;
            }
        }
        self.dirty = true;
        collision
    }

    /// read and lower the dirty flag
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            pixels: &self.pixels,
        }
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only borrow of the framebuffer storage; nothing is copied.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    pixels: &'a [u8; DISPLAY_PIXELS],
}

impl<'a> FrameView<'a> {
    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    /// 0 or 1; None off the grid
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return None;
        }
        Some(self.pixels[y * DISPLAY_WIDTH + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> {
        self.pixels.chunks_exact(DISPLAY_WIDTH)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        &self.pixels[..]
    }

    /// (x, y) of every pixel equal to `plane`
    pub fn bitplane(&self, plane: u8) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.pixels
            .iter()
            .enumerate()
            .filter(move |&(_, &p)| p == plane)
            .map(|(i, _)| (i % DISPLAY_WIDTH, i / DISPLAY_WIDTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_is_blank_and_clean() {
        let mut fb = Framebuffer::new();
        assert!(fb.view().as_bytes().iter().all(|&p| p == 0));
        assert!(!fb.consume_dirty());
    }

    #[test]
    fn test_clear_sets_dirty() {
        let mut fb = Framebuffer::new();
        fb.draw(0, 0, &[0xff]);
        fb.consume_dirty();
        fb.clear();
        assert!(fb.consume_dirty());
        assert!(!fb.consume_dirty());
        assert_eq!(fb.view().pixel(0, 0), Some(0));
    }

    #[test]
    fn test_draw_row() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw(0, 0, &[0xf0]));
        let row: Vec<u8> = fb.view().rows().next().unwrap()[..8].to_vec();
        assert_eq!(row, vec![1, 1, 1, 1, 0, 0, 0, 0]);
        assert!(fb.consume_dirty());
    }

    #[test]
    fn test_draw_twice_erases_with_collision() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw(10, 5, &[0x81, 0x42]));
        assert!(fb.draw(10, 5, &[0x81, 0x42]));
        assert!(fb.view().as_bytes().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_overlap_without_erasing_no_collision() {
        let mut fb = Framebuffer::new();
        fb.draw(0, 0, &[0xf0]);
        // lights 4..8, leaves 0..4 alone
        assert!(!fb.draw(0, 0, &[0x0f]));
        assert_eq!(fb.view().bitplane(1).count(), 8);
    }

    #[test]
    fn test_draw_wraps_at_corner() {
        let mut fb = Framebuffer::new();
        fb.draw(63, 31, &[0xc0, 0xc0]);
        let v = fb.view();
        assert_eq!(v.pixel(63, 31), Some(1));
        assert_eq!(v.pixel(0, 31), Some(1));
        assert_eq!(v.pixel(63, 0), Some(1));
        assert_eq!(v.pixel(0, 0), Some(1));
        assert_eq!(v.bitplane(1).count(), 4);
    }

    #[test]
    fn test_start_position_wraps() {
        let mut fb = Framebuffer::new();
        fb.draw(64 + 3, 32 + 2, &[0x80]);
        assert_eq!(fb.view().pixel(3, 2), Some(1));
    }

    #[test]
    fn test_empty_sprite_still_dirty() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw(0, 0, &[]));
        assert!(fb.consume_dirty());
    }

    #[test]
    fn test_view_off_grid() {
        let fb = Framebuffer::new();
        assert_eq!(fb.view().pixel(64, 0), None);
        assert_eq!(fb.view().pixel(0, 32), None);
        assert_eq!(fb.view().rows().count(), 32);
    }

    proptest! {
        #[test]
        fn test_collision_iff_lit_pixel_erased(
            before in proptest::collection::vec(any::<u8>(), 1..16),
            sprite in proptest::collection::vec(any::<u8>(), 1..16),
            x in any::<u8>(),
            y in any::<u8>(),
        ) {
            let mut fb = Framebuffer::new();
            fb.draw(x, y, &before);
            let old = fb.view().as_bytes().to_vec();
            let collision = fb.draw(x, y, &sprite);
            let new = fb.view().as_bytes();

            let mut erased = false;
            for (o, n) in old.iter().zip(new.iter()) {
                if *o == 1 && *n == 0 {
                    erased = true;
                }
                prop_assert!(*n <= 1);
            }
            prop_assert_eq!(collision, erased);
        }
    }
}
