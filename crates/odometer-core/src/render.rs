//! Frame composition for the LED matrix.

use max7219::FrameBuffer;

use crate::font::{self, Font, GLYPH_HEIGHT, GLYPH_PITCH};

/// Hardware endpoint that receives complete frames.
pub trait FrameSink {
    type Error: core::fmt::Debug;

    /// Pushes the whole frame to the panel before returning.
    fn show(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error>;
}

/// Draws into an in-memory frame; only [`MatrixRenderer::show`] touches the sink.
#[derive(Debug)]
pub struct MatrixRenderer<S> {
    frame: FrameBuffer,
    sink: S,
}

impl<S> MatrixRenderer<S>
where
    S: FrameSink,
{
    pub fn new(sink: S, modules: usize) -> Self {
        Self {
            frame: FrameBuffer::new(modules),
            sink,
        }
    }

    /// Width in pixels, fixed for the renderer's lifetime.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn release(self) -> S {
        self.sink
    }

    pub fn clear(&mut self) {
        self.frame.clear(false);
    }

    /// ORs the glyph for `c` into the frame with its top-left corner at `(x, y)`.
    ///
    /// Pixels that land outside the frame are dropped.
    pub fn draw_char(&mut self, c: char, x: i32, y: i32, font: Font) {
        let glyph = font::glyph(c, font);
        for (row, bits) in glyph.rows().iter().enumerate() {
            if *bits == 0 {
                continue;
            }
            for col in 0..GLYPH_PITCH {
                if bits & (0x80 >> col) != 0 {
                    self.set_pixel_signed(x + col as i32, y + row as i32);
                }
            }
        }
    }

    /// Draws `text` left to right at a fixed 8-pixel pitch.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, font: Font) {
        let mut cursor = x;
        for c in text.chars() {
            // Everything right of the frame is clipped anyway.
            if cursor >= self.frame.width() as i32 {
                break;
            }
            self.draw_char(c, cursor, y, font);
            cursor = cursor.saturating_add(GLYPH_PITCH as i32);
        }
    }

    /// Lights or darkens every row of column `x`.
    pub fn set_column(&mut self, x: usize, on: bool) {
        for y in 0..GLYPH_HEIGHT {
            let _ = self.frame.set_pixel(x, y, on);
        }
    }

    pub fn show(&mut self) -> Result<(), S::Error> {
        self.sink.show(&self.frame)
    }

    fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let _ = self.frame.set_pixel(x as usize, y as usize, true);
    }
}

/// Pixel width of `text` at the fixed glyph pitch.
pub fn text_width(text: &str) -> usize {
    text.chars().count() * GLYPH_PITCH
}
