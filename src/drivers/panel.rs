//! Character-cell text on a monochrome pixel display.

use super::LineDisplay;
use embedded_graphics::{
    Drawable,
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_8X13},
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, Point},
    text::{Baseline, Text},
};

/// The font used for the character grid. 8 px wide, so a 128 px panel holds 16 columns.
pub const PANEL_FONT: &MonoFont<'static> = &FONT_8X13;

/// A buffered monochrome display that pushes its buffer to the glass on `present`
pub trait Framebuffer: DrawTarget<Color = BinaryColor> {
    async fn present(&mut self);
}

/// Adapts a [`Framebuffer`] to the row/column [`LineDisplay`] contract.
///
/// Every call that changes the picture is presented straight away, matching a character LCD where
/// each command takes effect on its own.
pub struct TextPanel<F> {
    frame: F,
    row: u8,
    col: u8,
}

impl<F: Framebuffer> TextPanel<F> {
    pub fn new(frame: F) -> Self {
        Self {
            frame,
            row: 0,
            col: 0,
        }
    }

    /// Pixel position of the top left corner of a character cell
    pub fn cell_origin(row: u8, col: u8) -> Point {
        let size = PANEL_FONT.character_size;
        let pitch = size.width + PANEL_FONT.character_spacing;
        Point::new(
            (col as u32 * pitch) as i32,
            (row as u32 * size.height) as i32,
        )
    }

    pub fn cursor(&self) -> (u8, u8) {
        (self.row, self.col)
    }

    pub fn frame(&self) -> &F {
        &self.frame
    }

    pub fn into_inner(self) -> F {
        self.frame
    }
}

impl<F: Framebuffer> LineDisplay for TextPanel<F> {
    async fn clear(&mut self) {
        let _ = self.frame.clear(BinaryColor::Off);
        self.row = 0;
        self.col = 0;
        self.frame.present().await;
    }

    async fn set_cursor(&mut self, row: u8, col: u8) {
        self.row = row;
        self.col = col;
    }

    async fn print(&mut self, text: &str) {
        let style = MonoTextStyle::new(PANEL_FONT, BinaryColor::On);
        let origin = Self::cell_origin(self.row, self.col);
        if Text::with_baseline(text, origin, style, Baseline::Top)
            .draw(&mut self.frame)
            .is_err()
        {
            warn!("PANEL: drawing text failed");
        }
        self.col = self.col.saturating_add(text.len().min(u8::MAX as usize) as u8);
        self.frame.present().await;
    }
}
