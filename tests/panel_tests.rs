use std::convert::Infallible;

use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Point, Size},
};
use lux_monitor::drivers::{
    LineDisplay,
    panel::{Framebuffer, TextPanel},
};

const WIDTH: usize = 128;
const HEIGHT: usize = 64;

/// An in-memory 128x64 panel that counts how often it was pushed to the glass
struct Frame {
    pixels: Vec<bool>,
    presents: usize,
}

impl Frame {
    fn new() -> Self {
        Self {
            pixels: vec![false; WIDTH * HEIGHT],
            presents: 0,
        }
    }

    fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(index, _)| (index % WIDTH, index / WIDTH))
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                self.pixels[point.y as usize * WIDTH + point.x as usize] = color.is_on();
            }
        }
        Ok(())
    }
}

impl Framebuffer for Frame {
    async fn present(&mut self) {
        self.presents += 1;
    }
}

#[test]
fn cells_are_laid_out_on_the_font_grid() {
    assert_eq!(TextPanel::<Frame>::cell_origin(0, 0), Point::new(0, 0));
    assert_eq!(TextPanel::<Frame>::cell_origin(1, 2), Point::new(16, 13));
    // Sixteen columns fill the panel exactly
    assert_eq!(TextPanel::<Frame>::cell_origin(0, 16).x, WIDTH as i32);
}

#[futures_test::test]
async fn first_line_stays_in_the_first_text_row() {
    let mut panel = TextPanel::new(Frame::new());
    panel.clear().await;
    panel.set_cursor(0, 0).await;
    panel.print("Light: 12345 lux").await;

    let frame = panel.frame();
    assert!(frame.lit().count() > 0);
    assert!(frame.lit().all(|(_, y)| y < 13));
    assert_eq!(frame.presents, 2);
    assert_eq!(panel.cursor(), (0, 16));
}

#[futures_test::test]
async fn print_starts_at_the_cursor() {
    let mut panel = TextPanel::new(Frame::new());
    panel.set_cursor(1, 2).await;
    panel.print("A").await;

    let frame = panel.frame();
    assert!(frame.lit().count() > 0);
    assert!(
        frame
            .lit()
            .all(|(x, y)| (16..24).contains(&x) && (13..26).contains(&y))
    );
    assert_eq!(panel.cursor(), (1, 3));
}

#[futures_test::test]
async fn clear_wipes_the_frame_and_homes_the_cursor() {
    let mut panel = TextPanel::new(Frame::new());
    panel.set_cursor(2, 4).await;
    panel.print("0123").await;
    assert!(panel.frame().lit().count() > 0);

    panel.clear().await;
    assert_eq!(panel.frame().lit().count(), 0);
    assert_eq!(panel.cursor(), (0, 0));

    let frame = panel.into_inner();
    assert_eq!(frame.presents, 2);
}
