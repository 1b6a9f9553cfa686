//! The page-drawing surface consumed by the table drawer and report renderer.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page; `y` for text is the baseline.

use crate::error::Result;
use crate::layout::Alignment;
use crate::metrics::{FontWeight, TextMetrics};

/// Placeholder replaced by the final page count when the canvas is finished
pub const TOTAL_PAGES: &str = "{total_pages}";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const HEADER: Color = Color::rgb(66, 66, 66);
    pub const STRIPE: Color = Color::rgb(245, 245, 245);
    pub const RULE: Color = Color::rgb(200, 200, 200);
    pub const MUTED: Color = Color::rgb(100, 100, 100);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to 0.0..=1.0
    pub fn components(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: Color,
    /// How `x` anchors the text: left edge, center or right edge
    pub align: Alignment,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            color: Color::BLACK,
            align: Alignment::Left,
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A multi-page drawing surface.
///
/// Drawing always targets the current page, which is the most recently
/// added one. A new canvas starts with one page.
pub trait Canvas: TextMetrics {
    fn page_width(&self) -> f32;
    fn page_height(&self) -> f32;
    fn page_count(&self) -> usize;
    /// 1-based number of the page being drawn on
    fn current_page(&self) -> usize;
    fn add_page(&mut self);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32);
    /// Produce the finished document
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}
