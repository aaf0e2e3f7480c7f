//! Page cursor and drawing seams consumed by the pagination engine.

use std::ops::RangeInclusive;

use crate::model::{Alignment, Document, Run, SectionId};
use crate::theme::Theme;

/// Which of the two layout passes is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Dry run: determines pagination, draws nothing.
    Measurement,
    Render,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    Rgb([u8; 3]),
    /// Percentages, 0..=100 per channel.
    Cmyk([u8; 4]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Typeface {
    Base,
    Display,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub typeface: Typeface,
    pub size: f32,
    pub align: Alignment,
    pub color: Option<Color>, // None = black
    pub bold: bool,
    pub italic: bool,
    /// Multiplier applied to `size` to get the line advance.
    pub line_height: f32,
}

impl TextStyle {
    pub fn body(theme: &Theme) -> Self {
        Self {
            typeface: Typeface::Base,
            size: theme.base_font_size,
            align: Alignment::Left,
            color: None,
            bold: false,
            italic: false,
            line_height: theme.base_line_height,
        }
    }

    /// Default heading style: bold, stepping down in size with depth.
    pub fn heading(theme: &Theme, level: u8) -> Self {
        let size = match level {
            0 | 1 => 22.0,
            2 => 18.0,
            3 => 14.0,
            _ => 12.0,
        };
        Self {
            size,
            bold: true,
            line_height: theme.heading_line_height,
            ..Self::body(theme)
        }
    }

    pub fn line_advance(&self) -> f32 {
        self.size * self.line_height
    }
}

/// A stack of numbered pages with a vertical cursor. Page numbers are 1-based physical
/// page numbers; even pages are verso in duplex output.
pub trait Surface {
    fn page_number(&self) -> u32;

    fn page_count(&self) -> u32;

    /// Jump to an existing page (pages are appended up to `page` when missing) and place
    /// the cursor at its top.
    fn go_to_page(&mut self, page: u32);

    /// Advance to the following page, appending one when the cursor is on the last page.
    fn start_new_page(&mut self);

    fn at_page_top(&self) -> bool;

    fn is_verso(&self) -> bool {
        self.page_number() % 2 == 0
    }

    /// Drop transient graphics state (fill/stroke colours) so a blank page written next
    /// starts clean.
    fn reset_graphics_state(&mut self);

    fn move_down(&mut self, amount: f32);

    fn move_up(&mut self, amount: f32);

    /// Give up the rest of the current page's content area.
    fn move_past_bottom(&mut self);

    /// Wrap and draw inline runs, flowing onto new pages as needed.
    fn typeset(&mut self, runs: &[Run], style: &TextStyle);

    /// Draw one table-of-contents line: label at `indent`, page label flush right.
    /// Never wraps, so the line count is independent of the page label's width.
    fn typeset_entry(&mut self, label: &[Run], page_label: &str, indent: f32, style: &TextStyle);
}

/// Baseline rendering used when no role-specific treatment applies.
pub trait SectionRenderer {
    fn render_title(&mut self, surface: &mut dyn Surface, doc: &Document, section: SectionId);

    fn render_body(&mut self, surface: &mut dyn Surface, doc: &Document, section: SectionId);

    /// Lay out the table of contents starting at `start_page`. Returns the inclusive range
    /// of pages it occupied.
    fn layout_toc(
        &mut self,
        surface: &mut dyn Surface,
        doc: &Document,
        levels: u8,
        start_page: u32,
        front_matter_pages: u32,
    ) -> RangeInclusive<u32>;

    /// Called with the page on which each rendered section starts.
    fn section_started(&mut self, _section: SectionId, _page: u32) {}
}
