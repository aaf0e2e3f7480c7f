use crate::fonts::{FaceKey, FontSet};
use crate::model::Run;
use crate::surface::{Color, Surface, TextStyle};
use crate::theme::PageGeometry;

use super::layout::build_lines;

/// Page-number column width for table-of-contents entries, in digits.
const PAGE_LABEL_DIGITS: &str = "0000";
const PAGE_LABEL_GAP: f32 = 12.0;

pub(crate) enum DrawOp {
    Text {
        face: FaceKey,
        size: f32,
        x: f32,
        y: f32, // baseline, PDF user space
        text: String,
        color: Option<Color>,
    },
    ResetColors,
}

#[derive(Default)]
pub(crate) struct Page {
    pub(crate) ops: Vec<DrawOp>,
}

/// In-memory page stack. A scratch surface paginates exactly like a recording one but
/// keeps no draw ops.
pub(crate) struct PageSurface<'f> {
    fonts: &'f FontSet,
    geometry: PageGeometry,
    scratch: bool,
    pages: Vec<Page>,
    current: usize,
    y: f32, // distance below the top margin
}

impl<'f> PageSurface<'f> {
    pub(crate) fn new(fonts: &'f FontSet, geometry: PageGeometry) -> Self {
        Self {
            fonts,
            geometry,
            scratch: false,
            pages: vec![Page::default()],
            current: 0,
            y: 0.0,
        }
    }

    pub(crate) fn scratch(fonts: &'f FontSet, geometry: PageGeometry) -> Self {
        Self {
            scratch: true,
            ..Self::new(fonts, geometry)
        }
    }

    pub(crate) fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    fn push(&mut self, op: DrawOp) {
        if !self.scratch {
            self.pages[self.current].ops.push(op);
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if !self.at_page_top() && self.y + height > self.geometry.content_height() {
            self.start_new_page();
        }
    }

    fn baseline(&self, face: FaceKey, size: f32) -> f32 {
        let ascender = self.fonts.face(face).ascender_ratio;
        self.geometry.height - self.geometry.margin_top - self.y - size * ascender
    }
}

impl Surface for PageSurface<'_> {
    fn page_number(&self) -> u32 {
        self.current as u32 + 1
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn go_to_page(&mut self, page: u32) {
        let index = page.max(1) as usize - 1;
        if index >= self.pages.len() {
            log::debug!("go_to_page({page}) appends {} page(s)", index + 1 - self.pages.len());
            self.pages.resize_with(index + 1, Page::default);
        }
        self.current = index;
        self.y = 0.0;
    }

    fn start_new_page(&mut self) {
        if self.current + 1 == self.pages.len() {
            self.pages.push(Page::default());
        }
        self.current += 1;
        self.y = 0.0;
    }

    fn at_page_top(&self) -> bool {
        self.y <= f32::EPSILON
    }

    fn reset_graphics_state(&mut self) {
        self.push(DrawOp::ResetColors);
    }

    fn move_down(&mut self, amount: f32) {
        self.y = (self.y + amount).min(self.geometry.content_height());
    }

    fn move_up(&mut self, amount: f32) {
        self.y = (self.y - amount).max(0.0);
    }

    fn move_past_bottom(&mut self) {
        self.start_new_page();
    }

    fn typeset(&mut self, runs: &[Run], style: &TextStyle) {
        let width = self.geometry.content_width();
        let advance = style.line_advance();
        for line in build_lines(runs, style, self.fonts, width) {
            self.ensure_room(advance);
            let Some(first) = line.chunks.first() else {
                continue;
            };
            let baseline = self.baseline(first.face, style.size);
            let x0 = line.start_x(style.align, self.geometry.margin_left, width);
            for chunk in line.chunks {
                self.push(DrawOp::Text {
                    face: chunk.face,
                    size: style.size,
                    x: x0 + chunk.x_offset,
                    y: baseline,
                    text: chunk.text,
                    color: style.color,
                });
            }
            self.y += advance;
        }
    }

    fn typeset_entry(&mut self, label: &[Run], page_label: &str, indent: f32, style: &TextStyle) {
        let width = self.geometry.content_width();
        let face = FaceKey::select(style.typeface, style.bold, style.italic);
        let label_col = self.fonts.face(face).text_width(PAGE_LABEL_DIGITS, style.size);
        let label_width = (width - indent - label_col - PAGE_LABEL_GAP).max(0.0);
        let advance = style.line_advance();

        self.ensure_room(advance);
        let baseline = self.baseline(face, style.size);
        let x0 = self.geometry.margin_left + indent;
        // overlong titles are cut at the first wrap point
        if let Some(line) = build_lines(label, style, self.fonts, label_width).into_iter().next() {
            for chunk in line.chunks {
                self.push(DrawOp::Text {
                    face: chunk.face,
                    size: style.size,
                    x: x0 + chunk.x_offset,
                    y: baseline,
                    text: chunk.text,
                    color: style.color,
                });
            }
        }
        let page_w = self.fonts.face(face).text_width(page_label, style.size);
        self.push(DrawOp::Text {
            face,
            size: style.size,
            x: self.geometry.margin_left + width - page_w,
            y: baseline,
            text: page_label.to_string(),
            color: style.color,
        });
        self.y += advance;
    }
}
