//! Cross-pass pagination decisions: colophon relocation ahead of the table of contents,
//! chapter start placement and role-specific headings.
//!
//! The measurement pass detaches the first colophon-role section from the tree and caches
//! its handle in a [`PaginationContext`]. The render pass replays that decision: it draws the
//! colophon on the page just before the table of contents (the blank verso behind the title
//! page in prepress output, an extra page otherwise) and shifts the table of contents by the
//! same offset the measurement pass used.

pub mod chapter;
pub mod heading;

use std::ops::RangeInclusive;

use crate::model::{Document, SectionId};
use crate::surface::{Pass, SectionRenderer, Surface};
use crate::theme::Theme;

pub const COLOPHON_ROLE: &str = "colophon";

/// Host inputs for the table-of-contents call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TocRequest {
    pub levels: u8,
    pub anchor_page: u32,
    pub front_matter_pages: u32,
}

impl Default for TocRequest {
    fn default() -> Self {
        Self {
            levels: 2,
            anchor_page: 2,
            front_matter_pages: 0,
        }
    }
}

/// State shared by the measurement and render passes of one document render.
/// Create a fresh context for every document.
#[derive(Debug, Default)]
pub struct PaginationContext {
    colophon: Option<SectionId>,
}

impl PaginationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The relocated colophon, once the measurement pass has found one.
    pub fn colophon(&self) -> Option<SectionId> {
        self.colophon
    }

    /// Extra pages the relocated colophon pushes the table of contents by. Duplex output
    /// reuses the blank verso already in front of the table of contents.
    pub fn offset(&self, doc: &Document) -> u32 {
        u32::from(self.colophon.is_some() && !doc.is_duplex())
    }

    /// Pages the host must reserve at the anchor for the table of contents plus the
    /// relocated colophon, given the range reported by the measurement pass.
    pub fn reserved_toc_pages(&self, doc: &Document, measured: &RangeInclusive<u32>) -> u32 {
        measured.end() - measured.start() + 1 + self.offset(doc)
    }

    pub fn layout_table_of_contents(
        &mut self,
        pass: Pass,
        surface: &mut dyn Surface,
        renderer: &mut dyn SectionRenderer,
        doc: &mut Document,
        theme: &Theme,
        request: TocRequest,
    ) -> RangeInclusive<u32> {
        match pass {
            Pass::Measurement => {
                self.relocate_colophon(doc);
                let offset = self.offset(doc);
                let range = renderer.layout_toc(
                    surface,
                    doc,
                    request.levels,
                    request.anchor_page + offset,
                    request.front_matter_pages,
                );
                log::debug!(
                    "toc measured at pages {}..={} (offset {offset})",
                    range.start(),
                    range.end()
                );
                range.start().saturating_sub(offset)..=range.end().saturating_sub(offset)
            }
            Pass::Render => {
                if surface.page_number() != request.anchor_page {
                    surface.go_to_page(request.anchor_page);
                }
                if let Some(colophon) = self.colophon {
                    if doc.is_duplex() {
                        // blank verso reserved in front of the table of contents
                        surface.go_to_page(surface.page_number().saturating_sub(1).max(1));
                    }
                    render_section(surface, renderer, doc, colophon, theme);
                    surface.go_to_page(surface.page_number() + 1);
                }
                let offset = self.offset(doc);
                renderer.layout_toc(
                    surface,
                    doc,
                    request.levels,
                    request.anchor_page + offset,
                    request.front_matter_pages,
                )
            }
        }
    }

    fn relocate_colophon(&mut self, doc: &mut Document) {
        let Some(colophon) = doc.find_first_by_role(COLOPHON_ROLE) else {
            return;
        };
        doc.detach(colophon);
        log::debug!("colophon '{}' detached for relocation", doc.section(colophon).id);
        self.colophon = Some(colophon);
    }
}

/// Render a section's heading and body, then its attached subsections, in document order.
pub fn render_section(
    surface: &mut dyn Surface,
    renderer: &mut dyn SectionRenderer,
    doc: &Document,
    section: SectionId,
    theme: &Theme,
) {
    renderer.section_started(section, surface.page_number());
    heading::render_title(
        surface,
        renderer,
        doc,
        section,
        &doc.section(section).title,
        theme,
    );
    renderer.render_body(surface, doc, section);
    for &child in doc.children(Some(section)) {
        render_section(surface, renderer, doc, child, theme);
    }
}
