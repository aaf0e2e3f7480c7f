use crate::model::{Document, SectionId};
use crate::surface::Surface;

/// Put the cursor at the top of a fresh page before a chapter-like section. In duplex
/// output the chapter also lands on a recto page unless the section is `nonfacing`.
pub fn start_section(surface: &mut dyn Surface, doc: &Document, section: SectionId) {
    let nonfacing = doc.section(section).is_nonfacing();
    start_page(surface, doc, nonfacing);
}

/// Same placement rule for blocks that are not sections (table of contents).
pub fn start_page(surface: &mut dyn Surface, doc: &Document, nonfacing: bool) {
    if !surface.at_page_top() {
        surface.start_new_page();
    }
    if doc.is_duplex() && surface.is_verso() && !nonfacing {
        // the skipped verso stays blank; don't let it inherit colours from the last page
        surface.reset_graphics_state();
        surface.start_new_page();
    }
}
