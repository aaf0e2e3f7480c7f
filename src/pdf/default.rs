use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::model::{Document, Run, SectionId};
use crate::surface::{SectionRenderer, Surface, TextStyle};
use crate::theme::Theme;

/// Plain headings, flowed paragraphs and a one-line-per-entry table of contents.
pub struct DefaultRenderer<'t> {
    theme: &'t Theme,
    section_pages: HashMap<SectionId, u32>,
}

impl<'t> DefaultRenderer<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            section_pages: HashMap::new(),
        }
    }

    pub fn section_page(&self, section: SectionId) -> Option<u32> {
        self.section_pages.get(&section).copied()
    }
}

impl SectionRenderer for DefaultRenderer<'_> {
    fn render_title(&mut self, surface: &mut dyn Surface, doc: &Document, section: SectionId) {
        let sect = doc.section(section);
        if sect.title.is_empty() {
            return;
        }
        let style = TextStyle::heading(self.theme, sect.level);
        surface.typeset(&sect.title, &style);
        surface.move_down(style.size * 0.5);
    }

    fn render_body(&mut self, surface: &mut dyn Surface, doc: &Document, section: SectionId) {
        let style = TextStyle::body(self.theme);
        for para in &doc.section(section).paragraphs {
            surface.typeset(&para.runs, &style);
            surface.move_down(style.size * 0.75);
        }
    }

    fn layout_toc(
        &mut self,
        surface: &mut dyn Surface,
        doc: &Document,
        levels: u8,
        start_page: u32,
        front_matter_pages: u32,
    ) -> RangeInclusive<u32> {
        surface.go_to_page(start_page);

        let title_style = TextStyle::heading(self.theme, 1);
        surface.typeset(&[Run::plain(self.theme.toc_title.as_str())], &title_style);
        surface.move_down(title_style.size * 0.5);

        let entry_style = TextStyle::body(self.theme);
        for id in doc.walk() {
            let sect = doc.section(id);
            if sect.level > levels || sect.title.is_empty() {
                continue;
            }
            // unknown until the body has been laid out in this pass
            let page_label = match self.section_pages.get(&id) {
                Some(&page) => page.saturating_sub(front_matter_pages).to_string(),
                None => "?".to_string(),
            };
            let indent = f32::from(sect.level.saturating_sub(1)) * self.theme.toc_indent;
            surface.typeset_entry(&sect.title, &page_label, indent, &entry_style);
        }

        start_page..=surface.page_number()
    }

    fn section_started(&mut self, section: SectionId, page: u32) {
        self.section_pages.insert(section, page);
    }
}
