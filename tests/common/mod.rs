#![allow(dead_code)]

use std::ops::RangeInclusive;

use bookpress::model::{Alignment, Document, Media, Paragraph, Run, SectionId, plain_text};
use bookpress::surface::{SectionRenderer, Surface, TextStyle, Typeface};

pub const PAGE_HEIGHT: f32 = 700.0;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    GoTo(u32),
    NewPage,
    Reset,
    Down(f32),
    Up(f32),
    PastBottom,
    Text {
        page: u32,
        text: String,
        size: f32,
        align: Alignment,
        typeface: Typeface,
    },
    Entry {
        page: u32,
        label: String,
        page_label: String,
    },
}

/// Surface double: tracks page number and vertical position and logs every call.
pub struct RecordingSurface {
    pub page: u32,
    pub pages: u32,
    pub y: f32,
    pub events: Vec<Event>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            page: 1,
            pages: 1,
            y: 0.0,
            events: Vec::new(),
        }
    }

    /// Surface sitting part-way down `page`, with that many pages already laid out.
    pub fn on_page(page: u32) -> Self {
        Self {
            page,
            pages: page,
            y: 0.0,
            events: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<(u32, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text { page, text, .. } => Some((*page, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn page_of(&self, text: &str) -> Option<u32> {
        self.texts()
            .into_iter()
            .find(|(_, t)| t == text)
            .map(|(page, _)| page)
    }

    pub fn moves(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Down(_) | Event::Up(_) | Event::PastBottom))
            .cloned()
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn page_number(&self) -> u32 {
        self.page
    }

    fn page_count(&self) -> u32 {
        self.pages
    }

    fn go_to_page(&mut self, page: u32) {
        self.events.push(Event::GoTo(page));
        self.page = page.max(1);
        self.pages = self.pages.max(self.page);
        self.y = 0.0;
    }

    fn start_new_page(&mut self) {
        self.events.push(Event::NewPage);
        self.page += 1;
        self.pages = self.pages.max(self.page);
        self.y = 0.0;
    }

    fn at_page_top(&self) -> bool {
        self.y == 0.0
    }

    fn reset_graphics_state(&mut self) {
        self.events.push(Event::Reset);
    }

    fn move_down(&mut self, amount: f32) {
        self.events.push(Event::Down(amount));
        self.y += amount;
    }

    fn move_up(&mut self, amount: f32) {
        self.events.push(Event::Up(amount));
        self.y = (self.y - amount).max(0.0);
    }

    fn move_past_bottom(&mut self) {
        self.events.push(Event::PastBottom);
        self.page += 1;
        self.pages = self.pages.max(self.page);
        self.y = 0.0;
    }

    fn typeset(&mut self, runs: &[Run], style: &TextStyle) {
        if self.y + style.line_advance() > PAGE_HEIGHT {
            self.start_new_page();
        }
        self.events.push(Event::Text {
            page: self.page,
            text: plain_text(runs),
            size: style.size,
            align: style.align,
            typeface: style.typeface,
        });
        self.y += style.line_advance();
    }

    fn typeset_entry(&mut self, label: &[Run], page_label: &str, _indent: f32, style: &TextStyle) {
        self.events.push(Event::Entry {
            page: self.page,
            label: plain_text(label),
            page_label: page_label.to_string(),
        });
        self.y += style.line_advance();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TocCall {
    pub start_page: u32,
    pub levels: u8,
    pub front_matter_pages: u32,
}

/// Default-renderer double. The table of contents always spans `toc_len` pages.
pub struct StubRenderer {
    pub toc_len: u32,
    pub toc_calls: Vec<TocCall>,
    pub default_titles: Vec<String>,
    pub bodies: Vec<(String, u32)>,
    pub started: Vec<(SectionId, u32)>,
}

impl StubRenderer {
    pub fn new(toc_len: u32) -> Self {
        Self {
            toc_len,
            toc_calls: Vec::new(),
            default_titles: Vec::new(),
            bodies: Vec::new(),
            started: Vec::new(),
        }
    }
}

impl SectionRenderer for StubRenderer {
    fn render_title(&mut self, surface: &mut dyn Surface, doc: &Document, section: SectionId) {
        let sect = doc.section(section);
        self.default_titles.push(sect.id.clone());
        surface.typeset(&sect.title, &TextStyle::heading(&Default::default(), sect.level));
    }

    fn render_body(&mut self, surface: &mut dyn Surface, doc: &Document, section: SectionId) {
        self.bodies
            .push((doc.section(section).id.clone(), surface.page_number()));
    }

    fn layout_toc(
        &mut self,
        surface: &mut dyn Surface,
        _doc: &Document,
        levels: u8,
        start_page: u32,
        front_matter_pages: u32,
    ) -> RangeInclusive<u32> {
        self.toc_calls.push(TocCall {
            start_page,
            levels,
            front_matter_pages,
        });
        surface.go_to_page(start_page);
        for _ in 1..self.toc_len {
            surface.start_new_page();
        }
        start_page..=start_page + self.toc_len - 1
    }

    fn section_started(&mut self, section: SectionId, page: u32) {
        self.started.push((section, page));
    }
}

pub fn titled(text: &str) -> Vec<Run> {
    vec![Run::plain(text)]
}

/// dedication, three chapters (the second with a subsection), colophon at the end.
pub fn sample_book(media: Media) -> Document {
    let mut doc = Document::new("Sample");
    doc.media = media;
    doc.add_section(None, "dedication", "dedication", titled("Dedication"));
    for n in 1..=3 {
        let ch = doc.add_section(
            None,
            format!("chapter{n}"),
            "chapter",
            titled(&format!("Chapter {n}")),
        );
        doc.section_mut(ch).paragraphs.push(Paragraph {
            runs: vec![Run::plain(format!("Body of chapter {n}."))],
        });
        if n == 2 {
            doc.add_section(Some(ch), "chapter2-notes", "section", titled("Notes"));
        }
    }
    let colophon = doc.add_section(None, "colophon", "colophon", titled("Colophon"));
    doc.section_mut(colophon).paragraphs.push(Paragraph {
        runs: vec![Run::plain("Set in Helvetica.")],
    });
    doc
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
