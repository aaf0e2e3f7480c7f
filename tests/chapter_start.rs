mod common;

use bookpress::model::{Document, Media, SectionId};
use bookpress::pagination::chapter::{start_page, start_section};

use common::{Event, RecordingSurface, titled};

fn book(media: Media, nonfacing: bool) -> (Document, SectionId) {
    let mut doc = Document::new("Parity");
    doc.media = media;
    let id = doc.add_section(None, "ch", "chapter", titled("Chapter"));
    if nonfacing {
        doc.section_mut(id).options.insert("nonfacing".to_string());
    }
    (doc, id)
}

/// Surface on `page` with the cursor below the top when `mid_page` is set.
fn surface_on(page: u32, mid_page: bool) -> RecordingSurface {
    let mut surface = RecordingSurface::on_page(page);
    if mid_page {
        surface.y = 40.0;
    }
    surface
}

#[test]
fn digital_starts_on_the_next_page_of_either_parity() {
    let (doc, id) = book(Media::Screen, false);
    let mut surface = surface_on(3, true);

    start_section(&mut surface, &doc, id);

    assert_eq!(surface.page, 4);
    assert_eq!(surface.events, vec![Event::NewPage]);
}

#[test]
fn digital_at_page_top_stays_put() {
    let (doc, id) = book(Media::Print, false);
    let mut surface = surface_on(4, false);

    start_section(&mut surface, &doc, id);

    assert_eq!(surface.page, 4);
    assert!(surface.events.is_empty());
}

#[test]
fn prepress_skips_a_verso_and_resets_before_the_second_break() {
    let (doc, id) = book(Media::Prepress, false);
    let mut surface = surface_on(3, true);

    start_section(&mut surface, &doc, id);

    assert_eq!(surface.page, 5);
    assert_eq!(
        surface.events,
        vec![Event::NewPage, Event::Reset, Event::NewPage]
    );
}

#[test]
fn prepress_recto_is_kept() {
    let (doc, id) = book(Media::Prepress, false);
    let mut surface = surface_on(4, true);

    start_section(&mut surface, &doc, id);

    assert_eq!(surface.page, 5);
    assert_eq!(surface.events, vec![Event::NewPage]);
}

#[test]
fn nonfacing_may_start_on_a_verso() {
    let (doc, id) = book(Media::Prepress, true);
    let mut surface = surface_on(3, true);

    start_section(&mut surface, &doc, id);

    assert_eq!(surface.page, 4);
    assert!(!surface.events.contains(&Event::Reset));
}

#[test]
fn prepress_chapters_always_land_on_odd_pages() {
    let (doc, id) = book(Media::Prepress, false);
    for page in 1..=12 {
        for mid_page in [false, true] {
            let mut surface = surface_on(page, mid_page);
            start_section(&mut surface, &doc, id);
            assert_eq!(surface.page % 2, 1, "from page {page} mid_page={mid_page}");
            assert!(surface.page >= page);
        }
    }
}

#[test]
fn start_page_applies_the_same_rule_to_non_section_blocks() {
    let mut doc = Document::new("Toc");
    doc.media = Media::Prepress;
    let mut surface = surface_on(2, false);

    start_page(&mut surface, &doc, false);
    assert_eq!(surface.page, 3);

    let mut surface = surface_on(2, false);
    start_page(&mut surface, &doc, true);
    assert_eq!(surface.page, 2);
}
