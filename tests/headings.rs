mod common;

use bookpress::model::{Alignment, Document, Media, SectionId};
use bookpress::pagination::heading::{
    ACCENT_HEADING_SIZE, HeadingTreatment, UNDERLINE_GLYPH, decorative_underline,
    render_heading_text, render_title, treatment_for,
};
use bookpress::surface::{Color, TextStyle, Typeface};
use bookpress::theme::Theme;

use common::{Event, RecordingSurface, StubRenderer, titled};

fn single(media: Media, role: &str, title: &str) -> (Document, SectionId) {
    let mut doc = Document::new("Headings");
    doc.media = media;
    let id = doc.add_section(None, "s1", role, titled(title));
    (doc, id)
}

fn render(
    media: Media,
    role: &str,
    title: &str,
) -> (RecordingSurface, StubRenderer) {
    let (doc, id) = single(media, role, title);
    let theme = Theme::default();
    let mut surface = RecordingSurface::new();
    let mut renderer = StubRenderer::new(1);
    render_title(
        &mut surface,
        &mut renderer,
        &doc,
        id,
        &doc.section(id).title,
        &theme,
    );
    (surface, renderer)
}

fn only_text(surface: &RecordingSurface) -> Event {
    let texts: Vec<&Event> = surface
        .events
        .iter()
        .filter(|e| matches!(e, Event::Text { .. }))
        .collect();
    assert_eq!(texts.len(), 1, "{:?}", surface.events);
    texts[0].clone()
}

#[test]
fn roles_dispatch_to_treatments() {
    for role in [
        "about-the-author",
        "readers-feedback",
        "acknowledgements",
        "dedication",
    ] {
        assert_eq!(treatment_for(role), HeadingTreatment::Accent, "{role}");
    }
    assert_eq!(treatment_for("colophon"), HeadingTreatment::Colophon);
    assert_eq!(treatment_for("chapter"), HeadingTreatment::Chapter);
    assert_eq!(treatment_for("chapter3"), HeadingTreatment::Chapter);
    assert_eq!(treatment_for("appendix-chapter"), HeadingTreatment::Chapter);
    // exact match only for the colophon rule
    assert_eq!(treatment_for("colophon-chapter"), HeadingTreatment::Chapter);
    assert_eq!(treatment_for("colophon-notes"), HeadingTreatment::Default);
    assert_eq!(treatment_for("preface"), HeadingTreatment::Default);
    assert_eq!(treatment_for(""), HeadingTreatment::Default);
    assert_eq!(treatment_for("Dedication"), HeadingTreatment::Default);
}

#[test]
fn pre_offsets_by_media() {
    assert_eq!(HeadingTreatment::Colophon.pre_offset(Media::Prepress), 325.0);
    assert_eq!(HeadingTreatment::Colophon.pre_offset(Media::Screen), 460.0);
    assert_eq!(HeadingTreatment::Colophon.pre_offset(Media::Print), 460.0);
    assert_eq!(HeadingTreatment::Chapter.pre_offset(Media::Prepress), 120.0);
    assert_eq!(HeadingTreatment::Chapter.pre_offset(Media::Screen), 180.0);
    assert_eq!(HeadingTreatment::Accent.pre_offset(Media::Prepress), 0.0);
    assert_eq!(HeadingTreatment::Default.pre_offset(Media::Screen), 0.0);
}

#[test]
fn heading_block_moves() {
    let mut surface = RecordingSurface::new();
    let style = TextStyle::heading(&Theme::default(), 1);

    render_heading_text(&mut surface, &titled("Preface"), &style);

    assert_eq!(
        surface.moves(),
        vec![Event::Down(100.0), Event::Up(5.0), Event::Down(20.0)]
    );
    // the ornament is built but never drawn
    assert_eq!(surface.texts(), vec![(1, "Preface".to_string())]);
}

#[test]
fn accent_heading_is_centered_and_large() {
    let (surface, renderer) = render(Media::Screen, "dedication", "For Ada");

    assert_eq!(
        surface.moves(),
        vec![Event::Down(100.0), Event::Up(5.0), Event::Down(20.0)]
    );
    match only_text(&surface) {
        Event::Text {
            text, size, align, typeface, ..
        } => {
            assert_eq!(text, "For Ada");
            assert_eq!(size, ACCENT_HEADING_SIZE);
            assert_eq!(align, Alignment::Center);
            assert_eq!(typeface, Typeface::Base);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(renderer.default_titles.is_empty());
}

#[test]
fn accent_color_is_the_theme_cmyk() {
    assert_eq!(Theme::default().accent_color, Color::Cmyk([42, 1, 83, 1]));
}

#[test]
fn colophon_heading_drops_by_media() {
    let (surface, _) = render(Media::Prepress, "colophon", "Colophon");
    assert_eq!(surface.moves()[0], Event::Down(325.0));

    let (surface, _) = render(Media::Screen, "colophon", "Colophon");
    assert_eq!(
        surface.moves(),
        vec![
            Event::Down(460.0),
            Event::Down(100.0),
            Event::Up(5.0),
            Event::Down(20.0)
        ]
    );
    match only_text(&surface) {
        Event::Text { size, .. } => assert_eq!(size, Theme::default().base_font_size),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn chapter_heading_uses_display_face_and_ends_its_page() {
    let (surface, renderer) = render(Media::Screen, "chapter", "The Beginning");

    assert_eq!(
        surface.moves(),
        vec![
            Event::Down(180.0),
            Event::Down(100.0),
            Event::Up(5.0),
            Event::Down(20.0),
            Event::PastBottom
        ]
    );
    match only_text(&surface) {
        Event::Text {
            page, size, align, typeface, ..
        } => {
            assert_eq!(page, 1);
            assert_eq!(size, ACCENT_HEADING_SIZE);
            assert_eq!(align, Alignment::Right);
            assert_eq!(typeface, Typeface::Display);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(surface.page, 2);
    assert!(renderer.default_titles.is_empty());
}

#[test]
fn prepress_chapter_heading_drops_less() {
    let (surface, _) = render(Media::Prepress, "chapter", "The Beginning");
    assert_eq!(surface.moves()[0], Event::Down(120.0));
    assert_eq!(surface.moves().last(), Some(&Event::PastBottom));
}

#[test]
fn other_roles_fall_through_to_the_default_renderer() {
    let (surface, renderer) = render(Media::Prepress, "preface", "Preface");

    assert_eq!(renderer.default_titles, vec!["s1".to_string()]);
    assert!(surface.moves().is_empty());
    assert_eq!(surface.texts(), vec![(1, "Preface".to_string())]);
}

#[test]
fn underline_has_one_glyph_per_character() {
    assert_eq!(decorative_underline(""), "");
    assert_eq!(decorative_underline("A"), UNDERLINE_GLYPH.to_string());

    let title = "Über café";
    let underline = decorative_underline(title);
    assert_eq!(underline.chars().count(), title.chars().count());
    assert!(underline.chars().all(|c| c == '\u{2764}'));
}
