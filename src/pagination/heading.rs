use crate::model::{Alignment, Document, Media, Run, SectionId, plain_text};
use crate::surface::{SectionRenderer, Surface, TextStyle, Typeface};
use crate::theme::Theme;

pub const ACCENT_HEADING_SIZE: f32 = 30.0;
pub const UNDERLINE_GLYPH: char = '\u{2764}';

const HEADING_TOP_OFFSET: f32 = 100.0;
const HEADING_RAISE: f32 = 5.0;
const HEADING_BOTTOM_OFFSET: f32 = 20.0;

#[derive(Clone, Copy, Debug)]
enum RoleMatch {
    AnyOf(&'static [&'static str]),
    Exact(&'static str),
    Contains(&'static str),
}

impl RoleMatch {
    fn matches(self, role: &str) -> bool {
        match self {
            RoleMatch::AnyOf(roles) => roles.contains(&role),
            RoleMatch::Exact(r) => role == r,
            RoleMatch::Contains(needle) => role.contains(needle),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingTreatment {
    /// Centered accent-coloured title for front and back matter.
    Accent,
    /// Title pushed far down the page at body size.
    Colophon,
    /// Display-face title, right aligned, alone on its page.
    Chapter,
    Default,
}

// Evaluated top to bottom; first match wins.
const RULES: &[(RoleMatch, HeadingTreatment)] = &[
    (
        RoleMatch::AnyOf(&[
            "about-the-author",
            "readers-feedback",
            "acknowledgements",
            "dedication",
        ]),
        HeadingTreatment::Accent,
    ),
    (RoleMatch::Exact("colophon"), HeadingTreatment::Colophon),
    (RoleMatch::Contains("chapter"), HeadingTreatment::Chapter),
];

pub fn treatment_for(role: &str) -> HeadingTreatment {
    RULES
        .iter()
        .find(|(rule, _)| rule.matches(role))
        .map(|&(_, treatment)| treatment)
        .unwrap_or(HeadingTreatment::Default)
}

impl HeadingTreatment {
    /// Vertical space taken before the heading block.
    pub fn pre_offset(self, media: Media) -> f32 {
        match (self, media.is_duplex()) {
            (HeadingTreatment::Colophon, true) => 325.0,
            (HeadingTreatment::Colophon, false) => 460.0,
            (HeadingTreatment::Chapter, true) => 120.0,
            (HeadingTreatment::Chapter, false) => 180.0,
            _ => 0.0,
        }
    }
}

pub fn render_title(
    surface: &mut dyn Surface,
    renderer: &mut dyn SectionRenderer,
    doc: &Document,
    section: SectionId,
    title: &[Run],
    theme: &Theme,
) {
    let sect = doc.section(section);
    let treatment = treatment_for(&sect.role);
    log::debug!(
        "heading '{}' (role {}) on page {}: {treatment:?}",
        sect.id,
        sect.role,
        surface.page_number()
    );

    match treatment {
        HeadingTreatment::Accent => {
            let style = TextStyle {
                align: Alignment::Center,
                color: Some(theme.accent_color),
                bold: false,
                size: ACCENT_HEADING_SIZE,
                ..TextStyle::heading(theme, sect.level)
            };
            render_heading_text(surface, title, &style);
        }
        HeadingTreatment::Colophon => {
            surface.move_down(treatment.pre_offset(doc.media));
            let style = TextStyle {
                size: theme.base_font_size,
                ..TextStyle::heading(theme, sect.level)
            };
            render_heading_text(surface, title, &style);
        }
        HeadingTreatment::Chapter => {
            surface.move_down(treatment.pre_offset(doc.media));
            let style = TextStyle {
                typeface: Typeface::Display,
                align: Alignment::Right,
                color: Some(theme.accent_color),
                bold: false,
                size: ACCENT_HEADING_SIZE,
                ..TextStyle::heading(theme, sect.level)
            };
            render_heading_text(surface, title, &style);
            surface.move_past_bottom();
        }
        HeadingTreatment::Default => renderer.render_title(surface, doc, section),
    }
}

/// Typeset a heading block: 100 down, the title, 5 back up, 20 down.
pub fn render_heading_text(surface: &mut dyn Surface, title: &[Run], style: &TextStyle) {
    surface.move_down(HEADING_TOP_OFFSET);
    surface.typeset(title, style);
    surface.move_up(HEADING_RAISE);
    // ornament is built but not drawn
    let underline = decorative_underline(&plain_text(title));
    log::trace!("heading ornament of {} glyphs not drawn", underline.chars().count());
    surface.move_down(HEADING_BOTTOM_OFFSET);
}

/// One ornament glyph per title character.
pub fn decorative_underline(title: &str) -> String {
    title.chars().map(|_| UNDERLINE_GLYPH).collect()
}
