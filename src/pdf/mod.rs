mod default;
mod layout;
mod surface;

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::error::Error;
use crate::fonts::{FaceKey, FontSet, RegisteredFont, register_face};
use crate::model::{Alignment, Document, Media, Run};
use crate::pagination::{PaginationContext, TocRequest, chapter, render_section};
use crate::surface::{Color, Pass, Surface, TextStyle};
use crate::theme::{PageGeometry, Theme};

pub use default::DefaultRenderer;
use surface::{DrawOp, Page, PageSurface};

const TITLE_PAGE_DROP: f32 = 200.0;
const TITLE_SIZE: f32 = 32.0;
const AUTHOR_SIZE: f32 = 16.0;

/// Host settings for one render. `None` fields keep what the book declares.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub theme: Theme,
    pub media: Option<Media>,
    pub toc: Option<bool>,
    pub toc_levels: Option<u8>,
    pub front_matter_pages: u32,
    /// Look up the display typeface in system font directories.
    pub system_fonts: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            media: None,
            toc: None,
            toc_levels: None,
            front_matter_pages: 0,
            system_fonts: true,
        }
    }
}

/// Where things landed in the rendered output.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    pub page_count: u32,
    /// Table-of-contents pages reported by the measurement pass, relative to the anchor.
    pub measured_toc_pages: Option<RangeInclusive<u32>>,
    /// Table-of-contents pages actually drawn by the render pass.
    pub toc_pages: Option<RangeInclusive<u32>>,
    /// Attached sections in document order with their start page.
    pub section_pages: Vec<(String, u32)>,
    /// Id and page of the colophon relocated ahead of the table of contents.
    pub colophon: Option<(String, u32)>,
}

pub struct Rendered {
    pub pdf: Vec<u8>,
    pub summary: RenderSummary,
}

/// Paginate the book twice (measurement, then render) and write the result as PDF.
/// The measurement pass may detach the colophon from `doc`.
pub fn render(doc: &mut Document, options: &RenderOptions) -> Result<Rendered, Error> {
    let t0 = std::time::Instant::now();
    if let Some(media) = options.media {
        doc.media = media;
    }
    if let Some(toc) = options.toc {
        doc.toc = toc;
    }
    if let Some(levels) = options.toc_levels {
        doc.toc_levels = levels;
    }
    let theme = &options.theme;
    let fonts = if options.system_fonts {
        FontSet::load(&theme.display_font)
    } else {
        FontSet::standard()
    };
    let t_fonts = t0.elapsed();

    let mut ctx = PaginationContext::new();

    let mut scratch = PageSurface::scratch(&fonts, theme.page);
    let mut measurer = DefaultRenderer::new(theme);
    let measured = run_pass(
        Pass::Measurement,
        &mut scratch,
        &mut measurer,
        doc,
        &mut ctx,
        options,
        None,
    );
    let t_measure = t0.elapsed();

    let mut surface = PageSurface::new(&fonts, theme.page);
    let mut renderer = DefaultRenderer::new(theme);
    let drawn = run_pass(
        Pass::Render,
        &mut surface,
        &mut renderer,
        doc,
        &mut ctx,
        options,
        measured.as_ref(),
    );
    let t_render = t0.elapsed();

    if scratch.page_count() != surface.page_count() {
        log::warn!(
            "measurement pass produced {} pages, render pass {}",
            scratch.page_count(),
            surface.page_count()
        );
    }

    let summary = RenderSummary {
        page_count: surface.page_count(),
        measured_toc_pages: measured,
        toc_pages: drawn,
        section_pages: doc
            .walk()
            .into_iter()
            .filter_map(|id| {
                renderer
                    .section_page(id)
                    .map(|page| (doc.section(id).id.clone(), page))
            })
            .collect(),
        colophon: ctx.colophon().and_then(|id| {
            renderer
                .section_page(id)
                .map(|page| (doc.section(id).id.clone(), page))
        }),
    };

    let pdf = write_pdf(&surface.into_pages(), &fonts, theme.page)?;
    let t_write = t0.elapsed();

    log::info!(
        "Render phases: fonts={:.1}ms, measure={:.1}ms, render={:.1}ms, assembly={:.1}ms ({} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_measure - t_fonts).as_secs_f64() * 1000.0,
        (t_render - t_measure).as_secs_f64() * 1000.0,
        (t_write - t_render).as_secs_f64() * 1000.0,
        summary.page_count,
    );

    Ok(Rendered { pdf, summary })
}

/// One pass over the book: title page, table of contents, body. The render pass only
/// reserves the table-of-contents pages up front and fills them once the body has told
/// it where every section starts.
fn run_pass(
    pass: Pass,
    surface: &mut dyn Surface,
    renderer: &mut DefaultRenderer,
    doc: &mut Document,
    ctx: &mut PaginationContext,
    options: &RenderOptions,
    measured: Option<&RangeInclusive<u32>>,
) -> Option<RangeInclusive<u32>> {
    let theme = &options.theme;
    render_title_page(surface, doc, theme);

    let mut request = None;
    let mut toc_pages = None;
    if doc.toc {
        chapter::start_page(surface, doc, false);
        let toc = TocRequest {
            levels: doc.toc_levels,
            anchor_page: surface.page_number(),
            front_matter_pages: options.front_matter_pages,
        };
        match pass {
            Pass::Measurement => {
                toc_pages = Some(
                    ctx.layout_table_of_contents(pass, surface, renderer, doc, theme, toc),
                );
            }
            Pass::Render => {
                let reserved = match measured {
                    Some(range) => ctx.reserved_toc_pages(doc, range),
                    None => 1,
                };
                for _ in 1..reserved {
                    surface.start_new_page();
                }
            }
        }
        surface.start_new_page();
        request = Some(toc);
    }

    let chapters = doc.children(None).to_vec();
    for section in chapters {
        chapter::start_section(surface, doc, section);
        render_section(surface, renderer, doc, section, theme);
    }

    if let (Pass::Render, Some(toc)) = (pass, request) {
        toc_pages = Some(ctx.layout_table_of_contents(
            pass, surface, renderer, doc, theme, toc,
        ));
    }
    toc_pages
}

/// Page 1 is always the title page, even when the book has no title.
fn render_title_page(surface: &mut dyn Surface, doc: &Document, theme: &Theme) {
    surface.go_to_page(1);
    if !doc.title.is_empty() {
        draw_title_block(surface, doc, theme);
    }
    surface.start_new_page();
}

fn draw_title_block(surface: &mut dyn Surface, doc: &Document, theme: &Theme) {
    surface.move_down(TITLE_PAGE_DROP);
    let title_style = TextStyle {
        size: TITLE_SIZE,
        align: Alignment::Center,
        ..TextStyle::heading(theme, 1)
    };
    surface.typeset(&[Run::plain(doc.title.as_str())], &title_style);
    if let Some(author) = &doc.author {
        surface.move_down(AUTHOR_SIZE);
        let author_style = TextStyle {
            size: AUTHOR_SIZE,
            align: Alignment::Center,
            ..TextStyle::body(theme)
        };
        surface.typeset(&[Run::plain(author.as_str())], &author_style);
    }
}

fn set_fill(content: &mut Content, color: Option<Color>) {
    match color {
        None => {}
        Some(Color::Rgb([r, g, b])) => {
            content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        }
        Some(Color::Cmyk([c, m, y, k])) => {
            content.set_fill_cmyk(
                c as f32 / 100.0,
                m as f32 / 100.0,
                y as f32 / 100.0,
                k as f32 / 100.0,
            );
        }
    }
}

fn write_pdf(pages: &[Page], fonts: &FontSet, geometry: PageGeometry) -> Result<Vec<u8>, Error> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let mut used_chars: HashMap<FaceKey, HashSet<char>> = HashMap::new();
    for op in pages.iter().flat_map(|p| p.ops.iter()) {
        if let DrawOp::Text { face, text, .. } = op {
            used_chars.entry(*face).or_default().extend(text.chars());
        }
    }
    // an empty book still gets one font so every page has resources
    used_chars.entry(FaceKey::Regular).or_default().insert(' ');

    let mut registered: HashMap<FaceKey, RegisteredFont> = HashMap::new();
    for key in FaceKey::ALL {
        if let Some(chars) = used_chars.get(&key) {
            let font = register_face(&mut pdf, fonts.face(key), chars, &mut alloc);
            registered.insert(key, font);
        }
    }

    let mut contents: Vec<Content> = Vec::with_capacity(pages.len());
    for page in pages {
        let mut content = Content::new();
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    face,
                    size,
                    x,
                    y,
                    text,
                    color,
                } => {
                    let font = registered
                        .get(face)
                        .ok_or_else(|| Error::Pdf(format!("font {face:?} not registered")))?;
                    let bytes = font.encode(text);
                    content.save_state();
                    set_fill(&mut content, *color);
                    content
                        .begin_text()
                        .set_font(Name(face.pdf_name().as_bytes()), *size)
                        .next_line(*x, *y)
                        .show(Str(&bytes))
                        .end_text();
                    content.restore_state();
                }
                DrawOp::ResetColors => {
                    content.set_fill_gray(0.0);
                    content.set_stroke_gray(0.0);
                }
            }
        }
        contents.push(content);
    }

    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let font_pairs: Vec<(&'static str, Ref)> = FaceKey::ALL
        .into_iter()
        .filter_map(|key| registered.get(&key).map(|f| (key.pdf_name(), f.font_ref)))
        .collect();

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut fonts_dict = resources.fonts();
        for (name, font_ref) in &font_pairs {
            fonts_dict.pair(Name(name.as_bytes()), *font_ref);
        }
    }

    Ok(pdf.finish())
}
