mod book;
mod error;
mod fonts;
pub mod model;
pub mod pagination;
mod pdf;
pub mod surface;
pub mod theme;

pub use book::{parse as parse_book_file, parse_str as parse_book};
pub use error::Error;
pub use pdf::{DefaultRenderer, RenderOptions, RenderSummary, Rendered, render as render_document};

use std::path::Path;
use std::time::Instant;

pub fn convert_book_to_pdf(
    input: &Path,
    output: &Path,
    options: &RenderOptions,
) -> Result<RenderSummary, Error> {
    let t0 = Instant::now();
    let mut doc = book::parse(input)?;
    write_rendered(&mut doc, output, options, t0)
}

pub fn convert_book_bytes_to_pdf(
    input: &[u8],
    output: &Path,
    options: &RenderOptions,
) -> Result<RenderSummary, Error> {
    let t0 = Instant::now();
    let mut doc = book::parse_bytes(input)?;
    write_rendered(&mut doc, output, options, t0)
}

fn write_rendered(
    doc: &mut model::Document,
    output: &Path,
    options: &RenderOptions,
    t0: Instant,
) -> Result<RenderSummary, Error> {
    let t_parse = t0.elapsed();

    let rendered = pdf::render(doc, options)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &rendered.pdf).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        rendered.pdf.len(),
    );

    Ok(rendered.summary)
}
