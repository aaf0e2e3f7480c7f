use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bookpress::RenderOptions;
use bookpress::model::Media;

#[derive(Parser)]
#[command(name = "bookpress")]
#[command(version, about = "Paginate an XML book into a print-ready PDF", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookpress book.xml book.pdf                     Render with the media declared in the book
    bookpress --media prepress book.xml book.pdf    Duplex output, chapters start on recto pages")]
struct Cli {
    /// Input book (XML)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PDF (defaults to INPUT with a .pdf extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Override the book's media attribute
    #[arg(long, value_parser = ["screen", "print", "prepress"])]
    media: Option<String>,

    /// Section depth listed in the table of contents
    #[arg(long)]
    toc_levels: Option<u8>,

    /// Pages subtracted from physical page numbers shown in the table of contents
    #[arg(long, default_value_t = 0)]
    front_matter_pages: u32,

    /// Font family for chapter headings
    #[arg(long)]
    display_font: Option<String>,

    /// Skip the table of contents (the colophon then stays where it is)
    #[arg(long)]
    no_toc: bool,

    /// Don't search system font directories; use Helvetica throughout
    #[arg(long)]
    no_system_fonts: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut options = RenderOptions {
        media: cli.media.as_deref().map(Media::parse),
        toc: cli.no_toc.then_some(false),
        toc_levels: cli.toc_levels,
        front_matter_pages: cli.front_matter_pages,
        system_fonts: !cli.no_system_fonts,
        ..RenderOptions::default()
    };
    if let Some(family) = cli.display_font {
        options.theme.display_font = family;
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("pdf"));

    match bookpress::convert_book_to_pdf(&cli.input, &output, &options) {
        Ok(summary) => {
            log::info!(
                "{} → {} ({} pages)",
                cli.input.display(),
                output.display(),
                summary.page_count
            );
            if let Some((id, page)) = &summary.colophon {
                log::info!("colophon '{id}' placed on page {page}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
