use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use linegap::svg::{Preview, PreviewOptions};
use linegap::{CosmicTextSurface, FixedAdvanceSurface, LayoutPass, LayoutReport, Page, TextSurface};
use resvg::usvg;
use std::path::{Path, PathBuf};
use tiny_skia::{Pixmap, Transform};

/// Lay a paragraph out, split it per visual line and align its labels
#[derive(Parser, Debug)]
#[command(name = "linegap")]
#[command(version)]
#[command(about = "Split a paragraph into its rendered lines and align labels with marker gaps", long_about = None)]
struct Args {
    /// Page file (TOML or YAML); a built-in page is used when omitted
    #[arg(value_name = "PAGE_FILE")]
    page_file: Option<PathBuf>,

    /// Built-in page to lay out when no page file is given
    #[arg(short, long, default_value = "about")]
    page: String,

    /// Viewport width in pixels, selects the desktop or mobile profile
    #[arg(long, default_value_t = 1280.0)]
    viewport: f32,

    /// Output file (extension determines format: .svg, .png, .pdf or .json).
    /// The JSON report goes to stdout when omitted.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Extra font directory, may be repeated
    #[arg(long, value_name = "DIR")]
    fonts: Vec<PathBuf>,

    /// Measure with a fixed per-char advance instead of real fonts
    #[arg(long)]
    fixed_advance: bool,

    /// Char advance as a fraction of the font size for --fixed-advance
    #[arg(long, default_value_t = 0.6)]
    em_ratio: f32,

    /// Outline the located gaps in the preview
    #[arg(long)]
    debug_gaps: bool,

    /// Draw labels where they start instead of where they settle
    #[arg(long)]
    at_rest: bool,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// List the built-in pages and exit
    #[arg(long)]
    list_pages: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "linegap", &mut std::io::stdout());
        return Ok(());
    }

    if args.list_pages {
        for name in Page::list_builtins() {
            println!("{}", name);
        }
        return Ok(());
    }

    let page = load_page(&args)?;
    let fonts = font_dirs(&args.fonts);

    let report = if args.fixed_advance {
        let mut surface = FixedAdvanceSurface::new(args.em_ratio);
        run_pass(&mut surface, &page, args.viewport)?
    } else {
        let mut surface = CosmicTextSurface::new();
        for dir in &fonts {
            surface.load_fonts_dir(dir);
        }
        run_pass(&mut surface, &page, args.viewport)?
    };

    log::info!("motion settles after {:.2}s", report.motion.settle_time());

    let Some(output) = args.output.as_ref() else {
        let json = report
            .to_json()
            .map_err(|e| format!("Failed to encode report: {}", e))?;
        println!("{}", json);
        return Ok(());
    };

    let output_ext = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    let svg = Preview::new(
        &report,
        PreviewOptions {
            debug_gaps: args.debug_gaps,
            labels_at_rest: args.at_rest,
        },
    )
    .render();

    match output_ext.as_str() {
        "json" => {
            let json = report
                .to_json()
                .map_err(|e| format!("Failed to encode report: {}", e))?;
            std::fs::write(output, json).map_err(|e| format!("Failed to write JSON: {}", e))?;
            eprintln!("Report saved to: {}", output.display());
        }
        "svg" => {
            std::fs::write(output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale, &fonts)?;
            std::fs::write(output, png_data).map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg, &fonts)?;
            std::fs::write(output, pdf_data).map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png, .pdf or .json)",
                output_ext
            ));
        }
    }

    Ok(())
}

fn load_page(args: &Args) -> Result<Page, String> {
    let Some(ref page_path) = args.page_file else {
        return Page::from_builtin(&args.page).map_err(|e| e.to_string());
    };

    if !page_path.is_file() {
        return Err(format!("Page file not found: {}", page_path.display()));
    }

    Page::from_path(page_path)
        .map_err(|e| format!("Failed to load page file {}: {}", page_path.display(), e))
}

fn run_pass<S: TextSurface>(surface: &mut S, page: &Page, viewport: f32) -> Result<LayoutReport, String> {
    LayoutPass::new(surface)
        .run(page, viewport)
        .map_err(|e| format!("Layout failed: {}", e))
}

/// Load system fonts plus the user's directories and point the generic
/// families at something that exists. Works on any `fontdb::Database`.
macro_rules! prepare_fontdb {
    ($db:expr, $dirs:expr) => {{
        let db = $db;
        db.load_system_fonts();
        for dir in $dirs {
            db.load_fonts_dir(dir);
        }

        let mut sans_family: Option<String> = None;
        let mut serif_family: Option<String> = None;
        let mut first_family: Option<String> = None;
        for face in db.faces() {
            for (family, _) in &face.families {
                if first_family.is_none() {
                    first_family = Some(family.clone());
                }
                let lower = family.to_ascii_lowercase();
                if sans_family.is_none() && lower.contains("sans") {
                    sans_family = Some(family.clone());
                }
                if serif_family.is_none() && lower.contains("serif") && !lower.contains("sans") {
                    serif_family = Some(family.clone());
                }
            }
        }

        if let Some(family) = sans_family.as_deref().or(first_family.as_deref()) {
            db.set_sans_serif_family(family);
        }
        if let Some(family) = serif_family.as_deref().or(first_family.as_deref()) {
            db.set_serif_family(family);
        }
    }};
}

fn svg_to_png(svg: &str, scale: f32, font_dirs: &[PathBuf]) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    prepare_fontdb!(opts.fontdb_mut(), font_dirs.iter().map(PathBuf::as_path));

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or("Failed to create pixmap")?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str, font_dirs: &[PathBuf]) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    prepare_fontdb!(&mut fontdb, font_dirs.iter().map(PathBuf::as_path));

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(fontdb);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Text as paths, so viewers without the fonts still show it
    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

/// `./fonts` when present, then every `--fonts` directory
fn font_dirs(extra: &[PathBuf]) -> Vec<PathBuf> {
    let local_fonts = Path::new("fonts");
    let mut dirs = Vec::with_capacity(extra.len() + 1);
    if local_fonts.is_dir() {
        dirs.push(local_fonts.to_path_buf());
    }
    dirs.extend(extra.iter().cloned());
    dirs
}
