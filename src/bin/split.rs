use clap::Parser;
use linegap::{
    CosmicTextSurface, FixedAdvanceSurface, LineFragment, LineSplitter, Marker, RenderContext,
    TextSurface,
};
use std::path::PathBuf;

/// Print where a paragraph wraps, one visual line per output line
#[derive(Parser, Debug)]
#[command(name = "linegap-split")]
#[command(version)]
#[command(about = "Split text into the lines it renders as at a given width", long_about = None)]
struct Args {
    /// Input text file (use "-" for stdin)
    #[arg(value_name = "INPUT", default_value = "-")]
    input: PathBuf,

    /// Block width in pixels
    #[arg(short, long)]
    width: f32,

    #[arg(long, default_value_t = 16.0)]
    font_size: f32,

    /// Defaults to 1.5 times the font size
    #[arg(long)]
    line_height: Option<f32>,

    #[arg(long, default_value = "sans-serif")]
    font_family: String,

    /// Blank this word out before splitting, may be repeated
    #[arg(short, long, value_name = "WORD")]
    marker: Vec<String>,

    /// Measure with a fixed per-char advance instead of real fonts
    #[arg(long)]
    fixed_advance: bool,

    /// Extra font directory, may be repeated
    #[arg(long, value_name = "DIR")]
    fonts: Vec<PathBuf>,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let source = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };
    // a trailing newline from the shell would become an empty last line
    let source = source.strip_suffix('\n').unwrap_or(&source);

    let ctx = RenderContext {
        font_family: args.font_family.clone(),
        font_size: args.font_size,
        line_height: args.line_height.unwrap_or(args.font_size * 1.5),
        width: args.width,
        ..RenderContext::default()
    };

    let markers: Vec<Marker> = args
        .marker
        .iter()
        .enumerate()
        .map(|(index, name)| Marker::new(index, name.as_str()))
        .collect();

    let lines = if args.fixed_advance {
        split_with(&mut FixedAdvanceSurface::default(), source, &markers, &ctx)
    } else {
        let mut surface = CosmicTextSurface::new();
        for dir in &args.fonts {
            surface.load_fonts_dir(dir);
        }
        split_with(&mut surface, source, &markers, &ctx)
    };

    for line in &lines {
        println!("|{}|", line.text);
    }

    Ok(())
}

fn split_with<S: TextSurface>(
    surface: &mut S,
    source: &str,
    markers: &[Marker],
    ctx: &RenderContext,
) -> Vec<LineFragment> {
    LineSplitter::new(surface).split(source, markers, ctx)
}
