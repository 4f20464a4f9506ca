//! `gradient-studio` command-line tool.
//!
//! Usage:
//!   gradient-studio random [--kind mesh|linear|radial] [--seed N] [-o out.json]
//!   gradient-studio render <description.json|-> [--preset 4k | --width W --height H]
//!                          [--format png|jpeg|webp] [--quality Q] [--seed N] [-o out.png]
//!   gradient-studio presets
//!   gradient-studio compare <a.png> <b.png> [--max-mean-diff D]

mod logging;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gradient_studio::compare::compare_surfaces;
use gradient_studio::export::{DEFAULT_PRESET, DEFAULT_QUALITY};
use gradient_studio::{
    export_image_with, preset, random_gradient, random_gradient_with, ExportFormat, ExportOptions, Gradient,
    GradientKind, RenderOptions, Surface, PRESETS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::logging::{init_logging, LoggingConfig};

#[derive(Debug, Parser)]
#[command(name = "gradient-studio", version, about = "Render mesh, linear and radial gradients")]
struct Cli {
    /// Debug logging for the renderer.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a random gradient description as JSON.
    Random {
        #[arg(short, long, default_value = "mesh")]
        kind: GradientKind,
        /// Seed for a reproducible result.
        #[arg(long)]
        seed: Option<u64>,
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a JSON description to an image file.
    Render {
        /// Description file, or `-` for stdin.
        input: String,
        /// Output size by preset slug (see `presets`).
        #[arg(short, long, conflicts_with_all = ["width", "height"])]
        preset: Option<String>,
        #[arg(long, requires = "height")]
        width: Option<u32>,
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Defaults to the output file's extension, else png.
        #[arg(short, long)]
        format: Option<ExportFormat>,
        #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
        quality: f64,
        /// Noise seed for a reproducible render.
        #[arg(long)]
        seed: Option<u64>,
        /// Output path; defaults to a timestamped name in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List export presets.
    Presets,
    /// Compare two images of the same size.
    Compare {
        a: PathBuf,
        b: PathBuf,
        /// Fail if the mean channel difference exceeds this.
        #[arg(long)]
        max_mean_diff: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Command::Random { kind, seed, output } => cmd_random(kind, seed, output.as_deref()),
        Command::Render {
            input,
            preset,
            width,
            height,
            format,
            quality,
            seed,
            output,
        } => {
            let (w, h) = output_size(preset.as_deref(), width, height)?;
            let format = match format {
                Some(f) => f,
                None => format_from_path(output.as_deref()).unwrap_or_default(),
            };
            let options = ExportOptions { format, quality };
            cmd_render(&input, w, h, &options, seed, output)
        }
        Command::Presets => {
            cmd_presets();
            Ok(())
        }
        Command::Compare { a, b, max_mean_diff } => cmd_compare(&a, &b, max_mean_diff),
    }
}

fn cmd_random(kind: GradientKind, seed: Option<u64>, output: Option<&Path>) -> Result<()> {
    let gradient = match seed {
        Some(seed) => random_gradient_with(kind, &mut StdRng::seed_from_u64(seed)),
        None => random_gradient(kind),
    };
    let json = gradient.to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {} description to {}", kind, path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_render(
    input: &str,
    width: u32,
    height: u32,
    options: &ExportOptions,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let gradient = read_description(input)?;
    let render_options = RenderOptions {
        noise_seed: seed,
        ..RenderOptions::default()
    };
    let image = pollster::block_on(export_image_with(&gradient, width, height, options, &render_options))
        .with_context(|| format!("exporting {width}x{height} {}", options.format))?;
    let path = output.unwrap_or_else(|| PathBuf::from(image.suggested_filename()));
    fs::write(&path, &image.bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("{} ({}, {} bytes)", path.display(), image.mime_type(), image.bytes.len());
    Ok(())
}

fn cmd_presets() {
    for p in PRESETS {
        let marker = if p == DEFAULT_PRESET { " (default)" } else { "" };
        println!("{:<10} {:<12} {}x{}{}", p.slug, p.label, p.width, p.height, marker);
    }
}

fn cmd_compare(a: &Path, b: &Path, max_mean_diff: Option<f64>) -> Result<()> {
    let sa = load_surface(a)?;
    let sb = load_surface(b)?;
    let Some(result) = compare_surfaces(&sa, &sb) else {
        bail!(
            "size mismatch: {}x{} vs {}x{}",
            sa.width(),
            sa.height(),
            sb.width(),
            sb.height()
        );
    };
    println!("{result}");
    if let Some(limit) = max_mean_diff {
        if result.mean_channel_diff > limit {
            bail!("mean channel difference {:.4} exceeds {limit}", result.mean_channel_diff);
        }
    }
    Ok(())
}

fn read_description(input: &str) -> Result<Gradient> {
    let json = if input == "-" {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s).context("reading stdin")?;
        s
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {input}"))?
    };
    Ok(Gradient::from_json(&json)?)
}

fn load_surface(path: &Path) -> Result<Surface> {
    let img = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Surface::from_rgba(w, h, img.into_raw()).with_context(|| format!("{} has no pixels", path.display()))
}

fn output_size(preset_slug: Option<&str>, width: Option<u32>, height: Option<u32>) -> Result<(u32, u32)> {
    if let (Some(w), Some(h)) = (width, height) {
        return Ok((w, h));
    }
    let p = match preset_slug {
        Some(slug) => match preset(slug) {
            Some(p) => p,
            None => {
                let known: Vec<&str> = PRESETS.iter().map(|p| p.slug).collect();
                bail!("unknown preset {slug:?} (expected one of {})", known.join(", "));
            }
        },
        None => DEFAULT_PRESET,
    };
    Ok((p.width, p.height))
}

fn format_from_path(path: Option<&Path>) -> Option<ExportFormat> {
    path?.extension()?.to_str()?.parse().ok()
}
