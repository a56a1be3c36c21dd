//! Command-line definitions (clap derive)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use engrave_core::{EffectPreset, RecipeKind};

/// engrave - engraved text and glyph-silhouette stickers from the command line
#[derive(Parser, Debug)]
#[command(name = "engrave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log every stage at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one text to a PNG file
    #[command(alias = "r")]
    Render(Box<RenderArgs>),

    /// Render every job of a JSONL file through one session
    Batch(BatchArgs),

    /// List recipes, presets and font families
    #[command(alias = "i")]
    Info(InfoArgs),
}

/// Settings shared by `render` and `batch`
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Effect preset: engraved, sticker
    #[arg(short = 'p', long = "preset", default_value = "engraved")]
    pub preset: EffectPreset,

    /// JSON config file; replaces the preset
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Text recipe: engraved, relief, outlined
    #[arg(short = 'r', long = "recipe")]
    pub recipe: Option<RecipeKind>,

    /// Silhouette sampling step in pixels
    #[arg(long = "stride")]
    pub stride: Option<u32>,

    /// Canvas width in pixels
    #[arg(long = "canvas-width")]
    pub canvas_width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long = "canvas-height")]
    pub canvas_height: Option<u32>,

    /// Extra font file to make available (repeatable)
    #[arg(short = 'f', long = "font-file")]
    pub font_files: Vec<PathBuf>,

    /// How long to wait for the background of each pass, in milliseconds
    #[arg(long = "wait-ms", default_value_t = 5000)]
    pub wait_ms: u64,

    /// Disable the decoded background cache
    #[arg(long = "no-image-cache")]
    pub no_image_cache: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Text to draw
    pub text: String,

    /// Font family name or generic family (serif, sans-serif, monospace)
    #[arg(short = 'F', long = "font-family", default_value = "Georgia")]
    pub font_family: String,

    /// Font size in pixels, clamped to the configured range
    #[arg(short = 's', long = "font-size", default_value_t = 100.0)]
    pub font_size: f32,

    /// Background image: file path, data: URI or URL
    #[arg(short = 'b', long = "background")]
    pub background: Option<String>,

    /// Output PNG path
    #[arg(short = 'o', long = "output", default_value = "engrave.png")]
    pub output: PathBuf,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSONL file, one job per line
    pub input: PathBuf,

    /// Directory the images are written to
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Filename for jobs without an `output`, `{}` is the job number
    #[arg(long = "pattern", default_value = "engrave_{}.png")]
    pub pattern: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// List text recipes
    #[arg(long)]
    pub recipes: bool,

    /// List effect presets
    #[arg(long)]
    pub presets: bool,

    /// List font families found on this system
    #[arg(long)]
    pub fonts: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults() {
        let cli = Cli::try_parse_from(["engrave", "render", "abc"]).unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.text, "abc");
        assert_eq!(args.font_family, "Georgia");
        assert_eq!(args.font_size, 100.0);
        assert_eq!(args.output, PathBuf::from("engrave.png"));
        assert_eq!(args.session.preset, EffectPreset::Engraved);
        assert_eq!(args.session.wait_ms, 5000);
        assert!(args.session.recipe.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn render_with_every_flag() {
        let cli = Cli::try_parse_from([
            "engrave",
            "-v",
            "render",
            "Hi",
            "--font-family",
            "serif",
            "--font-size",
            "180",
            "--background",
            "wood.jpg",
            "--preset",
            "sticker",
            "--recipe",
            "relief",
            "--stride",
            "3",
            "--canvas-width",
            "640",
            "--canvas-height",
            "480",
            "--font-file",
            "a.ttf",
            "--font-file",
            "b.otf",
            "--wait-ms",
            "250",
            "-o",
            "out.png",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.background.as_deref(), Some("wood.jpg"));
        assert_eq!(args.session.preset, EffectPreset::Sticker);
        assert_eq!(args.session.recipe, Some(RecipeKind::Relief));
        assert_eq!(args.session.stride, Some(3));
        assert_eq!(
            (args.session.canvas_width, args.session.canvas_height),
            (Some(640), Some(480))
        );
        assert_eq!(args.session.font_files.len(), 2);
        assert_eq!(args.session.wait_ms, 250);
    }

    #[test]
    fn unknown_recipe_is_rejected() {
        assert!(Cli::try_parse_from(["engrave", "render", "abc", "--recipe", "glitter"]).is_err());
    }

    #[test]
    fn batch_needs_an_input() {
        assert!(Cli::try_parse_from(["engrave", "batch"]).is_err());
        let cli = Cli::try_parse_from(["engrave", "batch", "jobs.jsonl", "-o", "out"]).unwrap();
        let Commands::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.pattern, "engrave_{}.png");
    }

    #[test]
    fn info_flags() {
        let cli = Cli::try_parse_from(["engrave", "info", "--recipes"]).unwrap();
        let Commands::Info(args) = cli.command else {
            panic!("expected info");
        };
        assert!(args.recipes && !args.presets && !args.fonts);
    }
}
