//! `engrave render`

use anyhow::{Context, Result};
use engrave_core::{BackgroundRef, EffectParameters};
use engrave_export::{write_to_file, PngExporter};

use crate::cli::RenderArgs;

pub fn run(args: &RenderArgs) -> Result<()> {
    let (mut session, wait) = super::session(&args.session)?;

    let mut params = EffectParameters::new(&args.text, &args.font_family, args.font_size);
    if let Some(background) = &args.background {
        params = params.with_background(BackgroundRef::parse(background));
    }

    let image = session.render(&params, wait).context("rendering")?;
    write_to_file(&PngExporter::new(), &image, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "Rendered \"{}\" to {} ({}x{})",
        args.text,
        args.output.display(),
        image.width,
        image.height
    );
    Ok(())
}
