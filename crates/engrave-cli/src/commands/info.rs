//! `engrave info`

use anyhow::Result;
use engrave_core::{EffectPreset, RecipeKind};
use engrave_fontdb::FontLibrary;

use crate::cli::InfoArgs;

pub fn run(args: &InfoArgs) -> Result<()> {
    let show_all = !args.recipes && !args.presets && !args.fonts;

    println!("engrave v{}", env!("CARGO_PKG_VERSION"));

    if show_all || args.recipes {
        println!();
        println!("Recipes:");
        for recipe in RecipeKind::ALL {
            println!("  {:<10} - {}", recipe.as_str(), describe_recipe(recipe));
        }
    }

    if show_all || args.presets {
        println!();
        println!("Presets:");
        for preset in EffectPreset::ALL {
            let config = preset.config();
            println!(
                "  {:<10} - {}x{} canvas, {} text, contour {}",
                preset.as_str(),
                config.canvas.width,
                config.canvas.height,
                config.recipe,
                if config.contour.is_some() { "on" } else { "off" }
            );
        }
    }

    if show_all || args.fonts {
        println!();
        let library = FontLibrary::with_system_fonts();
        let families = library.families();
        println!("Font families ({} faces):", library.face_count());
        if families.is_empty() {
            println!("  (none found)");
        }
        for family in families {
            println!("  {}", family);
        }
    }

    Ok(())
}

fn describe_recipe(recipe: RecipeKind) -> &'static str {
    match recipe {
        RecipeKind::Engraved => "gradient stroke with a shadow clipped inside the glyphs",
        RecipeKind::Relief => "faint glyphs over a heavy unclipped shadow",
        RecipeKind::Outlined => "white glyphs with a thin blue outline",
    }
}
