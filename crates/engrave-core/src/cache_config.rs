//! Process-wide switch for the decoded-background cache
//!
//! Two inputs decide whether decoded backgrounds may be reused across passes:
//!
//! - `ENGRAVE_IMAGE_CACHE`, read on first use. `0`, `false`, `no` or `off`
//!   disables the cache; anything else, or no variable, leaves it on.
//! - A runtime override, which wins over the environment until
//!   [`clear_override`] hands control back to it.
//!
//! Each session's own `ImageCacheConfig::enabled` flag is checked as well;
//! both must allow caching.
//!
//! ```
//! use engrave_core::cache_config;
//!
//! cache_config::set_image_cache_enabled(false);
//! assert!(!cache_config::is_image_cache_enabled());
//! cache_config::clear_override();
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

const NO_OVERRIDE: u8 = 0;
const FORCED_ON: u8 = 1;
const FORCED_OFF: u8 = 2;

static OVERRIDE: AtomicU8 = AtomicU8::new(NO_OVERRIDE);

static ENV_DEFAULT: OnceLock<bool> = OnceLock::new();

/// False only for the recognised off values
fn parse_toggle(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn env_default() -> bool {
    *ENV_DEFAULT.get_or_init(|| match std::env::var("ENGRAVE_IMAGE_CACHE") {
        Ok(value) => {
            let enabled = parse_toggle(&value);
            if !enabled {
                log::info!("Background image cache disabled via ENGRAVE_IMAGE_CACHE");
            }
            enabled
        },
        Err(_) => true,
    })
}

/// Whether decoded backgrounds may be reused across passes
pub fn is_image_cache_enabled() -> bool {
    match OVERRIDE.load(Ordering::Acquire) {
        FORCED_ON => true,
        FORCED_OFF => false,
        _ => env_default(),
    }
}

/// Forces the cache on or off regardless of the environment
pub fn set_image_cache_enabled(enabled: bool) {
    let state = if enabled { FORCED_ON } else { FORCED_OFF };
    OVERRIDE.store(state, Ordering::Release);
    log::debug!(
        "Background image cache forced {}",
        if enabled { "on" } else { "off" }
    );
}

/// Drops a runtime override; the environment setting applies again
pub fn clear_override() {
    OVERRIDE.store(NO_OVERRIDE, Ordering::Release);
}
