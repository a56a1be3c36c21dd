//! Render sessions: one pass at a time, late backgrounds merged in place
//!
//! ```text
//! begin_pass(params) ──► text outline ─────────────────────────┐
//!      │                silhouette ► sample ► trace ► contour ─┤► flatten ► CompositeImage
//!      │                cached background ─────────────────────┘      ▲
//!      └─► (not cached) BackgroundLoader ══ channel ══► poll() ───────┘
//! ```
//!
//! Starting a pass supersedes the previous one immediately. Completions
//! carry the pass that asked for them; anything not for the current pass
//! is dropped without touching the canvas.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use engrave_contour::{ContourBuilder, SilhouetteSampler};
use engrave_core::{
    error::Result,
    traits::{ImageSource, Rasterizer},
    types::CompositeImage,
    BackgroundRef, EffectConfig, EffectParameters, EngraveError, PassId, PassToken, PassTracker,
};
use engrave_render_skia::{recipe_for, Outliner, SkiaRasterizer, TextRecipe};

use crate::{
    background::{BackgroundLoader, LoadCompletion, LocalImageSource},
    cache::{ImageCache, ImageCacheKey},
    compositor::{ContourLayer, LayerCompositor, LayerStack, TextLayer},
};

/// Two workers so one slow source cannot hold up the next pass's load
const DEFAULT_LOADER_THREADS: usize = 2;

struct ActivePass {
    token: PassToken,
    stack: LayerStack,
    composite: Option<CompositeImage>,
    pending: Option<BackgroundRef>,
}

/// Drives render passes for one output surface
pub struct EffectSession {
    config: EffectConfig,
    rasterizer: Arc<dyn Rasterizer>,
    outliner: Arc<dyn Outliner>,
    compositor: LayerCompositor,
    sampler: SilhouetteSampler,
    builder: ContourBuilder,
    loader: BackgroundLoader,
    completions: Receiver<LoadCompletion>,
    cache: Arc<ImageCache>,
    tracker: PassTracker,
    active: Option<ActivePass>,
}

impl EffectSession {
    pub fn builder() -> EffectSessionBuilder {
        EffectSessionBuilder::new()
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub fn current_pass(&self) -> Option<PassId> {
        self.tracker.current()
    }

    /// Whether the current pass still expects its background
    pub fn is_background_pending(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|pass| pass.pending.is_some())
    }

    /// Starts a new pass and produces its initial composite
    ///
    /// The composite is available immediately; if the background was not
    /// cached it arrives later through [`poll`](Self::poll) or
    /// [`wait_for_background`](Self::wait_for_background).
    pub fn begin_pass(&mut self, params: &EffectParameters) -> Result<PassId> {
        let token = self.tracker.begin();
        let pass = token.id();
        let started = Instant::now();
        log::info!(
            "Session: {} started for {:?} ({} {}px)",
            pass,
            params.text,
            params.font_family,
            params.font_size
        );

        let mut stack = LayerStack {
            text: self.text_layer(params),
            contour: self.contour_layer(params),
            background: None,
        };

        let mut pending = None;
        if let Some(reference) = &params.background {
            let key = self.cache_key(reference);
            if let Some(image) = self.cache.get(&key) {
                log::debug!("Session: {} background served from cache", pass);
                stack.background = Some(image);
            } else {
                self.loader
                    .spawn(token.clone(), reference.clone(), self.config.canvas);
                pending = Some(reference.clone());
            }
        }

        let composite = self.compositor.flatten(&stack, pass)?;
        self.active = Some(ActivePass {
            token,
            stack,
            composite: Some(composite),
            pending,
        });

        log::info!(
            "Session: {} composed in {:.1}ms{}",
            pass,
            started.elapsed().as_secs_f64() * 1000.0,
            if self.is_background_pending() {
                ", background pending"
            } else {
                ""
            }
        );
        Ok(pass)
    }

    /// Applies any finished loads; true when the composite was redrawn
    pub fn poll(&mut self) -> bool {
        let mut redrawn = false;
        while let Ok(completion) = self.completions.try_recv() {
            redrawn |= self.apply(completion);
        }
        redrawn
    }

    /// Blocks until the current pass's background is settled or `timeout`
    /// passes; true when it was drawn
    pub fn wait_for_background(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut redrawn = self.poll();
        while self.is_background_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => redrawn |= self.apply(completion),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("Session: background still loading after {:?}", timeout);
                    break;
                },
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        redrawn
    }

    /// The current pass's latest composite
    pub fn composite(&self) -> Option<&CompositeImage> {
        self.active.as_ref().and_then(|pass| pass.composite.as_ref())
    }

    /// Hands the latest composite to the caller
    ///
    /// A background arriving afterwards produces a fresh composite.
    pub fn take_composite(&mut self) -> Option<CompositeImage> {
        self.active.as_mut().and_then(|pass| pass.composite.take())
    }

    /// One-shot render: begin a pass, wait up to `wait` for its background
    pub fn render(&mut self, params: &EffectParameters, wait: Duration) -> Result<CompositeImage> {
        self.begin_pass(params)?;
        if self.is_background_pending() {
            self.wait_for_background(wait);
        }
        self.take_composite()
            .ok_or_else(|| EngraveError::Other("composite already taken".into()))
    }

    fn apply(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion {
            pass,
            reference,
            result,
        } = completion;

        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !self.tracker.is_current(pass)
            || active.token.id() != pass
            || active.pending.as_ref() != Some(&reference)
        {
            log::debug!("Session: dropping background for stale {}", pass);
            return false;
        }
        active.pending = None;

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                log::warn!(
                    "Session: background {} omitted: {}",
                    reference.describe(),
                    e
                );
                return false;
            },
        };

        self.cache.insert(self.cache_key(&reference), Arc::clone(&image));
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.stack.background = Some(image);
        match self.compositor.flatten(&active.stack, pass) {
            Ok(composite) => {
                active.composite = Some(composite);
                log::info!("Session: {} redrawn with background", pass);
                true
            },
            Err(e) => {
                log::warn!("Session: {} redraw failed: {}", pass, e);
                false
            },
        }
    }

    fn cache_key(&self, reference: &BackgroundRef) -> ImageCacheKey {
        ImageCacheKey::new(
            reference.clone(),
            self.config.canvas.width,
            self.config.canvas.height,
        )
    }

    fn text_layer(&self, params: &EffectParameters) -> Option<TextLayer> {
        let spec = self.config.text_spec(params);
        match self.outliner.outline(&spec) {
            Ok(Some(glyphs)) => Some(TextLayer { glyphs, spec }),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Session: text layer skipped: {}", e);
                None
            },
        }
    }

    fn contour_layer(&self, params: &EffectParameters) -> Option<ContourLayer> {
        let style = self.config.contour?;
        let request = self.config.silhouette_request(params);

        let mask = match self.rasterizer.rasterize(&request) {
            Ok(mask) => mask,
            Err(e) => {
                log::warn!("Session: contour skipped, silhouette failed: {}", e);
                return None;
            },
        };
        let points = self.sampler.sample(&mask, self.config.stride);
        let polygon = self.builder.build(&points);
        if polygon.is_degenerate() {
            log::debug!(
                "Session: {} sample points, contour has no area",
                points.len()
            );
            return None;
        }

        Some(ContourLayer {
            polygon,
            style,
            font_size: self.config.font_size.clamp(params.font_size),
        })
    }
}

/// Assembles a session; only the outliner is required
pub struct EffectSessionBuilder {
    config: EffectConfig,
    outliner: Option<Arc<dyn Outliner>>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    image_source: Option<Arc<dyn ImageSource>>,
    recipe: Option<Box<dyn TextRecipe>>,
    cache: Option<Arc<ImageCache>>,
    loader_threads: usize,
}

impl EffectSessionBuilder {
    pub fn new() -> Self {
        Self {
            config: EffectConfig::default(),
            outliner: None,
            rasterizer: None,
            image_source: None,
            recipe: None,
            cache: None,
            loader_threads: DEFAULT_LOADER_THREADS,
        }
    }

    pub fn config(mut self, config: EffectConfig) -> Self {
        self.config = config;
        self
    }

    /// Who turns text into glyph paths, for both text and silhouette
    pub fn outliner(mut self, outliner: Arc<dyn Outliner>) -> Self {
        self.outliner = Some(outliner);
        self
    }

    /// Replace the silhouette rasterizer (default: tiny-skia over the outliner)
    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Where backgrounds come from (default: [`LocalImageSource`])
    pub fn image_source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.image_source = Some(source);
        self
    }

    /// Override the recipe named in the config
    pub fn recipe(mut self, recipe: Box<dyn TextRecipe>) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Share a background cache across sessions
    pub fn with_image_cache(mut self, cache: Arc<ImageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn loader_threads(mut self, threads: usize) -> Self {
        self.loader_threads = threads;
        self
    }

    pub fn build(self) -> Result<EffectSession> {
        let config = self.config;
        if config.canvas.width == 0 || config.canvas.height == 0 {
            return Err(EngraveError::Config(format!(
                "canvas must be non-empty, got {}x{}",
                config.canvas.width, config.canvas.height
            )));
        }

        let outliner = self
            .outliner
            .ok_or_else(|| EngraveError::Config("No outliner configured".into()))?;
        let rasterizer = self
            .rasterizer
            .unwrap_or_else(|| Arc::new(SkiaRasterizer::new(Arc::clone(&outliner))));
        let source = self
            .image_source
            .unwrap_or_else(|| Arc::new(LocalImageSource::new()));
        let recipe = self.recipe.unwrap_or_else(|| recipe_for(config.recipe));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(ImageCache::new(&config.image_cache)));
        let (loader, completions) = BackgroundLoader::new(source, self.loader_threads)?;

        log::debug!(
            "Session: {}x{} canvas, recipe {}, contour {}, rasterizer {}, source {}",
            config.canvas.width,
            config.canvas.height,
            recipe.name(),
            if config.contour.is_some() { "on" } else { "off" },
            rasterizer.name(),
            loader.source_name()
        );

        Ok(EffectSession {
            compositor: LayerCompositor::new(config.canvas, recipe),
            config,
            rasterizer,
            outliner,
            sampler: SilhouetteSampler::new(),
            builder: ContourBuilder::new(),
            loader,
            completions,
            cache,
            tracker: PassTracker::new(),
            active: None,
        })
    }
}

impl Default for EffectSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
