//! End-to-end session behavior with synthetic glyphs and image sources

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use engrave_composite::EffectSession;
use engrave_core::{
    config::{CanvasSize, ContourStyle, EffectConfig, RecipeKind},
    error::{BackgroundError, Result},
    traits::{ImageSource, Rasterizer},
    types::InkMask,
    BackgroundRef, EffectParameters, EffectPreset, RasterRequest, TextSpec,
};
use engrave_render_skia::Outliner;
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_skia::{Path, PathBuilder, Rect};

const WAIT: Duration = Duration::from_secs(10);

/// Every string becomes a square the size of the font at the origin
struct BlockOutliner;

impl Outliner for BlockOutliner {
    fn outline(&self, spec: &TextSpec) -> Result<Option<Path>> {
        if spec.text.is_empty() {
            return Ok(None);
        }
        let rect = Rect::from_xywh(spec.origin.x, spec.origin.y, spec.font_size, spec.font_size);
        Ok(rect.map(PathBuilder::from_rect))
    }
}

/// Serves fixed bytes per reference; gated references block until released
#[derive(Default)]
struct TestSource {
    images: HashMap<BackgroundRef, Vec<u8>>,
    gates: HashMap<BackgroundRef, Mutex<Receiver<()>>>,
    fetched: Option<Mutex<Sender<BackgroundRef>>>,
}

impl TestSource {
    fn with_image(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(BackgroundRef::parse(name), bytes);
        self
    }

    fn with_gate(mut self, name: &str) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.gates.insert(BackgroundRef::parse(name), Mutex::new(rx));
        (self, tx)
    }

    fn reporting(mut self) -> (Self, Receiver<BackgroundRef>) {
        let (tx, rx) = mpsc::channel();
        self.fetched = Some(Mutex::new(tx));
        (self, rx)
    }
}

impl ImageSource for TestSource {
    fn name(&self) -> &'static str {
        "test"
    }

    fn fetch(&self, reference: &BackgroundRef) -> Result<Vec<u8>> {
        if let Some(gate) = self.gates.get(reference) {
            let _ = gate.lock().unwrap().recv();
        }
        let bytes = self
            .images
            .get(reference)
            .cloned()
            .ok_or_else(|| BackgroundError::Read {
                path: reference.describe(),
                reason: "not in test source".into(),
            });
        if let Some(fetched) = &self.fetched {
            let _ = fetched.lock().unwrap().send(reference.clone());
        }
        Ok(bytes?)
    }
}

/// Reports one ink pixel no matter what is asked
struct DotRasterizer;

impl Rasterizer for DotRasterizer {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn rasterize(&self, request: &RasterRequest) -> Result<InkMask> {
        let mut coverage = vec![0u8; (request.width * request.height) as usize];
        coverage[0] = 255;
        InkMask::from_coverage(request.width, request.height, coverage)
    }
}

fn png(color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(16, 12, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn sticker_config() -> EffectConfig {
    let mut config = EffectConfig::from_preset(EffectPreset::Sticker);
    config.canvas = CanvasSize {
        width: 400,
        height: 400,
    };
    config
}

fn session_with(config: EffectConfig, source: TestSource) -> EffectSession {
    EffectSession::builder()
        .config(config)
        .outliner(Arc::new(BlockOutliner))
        .image_source(Arc::new(source))
        .build()
        .unwrap()
}

fn params(text: &str, background: Option<&str>) -> EffectParameters {
    let params = EffectParameters::new(text, "Georgia", 100.0);
    match background {
        Some(name) => params.with_background(BackgroundRef::parse(name)),
        None => params,
    }
}

#[test]
fn test_background_arrives_after_initial_composite() {
    let (source, release) = TestSource::default()
        .with_image("red.png", png([200, 0, 0, 255]))
        .with_gate("red.png");
    let mut session = session_with(sticker_config(), source);

    let pass = session.begin_pass(&params("abc", Some("red.png"))).unwrap();
    let initial = session.composite().unwrap().clone();
    assert_eq!(initial.pass, pass);
    assert_eq!(initial.pixel(390, 390), Some([0, 0, 0, 0]));
    assert!(session.is_background_pending());

    release.send(()).unwrap();
    assert!(session.wait_for_background(WAIT));
    let redrawn = session.composite().unwrap();
    assert_eq!(redrawn.pass, pass);
    assert_eq!(redrawn.pixel(390, 390), Some([200, 0, 0, 255]));
}

#[test]
fn test_layers_stack_background_contour_text() {
    let source = TestSource::default().with_image("red.png", png([200, 0, 0, 255]));
    let mut session = session_with(sticker_config(), source);
    let image = session
        .render(&params("abc", Some("red.png")), WAIT)
        .unwrap();

    // Text square spans (100..200, 200..300); the silhouette is inset to
    // (110..200, 210..300) and its 60px stroke reaches 30px past that
    let background = image.pixel(390, 390).unwrap();
    let contour = image.pixel(90, 250).unwrap();
    let text = image.pixel(150, 250).unwrap();

    assert_eq!(background, [200, 0, 0, 255]);
    assert!(contour[1] > 0 && contour[2] > 0, "contour over red: {:?}", contour);
    assert!(text[1] > contour[1], "text above contour: {:?} vs {:?}", text, contour);
    assert!(text[0] > 200 && text[1] > 200, "text is near white: {:?}", text);
}

#[test]
fn test_late_background_from_superseded_pass_is_never_drawn() {
    let (source, release_a) = TestSource::default()
        .with_image("a.png", png([255, 0, 0, 255]))
        .with_image("b.png", png([0, 0, 255, 255]))
        .with_gate("a.png");
    let (source, fetched) = source.reporting();
    let mut session = session_with(sticker_config(), source);

    let pass_a = session.begin_pass(&params("abc", Some("a.png"))).unwrap();
    let pass_b = session.begin_pass(&params("xyz", Some("b.png"))).unwrap();
    assert!(pass_b > pass_a);

    assert!(session.wait_for_background(WAIT));
    assert_eq!(session.composite().unwrap().pixel(390, 390), Some([0, 0, 255, 255]));

    // Let A finish now, after B
    release_a.send(()).unwrap();
    let mut seen = Vec::new();
    while seen.len() < 2 {
        seen.push(fetched.recv_timeout(WAIT).unwrap());
    }
    std::thread::sleep(Duration::from_millis(100));

    assert!(!session.poll());
    let image = session.composite().unwrap();
    assert_eq!(image.pass, pass_b);
    assert_eq!(image.pixel(390, 390), Some([0, 0, 255, 255]));
}

#[test]
fn test_repeated_pass_with_cached_background_is_identical() {
    let source = TestSource::default().with_image("red.png", png([200, 0, 0, 255]));
    let mut session = session_with(sticker_config(), source);
    let p = params("abc", Some("red.png"));

    let first = session.render(&p, WAIT).unwrap();
    session.begin_pass(&p).unwrap();
    assert!(!session.is_background_pending(), "second pass hits the cache");
    let second = session.take_composite().unwrap();

    assert_ne!(first.pass, second.pass);
    assert_eq!(first.data, second.data);
}

#[test]
fn test_undecodable_background_is_omitted() {
    let source = TestSource::default().with_image("broken.png", b"definitely not a png".to_vec());
    let mut session = session_with(sticker_config(), source);

    let pass = session.begin_pass(&params("abc", Some("broken.png"))).unwrap();
    assert!(!session.wait_for_background(WAIT));
    assert!(!session.is_background_pending());

    let image = session.composite().unwrap();
    assert_eq!(image.pass, pass);
    assert_eq!(image.pixel(390, 390), Some([0, 0, 0, 0]));
    assert!(image.pixel(150, 250).unwrap()[3] > 0, "text still drawn");
    assert!(session.cache().is_empty());
}

#[test]
fn test_url_background_is_unsupported() {
    let mut session = EffectSession::builder()
        .config(sticker_config())
        .outliner(Arc::new(BlockOutliner))
        .build()
        .unwrap();
    let image = session
        .render(&params("abc", Some("https://example.com/metal.jpg")), WAIT)
        .unwrap();
    assert_eq!(image.pixel(390, 390), Some([0, 0, 0, 0]));
    assert!(image.pixel(150, 250).unwrap()[3] > 0);
}

#[test]
fn test_single_point_silhouette_skips_the_contour() {
    let mut session = EffectSession::builder()
        .config(sticker_config())
        .outliner(Arc::new(BlockOutliner))
        .rasterizer(Arc::new(DotRasterizer))
        .build()
        .unwrap();
    let image = session.render(&params("abc", None), WAIT).unwrap();

    // A drawn [p, p] polygon would put a 60px round dot at the corner
    assert_eq!(image.pixel(5, 5), Some([0, 0, 0, 0]));
    assert!(image.pixel(150, 250).unwrap()[3] > 0);
}

#[test]
fn test_empty_text_keeps_only_the_background() {
    let source = TestSource::default().with_image("red.png", png([200, 0, 0, 255]));
    let mut session = session_with(sticker_config(), source);
    let image = session.render(&params("", Some("red.png")), WAIT).unwrap();
    assert!(image
        .data
        .chunks_exact(4)
        .all(|px| px == [200, 0, 0, 255]));
}

#[test]
fn test_font_size_is_clamped_before_drawing() {
    let mut config = sticker_config();
    config.contour = None;
    config.recipe = RecipeKind::Outlined;
    let mut session = session_with(config, TestSource::default());

    let tiny = EffectParameters::new("abc", "Georgia", 10.0);
    let image = session.render(&tiny, WAIT).unwrap();
    // Clamped to 100: the square still reaches (195, 295)
    assert!(image.pixel(195, 295).unwrap()[3] > 0);
    assert_eq!(image.pixel(205, 305), Some([0, 0, 0, 0]));
}

#[test]
fn test_contour_opacity_override_is_clamped() {
    let mut config = sticker_config();
    config.contour = Some(ContourStyle {
        opacity: 0.05,
        ..ContourStyle::default()
    });
    let mut session = session_with(config, TestSource::default());
    let image = session.render(&params("abc", None), WAIT).unwrap();

    // Raised to 0.3 at least: alpha of the contour-only region is about 77
    let px = image.pixel(90, 250).unwrap();
    assert!((70..=80).contains(&px[3]), "{:?}", px);
}
