//! Background images: fetching, decoding, and loading off the render thread
//!
//! A load is started for one pass and reports back over a channel. The job
//! gives up before fetching or decoding once its pass has been superseded,
//! and the session drops any completion that arrives for an old pass.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use base64::Engine;
use image::imageops::{self, FilterType};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tiny_skia::Pixmap;

use engrave_core::{
    config::CanvasSize,
    error::{BackgroundError, Result},
    traits::ImageSource,
    BackgroundRef, EngraveError, PassId, PassToken,
};
use engrave_render_skia::rgba_to_pixmap;

/// A decoded background, already stretched to the canvas
#[derive(Clone)]
pub struct BackgroundImage {
    pixmap: Pixmap,
}

impl BackgroundImage {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

impl std::fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BackgroundImage({}x{})", self.width(), self.height())
    }
}

/// Decodes PNG or JPEG bytes and scales them to fill `canvas`
///
/// Aspect ratio is not preserved; the image covers the canvas exactly.
pub fn decode_background(bytes: &[u8], canvas: CanvasSize) -> Result<BackgroundImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| BackgroundError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let scaled = if rgba.dimensions() == (canvas.width, canvas.height) {
        rgba
    } else {
        imageops::resize(&rgba, canvas.width, canvas.height, FilterType::Triangle)
    };
    let pixmap = rgba_to_pixmap(canvas.width, canvas.height, scaled.as_raw())?;
    Ok(BackgroundImage::from_pixmap(pixmap))
}

/// Resolves file paths and `data:` URIs
///
/// Network URLs are reported as unsupported; the session then draws the
/// pass without a background.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImageSource;

impl LocalImageSource {
    pub fn new() -> Self {
        Self
    }
}

impl ImageSource for LocalImageSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn fetch(&self, reference: &BackgroundRef) -> Result<Vec<u8>> {
        match reference {
            BackgroundRef::Path(path) => std::fs::read(path).map_err(|e| {
                BackgroundError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            BackgroundRef::DataUri(uri) => decode_data_uri(uri),
            BackgroundRef::Url(url) => Err(BackgroundError::Unsupported(url.clone()).into()),
        }
    }
}

/// Decodes `data:[<mediatype>][;base64],<payload>`
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| BackgroundError::InvalidDataUri("missing 'data:' prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BackgroundError::InvalidDataUri("missing comma".into()))?;

    let is_base64 = header.split(';').any(|part| part.eq_ignore_ascii_case("base64"));
    if is_base64 {
        // Whitespace is allowed inside wrapped base64 payloads
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| BackgroundError::InvalidDataUri(format!("invalid base64: {e}")).into())
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(input: &str) -> Result<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|pair| std::str::from_utf8(pair).ok())
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| BackgroundError::InvalidDataUri("bad percent-escape".into()))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}

/// What a finished load reports back
#[derive(Debug)]
pub struct LoadCompletion {
    pub pass: PassId,
    pub reference: BackgroundRef,
    pub result: Result<Arc<BackgroundImage>>,
}

/// Runs background loads on a small dedicated pool
pub struct BackgroundLoader {
    source: Arc<dyn ImageSource>,
    pool: ThreadPool,
    sender: Sender<LoadCompletion>,
}

impl BackgroundLoader {
    /// Creates the loader and the receiving end of its completion channel
    pub fn new(
        source: Arc<dyn ImageSource>,
        workers: usize,
    ) -> Result<(Self, Receiver<LoadCompletion>)> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("engrave-bg-{i}"))
            .build()
            .map_err(|e| EngraveError::Other(format!("background pool: {e}")))?;
        let (sender, receiver) = mpsc::channel();
        Ok((
            Self {
                source,
                pool,
                sender,
            },
            receiver,
        ))
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub(crate) fn sender(&self) -> &Sender<LoadCompletion> {
        &self.sender
    }

    /// Starts loading `reference` for the pass behind `token`
    pub fn spawn(&self, token: PassToken, reference: BackgroundRef, canvas: CanvasSize) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        log::debug!("Background: {} requested by {}", reference.describe(), token.id());

        self.pool.spawn(move || {
            let result = load(source.as_ref(), &token, &reference, canvas).map(Arc::new);
            // A closed channel means the session is gone
            let _ = sender.send(LoadCompletion {
                pass: token.id(),
                reference,
                result,
            });
        });
    }
}

fn load(
    source: &dyn ImageSource,
    token: &PassToken,
    reference: &BackgroundRef,
    canvas: CanvasSize,
) -> Result<BackgroundImage> {
    if token.is_stale() {
        return Err(BackgroundError::Superseded(token.id()).into());
    }
    let bytes = source.fetch(reference)?;
    if token.is_stale() {
        log::debug!("Background: {} superseded before decoding", token.id());
        return Err(BackgroundError::Superseded(token.id()).into());
    }
    decode_background(&bytes, canvas)
}
