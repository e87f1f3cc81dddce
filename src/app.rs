use std::{
    fs,
    io::Cursor,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use eframe::egui::{self, ColorImage, LayerId, PointerButton, TextureHandle, TextureOptions};
use tracing::{debug, info, warn};

use crate::{
    art::{ArtFetcher, HttpArtSource},
    config::{Config, ConfigWatcher},
    layout::PanelLayout,
    media::PlayerctlProvider,
    render::{paint_panel, PanelContent},
    theme::Theme,
    tuner::{ImageLoader, Tuner},
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub fn decode_album_art(bytes: &[u8]) -> anyhow::Result<ColorImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Unable to determine album art format")?;
    let image = reader.decode().context("Failed to decode album art")?;
    let image = image.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    let pixels = image.into_raw();
    Ok(ColorImage::from_rgba_unmultiplied(size, &pixels))
}

/// Uploads album art into egui's texture manager.
pub struct TextureLoader<'a> {
    ctx: &'a egui::Context,
}

impl<'a> TextureLoader<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl ImageLoader for TextureLoader<'_> {
    type Handle = TextureHandle;

    fn load(&mut self, path: &Path) -> anyhow::Result<TextureHandle> {
        let data = fs::read(path)
            .with_context(|| format!("Unable to open album art: {}", path.display()))?;
        let image = decode_album_art(&data)?;
        Ok(self
            .ctx
            .load_texture("tuner.album_art", image, TextureOptions::LINEAR))
    }
}

pub struct TunerApp {
    tuner: Tuner<TextureHandle>,
    provider: PlayerctlProvider,
    config: Config,
    config_watcher: Option<ConfigWatcher>,
    started: Instant,
}

impl TunerApp {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let fetcher = ArtFetcher::new(Arc::new(HttpArtSource::new()))
            .context("Failed to start the album art runtime")?;
        let provider = PlayerctlProvider::from_config(&config.probe);
        let tuner = Tuner::new(
            Box::new(provider.clone()),
            fetcher,
            Theme::from_dark_mode(config.ui.dark_mode),
            config.probe.interval(),
        );

        let mut app = Self {
            tuner,
            provider,
            config,
            config_watcher: None,
            started: Instant::now(),
        };
        app.maintain_config_watcher();
        Ok(app)
    }

    fn maintain_config_watcher(&mut self) {
        let wanted = if self.config.ui.hot_reload {
            self.config.source.clone()
        } else {
            None
        };

        let stale = self
            .config_watcher
            .as_ref()
            .is_some_and(|watcher| wanted.as_deref() != Some(watcher.path()));
        if stale {
            self.config_watcher = None;
        }
        if self.config_watcher.is_some() {
            return;
        }
        let Some(path) = wanted else {
            return;
        };

        match ConfigWatcher::watch(&path) {
            Ok(watcher) => {
                debug!("watching {}", path.display());
                self.config_watcher = Some(watcher);
            }
            Err(err) => {
                warn!("Failed to watch {}: {err:#}", path.display());
                self.config.ui.hot_reload = false;
            }
        }
    }

    fn poll_config_reload(&mut self) {
        let Some(result) = self.config_watcher.as_ref().and_then(|w| w.poll()) else {
            return;
        };

        match result {
            Ok(config) => {
                info!("config reloaded");
                self.apply_config(config);
            }
            Err(err) => warn!("Failed to reload config: {err:#}"),
        }
        self.maintain_config_watcher();
    }

    /// Window size and the initial theme only take effect on restart.
    fn apply_config(&mut self, config: Config) {
        if !self.provider.matches_config(&config.probe) {
            self.provider = PlayerctlProvider::from_config(&config.probe);
            self.tuner.set_provider(Box::new(self.provider.clone()));
        }
        self.tuner.set_probe_interval(config.probe.interval());
        self.config.probe = config.probe;
        self.config.ui.title_max_chars = config.ui.title_max_chars;
        self.config.ui.artist_max_chars = config.ui.artist_max_chars;
        self.config.ui.hot_reload = config.ui.hot_reload;
        self.config.source = config.source;
    }
}

impl eframe::App for TunerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_config_reload();

        self.tuner.adopt_pending(&mut TextureLoader::new(ctx));
        self.tuner.maybe_probe(Instant::now());

        let layout = PanelLayout::for_window(ctx.screen_rect());
        let (pointer, pressed) = ctx.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.button_pressed(PointerButton::Primary),
            )
        });
        let hovered = pointer.is_some_and(|pos| layout.toggle.contains(pos));
        self.tuner.handle_click(&layout.toggle, pointer, pressed);

        let state = self.tuner.state();
        let content = PanelContent {
            track: state.track(),
            album: state.album_image(),
            theme: state.theme(),
            elapsed_secs: self.started.elapsed().as_secs_f32(),
            toggle_hovered: hovered,
            title_max_chars: self.config.ui.title_max_chars,
            artist_max_chars: self.config.ui.artist_max_chars,
        };
        let painter = ctx.layer_painter(LayerId::background());
        paint_panel(&painter, &layout, &content);

        ctx.request_repaint_after(FRAME_INTERVAL);
    }
}

impl Drop for TunerApp {
    fn drop(&mut self) {
        self.tuner.release_image();
        debug!("album art released");
    }
}
