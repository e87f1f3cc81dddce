//! Per-tick update logic of the widget: picking up finished art downloads,
//! polling the player, and reacting to clicks on the theme toggle. Drawing
//! lives in [`crate::render`].

use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};

use eframe::egui::Pos2;
use tracing::{debug, info, warn};

use crate::{
    art::ArtFetcher,
    layout::ToggleButton,
    media::{MediaProvider, TrackInfo},
    state::DisplayState,
    theme::Theme,
};

/// Turns a downloaded file into a render-ready handle. Called on the render
/// thread only.
pub trait ImageLoader {
    type Handle;

    fn load(&mut self, path: &Path) -> anyhow::Result<Self::Handle>;
}

pub struct Tuner<H> {
    provider: Box<dyn MediaProvider>,
    fetcher: ArtFetcher,
    state: DisplayState<H>,
    probe_interval: Duration,
    last_probe: Option<Instant>,
    /// Art URL of a track that changed while another download was running.
    deferred_art: Option<String>,
}

impl<H> Tuner<H> {
    pub fn new(
        provider: Box<dyn MediaProvider>,
        fetcher: ArtFetcher,
        theme: Theme,
        probe_interval: Duration,
    ) -> Self {
        Self {
            provider,
            fetcher,
            state: DisplayState::new(theme),
            probe_interval,
            last_probe: None,
            deferred_art: None,
        }
    }

    pub fn state(&self) -> &DisplayState<H> {
        &self.state
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetcher.in_flight()
    }

    pub fn set_provider(&mut self, provider: Box<dyn MediaProvider>) {
        self.provider = provider;
    }

    pub fn set_probe_interval(&mut self, interval: Duration) {
        self.probe_interval = interval;
    }

    /// Takes the result of a finished download, if any, and swaps it into the
    /// display state. Returns whether the album image changed.
    pub fn adopt_pending<L>(&mut self, loader: &mut L) -> bool
    where
        L: ImageLoader<Handle = H>,
    {
        let Some(outcome) = self.fetcher.poll() else {
            return false;
        };

        let changed = match outcome {
            Ok(Some(path)) => {
                self.state.release_image();
                match loader.load(&path) {
                    Ok(handle) => self.state.adopt_image(Some(handle)),
                    Err(err) => warn!("Failed to load album art {}: {err:#}", path.display()),
                }
                if let Err(err) = fs::remove_file(&path) {
                    debug!("Failed to remove {}: {err}", path.display());
                }
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!("Failed to download album art: {err}");
                false
            }
        };

        if let Some(url) = self.deferred_art.take() {
            if url != self.state.track().art_url {
                self.request_art(url);
            }
        }

        changed
    }

    /// Probes the player when no probe has run yet or the last one is older
    /// than the probe interval. Returns whether a probe ran.
    pub fn maybe_probe(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_probe {
            if now.saturating_duration_since(last) <= self.probe_interval {
                return false;
            }
        }

        let track = self.provider.probe();
        self.last_probe = Some(now);
        self.apply_track(track);
        true
    }

    /// Flips the theme when `pressed` and the pointer is on the toggle.
    /// Returns whether the theme changed.
    pub fn handle_click(
        &mut self,
        toggle: &ToggleButton,
        pointer: Option<Pos2>,
        pressed: bool,
    ) -> bool {
        if !pressed {
            return false;
        }
        match pointer {
            Some(pos) if toggle.contains(pos) => {
                let theme = self.state.toggle_theme();
                info!(?theme, "theme toggled");
                true
            }
            _ => false,
        }
    }

    pub fn release_image(&mut self) {
        self.state.release_image();
    }

    fn apply_track(&mut self, track: TrackInfo) {
        if !track.is_different_track(self.state.track()) {
            return;
        }

        info!(artist = %track.artist, title = %track.title, "now playing");
        self.state.set_track(&track);
        self.deferred_art = None;

        if track.art_url.is_empty() || track.art_url == self.state.track().art_url {
            return;
        }
        self.request_art(track.art_url);
    }

    fn request_art(&mut self, url: String) {
        if self.fetcher.dispatch(url.clone()) {
            debug!(%url, "fetching album art");
            self.state.set_art_url(&url);
        } else {
            debug!(%url, "album art deferred until the running download finishes");
            self.deferred_art = Some(url);
        }
    }
}
