use crate::{media::TrackInfo, theme::Theme};

/// Everything the panel shows. Owned and mutated by the render loop only.
///
/// `H` is the render layer's image handle; dropping it releases the image.
#[derive(Debug)]
pub struct DisplayState<H> {
    track: TrackInfo,
    album_image: Option<H>,
    theme: Theme,
}

impl<H> DisplayState<H> {
    pub fn new(theme: Theme) -> Self {
        Self {
            track: TrackInfo::default(),
            album_image: None,
            theme,
        }
    }

    pub fn track(&self) -> &TrackInfo {
        &self.track
    }

    /// Stores the artist and title of `track`. The cached art URL only moves
    /// when a download for it is dispatched, see [`DisplayState::set_art_url`].
    pub fn set_track(&mut self, track: &TrackInfo) {
        self.track.artist = track.artist.clone();
        self.track.title = track.title.clone();
    }

    pub fn set_art_url(&mut self, url: &str) {
        self.track.art_url = url.to_string();
    }

    pub fn album_image(&self) -> Option<&H> {
        self.album_image.as_ref()
    }

    /// Replaces the album image. The previous handle is released before the
    /// new one is stored.
    pub fn adopt_image(&mut self, image: Option<H>) {
        drop(self.album_image.take());
        self.album_image = image;
    }

    pub fn release_image(&mut self) {
        self.adopt_image(None);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    struct Handle {
        id: u32,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Drop for Handle {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("release {}", self.id));
        }
    }

    #[test]
    fn previous_image_is_released_before_replacement() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut state = DisplayState::new(Theme::Dark);

        state.adopt_image(Some(Handle {
            id: 1,
            log: log.clone(),
        }));
        assert!(log.borrow().is_empty());

        let second = Handle {
            id: 2,
            log: log.clone(),
        };
        state.adopt_image(Some(second));
        assert_eq!(*log.borrow(), vec!["release 1"]);
        assert_eq!(state.album_image().map(|h| h.id), Some(2));

        state.release_image();
        assert_eq!(*log.borrow(), vec!["release 1", "release 2"]);
        assert!(state.album_image().is_none());

        state.release_image();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn set_track_keeps_the_cached_art_url() {
        let mut state: DisplayState<()> = DisplayState::new(Theme::Light);
        state.set_art_url("http://x/old.jpg");
        state.set_track(&TrackInfo::new("A", "B", "http://x/new.jpg"));

        assert_eq!(state.track(), &TrackInfo::new("A", "B", "http://x/old.jpg"));
    }

    #[test]
    fn toggle_theme_flips_and_reports() {
        let mut state: DisplayState<()> = DisplayState::new(Theme::Dark);
        assert_eq!(state.toggle_theme(), Theme::Light);
        assert_eq!(state.theme(), Theme::Light);
    }
}
