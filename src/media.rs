use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::config::ProbeConfig;

pub const FALLBACK_ARTIST: &str = "Unknown";
pub const FALLBACK_TITLE: &str = "No media playing";

/// Metadata of the track the player reports. Compared by value only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub artist: String,
    pub title: String,
    pub art_url: String,
}

impl TrackInfo {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        art_url: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            art_url: art_url.into(),
        }
    }

    /// What a probe yields when the player cannot be queried.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ARTIST, FALLBACK_TITLE, "")
    }

    /// True when artist or title differ. The art URL is not part of a track's
    /// identity.
    pub fn is_different_track(&self, other: &TrackInfo) -> bool {
        self.artist != other.artist || self.title != other.title
    }
}

/// Source of now-playing metadata. Implementations never fail outward; an
/// unreachable player is reported as [`TrackInfo::fallback`].
pub trait MediaProvider {
    fn probe(&self) -> TrackInfo;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
    },
}

#[derive(Clone, Copy, Debug)]
enum MetadataQuery {
    Artist,
    Title,
    ArtUrl,
}

impl MetadataQuery {
    fn args(self) -> &'static [&'static str] {
        match self {
            MetadataQuery::Artist => &["metadata", "--format", "{{ artist }}"],
            MetadataQuery::Title => &["metadata", "--format", "{{ title }}"],
            MetadataQuery::ArtUrl => &["metadata", "mpris:artUrl"],
        }
    }
}

/// Queries an MPRIS player through `playerctl` (or a compatible command).
#[derive(Debug, Clone)]
pub struct PlayerctlProvider {
    command: String,
    player: String,
}

impl PlayerctlProvider {
    pub fn new(command: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            player: player.into(),
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.command.clone(), config.player.clone())
    }

    pub fn matches_config(&self, config: &ProbeConfig) -> bool {
        self.command == config.command && self.player == config.player
    }

    fn run_query(&self, query: MetadataQuery) -> Result<String, ProbeError> {
        let output = Command::new(&self.command)
            .arg("-p")
            .arg(&self.player)
            .args(query.args())
            .output()
            .map_err(|source| ProbeError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Exit {
                command: self.command.clone(),
                status: output.status,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn try_probe(&self) -> Result<TrackInfo, ProbeError> {
        Ok(TrackInfo {
            artist: self.run_query(MetadataQuery::Artist)?,
            title: self.run_query(MetadataQuery::Title)?,
            art_url: self.run_query(MetadataQuery::ArtUrl)?,
        })
    }
}

impl MediaProvider for PlayerctlProvider {
    fn probe(&self) -> TrackInfo {
        match self.try_probe() {
            Ok(track) => track,
            Err(err) => {
                debug!(player = %self.player, "probe failed: {err}");
                TrackInfo::fallback()
            }
        }
    }
}
