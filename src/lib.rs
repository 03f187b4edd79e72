pub mod badness;
pub mod clip;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod marker;
pub mod math;
pub mod motion;
pub mod report;
pub mod track;

pub use badness::{Badness, BadnessCalculator, BadnessMap, TrackWithValue};
pub use clip::Clip;
pub use config::{AnalysisConfig, ZeroRadiusPolicy};
pub use duplicate::{find_duplicate_tracks, Duplicate, DuplicateOrder};
pub use error::Error;
pub use marker::{Marker, MarkerSlot};
pub use motion::find_bad_tracks;
pub use report::{BadTrack, DuplicateEntry, Report};
pub use track::{FrameSpan, Track};

/// A read-only pass over a whole clip.
pub trait Analysis {
    type Output;

    fn analyze(&self, clip: &Clip) -> Result<Self::Output, Error>;
}

/// Flags tracks that move differently from their peers.
#[derive(Debug, Clone, Default)]
pub struct BadTrackFinder {
    config: AnalysisConfig,
}

impl BadTrackFinder {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl Analysis for BadTrackFinder {
    type Output = BadnessMap;

    #[inline]
    fn analyze(&self, clip: &Clip) -> Result<BadnessMap, Error> {
        find_bad_tracks(clip, &self.config)
    }
}

/// Flags track pairs that sit on top of each other.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: AnalysisConfig,
}

impl DuplicateFinder {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl Analysis for DuplicateFinder {
    type Output = Vec<Duplicate>;

    #[inline]
    fn analyze(&self, clip: &Clip) -> Result<Vec<Duplicate>, Error> {
        find_duplicate_tracks(clip, &self.config)
    }
}
