use crate::badness::BadnessMap;
use crate::clip::Clip;
use crate::config::AnalysisConfig;
use crate::duplicate::{
    find_duplicate_tracks, front_track, sort_duplicates, Duplicate, DuplicateOrder,
};
use crate::error::Error;
use crate::motion::find_bad_tracks;
use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the bad tracks list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BadTrack {
    pub track: String,
    pub score: f32,
    pub frame: i32,
}

/// One row of the duplicate tracks list, `track_a < track_b`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DuplicateEntry {
    pub track_a: String,
    pub track_b: String,
    pub frame: i32,
    pub peak_distance: f32,
    pub front_track: String,
}

impl DuplicateEntry {
    pub fn new(clip: &Clip, dup: &Duplicate) -> Option<Self> {
        let front = front_track(clip, dup)?;

        Some(Self {
            track_a: dup.track1_name.clone(),
            track_b: dup.track2_name.clone(),
            frame: dup.most_interesting_frame()?,
            peak_distance: dup.max_distance(),
            front_track: front.name.clone(),
        })
    }
}

/// Worst score first. Equal scores keep name order.
pub fn rank_badnesses(badnesses: &BadnessMap) -> Vec<BadTrack> {
    let mut ranked: Vec<BadTrack> = badnesses
        .iter()
        .map(|(track, badness)| BadTrack {
            track: track.clone(),
            score: badness.amount,
            frame: badness.frame,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub bad_tracks: Vec<BadTrack>,
    pub duplicates: Vec<DuplicateEntry>,
}

impl Report {
    pub fn build(
        clip: &Clip,
        config: &AnalysisConfig,
        order: DuplicateOrder,
    ) -> Result<Self, Error> {
        let bad_tracks = rank_badnesses(&find_bad_tracks(clip, config)?);

        let mut dups = find_duplicate_tracks(clip, config)?;
        sort_duplicates(&mut dups, order);

        let duplicates = dups
            .iter()
            .filter_map(|dup| DuplicateEntry::new(clip, dup))
            .collect();

        Ok(Self {
            bad_tracks,
            duplicates,
        })
    }

    /// Keeps the first `limit` rows of each list.
    pub fn truncate(&mut self, limit: usize) {
        self.bad_tracks.truncate(limit);
        self.duplicates.truncate(limit);
    }
}
