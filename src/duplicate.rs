use crate::clip::Clip;
use crate::config::AnalysisConfig;
use crate::error::Error;
use crate::track::{FrameSpan, Track};
use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// Two tracks seen in the same frames, and how close they came.
///
/// `track1_name < track2_name` always holds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Duplicate {
    pub track1_name: String,
    pub track2_name: String,

    // peak squared distance over all common frames
    pub max_distance2: f32,

    pub common: FrameSpan,
    pub overlapping: Option<FrameSpan>,
}

impl Duplicate {
    pub fn new(
        track1_name: &str,
        track2_name: &str,
        frame: i32,
        distance2: f32,
        maxdist2: f32,
    ) -> Self {
        let mut dup = Self {
            track1_name: track1_name.to_owned(),
            track2_name: track2_name.to_owned(),
            max_distance2: distance2,
            common: FrameSpan::single(frame),
            overlapping: None,
        };

        dup.update(frame, distance2, maxdist2);
        dup
    }

    /// Records one more common frame. Frames must come in increasing order.
    pub fn update(&mut self, frame: i32, distance2: f32, maxdist2: f32) {
        if distance2 > self.max_distance2 {
            self.max_distance2 = distance2;
        }

        self.common.last = frame;

        if distance2 > maxdist2 {
            return;
        }

        self.overlapping
            .get_or_insert(FrameSpan::single(frame))
            .last = frame;
    }

    #[inline]
    pub fn are_dups(&self) -> bool {
        self.overlapping.is_some()
    }

    #[inline]
    pub fn max_distance(&self) -> f32 {
        self.max_distance2.sqrt()
    }

    /// Where the pair stopped overlapping if they drifted apart again,
    /// otherwise where they started overlapping.
    pub fn most_interesting_frame(&self) -> Option<i32> {
        let overlapping = self.overlapping?;

        if overlapping.last < self.common.last {
            Some(overlapping.last)
        } else {
            Some(overlapping.first)
        }
    }

    #[inline]
    pub fn names(&self) -> (&str, &str) {
        (&self.track1_name, &self.track2_name)
    }
}

/// Finds track pairs that came within the duplicate threshold of each other
/// in at least one frame. The result is in name order.
pub fn find_duplicate_tracks(
    clip: &Clip,
    config: &AnalysisConfig,
) -> Result<Vec<Duplicate>, Error> {
    config.validate()?;
    clip.validate()?;

    let started = Instant::now();
    let maxdist2 = config.dup_maxdist2();

    // with names sorted, every i < j pair is already in name order
    let mut tracks: Vec<&Track> = clip.iter().collect();
    tracks.sort_by(|a, b| a.name.cmp(&b.name));

    let mut dups: BTreeMap<(&str, &str), Duplicate> = BTreeMap::new();

    if let Some((first_frame, last_frame)) = clip.frame_bounds() {
        for frame in first_frame..=last_frame {
            let positions: Vec<(&str, na::Point2<f32>)> = tracks
                .iter()
                .filter_map(|t| Some((t.name.as_str(), t.usable_marker(frame)?.position)))
                .collect();

            for (idx, &(name1, p1)) in positions.iter().enumerate() {
                for &(name2, p2) in &positions[idx + 1..] {
                    let distance2 = na::distance_squared(&p1, &p2);

                    dups.entry((name1, name2))
                        .and_modify(|dup| dup.update(frame, distance2, maxdist2))
                        .or_insert_with(|| {
                            Duplicate::new(name1, name2, frame, distance2, maxdist2)
                        });
                }
            }
        }
    }

    let found: Vec<Duplicate> = dups.into_values().filter(Duplicate::are_dups).collect();

    info!(
        duplicates = found.len(),
        "finding duplicate tracks took {:.2}s",
        started.elapsed().as_secs_f32()
    );

    Ok(found)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateOrder {
    /// Largest peak distance first, ties by name.
    PeakDistance,

    /// By first name, then second name.
    Name,
}

impl Default for DuplicateOrder {
    fn default() -> Self {
        DuplicateOrder::PeakDistance
    }
}

pub fn sort_duplicates(dups: &mut [Duplicate], order: DuplicateOrder) {
    match order {
        DuplicateOrder::PeakDistance => dups.sort_by(|a, b| {
            b.max_distance2
                .partial_cmp(&a.max_distance2)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.names().cmp(&b.names()))
        }),
        DuplicateOrder::Name => dups.sort_by(|a, b| a.names().cmp(&b.names())),
    }
}

/// The track of the pair to bring to the front for review: the one with the
/// shorter marker span, or the first one on a tie.
pub fn front_track<'a>(clip: &'a Clip, dup: &Duplicate) -> Option<&'a Track> {
    let track1 = clip.track(&dup.track1_name)?;
    let track2 = clip.track(&dup.track2_name)?;

    let span = |t: &Track| t.frame_span().map(|s| s.duration()).unwrap_or(0);

    if span(track2) < span(track1) {
        Some(track2)
    } else {
        Some(track1)
    }
}
