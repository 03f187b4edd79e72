use crate::badness::{
    combine_badnesses, fold_worst, update_badnesses, Badness, BadnessMap, TrackWithValue,
};
use crate::clip::Clip;
use crate::config::AnalysisConfig;
use crate::error::Error;
use crate::marker::shape_change_amount;
use std::time::Instant;
use tracing::{debug, info};

/// Everything measured for one frame transition, one entry per track with
/// usable markers on both sides of it.
#[derive(Debug, Default)]
pub struct FrameDeltas<'a> {
    pub dx: Vec<TrackWithValue<'a>>,
    pub dy: Vec<TrackWithValue<'a>>,
    pub ddx: Vec<TrackWithValue<'a>>,
    pub ddy: Vec<TrackWithValue<'a>>,
    pub shape: Vec<TrackWithValue<'a>>,
}

impl<'a> FrameDeltas<'a> {
    /// Measures the `frame - 1 -> frame` transition. Acceleration is only
    /// measured for tracks also usable at `frame - 2`.
    pub fn extract(clip: &'a Clip, frame: i32) -> Self {
        let mut deltas = Self::default();

        for track in clip.iter() {
            let (previous, marker) = match (
                frame.checked_sub(1).and_then(|f| track.usable_marker(f)),
                track.usable_marker(frame),
            ) {
                (Some(previous), Some(marker)) => (previous, marker),
                _ => continue,
            };

            let shape_change = shape_change_amount(previous, marker);
            deltas
                .shape
                .push(TrackWithValue::new(track, shape_change, frame));

            let velocity = marker.position - previous.position;
            deltas.dx.push(TrackWithValue::new(track, velocity.x, frame));
            deltas.dy.push(TrackWithValue::new(track, velocity.y, frame));

            let previous_previous = match frame
                .checked_sub(2)
                .and_then(|f| track.usable_marker(f))
            {
                Some(marker) => marker,
                None => continue,
            };

            let acceleration = velocity - (previous.position - previous_previous.position);
            deltas
                .ddx
                .push(TrackWithValue::new(track, acceleration.x, frame));
            deltas
                .ddy
                .push(TrackWithValue::new(track, acceleration.y, frame));
        }

        deltas
    }
}

/// Worst score per track, one map per signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBadnesses {
    pub dx: BadnessMap,
    pub dy: BadnessMap,
    pub ddx: BadnessMap,
    pub ddy: BadnessMap,

    // raw running max, not peer scored
    pub shape: BadnessMap,
}

impl SignalBadnesses {
    pub fn absorb(self, deltas: &FrameDeltas<'_>, config: &AnalysisConfig) -> Result<Self, Error> {
        let shape_changes = deltas
            .shape
            .iter()
            .filter(|m| !m.track.locked)
            .map(|m| (m.track.name.as_str(), Badness::new(m.value, m.blame_frame)));

        Ok(Self {
            dx: update_badnesses(self.dx, &deltas.dx, config)?,
            dy: update_badnesses(self.dy, &deltas.dy, config)?,
            ddx: update_badnesses(self.ddx, &deltas.ddx, config)?,
            ddy: update_badnesses(self.ddy, &deltas.ddy, config)?,
            shape: fold_worst(self.shape, shape_changes),
        })
    }

    #[inline]
    pub fn combine(&self, percentile: u32) -> BadnessMap {
        combine_badnesses(
            &[&self.dx, &self.dy, &self.ddx, &self.ddy, &self.shape],
            percentile,
        )
    }
}

/// Runs every frame transition of `clip` through the per-signal scorers.
///
/// The first frame has nothing to compare against and the last frame is
/// left out.
pub fn signal_badnesses(clip: &Clip, config: &AnalysisConfig) -> Result<SignalBadnesses, Error> {
    config.validate()?;
    clip.validate()?;

    let (first_frame, last_frame) = match clip.frame_bounds() {
        Some(bounds) => bounds,
        None => return Ok(SignalBadnesses::default()),
    };

    let mut frames = first_frame.saturating_add(1)..last_frame;

    frames.try_fold(SignalBadnesses::default(), |signals, frame| {
        let deltas = FrameDeltas::extract(clip, frame);
        debug!(frame, tracks = deltas.dx.len(), "frame deltas");

        signals.absorb(&deltas, config)
    })
}

/// Ranks every track of `clip` by how differently it moves from its peers.
pub fn find_bad_tracks(clip: &Clip, config: &AnalysisConfig) -> Result<BadnessMap, Error> {
    let started = Instant::now();

    let badnesses = signal_badnesses(clip, config)?.combine(config.percentile);

    info!(
        tracks = badnesses.len(),
        "finding bad tracks took {:.2}s",
        started.elapsed().as_secs_f32()
    );

    Ok(badnesses)
}
