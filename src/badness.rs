use crate::config::{AnalysisConfig, ZeroRadiusPolicy};
use crate::error::Error;
use crate::math;
use crate::track::Track;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One measurement of one track, blamed on the later of the two frames it
/// was derived from.
#[derive(Debug, Clone, Copy)]
pub struct TrackWithValue<'a> {
    pub track: &'a Track,
    pub value: f32,
    pub blame_frame: i32,
}

impl<'a> TrackWithValue<'a> {
    #[inline]
    pub fn new(track: &'a Track, value: f32, blame_frame: i32) -> Self {
        Self {
            track,
            value,
            blame_frame,
        }
    }
}

/// The worst score seen for a track, and where it was seen.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Badness {
    pub amount: f32,
    pub frame: i32,
}

impl Badness {
    #[inline]
    pub fn new(amount: f32, frame: i32) -> Self {
        Self { amount, frame }
    }

    /// Keeps `self` unless `other` is strictly worse.
    #[inline]
    pub fn worst(self, other: Badness) -> Badness {
        if other.amount > self.amount {
            other
        } else {
            self
        }
    }
}

/// Track name to badness, iterated in name order.
pub type BadnessMap = BTreeMap<String, Badness>;

/// Left fold of `(track, badness)` pairs into `init`, keeping the worst
/// badness per track.
pub fn fold_worst<'a, I>(init: BadnessMap, scored: I) -> BadnessMap
where
    I: IntoIterator<Item = (&'a str, Badness)>,
{
    scored.into_iter().fold(init, |mut acc, (name, badness)| {
        match acc.get_mut(name) {
            Some(old) => *old = old.worst(badness),
            None => {
                acc.insert(name.to_owned(), badness);
            }
        }
        acc
    })
}

/// Scores values by how far they sit from the median, relative to how far
/// most of them sit from it.
#[derive(Debug, Clone, Copy)]
pub struct BadnessCalculator {
    median: f32,
    percentile_radius: f32,
    zero_radius: ZeroRadiusPolicy,
}

impl BadnessCalculator {
    pub fn new(movements: &[TrackWithValue<'_>], config: &AnalysisConfig) -> Result<Self, Error> {
        let values: Vec<f32> = movements.iter().map(|m| m.value).collect();

        Self::from_values(&values, config.percentile, config.zero_radius)
    }

    pub fn from_values(
        values: &[f32],
        percentile: u32,
        zero_radius: ZeroRadiusPolicy,
    ) -> Result<Self, Error> {
        let count = values.len();
        let out_of_range = || Error::PercentileIndexOutOfRange { count, percentile };

        let median = math::median(values).ok_or_else(out_of_range)?;
        let percentile_index = math::percentile_index(count, percentile)
            .filter(|&idx| idx < count)
            .ok_or_else(out_of_range)?;

        let deviations: Vec<f32> = values.iter().map(|v| (v - median).abs()).collect();
        let percentile_radius = math::sorted(&deviations)[percentile_index];

        Ok(Self {
            median,
            percentile_radius,
            zero_radius,
        })
    }

    #[inline]
    pub fn median(&self) -> f32 {
        self.median
    }

    /// How far tracks generally deviate from the median.
    #[inline]
    pub fn percentile_radius(&self) -> f32 {
        self.percentile_radius
    }

    pub fn compute_badness_score(&self, value: f32) -> f32 {
        let deviation = (value - self.median).abs();

        match self.zero_radius {
            ZeroRadiusPolicy::Damped { constant } => {
                deviation / (self.percentile_radius + constant)
            }
            ZeroRadiusPolicy::ZeroScore if self.percentile_radius == 0.0 => 0.0,
            ZeroRadiusPolicy::ZeroScore => deviation / self.percentile_radius,
        }
    }
}

/// Scores one signal at one frame and folds the scores of unlocked tracks
/// into `badnesses`.
///
/// Locked tracks still count towards the median and radius.
pub fn update_badnesses(
    badnesses: BadnessMap,
    movements: &[TrackWithValue<'_>],
    config: &AnalysisConfig,
) -> Result<BadnessMap, Error> {
    if movements.len() < config.min_samples {
        if !movements.is_empty() {
            debug!(
                samples = movements.len(),
                min_samples = config.min_samples,
                "too few samples, skipping"
            );
        }
        return Ok(badnesses);
    }

    let calculator = BadnessCalculator::new(movements, config)?;
    let scored = movements
        .iter()
        .filter(|m| !m.track.locked)
        .map(|m| {
            let score = calculator.compute_badness_score(m.value);
            (m.track.name.as_str(), Badness::new(score, m.blame_frame))
        });

    Ok(fold_worst(badnesses, scored))
}

/// Scales each map so that its percentile lands at 1.0, then keeps the
/// highest scaled badness per track across all maps.
///
/// Empty maps are skipped, maps whose percentile is 0 are left unscaled.
pub fn combine_badnesses(maps: &[&BadnessMap], percentile: u32) -> BadnessMap {
    maps.iter()
        .filter(|badnesses| !badnesses.is_empty())
        .fold(BadnessMap::new(), |combined, badnesses| {
            let amounts: Vec<f32> = badnesses.values().map(|b| b.amount).collect();
            let scale = math::percentile_value(&amounts, percentile).unwrap_or(0.0);

            let scaled = badnesses.iter().map(|(track, badness)| {
                let amount = if scale != 0.0 {
                    badness.amount / scale
                } else {
                    badness.amount
                };

                (track.as_str(), Badness::new(amount, badness.frame))
            });

            fold_worst(combined, scaled)
        })
}
