use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// Deviations up to this percentile of the peer group score at most ~1.0.
pub const PERCENTILE: u32 = 80;

/// Fewer samples than this and a median plus outlier can't be told apart.
pub const MIN_SAMPLES: usize = 4;

/// Max distance between two duplicate markers, in percent of the
/// normalized image span.
pub const DUP_MAXDIST_PERCENT: f32 = 0.5;

/// What to do when every peer agrees and the percentile radius is zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum ZeroRadiusPolicy {
    /// Divide by `radius + constant`, always.
    Damped { constant: f32 },

    /// Divide by the bare radius, score 0 when the radius is 0.
    ZeroScore,
}

impl Default for ZeroRadiusPolicy {
    fn default() -> Self {
        ZeroRadiusPolicy::Damped { constant: 1.0 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub percentile: u32,
    pub min_samples: usize,
    pub zero_radius: ZeroRadiusPolicy,
    pub dup_maxdist_percent: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            percentile: PERCENTILE,
            min_samples: MIN_SAMPLES,
            zero_radius: ZeroRadiusPolicy::default(),
            dup_maxdist_percent: DUP_MAXDIST_PERCENT,
        }
    }
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Squared duplicate distance threshold in normalized image units.
    #[inline]
    pub fn dup_maxdist2(&self) -> f32 {
        let fraction = self.dup_maxdist_percent / 100.0;

        fraction * fraction
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=100).contains(&self.percentile) {
            return Err(Error::InvalidPercentile(self.percentile));
        }

        // min_samples * percentile < 100 would put the percentile index at -1
        if self.min_samples == 0 || self.min_samples * (self.percentile as usize) < 100 {
            return Err(Error::InvalidSampleFloor {
                min_samples: self.min_samples,
                percentile: self.percentile,
            });
        }

        if let ZeroRadiusPolicy::Damped { constant } = self.zero_radius {
            if !constant.is_finite() || constant <= 0.0 {
                return Err(Error::InvalidDamping(constant));
            }
        }

        if !self.dup_maxdist_percent.is_finite() || self.dup_maxdist_percent < 0.0 {
            return Err(Error::InvalidDuplicateThreshold(self.dup_maxdist_percent));
        }

        Ok(())
    }
}
