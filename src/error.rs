use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("percentile must be within 1..=100, got {0}")]
    InvalidPercentile(u32),

    #[error("min_samples {min_samples} is too small for percentile {percentile}")]
    InvalidSampleFloor { min_samples: usize, percentile: u32 },

    #[error("damping constant must be finite and positive, got {0}")]
    InvalidDamping(f32),

    #[error("duplicate threshold must be finite and non-negative, got {0}%")]
    InvalidDuplicateThreshold(f32),

    #[error("percentile index out of range: {count} samples at percentile {percentile}")]
    PercentileIndexOutOfRange { count: usize, percentile: u32 },

    #[error("frame range starting at {first_frame} with {frame_count} frames overflows")]
    FrameRangeOverflow { first_frame: i32, frame_count: i32 },

    #[error("track name `{0}` is used more than once")]
    DuplicateTrackName(String),

    #[error("track `{track}` has more than one marker at frame {frame}")]
    DuplicateMarker { track: String, frame: i32 },

    #[error("markers of track `{0}` are not sorted by frame")]
    UnsortedMarkers(String),

    #[error("track `{track}` has a non-finite marker at frame {frame}")]
    NonFiniteMarker { track: String, frame: i32 },

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    JsonError(#[from] serde_json::Error),
}
