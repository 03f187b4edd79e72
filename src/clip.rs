use crate::error::Error;
use crate::track::Track;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// A frame range plus every track tracked in it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Clip {
    pub first_frame: i32,
    pub frame_count: i32,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Clip {
    pub fn new(first_frame: i32, frame_count: i32) -> Self {
        Self {
            first_frame,
            frame_count,
            tracks: Vec::new(),
        }
    }

    #[inline]
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut clip: Clip = serde_json::from_reader(reader)?;
        clip.tracks.iter_mut().for_each(Track::sort_markers);
        clip.validate()?;

        Ok(clip)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;

        Self::from_reader(std::io::BufReader::new(file))
    }

    /// First and last frame of the clip, both inclusive.
    #[inline]
    pub fn frame_bounds(&self) -> Option<(i32, i32)> {
        if self.frame_count <= 0 {
            return None;
        }

        let last_frame = self.first_frame.checked_add(self.frame_count - 1)?;

        Some((self.first_frame, last_frame))
    }

    #[inline]
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Checks what the analyses take for granted: a frame range that fits in
    /// `i32`, unique track names and markers sorted by frame, at most one per
    /// frame, with finite coordinates.
    pub fn validate(&self) -> Result<(), Error> {
        if self.frame_count > 0 && self.frame_bounds().is_none() {
            return Err(Error::FrameRangeOverflow {
                first_frame: self.first_frame,
                frame_count: self.frame_count,
            });
        }

        let mut names = HashSet::with_capacity(self.tracks.len());

        for track in &self.tracks {
            if !names.insert(track.name.as_str()) {
                return Err(Error::DuplicateTrackName(track.name.clone()));
            }

            for pair in track.markers.windows(2) {
                if pair[0].frame == pair[1].frame {
                    return Err(Error::DuplicateMarker {
                        track: track.name.clone(),
                        frame: pair[1].frame,
                    });
                }

                if pair[0].frame > pair[1].frame {
                    return Err(Error::UnsortedMarkers(track.name.clone()));
                }
            }

            if let Some(marker) = track.markers.iter().find(|m| !m.is_finite()) {
                return Err(Error::NonFiniteMarker {
                    track: track.name.clone(),
                    frame: marker.frame,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::duplicate::find_duplicate_tracks;
    use crate::marker::Marker;
    use crate::motion::find_bad_tracks;

    const CLIP_JSON: &str = r#"{
        "first_frame": 1,
        "frame_count": 3,
        "tracks": [
            {
                "name": "Track.001",
                "markers": [
                    {"frame": 2, "co": [0.2, 0.2], "pattern_corners": [[0, 0], [0, 0], [0, 0], [0, 0]]},
                    {"frame": 1, "co": [0.1, 0.1], "pattern_corners": [[0, 0], [0, 0], [0, 0], [0, 0]]}
                ]
            },
            {
                "name": "Track.002",
                "locked": true,
                "markers": []
            }
        ]
    }"#;

    #[test]
    fn test_from_reader_sorts_markers() {
        let clip = Clip::from_reader(CLIP_JSON.as_bytes()).unwrap();

        assert_eq!(clip.frame_bounds(), Some((1, 3)));
        assert_eq!(clip.len(), 2);

        let track = clip.track("Track.001").unwrap();
        assert_eq!(track.markers[0].frame, 1);
        assert_eq!(track.usable_marker(2).map(|m| m.x()), Some(0.2));
        assert!(clip.track("Track.002").unwrap().locked);
    }

    #[test]
    fn test_frame_bounds_empty() {
        assert_eq!(Clip::new(10, 0).frame_bounds(), None);
        assert_eq!(Clip::new(10, 1).frame_bounds(), Some((10, 10)));
    }

    #[test]
    fn test_validate_rejects_overflowing_range() {
        let clip = Clip::new(i32::MAX, 2).with_track(Track::new("a"));

        assert_eq!(clip.frame_bounds(), None);
        assert!(matches!(
            clip.validate(),
            Err(Error::FrameRangeOverflow {
                first_frame: i32::MAX,
                frame_count: 2
            })
        ));
    }

    #[test]
    fn test_range_ending_at_max_frame() {
        let still = |name: &str| {
            Track::new(name)
                .with_marker(Marker::new(i32::MAX - 1, 0.5, 0.5))
                .with_marker(Marker::new(i32::MAX, 0.5, 0.5))
        };
        let clip = ["a", "b", "c", "d"]
            .iter()
            .fold(Clip::new(i32::MAX, 1), |clip, &name| clip.with_track(still(name)));

        assert_eq!(clip.frame_bounds(), Some((i32::MAX, i32::MAX)));
        assert!(clip.validate().is_ok());

        let config = AnalysisConfig::default();
        assert!(find_bad_tracks(&clip, &config).unwrap().is_empty());
        assert_eq!(find_duplicate_tracks(&clip, &config).unwrap().len(), 6);
    }

    #[test]
    fn test_range_starting_at_min_frame() {
        let track = |name: &str, x: f32| {
            Track::new(name)
                .with_marker(Marker::new(i32::MIN, x, 0.5))
                .with_marker(Marker::new(i32::MIN + 1, x, 0.5))
                .with_marker(Marker::new(i32::MIN + 2, x, 0.5))
        };
        let clip = [("a", 0.1), ("b", 0.3), ("c", 0.5), ("d", 0.7)]
            .iter()
            .fold(Clip::new(i32::MIN, 3), |clip, &(name, x)| {
                clip.with_track(track(name, x))
            });

        assert!(clip.validate().is_ok());

        let badnesses = find_bad_tracks(&clip, &AnalysisConfig::default()).unwrap();
        assert_eq!(badnesses.len(), 4);
        assert!(badnesses.values().all(|b| b.amount == 0.0));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let clip = Clip::new(0, 2)
            .with_track(Track::new("a"))
            .with_track(Track::new("a"));

        assert!(matches!(clip.validate(), Err(Error::DuplicateTrackName(name)) if name == "a"));
    }

    #[test]
    fn test_validate_rejects_duplicate_markers() {
        let mut track = Track::new("a");
        track.markers.push(Marker::new(1, 0.0, 0.0));
        track.markers.push(Marker::new(1, 0.5, 0.5));

        let clip = Clip::new(0, 2).with_track(track);
        assert!(matches!(
            clip.validate(),
            Err(Error::DuplicateMarker { frame: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unsorted_markers() {
        let mut track = Track::new("a");
        track.markers.push(Marker::new(2, 0.0, 0.0));
        track.markers.push(Marker::new(1, 0.5, 0.5));

        let clip = Clip::new(0, 3).with_track(track);
        assert!(matches!(clip.validate(), Err(Error::UnsortedMarkers(name)) if name == "a"));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let track = Track::new("a").with_marker(Marker::new(0, f32::NAN, 0.0));
        let clip = Clip::new(0, 2).with_track(track);

        assert!(matches!(
            clip.validate(),
            Err(Error::NonFiniteMarker { frame: 0, .. })
        ));
    }

    #[test]
    fn test_from_reader_rejects_bad_json() {
        assert!(matches!(
            Clip::from_reader("{\"first_frame\": 0}".as_bytes()),
            Err(Error::JsonError(_))
        ));
    }
}
