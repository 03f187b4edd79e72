use crate::marker::{Marker, MarkerSlot};
use serde_derive::{Deserialize, Serialize};

/// Inclusive range of frames.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub first: i32,
    pub last: i32,
}

impl FrameSpan {
    #[inline]
    pub fn single(frame: i32) -> Self {
        Self {
            first: frame,
            last: frame,
        }
    }

    #[inline]
    pub fn duration(&self) -> i32 {
        self.last.saturating_sub(self.first)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,

    // vetted by a human, never scored
    #[serde(default)]
    pub locked: bool,

    // sorted by frame
    pub markers: Vec<Marker>,
}

impl Track {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            locked: false,
            markers: Vec::new(),
        }
    }

    #[inline]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Inserts `marker`, replacing any marker already at its frame.
    pub fn insert(&mut self, marker: Marker) {
        match self.position_of(marker.frame) {
            Ok(idx) => self.markers[idx] = marker,
            Err(idx) => self.markers.insert(idx, marker),
        }
    }

    #[inline]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.insert(marker);
        self
    }

    pub(crate) fn sort_markers(&mut self) {
        self.markers.sort_by_key(|m| m.frame);
    }

    #[inline]
    fn position_of(&self, frame: i32) -> Result<usize, usize> {
        self.markers.binary_search_by_key(&frame, |m| m.frame)
    }

    pub fn marker(&self, frame: i32) -> MarkerSlot<'_> {
        self.position_of(frame)
            .ok()
            .map(|idx| &self.markers[idx])
            .into()
    }

    #[inline]
    pub fn usable_marker(&self, frame: i32) -> Option<&Marker> {
        self.marker(frame).usable()
    }

    /// First and last frame holding a marker, muted ones included.
    pub fn frame_span(&self) -> Option<FrameSpan> {
        let first = self.markers.first()?;
        let last = self.markers.last()?;

        Some(FrameSpan {
            first: first.frame,
            last: last.frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_lookup() {
        let track = Track::new("t")
            .with_marker(Marker::new(5, 0.5, 0.5))
            .with_marker(Marker::new(1, 0.1, 0.1))
            .with_marker(Marker::new(3, 0.3, 0.3).muted());

        assert_eq!(track.markers.iter().map(|m| m.frame).collect::<Vec<_>>(), [1, 3, 5]);
        assert!(matches!(track.marker(1), MarkerSlot::Present(m) if m.x() == 0.1));
        assert_eq!(track.marker(2), MarkerSlot::Absent);
        assert_eq!(track.marker(3), MarkerSlot::Muted);
        assert!(track.usable_marker(3).is_none());
        assert!(track.usable_marker(5).is_some());
    }

    #[test]
    fn test_insert_replaces_same_frame() {
        let mut track = Track::new("t").with_marker(Marker::new(2, 0.1, 0.1));
        track.insert(Marker::new(2, 0.9, 0.9));

        assert_eq!(track.markers.len(), 1);
        assert_eq!(track.usable_marker(2).map(|m| m.x()), Some(0.9));
    }

    #[test]
    fn test_frame_span() {
        assert_eq!(Track::new("empty").frame_span(), None);

        let track = Track::new("t")
            .with_marker(Marker::new(7, 0.0, 0.0).muted())
            .with_marker(Marker::new(2, 0.0, 0.0));

        let span = track.frame_span().unwrap();
        assert_eq!(span, FrameSpan { first: 2, last: 7 });
        assert_eq!(span.duration(), 5);

        let whole = FrameSpan {
            first: i32::MIN,
            last: i32::MAX,
        };
        assert_eq!(whole.duration(), i32::MAX);
    }
}
