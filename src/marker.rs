use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Tracked position of one track at one frame.
///
/// `position` is in normalized image coordinates, `pattern_corners` are the
/// corners of the tracked patch relative to `position`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Marker {
    pub frame: i32,
    #[serde(rename = "co")]
    pub position: na::Point2<f32>,
    pub pattern_corners: [na::Vector2<f32>; 4],
    #[serde(default)]
    pub muted: bool,
}

impl Marker {
    pub fn new(frame: i32, x: f32, y: f32) -> Self {
        Self {
            frame,
            position: na::Point2::new(x, y),
            pattern_corners: [na::Vector2::zeros(); 4],
            muted: false,
        }
    }

    #[inline]
    pub fn with_corners(mut self, corners: [[f32; 2]; 4]) -> Self {
        for (dst, [x, y]) in self.pattern_corners.iter_mut().zip(corners) {
            *dst = na::Vector2::new(x, y);
        }
        self
    }

    #[inline]
    pub fn muted(mut self) -> Self {
        self.muted = true;
        self
    }

    #[inline(always)]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline(always)]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|v| v.is_finite())
            && self
                .pattern_corners
                .iter()
                .all(|c| c.iter().all(|v| v.is_finite()))
    }
}

/// What a track has at a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerSlot<'a> {
    Absent,
    Muted,
    Present(&'a Marker),
}

impl<'a> MarkerSlot<'a> {
    #[inline]
    pub fn usable(self) -> Option<&'a Marker> {
        match self {
            MarkerSlot::Present(marker) => Some(marker),
            MarkerSlot::Absent | MarkerSlot::Muted => None,
        }
    }
}

impl<'a> From<Option<&'a Marker>> for MarkerSlot<'a> {
    fn from(marker: Option<&'a Marker>) -> Self {
        match marker {
            None => MarkerSlot::Absent,
            Some(marker) if marker.muted => MarkerSlot::Muted,
            Some(marker) => MarkerSlot::Present(marker),
        }
    }
}

/// How much did the corners of the marker move between these frames?
///
/// Sum of `|dx| + |dy|` over the four pattern corners.
pub fn shape_change_amount(previous: &Marker, marker: &Marker) -> f32 {
    previous
        .pattern_corners
        .iter()
        .zip(marker.pattern_corners.iter())
        .map(|(prev, curr)| (curr.x - prev.x).abs() + (curr.y - prev.y).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_change_amount() {
        let previous =
            Marker::new(1, 0.5, 0.5).with_corners([[0., 0.], [0., 1.], [1., 1.], [1., 0.]]);
        assert_eq!(shape_change_amount(&previous, &previous), 0.0);

        let marker =
            Marker::new(2, 0.5, 0.5).with_corners([[0., 0.], [0., 1.], [1., 1.], [1., 5.]]);
        assert_eq!(shape_change_amount(&previous, &marker), 5.0);
        assert_eq!(shape_change_amount(&marker, &previous), 5.0);
    }

    #[test]
    fn test_shape_change_ignores_position() {
        let previous = Marker::new(1, 0.1, 0.1);
        let marker = Marker::new(2, 0.9, 0.9);

        assert_eq!(shape_change_amount(&previous, &marker), 0.0);
    }

    #[test]
    fn test_marker_slot() {
        let present = Marker::new(0, 0.0, 0.0);
        let muted = Marker::new(0, 0.0, 0.0).muted();

        assert_eq!(MarkerSlot::from(None), MarkerSlot::Absent);
        assert_eq!(MarkerSlot::from(Some(&muted)), MarkerSlot::Muted);
        assert_eq!(MarkerSlot::from(Some(&present)).usable(), Some(&present));
        assert_eq!(MarkerSlot::from(Some(&muted)).usable(), None);
        assert_eq!(MarkerSlot::Absent.usable(), None);
    }

    #[test]
    fn test_marker_json() {
        let json = r#"{
            "frame": 3,
            "co": [0.25, 0.75],
            "pattern_corners": [[-0.01, -0.01], [0.01, -0.01], [0.01, 0.01], [-0.01, 0.01]]
        }"#;

        let marker: Marker = serde_json::from_str(json).unwrap();
        assert_eq!(marker.frame, 3);
        assert_eq!(marker.x(), 0.25);
        assert_eq!(marker.y(), 0.75);
        assert!(!marker.muted);
        assert!(marker.is_finite());
    }
}
