//! Session state for collecting the four source corners of one camera.
//!
//! The picker is UI-agnostic: a front end forwards clicks (or typed
//! coordinates) and reset requests, and reads back the finished quad.

use crate::quad::CORNER_LABELS;
use crate::PointQuad;
use nalgebra::Point2;

#[derive(Clone, Debug, PartialEq)]
pub enum PickerState {
    /// 0..=3 points collected so far.
    Collecting(Vec<Point2<f32>>),
    Complete(PointQuad),
}

/// Outcome of feeding one point to the picker.
#[derive(Clone, Debug, PartialEq)]
pub enum PickerEvent {
    /// Point stored; `index` is its position in corner order.
    Added { index: usize, point: Point2<f32> },
    /// The fourth point was stored and the quad is ready.
    Completed(PointQuad),
    /// The quad was already complete; the point was dropped.
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointPicker {
    state: PickerState,
}

impl Default for PointPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointPicker {
    pub fn new() -> Self {
        Self {
            state: PickerState::Collecting(Vec::with_capacity(4)),
        }
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    /// Label of the corner the next point will be assigned to.
    pub fn next_corner(&self) -> Option<&'static str> {
        match &self.state {
            PickerState::Collecting(pts) => CORNER_LABELS.get(pts.len()).copied(),
            PickerState::Complete(_) => None,
        }
    }

    pub fn push(&mut self, point: Point2<f32>) -> PickerEvent {
        let PickerState::Collecting(pts) = &mut self.state else {
            return PickerEvent::Ignored;
        };
        pts.push(point);
        let index = pts.len() - 1;
        if pts.len() < 4 {
            return PickerEvent::Added { index, point };
        }

        let quad = PointQuad::new([pts[0], pts[1], pts[2], pts[3]]);
        self.state = PickerState::Complete(quad);
        PickerEvent::Completed(quad)
    }

    /// Discard every collected point and start over.
    pub fn reset(&mut self) {
        self.state = PickerState::Collecting(Vec::with_capacity(4));
    }

    pub fn quad(&self) -> Option<PointQuad> {
        match &self.state {
            PickerState::Complete(q) => Some(*q),
            PickerState::Collecting(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, PickerState::Complete(_))
    }
}
