//! The stroke log: the only source of truth for what is on the surface.
//!
//! Points are appended in drawing order and never edited. Rendering replays
//! the whole log into a list of [`Segment`]s, so a redraw after a resize or a
//! clear always reproduces the same picture.

use serde::{Deserialize, Serialize};

use crate::tool::INITIAL_WIDTH;
use crate::{Rgba, StrokeStyle, ToolKind};

/// One sampled location of the drawing instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// X position in surface-local pixels.
    pub x: f32,
    /// Y position in surface-local pixels.
    pub y: f32,
    /// `false` for a pen-down point, `true` for a drag continuation.
    pub is_dragging: bool,
    /// Tool active when the point was recorded.
    pub tool: ToolKind,
}

impl StrokePoint {
    /// Create a new stroke point.
    #[must_use]
    pub fn new(x: f32, y: f32, is_dragging: bool, tool: ToolKind) -> Self {
        Self {
            x,
            y,
            is_dragging,
            tool,
        }
    }
}

/// A straight piece of stroke ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start of the segment.
    pub from: (f32, f32),
    /// End of the segment.
    pub to: (f32, f32),
    /// Colour and width.
    pub style: StrokeStyle,
}

/// Append-only, ordered log of stroke points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeLog {
    points: Vec<StrokePoint>,
}

impl StrokeLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point.
    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Drop every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the log holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    /// Replay the log into drawable segments.
    ///
    /// The line width carries over from one point to the next, exactly like a
    /// 2D context's `lineWidth`, starting from 1.0 on every replay. A
    /// drag-continuation point connects to its predecessor; a pen-down point
    /// (or the very first point) becomes a one-pixel stub ending at the point.
    #[must_use]
    pub fn segments(&self, background: Rgba) -> Vec<Segment> {
        let mut width = INITIAL_WIDTH;
        let mut segments = Vec::with_capacity(self.points.len());
        let mut previous: Option<&StrokePoint> = None;

        for point in &self.points {
            let style = point.tool.style(point.is_dragging, width, background);
            width = style.width;

            let from = match previous {
                Some(prev) if point.is_dragging => (prev.x, prev.y),
                _ => (point.x - 1.0, point.y),
            };
            segments.push(Segment {
                from,
                to: (point.x, point.y),
                style,
            });
            previous = Some(point);
        }

        segments
    }

    /// Parse a log from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> crate::DrillResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the log to a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::DrillResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FromIterator<StrokePoint> for StrokeLog {
    fn from_iter<I: IntoIterator<Item = StrokePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{BRUSH_MIN_WIDTH, PENCIL_WIDTH};

    fn pt(x: f32, y: f32, is_dragging: bool, tool: ToolKind) -> StrokePoint {
        StrokePoint::new(x, y, is_dragging, tool)
    }

    #[test]
    fn empty_log_has_no_segments() {
        let log = StrokeLog::new();
        assert!(log.is_empty());
        assert!(log.segments(Rgba::WHITE).is_empty());
    }

    #[test]
    fn pen_down_becomes_one_pixel_stub() {
        let log: StrokeLog = [pt(10.0, 20.0, false, ToolKind::Pencil)]
            .into_iter()
            .collect();
        let segments = log.segments(Rgba::WHITE);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from, (9.0, 20.0));
        assert_eq!(segments[0].to, (10.0, 20.0));
        assert!((segments[0].style.width - PENCIL_WIDTH).abs() < f32::EPSILON);
    }

    #[test]
    fn drag_connects_to_previous_point() {
        let log: StrokeLog = [
            pt(10.0, 20.0, false, ToolKind::Pencil),
            pt(15.0, 25.0, true, ToolKind::Pencil),
        ]
        .into_iter()
        .collect();
        let segments = log.segments(Rgba::WHITE);
        assert_eq!(segments[1].from, (10.0, 20.0));
        assert_eq!(segments[1].to, (15.0, 25.0));
    }

    #[test]
    fn leading_drag_point_is_drawn_as_stub() {
        let log: StrokeLog = [pt(4.0, 4.0, true, ToolKind::Pencil)].into_iter().collect();
        let segments = log.segments(Rgba::WHITE);
        assert_eq!(segments[0].from, (3.0, 4.0));
    }

    #[test]
    fn brush_width_grows_along_a_drag_and_resets_on_new_stroke() {
        let log: StrokeLog = [
            pt(0.0, 0.0, false, ToolKind::Brush),
            pt(1.0, 0.0, true, ToolKind::Brush),
            pt(2.0, 0.0, true, ToolKind::Brush),
            pt(9.0, 9.0, false, ToolKind::Brush),
        ]
        .into_iter()
        .collect();
        let widths: Vec<f32> = log
            .segments(Rgba::WHITE)
            .iter()
            .map(|s| s.style.width)
            .collect();
        assert!((widths[0] - BRUSH_MIN_WIDTH).abs() < f32::EPSILON);
        assert!(widths[1] > widths[0]);
        assert!(widths[2] > widths[1]);
        assert!((widths[3] - BRUSH_MIN_WIDTH).abs() < f32::EPSILON);
    }

    #[test]
    fn replay_is_deterministic() {
        let log: StrokeLog = [
            pt(0.0, 0.0, false, ToolKind::Brush),
            pt(3.0, 1.0, true, ToolKind::Brush),
            pt(5.0, 5.0, false, ToolKind::Eraser),
        ]
        .into_iter()
        .collect();
        assert_eq!(log.segments(Rgba::WHITE), log.segments(Rgba::WHITE));
    }

    #[test]
    fn json_roundtrip_keeps_order() {
        let log: StrokeLog = [
            pt(1.0, 2.0, false, ToolKind::Pencil),
            pt(3.0, 4.0, true, ToolKind::Eraser),
        ]
        .into_iter()
        .collect();
        let json = log.to_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"eraser\""));
        assert_eq!(StrokeLog::from_json(&json).unwrap(), log);
    }
}
