//! Drawing tools and their stroke styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DrillError, Rgba};

/// Line width of the pencil.
pub const PENCIL_WIDTH: f32 = 3.0;
/// Line width of the eraser.
pub const ERASER_WIDTH: f32 = 5.0;
/// Brush width at pen-down.
pub const BRUSH_MIN_WIDTH: f32 = 1.01;
/// Width a 2D context starts from before any style is applied.
pub const INITIAL_WIDTH: f32 = 1.0;

/// Brush growth rate per dragged point.
const BRUSH_GROWTH: f32 = 0.3;
/// Fixed point the brush recurrence converges to.
const BRUSH_LIMIT: f32 = 4.0;

/// The tool a stroke point was drawn with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Thin graphite line of fixed width.
    #[default]
    Pencil,
    /// Black ink that thickens while dragging.
    Brush,
    /// Wide stroke in the background colour.
    Eraser,
}

impl ToolKind {
    /// All tools, in toolbar order.
    pub const ALL: [ToolKind; 3] = [ToolKind::Pencil, ToolKind::Brush, ToolKind::Eraser];

    /// Lowercase name used in the UI and on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Brush => "brush",
            ToolKind::Eraser => "eraser",
        }
    }

    /// Style for a point drawn with this tool.
    ///
    /// `current_width` is the width left over from the previous point. Only
    /// the brush reads it: a dragged brush point grows it by
    /// `w + (w - 1)(4 - w) * 0.3`, a brush pen-down resets it.
    #[must_use]
    pub fn style(self, is_dragging: bool, current_width: f32, background: Rgba) -> StrokeStyle {
        match self {
            ToolKind::Pencil => StrokeStyle {
                color: Rgba::GRAPHITE,
                width: PENCIL_WIDTH,
            },
            ToolKind::Brush => {
                let width = if is_dragging {
                    current_width
                        + (current_width - 1.0) * (BRUSH_LIMIT - current_width) * BRUSH_GROWTH
                } else {
                    BRUSH_MIN_WIDTH
                };
                StrokeStyle {
                    color: Rgba::BLACK,
                    width,
                }
            }
            ToolKind::Eraser => StrokeStyle {
                color: background,
                width: ERASER_WIDTH,
            },
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pencil" => Ok(ToolKind::Pencil),
            "brush" => Ok(ToolKind::Brush),
            "eraser" => Ok(ToolKind::Eraser),
            _ => Err(DrillError::UnknownTool(s.to_string())),
        }
    }
}

/// Colour and width for one rendered segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke colour.
    pub color: Rgba,
    /// Line width in pixels.
    pub width: f32,
}
