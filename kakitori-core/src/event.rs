//! Events and commands exchanged between the surface, the session and the host.

use serde::{Deserialize, Serialize};

use crate::{Raster, ToolKind};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed (pen down).
    Down,
    /// Pointer moved.
    Move,
    /// Button released (pen up).
    Up,
    /// Pointer left the surface; treated like a release.
    Leave,
}

impl PointerPhase {
    /// Parse a DOM-style phase name (`down`, `move`, `up`, `leave`, also the
    /// `mouse*`/`pointer*` event type names).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name
            .strip_prefix("pointer")
            .or_else(|| name.strip_prefix("mouse"))
            .unwrap_or(name);
        match name {
            "down" => Some(Self::Down),
            "move" => Some(Self::Move),
            "up" => Some(Self::Up),
            "leave" | "out" | "cancel" => Some(Self::Leave),
            _ => None,
        }
    }
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in page coordinates.
    pub page_x: f32,
    /// Y position in page coordinates.
    pub page_y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, page_x: f32, page_y: f32) -> Self {
        Self {
            phase,
            page_x,
            page_y,
        }
    }
}

/// Commands sent to the canvas surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Wipe the canvas and its stroke log.
    RequestClear,
    /// Switch the active tool.
    SetTool(ToolKind),
}

/// Events emitted by the canvas surface after it redraws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A point was appended and the surface re-rendered.
    StrokeCommitted(Raster),
    /// The stroke log was deleted; carries the blank raster.
    ClearAcknowledged(Raster),
}

impl SurfaceEvent {
    /// The raster produced by the redraw.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        match self {
            SurfaceEvent::StrokeCommitted(raster) | SurfaceEvent::ClearAcknowledged(raster) => {
                raster
            }
        }
    }

    /// Take the raster out of the event.
    #[must_use]
    pub fn into_raster(self) -> Raster {
        match self {
            SurfaceEvent::StrokeCommitted(raster) | SurfaceEvent::ClearAcknowledged(raster) => {
                raster
            }
        }
    }
}
