//! Interactive painting session.

use bevy::log::debug;
use bevy::prelude::*;

use super::{BrushSettings, paint_directions};
use crate::config::ConfigError;
use crate::mesh::FlowGrid;
use crate::texture::FlowTexture;

/// Squared movement below which a drag sample is treated as jitter.
pub const DRAG_EPSILON_SQ: f32 = 1e-16;

/// Where the pointer ray met the grid, in the grid's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Phase of the current painting gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StrokeState {
    /// No pointer is down.
    #[default]
    Idle,
    /// The pointer is down but has not touched the grid yet.
    Started,
    /// The pointer is dragging across the grid from `previous`.
    Dragging { previous: Vec3 },
}

/// What a drag sample did to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// No stroke in progress, or no grid to paint.
    Ignored,
    /// The sample became the stroke's anchor; nothing was painted.
    Anchored,
    /// The pointer did not move far enough to define a direction.
    Degenerate,
    /// Directions were blended into `touched` vertices.
    Painted { touched: usize },
}

/// A painting session owning the live grid and the stroke state.
///
/// Only one stroke can be active at a time. Strokes are driven by
/// [`begin_stroke`](Self::begin_stroke), repeated
/// [`continue_stroke`](Self::continue_stroke) samples, and
/// [`end_stroke`](Self::end_stroke).
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_flowmap_painter::brush::{BrushHit, BrushSettings, FlowPainter, StrokeOutcome};
///
/// let mut painter = FlowPainter::new();
/// painter.rebuild(4, None).unwrap();
///
/// let hit = |x: f32| BrushHit {
///     point: Vec3::new(x, 0.0, 0.5),
///     normal: Vec3::Y,
///     uv: Vec2::new(x, 0.5),
/// };
/// let brush = BrushSettings::default();
///
/// painter.begin_stroke(Some(hit(0.4)));
/// let outcome = painter.continue_stroke(hit(0.5), 1.0, &brush);
/// assert!(matches!(outcome, StrokeOutcome::Painted { .. }));
/// assert!(painter.end_stroke());
/// ```
#[derive(Resource, Debug, Default)]
pub struct FlowPainter {
    grid: Option<FlowGrid>,
    state: StrokeState,
    current_position: Vec3,
    current_direction: Vec3,
}

impl FlowPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the grid, releasing the previous one first.
    ///
    /// Any stroke in progress is dropped.
    pub fn rebuild(
        &mut self,
        division: u32,
        source: Option<&dyn FlowTexture>,
    ) -> Result<&FlowGrid, ConfigError> {
        self.grid = None;
        self.state = StrokeState::Idle;
        self.current_direction = Vec3::ZERO;

        let grid = FlowGrid::build(division, source)?;
        Ok(self.grid.insert(grid))
    }

    /// Drop the grid.
    pub fn clear(&mut self) {
        self.grid = None;
        self.state = StrokeState::Idle;
        self.current_direction = Vec3::ZERO;
    }

    pub fn grid(&self) -> Option<&FlowGrid> {
        self.grid.as_ref()
    }

    pub fn grid_mut(&mut self) -> Option<&mut FlowGrid> {
        self.grid.as_mut()
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_stroking(&self) -> bool {
        self.state != StrokeState::Idle
    }

    /// Last painted position, in grid space.
    pub fn current_position(&self) -> Vec3 {
        self.current_position
    }

    /// Last drag direction, zero between strokes.
    pub fn current_direction(&self) -> Vec3 {
        self.current_direction
    }

    /// Start a stroke on pointer-down.
    ///
    /// If the pointer already hits the grid, that point anchors the stroke.
    pub fn begin_stroke(&mut self, hit: Option<BrushHit>) {
        self.state = StrokeState::Started;
        if let Some(hit) = hit {
            self.anchor(hit.point);
        }
    }

    /// Feed one drag sample.
    ///
    /// The first sample after pointer-down only anchors the stroke. Later
    /// samples paint along the movement since the previous sample, projected
    /// onto the grid plane.
    pub fn continue_stroke(
        &mut self,
        hit: BrushHit,
        pressure: f32,
        brush: &BrushSettings,
    ) -> StrokeOutcome {
        let Some(grid) = self.grid.as_mut() else {
            return StrokeOutcome::Ignored;
        };

        match self.state {
            StrokeState::Idle => StrokeOutcome::Ignored,
            StrokeState::Started => {
                self.anchor(hit.point);
                StrokeOutcome::Anchored
            }
            StrokeState::Dragging { previous } => {
                let mut delta = hit.point - previous;
                delta.y = 0.0;

                if delta.length_squared() < DRAG_EPSILON_SQ {
                    return StrokeOutcome::Degenerate;
                }

                let direction = delta.normalize();
                let pressure = pressure.clamp(0.0, 1.0);
                let touched = paint_directions(grid, hit.uv, direction, brush, pressure);

                self.state = StrokeState::Dragging {
                    previous: hit.point,
                };
                self.current_position = hit.point;
                self.current_direction = direction;

                StrokeOutcome::Painted { touched }
            }
        }
    }

    /// Finish the stroke on pointer-up.
    ///
    /// Returns `true` if a stroke was in progress, in which case the field
    /// should be baked.
    pub fn end_stroke(&mut self) -> bool {
        let was_stroking = self.is_stroking();
        self.state = StrokeState::Idle;
        self.current_direction = Vec3::ZERO;

        if was_stroking {
            debug!("Flow stroke ended at {:?}", self.current_position);
        }
        was_stroking
    }

    fn anchor(&mut self, point: Vec3) {
        self.state = StrokeState::Dragging { previous: point };
        self.current_position = point;
    }
}
