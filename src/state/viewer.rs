//! Per-pane view transforms and their synchronization.
//!
//! Four panes always exist (left, right, top, bottom) whichever layout is
//! shown, so switching layouts keeps the transform. Every pane write goes
//! through [`apply_update`], which decides the fan-out to the other panes from
//! the sync flags.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, PAN_STEP, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// Clamp a zoom factor to the supported range. NaN resets to 1.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        1.0
    } else {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// One of the four transform slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Left,
    Right,
    Top,
    Bottom,
}

impl Pane {
    pub const ALL: [Pane; 4] = [Pane::Left, Pane::Right, Pane::Top, Pane::Bottom];

    fn index(self) -> usize {
        match self {
            Pane::Left => 0,
            Pane::Right => 1,
            Pane::Top => 2,
            Pane::Bottom => 3,
        }
    }
}

/// Transform of a single pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    /// Always within [`MIN_ZOOM`, `MAX_ZOOM`]
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    /// Degrees
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// Partial update of a [`ViewerState`]; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewerUpdate {
    pub zoom: Option<f32>,
    pub pan_x: Option<f32>,
    pub pan_y: Option<f32>,
    pub rotation: Option<f32>,
    pub flip_x: Option<bool>,
    pub flip_y: Option<bool>,
}

impl ViewerUpdate {
    pub fn zoom(zoom: f32) -> Self {
        Self {
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    pub fn pan(pan_x: f32, pan_y: f32) -> Self {
        Self {
            pan_x: Some(pan_x),
            pan_y: Some(pan_y),
            ..Self::default()
        }
    }

    pub fn pan_x(pan_x: f32) -> Self {
        Self {
            pan_x: Some(pan_x),
            ..Self::default()
        }
    }

    pub fn pan_y(pan_y: f32) -> Self {
        Self {
            pan_y: Some(pan_y),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f32) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn flip(flip_x: bool, flip_y: bool) -> Self {
        Self {
            flip_x: Some(flip_x),
            flip_y: Some(flip_y),
            ..Self::default()
        }
    }
}

impl ViewerState {
    /// Apply `update`, clamping zoom.
    pub fn merged(mut self, update: &ViewerUpdate) -> Self {
        if let Some(zoom) = update.zoom {
            self.zoom = clamp_zoom(zoom);
        }
        if let Some(pan_x) = update.pan_x {
            self.pan_x = pan_x;
        }
        if let Some(pan_y) = update.pan_y {
            self.pan_y = pan_y;
        }
        if let Some(rotation) = update.rotation {
            self.rotation = rotation;
        }
        if let Some(flip_x) = update.flip_x {
            self.flip_x = flip_x;
        }
        if let Some(flip_y) = update.flip_y {
            self.flip_y = flip_y;
        }
        self
    }
}

/// Which transform groups propagate across panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncFlags {
    pub zoom: bool,
    pub pan: bool,
    pub rotation: bool,
    /// Reserved; nothing reads it yet
    pub scroll: bool,
}

impl Default for SyncFlags {
    fn default() -> Self {
        Self {
            zoom: true,
            pan: true,
            rotation: false,
            scroll: true,
        }
    }
}

/// Compute the next state of all panes after `update` is applied to `target`.
///
/// Zoom, pan and rotation each propagate independently when their flag is on
/// and the update touched them. Pan axes travel together: a pane receiving a
/// pan gets the target's new value for every axis the update set and keeps its
/// own value for the others. Flips never propagate.
pub fn apply_update(
    panes: &[ViewerState; 4],
    target: Pane,
    update: &ViewerUpdate,
    flags: SyncFlags,
) -> [ViewerState; 4] {
    let mut next = *panes;
    let updated = panes[target.index()].merged(update);
    next[target.index()] = updated;

    let propagated = ViewerUpdate {
        zoom: update.zoom.filter(|_| flags.zoom).map(|_| updated.zoom),
        pan_x: update.pan_x.filter(|_| flags.pan).map(|_| updated.pan_x),
        pan_y: update.pan_y.filter(|_| flags.pan).map(|_| updated.pan_y),
        rotation: update
            .rotation
            .filter(|_| flags.rotation)
            .map(|_| updated.rotation),
        flip_x: None,
        flip_y: None,
    };

    if propagated != ViewerUpdate::default() {
        for pane in Pane::ALL.into_iter().filter(|p| *p != target) {
            next[pane.index()] = panes[pane.index()].merged(&propagated);
        }
    }

    next
}

/// Modifier and delta state of a mouse-wheel event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelInput {
    pub delta_x: Option<f32>,
    pub delta_y: f32,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Transform state of every pane plus the sync flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerSync {
    panes: [ViewerState; 4],
    flags: SyncFlags,
}

impl ViewerSync {
    pub fn new(flags: SyncFlags) -> Self {
        Self {
            panes: [ViewerState::default(); 4],
            flags,
        }
    }

    pub fn pane(&self, pane: Pane) -> ViewerState {
        self.panes[pane.index()]
    }

    pub fn left(&self) -> ViewerState {
        self.pane(Pane::Left)
    }

    pub fn right(&self) -> ViewerState {
        self.pane(Pane::Right)
    }

    pub fn top(&self) -> ViewerState {
        self.pane(Pane::Top)
    }

    pub fn bottom(&self) -> ViewerState {
        self.pane(Pane::Bottom)
    }

    pub fn flags(&self) -> SyncFlags {
        self.flags
    }

    pub fn set_sync_zoom(&mut self, enabled: bool) {
        self.flags.zoom = enabled;
    }

    pub fn set_sync_pan(&mut self, enabled: bool) {
        self.flags.pan = enabled;
    }

    pub fn set_sync_rotation(&mut self, enabled: bool) {
        self.flags.rotation = enabled;
    }

    pub fn set_sync_scroll(&mut self, enabled: bool) {
        self.flags.scroll = enabled;
    }

    pub fn set_pane(&mut self, pane: Pane, update: ViewerUpdate) {
        self.panes = apply_update(&self.panes, pane, &update, self.flags);
    }

    pub fn set_left(&mut self, update: ViewerUpdate) {
        self.set_pane(Pane::Left, update);
    }

    pub fn set_right(&mut self, update: ViewerUpdate) {
        self.set_pane(Pane::Right, update);
    }

    pub fn set_top(&mut self, update: ViewerUpdate) {
        self.set_pane(Pane::Top, update);
    }

    pub fn set_bottom(&mut self, update: ViewerUpdate) {
        self.set_pane(Pane::Bottom, update);
    }

    fn broadcast(&mut self, update: ViewerUpdate) {
        for state in &mut self.panes {
            *state = state.merged(&update);
        }
    }

    /// Set zoom on every pane regardless of the sync flags.
    pub fn sync_zoom_to_all(&mut self, zoom: f32) {
        self.broadcast(ViewerUpdate::zoom(zoom));
    }

    /// Set pan on every pane regardless of the sync flags.
    pub fn sync_pan_to_all(&mut self, pan_x: f32, pan_y: f32) {
        self.broadcast(ViewerUpdate::pan(pan_x, pan_y));
    }

    /// Set rotation on every pane regardless of the sync flags.
    pub fn sync_rotation_to_all(&mut self, rotation: f32) {
        self.broadcast(ViewerUpdate::rotation(rotation));
    }

    pub fn reset_viewer(&mut self, pane: Pane) {
        self.panes[pane.index()] = ViewerState::default();
    }

    pub fn reset_all_viewers(&mut self) {
        self.panes = [ViewerState::default(); 4];
    }

    /// One zoom step in, relative to the left pane, applied to all panes.
    pub fn zoom_in(&mut self) {
        self.sync_zoom_to_all(self.left().zoom * ZOOM_IN_FACTOR);
    }

    /// One zoom step out, relative to the left pane, applied to all panes.
    pub fn zoom_out(&mut self) {
        self.sync_zoom_to_all(self.left().zoom * ZOOM_OUT_FACTOR);
    }

    /// Shift every pane by a delta relative to the left pane's pan.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let left = self.left();
        self.sync_pan_to_all(left.pan_x + dx, left.pan_y + dy);
    }

    /// Drag gesture: pan from the position captured at drag start.
    pub fn drag_pan(&mut self, start_x: f32, start_y: f32, dx: f32, dy: f32) {
        self.sync_pan_to_all(start_x + dx, start_y + dy);
    }

    /// Wheel handling: ctrl/meta zooms, shift pans horizontally, plain pans
    /// vertically, alt is ignored.
    pub fn handle_wheel(&mut self, input: WheelInput) {
        if input.alt {
            return;
        }

        if input.ctrl || input.meta {
            if input.delta_y > 0.0 {
                self.zoom_out();
            } else {
                self.zoom_in();
            }
            return;
        }

        let step = |delta: f32| if delta > 0.0 { -PAN_STEP } else { PAN_STEP };

        if input.shift {
            let delta = input.delta_x.unwrap_or(input.delta_y);
            self.pan_by(step(delta), 0.0);
        } else {
            self.pan_by(0.0, step(input.delta_y));
        }
    }
}
