//! Camera rig: two projection modes, smoothed follow, zoom, checkpoints.
//!
//! The rig tracks the avatar unless a focus override is active. Position and
//! orbit target lerp toward their ideal values each tick; `snap` jumps there
//! immediately (floor load, mode toggle, viewport restore).

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// How the scene is projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Oblique offset from the look-at target.
    Angled,
    /// Directly overhead.
    Top,
}

/// Offset from the look-at target in angled mode, before distance scaling.
const ANGLED_OFFSET: Vec3 = Vec3 {
    x: -5.5,
    y: 5.2,
    z: -5.5,
};
const CAMERA_DISTANCE_FACTOR: f32 = 6.0;
/// Overhead height in top mode.
const TOP_HEIGHT: f32 = 28.0 * CAMERA_DISTANCE_FACTOR;

/// Smoothing factor for per-tick follow interpolation.
pub const LERP_ALPHA: f32 = 0.08;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.2;

/// Checkpoint of the full camera/avatar vantage. Restoring snaps, so a
/// save/restore round trip is exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub mode: ProjectionMode,
    pub player_position: Vec3,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub zoom: f32,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    mode: ProjectionMode,
    zoom: f32,
    position: Vec3,
    target: Vec3,
    focus: Option<Vec3>,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraRig {
    /// A rig snapped onto the origin in angled mode at default zoom.
    pub fn new() -> Self {
        let mut rig = Self {
            mode: ProjectionMode::Angled,
            zoom: 1.0,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            focus: None,
        };
        rig.snap(Vec3::ZERO);
        rig
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn focus(&self) -> Option<Vec3> {
        self.focus
    }

    /// Ideal camera position for the current mode looking at `look`.
    fn ideal_position(&self, look: Vec3) -> Vec3 {
        match self.mode {
            ProjectionMode::Angled => look + ANGLED_OFFSET.scale(CAMERA_DISTANCE_FACTOR),
            ProjectionMode::Top => Vec3::new(look.x, TOP_HEIGHT, look.z),
        }
    }

    fn look_point(&self, player: Vec3) -> Vec3 {
        self.focus.unwrap_or(player)
    }

    /// Per-tick smoothing toward the ideal vantage.
    pub fn update(&mut self, player: Vec3) {
        let look = self.look_point(player);
        let ideal = self.ideal_position(look);
        self.position = self.position.lerp(ideal, LERP_ALPHA);
        self.target = self.target.lerp(look, LERP_ALPHA);
    }

    /// Jump straight to the ideal vantage — no interpolation.
    pub fn snap(&mut self, player: Vec3) {
        let look = self.look_point(player);
        self.target = look;
        self.position = self.ideal_position(look);
    }

    /// Override the look-at target without moving the avatar.
    pub fn focus_on(&mut self, point: Vec3) {
        self.focus = Some(point);
    }

    /// Resume avatar-follow.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    pub fn set_mode(&mut self, mode: ProjectionMode, player: Vec3) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.snap(player);
    }

    pub fn toggle_mode(&mut self, player: Vec3) {
        let next = match self.mode {
            ProjectionMode::Angled => ProjectionMode::Top,
            ProjectionMode::Top => ProjectionMode::Angled,
        };
        self.set_mode(next, player);
    }

    /// Step zoom in. Returns whether the value changed (no-op at the bound).
    pub fn zoom_in(&mut self) -> bool {
        self.adjust_zoom(ZOOM_STEP)
    }

    /// Step zoom out. Returns whether the value changed (no-op at the bound).
    pub fn zoom_out(&mut self) -> bool {
        self.adjust_zoom(-ZOOM_STEP)
    }

    fn adjust_zoom(&mut self, delta: f32) -> bool {
        let next = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        if (next - self.zoom).abs() < f32::EPSILON {
            return false;
        }
        self.zoom = next;
        true
    }

    /// Capture the full vantage for later restore.
    pub fn save(&self, player: Vec3) -> ViewportState {
        ViewportState {
            mode: self.mode,
            player_position: player,
            camera_position: self.position,
            camera_target: self.target,
            zoom: self.zoom,
        }
    }

    /// Re-apply a checkpoint exactly. The caller restores the avatar from
    /// `state.player_position`; the rig takes everything else verbatim.
    pub fn restore(&mut self, state: &ViewportState) {
        self.mode = state.mode;
        self.zoom = state.zoom;
        self.position = state.camera_position;
        self.target = state.camera_target;
        self.focus = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rig_snaps_to_origin() {
        let rig = CameraRig::new();
        assert_eq!(rig.target(), Vec3::ZERO);
        assert_eq!(rig.position(), ANGLED_OFFSET.scale(CAMERA_DISTANCE_FACTOR));
    }

    #[test]
    fn update_converges_to_player() {
        let mut rig = CameraRig::new();
        let player = Vec3::new(10.0, 0.4, -6.0);
        for _ in 0..600 {
            rig.update(player);
        }
        assert!((rig.target() - player).length() < 0.01);
        let ideal = player + ANGLED_OFFSET.scale(CAMERA_DISTANCE_FACTOR);
        assert!((rig.position() - ideal).length() < 0.01);
    }

    #[test]
    fn snap_is_immediate() {
        let mut rig = CameraRig::new();
        let player = Vec3::new(50.0, 0.4, 20.0);
        rig.snap(player);
        assert_eq!(rig.target(), player);
        assert_eq!(
            rig.position(),
            player + ANGLED_OFFSET.scale(CAMERA_DISTANCE_FACTOR)
        );
    }

    #[test]
    fn top_mode_is_overhead() {
        let mut rig = CameraRig::new();
        let player = Vec3::new(3.0, 0.4, 7.0);
        rig.set_mode(ProjectionMode::Top, player);
        assert_eq!(rig.position(), Vec3::new(3.0, TOP_HEIGHT, 7.0));
        assert_eq!(rig.target(), player);
    }

    #[test]
    fn toggle_flips_and_snaps() {
        let mut rig = CameraRig::new();
        let player = Vec3::ZERO;
        rig.toggle_mode(player);
        assert_eq!(rig.mode(), ProjectionMode::Top);
        assert_eq!(rig.position().y, TOP_HEIGHT);
        rig.toggle_mode(player);
        assert_eq!(rig.mode(), ProjectionMode::Angled);
    }

    #[test]
    fn set_same_mode_does_not_snap() {
        let mut rig = CameraRig::new();
        let player = Vec3::new(5.0, 0.0, 5.0);
        // Drift the rig somewhere mid-lerp.
        rig.update(player);
        let mid = rig.position();
        rig.set_mode(ProjectionMode::Angled, player);
        assert_eq!(rig.position(), mid);
    }

    #[test]
    fn focus_overrides_follow_until_cleared() {
        let mut rig = CameraRig::new();
        let player = Vec3::ZERO;
        let poi = Vec3::new(12.0, 0.0, 4.0);
        rig.focus_on(poi);
        for _ in 0..600 {
            rig.update(player);
        }
        assert!((rig.target() - poi).length() < 0.01);
        rig.clear_focus();
        for _ in 0..600 {
            rig.update(player);
        }
        assert!((rig.target() - player).length() < 0.01);
    }

    #[test]
    fn zoom_clamps_at_bounds() {
        let mut rig = CameraRig::new();
        for _ in 0..100 {
            rig.zoom_in();
        }
        assert_eq!(rig.zoom(), MAX_ZOOM);
        assert!(!rig.zoom_in(), "at the bound zoom_in is a no-op");
        for _ in 0..100 {
            rig.zoom_out();
        }
        assert_eq!(rig.zoom(), MIN_ZOOM);
        assert!(!rig.zoom_out(), "at the bound zoom_out is a no-op");
        assert!(rig.zoom_in());
    }

    #[test]
    fn viewport_round_trip_is_exact() {
        let mut rig = CameraRig::new();
        let player = Vec3::new(4.0, 0.4, 9.0);
        rig.zoom_in();
        rig.zoom_in();
        rig.update(player); // leave the rig mid-lerp on purpose
        let saved = rig.save(player);

        // Disturb everything.
        rig.toggle_mode(Vec3::ZERO);
        rig.focus_on(Vec3::new(-3.0, 0.0, -3.0));
        for _ in 0..10 {
            rig.zoom_out();
            rig.update(Vec3::ZERO);
        }

        rig.restore(&saved);
        assert_eq!(rig.save(saved.player_position), saved);
        assert!(rig.focus().is_none());
    }
}
