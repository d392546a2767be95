//! Floor session: one loaded floor and everything live around it.
//!
//! An explicit value object — no ambient "current floor" global. The host
//! constructs a session with [`FloorSession::load`], drives it once per
//! frame with [`FloorSession::tick`] (player → zone check → camera, in that
//! fixed order), and tears it down with [`FloorSession::dispose`].

use crate::camera::{CameraRig, ProjectionMode, ViewportState};
use crate::floor::FloorDescriptor;
use crate::interaction::{InteractionController, Notification};
use crate::layout::SceneGraph;
use crate::math::Vec2;
use crate::movement::{MoveKey, PlayerController};
use crate::picking;

#[derive(Debug)]
pub struct FloorSession {
    floor: FloorDescriptor,
    graph: SceneGraph,
    player: PlayerController,
    rig: CameraRig,
    interaction: InteractionController,
    /// Last reported drawable surface size, in pixels.
    viewport: Option<(f32, f32)>,
    /// Build in progress — ticks are skipped until the graph is whole again.
    rebuilding: bool,
    disposed: bool,
}

impl FloorSession {
    /// Build the scene for `floor` and spawn the avatar at the origin with
    /// the camera snapped onto it. Doors start denied until a permission
    /// list is pushed.
    pub fn load(mut floor: FloorDescriptor) -> Self {
        let mut graph = SceneGraph::new();
        graph.build(&mut floor);
        let player = PlayerController::new();
        let mut rig = CameraRig::new();
        rig.snap(player.position());
        Self {
            floor,
            graph,
            player,
            rig,
            interaction: InteractionController::new(),
            viewport: None,
            rebuilding: false,
            disposed: false,
        }
    }

    /// Swap in a new floor descriptor, rebuilding the scene in place. The
    /// avatar returns to the origin, the camera snaps, transient interaction
    /// state resets, and the current permission list is re-applied to the
    /// new doors.
    pub fn swap_floor(&mut self, mut floor: FloorDescriptor) -> Vec<Notification> {
        if self.disposed {
            return Vec::new();
        }
        self.rebuilding = true;
        let mut notes = self.interaction.reset_for_reload(&mut self.rig);
        self.graph.build(&mut floor);
        self.floor = floor;
        self.player.reset();
        self.rig.snap(self.player.position());
        self.graph.update_door_states(self.interaction.permissions());
        self.rebuilding = false;
        notes
    }

    /// One frame: player movement, occupied-zone check, camera smoothing —
    /// in that order. Returns the tick's notifications.
    pub fn tick(&mut self, dt: f32) -> Vec<Notification> {
        if self.disposed || self.rebuilding {
            return Vec::new();
        }
        self.player
            .update(dt, &self.floor, &self.graph, self.interaction.permissions());
        let mut notes = Vec::new();
        if let Some(n) = self
            .interaction
            .check_occupied_zone(self.player.position(), &self.floor)
        {
            notes.push(n);
        }
        self.rig.update(self.player.position());
        notes
    }

    /// Resolve a pointer click at surface pixel coordinates. A silent no-op
    /// until the surface size is known.
    pub fn handle_pointer_click(&mut self, screen_x: f32, screen_y: f32) -> Vec<Notification> {
        if self.disposed {
            return Vec::new();
        }
        let Some((w, h)) = self.viewport else {
            return Vec::new();
        };
        if w <= 0.0 || h <= 0.0 {
            return Vec::new();
        }
        let ndc_x = (screen_x / w) * 2.0 - 1.0;
        let ndc_y = -((screen_y / h) * 2.0 - 1.0);
        let Some(ray) = picking::camera_ray(
            self.rig.position(),
            self.rig.target(),
            self.rig.zoom(),
            w / h,
            ndc_x,
            ndc_y,
        ) else {
            return Vec::new();
        };
        self.interaction
            .handle_click(&ray, &self.graph, &mut self.rig)
    }

    pub fn focus_on_asset(&mut self, asset_id: &str, open_detail: bool) -> Vec<Notification> {
        if self.disposed {
            return Vec::new();
        }
        self.interaction
            .focus_on_asset(asset_id, open_detail, &self.floor, &mut self.rig)
    }

    pub fn clear_focus(&mut self) -> Vec<Notification> {
        if self.disposed {
            return Vec::new();
        }
        self.interaction.clear_focus(&mut self.rig)
    }

    /// Push a replacement permission list (last write wins).
    pub fn set_permission_list(&mut self, ids: Vec<String>) -> Vec<Notification> {
        if self.disposed {
            return Vec::new();
        }
        self.interaction.set_permission_list(ids, &mut self.graph)
    }

    /// Warp the avatar to a plan point and snap the camera onto it.
    pub fn teleport_to(&mut self, point: Vec2) {
        if self.disposed {
            return;
        }
        self.player.teleport_to(point);
        self.rig.snap(self.player.position());
    }

    pub fn set_move_key(&mut self, key: MoveKey, active: bool) {
        self.player.set_key(key, active);
    }

    pub fn set_analog_input(&mut self, vector: Option<Vec2>) {
        self.player.set_analog(vector);
    }

    pub fn toggle_projection(&mut self) {
        if self.disposed {
            return;
        }
        self.rig.toggle_mode(self.player.position());
    }

    pub fn set_projection(&mut self, mode: ProjectionMode) {
        if self.disposed {
            return;
        }
        self.rig.set_mode(mode, self.player.position());
    }

    pub fn zoom_in(&mut self) -> bool {
        !self.disposed && self.rig.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        !self.disposed && self.rig.zoom_out()
    }

    /// The host surface changed size. No-op on a disposed session.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.disposed {
            return;
        }
        self.viewport = Some((width, height));
    }

    /// Checkpoint the current vantage (camera + avatar).
    pub fn save_viewport(&self) -> ViewportState {
        self.rig.save(self.player.position())
    }

    /// Re-apply a checkpoint exactly: avatar back where it was, camera
    /// snapped to the saved position/target/zoom/mode.
    pub fn restore_viewport(&mut self, state: &ViewportState) {
        if self.disposed {
            return;
        }
        self.player.teleport_to(state.player_position.to_plan());
        self.rig.restore(state);
    }

    /// Tear down the session. Runs once; later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.graph.dispose();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // Read access for the rendering host.

    pub fn floor(&self) -> &FloorDescriptor {
        &self.floor
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{MAX_ZOOM, MIN_ZOOM};
    use crate::floor::{Area, Boundary, Door, DoorSize, Room, Zone};
    use crate::layout::EntityTag;
    use crate::math::Vec3;

    fn demo_floor(number: i32) -> FloorDescriptor {
        FloorDescriptor {
            floor: number,
            name: format!("Floor {number}"),
            color: 0xdfe6f3,
            walls: vec![],
            zones: vec![Zone {
                id: format!("z{number}"),
                name: "Wing".into(),
                areas: vec![Area {
                    id: format!("lobby-{number}"),
                    name: "Lobby".into(),
                    boundary: Boundary {
                        min: Vec2::new(-10.0, -10.0),
                        max: Vec2::new(10.0, 10.0),
                    },
                    color: None,
                }],
                rooms: vec![Room {
                    id: format!("room-{number}"),
                    name: "Meeting Room".into(),
                    boundary: Boundary {
                        min: Vec2::new(2.0, 2.0),
                        max: Vec2::new(8.0, 8.0),
                    },
                    color: None,
                    doors: vec![Door {
                        id: format!("door-{number}"),
                        center: Vec2::new(2.0, 5.0),
                        size: DoorSize {
                            width: 0.3,
                            depth: 1.2,
                        },
                        access_level: Default::default(),
                    }],
                }],
                objects: vec![],
                boundary: None,
                center: None,
            }],
        }
    }

    #[test]
    fn load_snaps_camera_to_spawned_avatar() {
        let session = FloorSession::load(demo_floor(1));
        assert_eq!(session.rig().target(), session.player().position());
        assert!(!session.is_disposed());
    }

    #[test]
    fn tick_reports_zone_entry_once() {
        let mut session = FloorSession::load(demo_floor(1));
        let notes = session.tick(1.0 / 60.0);
        // Avatar spawns inside the lobby area.
        assert_eq!(
            notes,
            vec![Notification::ZoneChanged(Some("lobby-1".into()))]
        );
        assert!(session.tick(1.0 / 60.0).is_empty());
    }

    #[test]
    fn grant_then_revoke_without_a_click() {
        let mut session = FloorSession::load(demo_floor(1));
        session.set_permission_list(vec!["room-1".into()]);
        assert!(session.graph().doors[0].granted);
        session.set_permission_list(vec![]);
        assert!(!session.graph().doors[0].granted);
    }

    #[test]
    fn pick_vs_list_focus() {
        let mut session = FloorSession::load(demo_floor(1));
        session.resize(800.0, 600.0);
        session.set_projection(ProjectionMode::Top);
        session.teleport_to(Vec2::new(5.0, 5.0)); // over the meeting room

        // A scene click at the screen center opens the detail surface.
        let notes = session.handle_pointer_click(400.0, 300.0);
        assert!(notes.contains(&Notification::DetailVisibilityChanged(true)));
        assert_eq!(session.interaction().selection().unwrap().id(), "room-1");
        assert!(session.interaction().detail_visible());

        // List-driven focus moves the camera but leaves detail closed.
        session.clear_focus();
        let notes = session.focus_on_asset("room-1", false);
        assert!(notes.contains(&Notification::DetailVisibilityChanged(false)));
        assert_eq!(session.interaction().selection().unwrap().id(), "room-1");
        assert!(!session.interaction().detail_visible());
        assert_eq!(session.rig().focus(), Some(Vec3::new(5.0, 0.0, 5.0)));
    }

    #[test]
    fn click_before_resize_is_a_no_op() {
        let mut session = FloorSession::load(demo_floor(1));
        assert!(session.handle_pointer_click(10.0, 10.0).is_empty());
    }

    #[test]
    fn floor_switch_preserves_vantage() {
        let mut session = FloorSession::load(demo_floor(1));
        session.teleport_to(Vec2::new(5.0, 5.0));
        session.zoom_in();
        session.toggle_projection();
        let saved = session.save_viewport();

        session.swap_floor(demo_floor(2));
        assert_eq!(session.player().position().to_plan(), Vec2::ZERO);

        session.swap_floor(demo_floor(1));
        session.restore_viewport(&saved);
        assert_eq!(session.save_viewport(), saved);
    }

    #[test]
    fn swap_floor_resets_zone_and_reapplies_permissions() {
        let mut session = FloorSession::load(demo_floor(1));
        session.tick(1.0 / 60.0); // enter lobby-1
        session.set_permission_list(vec!["door-2".into()]);

        let notes = session.swap_floor(demo_floor(2));
        assert!(notes.contains(&Notification::ZoneChanged(None)));
        // Permission list survived and already applies to the new doors.
        assert!(session.graph().doors[0].granted);
        assert_eq!(session.floor().floor, 2);
    }

    #[test]
    fn zoom_clamps_through_the_session() {
        let mut session = FloorSession::load(demo_floor(1));
        for _ in 0..50 {
            session.zoom_in();
        }
        assert_eq!(session.rig().zoom(), MAX_ZOOM);
        assert!(!session.zoom_in());
        for _ in 0..50 {
            session.zoom_out();
        }
        assert_eq!(session.rig().zoom(), MIN_ZOOM);
        assert!(!session.zoom_out());
    }

    #[test]
    fn dispose_is_idempotent_and_quiets_everything() {
        let mut session = FloorSession::load(demo_floor(1));
        session.resize(800.0, 600.0);
        session.dispose();
        session.dispose();
        assert!(session.is_disposed());
        assert!(session.tick(1.0 / 60.0).is_empty());
        assert!(session.handle_pointer_click(400.0, 300.0).is_empty());
        assert!(session.focus_on_asset("room-1", true).is_empty());
        assert!(session.set_permission_list(vec!["room-1".into()]).is_empty());
        session.resize(100.0, 100.0);
        assert!(session.graph().doors.is_empty());
    }

    #[test]
    fn clicking_a_door_selects_it() {
        let mut session = FloorSession::load(demo_floor(1));
        session.resize(800.0, 600.0);
        session.set_projection(ProjectionMode::Top);
        session.teleport_to(Vec2::new(2.0, 5.0)); // over the door
        let notes = session.handle_pointer_click(400.0, 300.0);
        assert!(!notes.is_empty());
        match session.interaction().selection().unwrap() {
            EntityTag::Door { room_id, .. } => assert_eq!(room_id, "room-1"),
            other => panic!("expected door, got {other:?}"),
        }
    }
}
