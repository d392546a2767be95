//! Interaction controller: occupied-zone tracking, selection, focus, and
//! permission propagation.
//!
//! Outbound state changes are returned as [`Notification`] values rather
//! than pushed through callbacks; the host applies them in order (last
//! write wins, synchronously before the next tick).

use crate::access::PermissionSet;
use crate::camera::CameraRig;
use crate::floor::FloorDescriptor;
use crate::layout::{EntityTag, SceneGraph};
use crate::math::Vec3;
use crate::picking::{self, Ray};

/// Outbound state-change notice for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ZoneChanged(Option<String>),
    SelectionChanged(Option<EntityTag>),
    DetailVisibilityChanged(bool),
}

#[derive(Debug, Default)]
pub struct InteractionController {
    current_zone: Option<String>,
    selection: Option<EntityTag>,
    detail_visible: bool,
    permissions: PermissionSet,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_zone(&self) -> Option<&str> {
        self.current_zone.as_deref()
    }

    pub fn selection(&self) -> Option<&EntityTag> {
        self.selection.as_ref()
    }

    pub fn detail_visible(&self) -> bool {
        self.detail_visible
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Per-tick containment check: every room boundary first, then every
    /// area boundary, first match wins. Emits only on an actual change.
    pub fn check_occupied_zone(
        &mut self,
        player: Vec3,
        floor: &FloorDescriptor,
    ) -> Option<Notification> {
        let p = player.to_plan();
        let mut found: Option<String> = None;
        'rooms: for zone in &floor.zones {
            for room in &zone.rooms {
                if room.boundary.is_valid() && room.boundary.contains(p) {
                    found = Some(room.id.clone());
                    break 'rooms;
                }
            }
        }
        if found.is_none() {
            'areas: for zone in &floor.zones {
                for area in &zone.areas {
                    if area.boundary.is_valid() && area.boundary.contains(p) {
                        found = Some(area.id.clone());
                        break 'areas;
                    }
                }
            }
        }
        if found != self.current_zone {
            self.current_zone = found.clone();
            Some(Notification::ZoneChanged(found))
        } else {
            None
        }
    }

    /// Resolve a pointer ray against the pickable primitives. The nearest
    /// hit becomes the selection, the camera focuses its center, and the
    /// detail surface opens. A miss is a silent no-op.
    pub fn handle_click(
        &mut self,
        ray: &Ray,
        graph: &SceneGraph,
        rig: &mut CameraRig,
    ) -> Vec<Notification> {
        let Some(tag) = picking::pick(ray, graph) else {
            return Vec::new();
        };
        let tag = tag.clone();
        rig.focus_on(tag.focus_point());
        self.selection = Some(tag.clone());
        self.detail_visible = true;
        vec![
            Notification::SelectionChanged(Some(tag)),
            Notification::DetailVisibilityChanged(true),
        ]
    }

    /// Focus an entity by id: rooms first, then doors (nested under their
    /// owning room), then areas. Scene clicks open the detail surface;
    /// list-driven focus (`open_detail = false`) only moves the camera.
    /// An unknown id is a no-op and leaves the current selection alone.
    pub fn focus_on_asset(
        &mut self,
        asset_id: &str,
        open_detail: bool,
        floor: &FloorDescriptor,
        rig: &mut CameraRig,
    ) -> Vec<Notification> {
        let Some(tag) = find_asset(floor, asset_id) else {
            return Vec::new();
        };
        rig.focus_on(tag.focus_point());
        self.selection = Some(tag.clone());
        self.detail_visible = open_detail;
        vec![
            Notification::SelectionChanged(Some(tag)),
            Notification::DetailVisibilityChanged(open_detail),
        ]
    }

    /// Drop selection and detail; the camera resumes avatar-follow.
    pub fn clear_focus(&mut self, rig: &mut CameraRig) -> Vec<Notification> {
        rig.clear_focus();
        self.selection = None;
        self.detail_visible = false;
        vec![
            Notification::SelectionChanged(None),
            Notification::DetailVisibilityChanged(false),
        ]
    }

    /// Replace the permission set and recolor doors immediately. If a door
    /// is selected with detail open, the same selection is re-emitted so
    /// dependent UI reflects the new grant state without another click.
    pub fn set_permission_list(
        &mut self,
        ids: Vec<String>,
        graph: &mut SceneGraph,
    ) -> Vec<Notification> {
        self.permissions.replace(ids);
        graph.update_door_states(&self.permissions);

        let mut notes = Vec::new();
        if self.detail_visible {
            if let Some(tag @ EntityTag::Door { .. }) = &self.selection {
                notes.push(Notification::SelectionChanged(Some(tag.clone())));
            }
        }
        notes
    }

    /// Reset transient state on floor reload: zone cleared, detail closed.
    /// The permission set survives the swap.
    pub fn reset_for_reload(&mut self, rig: &mut CameraRig) -> Vec<Notification> {
        let mut notes = Vec::new();
        if self.current_zone.is_some() {
            self.current_zone = None;
            notes.push(Notification::ZoneChanged(None));
        }
        notes.extend(self.clear_focus(rig));
        notes
    }
}

/// Search the floor for an asset id, in the same order the detail UI lists
/// entities: per zone — rooms, each room's doors, then areas.
fn find_asset(floor: &FloorDescriptor, asset_id: &str) -> Option<EntityTag> {
    for zone in &floor.zones {
        for room in &zone.rooms {
            if room.id == asset_id {
                return Some(EntityTag::Room {
                    zone_id: zone.id.clone(),
                    room: room.clone(),
                });
            }
            for door in &room.doors {
                if door.id == asset_id {
                    return Some(EntityTag::Door {
                        zone_id: zone.id.clone(),
                        room_id: room.id.clone(),
                        door: door.clone(),
                    });
                }
            }
        }
        for area in &zone.areas {
            if area.id == asset_id {
                return Some(EntityTag::Area {
                    zone_id: zone.id.clone(),
                    area: area.clone(),
                });
            }
        }
    }
    None
}
