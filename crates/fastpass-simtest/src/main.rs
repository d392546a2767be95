//! fastpass Headless Engine Harness
//!
//! Exercises the floor-plan engine end-to-end against the bundled demo
//! building — no window, no GPU, no rendering.
//!
//! Usage:
//!   cargo run -p fastpass-simtest
//!   cargo run -p fastpass-simtest -- --verbose

use std::collections::HashSet;

use rand::Rng;

use fastpass_logic::access::PermissionSet;
use fastpass_logic::camera::{CameraRig, ProjectionMode, MAX_ZOOM, MIN_ZOOM};
use fastpass_logic::floor::FloorDescriptor;
use fastpass_logic::interaction::InteractionController;
use fastpass_logic::layout::SceneGraph;
use fastpass_logic::math::{Vec2, Vec3};
use fastpass_logic::movement::{MoveKey, PlayerController, AVATAR_RADIUS};
use fastpass_logic::session::FloorSession;

// ── Demo building (same JSON the client ships) ──────────────────────────
const BUILDING_JSON: &str = include_str!("../../../data/building.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== fastpass Engine Harness ===\n");

    let mut results = Vec::new();

    let floors: Vec<FloorDescriptor> = match serde_json::from_str(BUILDING_JSON) {
        Ok(f) => f,
        Err(e) => {
            println!("FATAL: building.json parse error: {e}");
            std::process::exit(1);
        }
    };

    // 1. Building data validation
    results.extend(validate_building_data(&floors, verbose));

    // 2. Geometry build and rebuild idempotence
    results.extend(validate_geometry_build(&floors, verbose));

    // 3. Containment sweep (randomized sample points)
    results.extend(validate_containment(&floors, verbose));

    // 4. Door visibility law
    results.extend(validate_door_visibility(&floors, verbose));

    // 5. Camera rig invariants
    results.extend(validate_camera_rig(verbose));

    // 6. Session scenarios
    results.extend(validate_session_scenarios(&floors, verbose));

    // 7. Movement and door gating
    results.extend(validate_movement(&floors, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Building data ────────────────────────────────────────────────────

fn validate_building_data(floors: &[FloorDescriptor], _verbose: bool) -> Vec<TestResult> {
    println!("--- Building Data ---");
    let mut results = Vec::new();

    results.push(check(
        "building_floor_count",
        floors.len() >= 2,
        format!("{} floors", floors.len()),
    ));

    let mut door_ids: Vec<&str> = Vec::new();
    let mut room_ids: HashSet<&str> = HashSet::new();
    for floor in floors {
        for zone in &floor.zones {
            for r in &zone.rooms {
                room_ids.insert(&r.id);
                for d in &r.doors {
                    door_ids.push(&d.id);
                }
            }
        }
    }
    let unique: HashSet<&str> = door_ids.iter().copied().collect();
    results.push(check(
        "door_ids_unique",
        unique.len() == door_ids.len(),
        format!("{} doors", door_ids.len()),
    ));
    results.push(check(
        "door_ids_never_reuse_room_ids",
        door_ids.iter().all(|d| !room_ids.contains(d)),
        "door/room id namespaces disjoint".into(),
    ));

    let all_valid = floors.iter().all(|f| {
        f.zones.iter().all(|z| {
            z.rooms.iter().all(|r| r.boundary.is_valid())
                && z.areas.iter().all(|a| a.boundary.is_valid())
                && z.objects.iter().all(|o| o.boundary.is_valid())
        })
    });
    results.push(check(
        "boundaries_valid",
        all_valid,
        "every shipped boundary is min < max".into(),
    ));

    results
}

// ── 2. Geometry build ───────────────────────────────────────────────────

fn validate_geometry_build(floors: &[FloorDescriptor], verbose: bool) -> Vec<TestResult> {
    println!("--- Geometry Build ---");
    let mut results = Vec::new();

    for source in floors {
        let mut floor = source.clone();
        let mut graph = SceneGraph::new();
        graph.build(&mut floor);

        let label = format!("floor {}", floor.floor);
        results.push(check(
            &format!("build_clean_{}", floor.floor),
            graph.skipped.is_empty(),
            format!(
                "{label}: {} walls, {} surfaces, {} doors, {} objects, {} skipped",
                graph.walls.len(),
                graph.surfaces.len(),
                graph.doors.len(),
                graph.objects.len(),
                graph.skipped.len()
            ),
        ));

        results.push(check(
            &format!("zone_bounds_derived_{}", floor.floor),
            floor
                .zones
                .iter()
                .all(|z| z.boundary.is_some() && z.center.is_some()),
            format!("{label}: every zone got derived bounds"),
        ));

        // Rebuild: identical counts and identical colors per entity id.
        let counts = (graph.walls.len(), graph.surfaces.len(), graph.doors.len());
        let colors: Vec<_> = floor
            .zones
            .iter()
            .flat_map(|z| z.rooms.iter().map(|r| r.id.clone()))
            .map(|id| (id.clone(), graph.assigned_color(&id)))
            .collect();
        graph.build(&mut floor);
        let same_counts =
            counts == (graph.walls.len(), graph.surfaces.len(), graph.doors.len());
        let same_colors = colors
            .iter()
            .all(|(id, c)| graph.assigned_color(id) == *c && c.is_some());
        results.push(check(
            &format!("rebuild_idempotent_{}", floor.floor),
            same_counts && same_colors,
            format!("{label}: counts and palette stable across rebuild"),
        ));

        if verbose {
            println!("  {label}: bounds {:?}", graph.bounds);
        }
    }

    // Malformed data degrades gracefully, never fatally.
    let mut broken = floors[0].clone();
    broken.walls.push(fastpass_logic::floor::Segment {
        start: Vec2::new(1.0, 1.0),
        end: Vec2::new(1.0, 1.0),
    });
    if let Some(room) = broken.zones[0].rooms.first_mut() {
        room.boundary.max = room.boundary.min; // degenerate
    }
    let mut graph = SceneGraph::new();
    graph.build(&mut broken);
    results.push(check(
        "malformed_entities_skipped",
        graph.skipped.len() == 2 && !graph.surfaces.is_empty(),
        format!("{} skipped, rest of floor built", graph.skipped.len()),
    ));

    results
}

// ── 3. Containment ──────────────────────────────────────────────────────

fn validate_containment(floors: &[FloorDescriptor], _verbose: bool) -> Vec<TestResult> {
    println!("--- Containment Sweep ---");
    let mut results = Vec::new();
    let mut rng = rand::thread_rng();
    let samples_per_entity = 40;

    let mut room_hits = 0u32;
    let mut room_total = 0u32;
    for floor in floors {
        for zone in &floor.zones {
            for room in &zone.rooms {
                for _ in 0..samples_per_entity {
                    let b = &room.boundary;
                    let p = Vec2::new(
                        rng.gen_range(b.min.x + 0.05..b.max.x - 0.05),
                        rng.gen_range(b.min.y + 0.05..b.max.y - 0.05),
                    );
                    let mut ic = InteractionController::new();
                    ic.check_occupied_zone(Vec3::from_plan(p, AVATAR_RADIUS), floor);
                    room_total += 1;
                    if ic.current_zone() == Some(room.id.as_str()) {
                        room_hits += 1;
                    }
                }
            }
        }
    }
    results.push(check(
        "containment_rooms",
        room_hits == room_total,
        format!("{room_hits}/{room_total} sampled room points report the room"),
    ));

    // Area points (outside every room) report the area.
    let mut area_hits = 0u32;
    let mut area_total = 0u32;
    for floor in floors {
        let in_any_room = |p: Vec2| {
            floor
                .zones
                .iter()
                .flat_map(|z| z.rooms.iter())
                .any(|r| r.boundary.contains(p))
        };
        for zone in &floor.zones {
            for a in &zone.areas {
                let mut taken = 0;
                while taken < samples_per_entity {
                    let b = &a.boundary;
                    let p = Vec2::new(
                        rng.gen_range(b.min.x + 0.05..b.max.x - 0.05),
                        rng.gen_range(b.min.y + 0.05..b.max.y - 0.05),
                    );
                    if in_any_room(p) {
                        continue; // rooms win; resample pure-area points
                    }
                    taken += 1;
                    let mut ic = InteractionController::new();
                    ic.check_occupied_zone(Vec3::from_plan(p, AVATAR_RADIUS), floor);
                    area_total += 1;
                    if ic.current_zone() == Some(a.id.as_str()) {
                        area_hits += 1;
                    }
                }
            }
        }
    }
    results.push(check(
        "containment_areas",
        area_hits == area_total,
        format!("{area_hits}/{area_total} sampled area points report the area"),
    ));

    // Points far outside the building report nothing.
    let floor = &floors[0];
    let mut outside_ok = true;
    for _ in 0..200 {
        let p = Vec2::new(rng.gen_range(200.0..400.0), rng.gen_range(200.0..400.0));
        let mut ic = InteractionController::new();
        let note = ic.check_occupied_zone(Vec3::from_plan(p, AVATAR_RADIUS), floor);
        if note.is_some() || ic.current_zone().is_some() {
            outside_ok = false;
        }
    }
    results.push(check(
        "containment_outside_is_null",
        outside_ok,
        "points outside every boundary report null".into(),
    ));

    results
}

// ── 4. Door visibility law ──────────────────────────────────────────────

fn validate_door_visibility(floors: &[FloorDescriptor], _verbose: bool) -> Vec<TestResult> {
    println!("--- Door Visibility Law ---");
    let mut results = Vec::new();
    let mut checked = 0u32;
    let mut ok = true;

    for source in floors {
        let mut floor = source.clone();
        let mut graph = SceneGraph::new();
        graph.build(&mut floor);

        for zone in &floor.zones {
            for room in &zone.rooms {
                for d in &room.doors {
                    let cases: [(Vec<String>, bool); 5] = [
                        (vec![], false),
                        (vec![d.id.clone()], true),
                        (vec![room.id.clone()], true),
                        (vec![d.id.clone(), room.id.clone()], true),
                        (vec!["unrelated-asset".to_string()], false),
                    ];
                    for (ids, expect) in cases {
                        let perms: PermissionSet = ids.into_iter().collect();
                        graph.update_door_states(&perms);
                        let prim = graph
                            .doors
                            .iter()
                            .find(|p| p.door_id == d.id)
                            .expect("door prim exists");
                        checked += 1;
                        if prim.granted != expect {
                            ok = false;
                        }
                    }
                }
            }
        }
    }
    results.push(check(
        "door_visibility_law",
        ok,
        format!("granted iff door-id or room-id listed ({checked} cases)"),
    ));
    results
}

// ── 5. Camera rig ───────────────────────────────────────────────────────

fn validate_camera_rig(_verbose: bool) -> Vec<TestResult> {
    println!("--- Camera Rig ---");
    let mut results = Vec::new();

    let mut rig = CameraRig::new();
    for _ in 0..100 {
        rig.zoom_in();
    }
    let top_clamped = rig.zoom() == MAX_ZOOM && !rig.zoom_in();
    for _ in 0..100 {
        rig.zoom_out();
    }
    let bottom_clamped = rig.zoom() == MIN_ZOOM && !rig.zoom_out();
    results.push(check(
        "zoom_clamp",
        top_clamped && bottom_clamped,
        format!("zoom stays within [{MIN_ZOOM}, {MAX_ZOOM}], bound is a no-op"),
    ));

    let mut rig = CameraRig::new();
    let player = Vec3::new(7.0, AVATAR_RADIUS, -3.0);
    rig.zoom_in();
    rig.update(player); // drift mid-lerp on purpose
    let saved = rig.save(player);
    rig.toggle_mode(Vec3::ZERO);
    for _ in 0..25 {
        rig.zoom_out();
        rig.update(Vec3::ZERO);
    }
    rig.restore(&saved);
    results.push(check(
        "viewport_round_trip",
        rig.save(saved.player_position) == saved,
        "restore(save()) reproduces the exact tuple".into(),
    ));

    let mut rig = CameraRig::new();
    rig.focus_on(Vec3::new(10.0, 0.0, 10.0));
    for _ in 0..800 {
        rig.update(Vec3::ZERO);
    }
    let focused = (rig.target() - Vec3::new(10.0, 0.0, 10.0)).length() < 0.01;
    rig.clear_focus();
    for _ in 0..800 {
        rig.update(Vec3::ZERO);
    }
    let followed = rig.target().length() < 0.01;
    results.push(check(
        "focus_override_then_follow",
        focused && followed,
        "focus overrides follow; clearing resumes it".into(),
    ));

    results
}

// ── 6. Session scenarios ────────────────────────────────────────────────

fn validate_session_scenarios(floors: &[FloorDescriptor], _verbose: bool) -> Vec<TestResult> {
    println!("--- Session Scenarios ---");
    let mut results = Vec::new();

    // Grant then revoke, no click required.
    let mut session = FloorSession::load(floors[0].clone());
    let (room_id, door_id) = first_room_and_door(&floors[0]);
    session.set_permission_list(vec![room_id.clone()]);
    let granted = door_state(&session, &door_id);
    session.set_permission_list(vec![]);
    let revoked = !door_state(&session, &door_id);
    results.push(check(
        "grant_then_revoke",
        granted && revoked,
        format!("{door_id} follows a {room_id} grant and instant revoke"),
    ));

    // Scene pick opens detail; list focus does not.
    let mut session = FloorSession::load(floors[0].clone());
    session.resize(1280.0, 720.0);
    session.set_projection(ProjectionMode::Top);
    let room_center = floors[0].zones[1].rooms[0].boundary.center();
    let picked_id = floors[0].zones[1].rooms[0].id.clone();
    session.teleport_to(room_center);
    session.handle_pointer_click(640.0, 360.0);
    let click_opens = session.interaction().detail_visible()
        && session.interaction().selection().map(|t| t.id().to_string())
            == Some(picked_id.clone());
    session.clear_focus();
    session.focus_on_asset(&picked_id, false);
    let list_stays_closed = !session.interaction().detail_visible()
        && session.interaction().selection().is_some();
    results.push(check(
        "pick_vs_list_focus",
        click_opens && list_stays_closed,
        format!("clicking {picked_id} opens detail; list focus leaves it closed"),
    ));

    // Floor switch preserves the saved vantage.
    let mut session = FloorSession::load(floors[0].clone());
    session.teleport_to(Vec2::new(3.0, 4.0));
    session.zoom_in();
    session.toggle_projection();
    let saved = session.save_viewport();
    session.swap_floor(floors[1].clone());
    session.swap_floor(floors[0].clone());
    session.restore_viewport(&saved);
    results.push(check(
        "floor_switch_preserves_vantage",
        session.save_viewport() == saved,
        "vantage restored exactly after A → B → A".into(),
    ));

    // Unknown asset focus is a silent no-op.
    let mut session = FloorSession::load(floors[0].clone());
    session.focus_on_asset(&picked_id, true);
    let notes = session.focus_on_asset("no-such-asset", true);
    results.push(check(
        "unknown_asset_no_op",
        notes.is_empty()
            && session.interaction().selection().map(|t| t.id().to_string())
                == Some(picked_id.clone()),
        "unknown id leaves selection untouched".into(),
    ));

    // Dispose quiets everything and is idempotent.
    let mut session = FloorSession::load(floors[0].clone());
    session.resize(1280.0, 720.0);
    session.dispose();
    session.dispose();
    let quiet = session.tick(1.0 / 60.0).is_empty()
        && session.handle_pointer_click(640.0, 360.0).is_empty();
    results.push(check(
        "dispose_idempotent",
        quiet && session.is_disposed(),
        "post-dispose calls are no-ops".into(),
    ));

    results
}

fn first_room_and_door(floor: &FloorDescriptor) -> (String, String) {
    for zone in &floor.zones {
        for room in &zone.rooms {
            if let Some(door) = room.doors.first() {
                return (room.id.clone(), door.id.clone());
            }
        }
    }
    panic!("demo building has no doored room");
}

fn door_state(session: &FloorSession, door_id: &str) -> bool {
    session
        .graph()
        .doors
        .iter()
        .find(|d| d.door_id == door_id)
        .map(|d| d.granted)
        .unwrap_or(false)
}

// ── 7. Movement ─────────────────────────────────────────────────────────

fn validate_movement(floors: &[FloorDescriptor], _verbose: bool) -> Vec<TestResult> {
    println!("--- Movement & Door Gating ---");
    let mut results = Vec::new();

    let mut floor = floors[0].clone();
    let mut graph = SceneGraph::new();
    graph.build(&mut floor);

    // Walking west from the lobby into the wing partition stops at the wall.
    let mut pc = PlayerController::new();
    pc.teleport_to(Vec2::new(-4.0, -3.0));
    pc.set_key(MoveKey::Left, true);
    let denied = PermissionSet::new();
    for _ in 0..600 {
        pc.update(1.0 / 60.0, &floor, &graph, &denied);
    }
    results.push(check(
        "wall_blocks_avatar",
        pc.position().x > -6.0,
        format!("stopped at x = {:.2} before the partition", pc.position().x),
    ));

    // The mechanical-room door gates on the permission list.
    let mut pc = PlayerController::new();
    pc.teleport_to(Vec2::new(-4.0, 1.0));
    pc.set_key(MoveKey::Left, true);
    for _ in 0..600 {
        pc.update(1.0 / 60.0, &floor, &graph, &denied);
    }
    let blocked = pc.position().x > -6.0;

    let granted: PermissionSet = ["door-102"].into_iter().collect();
    for _ in 0..600 {
        pc.update(1.0 / 60.0, &floor, &graph, &granted);
    }
    let passed = pc.position().x < -6.0;
    results.push(check(
        "door_gates_on_permission",
        blocked && passed,
        format!("denied stops outside, granted ends at x = {:.2}", pc.position().x),
    ));

    // Avatar never escapes the floor bounds.
    let bounds = graph.bounds.expect("floor has bounds");
    let mut pc = PlayerController::new();
    pc.set_key(MoveKey::Back, true);
    pc.set_key(MoveKey::Right, true);
    for _ in 0..3000 {
        pc.update(1.0 / 60.0, &floor, &graph, &denied);
    }
    let inside = bounds.contains(pc.position().to_plan());
    results.push(check(
        "avatar_stays_in_bounds",
        inside,
        format!(
            "after 50 s of input the avatar is at ({:.1}, {:.1})",
            pc.position().x,
            pc.position().z
        ),
    ));

    results
}
