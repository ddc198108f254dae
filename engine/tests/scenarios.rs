//! End-to-end scenarios driving `GameSession` with hand-built scenes.

use engine::{
    EntityKind, GameConfig, GameEvent, GameSession, InputIntent, PuzzleState, RoomId, RoomState,
    SceneGraph, SceneNode, Vec3,
};

const DT: f32 = 1.0 / 60.0;

fn room1() -> SceneGraph {
    [
        SceneNode::boxed("floor", Vec3::new(0.0, -0.5, 0.0), Vec3::new(40.0, 1.0, 40.0)),
        SceneNode::marker("start", Vec3::new(0.0, 0.0, 0.0)),
        SceneNode::boxed("cubestart", Vec3::new(10.0, 0.25, 0.0), Vec3::new(1.0, 0.5, 1.0)),
        SceneNode::marker("cubeend", Vec3::new(-10.0, 0.0, 0.0)),
        SceneNode::boxed("end1", Vec3::new(0.0, 0.25, -18.0), Vec3::new(2.0, 0.5, 2.0)),
        SceneNode::marker("goal", Vec3::new(0.0, 0.5, -15.0)),
        SceneNode::boxed("checkpoint_a", Vec3::new(5.0, 0.5, 5.0), Vec3::new(2.0, 1.0, 2.0)),
    ]
    .into_iter()
    .collect()
}

fn room2() -> SceneGraph {
    [
        SceneNode::boxed("floor", Vec3::new(0.0, -0.5, 0.0), Vec3::new(40.0, 1.0, 40.0)),
        SceneNode::marker("start2", Vec3::new(0.0, 0.0, 10.0)),
        SceneNode::marker("key", Vec3::new(3.0, 0.5, 0.0)),
        SceneNode::marker("powerbox_inactive", Vec3::new(6.0, 0.5, 0.0)),
        SceneNode::marker("powerbox_active", Vec3::new(6.0, 0.5, 0.0)),
        SceneNode::marker("plate_inactive", Vec3::new(9.0, 0.5, 0.0)),
        SceneNode::marker("plate_active", Vec3::new(9.0, 0.5, 0.0)),
        SceneNode::boxed("bridge", Vec3::new(0.0, 0.25, -25.0), Vec3::new(2.0, 0.5, 10.0)),
        SceneNode::marker("end", Vec3::new(-10.0, 0.5, -10.0)),
    ]
    .into_iter()
    .collect()
}

fn idle() -> InputIntent {
    InputIntent::default()
}

fn forward() -> Vec3 {
    Vec3::new(0.0, 0.0, -1.0)
}

fn loaded_room1() -> GameSession {
    let mut s = GameSession::new(GameConfig::default()).unwrap();
    s.on_room_loaded(RoomId::Room1, Ok(room1()));
    s.drain_events();
    s
}

fn loaded_room2() -> GameSession {
    let mut s = loaded_room1();
    s.frame(
        &InputIntent {
            debug_skip: true,
            ..Default::default()
        },
        forward(),
        DT,
    );
    assert_eq!(s.state(), RoomState::TransitioningToRoom2);
    s.on_room_loaded(RoomId::Room2, Ok(room2()));
    assert_eq!(s.state(), RoomState::Room2Active);
    s.drain_events();
    s
}

fn player_pos(s: &GameSession) -> Vec3 {
    s.world().translation(s.player().body).unwrap()
}

fn teleport_player(s: &mut GameSession, to: Vec3) {
    let body = s.player().body;
    s.world_mut().teleport(body, to);
}

fn count(events: &[GameEvent], key: &str) -> usize {
    events.iter().filter(|e| e.key() == key).count()
}

#[test]
fn fall_without_checkpoint_returns_to_start() {
    let mut s = loaded_room1();
    let min_y = s.content().min_y;
    teleport_player(&mut s, Vec3::new(0.0, min_y - 10.0, 0.0));

    s.frame(&idle(), forward(), DT);
    let events = s.drain_events();
    assert_eq!(count(&events, "player_fell"), 1);
    assert_eq!(player_pos(&s), Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(s.world().linvel(s.player().body).unwrap(), Vec3::zeros());
}

#[test]
fn fall_recovery_is_throttled() {
    let mut s = loaded_room1();
    let below = Vec3::new(0.0, s.content().min_y - 10.0, 0.0);

    teleport_player(&mut s, below);
    s.frame(&idle(), forward(), DT);
    assert_eq!(count(&s.drain_events(), "player_fell"), 1);

    // Still inside the cooldown: no second teleport.
    teleport_player(&mut s, below);
    s.frame(&idle(), forward(), DT);
    assert_eq!(count(&s.drain_events(), "player_fell"), 0);
    assert!(player_pos(&s).y < below.y + 0.1);

    // Once the cooldown has elapsed it fires again, exactly once.
    let mut fired = 0;
    for _ in 0..70 {
        teleport_player(&mut s, below);
        s.frame(&idle(), forward(), DT);
        fired += count(&s.drain_events(), "player_fell");
    }
    assert_eq!(fired, 1);
}

#[test]
fn crate_falls_back_to_its_anchor() {
    let mut s = loaded_room1();
    let c = s.content().puzzle_crate.unwrap();
    s.world_mut().teleport(c.body, Vec3::new(30.0, -50.0, 0.0));
    s.frame(&idle(), forward(), DT);
    let events = s.drain_events();
    assert!(events.contains(&GameEvent::FellAndReset {
        entity: EntityKind::Crate,
        to: c.spawn,
    }));
    assert_eq!(s.world().translation(c.body), Some(c.spawn));
}

#[test]
fn checkpoint_saves_once_and_is_used_for_respawn() {
    let mut s = loaded_room1();
    teleport_player(&mut s, Vec3::new(5.0, 1.5, 5.0));

    let mut saved = 0;
    for _ in 0..30 {
        s.frame(&idle(), forward(), DT);
        saved += count(&s.drain_events(), "checkpoint_saved");
    }
    assert_eq!(saved, 1);
    let cp = s.checkpoint().unwrap();
    assert_eq!(cp.room, RoomId::Room1);
    assert!((cp.position - Vec3::new(5.0, 2.0, 5.0)).norm() < 1.0e-4);

    teleport_player(&mut s, Vec3::new(0.0, -20.0, 0.0));
    s.frame(&idle(), forward(), DT);
    assert_eq!(player_pos(&s), cp.position);
    assert_eq!(s.checkpoint(), Some(cp));
}

#[test]
fn goal_is_ignored_until_solved() {
    let mut s = loaded_room1();
    teleport_player(&mut s, Vec3::new(0.0, 0.5, -15.0));
    s.frame(&idle(), forward(), DT);
    assert_eq!(s.state(), RoomState::Room1Active);
    assert_eq!(count(&s.drain_events(), "room_transition"), 0);
}

#[test]
fn solving_and_reaching_goal_transitions_exactly_once() {
    let mut s = loaded_room1();
    let c = s.content().puzzle_crate.unwrap();

    s.world_mut().teleport(c.body, Vec3::new(-10.0, 0.55, 0.0));
    s.frame(&idle(), forward(), DT);
    let events = s.drain_events();
    assert_eq!(count(&events, "puzzle_solved"), 1);
    assert!(s.puzzle().solved());
    assert!(s.visibility().contains(&("end1".to_string(), true)));
    let end1 = s.content().colliders.iter().find(|c| c.name == "end1").unwrap();
    assert_eq!(s.world().collision_enabled(end1.body), Some(true));

    // Staying on the target doesn't re-fire.
    s.frame(&idle(), forward(), DT);
    assert_eq!(count(&s.drain_events(), "puzzle_solved"), 0);

    teleport_player(&mut s, Vec3::new(0.0, 0.5, -15.0));
    s.frame(&idle(), forward(), DT);
    s.frame(&idle(), forward(), DT);
    let events = s.drain_events();
    assert_eq!(count(&events, "room_transition"), 1);
    assert!(events.iter().any(|e| matches!(e, GameEvent::LoadRequested { room: RoomId::Room2, .. })));

    assert_eq!(s.state(), RoomState::TransitioningToRoom2);
    assert_eq!(s.world().body_count(), 1);
    assert!(s.world().contains(s.player().body));
    assert!(s.checkpoint().is_none());
    assert!(s.content().puzzle_crate.is_none());
    assert!(s.visibility().is_empty());
    assert_eq!(*s.puzzle(), PuzzleState::default());
}

#[test]
fn room2_load_places_player_at_start2() {
    let s = loaded_room2();
    assert_eq!(player_pos(&s), Vec3::new(0.0, 2.0, 10.0));
    assert!(s.content().loaded);
}

#[test]
fn room1_load_arriving_late_is_ignored() {
    let mut s = loaded_room1();
    s.frame(
        &InputIntent {
            debug_skip: true,
            ..Default::default()
        },
        forward(),
        DT,
    );
    s.on_room_loaded(RoomId::Room1, Ok(room1()));
    assert_eq!(s.state(), RoomState::TransitioningToRoom2);
    assert_eq!(s.world().body_count(), 1);
}

#[test]
fn circuit_reveals_bridge_and_win_fires_once() {
    let mut s = loaded_room2();

    // Power without the key does nothing.
    teleport_player(&mut s, Vec3::new(6.0, 0.5, 0.0));
    s.frame(&idle(), forward(), DT);
    assert_eq!(count(&s.drain_events(), "power_activated"), 0);

    teleport_player(&mut s, Vec3::new(3.0, 0.5, 0.0));
    s.frame(&idle(), forward(), DT);
    assert_eq!(count(&s.drain_events(), "key_collected"), 1);
    assert!(s.visibility().contains(&("key".to_string(), false)));

    teleport_player(&mut s, Vec3::new(6.0, 0.5, 0.0));
    s.frame(&idle(), forward(), DT);
    assert_eq!(count(&s.drain_events(), "power_activated"), 1);
    let vis = s.visibility();
    assert!(vis.contains(&("powerbox_inactive".to_string(), false)));
    assert!(vis.contains(&("powerbox_active".to_string(), true)));

    teleport_player(&mut s, Vec3::new(9.0, 0.5, 0.0));
    s.frame(&idle(), forward(), DT);
    let events = s.drain_events();
    assert_eq!(count(&events, "plate_activated"), 1);
    assert_eq!(count(&events, "bridge_revealed"), 1);
    assert!(s.puzzle().bridge_revealed);
    let bridge = s.content().colliders.iter().find(|c| c.name == "bridge").unwrap();
    assert_eq!(s.world().collision_enabled(bridge.body), Some(true));

    teleport_player(&mut s, Vec3::new(-10.0, 0.5, -10.0));
    let mut won = 0;
    for _ in 0..10 {
        s.frame(&idle(), forward(), DT);
        won += count(&s.drain_events(), "won");
    }
    assert_eq!(won, 1);
    assert!(s.is_won());
}

#[test]
fn restart_returns_player_and_crate_to_spawn() {
    let mut s = loaded_room1();
    let c = s.content().puzzle_crate.unwrap();
    teleport_player(&mut s, Vec3::new(12.0, 0.5, 12.0));
    s.world_mut().teleport(c.body, Vec3::new(-5.0, 0.55, 3.0));

    s.frame(
        &InputIntent {
            restart: true,
            ..Default::default()
        },
        forward(),
        DT,
    );
    assert!(s.drain_events().contains(&GameEvent::Restarted { room: RoomId::Room1 }));
    assert!((player_pos(&s) - Vec3::new(0.0, 2.0, 0.0)).norm() < 0.1);
    let crate_pos = s.world().translation(c.body).unwrap();
    assert!((crate_pos - c.spawn).norm() < 0.1);
}

#[test]
fn restart_keeps_saved_checkpoint() {
    let mut s = loaded_room1();
    teleport_player(&mut s, Vec3::new(5.0, 1.5, 5.0));
    for _ in 0..30 {
        s.frame(&idle(), forward(), DT);
    }
    let cp = s.checkpoint().unwrap();

    s.frame(
        &InputIntent {
            restart: true,
            ..Default::default()
        },
        forward(),
        DT,
    );
    assert!(s.drain_events().contains(&GameEvent::Restarted { room: RoomId::Room1 }));
    assert_eq!(s.state(), RoomState::Room1Active);
    assert_eq!(s.checkpoint(), Some(cp));
}

#[test]
fn snapshot_survives_json() {
    let mut s = loaded_room1();
    for _ in 0..10 {
        s.frame(&idle(), forward(), DT);
    }
    let snap = s.capture_snapshot().unwrap();
    let json = snap.to_json().unwrap();
    let back = engine::Snapshot::from_json(&json).unwrap();
    assert_eq!(back, snap);
    assert!(back.crate_body.is_some());
    s.apply_snapshot(&back).unwrap();
}

#[test]
fn steering_moves_player_toward_camera_forward() {
    let mut s = loaded_room1();
    for _ in 0..60 {
        s.frame(&idle(), forward(), DT);
    }
    let start = player_pos(&s);
    let input = InputIntent {
        forward: true,
        ..Default::default()
    };
    for _ in 0..60 {
        s.frame(&input, forward(), DT);
        let v = s.world().linvel(s.player().body).unwrap();
        if v.y.abs() < 0.5 {
            assert!(v.x.abs() <= 5.0 + 1.0e-4 && v.z.abs() <= 5.0 + 1.0e-4);
        }
    }
    assert!(player_pos(&s).z < start.z - 0.5);
}
