/*!
Per-frame orchestrator owning all mutable game state.

`GameSession::frame` runs once per display frame in a fixed order:

1. restart / debug-skip intents
2. steering, crate push, jump
3. fixed-step physics
4. speed caps
5. transform publish
6. checkpoint capture and fall recovery
7. puzzle, goal and win checks (may start a room transition)

Room scenes load outside the session. It emits `GameEvent::LoadRequested`, and the client
hands the finished `SceneGraph` back through `on_room_loaded` between frames.

Design notes
- While transitioning to room 2 the player is the only body in the world; it is held in
  place until the next room is built.
- Frame failures are contained: `frame` logs, emits `RuntimeError`, restores the player if it
  can, and the next frame runs normally.
*/

use log::{debug, error, info, warn};

use crate::checkpoint::{Checkpoint, CheckpointManager, FallGuard, fall_threshold, respawn_target};
use crate::collider::DerivedCollider;
use crate::config::GameConfig;
use crate::error::{ConfigResult, LoadError, LoadResult, SessionError, SessionResult};
use crate::events::{EntityKind, EntityTransform, GameEvent};
use crate::input::InputIntent;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::player::PlayerController;
use crate::props::spawn_player;
use crate::puzzle::PuzzleState;
use crate::registry::NodeRole;
use crate::room::{RoomContent, RoomId, RoomState};
use crate::scene::SceneGraph;
use crate::snapshot::{BodySnapshot, Snapshot};
use crate::types::Vec3;

#[inline]
fn within(a: Vec3, b: Vec3, distance: f32) -> bool {
    (a - b).norm() < distance
}

pub struct GameSession {
    cfg: GameConfig,
    world: PhysicsWorld,
    player: PlayerController,
    state: RoomState,
    content: RoomContent,
    puzzle: PuzzleState,
    checkpoints: CheckpointManager,
    player_fall: FallGuard,
    crate_fall: FallGuard,
    /// Room whose scene the session is waiting for.
    pending_load: Option<RoomId>,
    /// Player hold position while transitioning.
    hold: Option<Vec3>,
    transforms: Vec<EntityTransform>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Validates `cfg`, spawns the player at the fallback point and requests room 1.
    pub fn new(cfg: GameConfig) -> ConfigResult<Self> {
        cfg.validate()?;
        Ok(Self::start(cfg))
    }

    /// Session with the built-in defaults.
    pub fn with_defaults() -> Self {
        Self::start(GameConfig::default())
    }

    fn start(cfg: GameConfig) -> Self {
        let mut world = PhysicsWorld::new(&cfg.physics);
        let player = spawn_player(&mut world, &cfg.player, cfg.rooms.fallback());
        let content = RoomContent::empty(RoomId::Room1, &cfg);
        let mut session = Self {
            cfg,
            world,
            player,
            state: RoomState::Room1Active,
            content,
            puzzle: PuzzleState::default(),
            checkpoints: CheckpointManager::default(),
            player_fall: FallGuard::default(),
            crate_fall: FallGuard::default(),
            pending_load: None,
            hold: None,
            transforms: Vec::new(),
            events: Vec::new(),
        };
        session.request_load(RoomId::Room1);
        session.publish_transforms();
        session
    }

    fn request_load(&mut self, room: RoomId) {
        self.pending_load = Some(room);
        let asset = room.asset(&self.cfg).to_string();
        info!("requesting {room:?} scene `{asset}`");
        self.events.push(GameEvent::LoadRequested { room, asset });
    }

    /// Deliver a finished (or failed) room load.
    ///
    /// Loads for a room the session is not waiting for are ignored. A failure leaves the
    /// current state untouched; `restart` asks for the room again. Returns whether the room
    /// was built and entered.
    pub fn on_room_loaded(&mut self, room: RoomId, result: LoadResult<SceneGraph>) -> bool {
        if self.pending_load != Some(room) {
            debug!("ignoring stale {room:?} load");
            return false;
        }
        self.pending_load = None;

        let graph = match result.and_then(|g| {
            if g.is_empty() {
                Err(LoadError::EmptyScene { room })
            } else {
                Ok(g)
            }
        }) {
            Ok(g) => g,
            Err(e) => {
                error!("{room:?} failed to load: {e}");
                self.events.push(GameEvent::LoadFailed {
                    room,
                    reason: e.to_string(),
                });
                return false;
            }
        };

        match (room, self.state) {
            (RoomId::Room1, RoomState::Room1Active) => {}
            (RoomId::Room2, RoomState::TransitioningToRoom2) => {}
            (_, state) => {
                warn!("{room:?} arrived while in {state:?}; ignoring");
                return false;
            }
        }

        let previous = std::mem::replace(&mut self.content, RoomContent::empty(room, &self.cfg));
        previous.teardown(&mut self.world);
        self.content = RoomContent::build(room, &graph, &mut self.world, &self.cfg);
        self.checkpoints.clear();
        self.player_fall.reset();
        self.crate_fall.reset();
        if room == RoomId::Room1 {
            self.puzzle = PuzzleState::default();
        }

        let spawn = self.player_start();
        self.world.teleport(self.player.body, spawn);
        self.hold = None;
        self.state = match room {
            RoomId::Room1 => RoomState::Room1Active,
            RoomId::Room2 => RoomState::Room2Active,
        };
        info!("entered {room:?}");
        self.events.push(GameEvent::RoomEntered { room });
        self.publish_transforms();
        true
    }

    fn player_start(&self) -> Vec3 {
        self.content.start_position(&self.cfg).unwrap_or_else(|| {
            warn!("{:?} has no start marker; using fallback spawn", self.content.room);
            self.cfg.rooms.fallback()
        })
    }

    /// Advance one display frame. Never panics on gameplay failures.
    pub fn frame(&mut self, input: &InputIntent, camera_forward: Vec3, wall_dt: f32) {
        if let Err(e) = self.try_frame(input, camera_forward, wall_dt) {
            error!("frame failed: {e}");
            self.events.push(GameEvent::RuntimeError {
                reason: e.to_string(),
            });
            self.recover();
        }
    }

    pub fn try_frame(&mut self, input: &InputIntent, camera_forward: Vec3, wall_dt: f32) -> SessionResult<()> {
        self.player_fall.tick(wall_dt);
        self.crate_fall.tick(wall_dt);
        self.drop_missing_crate();

        if input.restart {
            self.restart();
        }
        if input.debug_skip && self.state == RoomState::Room1Active {
            info!("debug skip to room 2");
            self.begin_transition();
        }

        if self.state == RoomState::TransitioningToRoom2 {
            self.step_physics(wall_dt);
            if let Some(hold) = self.hold {
                self.world.teleport(self.player.body, hold);
            }
            self.publish_transforms();
            return Ok(());
        }

        let pcfg = &self.cfg.player;
        self.player
            .apply_movement_input(&mut self.world, pcfg, input, camera_forward)?;
        if let Some(c) = self.content.puzzle_crate {
            self.player
                .try_push_crate(&mut self.world, pcfg, &self.cfg.puzzle_crate, c.body, input)?;
        }
        if input.jump {
            self.player.try_jump(&mut self.world, pcfg)?;
        }

        self.step_physics(wall_dt);
        self.player
            .enforce_speed_caps(&mut self.world, &self.cfg.player, input.has_direction())?;

        let player_pos = self.player.position(&self.world)?;
        if !player_pos.iter().all(|v| v.is_finite()) {
            return Err(SessionError::NonFinite { what: "player position" });
        }
        self.publish_transforms();

        self.update_checkpoint_and_falls(player_pos)?;
        self.update_room_logic()
    }

    fn step_physics(&mut self, wall_dt: f32) {
        let p = &self.cfg.physics;
        self.world.step(p.fixed_dt, wall_dt, p.max_substeps);
    }

    fn drop_missing_crate(&mut self) {
        if let Some(c) = self.content.puzzle_crate {
            if !self.world.contains(c.body) {
                warn!("crate body vanished; dropping crate");
                self.content.puzzle_crate = None;
            }
        }
    }

    fn publish_transforms(&mut self) {
        self.transforms.clear();
        let mut push = |kind, body| {
            if let (Some(translation), Some(rotation)) = (self.world.translation(body), self.world.rotation(body)) {
                self.transforms.push(EntityTransform {
                    kind,
                    translation,
                    rotation,
                });
            }
        };
        push(EntityKind::Player, self.player.body);
        if let Some(c) = self.content.puzzle_crate {
            push(EntityKind::Crate, c.body);
        }
    }

    fn update_checkpoint_and_falls(&mut self, player_pos: Vec3) -> SessionResult<()> {
        let room = self.state.room();
        let grounded = self.player.is_grounded(&self.world, &self.cfg.player)?;
        if let Some(cp) = self.checkpoints.update_checkpoint(
            player_pos,
            grounded,
            room,
            &self.content.checkpoints,
            &self.cfg.checkpoints,
        ) {
            info!("checkpoint saved at ({:.2}, {:.2}, {:.2})", cp.position.x, cp.position.y, cp.position.z);
            self.events.push(GameEvent::CheckpointSaved {
                position: cp.position,
                room,
            });
        }

        let threshold = fall_threshold(self.content.min_y, &self.cfg.checkpoints);
        let mut moved = false;
        if self.player_fall.check(player_pos.y, threshold, &self.cfg.checkpoints) {
            let to = respawn_target(
                self.checkpoints.current(),
                room,
                self.content.start_position(&self.cfg),
                self.cfg.rooms.fallback(),
            );
            info!("player fell; respawning at ({:.2}, {:.2}, {:.2})", to.x, to.y, to.z);
            self.world.teleport(self.player.body, to);
            self.events.push(GameEvent::FellAndReset {
                entity: EntityKind::Player,
                to,
            });
            moved = true;
        }

        if let Some(c) = self.content.puzzle_crate {
            let Some(pos) = self.world.translation(c.body) else {
                return Err(SessionError::MissingBody { what: "crate" });
            };
            if self.crate_fall.check(pos.y, threshold, &self.cfg.checkpoints) {
                info!("crate fell; respawning at its anchor");
                self.world.teleport(c.body, c.spawn);
                self.events.push(GameEvent::FellAndReset {
                    entity: EntityKind::Crate,
                    to: c.spawn,
                });
                moved = true;
            }
        }
        if moved {
            self.publish_transforms();
        }
        Ok(())
    }

    fn update_room_logic(&mut self) -> SessionResult<()> {
        let reach = self.cfg.rooms.trigger_distance;
        let player_pos = self.player.position(&self.world)?;
        let crate_pos = self
            .content
            .puzzle_crate
            .and_then(|c| self.world.translation(c.body));
        let near = |role: NodeRole, pos: Vec3| {
            self.content
                .marker(role)
                .is_some_and(|m| within(pos, m, reach))
        };

        match self.state {
            RoomState::Room1Active => {
                let crate_on_goal = crate_pos.is_some_and(|p| near(NodeRole::CrateGoal, p));
                let player_at_goal = near(NodeRole::Goal, player_pos);
                if crate_on_goal && self.puzzle.mark_crate_at_goal() {
                    info!("puzzle solved");
                    self.events.push(GameEvent::PuzzleSolved);
                    self.content.reveal_end_platforms(&mut self.world);
                }
                if player_at_goal && self.puzzle.solved() {
                    self.begin_transition();
                }
            }
            RoomState::Room2Active => {
                let at_key = near(NodeRole::Key, player_pos);
                let at_power = near(NodeRole::PowerBoxInactive, player_pos);
                let at_plate = near(NodeRole::PlateInactive, player_pos)
                    || crate_pos.is_some_and(|p| near(NodeRole::PlateInactive, p));
                let at_end = near(NodeRole::End, player_pos);

                if at_key && self.puzzle.collect_key() {
                    info!("key collected");
                    self.content.props.key.set(false);
                    self.events.push(GameEvent::KeyCollected);
                }
                if at_power && self.puzzle.activate_power() {
                    info!("power activated");
                    self.content.props.power.activate();
                    self.events.push(GameEvent::PowerActivated);
                }
                if at_plate && self.puzzle.activate_plate() {
                    info!("plate activated");
                    self.content.props.plate.activate();
                    self.events.push(GameEvent::PlateActivated);
                }
                if self.puzzle.bridge_revealed && self.content.reveal_bridge(&mut self.world) {
                    info!("bridge revealed");
                    self.events.push(GameEvent::BridgeRevealed);
                }
                if at_end {
                    info!("room 2 complete");
                    self.state = RoomState::Room2Won;
                    self.events.push(GameEvent::Won);
                }
            }
            RoomState::TransitioningToRoom2 | RoomState::Room2Won => {}
        }
        Ok(())
    }

    /// Leave room 1: strip every body except the player, reset room-scoped state and ask
    /// for the room-2 scene.
    fn begin_transition(&mut self) {
        if self.state != RoomState::Room1Active {
            return;
        }
        info!("transitioning to room 2");
        self.state = RoomState::TransitioningToRoom2;
        self.hold = self.world.translation(self.player.body);

        let player = self.player.body;
        self.world.retain_bodies(|h| h == player);
        self.content = RoomContent::empty(RoomId::Room2, &self.cfg);
        self.checkpoints.clear();
        self.puzzle = PuzzleState::default();
        self.player_fall.reset();
        self.crate_fall.reset();

        self.events.push(GameEvent::RoomTransitionStarted { to: RoomId::Room2 });
        self.request_load(RoomId::Room2);
        self.publish_transforms();
    }

    /// Respawn at the room start without reloading; the saved checkpoint survives. A room
    /// that never loaded is requested again instead.
    pub fn restart(&mut self) {
        let room = self.state.room();
        if self.state == RoomState::TransitioningToRoom2 || !self.content.loaded {
            if self.pending_load.is_none() {
                self.request_load(room);
            }
            return;
        }

        self.player_fall.reset();
        self.crate_fall.reset();
        let to = self.player_start();
        self.world.teleport(self.player.body, to);
        if let Some(c) = self.content.puzzle_crate {
            self.world.teleport(c.body, c.spawn);
        }
        info!("restarted {room:?}");
        self.events.push(GameEvent::Restarted { room });
        self.publish_transforms();
    }

    /// Put the player back into a valid state after a failed frame.
    fn recover(&mut self) {
        let to = respawn_target(
            self.checkpoints.current(),
            self.state.room(),
            self.content.start_position(&self.cfg),
            self.cfg.rooms.fallback(),
        );
        if self.world.contains(self.player.body) {
            self.world.teleport(self.player.body, to);
        } else {
            warn!("player body missing; respawning");
            self.player = spawn_player(&mut self.world, &self.cfg.player, to);
        }
        self.drop_missing_crate();
        self.publish_transforms();
    }

    pub fn capture_snapshot(&self) -> SessionResult<Snapshot> {
        let body = |h: BodyHandle, what: &'static str| -> SessionResult<BodySnapshot> {
            match (self.world.translation(h), self.world.linvel(h)) {
                (Some(p), Some(v)) => Ok(BodySnapshot::new(p, v)),
                _ => Err(SessionError::MissingBody { what }),
            }
        };
        Ok(Snapshot {
            room: self.state.room(),
            player: body(self.player.body, "player")?,
            crate_body: self
                .content
                .puzzle_crate
                .map(|c| body(c.body, "crate"))
                .transpose()?,
            solved: self.puzzle.solved(),
        })
    }

    /// Restore body state from a snapshot taken in the same room.
    pub fn apply_snapshot(&mut self, snap: &Snapshot) -> SessionResult<()> {
        let current = self.state.room();
        if snap.room != current || self.state == RoomState::TransitioningToRoom2 {
            return Err(SessionError::SnapshotRoomMismatch {
                snapshot: snap.room,
                current,
            });
        }
        if !snap.player.is_finite() || snap.crate_body.is_some_and(|c| !c.is_finite()) {
            return Err(SessionError::NonFinite { what: "snapshot" });
        }

        self.world.teleport(self.player.body, snap.player.position());
        self.world.set_linvel(self.player.body, snap.player.velocity());
        if let (Some(c), Some(saved)) = (self.content.puzzle_crate, snap.crate_body) {
            self.world.teleport(c.body, saved.position());
            self.world.set_linvel(c.body, saved.velocity());
        }
        if snap.solved && self.state == RoomState::Room1Active && self.puzzle.mark_crate_at_goal() {
            self.content.reveal_end_platforms(&mut self.world);
        }
        self.publish_transforms();
        Ok(())
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn is_won(&self) -> bool {
        self.state == RoomState::Room2Won
    }

    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    pub fn checkpoint(&self) -> Option<Checkpoint> {
        self.checkpoints.current()
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn content(&self) -> &RoomContent {
        &self.content
    }

    pub fn player(&self) -> PlayerController {
        self.player
    }

    pub fn pending_load(&self) -> Option<RoomId> {
        self.pending_load
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn transforms(&self) -> &[EntityTransform] {
        &self.transforms
    }

    /// `(node name, visible)` for every node whose visibility gameplay controls.
    pub fn visibility(&self) -> Vec<(String, bool)> {
        self.content.props.visibility()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Derived static colliders with their collision flag, for debug drawing.
    pub fn debug_colliders(&self) -> Vec<(DerivedCollider, bool)> {
        self.content
            .colliders
            .iter()
            .map(|c| (c.shape, c.enabled))
            .collect()
    }
}
