//! Default tuning values.
//!
//! `GameConfig::default()` is assembled from these. Distances are in meters,
//! time in seconds, forces in newtons (bodies use kilograms).

/// Fixed simulation timestep.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Cap on internal steps per frame; backlog beyond this is dropped.
pub const MAX_SUBSTEPS: u32 = 10;

/// Gravity magnitude (positive value, applied along -Y).
pub const GRAVITY_MPS2: f32 = 15.0;

/// Solver iterations per step. Higher keeps crate contacts stable.
pub const SOLVER_ITERATIONS: usize = 10;

/// Normalized allowed penetration error handed to the solver.
pub const SOLVER_TOLERANCE: f32 = 0.001;

pub const PLAYER_RADIUS: f32 = 0.5;
pub const PLAYER_MASS: f32 = 1.0;
pub const PLAYER_LINEAR_DAMPING: f32 = 0.4;
pub const PLAYER_ANGULAR_DAMPING: f32 = 0.6;

/// Horizontal force applied while grounded and steering.
pub const MOVE_FORCE: f32 = 15.0;

/// Horizontal speed caps, per axis.
pub const MAX_GROUND_SPEED: f32 = 5.0;
pub const MAX_AIR_SPEED: f32 = 8.0;

/// `|vy|` below this counts as grounded.
pub const GROUNDED_THRESHOLD: f32 = 0.5;

/// `|vy|` below this allows a jump.
pub const JUMP_GATE_THRESHOLD: f32 = 0.5;

/// Vertical velocity written by a jump.
pub const JUMP_SPEED: f32 = 6.5;

pub const CRATE_HALF_EXTENT: f32 = 0.5;
pub const CRATE_MASS: f32 = 0.3;
pub const CRATE_LINEAR_DAMPING: f32 = 0.5;
pub const CRATE_ANGULAR_DAMPING: f32 = 0.99;

/// Gap between the anchor surface and the crate bottom at spawn.
pub const CRATE_SPAWN_CLEARANCE: f32 = 0.05;

/// Extra reach on top of `player radius + crate half width` for push contact.
pub const PUSH_CONTACT_EPSILON: f32 = 0.1;
pub const PUSH_FORCE: f32 = 12.0;
pub const PUSH_FACTOR_MIN: f32 = 0.0;
pub const PUSH_FACTOR_MAX: f32 = 1.0;

/// Velocity multiplier applied to player and crate on push contact.
pub const PUSH_DAMPING: f32 = 0.95;

/// Push point offset below crate center, as a fraction of the half height.
pub const PUSH_POINT_DROP: f32 = 0.25;

/// Collider half-extent floors; the vertical floor is thicker so thin floors don't tunnel.
pub const COLLIDER_MIN_HALF_XZ: f32 = 0.05;
pub const COLLIDER_MIN_HALF_Y: f32 = 0.25;
pub const COLLIDER_PADDING: f32 = 0.02;

/// Height of the checkpoint activation volume above a platform top.
pub const CHECKPOINT_VOLUME_HEIGHT: f32 = 2.0;
pub const CHECKPOINT_HORIZONTAL_PAD: f32 = 0.3;

/// Height above the platform top where a checkpoint respawn lands.
pub const CHECKPOINT_MARGIN: f32 = 1.0;

/// Distance below the lowest room geometry that counts as a fall.
pub const FALL_SAFETY_MARGIN: f32 = 5.0;
pub const FALL_COOLDOWN_SECS: f32 = 1.0;

/// Marker proximity that counts as "reached".
pub const TRIGGER_DISTANCE: f32 = 1.5;

/// Spawn height above a start marker.
pub const START_HEIGHT_OFFSET: f32 = 2.0;

/// Spawn used when a room has no start marker.
pub const FALLBACK_SPAWN: [f32; 3] = [0.0, 10.0, 0.0];

pub const ROOM1_ASSET: &str = "models/room1.glb";
pub const ROOM2_ASSET: &str = "models/room2.glb";
