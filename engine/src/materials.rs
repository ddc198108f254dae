//! Contact material pair rules.
//!
//! Every collider carries its `PhysicsMaterial` in `user_data`. `ContactRules` is handed to
//! the physics pipeline as its hooks object and overwrites friction/restitution of each
//! solver contact from the pair table. Lookup is order-independent; unknown pairs keep
//! whatever rapier computed from the collider coefficients.

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::MaterialConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PhysicsMaterial {
    Ground = 0,
    Player = 1,
    Crate = 2,
}

impl PhysicsMaterial {
    #[inline]
    pub fn to_user_data(self) -> u128 {
        self as u128
    }

    #[inline]
    pub fn from_user_data(data: u128) -> Option<Self> {
        match data {
            0 => Some(Self::Ground),
            1 => Some(Self::Player),
            2 => Some(Self::Crate),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactParams {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactParams {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

impl Default for ContactParams {
    fn default() -> Self {
        Self::new(0.9, 0.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContactRules {
    rules: Vec<((PhysicsMaterial, PhysicsMaterial), ContactParams)>,
}

impl ContactRules {
    pub fn from_config(cfg: &MaterialConfig) -> Self {
        use PhysicsMaterial::*;
        let mut rules = Self::default();
        rules.insert(Ground, Ground, cfg.ground_ground);
        rules.insert(Player, Ground, cfg.player_ground);
        rules.insert(Player, Crate, cfg.player_crate);
        rules.insert(Crate, Ground, cfg.crate_ground);
        rules
    }

    /// Registers (or replaces) the rule for an unordered pair.
    pub fn insert(&mut self, a: PhysicsMaterial, b: PhysicsMaterial, params: ContactParams) {
        let key = ordered(a, b);
        match self.rules.iter_mut().find(|(k, _)| *k == key) {
            Some((_, p)) => *p = params,
            None => self.rules.push((key, params)),
        }
    }

    pub fn lookup(&self, a: PhysicsMaterial, b: PhysicsMaterial) -> Option<ContactParams> {
        let key = ordered(a, b);
        self.rules.iter().find(|(k, _)| *k == key).map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[inline]
fn ordered(a: PhysicsMaterial, b: PhysicsMaterial) -> (PhysicsMaterial, PhysicsMaterial) {
    if (a as u8) <= (b as u8) { (a, b) } else { (b, a) }
}

impl PhysicsHooks for ContactRules {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let material = |h: ColliderHandle| {
            context
                .colliders
                .get(h)
                .and_then(|c| PhysicsMaterial::from_user_data(c.user_data))
        };
        let (Some(a), Some(b)) = (material(context.collider1), material(context.collider2)) else {
            return;
        };
        let Some(params) = self.lookup(a, b) else {
            return;
        };
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = params.friction;
            contact.restitution = params.restitution;
        }
    }
}
