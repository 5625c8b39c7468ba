//! Attack instance state.

use bevy::prelude::*;

use crate::combat::AttackId;

/// The move a fighter is currently performing.
///
/// At most one instance runs at a time. `hit_entities` is the per-instance
/// struck set: starting a new instance always begins with it empty.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AttackState {
    pub current: Option<ActiveAttack>,
}

/// One running attack instance.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ActiveAttack {
    pub id: AttackId,
    /// Scaled seconds since the instance began
    pub elapsed: f32,
    /// Authored length (from the attack definition)
    pub duration: f32,
    /// Fighters already struck by this instance
    pub hit_entities: Vec<Entity>,
    /// Special only: the projectile for this instance is already out
    pub projectile_spawned: bool,
}

impl AttackState {
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_id(&self) -> Option<AttackId> {
        self.current.as_ref().map(|attack| attack.id)
    }

    /// Begin a fresh instance. Replaces whatever was running.
    pub fn start(&mut self, id: AttackId, duration: f32) {
        self.current = Some(ActiveAttack {
            id,
            elapsed: 0.0,
            duration: duration.max(0.0),
            hit_entities: Vec::new(),
            projectile_spawned: false,
        });
    }

    /// Advances the running instance; returns the move that ended this tick.
    pub fn advance(&mut self, scaled_delta: f32) -> Option<AttackId> {
        let attack = self.current.as_mut()?;
        attack.elapsed += scaled_delta.max(0.0);
        if attack.elapsed >= attack.duration {
            let finished = attack.id;
            self.current = None;
            return Some(finished);
        }
        None
    }

    /// Records a struck fighter. Returns `false` if this instance already hit it.
    pub fn record_hit(&mut self, defender: Entity) -> bool {
        let Some(attack) = self.current.as_mut() else {
            return false;
        };
        if attack.hit_entities.contains(&defender) {
            return false;
        }
        attack.hit_entities.push(defender);
        true
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_lifecycle() {
        let mut state = AttackState::default();
        state.start(AttackId::Punch, 0.3);
        assert_eq!(state.current_id(), Some(AttackId::Punch));

        assert_eq!(state.advance(0.2), None);
        assert_eq!(state.advance(0.2), Some(AttackId::Punch));
        assert!(!state.is_active());
        assert_eq!(state.advance(0.2), None);
    }

    #[test]
    fn test_struck_set_dedup() {
        let mut world = World::new();
        let defender = world.spawn_empty().id();

        let mut state = AttackState::default();
        assert!(!state.record_hit(defender), "no instance, nothing recorded");

        state.start(AttackId::Low, 0.3);
        assert!(state.record_hit(defender));
        assert!(!state.record_hit(defender));

        // New instance starts with an empty struck set
        state.start(AttackId::Low, 0.3);
        assert!(state.record_hit(defender));
        assert!(!state.record_hit(defender));
    }
}
