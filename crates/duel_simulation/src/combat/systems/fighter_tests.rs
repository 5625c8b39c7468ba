//! Tests for the fighter step.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::test_support::{catalog_with, config_at, scenario_punch, Duel, DT};
    use crate::combat::{
        AttackCatalog, AttackId, AttackState, ComboMemory, FighterDefeated, Guard, HitLanded,
        Hitstop,
    };
    use crate::components::{
        AnimationSignals, CombatTimers, Facing, Fighter, Health, Locomotion, PhysicsBody,
    };
    use crate::round::{RestartCountdown, RestartRequested};

    fn attack_of(duel: &Duel, entity: Entity) -> Option<AttackId> {
        duel.get::<AttackState>(entity).current_id()
    }

    // ========================================================================
    // Hits
    // ========================================================================

    #[test]
    fn test_unblocked_punch_scenario() {
        let mut duel = Duel::new(config_at(-0.4, 0.4), scenario_punch());
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p2).attack = true;
        duel.tick();

        assert_eq!(attack_of(&duel, p2), Some(AttackId::Punch));
        assert_eq!(duel.get::<Health>(p1).current, 90.0);
        // P1 already stepped this tick, so the stun is untouched
        assert_eq!(duel.get::<CombatTimers>(p1).stun, 0.5);

        let velocity = duel.get::<PhysicsBody>(p1).velocity;
        assert_eq!(velocity.x, -1.0);
        assert!(velocity.y > 0.0, "knocked upward, got {velocity:?}");

        let hits = duel.drain::<HitLanded>();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].attacker, p2);
        assert_eq!(hits[0].defender, p1);
        assert!(!hits[0].blocked);
        assert!(duel.get::<ComboMemory>(p2).contains(AttackId::Punch));
    }

    #[test]
    fn test_one_hit_per_instance() {
        let mut duel = Duel::close();
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p1).attack = true;
        // Punch overlaps P2 for its whole duration
        duel.ticks(40);

        let hits = duel.drain::<HitLanded>();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].defender, p2);
        assert_eq!(duel.get::<Health>(p2).current, 95.0);
    }

    #[test]
    fn test_hit_starts_hitstop_and_freezes_both() {
        let mut duel = Duel::close();
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p1).heavy_attack = true;
        duel.tick();

        let hitstop = duel.world().resource::<Hitstop>().clone();
        assert!(hitstop.is_active());
        assert_eq!(hitstop.remaining, 0.1);
        assert!(duel.get::<CombatTimers>(p1).is_frozen());
        assert!(duel.get::<CombatTimers>(p2).is_frozen());
        assert!(duel.get::<AnimationSignals>(p2).frozen);

        // 0.1 s of unscaled time later everything runs at full speed again
        duel.ticks(7);
        assert!(!duel.world().resource::<Hitstop>().is_active());
        assert!(!duel.get::<CombatTimers>(p1).is_frozen());
    }

    #[test]
    fn test_repeat_rejected_until_stun_ends() {
        let mut duel = Duel::new(config_at(-0.4, 0.4), scenario_punch());
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p2).attack = true;
        duel.tick();
        assert_eq!(duel.drain::<HitLanded>().len(), 1);

        let mut rejected_while_stunned = 0;
        let mut second_start = None;

        for tick in 0..120 {
            let was_idle = attack_of(&duel, p2).is_none();
            // P1 steps first: a stun of at most one tick runs out before P2 acts
            let stun_outlasts_tick = duel.get::<CombatTimers>(p1).stun > DT;
            duel.intent(p2).attack = true;
            duel.tick();

            let started = was_idle && attack_of(&duel, p2) == Some(AttackId::Punch);

            if was_idle && !started && stun_outlasts_tick {
                rejected_while_stunned += 1;
            }
            if started {
                assert!(!stun_outlasts_tick, "punch restarted while the defender was stunned");
                second_start = Some(tick);
                break;
            }
        }

        assert!(rejected_while_stunned > 0);
        assert!(second_start.is_some(), "punch never allowed again");
    }

    #[test]
    fn test_combo_memory_clears_exactly_on_stun_exit() {
        let mut duel = Duel::new(config_at(-0.4, 0.4), scenario_punch());
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p2).attack = true;
        duel.tick();

        let mut previous_stunned = true;
        for _ in 0..100 {
            duel.tick();
            let stunned = duel.get::<CombatTimers>(p1).is_stunned();
            let remembered = duel.get::<ComboMemory>(p2).contains(AttackId::Punch);
            if previous_stunned && !stunned {
                assert!(!remembered, "memory kept past the stun edge");
                return;
            }
            assert!(remembered, "memory cleared before the stun edge");
            previous_stunned = stunned;
        }
        panic!("stun never ended");
    }

    #[test]
    fn test_combo_memory_clears_after_stun_shorter_than_a_tick() {
        // The defender steps after the attacker and burns the whole stun in that step
        let catalog = catalog_with(AttackId::Punch, |punch| {
            punch.stun_duration = 0.01;
            punch.hitstop_duration = 0.0;
        });
        let mut duel = Duel::new(config_at(-0.4, 0.4), catalog);
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p1).attack = true;
        duel.tick();
        assert_eq!(duel.drain::<HitLanded>().len(), 1);
        assert!(!duel.get::<CombatTimers>(p2).is_stunned());
        assert_eq!(duel.get::<CombatTimers>(p2).stun_exits, 1);
        assert!(duel.get::<ComboMemory>(p1).contains(AttackId::Punch));

        duel.tick();
        assert!(!duel.get::<ComboMemory>(p1).contains(AttackId::Punch));

        // Once the first punch is over the same move connects again
        duel.ticks(30);
        assert_eq!(attack_of(&duel, p1), None);
        duel.intent(p1).attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), Some(AttackId::Punch));
        assert_eq!(duel.drain::<HitLanded>().len(), 1);
    }

    #[test]
    fn test_crouch_block_vs_low() {
        let catalog = catalog_with(AttackId::Low, |low| low.damage = 8.0);
        let mut duel = Duel::new(config_at(-0.4, 0.4), catalog);
        let (p1, p2) = (duel.p1, duel.p2);

        // P1 faces right: back + down is a crouch block
        duel.intent(p1).axis = Vec2::new(-1.0, -1.0);
        duel.intent(p2).axis = Vec2::new(0.0, -1.0);
        duel.tick();
        assert_eq!(*duel.get::<Guard>(p1), Guard::Crouching);

        duel.intent(p2).attack = true;
        duel.tick();

        assert_eq!(attack_of(&duel, p2), Some(AttackId::Low));
        assert!((duel.get::<Health>(p1).current - 98.4).abs() < 1e-4);
        assert_eq!(duel.get::<CombatTimers>(p1).stun, 0.0);

        let hits = duel.drain::<HitLanded>();
        assert!(hits[0].blocked);
        assert!(!duel.get::<ComboMemory>(p2).contains(AttackId::Low));
    }

    #[test]
    fn test_low_beats_standing_block() {
        let mut duel = Duel::close();
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p1).axis = Vec2::new(-1.0, 0.0);
        duel.intent(p2).axis = Vec2::new(0.0, -1.0);
        duel.tick();
        assert_eq!(*duel.get::<Guard>(p1), Guard::Standing);

        duel.intent(p2).attack = true;
        duel.tick();

        assert!(!duel.drain::<HitLanded>()[0].blocked);
        assert!(duel.get::<CombatTimers>(p1).is_stunned());
        // Stunned fighters drop their guard
        assert_eq!(*duel.get::<Guard>(p1), Guard::None);
    }

    #[test]
    fn test_ko_requests_restart_after_delay() {
        let mut config = config_at(-0.4, 0.4);
        config.combat.restart_delay = 0.5;
        let mut duel = Duel::new(config, scenario_punch());
        let (p1, p2) = (duel.p1, duel.p2);
        duel.get_mut::<Health>(p1).current = 5.0;

        duel.intent(p2).attack = true;
        duel.tick();

        assert_eq!(duel.get::<Health>(p1).current, 0.0);
        let defeats = duel.drain::<FighterDefeated>();
        assert_eq!(defeats.len(), 1);
        assert_eq!(defeats[0].fighter, p1);
        assert_eq!(defeats[0].killer, Some(p2));
        assert!(duel.world().resource::<RestartCountdown>().is_armed());

        let mut waited = 0.0;
        let mut requests = Vec::new();
        while requests.is_empty() && waited < 2.0 {
            duel.tick();
            waited += DT;
            requests = duel.drain::<RestartRequested>();
        }

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].after, 0.5);
        assert!(waited >= 0.5, "restart after {waited}s");
        assert!(waited < 0.7, "restart after {waited}s");
        assert!(duel.get::<AnimationSignals>(p1).defeated);
    }

    // ========================================================================
    // Attack selection
    // ========================================================================

    #[test]
    fn test_crouching_routes_to_low_moves() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).axis = Vec2::new(0.0, -1.0);
        duel.intent(p1).attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), Some(AttackId::Low));

        duel.ticks(30);
        duel.intent(p1).heavy_attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), Some(AttackId::LowKick));
    }

    #[test]
    fn test_trigger_priority_light_first() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        {
            let mut intent = duel.intent(p1);
            intent.attack = true;
            intent.heavy_attack = true;
            intent.special_attack = true;
        }
        duel.tick();
        assert_eq!(attack_of(&duel, p1), Some(AttackId::Punch));
        // Triggers are one-shot
        let intent = duel.intent(p1);
        assert!(!intent.attack && !intent.heavy_attack && !intent.special_attack);
    }

    #[test]
    fn test_no_new_attack_while_one_runs() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).heavy_attack = true;
        duel.tick();
        duel.intent(p1).attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), Some(AttackId::HeavyPunch));
    }

    #[test]
    fn test_air_moves() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).axis = Vec2::new(1.0, 0.0);
        duel.intent(p1).jump = true;
        duel.intent(p1).jump_held = true;
        duel.ticks(3);
        assert!(!duel.get::<Locomotion>(p1).grounded);

        // Heavy and special are ground-only
        duel.intent(p1).heavy_attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), None);
        duel.intent(p1).special_attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), None);

        let drift = duel.get::<PhysicsBody>(p1).velocity.x;
        duel.intent(p1).axis = Vec2::ZERO;
        duel.intent(p1).attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), Some(AttackId::AirKick));
        // Air kick keeps its momentum
        assert_eq!(duel.get::<PhysicsBody>(p1).velocity.x, drift);
    }

    #[test]
    fn test_disabled_move_never_starts() {
        let mut catalog = AttackCatalog::standard();
        catalog.remove(AttackId::HeavyPunch);
        let mut duel = Duel::new(config_at(-5.0, 5.0), catalog);
        let p1 = duel.p1;

        duel.intent(p1).heavy_attack = true;
        duel.tick();
        assert_eq!(attack_of(&duel, p1), None);
    }

    #[test]
    fn test_attack_expires_after_duration() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).attack = true;
        duel.tick();
        // 0.3 s punch at 1/64 s per tick
        duel.ticks(18);
        assert_eq!(attack_of(&duel, p1), Some(AttackId::Punch));
        duel.ticks(2);
        assert_eq!(attack_of(&duel, p1), None);
    }

    // ========================================================================
    // Movement
    // ========================================================================

    #[test]
    fn test_walk_and_backward_penalty() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).axis = Vec2::new(1.0, 0.0);
        duel.tick();
        assert_eq!(duel.get::<PhysicsBody>(p1).velocity.x, 4.0);
        assert!(duel.get::<AnimationSignals>(p1).walking);

        duel.intent(p1).axis = Vec2::new(-1.0, 0.0);
        duel.tick();
        assert!((duel.get::<PhysicsBody>(p1).velocity.x + 2.8).abs() < 1e-6);
        assert_eq!(*duel.get::<Guard>(p1), Guard::Standing);
    }

    #[test]
    fn test_crouch_stops_walking() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).axis = Vec2::new(1.0, -1.0);
        duel.tick();
        assert_eq!(duel.get::<PhysicsBody>(p1).velocity.x, 0.0);
        assert!(duel.get::<Locomotion>(p1).crouching);
        assert!(duel.get::<AnimationSignals>(p1).crouching);
    }

    #[test]
    fn test_double_tap_dash() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        for x in [1.0, 0.0, 1.0] {
            duel.intent(p1).axis = Vec2::new(x, 0.0);
            duel.tick();
        }

        assert!(duel.get::<Locomotion>(p1).is_dashing());
        let body = *duel.get::<PhysicsBody>(p1);
        assert_eq!(body.velocity.x, 10.0);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.gravity_scale, 0.0);

        // 0.18 s later the dash is over
        duel.intent(p1).axis = Vec2::ZERO;
        duel.ticks(13);
        assert!(!duel.get::<Locomotion>(p1).is_dashing());
        assert_eq!(duel.get::<PhysicsBody>(p1).gravity_scale, 1.0);
    }

    #[test]
    fn test_jump_and_land() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).jump = true;
        duel.intent(p1).jump_held = true;
        duel.tick();
        assert!(!duel.get::<Locomotion>(p1).grounded);
        assert!(duel.position(p1).y > 0.0);
        assert!(duel.get::<AnimationSignals>(p1).jumping);

        let mut landed = false;
        for _ in 0..120 {
            duel.tick();
            if duel.get::<Locomotion>(p1).grounded {
                landed = true;
                break;
            }
        }
        assert!(landed);
        // Grounded within the epsilon; the body settles on the floor next tick
        duel.tick();
        assert_eq!(duel.position(p1).y, 0.0);
    }

    #[test]
    fn test_low_jump_is_shorter() {
        let apex = |held: bool| {
            let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
            let p1 = duel.p1;
            duel.intent(p1).jump = true;
            duel.intent(p1).jump_held = held;
            let mut apex: f32 = 0.0;
            for _ in 0..60 {
                duel.tick();
                apex = apex.max(duel.position(p1).y);
            }
            apex
        };
        assert!(apex(false) < apex(true));
    }

    #[test]
    fn test_punch_locks_jump() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let p1 = duel.p1;

        duel.intent(p1).attack = true;
        duel.tick();
        duel.intent(p1).jump = true;
        duel.tick();
        assert_eq!(duel.position(p1).y, 0.0);
        assert!(duel.get::<Locomotion>(p1).grounded);
        assert_eq!(duel.get::<PhysicsBody>(p1).velocity.x, 0.0);
    }

    #[test]
    fn test_facing_follows_opponent() {
        let mut duel = Duel::new(config_at(-5.0, 5.0), AttackCatalog::standard());
        let (p1, p2) = (duel.p1, duel.p2);

        duel.get_mut::<Transform>(p1).translation.x = 8.0;
        duel.tick();
        assert_eq!(duel.get::<Fighter>(p1).facing, Facing::Left);
        assert_eq!(duel.get::<Fighter>(p2).facing, Facing::Right);
    }

    #[test]
    fn test_stunned_fighter_ignores_input() {
        let mut duel = Duel::close();
        let (p1, p2) = (duel.p1, duel.p2);

        duel.intent(p2).heavy_attack = true;
        duel.tick();
        assert!(duel.get::<CombatTimers>(p1).is_stunned());

        duel.intent(p1).attack = true;
        duel.intent(p1).axis = Vec2::new(-1.0, 0.0);
        duel.tick();
        assert_eq!(attack_of(&duel, p1), None);
        assert_eq!(*duel.get::<Guard>(p1), Guard::None);
        assert!(duel.get::<AnimationSignals>(p1).stunned);
    }
}
