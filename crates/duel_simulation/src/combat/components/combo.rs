//! Combo memory: moves already landed against the current opponent.

use bevy::prelude::*;
use bitflags::bitflags;

use crate::combat::AttackId;

bitflags! {
    /// Set of attack identifiers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttackSet: u8 {
        const PUNCH       = 1 << 0;
        const HEAVY_PUNCH = 1 << 1;
        const LOW         = 1 << 2;
        const LOW_KICK    = 1 << 3;
        const AIR_KICK    = 1 << 4;
        const SPECIAL     = 1 << 5;
    }
}

impl AttackSet {
    pub fn of(id: AttackId) -> Self {
        match id {
            AttackId::Punch => Self::PUNCH,
            AttackId::HeavyPunch => Self::HEAVY_PUNCH,
            AttackId::Low => Self::LOW,
            AttackId::LowKick => Self::LOW_KICK,
            AttackId::AirKick => Self::AIR_KICK,
            AttackId::Special => Self::SPECIAL,
        }
    }
}

/// Per-fighter combo memory.
///
/// A move that connected unblocked cannot be started again until the
/// opponent it hit leaves stun. The memory clears each time the opponent's
/// stun goes from > 0 to 0 and at no other time. Exits are tracked through
/// the opponent's exit counter, so one that begins and ends between two
/// observations still clears.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ComboMemory {
    #[reflect(ignore)]
    pub used: AttackSet,
    /// Opponent's `CombatTimers::stun_exits` at the previous observation
    pub opponent_stun_exits: u32,
}

impl ComboMemory {
    /// Whether `id` may be started. Specials are never locked out.
    pub fn allows(&self, id: AttackId) -> bool {
        id.bypasses_combo_memory() || !self.used.contains(AttackSet::of(id))
    }

    pub fn contains(&self, id: AttackId) -> bool {
        self.used.contains(AttackSet::of(id))
    }

    pub fn remember(&mut self, id: AttackId) {
        self.used.insert(AttackSet::of(id));
    }

    /// Feeds the opponent's stun exit counter. Returns `true` if the memory
    /// was cleared because the opponent left stun since the last call.
    pub fn observe_opponent(&mut self, opponent_stun_exits: u32) -> bool {
        let exited = self.opponent_stun_exits != opponent_stun_exits;
        self.opponent_stun_exits = opponent_stun_exits;
        if exited {
            self.used = AttackSet::empty();
        }
        exited
    }
}
