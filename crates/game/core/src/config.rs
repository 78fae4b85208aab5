//! Game configuration constants and tunable parameters.

use crate::env::TerrainKind;

/// Top-level tunables for the combat and noise rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub combat: CombatPolicy,
    pub noise: NoisePolicy,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 16;
    /// Upper bound on sub-attacks spawned by one root attack.
    pub const MAX_QUEUED_ATTACKS: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }
}

/// Numeric policy for the melee resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatPolicy {
    /// Damage percentage dealt to secondary cleave targets.
    pub cleave_percent: i32,
    pub momentum_percent: i32,
    pub lunge_percent: i32,
    pub whirlwind_percent: i32,
    /// Monster stab damage in percent.
    pub monster_stab_percent: i32,
    pub hydra_head_cap: u8,
    pub lernaean_head_cap: u8,
    /// Chance that a monster-on-monster blow can sever a head at all.
    pub mvm_decapitation_percent: i32,
    /// Riposte triggers on `1 in riposte_one_in`.
    pub riposte_one_in: i32,
    /// Percent of swings that ignore the to-hit roll (half hit, half miss).
    pub auto_hit_miss_percent: i32,
    /// To-hit value that always hits.
    pub automatic_hit: i32,
    /// Energy spent per normal-speed attack.
    pub attack_energy: i32,
}

impl Default for CombatPolicy {
    fn default() -> Self {
        Self {
            cleave_percent: 70,
            momentum_percent: 140,
            lunge_percent: 120,
            whirlwind_percent: 80,
            monster_stab_percent: 250,
            hydra_head_cap: 20,
            lernaean_head_cap: 27,
            mvm_decapitation_percent: 25,
            riposte_one_in: 3,
            auto_hit_miss_percent: 5,
            automatic_hit: 1500,
            attack_energy: 10,
        }
    }
}

/// Numeric policy for noise propagation and perception.
///
/// Intensities are in milli-units: a loudness of 1 is 1000.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NoisePolicy {
    /// Attenuation per step through open floor.
    pub base_attenuation: i32,
    pub wall_multiplier: i32,
    pub door_multiplier: i32,
    pub statue_multiplier: i32,
    pub tree_multiplier: i32,
    /// Attenuation through permanent rock; stops any real sound.
    pub permarock_attenuation: i32,
    /// Extra attenuation per unit of turn angle, in percent.
    pub turn_penalty_percent: i32,
    /// Intensities at or below this value are inaudible.
    pub audibility_floor: i32,
    /// Weight of the true source when mislocalizing a noise.
    pub source_weight: i32,
    /// Detour length at which the listener's own position starts to pull.
    pub fuzz_threshold: u32,
    pub listener_weight_per_step: i32,
    /// Stealth used for noises not made by the player.
    pub ambient_stealth: i32,
    /// Turns a listener stays wary after sleeping through a noise.
    pub wary_turns: u16,
}

impl Default for NoisePolicy {
    fn default() -> Self {
        Self {
            base_attenuation: 850,
            wall_multiplier: 12,
            door_multiplier: 8,
            statue_multiplier: 2,
            tree_multiplier: 3,
            permarock_attenuation: 250_000,
            turn_penalty_percent: 25,
            audibility_floor: 0,
            source_weight: 200,
            fuzz_threshold: 3,
            listener_weight_per_step: 25,
            ambient_stealth: 0,
            wary_turns: 10,
        }
    }
}

impl NoisePolicy {
    /// Attenuation of one step out of a cell with the given terrain.
    pub fn attenuation(&self, terrain: TerrainKind) -> i32 {
        match terrain {
            TerrainKind::PermaRock => self.permarock_attenuation,
            TerrainKind::Wall => self.base_attenuation * self.wall_multiplier,
            TerrainKind::Door => self.base_attenuation * self.door_multiplier,
            TerrainKind::Statue => self.base_attenuation * self.statue_multiplier,
            TerrainKind::Tree => self.base_attenuation * self.tree_multiplier,
            TerrainKind::Floor | TerrainKind::ShallowWater | TerrainKind::DeepWater => {
                self.base_attenuation
            }
        }
    }

    /// Attenuation after applying the turn-angle penalty.
    pub fn turned(&self, attenuation: i32, angle: i32) -> i32 {
        if angle == 0 {
            attenuation
        } else {
            attenuation * (100 + angle * self.turn_penalty_percent) / 100
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_attenuation_ordering() {
        let policy = NoisePolicy::default();
        let floor = policy.attenuation(TerrainKind::Floor);
        assert_eq!(floor, 850);
        assert!(policy.attenuation(TerrainKind::Statue) > floor);
        assert!(policy.attenuation(TerrainKind::Door) > policy.attenuation(TerrainKind::Tree));
        assert!(policy.attenuation(TerrainKind::Wall) > policy.attenuation(TerrainKind::Door));
        assert_eq!(policy.attenuation(TerrainKind::PermaRock), 250_000);
    }

    #[test]
    fn turn_penalty_scales_with_angle() {
        let policy = NoisePolicy::default();
        assert_eq!(policy.turned(850, 0), 850);
        assert_eq!(policy.turned(850, 2), 1275);
        assert_eq!(policy.turned(850, 4), 1700);
    }
}
