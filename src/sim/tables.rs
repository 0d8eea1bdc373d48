//! Static gameplay data
//!
//! Archetypes, hostile types, status effects, coin tiers, power-ups, scenes
//! and trails. Pure data; no logic beyond lookups.

use serde::{Deserialize, Serialize};

/// One-shot and chance-based defensive traits of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AbilitySet {
    /// Ignore the first status effect a hostile would apply
    pub negate_debuff_once: bool,
    /// Come back once from a fatal hit
    pub revive_once: bool,
    /// Freeze the first thing that hits you
    pub freeze_on_hit: bool,
    /// Chance (0-1) to phase through a gate
    pub phase_chance: f32,
    /// Ticks between phase attempts
    pub ability_cooldown: u32,
}

/// Selectable flyer archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub name: &'static str,
    /// Collision/draw size multiplier
    pub size: f32,
    /// Vertical integration speed multiplier
    pub speed: f32,
    pub thrust_multiplier: f32,
    pub gravity_multiplier: f32,
    pub power_gauge_multiplier: f32,
    pub abilities: AbilitySet,
}

const NO_ABILITIES: AbilitySet = AbilitySet {
    negate_debuff_once: false,
    revive_once: false,
    freeze_on_hit: false,
    phase_chance: 0.0,
    ability_cooldown: 0,
};

pub const ARCHETYPES: [Archetype; 6] = [
    Archetype {
        name: "Classic",
        size: 1.0,
        speed: 1.0,
        thrust_multiplier: 1.0,
        gravity_multiplier: 1.0,
        power_gauge_multiplier: 1.0,
        abilities: NO_ABILITIES,
    },
    Archetype {
        name: "Speedy",
        size: 0.8,
        speed: 1.2,
        thrust_multiplier: 1.15,
        gravity_multiplier: 0.95,
        power_gauge_multiplier: 1.2,
        abilities: NO_ABILITIES,
    },
    Archetype {
        name: "Tank",
        size: 1.3,
        speed: 0.8,
        thrust_multiplier: 0.95,
        gravity_multiplier: 0.9,
        power_gauge_multiplier: 1.0,
        abilities: AbilitySet {
            negate_debuff_once: true,
            ..NO_ABILITIES
        },
    },
    Archetype {
        name: "Phantom",
        size: 0.9,
        speed: 1.0,
        thrust_multiplier: 1.0,
        gravity_multiplier: 1.0,
        power_gauge_multiplier: 1.0,
        abilities: AbilitySet {
            phase_chance: 0.15,
            ability_cooldown: 300,
            ..NO_ABILITIES
        },
    },
    Archetype {
        name: "Phoenix",
        size: 1.1,
        speed: 1.1,
        thrust_multiplier: 1.1,
        gravity_multiplier: 1.05,
        power_gauge_multiplier: 1.1,
        abilities: AbilitySet {
            revive_once: true,
            ..NO_ABILITIES
        },
    },
    Archetype {
        name: "Frost",
        size: 1.0,
        speed: 0.95,
        thrust_multiplier: 1.0,
        gravity_multiplier: 0.95,
        power_gauge_multiplier: 0.9,
        abilities: AbilitySet {
            freeze_on_hit: true,
            ..NO_ABILITIES
        },
    },
];

/// Look up an archetype; out-of-range indices fall back to Classic
pub fn archetype(index: usize) -> &'static Archetype {
    ARCHETYPES.get(index).unwrap_or(&ARCHETYPES[0])
}

/// Adverse status effects applied by hostile contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffectKind {
    /// Gravity multiplied
    HeavyWings,
    /// Thrust reduced
    FlapFatigue,
    /// Screen shake only
    ScreenLurch,
    /// Thrust pushes down instead of up
    Vertigo,
    /// Vision obscured outside a radius
    Blackout,
    /// Terminal speed lowered
    Downdraft,
}

/// Tuning for one status effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEffectSpec {
    pub duration: u32,
    pub magnitude: f32,
    /// Re-application extends instead of being ignored
    pub stackable: bool,
}

impl StatusEffectKind {
    pub const ALL: [StatusEffectKind; 6] = [
        StatusEffectKind::HeavyWings,
        StatusEffectKind::FlapFatigue,
        StatusEffectKind::ScreenLurch,
        StatusEffectKind::Vertigo,
        StatusEffectKind::Blackout,
        StatusEffectKind::Downdraft,
    ];

    pub fn spec(&self) -> StatusEffectSpec {
        match self {
            StatusEffectKind::HeavyWings => StatusEffectSpec {
                duration: 180,
                magnitude: 1.6,
                stackable: false,
            },
            StatusEffectKind::FlapFatigue => StatusEffectSpec {
                duration: 150,
                magnitude: 0.4,
                stackable: false,
            },
            StatusEffectKind::ScreenLurch => StatusEffectSpec {
                duration: 30,
                magnitude: 15.0,
                stackable: true,
            },
            StatusEffectKind::Vertigo => StatusEffectSpec {
                duration: 90,
                magnitude: 0.5,
                stackable: false,
            },
            StatusEffectKind::Blackout => StatusEffectSpec {
                duration: 200,
                magnitude: 140.0,
                stackable: false,
            },
            StatusEffectKind::Downdraft => StatusEffectSpec {
                duration: 120,
                magnitude: 0.5,
                stackable: false,
            },
        }
    }
}

/// Movement pattern of a hostile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Static,
    Tracking,
    Ambush,
    Swarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostileKind {
    Spikeball,
    Ghost,
    Wisp,
    Sprite,
    Gust,
    Shade,
}

/// Tuning for one hostile type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostileSpec {
    pub kind: HostileKind,
    pub size: f32,
    pub effect: StatusEffectKind,
    /// Difficulty at which this type starts spawning
    pub unlock_difficulty: f32,
    pub speed_multiplier: f32,
    pub behavior: Behavior,
    pub spawn_weight: u32,
    /// Idle oscillation (frequency per tick, amplitude per tick)
    pub wobble: (f32, f32),
    pub emits_trail: bool,
}

pub const HOSTILE_SPECS: [HostileSpec; 6] = [
    HostileSpec {
        kind: HostileKind::Spikeball,
        size: 15.0,
        effect: StatusEffectKind::ScreenLurch,
        unlock_difficulty: 0.5,
        speed_multiplier: 1.0,
        behavior: Behavior::Static,
        spawn_weight: 40,
        wobble: (0.02, 1.0),
        emits_trail: false,
    },
    HostileSpec {
        kind: HostileKind::Ghost,
        size: 18.0,
        effect: StatusEffectKind::HeavyWings,
        unlock_difficulty: 1.5,
        speed_multiplier: 0.7,
        behavior: Behavior::Tracking,
        spawn_weight: 30,
        wobble: (0.03, 0.5),
        emits_trail: false,
    },
    HostileSpec {
        kind: HostileKind::Wisp,
        size: 9.0,
        effect: StatusEffectKind::Vertigo,
        unlock_difficulty: 2.5,
        speed_multiplier: 0.9,
        behavior: Behavior::Swarm,
        spawn_weight: 25,
        wobble: (0.06, 0.8),
        emits_trail: true,
    },
    HostileSpec {
        kind: HostileKind::Sprite,
        size: 10.0,
        effect: StatusEffectKind::FlapFatigue,
        unlock_difficulty: 3.0,
        speed_multiplier: 1.2,
        behavior: Behavior::Ambush,
        spawn_weight: 20,
        wobble: (0.1, 1.5),
        emits_trail: true,
    },
    HostileSpec {
        kind: HostileKind::Gust,
        size: 20.0,
        effect: StatusEffectKind::Downdraft,
        unlock_difficulty: 3.5,
        speed_multiplier: 1.4,
        behavior: Behavior::Static,
        spawn_weight: 15,
        wobble: (0.015, 2.0),
        emits_trail: false,
    },
    HostileSpec {
        kind: HostileKind::Shade,
        size: 16.0,
        effect: StatusEffectKind::Blackout,
        unlock_difficulty: 4.0,
        speed_multiplier: 0.8,
        behavior: Behavior::Tracking,
        spawn_weight: 12,
        wobble: (0.025, 0.7),
        emits_trail: false,
    },
];

impl HostileKind {
    pub fn spec(&self) -> &'static HostileSpec {
        let index = match self {
            HostileKind::Spikeball => 0,
            HostileKind::Ghost => 1,
            HostileKind::Wisp => 2,
            HostileKind::Sprite => 3,
            HostileKind::Gust => 4,
            HostileKind::Shade => 5,
        };
        &HOSTILE_SPECS[index]
    }
}

/// Coin rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinTier {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl CoinTier {
    pub const ALL: [CoinTier; 4] = [
        CoinTier::Bronze,
        CoinTier::Silver,
        CoinTier::Gold,
        CoinTier::Diamond,
    ];

    pub fn value(&self) -> u32 {
        match self {
            CoinTier::Bronze => 1,
            CoinTier::Silver => 3,
            CoinTier::Gold => 5,
            CoinTier::Diamond => 10,
        }
    }

    pub fn spawn_weight(&self) -> u32 {
        match self {
            CoinTier::Bronze => 70,
            CoinTier::Silver => 20,
            CoinTier::Gold => 8,
            CoinTier::Diamond => 2,
        }
    }
}

/// Beneficial timed modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Slow,
    Shrink,
    Magnet,
    Speed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Shield,
        PowerUpKind::Slow,
        PowerUpKind::Shrink,
        PowerUpKind::Magnet,
        PowerUpKind::Speed,
    ];

    /// Active duration in ticks
    pub fn duration(&self) -> u32 {
        match self {
            PowerUpKind::Shield => 600,
            _ => 300,
        }
    }

    /// Scroll speed factor while active
    pub fn scroll_factor(&self) -> f32 {
        match self {
            PowerUpKind::Slow => 0.25,
            PowerUpKind::Speed => 1.5,
            _ => 1.0,
        }
    }

    /// Can be picked as the starting power-up
    pub fn offered_at_start(&self) -> bool {
        matches!(self, PowerUpKind::Shield | PowerUpKind::Slow)
    }
}

/// Weather categories, tracked for progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Rain,
    Snow,
    Sandstorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneKind {
    Mountains,
    City,
    Forest,
    CityNight,
    Desert,
    Zen,
    VolcanicZen,
    BloomingZen,
}

impl SceneKind {
    pub fn is_relaxed(&self) -> bool {
        matches!(
            self,
            SceneKind::Zen | SceneKind::VolcanicZen | SceneKind::BloomingZen
        )
    }
}

/// Environment entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub name: &'static str,
    pub sky: [u8; 3],
    pub kind: SceneKind,
    pub weather: Weather,
}

pub const SCENES: [Scene; 10] = [
    Scene {
        name: "Morning",
        sky: [0xA3, 0xC1, 0xFF],
        kind: SceneKind::Mountains,
        weather: Weather::Clear,
    },
    Scene {
        name: "Day",
        sky: [0x70, 0xC5, 0xCE],
        kind: SceneKind::City,
        weather: Weather::Clear,
    },
    Scene {
        name: "Sunset",
        sky: [0xFF, 0x8C, 0x42],
        kind: SceneKind::Forest,
        weather: Weather::Clear,
    },
    Scene {
        name: "Night",
        sky: [0x00, 0x1F, 0x33],
        kind: SceneKind::CityNight,
        weather: Weather::Clear,
    },
    Scene {
        name: "Storm",
        sky: [0x4A, 0x4A, 0x4A],
        kind: SceneKind::City,
        weather: Weather::Rain,
    },
    Scene {
        name: "Snowy Peaks",
        sky: [0xE6, 0xF3, 0xFF],
        kind: SceneKind::Mountains,
        weather: Weather::Snow,
    },
    Scene {
        name: "Desert Dunes",
        sky: [0xFF, 0xA5, 0x00],
        kind: SceneKind::Desert,
        weather: Weather::Sandstorm,
    },
    Scene {
        name: "Snowy Zen Garden",
        sky: [0xD1, 0xE8, 0xE2],
        kind: SceneKind::Zen,
        weather: Weather::Snow,
    },
    Scene {
        name: "Volcanic Zen",
        sky: [0x58, 0x1C, 0x0C],
        kind: SceneKind::VolcanicZen,
        weather: Weather::Clear,
    },
    Scene {
        name: "Blooming Zen Garden",
        sky: [0xFF, 0xC0, 0xCB],
        kind: SceneKind::BloomingZen,
        weather: Weather::Clear,
    },
];

/// Cosmetic trail behind the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailStyle {
    Basic,
    Sparkle,
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSpec {
    /// Emit every N ticks
    pub emit_every: u64,
    pub life: u32,
    /// Fraction of the player's drawn radius
    pub size: f32,
    pub velocity_spread: f32,
    /// Vertical drift per tick (negative rises)
    pub rise_speed: f32,
}

impl TrailStyle {
    pub fn spec(&self) -> TrailSpec {
        match self {
            TrailStyle::Basic => TrailSpec {
                emit_every: 1,
                life: 15,
                size: 0.5,
                velocity_spread: 0.0,
                rise_speed: 0.0,
            },
            TrailStyle::Sparkle => TrailSpec {
                emit_every: 2,
                life: 30,
                size: 0.5,
                velocity_spread: 1.5,
                rise_speed: 0.0,
            },
            TrailStyle::Bubble => TrailSpec {
                emit_every: 3,
                life: 45,
                size: 0.6,
                velocity_spread: 0.5,
                rise_speed: -0.3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostile_spec_lookup_matches_kind() {
        for spec in &HOSTILE_SPECS {
            assert_eq!(spec.kind.spec().kind, spec.kind);
        }
    }

    #[test]
    fn test_exactly_one_stackable_effect() {
        let stackable = StatusEffectKind::ALL
            .iter()
            .filter(|k| k.spec().stackable)
            .count();
        assert_eq!(stackable, 1);
    }

    #[test]
    fn test_scene_pools_nonempty() {
        assert!(SCENES.iter().any(|s| s.kind.is_relaxed()));
        assert!(SCENES.iter().any(|s| !s.kind.is_relaxed()));
    }

    #[test]
    fn test_archetype_fallback() {
        assert_eq!(archetype(42).name, "Classic");
        assert_eq!(archetype(4).name, "Phoenix");
    }
}
