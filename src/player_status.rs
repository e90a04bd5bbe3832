//! Health, stamina and blood readouts for the status bar. The simulation
//! pushes raw current/max values; this module clamps them and derives the
//! 0-100 percentages the bars render, one [`PartHealth`] per body part plus
//! the whole-body blood and stamina pools.

use log;
use serde::{Deserialize, Serialize};

// A body part is destroyed once it carries this many wounds.
pub const MAX_WOUNDS: u32 = 3;

// --- Vocabulary ---

/// Realm a character fights for. Unknown wire codes read as `Factionless`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Faction {
    #[default]
    Factionless,
    Tdd,
    Viking,
    Arthurian,
}

impl Faction {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Faction::Tdd,
            2 => Faction::Viking,
            3 => Faction::Arthurian,
            0 => Faction::Factionless,
            other => {
                log::debug!("[Status] Unknown faction code {}", other);
                Faction::Factionless
            }
        }
    }
}

/// Body parts the simulation reports on, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Torso,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

impl BodyPart {
    pub const ALL: [BodyPart; 6] = [
        BodyPart::Head,
        BodyPart::Torso,
        BodyPart::RightArm,
        BodyPart::LeftArm,
        BodyPart::RightLeg,
        BodyPart::LeftLeg,
    ];

    fn index(self) -> usize {
        match self {
            BodyPart::Head => 0,
            BodyPart::Torso => 1,
            BodyPart::RightArm => 2,
            BodyPart::LeftArm => 3,
            BodyPart::RightLeg => 4,
            BodyPart::LeftLeg => 5,
        }
    }
}

/// Clamped health of one body part.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartHealth {
    health_percent: f32,
    wounds: u32,
}

impl PartHealth {
    pub fn new(health_percent: f32, wounds: u32) -> Self {
        PartHealth {
            health_percent: health_percent.clamp(0.0, 100.0),
            wounds: wounds.min(MAX_WOUNDS),
        }
    }

    pub fn health_percent(&self) -> f32 {
        self.health_percent
    }

    pub fn wounds(&self) -> u32 {
        self.wounds
    }

    pub fn is_destroyed(&self) -> bool {
        self.wounds >= MAX_WOUNDS
    }
}

// --- Feed payloads ---

/// Raw current/max pair plus wound count for one body part.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PartHealthUpdate {
    pub current_health: f32,
    pub max_health: f32,
    pub wounds: u32,
}

/// One frame of the status feed, raw values as the simulation reports them.
/// `body_parts` follows [`BodyPart::ALL`] order; short arrays leave the
/// remaining parts untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStatusUpdate {
    pub name: String,
    pub faction: i32,
    pub is_alive: bool,
    pub current_blood: f32,
    pub max_blood: f32,
    pub current_stamina: f32,
    pub max_stamina: f32,
    pub body_parts: Vec<PartHealthUpdate>,
}

fn percent_of(current: f32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    (current / max * 100.0).clamp(0.0, 100.0)
}

// --- View state ---

/// What the health bar renders. All percentages are clamped to 0-100; raw
/// counts are kept for the numeric readouts next to the bars.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerStatus {
    pub name: String,
    pub faction: Faction,
    pub is_alive: bool,
    blood_percent: f32,
    current_blood: f32,
    stamina_percent: f32,
    current_stamina: f32,
    parts: [PartHealth; 6],
}

impl PlayerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorbs one feed frame.
    pub fn apply(&mut self, update: &PlayerStatusUpdate) {
        self.name = update.name.clone();
        self.faction = Faction::from_code(update.faction);
        self.is_alive = update.is_alive;
        self.blood_percent = percent_of(update.current_blood, update.max_blood);
        self.current_blood = update.current_blood.max(0.0);
        self.stamina_percent = percent_of(update.current_stamina, update.max_stamina);
        self.current_stamina = update.current_stamina.max(0.0);

        if update.body_parts.len() > BodyPart::ALL.len() {
            log::warn!(
                "[Status] Feed reported {} body parts, expected at most {}",
                update.body_parts.len(),
                BodyPart::ALL.len()
            );
        }
        for (part, raw) in BodyPart::ALL.iter().zip(&update.body_parts) {
            self.parts[part.index()] =
                PartHealth::new(percent_of(raw.current_health, raw.max_health), raw.wounds);
        }
    }

    pub fn blood_percent(&self) -> f32 {
        self.blood_percent
    }

    pub fn current_blood(&self) -> f32 {
        self.current_blood
    }

    pub fn stamina_percent(&self) -> f32 {
        self.stamina_percent
    }

    pub fn current_stamina(&self) -> f32 {
        self.current_stamina
    }

    pub fn part(&self, part: BodyPart) -> PartHealth {
        self.parts[part.index()]
    }

    pub fn health_percent(&self, part: BodyPart) -> f32 {
        self.part(part).health_percent()
    }

    pub fn wounds(&self, part: BodyPart) -> u32 {
        self.part(part).wounds()
    }
}
