use super::constants::*;

/// Coarse happiness bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MoodLevel {
    Depressed,
    Sad,
    Neutral,
    Happy,
    Ecstatic,
}

impl MoodLevel {
    pub fn from_happiness(happiness: f32) -> Self {
        if happiness < MOOD_DEPRESSED {
            MoodLevel::Depressed
        } else if happiness < MOOD_SAD {
            MoodLevel::Sad
        } else if happiness < MOOD_NEUTRAL {
            MoodLevel::Neutral
        } else if happiness < MOOD_HAPPY {
            MoodLevel::Happy
        } else {
            MoodLevel::Ecstatic
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodLevel::Depressed => "depressed",
            MoodLevel::Sad => "sad",
            MoodLevel::Neutral => "neutral",
            MoodLevel::Happy => "happy",
            MoodLevel::Ecstatic => "ecstatic",
        }
    }
}

/// Coarse energy bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnergyLevel {
    Exhausted,
    Tired,
    Normal,
    Energetic,
    Hyperactive,
}

impl EnergyLevel {
    pub fn from_energy(energy: f32) -> Self {
        if energy < ENERGY_EXHAUSTED {
            EnergyLevel::Exhausted
        } else if energy < ENERGY_TIRED {
            EnergyLevel::Tired
        } else if energy < ENERGY_NORMAL {
            EnergyLevel::Normal
        } else if energy < ENERGY_ENERGETIC {
            EnergyLevel::Energetic
        } else {
            EnergyLevel::Hyperactive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnergyLevel::Exhausted => "exhausted",
            EnergyLevel::Tired => "tired",
            EnergyLevel::Normal => "normal",
            EnergyLevel::Energetic => "energetic",
            EnergyLevel::Hyperactive => "hyperactive",
        }
    }
}
