use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::constants::MINUTE_MS;
use crate::error::{PetError, PetResult};

/// One named interaction and its effect on the pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub happiness_change: f32,
    #[serde(default)]
    pub energy_change: f32,
    #[serde(default)]
    pub cooldown_ms: i64,
    #[serde(default)]
    pub daily_limit: Option<u32>,
    #[serde(default)]
    pub triggers_sleep: bool,
    #[serde(default)]
    pub energy_required: Option<f32>,
}

impl Interaction {
    fn new(id: &str, name: &str, happiness_change: f32, energy_change: f32, cooldown_ms: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            happiness_change,
            energy_change,
            cooldown_ms,
            daily_limit: None,
            triggers_sleep: false,
            energy_required: None,
        }
    }

    fn daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = Some(limit);
        self
    }

    fn energy_required(mut self, energy: f32) -> Self {
        self.energy_required = Some(energy);
        self
    }

    fn triggers_sleep(mut self) -> Self {
        self.triggers_sleep = true;
        self
    }
}

/// Read-only registry of interactions, looked up by id.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTable {
    entries: HashMap<String, Interaction>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    interactions: Vec<Interaction>,
}

impl InteractionTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Interaction> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.entries.values()
    }

    /// Insert or replace by id.
    pub fn insert(&mut self, interaction: Interaction) -> PetResult<()> {
        validate(&interaction)?;
        self.entries.insert(interaction.id.clone(), interaction);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Interaction> {
        self.entries.remove(id)
    }

    /// Replace or add every entry from `overrides`.
    pub fn merge(&mut self, overrides: impl IntoIterator<Item = Interaction>) -> PetResult<()> {
        for interaction in overrides {
            self.insert(interaction)?;
        }
        Ok(())
    }

    /// Parse a standalone table: a list of `[[interactions]]` entries.
    pub fn from_toml_str(content: &str) -> PetResult<Self> {
        let raw: RawTable = toml::from_str(content)?;
        let mut table = Self::empty();
        table.merge(raw.interactions)?;
        Ok(table)
    }
}

fn validate(interaction: &Interaction) -> PetResult<()> {
    if interaction.id.trim().is_empty() {
        return Err(PetError::InvalidConfig("interaction id is empty".into()));
    }
    if interaction.cooldown_ms < 0 {
        return Err(PetError::InvalidConfig(format!(
            "interaction '{}' has negative cooldown",
            interaction.id
        )));
    }
    if !interaction.happiness_change.is_finite() || !interaction.energy_change.is_finite() {
        return Err(PetError::InvalidConfig(format!(
            "interaction '{}' has a non-finite effect",
            interaction.id
        )));
    }
    Ok(())
}

impl Default for InteractionTable {
    /// Stock balance. Fun activities cost energy, rest and treats restore it,
    /// and dragging or crashing into walls are penalties.
    fn default() -> Self {
        let entries = [
            Interaction::new("pet", "Petting", 5.0, 1.0, 3_000),
            Interaction::new("voiceChat", "Voice Chat", 15.0, -5.0, 5_000),
            Interaction::new("treat", "Give Treat", 10.0, 8.0, 10_000).daily_limit(10),
            Interaction::new("playCatch", "Play Catch", 12.0, -10.0, 30_000).energy_required(20.0),
            Interaction::new("shake", "Gentle Shake", 5.0, 3.0, 3_000),
            Interaction::new("lullaby", "Sing Lullaby", 5.0, 0.0, 60_000).triggers_sleep(),
            Interaction::new("morningGreeting", "Morning Greeting", 20.0, 10.0, 0).daily_limit(1),
            Interaction::new("compliment", "Compliment", 10.0, 0.0, 10_000),
            Interaction::new("danceParty", "Dance Party", 15.0, -15.0, 60_000).energy_required(30.0),
            Interaction::new("quietTime", "Quiet Time", 8.0, 10.0, 3 * MINUTE_MS),
            Interaction::new("drag", "Drag", -5.0, -5.0, 0),
            Interaction::new("hurt", "Hurt", -10.0, -5.0, 0),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|i| (i.id.clone(), i))
                .collect(),
        }
    }
}
