use glam::Vec2;

/// Words that make a chat line count as a compliment. Matched as
/// lowercase substrings.
pub const COMPLIMENT_WORDS: &[&str] = &[
    "good", "love", "cute", "beautiful", "pretty", "sweet", "adorable", "yêu", "thương", "xinh",
    "đẹp",
];

/// Held modifier keys. Any of them turns a shortcut into a system chord.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// One discrete event from the window, keyboard or chat layer. Pointer
/// coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    Click,
    Key { key: char, modifiers: Modifiers },
    /// Voice capture and processing are both finished.
    ListeningEnd,
    /// The assistant replied. `transcript` is what the user said, if known.
    Response {
        text: String,
        transcript: Option<String>,
    },
    ResponseCleared,
}

impl InputEvent {
    pub fn key(key: char) -> Self {
        InputEvent::Key {
            key,
            modifiers: Modifiers::default(),
        }
    }
}

/// Single-key shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Listen,
    Treat,
    Dance,
    Lullaby,
    Catch,
    Shake,
}

impl Shortcut {
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'v' => Some(Shortcut::Listen),
            't' => Some(Shortcut::Treat),
            'd' => Some(Shortcut::Dance),
            'l' => Some(Shortcut::Lullaby),
            'c' => Some(Shortcut::Catch),
            's' => Some(Shortcut::Shake),
            _ => None,
        }
    }

    /// Mood interaction fired by this shortcut. Listening has none.
    pub fn interaction_id(self) -> Option<&'static str> {
        match self {
            Shortcut::Listen => None,
            Shortcut::Treat => Some("treat"),
            Shortcut::Dance => Some("danceParty"),
            Shortcut::Lullaby => Some("lullaby"),
            Shortcut::Catch => Some("playCatch"),
            Shortcut::Shake => Some("shake"),
        }
    }
}

pub fn contains_compliment(text: &str) -> bool {
    let lower = text.to_lowercase();
    COMPLIMENT_WORDS.iter().any(|w| lower.contains(w))
}
