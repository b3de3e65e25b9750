//! Length presets: map a requested spell size to a token cap and a word guideline.

/// Token budget and length guidance handed to the prompt and the completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPreset {
    pub token_cap: u32,
    pub guideline: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellLength {
    Short,
    Medium,
    Long,
}

/// Used whenever the request omits `length` or sends something unrecognized.
pub const DEFAULT_LENGTH: SpellLength = SpellLength::Medium;

const SHORT: LengthPreset = LengthPreset {
    token_cap: 350,
    guideline: "Keep the whole spell short: roughly 80 to 120 words.",
};

const MEDIUM: LengthPreset = LengthPreset {
    token_cap: 600,
    guideline: "Aim for a medium-length spell: roughly 150 to 220 words.",
};

const LONG: LengthPreset = LengthPreset {
    token_cap: 1000,
    guideline: "Let the spell unfold at length: roughly 250 to 350 words.",
};

impl SpellLength {
    /// Case-insensitive lookup; anything else falls back to `DEFAULT_LENGTH`.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("short") => SpellLength::Short,
            Some("medium") => SpellLength::Medium,
            Some("long") => SpellLength::Long,
            _ => DEFAULT_LENGTH,
        }
    }

    pub fn preset(self) -> &'static LengthPreset {
        match self {
            SpellLength::Short => &SHORT,
            SpellLength::Medium => &MEDIUM,
            SpellLength::Long => &LONG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpellLength::Short => "short",
            SpellLength::Medium => "medium",
            SpellLength::Long => "long",
        }
    }
}
