//! Spell caster: validates a request, assembles the prompt, and invokes the
//! completion service. Request-scoped; nothing here touches storage.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{CompletionProvider, CompletionRequest};
use crate::spell::presets::SpellLength;
use crate::spell::prompts::{build_spell_prompt, SpellPrompt};
use crate::spell::safety::check_ingredients;

/// Returned whenever the completion service produces no usable text.
pub const FALLBACK_SPELL: &str =
    "The spirits are quiet right now. Take a slow breath, hold your intention close, and try again in a moment.";

pub const NO_INTENTION_MESSAGE: &str = "No intention provided.";

/// Body of `POST /cast-spell`. Every field is optional on the wire so that a
/// missing `intent` gets the same 400 as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastSpellRequest {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
}

/// A validated request with its preset resolved and prompt assembled.
#[derive(Debug, Clone)]
pub struct PreparedSpell {
    pub intent: String,
    pub length: SpellLength,
    pub prompt: SpellPrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellResult {
    pub text: String,
}

impl SpellResult {
    /// Length in characters, not bytes.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Intent check → safety filter → length resolution → prompt assembly.
pub fn prepare(request: &CastSpellRequest) -> Result<PreparedSpell, AppError> {
    let intent = request
        .intent
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(NO_INTENTION_MESSAGE.to_string()))?;

    let ingredients = request.ingredients.as_deref();
    check_ingredients(ingredients.unwrap_or_default())?;

    let length = SpellLength::resolve(request.length.as_deref());
    let prompt = build_spell_prompt(intent, ingredients, length.preset());

    Ok(PreparedSpell {
        intent: intent.to_string(),
        length,
        prompt,
    })
}

/// One completion round trip. Empty output becomes `FALLBACK_SPELL`.
pub async fn cast_spell(
    llm: &dyn CompletionProvider,
    prepared: &PreparedSpell,
) -> Result<SpellResult, AppError> {
    let generated = llm
        .complete(CompletionRequest {
            system: &prepared.prompt.system,
            user: &prepared.prompt.user,
            max_tokens: prepared.length.preset().token_cap,
        })
        .await?;

    let text = match generated.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => {
            info!("Completion returned no text; using fallback spell");
            FALLBACK_SPELL.to_string()
        }
    };

    let result = SpellResult { text };
    info!(
        "Spell cast: length={}, chars={}",
        prepared.length.as_str(),
        result.char_count()
    );

    Ok(result)
}
