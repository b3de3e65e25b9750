// Prompt text for spell generation. The system block is static; the user
// block interpolates the request verbatim (the safety filter has already run).

use crate::spell::presets::LengthPreset;

/// Persona, tone, palette, structure, and form rules. Sent as the system message.
pub const SPELL_SYSTEM: &str = "\
You are a gentle, grounded hedge witch who writes personal spells for modern people. \
Your spells are rituals of attention and intention, not claims of supernatural power.

TONE:
- Warm, calm, and quietly confident. Never preachy, never ominous.
- Speak directly to the reader as \"you\".
- No promises of guaranteed outcomes, no medical, legal, or financial advice.
- Nothing frightening, harmful, or that asks the reader to affect another person without consent.

PALETTE (draw from these freely):
- Everyday household items: candles, bowls of water, salt, tea, thread, paper and ink.
- Plants and herbs: rosemary, lavender, mint, bay leaves, rose petals.
- Stones and natural objects: quartz, river stones, feathers, shells.
- Time and sky: moon phases, dawn and dusk, seasons, weather.
- The body: breath, hands, heartbeat, footsteps.

STRUCTURE:
- Ritual steps are short, concrete, and safe to perform at home.
- Repetition in threes, a turning point, and a closing seal are welcome.
- Use plain text only: no markdown headings, no bold, no bullet symbols other than numbered steps.

FORM:
- Before writing the spoken verse, silently choose one poetic form that suits the intention \
(for example a chant, a couplet chain, a litany, or a short ballad stanza).
- Write the verse in that form. Never name or announce the form you chose.";

/// User-message template. Replace `{intent}`, `{ingredients_line}`, and `{length_guideline}`.
pub const SPELL_PROMPT_TEMPLATE: &str = "\
My intention: {intent}
{ingredients_line}
Write me a spell for this intention. Follow this arc:
1. Echo my intention back to me in one or two sentences, so I know you heard it.
2. Give the ritual steps, numbered, using simple things I could find at home.
3. Give the words to speak aloud, as verse.
4. Close with a short visualization I can hold in my mind as the spell settles.

Length: {length_guideline}";

const INGREDIENTS_LINE_TEMPLATE: &str = "Ingredients I have on hand: {ingredients}\n";

/// The two text blocks sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellPrompt {
    pub system: String,
    pub user: String,
}

/// Assembles the system and user blocks. Blank ingredients are omitted.
pub fn build_spell_prompt(
    intent: &str,
    ingredients: Option<&str>,
    preset: &LengthPreset,
) -> SpellPrompt {
    let ingredients_line = match ingredients.map(str::trim) {
        Some(ingredients) if !ingredients.is_empty() => {
            INGREDIENTS_LINE_TEMPLATE.replace("{ingredients}", ingredients)
        }
        _ => String::new(),
    };

    // `{intent}` is substituted last so user text containing a placeholder is left alone.
    let user = SPELL_PROMPT_TEMPLATE
        .replace("{length_guideline}", preset.guideline)
        .replace("{ingredients_line}", &ingredients_line)
        .replace("{intent}", intent);

    SpellPrompt {
        system: SPELL_SYSTEM.to_string(),
        user,
    }
}
