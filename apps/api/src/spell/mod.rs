// Spell pipeline: safety filter → length preset → prompt assembly → completion.
// Persistence runs detached after the response is built.

pub mod caster;
pub mod handlers;
pub mod persistence;
pub mod presets;
pub mod prompts;
pub mod safety;
