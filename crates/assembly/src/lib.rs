//! Prompt assembly pipeline.
//!
//! Turns a character, a persona, a tracker snapshot, and the live user
//! input into the exact prompt text sent to the language model, enforcing
//! a token budget along the way.
//!
//! # Section order (a contract, not an implementation detail)
//!
//! | Section | Source | On missing input |
//! |---------|--------|------------------|
//! | 1. SystemDefinitions | constant | always emitted |
//! | 2. SystemPrompt | default + custom instructions | emitted when enabled |
//! | 3. CharacterInfo | character + tracker snapshot | empty string |
//! | 4. PersonaInfo | persona | empty string + warning |
//! | 5. CurrentInput | live user turn | `"User: \nAI: "` |
//!
//! Variable substitution runs once over the concatenated output, then the
//! budget enforcer trims the character / persona blocks if the estimate
//! exceeds the ceiling.
//!
//! # Determinism
//!
//! Assembly is deterministic: identical inputs always produce byte-identical
//! output. The entity cache affects latency only, never the result.

pub mod assembler;
pub mod budget;
pub mod cache;
pub mod sections;
pub mod substitution;
pub mod token;

pub use assembler::{AssembledPrompt, AssemblyRequest, PromptAssembler};
pub use budget::{LimitOutcome, ReducibleSection, limit};
pub use cache::PromptCache;
pub use sections::{
    CharacterInfo, CurrentInput, PersonaInfo, PromptContext, PromptSection, SystemDefinitions,
    SystemPrompt,
};
pub use substitution::{SubstitutionVars, substitute, substitute_deep};
pub use token::{estimate_entries_tokens, estimate_entry_tokens, estimate_tokens};
