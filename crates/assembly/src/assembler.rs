//! The prompt assembler.
//!
//! Orchestrates the full pipeline: render each section in order (character
//! and persona blocks through their version-keyed caches), concatenate,
//! run one substitution pass over the whole text, then enforce the token
//! budget with the entity blocks registered as reducible.
//!
//! Assembly is deterministic over its inputs. Caches change latency, never
//! bytes.

use promptloom_core::{AssemblyConfig, AssemblyError, Character, Persona, Result, TrackerSnapshot};
use tracing::debug;

use crate::budget::{self, ReducibleSection};
use crate::cache::PromptCache;
use crate::sections::{
    CharacterInfo, CurrentInput, PersonaInfo, PromptContext, PromptSection, SystemDefinitions,
    SystemPrompt,
};
use crate::substitution::{SubstitutionVars, substitute};

/// Expendability ranks for budget enforcement. Persona goes first; the
/// character block is the last thing worth cutting before hard overage.
const CHARACTER_PRIORITY: u8 = 1;
const PERSONA_PRIORITY: u8 = 2;

/// Inputs for one assembly run. Entity references are borrowed; the
/// assembler never owns domain data.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyRequest<'a> {
    pub character: Option<&'a Character>,
    pub persona: Option<&'a Persona>,
    pub tracker: Option<&'a TrackerSnapshot>,
    pub user_input: &'a str,
    pub custom_system_prompt: Option<&'a str>,
}

/// A finished prompt, ready for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub text: String,
    pub estimated_tokens: usize,
    pub was_truncated: bool,
}

/// Stateful assembler: owns the section list, the entity caches, and the
/// budget configuration. One instance per app session is the expected
/// shape; it is `Send + Sync` via the caches' interior locking.
pub struct PromptAssembler {
    config: AssemblyConfig,
    sections: Vec<Box<dyn PromptSection + Send + Sync>>,
    character_cache: PromptCache,
    persona_cache: PromptCache,
}

impl PromptAssembler {
    /// An assembler with the canonical five-section order.
    pub fn new(config: AssemblyConfig) -> Self {
        let sections: Vec<Box<dyn PromptSection + Send + Sync>> = vec![
            Box::new(SystemDefinitions),
            Box::new(SystemPrompt),
            Box::new(CharacterInfo),
            Box::new(PersonaInfo),
            Box::new(CurrentInput),
        ];
        Self::with_sections(config, sections)
    }

    /// An assembler over a caller-chosen section list. The list order is
    /// the emission order.
    pub fn with_sections(
        config: AssemblyConfig,
        sections: Vec<Box<dyn PromptSection + Send + Sync>>,
    ) -> Self {
        let ttl = config.entity_cache_ttl();
        Self {
            config,
            sections,
            character_cache: PromptCache::new(ttl),
            persona_cache: PromptCache::new(ttl),
        }
    }

    /// Run the pipeline. Fails only on an empty section list; data gaps
    /// (no character, no persona) degrade to omitted sections.
    pub fn assemble(&self, request: &AssemblyRequest<'_>) -> Result<AssembledPrompt> {
        if self.sections.is_empty() {
            return Err(AssemblyError::NoSections.into());
        }

        let ctx = PromptContext {
            character: request.character,
            persona: request.persona,
            tracker: request.tracker,
            user_input: request.user_input,
            custom_system_prompt: request.custom_system_prompt,
            enable_system_prompt: self.config.enable_system_prompt,
            enable_jailbreak_prompt: self.config.enable_jailbreak_prompt,
        };

        let mut text = String::new();
        let mut character_block = String::new();
        let mut persona_block = String::new();

        for section in &self.sections {
            let rendered = self.render(section.as_ref(), &ctx);
            match section.name() {
                "character_information" => character_block = rendered.clone(),
                "persona_information" => persona_block = rendered.clone(),
                _ => {}
            }
            text.push_str(&rendered);
        }

        // One substitution pass over the final text. The reducible blocks
        // get the same treatment so they still match verbatim inside it.
        let vars = SubstitutionVars::from_entities(request.character, request.persona);
        let text = substitute(&text, vars);
        let character_block = substitute(&character_block, vars);
        let persona_block = substitute(&persona_block, vars);

        let mut reducible = Vec::new();
        if !persona_block.is_empty() {
            reducible.push(ReducibleSection {
                name: "persona_information".to_string(),
                content: persona_block,
                priority: PERSONA_PRIORITY,
            });
        }
        if !character_block.is_empty() {
            reducible.push(ReducibleSection {
                name: "character_information".to_string(),
                content: character_block,
                priority: CHARACTER_PRIORITY,
            });
        }

        let outcome = budget::limit(&text, self.config.max_tokens, &reducible);
        debug!(
            original_tokens = outcome.original_tokens,
            final_tokens = outcome.final_tokens,
            truncated = outcome.was_limited,
            "prompt assembled"
        );

        Ok(AssembledPrompt {
            text: outcome.limited_text,
            estimated_tokens: outcome.final_tokens,
            was_truncated: outcome.was_limited,
        })
    }

    /// Render one section, routing the entity blocks through their caches.
    /// A live tracker snapshot bypasses the character cache: tracker state
    /// changes per turn without bumping the character's version key.
    fn render(&self, section: &(dyn PromptSection + Send + Sync), ctx: &PromptContext<'_>) -> String {
        match (section.name(), ctx.character, ctx.persona) {
            ("character_information", Some(character), _) => {
                let live_tracker = ctx
                    .tracker
                    .is_some_and(|t| t.character_id == character.id && !t.is_empty());
                if live_tracker {
                    section.build(ctx)
                } else {
                    self.character_cache
                        .get_or_build(&character.version_key(), || section.build(ctx))
                }
            }
            ("persona_information", _, Some(persona)) => self
                .persona_cache
                .get_or_build(&persona.version_key(), || section.build(ctx)),
            _ => section.build(ctx),
        }
    }

    /// Drop cached renders for one character, e.g. after an edit that did
    /// not touch `updated_at`.
    pub fn invalidate_character(&self, character_id: &str) {
        self.character_cache.invalidate(character_id);
    }

    /// Drop cached renders for one persona.
    pub fn invalidate_persona(&self, persona_id: &str) {
        self.persona_cache.invalidate(persona_id);
    }

    pub fn clear_caches(&self) {
        self.character_cache.clear();
        self.persona_cache.clear();
    }
}

impl std::fmt::Debug for PromptAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptAssembler")
            .field("config", &self.config)
            .field("sections", &self.sections.len())
            .finish_non_exhaustive()
    }
}
