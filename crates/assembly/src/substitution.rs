//! Placeholder substitution.
//!
//! Replaces `{{user}}` and `{{char}}` (case-insensitive) with the persona
//! and character names. A placeholder whose context entry is absent is left
//! untouched, so partially-resolved text survives a later pass unchanged —
//! substitution is idempotent once no resolvable placeholders remain.

use promptloom_core::{Character, Persona};
use serde_json::Value;

/// The names available for substitution. Either side may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionVars<'a> {
    pub user_name: Option<&'a str>,
    pub char_name: Option<&'a str>,
}

impl<'a> SubstitutionVars<'a> {
    /// Build from the optional entities in a prompt context.
    pub fn from_entities(character: Option<&'a Character>, persona: Option<&'a Persona>) -> Self {
        Self {
            user_name: persona.map(|p| p.name.as_str()),
            char_name: character.map(|c| c.name.as_str()),
        }
    }
}

/// Replace all case-insensitive `{{user}}` / `{{char}}` occurrences.
pub fn substitute(text: &str, vars: SubstitutionVars<'_>) -> String {
    if vars.user_name.is_none() && vars.char_name.is_none() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if let Some((replacement, consumed)) = match_placeholder(&text[i..], vars) {
            out.push_str(replacement);
            i += consumed;
        } else {
            // Advance one whole char, not one byte
            let ch = text[i..].chars().next().unwrap_or('\0');
            out.push(ch);
            i += ch.len_utf8();
        }
    }

    out
}

/// Check whether `rest` starts with a resolvable placeholder. Returns the
/// replacement and the byte length consumed.
fn match_placeholder<'a>(rest: &str, vars: SubstitutionVars<'a>) -> Option<(&'a str, usize)> {
    const LEN: usize = "{{user}}".len(); // both placeholders are 8 bytes

    if rest.len() < LEN || !rest.starts_with("{{") {
        return None;
    }
    let candidate = rest.get(..LEN)?;
    if !candidate.ends_with("}}") {
        return None;
    }
    let inner = &candidate[2..LEN - 2];
    if inner.eq_ignore_ascii_case("user") {
        return vars.user_name.map(|name| (name, LEN));
    }
    if inner.eq_ignore_ascii_case("char") {
        return vars.char_name.map(|name| (name, LEN));
    }
    None
}

/// Apply [`substitute`] to every string leaf of a JSON graph, preserving
/// structure, key order, and non-string leaves.
pub fn substitute_deep(value: &Value, vars: SubstitutionVars<'_>) -> Value {
    match value {
        Value::String(s) => Value::String(substitute(s, vars)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| substitute_deep(v, vars)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_deep(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}
