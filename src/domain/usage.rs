use crate::domain::ModelTokens;
use std::collections::BTreeMap;

/// Per-family display name with accumulated token totals.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelUsageSummary {
    pub display_name: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ModelUsageSummary {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

// Priority order matters: the first family substring found in the raw
// identifier wins.
const MODEL_FAMILIES: &[(&str, &str)] = &[("opus", "Opus"), ("sonnet", "Sonnet"), ("haiku", "Haiku")];

/// Canonical short display name for a raw model identifier.
///
/// `claude-opus-4-20250101` becomes "Opus"; an identifier matching no known
/// family falls back to its leading hyphen-delimited segment.
pub fn canonical_model_name(model_id: &str) -> String {
    let lower = model_id.to_lowercase();
    for (needle, display) in MODEL_FAMILIES {
        if lower.contains(needle) {
            return (*display).to_string();
        }
    }

    model_id
        .split('-')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(model_id)
        .to_string()
}

/// Collapse raw per-model usage into canonical families.
///
/// Distinct identifiers that canonicalize to the same name have their
/// counts summed, never overwritten. Output is sorted by total tokens
/// descending, then by name.
pub fn combine_model_usage<'a, I>(entries: I) -> Vec<ModelUsageSummary>
where
    I: IntoIterator<Item = (&'a str, ModelTokens)>,
{
    let mut merged: BTreeMap<String, ModelTokens> = BTreeMap::new();
    for (model_id, tokens) in entries {
        let slot = merged.entry(canonical_model_name(model_id)).or_default();
        slot.input_tokens = slot.input_tokens.saturating_add(tokens.input_tokens);
        slot.output_tokens = slot.output_tokens.saturating_add(tokens.output_tokens);
    }

    let mut summaries: Vec<ModelUsageSummary> = merged
        .into_iter()
        .map(|(display_name, tokens)| ModelUsageSummary {
            display_name,
            input_tokens: tokens.input_tokens,
            output_tokens: tokens.output_tokens,
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.total_tokens()
            .cmp(&a.total_tokens())
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    summaries
}
