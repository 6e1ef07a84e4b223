use log::{debug, warn};

use crate::providers::{ModelInfo, TranscriptionProvider};

// @module: Candidate model discovery

/// Pick the preferred model of `family` from a listing.
///
/// Only models supporting generation are considered. Shorter names win because
/// dated and experimental variants carry longer suffixes; ties go to the
/// lexicographically smaller name.
pub fn pick_model(models: &[ModelInfo], family: &str) -> Option<String> {
    models.iter()
        .filter(|m| m.supports_generation() && m.name.contains(family))
        .map(|m| m.name.trim_start_matches("models/"))
        .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .map(str::to_string)
}

/// Ask the provider for its models and pick one, or return `fallback`
pub async fn select_model<P: TranscriptionProvider + ?Sized>(provider: &P, family: &str, fallback: &str) -> String {
    match provider.list_models().await {
        Ok(models) => match pick_model(&models, family) {
            Some(model) => {
                debug!("Discovered model {} among {} listed", model, models.len());
                model
            }
            None => {
                warn!("No '{}' model offered, falling back to {}", family, fallback);
                fallback.to_string()
            }
        },
        Err(e) => {
            warn!("Model discovery failed ({}), falling back to {}", e, fallback);
            fallback.to_string()
        }
    }
}

/// Put the discovered model first and drop duplicates, keeping order
pub fn build_candidates(discovered: Option<&str>, configured: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(configured.len() + 1);
    for model in discovered.into_iter().chain(configured.iter().map(String::as_str)) {
        let model = model.trim();
        if !model.is_empty() && !candidates.iter().any(|c| c == model) {
            candidates.push(model.to_string());
        }
    }
    candidates
}
