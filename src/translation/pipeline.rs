/*!
 * Per-unit translate, review and polish state machine.
 */

use std::sync::Arc;

use log::debug;

use super::document::{ModelPass, TranslationUnit, UnitStage};
use super::gateway::{Generation, ModelGateway};
use super::glossary::GlossaryStore;

/// Runs a single unit through the three model passes
#[derive(Debug, Clone)]
pub struct UnitPipeline {
    glossary: Arc<GlossaryStore>,
    gateway: Arc<ModelGateway>,
}

impl UnitPipeline {
    pub fn new(glossary: Arc<GlossaryStore>, gateway: Arc<ModelGateway>) -> Self {
        Self { glossary, gateway }
    }

    /// Process one unit to completion
    ///
    /// Code units are copied through without any model call. Every other
    /// unit ends in `UnitStage::Done` with `polished_translation` set, even
    /// when individual calls fell back.
    pub async fn process(&self, mut unit: TranslationUnit) -> TranslationUnit {
        if unit.is_code() {
            unit.translation = unit.source_text().to_string();
            unit.polished_translation = unit.source_text().to_string();
            unit.stage = UnitStage::Done;
            return unit;
        }

        let source = unit.source_text().to_string();
        unit.matched_terms = self.glossary.find_relevant(&source);
        let glossary_prompt = if unit.matched_terms.is_empty() {
            String::new()
        } else {
            GlossaryStore::to_prompt_string(&unit.matched_terms)
        };

        let translation = self.gateway.translate(&source, &glossary_prompt).await;
        unit.translation = record(&mut unit.fallbacks, ModelPass::Translate, translation);
        unit.stage = UnitStage::Translated;

        // identical text means the translate call already fell back
        if unit.translation.is_empty() || unit.translation == source {
            debug!("Skipping review of untranslated unit");
            unit.review_notes = String::new();
        } else {
            let review = self.gateway.review(&source, &unit.translation, &glossary_prompt).await;
            unit.review_notes = record(&mut unit.fallbacks, ModelPass::Review, review);
        }
        unit.stage = UnitStage::Reviewed;

        unit.polished_translation = if unit.translation.is_empty() {
            String::new()
        } else if unit.translation == source {
            unit.translation.clone()
        } else {
            let polished = self
                .gateway
                .polish(&source, &unit.translation, &unit.review_notes, &glossary_prompt)
                .await;
            record(&mut unit.fallbacks, ModelPass::Polish, polished)
        };
        unit.stage = UnitStage::Polished;
        debug!("Unit polished with {} fallbacks", unit.fallbacks.len());
        unit.stage = UnitStage::Done;
        unit
    }
}

fn record(fallbacks: &mut Vec<ModelPass>, pass: ModelPass, generation: Generation) -> String {
    if generation.is_fallback() {
        fallbacks.push(pass);
    }
    generation.into_text()
}
