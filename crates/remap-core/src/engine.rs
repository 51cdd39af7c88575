//! Recompute pipeline
//!
//! One recompute is a pure function of the field tree and the manual entries:
//! resolve → recommend → evaluate → propagate → gate.

use crate::config::EngineConfig;
use crate::evaluate::{StatusSummary, evaluate};
use crate::gate;
use crate::manual::ManualEntries;
use crate::model::{ActionMap, AllowedActionMap, EvaluationMap, FieldFacts, RecommendationMap};
use crate::propagate::StatusPropagator;
use crate::recommend::RecommendationEngine;
use crate::resolver::resolve;
use crate::tree::FieldTree;
use serde::Serialize;

/// Everything derived for one mapping
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResult {
    pub actions: ActionMap,
    pub recommendations: RecommendationMap,
    pub evaluations: EvaluationMap,
    pub allowed_actions: AllowedActionMap,
    pub summary: StatusSummary,
}

impl MappingResult {
    pub fn completion_percentage(&self) -> f64 {
        self.summary.completion_percentage()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    recommender: RecommendationEngine,
    propagator: StatusPropagator,
}

impl MappingEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            recommender: RecommendationEngine::new(config.recommendations.clone()),
            propagator: StatusPropagator::new(config.propagation.clone()),
        }
    }

    pub fn recompute<F: FieldFacts>(
        &self,
        tree: &FieldTree<F>,
        manual: &ManualEntries,
    ) -> MappingResult {
        let actions = resolve(tree, manual);
        let recommendations = self.recommender.recommend(tree, &actions);
        let evaluations = evaluate(tree, &actions);
        let evaluations = self.propagator.propagate(tree, &evaluations, &actions);

        let mut allowed_actions = gate::baseline(tree);
        gate::adjust(tree, &evaluations, &mut allowed_actions);

        let summary = StatusSummary::from_evaluations(&evaluations);
        tracing::info!(
            "Recomputed {} fields: {} compatible, {} warning, {} solved, {} incompatible",
            summary.total,
            summary.compatible,
            summary.warning,
            summary.solved,
            summary.incompatible
        );

        MappingResult {
            actions,
            recommendations,
            evaluations,
            allowed_actions,
            summary,
        }
    }
}
