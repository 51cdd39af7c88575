//! Remap Core
//!
//! Action resolution and evaluation engine for field-by-field schema
//! migration. Given a field tree with precomputed compatibility
//! classifications and a sparse set of operator decisions, a recompute
//! derives the effective action, recommendations, evaluation status and
//! legal actions of every field.

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod gate;
pub mod manual;
pub mod model;
pub mod path;
pub mod propagate;
pub mod recommend;
pub mod resolver;
pub mod result;
pub mod tree;

// Re-export commonly used types
pub use config::{ConfigLoader, EngineConfig, PropagationConfig, RecommendationConfig};
pub use engine::{MappingEngine, MappingResult};
pub use error::RemapError;
pub use evaluate::{StatusSummary, evaluate};
pub use gate::all_descendants_compatible_or_solved;
pub use manual::{LegacyAction, ManualEntries, ManualEntry, RawAction, parse_action};
pub use model::{
    ActionInfo, ActionKind, ActionMap, ActionSource, AllowedActionMap, Classification,
    EvaluationMap, EvaluationReason, EvaluationResult, EvaluationStatus, FieldFacts,
    FixedValueKind, MappingField, MappingStatus, ProfileFacts, Recommendation, RecommendationMap,
    Severity,
};
pub use propagate::StatusPropagator;
pub use recommend::{
    PartnerMatch, PartnerValidity, PathIndex, RecommendationEngine, SliceFallbackValidity,
};
pub use resolver::resolve;
pub use result::Result;
pub use tree::{FieldId, FieldTree, ProfileKeys, Snapshot};

/// Initialize tracing with an explicit default filter; `RUST_LOG` still wins
pub fn init_tracing_with_filter(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
