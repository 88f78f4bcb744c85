//! Static model catalog (out of scope per spec.md §1 — "model-catalog
//! constants" — kept as a thin, hard-coded table).

use crate::model::anthropic::ModelInfo;

pub const CATALOG: &[ModelInfo] = &[
    ModelInfo {
        id: "claude-opus-4-1",
        r#type: "model",
        display_name: "Claude Opus 4.1",
    },
    ModelInfo {
        id: "claude-sonnet-4-5",
        r#type: "model",
        display_name: "Claude Sonnet 4.5",
    },
    ModelInfo {
        id: "claude-haiku-4-5",
        r#type: "model",
        display_name: "Claude Haiku 4.5",
    },
];

pub fn find(id: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|m| m.id == id)
}

pub fn is_known(id: &str) -> bool {
    find(id).is_some()
}
