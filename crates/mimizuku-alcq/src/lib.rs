//! ALCQ タブロー推論エンジン
//!
//! このクレートは ALCQ の決定手続きを提供します:
//! - タブロー展開規則 (⊓, ⊔, ∃, ∀, ≥n, ≤n) と遅延 TBox 展開
//! - 整合性検証 (モデル証拠付き) と包摂判定
//! - サブセットブロッキングによる停止性保証
//! - タグ付き式ローダー

pub mod abox;
pub mod loader;
pub mod reasoner;
pub mod tableau;

pub use abox::Abox;
pub use reasoner::{AlcqReasoner, Premise, ReasonerOptions};
pub use tableau::{TableauEngine, TableauStats};

// Re-export core types for downstream convenience
pub use mimizuku_core::{complement, nnf, Assertion, Concept, Individual, Role, Symbol, Tbox};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlcqError {
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Negative cardinality: {0}")]
    NegativeCardinality(String),

    #[error("Premise marker outside premise root: {0}")]
    MisplacedPremise(String),

    #[error("Expansion depth limit exceeded: {0}")]
    DepthLimit(usize),
}
