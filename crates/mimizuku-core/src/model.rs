//! ALCQ データモデル

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Role (uninterpreted binary relation name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Role(pub Symbol);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Symbol::new(name))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Individual, either user-supplied or generated by the ∃ / ≥ rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Individual {
    /// Named individual
    Named(Symbol),
    /// Anonymous individual with a stable generation id
    Anon(u64),
}

impl Individual {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(Symbol::new(name))
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    pub fn is_anon(&self) -> bool {
        matches!(self, Self::Anon(_))
    }
}

impl std::fmt::Display for Individual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Anon(id) => write!(f, "_:g{}", id),
        }
    }
}

/// ALCQ concept expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Concept {
    /// ⊤
    Top,

    /// ⊥
    Bottom,

    /// Named concept
    Atomic(Symbol),

    /// ¬C
    Not(Box<Concept>),

    /// C ⊓ D
    And(Box<Concept>, Box<Concept>),

    /// C ⊔ D
    Or(Box<Concept>, Box<Concept>),

    /// C ⇒ D, sugar for ¬C ⊔ D, eliminated during normalization
    Implies(Box<Concept>, Box<Concept>),

    /// ∃R.C
    Exists(Role, Box<Concept>),

    /// ∀R.C
    ForAll(Role, Box<Concept>),

    /// ≥n R.C
    AtLeast(u32, Role, Box<Concept>),

    /// ≤n R.C
    AtMost(u32, Role, Box<Concept>),
}

impl Concept {
    pub fn atomic(name: impl Into<String>) -> Self {
        Self::Atomic(Symbol::new(name))
    }

    pub fn not(concept: Concept) -> Self {
        Self::Not(Box::new(concept))
    }

    pub fn and(left: Concept, right: Concept) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Concept, right: Concept) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(premise: Concept, conclusion: Concept) -> Self {
        Self::Implies(Box::new(premise), Box::new(conclusion))
    }

    pub fn exists(role: Role, concept: Concept) -> Self {
        Self::Exists(role, Box::new(concept))
    }

    pub fn for_all(role: Role, concept: Concept) -> Self {
        Self::ForAll(role, Box::new(concept))
    }

    pub fn at_least(n: u32, role: Role, concept: Concept) -> Self {
        Self::AtLeast(n, role, Box::new(concept))
    }

    pub fn at_most(n: u32, role: Role, concept: Concept) -> Self {
        Self::AtMost(n, role, Box::new(concept))
    }
}

/// ABox assertion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assertion {
    /// C(a)
    ConceptAssertion(Concept, Individual),

    /// R(a, b)
    RoleAssertion(Role, Individual, Individual),

    /// a ≠ b (symmetric)
    DifferentFrom(Individual, Individual),
}

/// TBox: mapping from atomic concept names to definition concepts.
///
/// Definitions may be cyclic; the tableau engine unfolds them lazily.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tbox {
    definitions: HashMap<Symbol, Concept>,
}

impl Tbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) an atomic concept
    pub fn define(&mut self, name: impl Into<String>, concept: Concept) {
        self.definitions.insert(Symbol::new(name), concept);
    }

    pub fn definition_of(&self, name: &Symbol) -> Option<&Concept> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&Symbol, &Concept)> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_display() {
        let s = Symbol::new("Person");
        assert_eq!(s.as_str(), "Person");
        assert_eq!(format!("{}", s), "Person");
    }

    #[test]
    fn test_concept_equality() {
        let c1 = Concept::and(Concept::atomic("Person"), Concept::atomic("Female"));
        let c2 = Concept::and(Concept::atomic("Person"), Concept::atomic("Female"));
        let c3 = Concept::and(Concept::atomic("Female"), Concept::atomic("Person"));

        assert_eq!(c1, c2);
        assert_ne!(c1, c3);
    }

    #[test]
    fn test_individual_display() {
        assert_eq!(format!("{}", Individual::named("mary")), "mary");
        assert_eq!(format!("{}", Individual::Anon(3)), "_:g3");
        assert!(Individual::named("mary").is_named());
        assert!(Individual::Anon(3).is_anon());
    }

    #[test]
    fn test_tbox_definitions() {
        let mut tbox = Tbox::new();
        assert!(tbox.is_empty());

        tbox.define(
            "Woman",
            Concept::and(Concept::atomic("Person"), Concept::atomic("Female")),
        );

        assert_eq!(tbox.len(), 1);
        assert!(tbox.definition_of(&Symbol::new("Woman")).is_some());
        assert!(tbox.definition_of(&Symbol::new("Man")).is_none());
    }
}
