//! ALCQ リーズナー (公開 API)

use crate::abox::Abox;
use crate::tableau::{TableauEngine, TableauStats};
use crate::AlcqError;
use mimizuku_core::{Assertion, Concept, Individual, Symbol, Tbox};
use std::collections::BTreeSet;

/// Premise accepted by `premise_subsumes`
#[derive(Debug, Clone, PartialEq)]
pub enum Premise {
    /// Does the first concept entail the second? Decided by refuting
    /// `C₁ ⊓ ¬C₂` on a fresh witness individual.
    Subsumes(Concept, Concept),
}

/// Reasoner execution options
#[derive(Debug, Clone)]
pub struct ReasonerOptions {
    /// Treat distinct named individuals as pairwise different
    pub unique_name_assumption: bool,
    /// Branching-depth ceiling for the tableau search
    pub max_depth: usize,
}

impl Default for ReasonerOptions {
    fn default() -> Self {
        Self {
            unique_name_assumption: false,
            max_depth: 10_000,
        }
    }
}

/// Decision procedure for ALCQ knowledge bases: ABox consistency and concept
/// subsumption under a TBox of lazily unfolded definitions.
pub struct AlcqReasoner {
    tbox: Tbox,
    options: ReasonerOptions,
    /// Statistics from the most recent call
    pub stats: TableauStats,
}

impl AlcqReasoner {
    pub fn new(tbox: Tbox) -> Self {
        Self::with_options(tbox, ReasonerOptions::default())
    }

    pub fn with_options(tbox: Tbox, options: ReasonerOptions) -> Self {
        Self {
            tbox,
            options,
            stats: TableauStats::default(),
        }
    }

    /// Enable or disable the unique-name assumption
    pub fn with_unique_names(mut self, enabled: bool) -> Self {
        self.options.unique_name_assumption = enabled;
        self
    }

    /// Check ABox consistency. Returns the decision and, on success, one
    /// clash-free saturated ABox extending the input as a model witness.
    pub fn abox_consistent(
        &mut self,
        abox: &Abox,
    ) -> Result<(bool, Option<Abox>), AlcqError> {
        let mut engine = self.engine(false, Vec::new());
        let mut models = engine.run(self.prepare(abox))?;
        self.stats = engine.stats.clone();
        Ok(match models.pop() {
            Some(model) => (true, Some(model)),
            None => (false, None),
        })
    }

    /// Consistency with every atomic concept decided on every individual:
    /// `A ⊔ ¬A` is injected throughout, so each returned model commits each
    /// individual to each atomic concept or its negation.
    pub fn abox_consistent_with_t(
        &mut self,
        abox: &Abox,
    ) -> Result<(bool, Vec<Abox>), AlcqError> {
        let atomics = self.atomic_universe(abox);
        let mut engine = self.engine(true, atomics);
        let models = engine.run(self.prepare(abox))?;
        self.stats = engine.stats.clone();
        Ok((!models.is_empty(), models))
    }

    /// Like `abox_consistent_with_t`, additionally asserting pairwise
    /// inequality on all named individuals (the unique-name assumption).
    pub fn abox_consistent_with_obj_and_t(
        &mut self,
        abox: &Abox,
    ) -> Result<(bool, Vec<Abox>), AlcqError> {
        let atomics = self.atomic_universe(abox);
        let mut working = self.prepare(abox);
        let named = working.named_individuals();
        for i in 0..named.len() {
            for j in (i + 1)..named.len() {
                working.assert(Assertion::DifferentFrom(
                    named[i].clone(),
                    named[j].clone(),
                ));
            }
        }
        let mut engine = self.engine(true, atomics);
        let models = engine.run(working)?;
        self.stats = engine.stats.clone();
        Ok((!models.is_empty(), models))
    }

    /// Decide a subsumption premise against the ABox: a fresh witness
    /// individual receives `C₁` and `¬C₂`, and the premise holds exactly when
    /// the extended ABox is inconsistent. Returns the clash-free saturated
    /// ABoxes explored (countermodels) alongside the decision.
    pub fn premise_subsumes(
        &mut self,
        abox: &Abox,
        premise: &Premise,
    ) -> Result<(Vec<Abox>, bool), AlcqError> {
        let Premise::Subsumes(subsumee, subsumer) = premise;
        let mut working = self.prepare(abox);
        let witness = fresh_witness(&working);
        working.assert(Assertion::ConceptAssertion(
            subsumee.clone(),
            witness.clone(),
        ));
        working.assert(Assertion::ConceptAssertion(
            Concept::not(subsumer.clone()),
            witness,
        ));

        let mut engine = self.engine(true, Vec::new());
        let models = engine.run(working)?;
        self.stats = engine.stats.clone();
        let subsumed = models.is_empty();
        Ok((models, subsumed))
    }

    /// Convenience wrapper: does `sub ⊑ sup` hold over an empty ABox?
    pub fn concept_subsumes(
        &mut self,
        sub: &Concept,
        sup: &Concept,
    ) -> Result<bool, AlcqError> {
        let premise = Premise::Subsumes(sub.clone(), sup.clone());
        let (_, holds) = self.premise_subsumes(&Abox::new(), &premise)?;
        Ok(holds)
    }

    /// Mutual subsumption
    pub fn concepts_equivalent(
        &mut self,
        left: &Concept,
        right: &Concept,
    ) -> Result<bool, AlcqError> {
        Ok(self.concept_subsumes(left, right)? && self.concept_subsumes(right, left)?)
    }

    fn engine(&self, collect_models: bool, decide_atomics: Vec<Symbol>) -> TableauEngine {
        TableauEngine::new(self.tbox.clone())
            .with_max_depth(self.options.max_depth)
            .with_model_collection(collect_models)
            .with_atomic_decisions(decide_atomics)
    }

    fn prepare(&self, abox: &Abox) -> Abox {
        let mut working = abox.clone();
        working.unique_names = self.options.unique_name_assumption;
        working
    }

    /// All atomic concept names reachable from the ABox labels and the TBox
    fn atomic_universe(&self, abox: &Abox) -> Vec<Symbol> {
        let mut names: BTreeSet<Symbol> = BTreeSet::new();
        for individual in abox.individuals() {
            for concept in abox.labels_of(individual) {
                collect_atomics(concept, &mut names);
            }
        }
        for (name, definition) in self.tbox.definitions() {
            names.insert(name.clone());
            collect_atomics(definition, &mut names);
        }
        names.into_iter().collect()
    }
}

fn collect_atomics(concept: &Concept, names: &mut BTreeSet<Symbol>) {
    match concept {
        Concept::Top | Concept::Bottom => {}
        Concept::Atomic(name) => {
            names.insert(name.clone());
        }
        Concept::Not(inner) => collect_atomics(inner, names),
        Concept::And(left, right)
        | Concept::Or(left, right)
        | Concept::Implies(left, right) => {
            collect_atomics(left, names);
            collect_atomics(right, names);
        }
        Concept::Exists(_, inner)
        | Concept::ForAll(_, inner)
        | Concept::AtLeast(_, _, inner)
        | Concept::AtMost(_, _, inner) => collect_atomics(inner, names),
    }
}

/// A named individual not mentioned anywhere in the ABox
fn fresh_witness(abox: &Abox) -> Individual {
    let mut counter = 0u64;
    loop {
        let name = if counter == 0 {
            "x".to_string()
        } else {
            format!("x{}", counter)
        };
        let candidate = Individual::named(name);
        if !abox.contains_individual(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
