//! タブロー展開エンジン

use crate::abox::Abox;
use crate::AlcqError;
use mimizuku_core::{complement, nnf, Concept, Individual, Symbol, Tbox};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Counters collected over one saturation run
#[derive(Debug, Clone, Default)]
pub struct TableauStats {
    pub expansions: usize,
    pub clashes: usize,
    pub branches: usize,
    pub models: usize,
}

/// One nondeterministic choice point
enum BranchPoint {
    /// ⊔: try each disjunct on the individual in turn
    Disjunction(Individual, Vec<Concept>),
    /// ≤: try merging each candidate (victim, target) successor pair
    Merge(Vec<(Individual, Individual)>),
}

/// Saturates an ABox under the ALCQ completion rules.
///
/// Rules run at fixed priorities: deterministic (⊓, ∀, lazy unfolding), then
/// generative (∃, ≥), then branching (⊔, ≤). A branch is entered on a clone
/// of the ABox and abandoned wholesale on clash. Subset blocking along the
/// generator chain keeps successor chains finite on cyclic TBoxes.
pub struct TableauEngine {
    tbox: Tbox,
    max_depth: usize,
    collect_models: bool,
    decide_atomics: Vec<Symbol>,
    models: Vec<Abox>,
    pub stats: TableauStats,
}

impl TableauEngine {
    pub fn new(tbox: Tbox) -> Self {
        Self {
            tbox,
            max_depth: 10_000,
            collect_models: false,
            decide_atomics: Vec::new(),
            models: Vec::new(),
            stats: TableauStats::default(),
        }
    }

    /// Set the branching-depth ceiling
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Keep every clash-free saturated ABox instead of stopping at the first
    pub fn with_model_collection(mut self, enabled: bool) -> Self {
        self.collect_models = enabled;
        self
    }

    /// Force a decision on each listed atomic concept for every individual,
    /// by injecting `A ⊔ ¬A` into every label set
    pub fn with_atomic_decisions(mut self, names: Vec<Symbol>) -> Self {
        self.decide_atomics = names;
        self
    }

    /// Run the search. Returns the clash-free saturated ABoxes found: at most
    /// one without model collection, all of them with it, empty when the
    /// input is inconsistent.
    pub fn run(&mut self, abox: Abox) -> Result<Vec<Abox>, AlcqError> {
        self.models.clear();
        let found = self.expand(abox, 0)?;
        debug!(
            found,
            models = self.models.len(),
            branches = self.stats.branches,
            clashes = self.stats.clashes,
            "tableau search finished"
        );
        Ok(std::mem::take(&mut self.models))
    }

    fn expand(&mut self, mut abox: Abox, depth: usize) -> Result<bool, AlcqError> {
        if depth > self.max_depth {
            return Err(AlcqError::DepthLimit(self.max_depth));
        }

        loop {
            if abox.has_clash() {
                self.stats.clashes += 1;
                trace!(depth, "branch closed by clash");
                return Ok(false);
            }
            if self.apply_deterministic(&mut abox) {
                continue;
            }
            if self.apply_generative(&mut abox) {
                continue;
            }
            break;
        }

        match self.find_branch_point(&abox) {
            None => {
                self.stats.models += 1;
                debug!(depth, "clash-free saturated abox");
                self.models.push(abox);
                Ok(true)
            }
            Some(BranchPoint::Disjunction(individual, disjuncts)) => {
                let mut found = false;
                for disjunct in disjuncts {
                    self.stats.branches += 1;
                    let mut branch = abox.clone();
                    branch.add_label(&individual, disjunct);
                    if self.expand(branch, depth + 1)? {
                        found = true;
                        if !self.collect_models {
                            return Ok(true);
                        }
                    }
                }
                Ok(found)
            }
            Some(BranchPoint::Merge(pairs)) => {
                let mut found = false;
                for (victim, target) in pairs {
                    self.stats.branches += 1;
                    trace!(%victim, %target, depth, "merging successors");
                    let mut branch = abox.clone();
                    branch.merge(&victim, &target);
                    if self.expand(branch, depth + 1)? {
                        found = true;
                        if !self.collect_models {
                            return Ok(true);
                        }
                    }
                }
                Ok(found)
            }
        }
    }

    /// ⊓, ∀ and lazy TBox unfolding; one pass over the current labels.
    /// Returns whether anything was added.
    fn apply_deterministic(&mut self, abox: &mut Abox) -> bool {
        let mut changed = false;

        if !self.decide_atomics.is_empty() {
            let individuals: Vec<Individual> = abox.individuals().cloned().collect();
            for individual in &individuals {
                for name in &self.decide_atomics {
                    let atom = Concept::Atomic(name.clone());
                    let tautology = Concept::or(atom.clone(), Concept::not(atom));
                    changed |= abox.add_label(individual, tautology);
                }
            }
        }

        let individuals: Vec<Individual> = abox.individuals().cloned().collect();
        for individual in individuals {
            let concepts: Vec<Concept> = abox.labels_of(&individual).cloned().collect();
            for concept in concepts {
                match &concept {
                    Concept::And(left, right) => {
                        changed |= abox.add_label(&individual, (**left).clone());
                        changed |= abox.add_label(&individual, (**right).clone());
                    }
                    Concept::ForAll(role, inner) => {
                        for successor in abox.successors_of(&individual, role) {
                            changed |= abox.add_label(&successor, (**inner).clone());
                        }
                    }
                    Concept::Atomic(name) => {
                        if let Some(definition) = self.tbox.definition_of(name) {
                            if !self.is_blocked(abox, &individual) {
                                changed |= abox.add_label(&individual, nnf(definition));
                            }
                        }
                    }
                    Concept::Not(inner) => {
                        if let Concept::Atomic(name) = &**inner {
                            if let Some(definition) = self.tbox.definition_of(name) {
                                if !self.is_blocked(abox, &individual) {
                                    changed |= abox.add_label(&individual, complement(definition));
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        if changed {
            self.stats.expansions += 1;
        }
        changed
    }

    /// ∃ and ≥ on unblocked individuals. Fires at most one rule per call so
    /// that blocking is reevaluated between firings.
    fn apply_generative(&mut self, abox: &mut Abox) -> bool {
        let individuals: Vec<Individual> = abox.individuals().cloned().collect();
        for individual in individuals {
            if self.is_blocked(abox, &individual) {
                continue;
            }
            let concepts: Vec<Concept> = abox.labels_of(&individual).cloned().collect();
            for concept in concepts {
                match &concept {
                    Concept::Exists(role, inner) => {
                        if abox.matching_successors(&individual, role, inner).is_empty() {
                            let fresh = abox.fresh_anon(&individual, &concept);
                            abox.add_edge(&individual, role.clone(), &fresh);
                            if **inner != Concept::Top {
                                abox.add_label(&fresh, (**inner).clone());
                            }
                            self.stats.expansions += 1;
                            trace!(parent = %individual, successor = %fresh, "existential successor created");
                            return true;
                        }
                    }
                    Concept::AtLeast(n, role, inner) => {
                        let matching = abox.matching_successors(&individual, role, inner);
                        let distinguished = abox.max_distinct_subset(&matching);
                        if (distinguished.len() as u32) < *n {
                            let missing = *n as usize - distinguished.len();
                            let mut created: Vec<Individual> = Vec::with_capacity(missing);
                            for _ in 0..missing {
                                let fresh = abox.fresh_anon(&individual, &concept);
                                abox.add_edge(&individual, role.clone(), &fresh);
                                if **inner != Concept::Top {
                                    abox.add_label(&fresh, (**inner).clone());
                                }
                                for other in distinguished.iter().chain(created.iter()) {
                                    abox.set_distinct(&fresh, other);
                                }
                                created.push(fresh);
                            }
                            self.stats.expansions += 1;
                            trace!(parent = %individual, count = missing, "at-least successors created");
                            return true;
                        }
                    }
                    _ => {}
                }
            }
        }
        false
    }

    fn find_branch_point(&self, abox: &Abox) -> Option<BranchPoint> {
        for individual in abox.individuals() {
            for concept in abox.labels_of(individual) {
                if let Concept::Or(left, right) = concept {
                    if !abox.has_label(individual, left) && !abox.has_label(individual, right) {
                        return Some(BranchPoint::Disjunction(
                            individual.clone(),
                            vec![(**left).clone(), (**right).clone()],
                        ));
                    }
                }
            }
        }

        for individual in abox.individuals() {
            for concept in abox.labels_of(individual) {
                if let Concept::AtMost(n, role, qualifier) = concept {
                    let matching = abox.matching_successors(individual, role, qualifier);
                    if matching.len() <= *n as usize {
                        continue;
                    }
                    let mut pairs = Vec::new();
                    for i in 0..matching.len() {
                        for j in (i + 1)..matching.len() {
                            let (a, b) = (&matching[i], &matching[j]);
                            if abox.are_distinct(a, b) {
                                continue;
                            }
                            // a named individual absorbs the merge
                            let (victim, target) = if a.is_named() && !b.is_named() {
                                (b.clone(), a.clone())
                            } else {
                                (a.clone(), b.clone())
                            };
                            pairs.push((victim, target));
                        }
                    }
                    if !pairs.is_empty() {
                        return Some(BranchPoint::Merge(pairs));
                    }
                }
            }
        }

        None
    }

    /// Subset blocking: an anonymous individual is blocked by any ancestor on
    /// its generator chain whose label set includes its own. Evaluated over
    /// the current labels at every firing attempt; named individuals are
    /// never blocked.
    fn is_blocked(&self, abox: &Abox, individual: &Individual) -> bool {
        if abox.generator_of(individual).is_none() {
            return false;
        }
        let mut seen: HashSet<Individual> = HashSet::new();
        let mut current = individual.clone();
        while let Some(generator) = abox.generator_of(&current) {
            let parent = generator.parent.clone();
            if !seen.insert(parent.clone()) {
                break;
            }
            if abox.label_is_subset(individual, &parent) {
                trace!(blocked = %individual, blocker = %parent, "generative rules blocked");
                return true;
            }
            current = parent;
        }
        false
    }
}
