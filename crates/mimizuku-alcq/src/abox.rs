//! ABox ストア (表明集合と補助索引)

use mimizuku_core::{nnf, Assertion, Concept, Individual, Role};
use std::collections::{HashMap, HashSet};

/// Creation record of an anonymous individual: the parent it was generated
/// under and the concept whose rule fired. The parent chain is the ancestry
/// walked by subset blocking.
#[derive(Debug, Clone)]
pub struct Generator {
    pub parent: Individual,
    pub cause: Concept,
}

/// Set of assertions plus the indexes the completion rules work against.
///
/// Concepts are stored in negation normal form; `assert` normalizes on entry.
/// Additions are monotonic within a branch. The search driver abandons a
/// branch by dropping its clone and continuing from the pre-branch value.
#[derive(Debug, Clone, Default)]
pub struct Abox {
    /// Concept labels per individual
    labels: HashMap<Individual, HashSet<Concept>>,
    /// Role successor index
    successors: HashMap<(Individual, Role), HashSet<Individual>>,
    /// Inequality set, closed under symmetry
    distinct: HashSet<(Individual, Individual)>,
    /// Generator provenance for anonymous individuals
    generators: HashMap<Individual, Generator>,
    next_anon: u64,
    /// Treat distinct named individuals as pairwise different
    pub(crate) unique_names: bool,
}

impl Abox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one assertion, normalizing any concept to NNF first
    pub fn assert(&mut self, assertion: Assertion) {
        match assertion {
            Assertion::ConceptAssertion(concept, individual) => {
                self.add_label(&individual, nnf(&concept));
            }
            Assertion::RoleAssertion(role, from, to) => {
                self.add_edge(&from, role, &to);
            }
            Assertion::DifferentFrom(a, b) => {
                self.set_distinct(&a, &b);
            }
        }
    }

    pub fn extend(&mut self, assertions: impl IntoIterator<Item = Assertion>) {
        for assertion in assertions {
            self.assert(assertion);
        }
    }

    fn touch(&mut self, individual: &Individual) {
        self.labels.entry(individual.clone()).or_default();
    }

    /// Add an NNF concept to an individual's label set
    pub(crate) fn add_label(&mut self, individual: &Individual, concept: Concept) -> bool {
        self.labels
            .entry(individual.clone())
            .or_default()
            .insert(concept)
    }

    pub fn has_label(&self, individual: &Individual, concept: &Concept) -> bool {
        self.labels
            .get(individual)
            .map(|set| set.contains(concept))
            .unwrap_or(false)
    }

    pub fn labels_of(&self, individual: &Individual) -> impl Iterator<Item = &Concept> {
        self.labels.get(individual).into_iter().flatten()
    }

    pub(crate) fn label_is_subset(&self, sub: &Individual, sup: &Individual) -> bool {
        match (self.labels.get(sub), self.labels.get(sup)) {
            (None, _) => true,
            (Some(set), None) => set.is_empty(),
            (Some(set), Some(other)) => set.is_subset(other),
        }
    }

    pub(crate) fn add_edge(&mut self, from: &Individual, role: Role, to: &Individual) -> bool {
        self.touch(from);
        self.touch(to);
        self.successors
            .entry((from.clone(), role))
            .or_default()
            .insert(to.clone())
    }

    pub fn successors_of(&self, individual: &Individual, role: &Role) -> HashSet<Individual> {
        self.successors
            .get(&(individual.clone(), role.clone()))
            .cloned()
            .unwrap_or_default()
    }

    /// Record a ≠ b in both orders
    pub(crate) fn set_distinct(&mut self, a: &Individual, b: &Individual) {
        self.touch(a);
        self.touch(b);
        self.distinct.insert((a.clone(), b.clone()));
        self.distinct.insert((b.clone(), a.clone()));
    }

    pub fn are_distinct(&self, a: &Individual, b: &Individual) -> bool {
        if self.unique_names && a.is_named() && b.is_named() && a != b {
            return true;
        }
        self.distinct.contains(&(a.clone(), b.clone()))
    }

    /// Create an anonymous individual with its generation record
    pub(crate) fn fresh_anon(&mut self, parent: &Individual, cause: &Concept) -> Individual {
        let individual = Individual::Anon(self.next_anon);
        self.next_anon += 1;
        self.generators.insert(
            individual.clone(),
            Generator {
                parent: parent.clone(),
                cause: cause.clone(),
            },
        );
        self.touch(&individual);
        individual
    }

    pub fn generator_of(&self, individual: &Individual) -> Option<&Generator> {
        self.generators.get(individual)
    }

    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.labels.keys()
    }

    pub fn contains_individual(&self, individual: &Individual) -> bool {
        self.labels.contains_key(individual)
    }

    pub fn named_individuals(&self) -> Vec<Individual> {
        self.individuals()
            .filter(|i| i.is_named())
            .cloned()
            .collect()
    }

    /// Successors of `individual` via `role` whose label satisfies the
    /// qualifier. `⊤` qualifies every successor.
    pub fn matching_successors(
        &self,
        individual: &Individual,
        role: &Role,
        qualifier: &Concept,
    ) -> Vec<Individual> {
        let successors = self.successors_of(individual, role);
        if *qualifier == Concept::Top {
            return successors.into_iter().collect();
        }
        successors
            .into_iter()
            .filter(|s| self.has_label(s, qualifier))
            .collect()
    }

    /// A largest subset of `candidates` whose members are pairwise distinct
    /// under the running inequality set. Exact search; candidate sets are
    /// successor sets and stay small.
    pub fn max_distinct_subset(&self, candidates: &[Individual]) -> Vec<Individual> {
        let mut best = Vec::new();
        let mut current = Vec::new();
        self.grow_distinct(candidates, 0, &mut current, &mut best);
        best
    }

    fn grow_distinct(
        &self,
        candidates: &[Individual],
        index: usize,
        current: &mut Vec<Individual>,
        best: &mut Vec<Individual>,
    ) {
        if current.len() + (candidates.len() - index) <= best.len() {
            return;
        }
        if index == candidates.len() {
            if current.len() > best.len() {
                *best = current.clone();
            }
            return;
        }
        let candidate = &candidates[index];
        if current.iter().all(|c| self.are_distinct(c, candidate)) {
            current.push(candidate.clone());
            self.grow_distinct(candidates, index + 1, current, best);
            current.pop();
        }
        self.grow_distinct(candidates, index + 1, current, best);
    }

    /// Direct contradiction: ⊥(a), an atomic complement pair, x ≠ x, or an
    /// at-most restriction with too many pairwise-distinguished successors.
    pub fn has_clash(&self) -> bool {
        if self.distinct.iter().any(|(a, b)| a == b) {
            return true;
        }
        for (individual, set) in &self.labels {
            if set.contains(&Concept::Bottom) {
                return true;
            }
            for concept in set {
                match concept {
                    Concept::Not(inner) => {
                        if matches!(**inner, Concept::Atomic(_)) && set.contains(inner.as_ref()) {
                            return true;
                        }
                    }
                    Concept::AtMost(n, role, qualifier) => {
                        let matching = self.matching_successors(individual, role, qualifier);
                        if matching.len() > *n as usize
                            && self.max_distinct_subset(&matching).len() > *n as usize
                        {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
        }
        false
    }

    /// Merge `victim` into `target`: every assertion mentioning the victim is
    /// rewritten onto the target and the victim disappears. If the two were
    /// asserted distinct the rewrite leaves a reflexive inequality behind,
    /// which `has_clash` reports.
    pub fn merge(&mut self, victim: &Individual, target: &Individual) {
        if victim == target {
            return;
        }
        if let Some(set) = self.labels.remove(victim) {
            self.labels.entry(target.clone()).or_default().extend(set);
        }
        self.touch(target);

        let old_successors = std::mem::take(&mut self.successors);
        for ((from, role), members) in old_successors {
            let from = if &from == victim { target.clone() } else { from };
            let entry = self.successors.entry((from, role)).or_default();
            for member in members {
                entry.insert(if &member == victim {
                    target.clone()
                } else {
                    member
                });
            }
        }

        let old_distinct = std::mem::take(&mut self.distinct);
        for (a, b) in old_distinct {
            let a = if &a == victim { target.clone() } else { a };
            let b = if &b == victim { target.clone() } else { b };
            self.distinct.insert((a, b));
        }

        let old_generators = std::mem::take(&mut self.generators);
        for (individual, generator) in old_generators {
            if &individual == victim {
                continue;
            }
            let parent = if &generator.parent == victim {
                target.clone()
            } else {
                generator.parent
            };
            self.generators.insert(
                individual,
                Generator {
                    parent,
                    cause: generator.cause,
                },
            );
        }
    }

    /// Materialize the assertion set. Inequalities are emitted once per
    /// unordered pair.
    pub fn assertions(&self) -> Vec<Assertion> {
        let mut out = Vec::new();
        for (individual, set) in &self.labels {
            for concept in set {
                out.push(Assertion::ConceptAssertion(
                    concept.clone(),
                    individual.clone(),
                ));
            }
        }
        for ((from, role), members) in &self.successors {
            for to in members {
                out.push(Assertion::RoleAssertion(
                    role.clone(),
                    from.clone(),
                    to.clone(),
                ));
            }
        }
        for (a, b) in &self.distinct {
            if a <= b {
                out.push(Assertion::DifferentFrom(a.clone(), b.clone()));
            }
        }
        out
    }

    pub fn contains(&self, assertion: &Assertion) -> bool {
        match assertion {
            Assertion::ConceptAssertion(concept, individual) => {
                self.has_label(individual, &nnf(concept))
            }
            Assertion::RoleAssertion(role, from, to) => {
                self.successors_of(from, role).contains(to)
            }
            Assertion::DifferentFrom(a, b) => self.distinct.contains(&(a.clone(), b.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mary() -> Individual {
        Individual::named("mary")
    }

    fn tom() -> Individual {
        Individual::named("tom")
    }

    #[test]
    fn test_assert_normalizes_to_nnf() {
        let mut abox = Abox::new();
        let double_neg = Concept::not(Concept::not(Concept::atomic("Person")));
        abox.assert(Assertion::ConceptAssertion(double_neg, mary()));

        assert!(abox.has_label(&mary(), &Concept::atomic("Person")));
    }

    #[test]
    fn test_distinct_is_symmetric() {
        let mut abox = Abox::new();
        abox.assert(Assertion::DifferentFrom(mary(), tom()));

        assert!(abox.are_distinct(&mary(), &tom()));
        assert!(abox.are_distinct(&tom(), &mary()));
        assert!(!abox.has_clash());
    }

    #[test]
    fn test_reflexive_inequality_is_a_clash() {
        let mut abox = Abox::new();
        abox.assert(Assertion::DifferentFrom(mary(), mary()));
        assert!(abox.has_clash());
    }

    #[test]
    fn test_successor_index() {
        let mut abox = Abox::new();
        let has_child = Role::new("hasChild");
        abox.assert(Assertion::RoleAssertion(has_child.clone(), mary(), tom()));

        let successors = abox.successors_of(&mary(), &has_child);
        assert_eq!(successors.len(), 1);
        assert!(successors.contains(&tom()));
        assert!(abox.successors_of(&tom(), &has_child).is_empty());
    }

    #[test]
    fn test_atomic_clash() {
        let mut abox = Abox::new();
        abox.assert(Assertion::ConceptAssertion(Concept::atomic("A"), mary()));
        assert!(!abox.has_clash());

        abox.assert(Assertion::ConceptAssertion(
            Concept::not(Concept::atomic("A")),
            mary(),
        ));
        assert!(abox.has_clash());
    }

    #[test]
    fn test_bottom_clash() {
        let mut abox = Abox::new();
        abox.assert(Assertion::ConceptAssertion(Concept::Bottom, mary()));
        assert!(abox.has_clash());
    }

    #[test]
    fn test_at_most_clash_needs_distinguished_successors() {
        let mut abox = Abox::new();
        let r = Role::new("hasChild");
        let ann = Individual::named("ann");
        let eva = Individual::named("eva");

        abox.assert(Assertion::RoleAssertion(r.clone(), mary(), ann.clone()));
        abox.assert(Assertion::RoleAssertion(r.clone(), mary(), eva.clone()));
        abox.assert(Assertion::ConceptAssertion(
            Concept::at_most(1, r, Concept::Top),
            mary(),
        ));

        // two successors, but not asserted distinct: still mergeable
        assert!(!abox.has_clash());

        abox.assert(Assertion::DifferentFrom(ann, eva));
        assert!(abox.has_clash());
    }

    #[test]
    fn test_max_distinct_subset() {
        let mut abox = Abox::new();
        let a = Individual::named("a");
        let b = Individual::named("b");
        let c = Individual::named("c");
        abox.assert(Assertion::DifferentFrom(a.clone(), b.clone()));
        abox.assert(Assertion::DifferentFrom(b.clone(), c.clone()));

        // a and c are not distinguished, so the best subset has two members
        let candidates = vec![a, b, c];
        assert_eq!(abox.max_distinct_subset(&candidates).len(), 2);
    }

    #[test]
    fn test_unique_names_distinguish_named_pairs() {
        let mut abox = Abox::new();
        abox.unique_names = true;
        abox.assert(Assertion::ConceptAssertion(Concept::atomic("A"), mary()));
        abox.assert(Assertion::ConceptAssertion(Concept::atomic("A"), tom()));

        assert!(abox.are_distinct(&mary(), &tom()));
        assert!(!abox.are_distinct(&mary(), &mary()));

        let anon = Individual::Anon(0);
        assert!(!abox.are_distinct(&mary(), &anon));
    }

    #[test]
    fn test_merge_rewrites_assertions() {
        let mut abox = Abox::new();
        let r = Role::new("r");
        let a = Individual::named("a");
        let b = Individual::named("b");
        let c = Individual::named("c");

        abox.assert(Assertion::ConceptAssertion(Concept::atomic("A"), b.clone()));
        abox.assert(Assertion::RoleAssertion(r.clone(), a.clone(), b.clone()));
        abox.assert(Assertion::RoleAssertion(r.clone(), b.clone(), c.clone()));

        abox.merge(&b, &a);

        assert!(!abox.contains_individual(&b));
        assert!(abox.has_label(&a, &Concept::atomic("A")));
        // the a → b edge collapsed onto a itself
        assert!(abox.successors_of(&a, &r).contains(&a));
        assert!(abox.successors_of(&a, &r).contains(&c));
    }

    #[test]
    fn test_merge_of_distinct_pair_clashes() {
        let mut abox = Abox::new();
        let a = Individual::named("a");
        let b = Individual::named("b");
        abox.assert(Assertion::DifferentFrom(a.clone(), b.clone()));

        abox.merge(&b, &a);
        assert!(abox.has_clash());
    }

    #[test]
    fn test_assertions_roundtrip() {
        let mut abox = Abox::new();
        let r = Role::new("r");
        abox.assert(Assertion::ConceptAssertion(Concept::atomic("A"), mary()));
        abox.assert(Assertion::RoleAssertion(r, mary(), tom()));
        abox.assert(Assertion::DifferentFrom(mary(), tom()));

        let assertions = abox.assertions();
        assert_eq!(assertions.len(), 3);
        for assertion in &assertions {
            assert!(abox.contains(assertion));
        }
    }
}
