//! 否定標準形 (NNF) への正規化

use crate::model::Concept;

/// Rewrite a concept into negation normal form.
///
/// Negation is pushed down to atomic concepts, implication is eliminated,
/// and negated number restrictions are flipped:
/// `¬(≥n R.C)` becomes `≤n−1 R.C` (or `⊥` when n = 0) and
/// `¬(≤n R.C)` becomes `≥n+1 R.C`.
pub fn nnf(concept: &Concept) -> Concept {
    match concept {
        Concept::Top | Concept::Bottom | Concept::Atomic(_) => concept.clone(),

        Concept::And(left, right) => Concept::and(nnf(left), nnf(right)),

        Concept::Or(left, right) => Concept::or(nnf(left), nnf(right)),

        Concept::Implies(premise, conclusion) => {
            Concept::or(nnf(&Concept::not((**premise).clone())), nnf(conclusion))
        }

        Concept::Exists(role, inner) => Concept::exists(role.clone(), nnf(inner)),

        Concept::ForAll(role, inner) => Concept::for_all(role.clone(), nnf(inner)),

        Concept::AtLeast(n, role, inner) => Concept::at_least(*n, role.clone(), nnf(inner)),

        Concept::AtMost(n, role, inner) => Concept::at_most(*n, role.clone(), nnf(inner)),

        Concept::Not(inner) => match inner.as_ref() {
            Concept::Top => Concept::Bottom,
            Concept::Bottom => Concept::Top,
            Concept::Atomic(_) => concept.clone(),
            Concept::Not(inner2) => nnf(inner2),
            Concept::And(left, right) => Concept::or(
                nnf(&Concept::not((**left).clone())),
                nnf(&Concept::not((**right).clone())),
            ),
            Concept::Or(left, right) => Concept::and(
                nnf(&Concept::not((**left).clone())),
                nnf(&Concept::not((**right).clone())),
            ),
            Concept::Implies(premise, conclusion) => Concept::and(
                nnf(premise),
                nnf(&Concept::not((**conclusion).clone())),
            ),
            Concept::Exists(role, inner2) => {
                Concept::for_all(role.clone(), nnf(&Concept::not((**inner2).clone())))
            }
            Concept::ForAll(role, inner2) => {
                Concept::exists(role.clone(), nnf(&Concept::not((**inner2).clone())))
            }
            Concept::AtLeast(n, role, inner2) => {
                if *n == 0 {
                    Concept::Bottom
                } else {
                    Concept::at_most(n - 1, role.clone(), nnf(inner2))
                }
            }
            Concept::AtMost(n, role, inner2) => {
                Concept::at_least(n + 1, role.clone(), nnf(inner2))
            }
        },
    }
}

/// NNF of the negation of a concept
pub fn complement(concept: &Concept) -> Concept {
    nnf(&Concept::not(concept.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn atom(name: &str) -> Concept {
        Concept::atomic(name)
    }

    #[test]
    fn test_double_negation() {
        let c = atom("Person");
        let nn = Concept::not(Concept::not(c.clone()));
        assert_eq!(nnf(&nn), c);
    }

    #[test]
    fn test_top_bottom_negation() {
        assert_eq!(nnf(&Concept::not(Concept::Top)), Concept::Bottom);
        assert_eq!(nnf(&Concept::not(Concept::Bottom)), Concept::Top);
    }

    #[test]
    fn test_de_morgan() {
        let conj = Concept::and(atom("A"), atom("B"));
        let expected = Concept::or(Concept::not(atom("A")), Concept::not(atom("B")));
        assert_eq!(nnf(&Concept::not(conj)), expected);

        let disj = Concept::or(atom("A"), atom("B"));
        let expected = Concept::and(Concept::not(atom("A")), Concept::not(atom("B")));
        assert_eq!(nnf(&Concept::not(disj)), expected);
    }

    #[test]
    fn test_quantifier_duality() {
        let r = Role::new("r");
        let some = Concept::exists(r.clone(), atom("A"));
        let expected = Concept::for_all(r.clone(), Concept::not(atom("A")));
        assert_eq!(nnf(&Concept::not(some)), expected);

        let all = Concept::for_all(r.clone(), atom("A"));
        let expected = Concept::exists(r, Concept::not(atom("A")));
        assert_eq!(nnf(&Concept::not(all)), expected);
    }

    #[test]
    fn test_number_restriction_negation() {
        let r = Role::new("r");

        let at_least = Concept::at_least(3, r.clone(), atom("A"));
        let expected = Concept::at_most(2, r.clone(), atom("A"));
        assert_eq!(nnf(&Concept::not(at_least)), expected);

        let at_least_zero = Concept::at_least(0, r.clone(), atom("A"));
        assert_eq!(nnf(&Concept::not(at_least_zero)), Concept::Bottom);

        let at_most = Concept::at_most(2, r.clone(), atom("A"));
        let expected = Concept::at_least(3, r, atom("A"));
        assert_eq!(nnf(&Concept::not(at_most)), expected);
    }

    #[test]
    fn test_implication_elimination() {
        let imp = Concept::implies(atom("A"), atom("B"));
        let expected = Concept::or(Concept::not(atom("A")), atom("B"));
        assert_eq!(nnf(&imp), expected);

        let neg_imp = Concept::not(Concept::implies(atom("A"), atom("B")));
        let expected = Concept::and(atom("A"), Concept::not(atom("B")));
        assert_eq!(nnf(&neg_imp), expected);
    }

    #[test]
    fn test_negation_pushed_through_nesting() {
        let r = Role::new("r");
        let nested = Concept::not(Concept::exists(
            r.clone(),
            Concept::and(atom("A"), atom("B")),
        ));
        let expected = Concept::for_all(
            r,
            Concept::or(Concept::not(atom("A")), Concept::not(atom("B"))),
        );
        assert_eq!(nnf(&nested), expected);
    }

    #[test]
    fn test_nnf_idempotent() {
        let r = Role::new("r");
        let concepts = vec![
            Concept::not(Concept::and(atom("A"), Concept::or(atom("B"), atom("C")))),
            Concept::implies(atom("A"), Concept::exists(r.clone(), atom("B"))),
            Concept::not(Concept::at_most(1, r.clone(), Concept::not(atom("A")))),
            Concept::not(Concept::for_all(r, Concept::at_least(2, Role::new("s"), atom("B")))),
        ];

        for concept in concepts {
            let once = nnf(&concept);
            assert_eq!(nnf(&once), once);
        }
    }

    #[test]
    fn test_complement() {
        assert_eq!(complement(&atom("A")), Concept::not(atom("A")));
        assert_eq!(complement(&Concept::not(atom("A"))), atom("A"));
    }
}
