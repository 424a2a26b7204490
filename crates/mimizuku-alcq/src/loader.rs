//! タグ付き式ローダー
//!
//! Parses the prefix-form knowledge base surface: assertions `[C, a]`,
//! `[R, a, b]` and `[[":!=", x, y]]`, concept expressions built from the
//! tags `:and`, `:or`, `:not`, `:implies`, `:exists`, `:all`, `:>=`, `:<=`
//! with `[":rule", R, C]` pairs, TBoxes as JSON objects, and the premise
//! `[":subsumes", C1, C2]`.

use crate::abox::Abox;
use crate::reasoner::Premise;
use crate::AlcqError;
use mimizuku_core::{Assertion, Concept, Individual, Role, Tbox};
use serde_json::Value;

/// Parse an ABox from an array of tagged assertions
pub fn parse_abox(value: &Value) -> Result<Abox, AlcqError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed("an ABox must be an array of assertions", value))?;
    let assertions: Vec<Assertion> = items
        .iter()
        .map(parse_assertion)
        .collect::<Result<_, _>>()?;
    let mut abox = Abox::new();
    abox.extend(assertions);
    Ok(abox)
}

/// Parse a TBox from an object mapping atomic concept names to definitions
pub fn parse_tbox(value: &Value) -> Result<Tbox, AlcqError> {
    let entries = value
        .as_object()
        .ok_or_else(|| malformed("a TBox must be an object of definitions", value))?;
    let mut tbox = Tbox::new();
    for (name, definition) in entries {
        if name.starts_with(':') {
            return Err(AlcqError::UnknownTag(name.clone()));
        }
        tbox.define(name.clone(), parse_concept(definition)?);
    }
    Ok(tbox)
}

/// Parse a premise; only `[":subsumes", C1, C2]` is accepted at the root
pub fn parse_premise(value: &Value) -> Result<Premise, AlcqError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed("a premise must be a tagged array", value))?;
    match items.first().and_then(Value::as_str) {
        Some(":subsumes") if items.len() == 3 => Ok(Premise::Subsumes(
            parse_concept(&items[1])?,
            parse_concept(&items[2])?,
        )),
        Some(":subsumes") => Err(malformed(":subsumes takes two concepts", value)),
        _ => Err(malformed("a premise must be rooted at :subsumes", value)),
    }
}

fn parse_assertion(value: &Value) -> Result<Assertion, AlcqError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed("an assertion must be an array", value))?;
    match items.len() {
        1 => parse_inequality(&items[0]),
        2 => Ok(Assertion::ConceptAssertion(
            parse_concept(&items[0])?,
            parse_individual(&items[1])?,
        )),
        3 => Ok(Assertion::RoleAssertion(
            Role(parse_name(&items[0])?.into()),
            parse_individual(&items[1])?,
            parse_individual(&items[2])?,
        )),
        _ => Err(malformed("an assertion has one, two or three elements", value)),
    }
}

fn parse_inequality(value: &Value) -> Result<Assertion, AlcqError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed("an inequality must be [\":!=\", x, y]", value))?;
    match items.first().and_then(Value::as_str) {
        Some(":!=") if items.len() == 3 => Ok(Assertion::DifferentFrom(
            parse_individual(&items[1])?,
            parse_individual(&items[2])?,
        )),
        _ => Err(malformed("an inequality must be [\":!=\", x, y]", value)),
    }
}

fn parse_concept(value: &Value) -> Result<Concept, AlcqError> {
    match value {
        Value::String(s) => match s.as_str() {
            ":T" => Err(malformed(
                ":T is only meaningful inside a number restriction",
                value,
            )),
            s if s.starts_with(':') => Err(AlcqError::UnknownTag(s.to_string())),
            s => Ok(Concept::atomic(s)),
        },
        Value::Array(items) => {
            let tag = items
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| malformed("a compound concept starts with a tag", value))?;
            let operands = &items[1..];
            match tag {
                ":and" => fold_connective(operands, value, Concept::and),
                ":or" => fold_connective(operands, value, Concept::or),
                ":not" => match operands {
                    [inner] => Ok(Concept::not(parse_concept(inner)?)),
                    _ => Err(malformed(":not takes one concept", value)),
                },
                ":implies" => match operands {
                    [premise, conclusion] => Ok(Concept::implies(
                        parse_concept(premise)?,
                        parse_concept(conclusion)?,
                    )),
                    _ => Err(malformed(":implies takes two concepts", value)),
                },
                ":exists" => match operands {
                    [role, inner] => Ok(Concept::exists(
                        Role(parse_name(role)?.into()),
                        parse_concept(inner)?,
                    )),
                    _ => Err(malformed(":exists takes a role and a concept", value)),
                },
                ":all" => match operands {
                    [role, inner] => Ok(Concept::for_all(
                        Role(parse_name(role)?.into()),
                        parse_concept(inner)?,
                    )),
                    _ => Err(malformed(":all takes a role and a concept", value)),
                },
                ":>=" => {
                    let (n, role, inner) = parse_restriction(operands, value)?;
                    Ok(Concept::at_least(n, role, inner))
                }
                ":<=" => {
                    let (n, role, inner) = parse_restriction(operands, value)?;
                    Ok(Concept::at_most(n, role, inner))
                }
                ":subsumes" => Err(AlcqError::MisplacedPremise(value.to_string())),
                ":rule" => Err(malformed(
                    ":rule only appears inside a number restriction",
                    value,
                )),
                ":!=" => Err(malformed(
                    ":!= is an assertion, not a concept",
                    value,
                )),
                tag if tag.starts_with(':') => Err(AlcqError::UnknownTag(tag.to_string())),
                _ => Err(malformed("a compound concept starts with a tag", value)),
            }
        }
        _ => Err(malformed("a concept is a name or a tagged array", value)),
    }
}

fn fold_connective(
    operands: &[Value],
    whole: &Value,
    combine: fn(Concept, Concept) -> Concept,
) -> Result<Concept, AlcqError> {
    if operands.len() < 2 {
        return Err(malformed("n-ary connectives take at least two concepts", whole));
    }
    let mut parsed = operands.iter().map(parse_concept);
    let first = parsed.next().unwrap_or_else(|| {
        Err(malformed("n-ary connectives take at least two concepts", whole))
    })?;
    parsed.try_fold(first, |acc, next| Ok(combine(acc, next?)))
}

fn parse_restriction(
    operands: &[Value],
    whole: &Value,
) -> Result<(u32, Role, Concept), AlcqError> {
    let [count, rule] = operands else {
        return Err(malformed(
            "a number restriction takes a count and a [\":rule\", R, C] pair",
            whole,
        ));
    };
    let n = match count.as_u64() {
        Some(n) => u32::try_from(n)
            .map_err(|_| malformed("cardinality out of range", whole))?,
        None => {
            if count.as_i64().is_some_and(|n| n < 0) {
                return Err(AlcqError::NegativeCardinality(whole.to_string()));
            }
            return Err(malformed("cardinality must be an integer", whole));
        }
    };
    let items = rule
        .as_array()
        .ok_or_else(|| malformed("expected a [\":rule\", R, C] pair", whole))?;
    match items.first().and_then(Value::as_str) {
        Some(":rule") if items.len() == 3 => {
            let role = Role(parse_name(&items[1])?.into());
            // :T is admitted here and nowhere else
            let qualifier = if items[2].as_str() == Some(":T") {
                Concept::Top
            } else {
                parse_concept(&items[2])?
            };
            Ok((n, role, qualifier))
        }
        _ => Err(malformed("expected a [\":rule\", R, C] pair", whole)),
    }
}

fn parse_individual(value: &Value) -> Result<Individual, AlcqError> {
    Ok(Individual::named(parse_name(value)?))
}

fn parse_name(value: &Value) -> Result<String, AlcqError> {
    match value.as_str() {
        Some(s) if s.starts_with(':') => Err(AlcqError::UnknownTag(s.to_string())),
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(malformed("expected a plain name", value)),
    }
}

fn malformed(reason: &str, value: &Value) -> AlcqError {
    AlcqError::MalformedExpression(format!("{}: {}", reason, value))
}
