//! Filter compilation
//!
//! A filter request is a sequence of `{field: {operator: value}}` mappings.
//! Compilation splits it into two predicate sets: include entries that every
//! result must match, and exclude entries that drop a row when all of them
//! match. The repository evaluates both during its scan.
//!
//! Values against numeric fields and links are coerced to integers before
//! they reach a predicate, so `{"id": {"in": ["1", "2"]}}` filters the same
//! rows as the integer form. Relations are filtered by linked identity.

use vista_core::{EntitySchema, Error, Lookup, PredicateSet, Result, Value};

/// Operator keys accepted inside a filter clause
const OP_EQUALS: &str = "equals";
const OP_NOT_EQUALS: &str = "notEquals";
const OP_IN: &str = "in";

/// Compile a raw filter request into include and exclude predicates
///
/// An absent or null request compiles to two empty sets, which the
/// repository treats as match-everything.
///
/// # Errors
///
/// [`Error::InvalidFilter`] for a shape that is not a sequence of clause
/// mappings, [`Error::UnknownFilterField`] for a field outside the stored
/// set, [`Error::UnknownFilterOperator`] for an operator outside
/// equals/notEquals/in, and [`Error::InvalidFilterValue`] when a value
/// cannot coerce to an integer the field requires.
pub fn compile(
    raw: Option<&Value>,
    schema: &EntitySchema,
) -> Result<(PredicateSet, PredicateSet)> {
    let mut include = PredicateSet::new();
    let mut exclude = PredicateSet::new();

    let raw = match raw {
        None | Some(Value::Null) => return Ok((include, exclude)),
        Some(raw) => raw,
    };
    let Value::Array(entries) = raw else {
        return Err(Error::InvalidFilter {
            actual: raw.type_name(),
        });
    };

    for entry in entries {
        let Value::Object(clauses) = entry else {
            return Err(Error::InvalidFilter {
                actual: entry.type_name(),
            });
        };
        for (field, clause) in clauses {
            if !schema.stored_fields().contains(field.as_str()) {
                return Err(Error::UnknownFilterField {
                    field: field.clone(),
                    entity: schema.name(),
                });
            }
            let Value::Object(ops) = clause else {
                return Err(Error::InvalidFilter {
                    actual: clause.type_name(),
                });
            };
            for (operator, value) in ops {
                match operator.as_str() {
                    OP_EQUALS => {
                        include.insert(field.clone(), Lookup::Exact(coerce(schema, field, value)?));
                    }
                    OP_NOT_EQUALS => {
                        exclude.insert(field.clone(), Lookup::Exact(coerce(schema, field, value)?));
                    }
                    OP_IN => {
                        let Value::Array(items) = value else {
                            return Err(Error::InvalidFilter {
                                actual: value.type_name(),
                            });
                        };
                        let coerced = items
                            .iter()
                            .map(|item| coerce(schema, field, item))
                            .collect::<Result<Vec<_>>>()?;
                        include.insert(field.clone(), Lookup::In(coerced));
                    }
                    other => {
                        return Err(Error::UnknownFilterOperator {
                            operator: other.to_string(),
                        })
                    }
                }
            }
        }
    }
    Ok((include, exclude))
}

/// Integer form of a value, for fields filtered by identity or count
///
/// Accepts native integers, integral floats, and decimal strings.
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce(schema: &EntitySchema, field: &str, value: &Value) -> Result<Value> {
    if !schema.is_numeric(field) {
        return Ok(value.clone());
    }
    coerce_int(value)
        .map(Value::Int)
        .ok_or_else(|| Error::InvalidFilterValue {
            field: field.to_string(),
            actual: value.to_string(),
        })
}
