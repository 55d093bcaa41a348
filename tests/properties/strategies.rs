//! Shared generators.

use proptest::prelude::*;
use vistadb::Value;

/// Any finite wire value, a few levels deep
///
/// Floats stay finite so the JSON conversions are lossless; everything else
/// ranges freely.
pub fn wire_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        "[a-zA-Z0-9_ *-]{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z_]{1,10}", inner, 0..6).prop_map(Value::Object),
        ]
    })
}
