//! Sorting under arbitrary rows, present and missing keys mixed.

use proptest::prelude::*;
use vista_engine::OrderSpec;
use vista_storage::testing::network_registry;
use vistadb::{Entity, EntityId, Value};

fn users(names: &[Option<String>]) -> Vec<Entity> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut user = Entity::new("user", EntityId::new(i as u64 + 1));
            if let Some(name) = name {
                user.set_field("username", Value::from(name.as_str()));
            }
            user
        })
        .collect()
}

fn ids(rows: &[Entity]) -> Vec<u64> {
    rows.iter().map(|e| e.id().as_u64()).collect()
}

fn key(entity: &Entity) -> Option<String> {
    entity
        .field("username")
        .and_then(|f| f.as_wire())
        .and_then(|v| v.as_str().map(str::to_string))
}

proptest! {
    #[test]
    fn sorting_permutes_without_losing_rows(
        names in proptest::collection::vec(proptest::option::of("[a-z]{0,6}"), 0..40),
        descending in any::<bool>(),
    ) {
        let registry = network_registry().unwrap();
        let schema = registry.resolve("user").unwrap();
        let order = if descending { "-username" } else { "username" };
        let spec = OrderSpec::parse(order, schema).unwrap();

        let mut rows = users(&names);
        let mut expected = ids(&rows);
        spec.sort(&mut rows);

        let mut actual = ids(&rows);
        actual.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn ascending_puts_missing_first_then_text_in_order(
        names in proptest::collection::vec(proptest::option::of("[a-z]{0,6}"), 0..40),
    ) {
        let registry = network_registry().unwrap();
        let schema = registry.resolve("user").unwrap();
        let spec = OrderSpec::parse("username", schema).unwrap();

        let mut rows = users(&names);
        spec.sort(&mut rows);

        let keys: Vec<Option<String>> = rows.iter().map(key).collect();
        let first_text = keys.iter().position(|k| k.is_some()).unwrap_or(keys.len());
        prop_assert!(keys[..first_text].iter().all(|k| k.is_none()));
        prop_assert!(keys[first_text..].iter().all(|k| k.is_some()));
        let texts: Vec<&String> = keys[first_text..].iter().flatten().collect();
        prop_assert!(texts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn descending_puts_missing_last_then_text_reversed(
        names in proptest::collection::vec(proptest::option::of("[a-z]{0,6}"), 0..40),
    ) {
        let registry = network_registry().unwrap();
        let schema = registry.resolve("user").unwrap();
        let spec = OrderSpec::parse("-username", schema).unwrap();

        let mut rows = users(&names);
        spec.sort(&mut rows);

        let keys: Vec<Option<String>> = rows.iter().map(key).collect();
        let first_missing = keys.iter().position(|k| k.is_none()).unwrap_or(keys.len());
        prop_assert!(keys[first_missing..].iter().all(|k| k.is_none()));
        let texts: Vec<&String> = keys[..first_missing].iter().flatten().collect();
        prop_assert!(texts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn sorting_twice_changes_nothing(
        names in proptest::collection::vec(proptest::option::of("[a-z]{0,6}"), 0..40),
        descending in any::<bool>(),
    ) {
        let registry = network_registry().unwrap();
        let schema = registry.resolve("user").unwrap();
        let order = if descending { "-username" } else { "username" };
        let spec = OrderSpec::parse(order, schema).unwrap();

        let mut once = users(&names);
        spec.sort(&mut once);
        let mut twice = once.clone();
        spec.sort(&mut twice);
        prop_assert_eq!(ids(&once), ids(&twice));
    }
}
