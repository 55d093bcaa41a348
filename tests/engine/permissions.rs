//! Authorization flows across the whole stack.

use crate::common::*;
use std::collections::BTreeMap;
use vista_engine::{permission, Mutator};
use vistadb::ErrorKind;

fn change(field: &str, value: Value) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    map.insert(field.to_string(), value);
    map
}

#[test]
fn test_anonymous_callers_read_but_never_write() {
    let net = TestNetwork::small();
    let mutator = Mutator::new(&net.registry, net.store.as_ref());
    let anonymous = Context::anonymous();

    // reads are open
    let schema = net.registry.resolve("post").unwrap();
    let post = net.store.get("post", EntityId::new(1)).unwrap();
    assert!(permission::can_read(&post, "content", &anonymous));

    // writes are not, whatever the field category
    for (field, value) in [
        ("content", Value::from("x")),
        ("likes", Value::Int(1)),
        ("like_count", Value::Int(5)),
        ("user", Value::Int(2)),
    ] {
        let err = permission::check_write(schema, &post, field, &value, &anonymous).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }
    let err = mutator
        .update(
            "post",
            EntityId::new(1),
            &change("content", Value::from("x")),
            &BTreeMap::new(),
            &anonymous,
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "authentication required");
}

#[test]
fn test_ownership_is_enforced_across_instances() {
    let net = TestNetwork::small();
    let mutator = Mutator::new(&net.registry, net.store.as_ref());
    let bob = Context::principal(EntityId::new(2));

    // bob edits his own post
    mutator
        .update(
            "post",
            EntityId::new(3),
            &change("content", Value::from("revised")),
            &BTreeMap::new(),
            &bob,
        )
        .unwrap();

    // but not alice's
    let err = mutator
        .update(
            "post",
            EntityId::new(1),
            &change("content", Value::from("hijack")),
            &BTreeMap::new(),
            &bob,
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "principal 2 may not write content=\"hijack\" on post://1 owned by 1"
    );
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn test_elevated_callers_bypass_ownership() {
    let net = TestNetwork::small();
    let mutator = Mutator::new(&net.registry, net.store.as_ref());
    let moderator = Context::elevated(EntityId::new(2));

    mutator
        .update(
            "post",
            EntityId::new(1),
            &change("content", Value::from("[removed]")),
            &BTreeMap::new(),
            &moderator,
        )
        .unwrap();

    let post = net.store.get("post", EntityId::new(1)).unwrap();
    assert_eq!(
        post.field("content").unwrap().as_wire(),
        Some(Value::from("[removed]"))
    );
}

#[test]
fn test_self_membership_works_on_foreign_instances_only_for_self() {
    let net = TestNetwork::small();
    let mutator = Mutator::new(&net.registry, net.store.as_ref());
    let alice = Context::principal(EntityId::new(1));

    let mut mode = BTreeMap::new();
    mode.insert("likes".to_string(), "add".to_string());

    // alice likes bob's post with her own identity
    mutator
        .update(
            "post",
            EntityId::new(3),
            &change("likes", Value::Int(1)),
            &mode,
            &alice,
        )
        .unwrap();
    let post = net.store.get("post", EntityId::new(3)).unwrap();
    assert!(post.has_member("likes", EntityId::new(1)));

    // but cannot enroll someone else
    let err = mutator
        .update(
            "post",
            EntityId::new(3),
            &change("likes", Value::Int(2)),
            &mode,
            &alice,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    let post = net.store.get("post", EntityId::new(3)).unwrap();
    assert!(!post.has_member("likes", EntityId::new(2)));
}

#[test]
fn test_unauthorized_field_rejects_the_whole_change_set() {
    let net = TestNetwork::small();
    let mutator = Mutator::new(&net.registry, net.store.as_ref());
    let bob = Context::principal(EntityId::new(2));

    let mut changes = BTreeMap::new();
    changes.insert("content".to_string(), Value::from("new text"));
    changes.insert("user".to_string(), Value::Int(2));

    // content alone would be fine on bob's own post; the link edit sinks it
    let err = mutator
        .update("post", EntityId::new(3), &changes, &BTreeMap::new(), &bob)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let post = net.store.get("post", EntityId::new(3)).unwrap();
    assert_eq!(
        post.field("content").unwrap().as_wire(),
        Some(Value::from("third post"))
    );
}

#[test]
fn test_every_seeded_user_can_follow_every_other() {
    let net = TestNetwork::seeded();
    let mutator = Mutator::new(&net.registry, net.store.as_ref());
    let mut mode = BTreeMap::new();
    mode.insert("followers".to_string(), "add".to_string());

    for follower in 1..=net.summary.users as u64 {
        let ctx = Context::principal(EntityId::new(follower));
        for leader in 1..=net.summary.users as u64 {
            if follower == leader {
                continue;
            }
            mutator
                .update(
                    "user",
                    EntityId::new(leader),
                    &change("followers", Value::Int(follower as i64)),
                    &mode,
                    &ctx,
                )
                .unwrap();
        }
    }

    for leader in 1..=net.summary.users as u64 {
        let user = net.store.get("user", EntityId::new(leader)).unwrap();
        let followers = user.link_many("followers").unwrap();
        assert_eq!(followers.len(), net.summary.users - 1);
    }
}
