//! Create and update requests as they arrive off the wire.

use crate::common::*;
use serde_json::json;
use vistadb::{CreateRequest, ErrorKind, UpdateRequest};

fn create_request(raw: serde_json::Value) -> CreateRequest {
    serde_json::from_value(raw).expect("a well-formed create request")
}

fn update_request(raw: serde_json::Value) -> UpdateRequest {
    serde_json::from_value(raw).expect("a well-formed update request")
}

#[test]
fn test_create_echoes_the_full_projection() {
    let net = TestNetwork::small();
    let out = net
        .gateway
        .create(
            &create_request(json!({"model": "post", "content": "hot off the wire"})),
            &Context::principal(EntityId::new(2)),
        )
        .unwrap();

    let schema = net.registry.resolve("post").unwrap();
    let map = out.as_object().unwrap();
    assert_eq!(map.len(), schema.serializable_fields().len());
    assert_eq!(map["id"], json!(4));
    assert_eq!(map["content"], json!("hot off the wire"));
    assert_eq!(map["user"], json!(2));
    assert_eq!(map["like_count"], json!(0));
    assert_eq!(map["is_liked"], json!(false));
    assert!(map["timestamp"].is_string());
}

#[test]
fn test_created_post_is_read_back_by_search() {
    let net = TestNetwork::small();
    let alice = Context::principal(EntityId::new(1));

    net.gateway
        .create(
            &create_request(json!({"model": "post", "content": "read me back"})),
            &alice,
        )
        .unwrap();

    let response = net
        .gateway
        .search(
            &serde_json::from_value(json!({
                "model": "post",
                "filter": [{"user": {"equals": 1}}],
                "order": "-timestamp",
                "limit": 1,
                "fields": ["content"],
            }))
            .unwrap(),
            &Context::anonymous(),
        )
        .unwrap();
    assert_eq!(response.items, [json!({"content": "read me back"})]);
    assert_eq!(net.store.count("post"), 4);
}

#[test]
fn test_update_batch_mixes_scalars_and_memberships() {
    let net = TestNetwork::small();
    let bob = Context::principal(EntityId::new(2));

    let results = net
        .gateway
        .update(
            &update_request(json!({
                "items": [
                    {"model": "post", "id": 3, "content": "edited"},
                    {"model": "user", "id": 1, "followers": 2},
                ],
                "modes": {"followers": "remove"},
            })),
            &bob,
        )
        .unwrap();

    assert_eq!(
        results,
        [
            json!({"model": "post", "id": 3, "content": "edited"}),
            json!({"model": "user", "id": 1, "followers": []}),
        ]
    );
    let alice = net.store.get("user", EntityId::new(1)).unwrap();
    assert!(!alice.has_member("followers", EntityId::new(2)));
}

#[test]
fn test_set_mode_replaces_a_membership_wholesale() {
    let net = TestNetwork::small();
    let moderator = Context::elevated(EntityId::new(9));

    let results = net
        .gateway
        .update(
            &update_request(json!({
                "items": [{"model": "post", "id": 2, "likes": [1, 2]}],
                "modes": {"likes": "set"},
            })),
            &moderator,
        )
        .unwrap();

    assert_eq!(
        results,
        [json!({"model": "post", "id": 2, "likes": [{"id": 1}, {"id": 2}]})]
    );
}

#[test]
fn test_modes_for_untouched_fields_are_ignored() {
    let net = TestNetwork::small();
    let alice = Context::principal(EntityId::new(1));

    // content is a scalar, so the stray mode entry has nothing to steer
    let results = net
        .gateway
        .update(
            &update_request(json!({
                "items": [{"model": "post", "id": 1, "content": "still mine"}],
                "modes": {"content": "add", "likes": "remove"},
            })),
            &alice,
        )
        .unwrap();
    assert_eq!(
        results,
        [json!({"model": "post", "id": 1, "content": "still mine"})]
    );
}

#[test]
fn test_anonymous_create_is_denied() {
    let net = TestNetwork::small();
    let err = net
        .gateway
        .create(
            &create_request(json!({"model": "post", "content": "drive-by"})),
            &Context::anonymous(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(net.store.count("post"), 3);
}

#[test]
fn test_oversized_content_reports_a_request_error() {
    let net = TestNetwork::small();
    let err = net
        .gateway
        .create(
            &create_request(json!({"model": "post", "content": "x".repeat(141)})),
            &Context::principal(EntityId::new(1)),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(err.to_string(), "content exceeds 140 characters - got 141");
}

#[test]
fn test_unknown_field_reports_a_request_error() {
    let net = TestNetwork::small();
    let err = net
        .gateway
        .update(
            &update_request(json!({
                "items": [{"model": "post", "id": 1, "bogus": 1}],
            })),
            &Context::elevated(EntityId::new(9)),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(err.to_string(), "bogus is not a direct field of post");
}

#[test]
fn test_missing_instance_reports_not_found() {
    let net = TestNetwork::small();
    let err = net
        .gateway
        .update(
            &update_request(json!({
                "items": [{"model": "post", "id": 99, "content": "ghost"}],
            })),
            &Context::elevated(EntityId::new(9)),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "post://99 does not exist");
}
