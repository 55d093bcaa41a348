//! Search requests as they arrive off the wire.

use crate::common::*;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use vistadb::{ErrorKind, SearchRequest};

fn request(raw: serde_json::Value) -> SearchRequest {
    serde_json::from_value(raw).expect("a well-formed search request")
}

#[test]
fn test_in_operator_coerces_wire_strings() {
    let net = TestNetwork::small();
    let response = net
        .gateway
        .search(
            &request(json!({
                "model": "post",
                "filter": [{"id": {"in": ["1", "3"]}}],
                "fields": ["id"],
            })),
            &Context::anonymous(),
        )
        .unwrap();

    assert_eq!(response.items, [json!({"id": 1}), json!({"id": 3})]);
}

#[test]
fn test_not_equals_excludes_matching_rows() {
    let net = TestNetwork::small();
    let response = net
        .gateway
        .search(
            &request(json!({
                "model": "post",
                "filter": [{"user": {"notEquals": 1}}],
                "fields": ["id", "content"],
            })),
            &Context::anonymous(),
        )
        .unwrap();

    assert_eq!(response.items, [json!({"id": 3, "content": "third post"})]);
}

#[test]
fn test_nested_fields_with_an_ordered_sub_request() {
    let net = TestNetwork::small();
    let response = net
        .gateway
        .search(
            &request(json!({
                "model": "user",
                "filter": [{"id": {"equals": 1}}],
                "fields": [
                    "username",
                    {"posts": {"fields": ["id", "content"], "order": "-timestamp"}},
                ],
            })),
            &Context::anonymous(),
        )
        .unwrap();

    assert_eq!(
        response.items,
        [json!({
            "username": "alice",
            "posts": [
                {"id": 2, "content": "second post"},
                {"id": 1, "content": "first post"},
            ],
        })]
    );
}

#[test]
fn test_star_selects_every_serializable_field() {
    let net = TestNetwork::small();
    let response = net
        .gateway
        .search(
            &request(json!({
                "model": "post",
                "filter": [{"id": {"equals": 1}}],
                "fields": "*",
            })),
            &Context::anonymous(),
        )
        .unwrap();

    let schema = net.registry.resolve("post").unwrap();
    let item = response.items[0].as_object().unwrap();
    assert_eq!(item.len(), schema.serializable_fields().len());
    assert_eq!(item["content"], json!("first post"));
    assert_eq!(item["like_count"], json!(1));
    assert_eq!(item["user"], json!(1));
    // instants serialize through their companion on both keys
    assert_eq!(item["timestamp"], item["timestamp_serial"]);
    assert!(item["timestamp"].is_string());
}

#[test]
fn test_page_walk_covers_the_seeded_graph() {
    let net = TestNetwork::seeded();
    let mut seen = BTreeSet::new();
    let mut page = 1;

    loop {
        let response = net
            .gateway
            .search(
                &request(json!({
                    "model": "post",
                    "order": "timestamp",
                    "limit": 3,
                    "page": page,
                    "fields": ["id"],
                })),
                &Context::anonymous(),
            )
            .unwrap();

        assert_eq!(response.page, page);
        assert_eq!(response.has_previous, page > 1);
        for item in &response.items {
            assert!(seen.insert(item["id"].as_u64().unwrap()), "duplicate row");
        }
        if !response.has_next {
            assert_eq!(response.pages, page);
            break;
        }
        page += 1;
    }

    assert_eq!(seen.len(), net.summary.posts);
}

#[test]
fn test_configured_limits_bound_the_page_size() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let summary = seed_network(&store).unwrap();
    let gateway = Gateway::with_limits(
        network_registry().unwrap(),
        store,
        Limits::with_small_limits(),
    );

    let response = gateway
        .search(
            &request(json!({"model": "post", "fields": ["id"]})),
            &Context::anonymous(),
        )
        .unwrap();
    assert!(response.items.len() <= 5);
    assert_eq!(response.pages, ((summary.posts + 4) / 5).max(1));

    let err = gateway
        .search(
            &request(json!({"model": "post", "limit": 6})),
            &Context::anonymous(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "limit must be between 1 and 5 - got 6");
}

#[test]
fn test_request_errors_carry_their_kinds() {
    let net = TestNetwork::small();

    let err = net
        .gateway
        .search(&request(json!({"model": "comment"})), &Context::anonymous())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = net
        .gateway
        .search(
            &request(json!({
                "model": "post",
                "filter": [{"content": {"contains": "post"}}],
            })),
            &Context::anonymous(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(
        err.to_string(),
        "unknown filter operator contains - expected equals, notEquals, or in"
    );

    let err = net
        .gateway
        .search(
            &request(json!({"model": "user", "order": "posts"})),
            &Context::anonymous(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(
        err.to_string(),
        "cannot order by posts - not a stored field of user"
    );

    let err = net
        .gateway
        .search(
            &request(json!({"model": "post", "limit": 2, "page": 99})),
            &Context::anonymous(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
}

#[test]
fn test_contextual_flags_follow_the_wire_caller() {
    let net = TestNetwork::small();
    let raw = json!({
        "model": "post",
        "filter": [{"id": {"equals": 1}}],
        "fields": ["is_liked"],
    });

    let anonymous = net
        .gateway
        .search(&request(raw.clone()), &Context::anonymous())
        .unwrap();
    assert_eq!(anonymous.items[0], json!({"is_liked": false}));

    let as_bob = net
        .gateway
        .search(&request(raw), &Context::principal(EntityId::new(2)))
        .unwrap();
    assert_eq!(as_bob.items[0], json!({"is_liked": true}));
}
