//! Nested projection across links, end to end.

use crate::common::*;
use std::collections::BTreeMap;
use vista_engine::Projector;

fn link(name: &str, inner: Value) -> Value {
    let mut map = BTreeMap::new();
    map.insert(name.to_string(), inner);
    Value::Object(map)
}

fn names(fields: &[&str]) -> Value {
    Value::Array(fields.iter().map(|f| Value::from(*f)).collect())
}

#[test]
fn test_three_levels_of_links() {
    let net = TestNetwork::small();
    let alice = net.store.get("user", EntityId::new(1)).unwrap();
    let projector = Projector::new(&net.registry, net.store.as_ref());

    // user -> posts (ordered desc) -> author -> followers
    let mut options = BTreeMap::new();
    options.insert(
        "fields".to_string(),
        Value::Array(vec![
            Value::from("content"),
            link("user", names(&["username", "follower_count"])),
        ]),
    );
    options.insert("order".to_string(), Value::from("-timestamp"));
    let request = Value::Array(vec![
        Value::from("username"),
        link("posts", Value::Object(options)),
    ]);

    let out = projector
        .project(&alice, &request, &Context::anonymous())
        .unwrap();
    let map = as_object(&out);
    assert_eq!(map["username"], Value::from("alice"));

    let posts = as_array(&map["posts"]);
    assert_eq!(posts.len(), 2);
    assert_eq!(as_object(&posts[0])["content"], Value::from("second post"));
    assert_eq!(as_object(&posts[1])["content"], Value::from("first post"));
    for post in posts {
        let author = as_object(&as_object(post)["user"]);
        assert_eq!(author["username"], Value::from("alice"));
        assert_eq!(author["follower_count"], Value::Int(1));
    }
}

#[test]
fn test_select_all_inside_a_link_stays_shallow() {
    let net = TestNetwork::small();
    let post = net.store.get("post", EntityId::new(1)).unwrap();
    let projector = Projector::new(&net.registry, net.store.as_ref());

    let request = Value::Array(vec![link("user", Value::from("*"))]);
    let out = projector
        .project(&post, &request, &Context::anonymous())
        .unwrap();
    let author = as_object(&as_object(&out)["user"]);

    let schema = net.registry.resolve("user").unwrap();
    assert_eq!(author.len(), schema.serializable_fields().len());
    // linked collections never appear under select-all
    assert!(!author.contains_key("posts"));
    assert!(!author.contains_key("followers"));
    // the instant serialized through its companion
    assert_eq!(author["date_joined"], Value::from("2023-11-14T22:13:20Z"));
}

#[test]
fn test_projection_is_pure_per_caller() {
    let net = TestNetwork::small();
    let alice = net.store.get("user", EntityId::new(1)).unwrap();
    let projector = Projector::new(&net.registry, net.store.as_ref());
    let request = names(&["is_following", "can_follow"]);

    let as_bob = projector
        .project(&alice, &request, &Context::principal(EntityId::new(2)))
        .unwrap();
    assert_eq!(as_object(&as_bob)["is_following"], Value::from(true));
    assert_eq!(as_object(&as_bob)["can_follow"], Value::from(true));

    let as_alice = projector
        .project(&alice, &request, &Context::principal(EntityId::new(1)))
        .unwrap();
    assert_eq!(as_object(&as_alice)["is_following"], Value::from(false));
    assert_eq!(as_object(&as_alice)["can_follow"], Value::from(false));

    // the caller before is unaffected by the caller after
    let again = projector
        .project(&alice, &request, &Context::principal(EntityId::new(2)))
        .unwrap();
    assert_eq!(again, as_bob);
}

#[test]
fn test_likes_membership_projects_user_objects() {
    let net = TestNetwork::small();
    let post = net.store.get("post", EntityId::new(1)).unwrap();
    let projector = Projector::new(&net.registry, net.store.as_ref());

    let request = Value::Array(vec![
        Value::from("like_count"),
        link("likes", names(&["id", "username"])),
    ]);
    let out = projector
        .project(&post, &request, &Context::anonymous())
        .unwrap();
    let map = as_object(&out);
    assert_eq!(map["like_count"], Value::Int(1));

    let likes = as_array(&map["likes"]);
    assert_eq!(likes.len(), 1);
    assert_eq!(as_object(&likes[0])["id"], Value::Int(2));
    assert_eq!(as_object(&likes[0])["username"], Value::from("bob"));
}

#[test]
fn test_seeded_graph_projects_without_errors() {
    let net = TestNetwork::seeded();
    let projector = Projector::new(&net.registry, net.store.as_ref());

    let mut options = BTreeMap::new();
    options.insert("fields".to_string(), Value::from("*"));
    options.insert("order".to_string(), Value::from("-timestamp"));
    let request = Value::Array(vec![
        Value::from("username"),
        Value::from("follower_count"),
        link("posts", Value::Object(options)),
        link("followers", names(&["username"])),
    ]);

    let mut projected_posts = 0;
    for id in 1..=net.summary.users {
        let user = net.store.get("user", EntityId::new(id as u64)).unwrap();
        let out = projector
            .project(&user, &request, &Context::principal(EntityId::new(1)))
            .unwrap();
        projected_posts += as_array(&as_object(&out)["posts"]).len();
    }
    assert_eq!(projected_posts, net.summary.posts);
}
