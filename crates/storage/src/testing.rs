//! The social-network fixture
//!
//! A two-type schema (users who follow each other, posts they like) plus a
//! seeded data generator. Integration tests, benches, and demos all run
//! against this fixture, so its generator is deterministic: the same seed
//! produces the same users, followers, posts, and likes every time.
//!
//! # Example
//!
//! ```ignore
//! use vista_storage::{testing, MemoryStore};
//!
//! let registry = testing::network_registry()?;
//! let store = MemoryStore::new();
//! let summary = testing::seed_network(&store)?;
//! assert!(summary.users >= 5);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use vista_core::{
    Context, Entity, EntityId, EntitySchema, Error, FieldValue, LinkValue, Lookup, PredicateSet,
    Repository, Result, SchemaRegistry, Timestamp, Value,
};

use crate::store::MemoryStore;

/// Word pool for generated post content
const LOREM: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
    "ad",
    "minim",
    "veniam",
    "quis",
    "nostrud",
    "exercitation",
    "ullamco",
    "laboris",
    "nisi",
    "aliquip",
    "ex",
    "ea",
    "commodo",
    "consequat",
    "duis",
    "aute",
    "irure",
    "in",
    "reprehenderit",
    "voluptate",
    "velit",
    "esse",
    "cillum",
    "eu",
    "fugiat",
    "nulla",
    "pariatur",
    "excepteur",
    "sint",
    "occaecat",
    "cupidatat",
    "non",
    "proident",
    "sunt",
    "culpa",
    "qui",
    "officia",
    "deserunt",
    "mollit",
    "anim",
    "id",
    "est",
    "laborum",
];

// ====================================================================
// Summary and contextual computations
// ====================================================================

fn follower_count(entity: &Entity, _repo: &dyn Repository) -> Value {
    Value::Int(entity.link_many("followers").map_or(0, |m| m.len()) as i64)
}

/// Users this user appears in the follower list of
fn leader_count(entity: &Entity, repo: &dyn Repository) -> Value {
    let mut include = PredicateSet::new();
    include.insert("followers", Lookup::Exact(Value::Int(entity.id().as_int())));
    match repo.filter("user", &include, &PredicateSet::new()) {
        Ok(leaders) => Value::Int(leaders.len() as i64),
        Err(_) => Value::Null,
    }
}

fn date_joined_serial(entity: &Entity, _repo: &dyn Repository) -> Value {
    match entity.field("date_joined").and_then(|f| f.as_instant()) {
        Some(ts) => Value::String(ts.to_rfc3339()),
        None => Value::Null,
    }
}

fn is_following(entity: &Entity, _repo: &dyn Repository, ctx: &Context) -> Value {
    match ctx.identity() {
        Some(me) => Value::Bool(entity.has_member("followers", me)),
        None => Value::Bool(false),
    }
}

fn can_follow(entity: &Entity, _repo: &dyn Repository, ctx: &Context) -> Value {
    match ctx.identity() {
        Some(me) => Value::Bool(me != entity.id()),
        None => Value::Bool(false),
    }
}

fn like_count(entity: &Entity, _repo: &dyn Repository) -> Value {
    Value::Int(entity.link_many("likes").map_or(0, |m| m.len()) as i64)
}

fn timestamp_serial(entity: &Entity, _repo: &dyn Repository) -> Value {
    match entity.field("timestamp").and_then(|f| f.as_instant()) {
        Some(ts) => Value::String(ts.to_rfc3339()),
        None => Value::Null,
    }
}

fn is_liked(entity: &Entity, _repo: &dyn Repository, ctx: &Context) -> Value {
    match ctx.identity() {
        Some(me) => Value::Bool(entity.has_member("likes", me)),
        None => Value::Bool(false),
    }
}

// ====================================================================
// Schema
// ====================================================================

fn user_schema() -> Result<EntitySchema> {
    EntitySchema::builder("user")
        .text("username")
        .optional_text("email")
        .text("password")
        .instant("date_joined")
        .summary("follower_count", follower_count)
        .summary("leader_count", leader_count)
        .summary("date_joined_serial", date_joined_serial)
        .contextual("is_following", is_following)
        .contextual("can_follow", can_follow)
        .reverse_multi_link("posts", "post", "user")
        .self_membership("followers", "user")
        .build()
}

fn post_schema() -> Result<EntitySchema> {
    EntitySchema::builder("post")
        .bounded_text("content", 140)
        .instant("timestamp")
        .summary("like_count", like_count)
        .summary("timestamp_serial", timestamp_serial)
        .contextual("is_liked", is_liked)
        .single_link("user", "user")
        .self_membership("likes", "user")
        .owned_by("user")
        .build()
}

/// The user/post schema every fixture-backed test runs against
pub fn network_registry() -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry.register(user_schema()?)?;
    registry.register(post_schema()?)?;
    Ok(registry)
}

// ====================================================================
// Seeded data generator
// ====================================================================

/// What [`seed_network`] put into the store
#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    /// Persisted user count
    pub users: usize,
    /// Persisted post count
    pub posts: usize,
}

/// Fill a store with a reproducible social graph
///
/// Seeded with a fixed value: 5 to 10 users named `user0..`, each following
/// a random subset of the others, each with up to 10 posts of lorem content
/// capped at 140 characters and backdated up to ten million seconds. Likes
/// come mostly from the author's followers plus a few outsiders.
pub fn seed_network(store: &MemoryStore) -> Result<SeedSummary> {
    let mut rng = StdRng::seed_from_u64(1);

    let user_count = rng.gen_range(5..=10);
    let mut user_ids = Vec::with_capacity(user_count);
    for i in 0..user_count {
        let mut fields = BTreeMap::new();
        fields.insert(
            "username".to_string(),
            FieldValue::from(Value::from(format!("user{i}"))),
        );
        fields.insert("email".to_string(), FieldValue::from(Value::from("")));
        fields.insert(
            "password".to_string(),
            FieldValue::from(Value::from(format!("user{i}"))),
        );
        fields.insert(
            "date_joined".to_string(),
            FieldValue::from(Timestamp::now()),
        );
        let user = store.create("user", fields, BTreeMap::new())?;
        store.persist(&user)?;
        user_ids.push(user.id());
    }

    for &user_id in &user_ids {
        let mut others: Vec<EntityId> = user_ids
            .iter()
            .copied()
            .filter(|&id| id != user_id)
            .collect();
        others.shuffle(&mut rng);
        others.truncate(rng.gen_range(0..=others.len()));

        let mut user = store.get("user", user_id)?;
        user.set_members("followers", others);
        store.persist(&user)?;
    }

    let mut post_ids = Vec::new();
    for &user_id in &user_ids {
        for _ in 0..rng.gen_range(0..=10) {
            let mut words: Vec<&str> = Vec::new();
            for _ in 0..rng.gen_range(5..=30) {
                words.push(LOREM[rng.gen_range(0..LOREM.len())]);
                // +1 per word for spaces, -1 because the last word has none
                let length = words.iter().map(|w| w.len() + 1).sum::<usize>() - 1;
                if length > 140 {
                    words.pop();
                }
            }
            let backdate = Duration::from_secs(rng.gen_range(1..=10_000_000));

            let mut fields = BTreeMap::new();
            fields.insert(
                "content".to_string(),
                FieldValue::from(Value::from(words.join(" "))),
            );
            fields.insert(
                "timestamp".to_string(),
                FieldValue::from(Timestamp::now().saturating_sub(backdate)),
            );
            let mut links = BTreeMap::new();
            links.insert("user".to_string(), LinkValue::One(Some(user_id)));

            let post = store.create("post", fields, links)?;
            store.persist(&post)?;
            post_ids.push(post.id());
        }
    }

    for &post_id in &post_ids {
        let mut post = store.get("post", post_id)?;
        let author_id = post
            .link_one("user")
            .flatten()
            .ok_or_else(|| Error::storage("seeded post has no author"))?;
        let author = store.get("user", author_id)?;
        let fans: Vec<EntityId> = author
            .link_many("followers")
            .map(|m| m.to_vec())
            .unwrap_or_default();

        let lower = fans.len() / 2;
        let upper = fans.len() * 9 / 10;
        let mut likes: Vec<EntityId> = fans[..rng.gen_range(lower..=upper)].to_vec();
        let outsiders = user_ids
            .iter()
            .copied()
            .filter(|id| !fans.contains(id))
            .take(rng.gen_range(0..=5));
        likes.extend(outsiders);

        post.set_members("likes", likes);
        store.persist(&post)?;
    }

    Ok(SeedSummary {
        users: user_ids.len(),
        posts: post_ids.len(),
    })
}
