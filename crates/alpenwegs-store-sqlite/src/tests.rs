//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use alpenwegs_core::{
  filter::Filter,
  page::Window,
  resource::Resource,
  store::{ListQuery, Store, StoreError as _},
  track::{NewTrack, Track, TrackCategory},
  user::{IdentityConflicts, NewUser, User},
  visibility::Scope,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str) -> NewUser {
  NewUser {
    username:      username.into(),
    email:         format!("{username}@example.com"),
    first_name:    String::new(),
    last_name:     String::new(),
    password_hash: "$argon2id$placeholder".into(),
  }
}

fn query(scope: Scope) -> ListQuery {
  ListQuery { scope, filter: Filter::default(), window: None }
}

fn filtered(scope: Scope, params: &[(&str, &str)]) -> ListQuery {
  ListQuery {
    scope,
    filter: Filter::parse(Track::FIELDS, params.iter().copied()).unwrap(),
    window: None,
  }
}

fn names(tracks: &[Track]) -> Vec<&str> {
  tracks.iter().map(|t| t.name.as_str()).collect()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;

  let user = s.create_user(new_user("alice")).await.unwrap();
  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched, user);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  s.create_user(new_user("alice")).await.unwrap();

  let mut again = new_user("ALICE");
  again.email = "someone-else@example.com".into();
  let err = s.create_user(again).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateUser { ref username, .. } if username == "ALICE"));
  assert_eq!(
    err.identity_conflict(),
    Some(IdentityConflicts { username: true, email: false })
  );
}

#[tokio::test]
async fn duplicate_email_is_reported_as_email_conflict() {
  let s = store().await;
  s.create_user(new_user("alice")).await.unwrap();

  let mut again = new_user("alicia");
  again.email = "Alice@Example.com".into();
  let err = s.create_user(again).await.unwrap_err();
  assert_eq!(
    err.identity_conflict(),
    Some(IdentityConflicts { username: false, email: true })
  );
}

#[tokio::test]
async fn other_failures_are_not_identity_conflicts() {
  let s   = store().await;
  let err = s.add_member(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.identity_conflict(), None);
}

#[tokio::test]
async fn identity_conflicts_are_case_insensitive() {
  let s = store().await;
  s.create_user(new_user("alice")).await.unwrap();

  let c = s.identity_conflicts("Alice", "nobody@example.com").await.unwrap();
  assert!(c.username && !c.email);

  let c = s.identity_conflicts("bob", "ALICE@example.com").await.unwrap();
  assert!(!c.username && c.email);
}

#[tokio::test]
async fn find_credentials_returns_hash() {
  let s = store().await;
  let user = s.create_user(new_user("alice")).await.unwrap();

  let creds = s.find_credentials("alice").await.unwrap().unwrap();
  assert_eq!(creds.user_id, user.user_id);
  assert_eq!(creds.password_hash, "$argon2id$placeholder");
  assert!(s.find_credentials("mallory").await.unwrap().is_none());
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_group_is_idempotent() {
  let s = store().await;
  let first = s.get_or_create_group("Members").await.unwrap();
  let second = s.get_or_create_group("Members").await.unwrap();
  assert_eq!(first, second);

  let all = s.list_groups(&query(Scope::Nothing)).await.unwrap();
  assert_eq!(all.total, 0);
}

#[tokio::test]
async fn concurrent_get_or_create_yields_one_group() {
  let s = store().await;

  let handles: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.get_or_create_group("Members").await.unwrap() })
    })
    .collect();

  let mut ids = HashSet::new();
  for handle in handles {
    ids.insert(handle.await.unwrap().group_id);
  }
  assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn add_member_twice_is_a_noop() {
  let s = store().await;
  let user = s.create_user(new_user("alice")).await.unwrap();
  let group = s.get_or_create_group("Members").await.unwrap();

  s.add_member(user.user_id, group.group_id).await.unwrap();
  s.add_member(user.user_id, group.group_id).await.unwrap();

  let groups = s.groups_for_user(user.user_id).await.unwrap();
  assert_eq!(groups, vec![group]);
}

#[tokio::test]
async fn add_member_for_unknown_user_fails() {
  let s = store().await;
  let group = s.get_or_create_group("Members").await.unwrap();
  assert!(s.add_member(Uuid::new_v4(), group.group_id).await.is_err());
}

// ─── Listing users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_users_only_id_scope() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  s.create_user(new_user("bob")).await.unwrap();

  let listing = s.list_users(&query(Scope::OnlyId(alice.user_id))).await.unwrap();
  assert_eq!(listing.total, 1);
  assert_eq!(listing.items[0].user_id, alice.user_id);

  let listing = s.list_users(&query(Scope::Nothing)).await.unwrap();
  assert_eq!(listing.total, 0);
  assert!(listing.items.is_empty());
}

#[tokio::test]
async fn list_groups_rejects_public_scope() {
  let s = store().await;
  let err = s.list_groups(&query(Scope::Public)).await.unwrap_err();
  assert!(matches!(err, crate::Error::UnsupportedScope { .. }));
}

// ─── Listing tracks ──────────────────────────────────────────────────────────

struct World {
  s:     SqliteStore,
  alice: Uuid,
}

/// A: public by bob, B: private by alice, C: private by carol.
async fn world() -> World {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap().user_id;
  let bob = s.create_user(new_user("bob")).await.unwrap().user_id;
  let carol = s.create_user(new_user("carol")).await.unwrap().user_id;

  s.create_track(
    NewTrack::new("A", TrackCategory::Hike).public(true).created_by(bob).distance(12_000.0),
  )
  .await
  .unwrap();
  s.create_track(
    NewTrack::new("B", TrackCategory::Running).created_by(alice).distance(5_000.0),
  )
  .await
  .unwrap();
  s.create_track(
    NewTrack::new("C", TrackCategory::Climbing).created_by(carol).distance(800.0),
  )
  .await
  .unwrap();

  World { s, alice }
}

#[tokio::test]
async fn authenticated_sees_public_and_own() {
  let w = world().await;
  let listing = w.s.list_tracks(&query(Scope::PublicOrCreator(w.alice))).await.unwrap();
  assert_eq!(names(&listing.items), ["A", "B"]);
  assert_eq!(listing.total, 2);
}

#[tokio::test]
async fn anonymous_sees_only_public() {
  let w = world().await;
  let listing = w.s.list_tracks(&query(Scope::Public)).await.unwrap();
  assert_eq!(names(&listing.items), ["A"]);
}

#[tokio::test]
async fn tracks_roundtrip_all_columns() {
  let s = store().await;
  let mut input = NewTrack::new("Eiger Trail", TrackCategory::Hike).public(true);
  input.snippet = Some("Under the north face".into());
  input.difficulty = Some("T2".into());
  input.average_speed = Some(3.4);
  input.total_time = Some(9_000);

  let created = s.create_track(input).await.unwrap();
  let listing = s.list_tracks(&query(Scope::Public)).await.unwrap();
  assert_eq!(listing.items, vec![created]);
}

#[tokio::test]
async fn filters_never_widen_the_visible_set() {
  let w = world().await;
  let scope = Scope::PublicOrCreator(w.alice);
  let visible: HashSet<Uuid> = w
    .s
    .list_tracks(&query(scope))
    .await
    .unwrap()
    .items
    .iter()
    .map(|t| t.track_id)
    .collect();

  let cases: &[&[(&str, &str)]] = &[
    &[("name", "C")],
    &[("is_public", "false")],
    &[("total_distance__lt", "1000")],
    &[("category", "130")],
    &[("total_distance__gt", "0")],
  ];
  for params in cases {
    let narrowed = w.s.list_tracks(&filtered(scope, params)).await.unwrap();
    for track in &narrowed.items {
      assert!(visible.contains(&track.track_id), "{params:?} leaked {}", track.name);
    }
  }
}

#[tokio::test]
async fn filter_on_own_private_track() {
  let w = world().await;
  let listing = w
    .s
    .list_tracks(&filtered(Scope::PublicOrCreator(w.alice), &[("is_public", "false")]))
    .await
    .unwrap();
  assert_eq!(names(&listing.items), ["B"]);
}

#[tokio::test]
async fn icontains_is_case_insensitive() {
  let s = store().await;
  s.create_track(NewTrack::new("Matterhorn Glacier Trail", TrackCategory::Hike).public(true))
    .await
    .unwrap();
  s.create_track(NewTrack::new("Aletsch Panorama", TrackCategory::Hike).public(true))
    .await
    .unwrap();

  let listing = s
    .list_tracks(&filtered(Scope::Public, &[("name__icontains", "glacier")]))
    .await
    .unwrap();
  assert_eq!(names(&listing.items), ["Matterhorn Glacier Trail"]);
}

#[tokio::test]
async fn ordering_and_window() {
  let w = world().await;
  let mut q = filtered(Scope::PublicOrCreator(w.alice), &[("ordering", "-total_distance")]);
  q.window = Some(Window { offset: 1, limit: 1 });

  let listing = w.s.list_tracks(&q).await.unwrap();
  assert_eq!(listing.total, 2);
  assert_eq!(names(&listing.items), ["B"]);
}

#[tokio::test]
async fn window_beyond_sql_range_returns_no_rows() {
  let w = world().await;
  let mut q = query(Scope::Public);
  q.window = Some(Window { offset: u64::MAX, limit: 20 });

  let listing = w.s.list_tracks(&q).await.unwrap();
  assert!(listing.items.is_empty());
  assert_eq!(listing.total, 1);
}

#[tokio::test]
async fn case_folding_covers_ascii_only() {
  let s = store().await;
  s.create_track(NewTrack::new("ÄLPLI", TrackCategory::Hike).public(true))
    .await
    .unwrap();

  let listing = s
    .list_tracks(&filtered(Scope::Public, &[("name__icontains", "lpli")]))
    .await
    .unwrap();
  assert_eq!(names(&listing.items), ["ÄLPLI"]);

  let listing = s
    .list_tracks(&filtered(Scope::Public, &[("name__iexact", "äLPLI")]))
    .await
    .unwrap();
  assert!(listing.items.is_empty());
}

#[tokio::test]
async fn fetch_dispatches_by_resource_type() {
  let w = world().await;
  let listing = Track::fetch(&w.s, &query(Scope::Public)).await.unwrap();
  assert_eq!(names(&listing.items), ["A"]);

  let listing = User::fetch(&w.s, &query(Scope::OnlyId(w.alice))).await.unwrap();
  assert_eq!(listing.items[0].username, "alice");
}
