//! Integration tests for `SqliteStore` against an in-memory database.

use checkin_core::{
  store::{AttendanceStore, CheckinQuery, StoreError, VolunteerFilter},
  volunteer::NewVolunteer,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_volunteer(name: &str, email: &str, roles: &[&str]) -> NewVolunteer {
  NewVolunteer {
    name:          name.into(),
    email:         email.into(),
    roles:         roles.iter().map(|r| r.to_string()).collect(),
    password_hash: "$argon2id$test".into(),
    is_admin:      false,
    photo_url:     None,
  }
}

// ─── Volunteers ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_volunteer() {
  let s = store().await;

  let v = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &["media"]))
    .await
    .unwrap();

  let fetched = s.get_volunteer(v.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Ana Souza");
  assert_eq!(fetched.roles, vec!["media".to_string()]);
  assert_eq!(fetched.password_hash, "$argon2id$test");
  assert_eq!(fetched.created_at, v.created_at);
}

#[tokio::test]
async fn get_volunteer_missing_returns_none() {
  let s = store().await;
  assert!(s.get_volunteer(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_typed_conflict() {
  let s = store().await;
  s.create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();

  let err = s
    .create_volunteer(new_volunteer("Ana Lima", "ANA@example.com", &[]))
    .await
    .unwrap_err();
  assert!(err.is_conflict());
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn find_by_email() {
  let s = store().await;
  let v = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();

  let found = s.find_volunteer_by_email("ana@example.com").await.unwrap();
  assert_eq!(found.map(|f| f.id), Some(v.id));
  assert!(s.find_volunteer_by_email("bob@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn update_volunteer_roundtrip_and_conflict() {
  let s = store().await;
  let mut ana = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();
  s.create_volunteer(new_volunteer("Bruno Lima", "bruno@example.com", &[]))
    .await
    .unwrap();

  ana.name = "Ana Maria Souza".into();
  ana.photo_url = Some("https://img.example.com/ana.png".into());
  s.update_volunteer(&ana).await.unwrap();
  let fetched = s.get_volunteer(ana.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Ana Maria Souza");
  assert_eq!(fetched.photo_url.as_deref(), Some("https://img.example.com/ana.png"));

  ana.email = "bruno@example.com".into();
  let err = s.update_volunteer(&ana).await.unwrap_err();
  assert!(err.is_conflict());
}

#[tokio::test]
async fn update_missing_volunteer_is_not_found() {
  let s = store().await;
  let mut ghost = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();
  ghost.id = Uuid::new_v4();
  let err = s.update_volunteer(&ghost).await.unwrap_err();
  assert!(matches!(err, Error::VolunteerNotFound(_)));
  assert!(!err.is_conflict());
}

#[tokio::test]
async fn list_volunteers_filters_by_name_and_role() {
  let s = store().await;
  s.create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &["media", "welcome"]))
    .await
    .unwrap();
  s.create_volunteer(new_volunteer("Bruno Lima", "bruno@example.com", &["kids"]))
    .await
    .unwrap();
  s.create_volunteer(new_volunteer("Carla Souza", "carla@example.com", &["mediation"]))
    .await
    .unwrap();

  let all = s.list_volunteers(&VolunteerFilter::default()).await.unwrap();
  assert_eq!(all.len(), 3);

  let souzas = s
    .list_volunteers(&VolunteerFilter { name: Some("souza".into()), role: None })
    .await
    .unwrap();
  assert_eq!(souzas.len(), 2);

  // Role matching is exact per label, not substring.
  let media = s
    .list_volunteers(&VolunteerFilter { name: None, role: Some("media".into()) })
    .await
    .unwrap();
  assert_eq!(media.len(), 1);
  assert_eq!(media[0].name, "Ana Souza");
}

#[tokio::test]
async fn name_filter_treats_wildcards_literally() {
  let s = store().await;
  s.create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();
  s.create_volunteer(new_volunteer("Bruno_Lima 100%", "bruno@example.com", &[]))
    .await
    .unwrap();

  let by_name = |name: &str| VolunteerFilter { name: Some(name.into()), role: None };

  let percent = s.list_volunteers(&by_name("%")).await.unwrap();
  assert_eq!(percent.len(), 1);
  assert_eq!(percent[0].name, "Bruno_Lima 100%");

  let underscore = s.list_volunteers(&by_name("_")).await.unwrap();
  assert_eq!(underscore.len(), 1);
  assert_eq!(underscore[0].name, "Bruno_Lima 100%");

  assert!(s.list_volunteers(&by_name("a_s")).await.unwrap().is_empty());
  assert!(s.list_volunteers(&by_name("\\")).await.unwrap().is_empty());
}

#[tokio::test]
async fn set_admin_by_email() {
  let s = store().await;
  let v = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();

  assert!(s.set_admin("ana@example.com", true).await.unwrap());
  assert!(s.get_volunteer(v.id).await.unwrap().unwrap().is_admin);
  assert!(!s.set_admin("nobody@example.com", true).await.unwrap());
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_list_checkins() {
  let s = store().await;
  let ana = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();
  let bruno = s
    .create_volunteer(new_volunteer("Bruno Lima", "bruno@example.com", &[]))
    .await
    .unwrap();

  let first = s.record_checkin(ana.id).await.unwrap();
  s.record_checkin(bruno.id).await.unwrap();
  let last = s.record_checkin(ana.id).await.unwrap();
  assert!(first.id < last.id);

  let all = s.list_checkins(&CheckinQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(all[0].checkin_id, first.id);
  assert_eq!(all[0].name, "Ana Souza");
  assert_eq!(all[0].checkin_time, first.checkin_time);

  let only_ana = s
    .list_checkins(&CheckinQuery { since: None, volunteer_id: Some(ana.id) })
    .await
    .unwrap();
  assert_eq!(only_ana.len(), 2);
  assert!(only_ana.iter().all(|r| r.volunteer_id == ana.id));

  let since_last = s
    .list_checkins(&CheckinQuery { since: Some(last.checkin_time), volunteer_id: None })
    .await
    .unwrap();
  assert_eq!(since_last.len(), 1);
  assert_eq!(since_last[0].checkin_id, last.id);
}

#[tokio::test]
async fn checkin_for_unknown_volunteer_is_rejected() {
  let s = store().await;
  let err = s.record_checkin(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::VolunteerNotFound(_)));
  assert!(s.list_checkins(&CheckinQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn latest_checkin_global_and_per_volunteer() {
  let s = store().await;
  assert!(s.latest_checkin(None).await.unwrap().is_none());

  let ana = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();
  let bruno = s
    .create_volunteer(new_volunteer("Bruno Lima", "bruno@example.com", &[]))
    .await
    .unwrap();

  let a = s.record_checkin(ana.id).await.unwrap();
  let b = s.record_checkin(bruno.id).await.unwrap();

  assert_eq!(s.latest_checkin(None).await.unwrap().unwrap().id, b.id);
  assert_eq!(s.latest_checkin(Some(ana.id)).await.unwrap().unwrap().id, a.id);
}

#[tokio::test]
async fn checkin_counts_highest_first() {
  let s = store().await;
  let ana = s
    .create_volunteer(new_volunteer("Ana Souza", "ana@example.com", &[]))
    .await
    .unwrap();
  let bruno = s
    .create_volunteer(new_volunteer("Bruno Lima", "bruno@example.com", &[]))
    .await
    .unwrap();
  s.create_volunteer(new_volunteer("Carla Dias", "carla@example.com", &[]))
    .await
    .unwrap();

  s.record_checkin(ana.id).await.unwrap();
  s.record_checkin(bruno.id).await.unwrap();
  s.record_checkin(bruno.id).await.unwrap();

  let counts = s.checkin_counts().await.unwrap();
  assert_eq!(counts.len(), 2);
  assert_eq!(counts[0].id, bruno.id);
  assert_eq!(counts[0].total_checkins, 2);
  assert_eq!(counts[1].id, ana.id);
}
