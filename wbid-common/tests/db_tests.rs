//! Integration tests for the catalog, review queue and admin tables
//!
//! Each test opens a fresh database in a temporary directory.

use sqlx::SqlitePool;
use tempfile::TempDir;
use wbid_common::db::admins::{
    count_admins, create_admin, ensure_bootstrap_admin, get_admin, revoke_sessions, verify_admin,
};
use wbid_common::db::init::init_database;
use wbid_common::db::pending::{
    approve_pending, count_pending, get_pending, insert_pending, list_pending, reject_pending,
};
use wbid_common::db::species::{
    count_species, delete_species, get_species, insert_species, list_species,
    list_species_by_common_name, species_exists, update_species,
};
use wbid_common::db::{ApprovalInput, SpeciesFilter, SpeciesInput};
use wbid_common::config::AdminBootstrap;

async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("wbid.db"))
        .await
        .expect("database should initialize");
    (dir, pool)
}

fn species(common: &str, scientific: &str, status: &str, season: &str) -> SpeciesInput {
    SpeciesInput {
        common_name: common.to_string(),
        scientific_name: scientific.to_string(),
        status: status.to_string(),
        season: season.to_string(),
        image: None,
    }
}

fn approval(common: &str, scientific: &str) -> ApprovalInput {
    ApprovalInput {
        common_name: common.to_string(),
        scientific_name: scientific.to_string(),
        status: "Winter Visitor".to_string(),
        season: "Winter".to_string(),
    }
}

// =============================================================================
// Schema
// =============================================================================

#[tokio::test]
async fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("wbid.db");

    let pool1 = init_database(&path).await.unwrap();
    insert_species(&pool1, &species("Mallard", "Anas platyrhynchos", "Resident", "All"))
        .await
        .unwrap();
    drop(pool1);

    let pool2 = init_database(&path).await.unwrap();
    assert_eq!(count_species(&pool2).await.unwrap(), 1);
}

#[tokio::test]
async fn test_init_adds_session_generation_to_older_admins_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wbid.db");

    let options = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let old = SqlitePool::connect_with(options).await.unwrap();
    sqlx::query(
        "CREATE TABLE admins (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT NOT NULL UNIQUE, \
         password_hash TEXT NOT NULL, password_salt TEXT NOT NULL, \
         created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP)",
    )
    .execute(&old)
    .await
    .unwrap();
    sqlx::query("INSERT INTO admins (username, password_hash, password_salt) VALUES ('warden', 'h', 's')")
        .execute(&old)
        .await
        .unwrap();
    old.close().await;

    let db = init_database(&path).await.unwrap();
    let admin = get_admin(&db, 1).await.unwrap().unwrap();
    assert_eq!(admin.username, "warden");
    assert_eq!(admin.session_generation, 0);
}

// =============================================================================
// Catalog membership
// =============================================================================

#[tokio::test]
async fn test_membership_canonicalizes_both_sides() {
    let (_dir, db) = setup_db().await;
    insert_species(&db, &species("Red Junglefowl", "Gallus_Gallus", "Resident", "All"))
        .await
        .unwrap();

    assert!(species_exists(&db, "gallus gallus").await.unwrap());
    assert!(species_exists(&db, "GALLUS_GALLUS").await.unwrap());
    assert!(species_exists(&db, "  Gallus gallus ").await.unwrap());
}

#[tokio::test]
async fn test_membership_is_exact_not_fuzzy() {
    let (_dir, db) = setup_db().await;
    insert_species(&db, &species("Mallard", "Anas platyrhynchos", "Resident", "All"))
        .await
        .unwrap();

    assert!(!species_exists(&db, "anas").await.unwrap());
    assert!(!species_exists(&db, "anas platyrhynchos domesticus").await.unwrap());
}

// =============================================================================
// Catalog listing
// =============================================================================

#[tokio::test]
async fn test_list_filters() {
    let (_dir, db) = setup_db().await;
    insert_species(&db, &species("Mallard", "Anas platyrhynchos", "Resident", "All"))
        .await
        .unwrap();
    insert_species(&db, &species("Common Teal", "Anas crecca", "Winter Migrant", "Winter"))
        .await
        .unwrap();
    insert_species(&db, &species("Grey Heron", "Ardea cinerea", "Summer Migrant", "Summer"))
        .await
        .unwrap();

    let all = list_species(&db, &SpeciesFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let migrants = list_species(
        &db,
        &SpeciesFilter {
            status: Some("Migrant".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(migrants.len(), 2);

    let winter = list_species(
        &db,
        &SpeciesFilter {
            season: Some("Winter".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(winter.len(), 1);
    assert_eq!(winter[0].common_name, "Common Teal");

    // Season is exact, not substring
    let partial_season = list_species(
        &db,
        &SpeciesFilter {
            season: Some("Win".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(partial_season.is_empty());

    let search = list_species(
        &db,
        &SpeciesFilter {
            q: Some("anas".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(search.len(), 2);

    let combined = list_species(
        &db,
        &SpeciesFilter {
            status: Some("Migrant".to_string()),
            q: Some("heron".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].scientific_name, "Ardea cinerea");
}

#[tokio::test]
async fn test_admin_listing_ordered_by_common_name() {
    let (_dir, db) = setup_db().await;
    for (common, sci) in [("Teal", "Anas crecca"), ("Avocet", "Recurvirostra avosetta"), ("Mallard", "Anas platyrhynchos")] {
        insert_species(&db, &species(common, sci, "", "")).await.unwrap();
    }

    let names: Vec<String> = list_species_by_common_name(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.common_name)
        .collect();
    assert_eq!(names, vec!["Avocet", "Mallard", "Teal"]);
}

#[tokio::test]
async fn test_get_update_delete_species() {
    let (_dir, db) = setup_db().await;
    let id = insert_species(&db, &species("Teal", "Anas crecca", "Migrant", "Winter"))
        .await
        .unwrap();

    assert!(get_species(&db, id + 100).await.unwrap().is_none());

    let mut edit = species("Eurasian Teal", "Anas crecca", "Winter Migrant", "Winter");
    edit.image = Some("uploads/teal.jpg".to_string());
    assert!(update_species(&db, id, &edit).await.unwrap());
    assert!(!update_species(&db, id + 100, &edit).await.unwrap());

    let stored = get_species(&db, id).await.unwrap().unwrap();
    assert_eq!(stored.common_name, "Eurasian Teal");
    assert_eq!(stored.image.as_deref(), Some("uploads/teal.jpg"));

    assert!(delete_species(&db, id).await.unwrap());
    assert!(!delete_species(&db, id).await.unwrap());
    assert!(get_species(&db, id).await.unwrap().is_none());
}

// =============================================================================
// Review queue
// =============================================================================

#[tokio::test]
async fn test_pending_listed_most_recent_first() {
    let (_dir, db) = setup_db().await;
    let first = insert_pending(&db, "Anas Crecca", 12.5, "uploads/a.jpg").await.unwrap();
    let second = insert_pending(&db, "Ardea Alba", 18.0, "uploads/b.jpg").await.unwrap();

    let pending = list_pending(&db).await.unwrap();
    let ids: Vec<i64> = pending.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(pending[1].confidence, 12.5);
    assert_eq!(pending[1].image_path, "uploads/a.jpg");
}

#[tokio::test]
async fn test_approve_moves_observation_into_catalog() {
    let (_dir, db) = setup_db().await;
    let pid = insert_pending(&db, "Anas Crecca", 15.0, "uploads/teal.jpg").await.unwrap();

    let species_id = approve_pending(&db, pid, &approval("Common Teal", "Anas crecca"))
        .await
        .unwrap()
        .expect("pending row exists");

    // Found in catalog with corrected metadata and the stored image path
    let record = get_species(&db, species_id).await.unwrap().unwrap();
    assert_eq!(record.common_name, "Common Teal");
    assert_eq!(record.scientific_name, "Anas crecca");
    assert_eq!(record.status, "Winter Visitor");
    assert_eq!(record.season, "Winter");
    assert_eq!(record.image.as_deref(), Some("uploads/teal.jpg"));
    assert!(species_exists(&db, "anas_crecca").await.unwrap());

    // Gone from the queue
    assert!(get_pending(&db, pid).await.unwrap().is_none());
    assert!(list_pending(&db).await.unwrap().iter().all(|p| p.id != pid));
}

#[tokio::test]
async fn test_approve_missing_id_writes_nothing() {
    let (_dir, db) = setup_db().await;

    let result = approve_pending(&db, 42, &approval("Common Teal", "Anas crecca"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(count_species(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_approve_twice_is_not_found_second_time() {
    let (_dir, db) = setup_db().await;
    let pid = insert_pending(&db, "Anas Crecca", 15.0, "uploads/teal.jpg").await.unwrap();

    assert!(approve_pending(&db, pid, &approval("Teal", "Anas crecca")).await.unwrap().is_some());
    assert!(approve_pending(&db, pid, &approval("Teal", "Anas crecca")).await.unwrap().is_none());
    assert_eq!(count_species(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_approve_rejects_blank_names() {
    let (_dir, db) = setup_db().await;
    let pid = insert_pending(&db, "Anas Crecca", 15.0, "uploads/teal.jpg").await.unwrap();

    let result = approve_pending(&db, pid, &approval("", "Anas crecca")).await;
    assert!(result.is_err());

    // Queue untouched
    assert_eq!(count_pending(&db).await.unwrap(), 1);
    assert_eq!(count_species(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reject_removes_only_pending() {
    let (_dir, db) = setup_db().await;
    insert_species(&db, &species("Mallard", "Anas platyrhynchos", "Resident", "All"))
        .await
        .unwrap();
    let pid = insert_pending(&db, "Ardea Alba", 9.0, "uploads/egret.jpg").await.unwrap();

    assert!(reject_pending(&db, pid).await.unwrap());
    assert!(list_pending(&db).await.unwrap().is_empty());
    assert_eq!(count_species(&db).await.unwrap(), 1);

    // Missing id is a no-op
    assert!(!reject_pending(&db, pid).await.unwrap());
}

// =============================================================================
// Admins
// =============================================================================

#[tokio::test]
async fn test_admin_credentials_hashed_and_verified() {
    let (_dir, db) = setup_db().await;
    let id = create_admin(&db, "warden", "marsh-harrier").await.unwrap();

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM admins WHERE id = ?")
        .bind(id)
        .fetch_one(&db)
        .await
        .unwrap();
    assert_ne!(stored, "marsh-harrier");

    let admin = verify_admin(&db, "warden", "marsh-harrier").await.unwrap();
    assert_eq!(admin.map(|a| a.id), Some(id));

    assert!(verify_admin(&db, "warden", "wrong").await.unwrap().is_none());
    assert!(verify_admin(&db, "nobody", "marsh-harrier").await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_sessions_bumps_generation() {
    let (_dir, db) = setup_db().await;
    let id = create_admin(&db, "warden", "marsh-harrier").await.unwrap();
    assert_eq!(get_admin(&db, id).await.unwrap().unwrap().session_generation, 0);

    assert!(revoke_sessions(&db, id).await.unwrap());
    assert!(revoke_sessions(&db, id).await.unwrap());
    assert_eq!(get_admin(&db, id).await.unwrap().unwrap().session_generation, 2);

    assert!(!revoke_sessions(&db, id + 100).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_admin_username_rejected() {
    let (_dir, db) = setup_db().await;
    create_admin(&db, "warden", "one").await.unwrap();
    assert!(create_admin(&db, "warden", "two").await.is_err());
}

#[tokio::test]
async fn test_bootstrap_admin_only_when_table_empty() {
    let (_dir, db) = setup_db().await;
    let bootstrap = AdminBootstrap {
        username: Some("warden".to_string()),
        password: Some("secret".to_string()),
    };

    assert!(ensure_bootstrap_admin(&db, &bootstrap).await.unwrap());
    assert!(!ensure_bootstrap_admin(&db, &bootstrap).await.unwrap());
    assert_eq!(count_admins(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_bootstrap_without_credentials_creates_nothing() {
    let (_dir, db) = setup_db().await;
    assert!(!ensure_bootstrap_admin(&db, &AdminBootstrap::default()).await.unwrap());
    assert_eq!(count_admins(&db).await.unwrap(), 0);
}
