//! Integration tests for EduBridge
//!
//! These tests verify end-to-end functionality including:
//! - Entity CRUD against an on-disk database
//! - Concurrent updates on a pooled database
//! - Image upload and delete through the blob store
//! - Admin gating and management screen workflows

use edubridge::app::AppState;
use edubridge::config::{AdminSeed, AppConfig};
use edubridge::database::{
    create_pool, ActiveStatus, Blog, BlogStatus, Institution, InstitutionPatch, Repository,
};
use edubridge::services::{AdminScreen, DefaultAdmin, Entities, ImageService, ImageUpload};
use edubridge::storage::{BlobStore, LocalBlobStore};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinSet;

const BASE_URL: &str = "https://media.edubridge.test/o";

/// Helper to create entity access over a fresh on-disk database
async fn create_test_entities() -> (Entities, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let pool = create_pool(&db_path).await.unwrap();
    (Entities::new(Arc::new(Repository::new(pool))), temp_dir)
}

/// Helper to create a test blob store
async fn create_test_blob_store() -> (LocalBlobStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let blob_store = LocalBlobStore::new(temp_dir.path().join("blobs"), BASE_URL);
    blob_store.initialize().await.unwrap();

    (blob_store, temp_dir)
}

#[tokio::test]
async fn test_institution_lifecycle() {
    let (entities, _temp) = create_test_entities().await;
    let institutions = &entities.institutions;

    let fields = Institution {
        name: "State College".to_string(),
        kind: "college".to_string(),
        location: "Boston, MA".to_string(),
        status: ActiveStatus::Active,
        ..Institution::default()
    };

    // Create
    let id = institutions.create(&fields).await.unwrap();
    assert!(!id.is_empty());

    let all = institutions.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].fields, fields);
    assert_eq!(all[0].created_at, all[0].updated_at);

    // Update
    let patch = InstitutionPatch {
        status: Some(ActiveStatus::Inactive),
        ..InstitutionPatch::default()
    };
    institutions.update(&id, &patch).await.unwrap();

    let all = institutions.get_all().await.unwrap();
    assert_eq!(all[0].fields.status, ActiveStatus::Inactive);
    assert_eq!(all[0].fields.name, "State College");
    assert!(all[0].updated_at > all[0].created_at);

    // Delete
    institutions.delete(&id).await.unwrap();
    assert!(institutions.get_all().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_to_different_records() {
    let (entities, _temp) = create_test_entities().await;

    let mut ids = Vec::new();
    for i in 0..20 {
        let fields = Institution {
            name: format!("College {}", i),
            ..Institution::default()
        };
        ids.push(entities.institutions.create(&fields).await.unwrap());
    }

    let mut tasks = JoinSet::new();
    for id in ids.clone() {
        let institutions = entities.institutions.clone();
        tasks.spawn(async move {
            let patch = InstitutionPatch {
                status: Some(ActiveStatus::Inactive),
                ..InstitutionPatch::default()
            };
            institutions.update(&id, &patch).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let all = entities.institutions.get_all().await.unwrap();
    assert_eq!(all.len(), 20);
    assert!(all.iter().all(|r| r.fields.status == ActiveStatus::Inactive));
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let id = {
        let pool = create_pool(&db_path).await.unwrap();
        let entities = Entities::new(Arc::new(Repository::new(pool.clone())));
        let id = entities
            .blogs
            .create(&Blog {
                title: "Persisted".to_string(),
                status: BlogStatus::Published,
                ..Blog::default()
            })
            .await
            .unwrap();
        pool.close().await;
        id
    };

    let pool = create_pool(&db_path).await.unwrap();
    let entities = Entities::new(Arc::new(Repository::new(pool)));
    let blog = entities.blogs.get(&id).await.unwrap().unwrap();

    assert_eq!(blog.fields.title, "Persisted");
    assert_eq!(blog.fields.status, BlogStatus::Published);
}

#[tokio::test]
async fn test_upload_and_delete_image() {
    let (blob_store, _temp) = create_test_blob_store().await;
    let images = ImageService::new(Arc::new(blob_store.clone()));

    let url = images
        .upload_image(b"cover image", "cover.png", "blogs")
        .await
        .unwrap();

    let after_folder = url.split("blogs/").nth(1).expect("URL should contain blogs/");
    let (timestamp, file_name) = after_folder.split_once('_').unwrap();
    assert!(timestamp.parse::<i64>().is_ok());
    assert_eq!(file_name, "cover.png");

    let key = blob_store.key_for_url(&url).unwrap();
    assert_eq!(blob_store.read(&key).await.unwrap(), b"cover image");

    images.delete_image(&url).await.unwrap();
    assert!(blob_store.read(&key).await.is_err());

    // Foreign URLs are ignored
    images
        .delete_image("https://images.example.com/blogs/1_cover.png")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_back_office_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        data_dir: temp_dir.path().join("data"),
        blob_public_base_url: BASE_URL.to_string(),
        ..AppConfig::default()
    };
    let state = AppState::initialize(&config).await.unwrap();

    // Seed and sign in
    let seed = AdminSeed {
        email: "admin@edubridge.com".to_string(),
        password: "bootstrap-password".to_string(),
        name: "System Administrator".to_string(),
    };
    assert!(matches!(
        state.auth.create_default_admin(&seed).await.unwrap(),
        DefaultAdmin::Created(_)
    ));

    let mut gate = state.admin_gate();
    assert_eq!(gate.resolved().await.screen(), AdminScreen::SignInForm);

    state
        .auth
        .sign_in("admin@edubridge.com", "bootstrap-password")
        .await
        .unwrap();
    let screen = gate
        .wait_for(|s| s.screen() == AdminScreen::Dashboard)
        .await
        .screen();
    assert_eq!(screen, AdminScreen::Dashboard);

    // Manage blogs
    let mut blogs = state.management(&state.entities.blogs);
    blogs.refresh().await.unwrap();
    assert!(blogs.items().is_empty());

    let id = blogs
        .save_with_image(
            None,
            Blog {
                title: "Scholarship Deadlines".to_string(),
                author: "Jane Doe".to_string(),
                tags: vec!["deadlines".to_string()],
                ..Blog::default()
            },
            Some(ImageUpload {
                file_name: "deadlines.png".to_string(),
                data: b"png".to_vec(),
            }),
        )
        .await
        .unwrap();

    assert_eq!(blogs.items().len(), 1);
    assert_eq!(blogs.search("jane")[0].id, id);
    let image_url = blogs.items()[0].fields.featured_image_url.clone().unwrap();
    assert!(image_url.starts_with(&format!("{}/blogs/", BASE_URL)));

    let stats = state.dashboard.fetch_stats().await.unwrap();
    assert_eq!(stats.blogs, 1);
    assert_eq!(stats.students, 0);

    assert!(blogs.remove(&id, true).await.unwrap());
    assert!(blogs.items().is_empty());

    state.auth.sign_out();
    let screen = gate
        .wait_for(|s| s.screen() == AdminScreen::SignInForm)
        .await
        .screen();
    assert_eq!(screen, AdminScreen::SignInForm);
}
