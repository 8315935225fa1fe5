// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::test_db;
use harvestrs::domain::models::plugin_opts::PluginOpts;
use harvestrs::domain::models::project::Project;
use harvestrs::domain::repositories::ProjectRepository;
use harvestrs::infrastructure::repositories::project_repo_impl::ProjectRepositoryImpl;
use serde_json::json;

fn sample_project() -> Project {
    Project::from_url(
        "https://example.com/start",
        vec![
            PluginOpts::named("select-resource"),
            PluginOpts {
                name: "extract-urls".to_string(),
                opts: json!({ "max_depth": 3 }),
                ..Default::default()
            },
        ],
    )
    .unwrap()
}

#[tokio::test]
async fn create_and_find_round_trip_preserves_plugin_opts() {
    let repo = ProjectRepositoryImpl::new(test_db().await);
    let project = sample_project();

    repo.create(&project).await.unwrap();

    let found = repo.find_by_id(project.id).await.unwrap().unwrap();
    assert_eq!(found.id, project.id);
    assert_eq!(found.name, "example.com");
    assert_eq!(found.url, project.url);
    assert_eq!(found.plugin_opts, project.plugin_opts);
}

#[tokio::test]
async fn find_by_name_matches_created_project() {
    let repo = ProjectRepositoryImpl::new(test_db().await);
    let project = sample_project();
    repo.create(&project).await.unwrap();

    let found = repo.find_by_name("example.com").await.unwrap().unwrap();
    assert_eq!(found.id, project.id);

    assert!(repo.find_by_name("other.com").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_project() {
    let repo = ProjectRepositoryImpl::new(test_db().await);
    let project = sample_project();
    repo.create(&project).await.unwrap();

    repo.delete(project.id).await.unwrap();
    assert!(repo.find_by_id(project.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_all_clears_every_project() {
    let repo = ProjectRepositoryImpl::new(test_db().await);
    repo.create(&sample_project()).await.unwrap();
    repo.create(&Project::from_url("https://other.com", Vec::new()).unwrap())
        .await
        .unwrap();

    let deleted = repo.delete_all().await.unwrap();
    assert_eq!(deleted, 2);
}

#[tokio::test]
async fn ping_succeeds_on_connected_storage() {
    let repo = ProjectRepositoryImpl::new(test_db().await);
    repo.ping().await.unwrap();
}
