// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::test_db;
use chrono::{Duration, Utc};
use harvestrs::domain::models::resource::Resource;
use harvestrs::domain::repositories::{ResourceQuery, ResourceRepository};
use harvestrs::infrastructure::repositories::resource_repo_impl::ResourceRepositoryImpl;
use serde_json::json;
use uuid::Uuid;

/// 资源选取与分页都按创建时间排序，测试里显式错开时间戳
fn resource_at(project_id: Uuid, url: &str, depth: i32, order: i64) -> Resource {
    let mut resource = Resource::new(project_id, url, depth);
    resource.created_at = (Utc::now() + Duration::seconds(order)).into();
    resource
}

#[tokio::test]
async fn acquire_next_skips_scraped_and_in_progress_resources() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    let first = resource_at(project_id, "https://example.com/1", 0, 0);
    let second = resource_at(project_id, "https://example.com/2", 0, 1);
    repo.create(&first).await.unwrap();
    repo.create(&second).await.unwrap();

    // 第一个资源抓取完成后盖章
    let acquired = repo.acquire_next_unscraped(project_id).await.unwrap().unwrap();
    assert_eq!(acquired.url, "https://example.com/1");
    assert!(acquired.scrape_in_progress);
    repo.update(&acquired).await.unwrap();

    // 第二次选取必须跳过已盖章的资源
    let acquired = repo.acquire_next_unscraped(project_id).await.unwrap().unwrap();
    assert_eq!(acquired.url, "https://example.com/2");

    // 第二个资源仍在抓取中，同样不可再被选取
    assert!(repo.acquire_next_unscraped(project_id).await.unwrap().is_none());
}

#[tokio::test]
async fn acquire_next_is_scoped_to_the_project() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    let foreign = Resource::new(Uuid::new_v4(), "https://other.com/1", 0);
    repo.create(&foreign).await.unwrap();

    assert!(repo.acquire_next_unscraped(project_id).await.unwrap().is_none());
}

#[tokio::test]
async fn update_stamps_scraped_at_and_clears_in_progress() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    let resource = Resource::new(project_id, "https://example.com/1", 0);
    repo.create(&resource).await.unwrap();

    let acquired = repo.acquire_next_unscraped(project_id).await.unwrap().unwrap();
    let updated = repo.update(&acquired).await.unwrap();
    assert!(updated.scraped_at.is_some());
    assert!(!updated.scrape_in_progress);

    // 持久化后可按ID取回，时间戳已落库
    let found = repo.find_by_id(resource.id).await.unwrap().unwrap();
    assert!(found.scraped_at.is_some());
    assert!(!found.scrape_in_progress);
}

#[tokio::test]
async fn actions_round_trip_through_storage() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    let mut dynamic = Resource::new(project_id, "https://example.com/feed", 1);
    dynamic.actions = vec!["scroll".to_string()];
    dynamic.content_type = Some("text/html".to_string());
    repo.create(&dynamic).await.unwrap();

    let found = repo.find_by_id(dynamic.id).await.unwrap().unwrap();
    assert_eq!(found.actions, vec!["scroll".to_string()]);
    assert_eq!(found.content_type.as_deref(), Some("text/html"));

    let static_one = Resource::new(project_id, "https://example.com/static", 0);
    repo.create(&static_one).await.unwrap();
    let found = repo.find_by_id(static_one.id).await.unwrap().unwrap();
    assert!(found.actions.is_empty());
}

#[tokio::test]
async fn exists_by_url_is_scoped_to_the_project() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    repo.create(&Resource::new(project_id, "https://example.com/1", 0))
        .await
        .unwrap();

    assert!(repo.exists_by_url(project_id, "https://example.com/1").await.unwrap());
    assert!(!repo.exists_by_url(project_id, "https://example.com/2").await.unwrap());
    assert!(!repo
        .exists_by_url(Uuid::new_v4(), "https://example.com/1")
        .await
        .unwrap());
}

#[tokio::test]
async fn find_paged_honors_offset_and_limit() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    for i in 1..4 {
        let mut resource = resource_at(project_id, &format!("https://example.com/{i}"), 0, i);
        resource.content = Some(json!([[format!("title{i}")]]));
        repo.create(&resource).await.unwrap();
    }

    let page1 = repo
        .find_paged(
            project_id,
            ResourceQuery {
                offset: 0,
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let urls: Vec<&str> = page1.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);

    let page2 = repo
        .find_paged(
            project_id,
            ResourceQuery {
                offset: 2,
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let urls: Vec<&str> = page2.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/3"]);
}

#[tokio::test]
async fn find_paged_filters_not_null_columns_and_projects_cols() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    // 交替写入文本内容与二进制载荷
    for i in 1..5 {
        let mut resource = resource_at(project_id, &format!("https://example.com/{i}"), 0, i);
        if i % 2 == 0 {
            resource.content = Some(json!([[format!("title{i}")]]));
        } else {
            resource.data = Some(format!("data{i}").into_bytes());
        }
        repo.create(&resource).await.unwrap();
    }

    let text_resources = repo
        .find_paged(
            project_id,
            ResourceQuery {
                where_not_null: vec!["content".to_string()],
                cols: Some(vec!["url".to_string(), "content".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let urls: Vec<&str> = text_resources.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/2", "https://example.com/4"]);
    assert!(text_resources.iter().all(|r| r.content.is_some()));
    // 未选取的列返回空值
    assert!(text_resources.iter().all(|r| r.data.is_none()));

    let binary_resources = repo
        .find_paged(
            project_id,
            ResourceQuery {
                where_not_null: vec!["data".to_string()],
                cols: Some(vec!["url".to_string(), "data".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let payloads: Vec<String> = binary_resources
        .iter()
        .map(|r| String::from_utf8_lossy(r.data.as_deref().unwrap()).to_string())
        .collect();
    assert_eq!(payloads, vec!["data1", "data3"]);
}

#[tokio::test]
async fn create_many_and_delete_all() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    let resources: Vec<Resource> = (1..4)
        .map(|i| Resource::new(project_id, &format!("https://example.com/{i}"), 1))
        .collect();
    let inserted = repo.create_many(&resources).await.unwrap();
    assert_eq!(inserted, 3);

    // 空批量是无操作
    assert_eq!(repo.create_many(&[]).await.unwrap(), 0);

    let deleted = repo.delete_all(project_id).await.unwrap();
    assert_eq!(deleted, 3);
    assert!(repo
        .find_paged(project_id, ResourceQuery::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn delete_removes_a_single_resource() {
    let repo = ResourceRepositoryImpl::new(test_db().await);
    let project_id = Uuid::new_v4();

    let resource = Resource::new(project_id, "https://example.com/1", 0);
    repo.create(&resource).await.unwrap();

    repo.delete(resource.id).await.unwrap();
    assert!(repo.find_by_id(resource.id).await.unwrap().is_none());
}
