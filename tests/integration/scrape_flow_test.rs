// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{test_db, StubBrowserClient};
use harvestrs::domain::models::plugin_opts::PluginOpts;
use harvestrs::domain::repositories::{ResourceQuery, ResourceRepository};
use harvestrs::export::ExportOptions;
use harvestrs::infrastructure::repositories::project_repo_impl::ProjectRepositoryImpl;
use harvestrs::infrastructure::repositories::resource_repo_impl::ResourceRepositoryImpl;
use harvestrs::plugins::PluginRegistry;
use harvestrs::scraper::{ScrapeDefinition, ScrapeInput, Scraper};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

async fn two_page_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                 <h1>Home</h1>
                 <a href="/about">About</a>
               </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(
            r#"<html><body>
                 <h1>About us</h1>
                 <a href="/">Back home</a>
               </body></html>"#,
        ))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn static_content_job_scrapes_the_whole_site_and_terminates() {
    let server = two_page_site().await;
    let db = test_db().await;

    let project_repo = Arc::new(ProjectRepositoryImpl::new(db.clone()));
    let resource_repo = Arc::new(ResourceRepositoryImpl::new(db.clone()));
    let browser = Arc::new(StubBrowserClient::default());
    let registry = Arc::new(PluginRegistry::new());

    let scraper = Scraper::new(
        project_repo,
        resource_repo.clone(),
        browser.clone(),
        registry,
    );

    let project = scraper
        .run(ScrapeInput::Definition(ScrapeDefinition {
            url: format!("{}/", server.uri()),
            scenario: "static-content".to_string(),
            plugin_opts: Vec::new(),
        }))
        .await
        .expect("scrape job failed");

    // 根页面与发现的子页面都抓取完成，作业正常终止
    let resources = resource_repo
        .find_paged(project.id, ResourceQuery::default())
        .await
        .unwrap();
    assert_eq!(resources.len(), 2);
    assert!(resources.iter().all(|r| r.scraped_at.is_some()));
    assert!(resources.iter().all(|r| !r.scrape_in_progress));

    let about = resources
        .iter()
        .find(|r| r.url.ends_with("/about"))
        .expect("discovered resource missing");
    assert_eq!(about.depth, 1);
    assert_eq!(about.status, Some(200));
    assert!(about
        .content
        .as_ref()
        .map(|c| c.to_string().contains("About us"))
        .unwrap_or(false));

    // 渲染器会话在循环后被无条件释放
    assert!(browser.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn depth_limit_stops_url_expansion() {
    let server = two_page_site().await;
    let db = test_db().await;

    let project_repo = Arc::new(ProjectRepositoryImpl::new(db.clone()));
    let resource_repo = Arc::new(ResourceRepositoryImpl::new(db.clone()));
    let scraper = Scraper::new(
        project_repo,
        resource_repo.clone(),
        Arc::new(StubBrowserClient::default()),
        Arc::new(PluginRegistry::new()),
    );

    // max_depth 0：根资源不展开任何链接
    let project = scraper
        .run(ScrapeInput::Definition(ScrapeDefinition {
            url: format!("{}/", server.uri()),
            scenario: "static-content".to_string(),
            plugin_opts: vec![PluginOpts {
                name: "extract-urls".to_string(),
                opts: serde_json::json!({ "max_depth": 0 }),
                ..Default::default()
            }],
        }))
        .await
        .unwrap();

    let resources = resource_repo
        .find_paged(project.id, ResourceQuery::default())
        .await
        .unwrap();
    assert_eq!(resources.len(), 1);
    assert!(resources[0].scraped_at.is_some());
}

#[tokio::test]
async fn failing_fetches_are_contained_and_the_job_still_finishes() {
    let db = test_db().await;

    let project_repo = Arc::new(ProjectRepositoryImpl::new(db.clone()));
    let resource_repo = Arc::new(ResourceRepositoryImpl::new(db.clone()));
    let scraper = Scraper::new(
        project_repo,
        resource_repo.clone(),
        Arc::new(StubBrowserClient::default()),
        Arc::new(PluginRegistry::new()),
    );

    // 不可达端口：fetch 插件抛错，资源被盖章，作业终止而不是死循环
    let project = scraper
        .run(ScrapeInput::Definition(ScrapeDefinition {
            url: "http://127.0.0.1:1/".to_string(),
            scenario: "static-content".to_string(),
            plugin_opts: Vec::new(),
        }))
        .await
        .unwrap();

    let resources = resource_repo
        .find_paged(project.id, ResourceQuery::default())
        .await
        .unwrap();
    assert_eq!(resources.len(), 1);
    assert!(resources[0].scraped_at.is_some());
}

#[tokio::test]
async fn csv_export_writes_extracted_content() {
    let server = two_page_site().await;
    let db = test_db().await;

    let project_repo = Arc::new(ProjectRepositoryImpl::new(db.clone()));
    let resource_repo = Arc::new(ResourceRepositoryImpl::new(db.clone()));
    let scraper = Scraper::new(
        project_repo,
        resource_repo,
        Arc::new(StubBrowserClient::default()),
        Arc::new(PluginRegistry::new()),
    );

    let project = scraper
        .run(ScrapeInput::Definition(ScrapeDefinition {
            url: format!("{}/", server.uri()),
            scenario: "static-content".to_string(),
            plugin_opts: Vec::new(),
        }))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    scraper
        .export(
            &project,
            &path,
            &ExportOptions {
                export_type: "csv".to_string(),
            },
        )
        .await
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("Home"));
    assert!(written.contains("About us"));

    // 不支持的导出类型被上报但不报错
    let bogus = dir.path().join("export.xml");
    scraper
        .export(
            &project,
            &bogus,
            &ExportOptions {
                export_type: "xml".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!bogus.exists());
}
