// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use harvestrs::browser::chromium::ChromiumClient;
use harvestrs::browser::client::BrowserClient;
use harvestrs::config::settings::Settings;
use harvestrs::export::ExportOptions;
use harvestrs::infrastructure::database::connection;
use harvestrs::infrastructure::repositories::project_repo_impl::ProjectRepositoryImpl;
use harvestrs::infrastructure::repositories::resource_repo_impl::ResourceRepositoryImpl;
use harvestrs::plugins::PluginRegistry;
use harvestrs::scraper::{ScrapeDefinition, ScrapeInput, Scraper};
use harvestrs::utils::telemetry;
use migration::{Migrator, MigratorTrait};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，装配协作者并运行一个抓取作业
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting harvestrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize components
    let project_repo = Arc::new(ProjectRepositoryImpl::new(db.clone()));
    let resource_repo = Arc::new(ResourceRepositoryImpl::new(db.clone()));
    let browser: Arc<dyn BrowserClient> =
        Arc::new(ChromiumClient::new(settings.browser.clone()));
    let registry = Arc::new(PluginRegistry::new());

    let scraper = Scraper::new(project_repo, resource_repo, browser, registry);

    // 5. Resolve the scrape job: CLI hash argument first, then configuration
    let input = if let Some(hash) = std::env::args().nth(1) {
        ScrapeInput::Hash(hash)
    } else if let Some(hash) = &settings.scrape.hash {
        ScrapeInput::Hash(hash.clone())
    } else if let Some(url) = &settings.scrape.url {
        ScrapeInput::Definition(ScrapeDefinition {
            url: url.clone(),
            scenario: settings.scrape.scenario.clone(),
            plugin_opts: Vec::new(),
        })
    } else {
        anyhow::bail!("No scrape job configured: set scrape.url or scrape.hash");
    };

    // 6. Scrape
    let project = scraper.run(input).await?;
    info!("Scraping complete for project {}", project.name);

    // 7. Export results if configured
    if let Some(path) = &settings.export.path {
        scraper
            .export(
                &project,
                Path::new(path),
                &ExportOptions {
                    export_type: settings.export.export_type.clone(),
                },
            )
            .await?;
        info!("Export written to {path}");
    }

    Ok(())
}
