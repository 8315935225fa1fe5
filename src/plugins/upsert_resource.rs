// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::browser::client::BrowserClient;
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::{Resource, ResourcePatch};
use crate::domain::repositories::ResourceRepository;
use crate::plugins::{ApplyResult, Plugin, PluginError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const NAME: &str = "upsert-resource";

/// 资源落库插件
///
/// 成功路径上的链尾收口：持久化抓取完成的资源并盖上抓取时间戳，
/// 该资源从此不会再被选取。
pub struct UpsertResourcePlugin {
    opts: PluginOpts,
    resources: Arc<dyn ResourceRepository>,
}

impl UpsertResourcePlugin {
    pub fn new(opts: PluginOpts, resources: Arc<dyn ResourceRepository>) -> Self {
        Self { opts, resources }
    }
}

#[async_trait]
impl Plugin for UpsertResourcePlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn opts(&self) -> &PluginOpts {
        &self.opts
    }

    async fn test(
        &self,
        _project: &Project,
        resource: Option<&Resource>,
    ) -> Result<bool, PluginError> {
        Ok(resource.is_some())
    }

    async fn apply(
        &self,
        _project: &Project,
        resource: Option<&Resource>,
        _browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError> {
        let Some(resource) = resource else {
            return Ok(None);
        };

        let updated = self.resources.update(resource).await?;
        debug!(url = %updated.url, "Resource persisted and finalized");

        Ok(Some(ApplyResult::Patch(ResourcePatch {
            scraped_at: updated.scraped_at,
            scrape_in_progress: Some(false),
            ..Default::default()
        })))
    }
}
