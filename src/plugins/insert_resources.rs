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

pub const NAME: &str = "insert-resources";

/// 资源插入插件
///
/// 将提取插件发现的资源种子写入存储，按项目内URL去重，
/// 新资源以未抓取状态入库，等待后续循环选取。
pub struct InsertResourcesPlugin {
    opts: PluginOpts,
    resources: Arc<dyn ResourceRepository>,
}

impl InsertResourcesPlugin {
    pub fn new(opts: PluginOpts, resources: Arc<dyn ResourceRepository>) -> Self {
        Self { opts, resources }
    }
}

#[async_trait]
impl Plugin for InsertResourcesPlugin {
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
        Ok(resource.is_some_and(|r| !r.resources_to_add.is_empty()))
    }

    async fn apply(
        &self,
        project: &Project,
        resource: Option<&Resource>,
        _browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError> {
        let Some(resource) = resource else {
            return Ok(None);
        };

        let mut inserted = 0u64;
        for seed in &resource.resources_to_add {
            if self.resources.exists_by_url(project.id, &seed.url).await? {
                continue;
            }

            self.resources
                .create(&Resource::from_seed(project.id, seed))
                .await?;
            inserted += 1;
        }

        debug!(
            url = %resource.url,
            discovered = resource.resources_to_add.len(),
            inserted,
            "Inserted discovered resources"
        );

        // 种子已消费，清空以免重复插入
        Ok(Some(ApplyResult::Patch(ResourcePatch {
            resources_to_add: Some(Vec::new()),
            ..Default::default()
        })))
    }
}
