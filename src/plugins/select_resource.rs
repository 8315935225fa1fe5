// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::browser::client::BrowserClient;
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::Resource;
use crate::domain::repositories::ResourceRepository;
use crate::plugins::{ApplyResult, Plugin, PluginError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const NAME: &str = "select-resource";

/// 资源选取插件
///
/// 流水线的入口步骤：在尚无工作资源时，从存储中取出项目里下一个未抓取
/// 的资源并标记其进入抓取。取不到资源即是整个抓取循环的停止信号。
pub struct SelectResourcePlugin {
    opts: PluginOpts,
    resources: Arc<dyn ResourceRepository>,
}

impl SelectResourcePlugin {
    pub fn new(opts: PluginOpts, resources: Arc<dyn ResourceRepository>) -> Self {
        Self { opts, resources }
    }
}

#[async_trait]
impl Plugin for SelectResourcePlugin {
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
        Ok(resource.is_none())
    }

    async fn apply(
        &self,
        project: &Project,
        _resource: Option<&Resource>,
        _browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError> {
        let selected = self.resources.acquire_next_unscraped(project.id).await?;

        match selected {
            Some(resource) => {
                debug!(url = %resource.url, depth = resource.depth, "Selected resource");
                Ok(Some(ApplyResult::Resource(resource)))
            }
            None => Ok(None),
        }
    }
}
