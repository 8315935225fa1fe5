// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::browser::client::BrowserClient;
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::{Resource, ResourcePatch};
use crate::plugins::{ApplyResult, Plugin, PluginError};
use async_trait::async_trait;
use tracing::debug;

pub const NAME: &str = "browser-fetch";

/// 渲染器导航抓取插件
///
/// 让渲染器会话导航到资源URL，后续的DOM插件直接在渲染出的页面上工作。
/// 动态子资源不会重新导航，否则会丢失页面上已累积的滚动等状态。
pub struct BrowserFetchPlugin {
    opts: PluginOpts,
}

impl BrowserFetchPlugin {
    pub fn new(opts: PluginOpts) -> Self {
        Self { opts }
    }
}

#[async_trait]
impl Plugin for BrowserFetchPlugin {
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
        Ok(resource.is_some_and(|r| r.status.is_none() && r.actions.is_empty()))
    }

    async fn apply(
        &self,
        _project: &Project,
        resource: Option<&Resource>,
        browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError> {
        let Some(resource) = resource else {
            return Ok(None);
        };

        browser.goto(&resource.url).await?;
        debug!(url = %resource.url, "Navigated renderer session");

        Ok(Some(ApplyResult::Patch(ResourcePatch {
            status: Some(200),
            content_type: Some("text/html".to_string()),
            ..Default::default()
        })))
    }
}
