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

use crate::browser::client::{BrowserClient, BrowserError};
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::{Resource, ResourcePatch};
use crate::domain::repositories::{RepositoryError, ResourceRepository};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// 插件注册表
pub mod registry;

/// 渲染器导航抓取插件
pub mod browser_fetch;
/// HTML内容提取插件
pub mod extract_html_content;
/// 链接提取插件
pub mod extract_urls;
/// HTTP抓取插件
pub mod fetch;
/// 资源插入插件
pub mod insert_resources;
/// 滚动动作插件
pub mod scroll;
/// 资源选取插件
pub mod select_resource;
/// 资源落库插件
pub mod upsert_resource;

pub use registry::PluginRegistry;

/// 插件错误类型
#[derive(Error, Debug)]
pub enum PluginError {
    /// 未注册的插件名
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),
    /// DOM插件缺少远程执行包
    #[error("Plugin '{0}' requires a remote bundle but none is registered")]
    MissingBundle(String),
    /// 远程执行失败，消息保留自渲染器侧
    #[error("Plugin '{plugin}' failed in renderer: {message}")]
    Remote { plugin: String, message: String },
    /// 没有在途资源却返回了补丁
    #[error("Plugin '{0}' returned a patch with no resource in flight")]
    PatchWithoutResource(String),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 渲染器错误
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
    /// HTTP请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 插件选项无效
    #[error("Invalid plugin options: {0}")]
    InvalidOptions(String),
}

/// 插件执行结果
///
/// `Resource` 表示选出了一个新的工作资源（整体替换当前资源）；
/// `Patch` 表示部分字段，逐字段合并到当前资源上
#[derive(Debug)]
pub enum ApplyResult {
    Resource(Resource),
    Patch(ResourcePatch),
}

/// 插件依赖
///
/// 实例化插件时注入的协作者
#[derive(Clone)]
pub struct PluginDeps {
    pub resources: Arc<dyn ResourceRepository>,
    pub http: reqwest::Client,
}

/// 插件特质
///
/// 流水线中每一步都实现该能力接口。`test` 是纯的适用性判定，不得变更
/// 任何状态；`apply` 承载副作用。配置中的 dom_read/dom_write 标志置位时，
/// 执行会路由到远程渲染器，本地 `test`/`apply` 不会被调用。
#[async_trait]
pub trait Plugin: Send + Sync {
    /// 插件注册名
    fn name(&self) -> &'static str;

    /// 插件配置
    fn opts(&self) -> &PluginOpts;

    /// 判定插件是否适用于当前(项目,资源)对
    async fn test(
        &self,
        project: &Project,
        resource: Option<&Resource>,
    ) -> Result<bool, PluginError>;

    /// 对当前(项目,资源)对执行插件
    async fn apply(
        &self,
        project: &Project,
        resource: Option<&Resource>,
        browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError>;
}
