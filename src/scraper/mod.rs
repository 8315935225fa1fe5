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
use crate::confighash::{self, ConfigHashError};
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::Resource;
use crate::domain::repositories::{
    ProjectRepository, RepositoryError, ResourceRepository,
};
use crate::export::{self, ExportError, ExportOptions};
use crate::plugins::{ApplyResult, Plugin, PluginDeps, PluginError, PluginRegistry};
use crate::scenarios::{self, ScenarioError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// 远程执行桥
pub mod dom_bridge;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// 作业定义解码失败
    #[error("Invalid job definition: {0}")]
    Definition(#[from] ConfigHashError),
    /// 根URL无效
    #[error("Invalid project url: {0}")]
    Url(#[from] url::ParseError),
    /// 场景配置错误
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),
    /// 插件错误
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 渲染器错误
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
    /// 导出错误
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// 抓取作业定义
///
/// 可编码为不透明哈希在外部传递，解码后恢复为该结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeDefinition {
    pub url: String,
    pub scenario: String,
    #[serde(default)]
    pub plugin_opts: Vec<PluginOpts>,
}

/// 抓取输入
///
/// 既有项目、声明式作业定义或编码后的作业定义三者之一
#[derive(Debug, Clone)]
pub enum ScrapeInput {
    Project(Project),
    Definition(ScrapeDefinition),
    Hash(String),
}

/// 抓取编排器
///
/// 顶层循环：反复驱动状态机选取并抓取下一个资源，直到项目中再无
/// 未抓取的资源。协作者（存储、渲染器、插件注册表）作为显式上下文
/// 在构造时传入，不依赖环境全局状态。
///
/// 浏览器无关、存储无关：两者都只以契约形式出现。
pub struct Scraper<P, R>
where
    P: ProjectRepository + 'static,
    R: ResourceRepository + 'static,
{
    projects: Arc<P>,
    resources: Arc<R>,
    browser: Arc<dyn BrowserClient>,
    registry: Arc<PluginRegistry>,
    http: reqwest::Client,
}

impl<P, R> Scraper<P, R>
where
    P: ProjectRepository + 'static,
    R: ResourceRepository + 'static,
{
    /// 创建新的抓取编排器实例
    pub fn new(
        projects: Arc<P>,
        resources: Arc<R>,
        browser: Arc<dyn BrowserClient>,
        registry: Arc<PluginRegistry>,
    ) -> Self {
        Self {
            projects,
            resources,
            browser,
            registry,
            http: reqwest::Client::new(),
        }
    }

    fn plugin_deps(&self) -> PluginDeps {
        PluginDeps {
            resources: self.resources.clone(),
            http: self.http.clone(),
        }
    }

    /// 引导协作者，幂等
    ///
    /// 确保插件注册表已填充、存储后端已连通、渲染器会话已启动
    pub async fn pre_scrape(&self) -> Result<(), ScrapeError> {
        if self.registry.is_empty() {
            self.registry.init();
        }

        self.projects.ping().await?;

        if !self.browser.is_launched() {
            self.browser.launch().await?;
        }

        Ok(())
    }

    /// 将抓取输入解析为具体项目
    ///
    /// 新作业先解析场景默认配置与覆盖配置的合并结果，随项目一并落库，
    /// 并以根URL创建第一个未抓取资源作为起点
    pub async fn init_project(&self, input: ScrapeInput) -> Result<Project, ScrapeError> {
        let definition = match input {
            ScrapeInput::Project(project) => return Ok(project),
            ScrapeInput::Definition(definition) => definition,
            ScrapeInput::Hash(hash) => confighash::decode(&hash)?,
        };

        let plugin_opts = scenarios::resolve(&definition.scenario, &definition.plugin_opts)?;
        let project = Project::from_url(&definition.url, plugin_opts)?;
        let project = self.projects.create(&project).await?;

        self.resources
            .create(&Resource::new(project.id, &project.url, 0))
            .await?;

        info!("New project {} saved", project.name);
        Ok(project)
    }

    /// 运行一个完整的抓取作业
    ///
    /// 引导、项目解析与插件实例化中的任何失败都是致命的，在触碰任何
    /// 资源之前中止；进入循环后，单个资源的失败被封闭在该资源内，
    /// 循环继续处理其余资源。循环结束后无条件释放渲染器会话，
    /// 存储保持连接供后续导出使用。
    pub async fn run(&self, input: ScrapeInput) -> Result<Project, ScrapeError> {
        let project = match self.bootstrap(input).await {
            Ok(project) => project,
            Err(err) => {
                error!("Error during pre-scrape operations: {err}");
                return Err(err);
            }
        };

        let plugins = match self
            .registry
            .instantiate(&project.plugin_opts, &self.plugin_deps())
        {
            Ok(plugins) => plugins,
            Err(err) => {
                error!(
                    "Error instantiating plugin definitions for project {}: {err}",
                    project.name
                );
                return Err(err.into());
            }
        };

        info!(
            project = %project.name,
            plugins = plugins.len(),
            "Scraping project"
        );

        /*
        每次迭代都不带显式资源进入状态机，由链中的资源选取插件找出
        下一个未抓取的资源；状态机返回 None 即项目耗尽，循环停止
        */
        let loop_result = async {
            loop {
                if self
                    .scrape_resource(&project, &plugins, None)
                    .await?
                    .is_none()
                {
                    break Ok::<(), ScrapeError>(());
                }
            }
        }
        .await;

        let close_result = self.browser.close().await;
        if let Err(err) = &close_result {
            error!("Error releasing renderer session: {err}");
        }

        loop_result?;
        close_result?;

        Ok(project)
    }

    async fn bootstrap(&self, input: ScrapeInput) -> Result<Project, ScrapeError> {
        self.pre_scrape().await?;
        self.init_project(input).await
    }

    /// 资源抓取状态机
    ///
    /// 对当前(项目,资源)对按配置顺序执行全部插件：
    /// - 结果为空：无状态转移，继续下一个插件
    /// - 结果为完整资源：替换工作资源（资源选取插件由此引入资源）
    /// - 结果为补丁：逐字段合并到工作资源
    /// - 任一插件抛错：立即终止剩余链，为在途资源盖上抓取时间戳
    ///   （失败的资源只尝试一次，不会复选重试），错误上报后本资源
    ///   的抓取结束，外层循环继续
    ///
    /// 链结束后（无论成败）检查资源动作：动态资源派生仅携带
    /// url/depth/content_type/parent/actions 的子资源，落库后重新进入
    /// 状态机，一次调用每轮只产生一个动态子资源。
    pub async fn scrape_resource(
        &self,
        project: &Project,
        plugins: &[Box<dyn Plugin>],
        resource: Option<Resource>,
    ) -> Result<Option<Resource>, ScrapeError> {
        let mut current = resource;

        loop {
            match &current {
                Some(resource) if resource.is_dynamic() => info!(
                    project = %project.name,
                    url = %resource.url,
                    actions = ?resource.actions,
                    "Started re-scraping a dynamic resource"
                ),
                _ => info!(project = %project.name, "Started scraping a new resource"),
            }

            let mut chain_failed = false;
            for plugin in plugins {
                match self
                    .execute_plugin(project, current.as_ref(), plugin.as_ref())
                    .await
                {
                    // 插件未产出结果，继续下一个
                    Ok(None) => continue,
                    // 选出了新的静态资源
                    Ok(Some(ApplyResult::Resource(resource))) => current = Some(resource),
                    // 产出了待合并的新内容
                    Ok(Some(ApplyResult::Patch(patch))) => match current.take() {
                        Some(resource) => current = Some(resource.merged(patch)),
                        None => {
                            error!(
                                project = %project.name,
                                plugin = plugin.name(),
                                "{}",
                                PluginError::PatchWithoutResource(plugin.name().to_string())
                            );
                            chain_failed = true;
                            break;
                        }
                    },
                    Err(err) => {
                        error!(
                            project = %project.name,
                            plugin = plugin.name(),
                            url = current.as_ref().map(|r| r.url.as_str()).unwrap_or(""),
                            "Scrape error: {err}"
                        );

                        /*
                        为在途资源盖上抓取时间戳后，资源选取不会再选中它，
                        失败的资源不会陷入反复重试的循环
                        */
                        if let Some(resource) = current.take() {
                            current = Some(self.resources.update(&resource).await?);
                        }
                        chain_failed = true;
                        break;
                    }
                }
            }

            if !chain_failed {
                match &current {
                    Some(resource) => info!(url = %resource.url, "Resource successfully scraped"),
                    None => info!(project = %project.name, "No scrapable resource found"),
                }
            }

            /*
            动态资源：DOM动作（滚动、点击）修改了页面，派生子资源重新
            走一遍插件链，把新露出的内容也抓下来
            */
            if let Some(resource) = &current {
                if resource.is_dynamic() {
                    let child = self.resources.create(&resource.dynamic_child()).await?;
                    current = Some(child);
                    continue;
                }
            }

            /*
            本资源抓取完成。返回值可以是：
            - None（再无可抓取的资源，循环的停止条件）
            - 静态资源
            - 动作已耗尽的动态资源
            */
            return Ok(current);
        }
    }

    /// 插件执行流水线
    ///
    /// DOM标志置位的插件路由到远程桥执行，跳过本地 `test`；
    /// 其余插件先做适用性判定，不适用即无操作
    pub async fn execute_plugin(
        &self,
        project: &Project,
        resource: Option<&Resource>,
        plugin: &dyn Plugin,
    ) -> Result<Option<ApplyResult>, PluginError> {
        debug!(
            plugin = plugin.name(),
            url = resource.map(|r| r.url.as_str()).unwrap_or(""),
            "Executing plugin"
        );

        if plugin.opts().needs_dom() {
            return self.execute_plugin_in_dom(project, resource, plugin).await;
        }

        if plugin.test(project, resource).await? {
            return plugin.apply(project, resource, self.browser.as_ref()).await;
        }

        Ok(None)
    }

    /// 在远程渲染器中执行DOM插件
    ///
    /// DOM插件假定已有一个抓取中的资源，没有资源时直接无操作
    async fn execute_plugin_in_dom(
        &self,
        project: &Project,
        resource: Option<&Resource>,
        plugin: &dyn Plugin,
    ) -> Result<Option<ApplyResult>, PluginError> {
        let Some(resource) = resource else {
            return Ok(None);
        };

        let bundle = self.registry.bundle(plugin.name())?;
        let code = dom_bridge::build_execution_unit(plugin.opts(), bundle, project, resource);

        debug!(plugin = plugin.name(), "Injecting plugin in renderer session");
        let value = self.browser.evaluate(&code).await?;

        dom_bridge::parse_remote_result(plugin.name(), value)
    }

    /// 导出已完成项目的抓取结果
    ///
    /// 不支持的导出类型是配置错误：上报后忽略，不中断调用方
    pub async fn export(
        &self,
        project: &Project,
        path: &Path,
        opts: &ExportOptions,
    ) -> Result<(), ScrapeError> {
        let resources: Arc<dyn ResourceRepository> = self.resources.clone();
        export::export_project(resources, project, path, opts).await?;
        Ok(())
    }
}
