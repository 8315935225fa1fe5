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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、渲染器、抓取作业与导出等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 渲染器配置
    pub browser: BrowserSettings,
    /// 抓取作业配置
    pub scrape: ScrapeSettings,
    /// 导出配置
    pub export: ExportSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 渲染器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 是否无头模式
    pub headless: bool,
    /// 远程调试地址（设置后连接既有Chrome实例而不是本地启动）
    pub remote_debugging_url: Option<String>,
    /// 请求超时时间（秒）
    pub request_timeout: Option<u64>,
}

/// 抓取作业配置设置
#[derive(Debug, Deserialize)]
pub struct ScrapeSettings {
    /// 根URL
    pub url: Option<String>,
    /// 场景名称
    pub scenario: String,
    /// 编码后的作业定义，设置时优先于 url/scenario
    pub hash: Option<String>,
}

/// 导出配置设置
#[derive(Debug, Deserialize)]
pub struct ExportSettings {
    /// 导出文件路径，未设置则不导出
    pub path: Option<String>,
    /// 导出类型 (csv, ndjson)
    pub export_type: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件与环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default DB pool settings
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default browser settings
            .set_default("browser.headless", true)?
            .set_default("browser.request_timeout", 30)?
            // Default scrape settings
            .set_default("scrape.scenario", "static-content")?
            // Default export settings
            .set_default("export.export_type", "csv")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HARVESTRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
