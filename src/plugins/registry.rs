// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::plugin_opts::PluginOpts;
use crate::plugins::{
    browser_fetch, browser_fetch::BrowserFetchPlugin, extract_html_content,
    extract_html_content::ExtractHtmlContentPlugin, extract_urls, extract_urls::ExtractUrlsPlugin,
    fetch, fetch::FetchPlugin, insert_resources, insert_resources::InsertResourcesPlugin, scroll,
    scroll::ScrollPlugin, select_resource, select_resource::SelectResourcePlugin, upsert_resource,
    upsert_resource::UpsertResourcePlugin, Plugin, PluginDeps, PluginError,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// 插件构造器
pub type PluginConstructor = Arc<dyn Fn(PluginOpts, &PluginDeps) -> Box<dyn Plugin> + Send + Sync>;

/// 插件注册项
///
/// 本地构造器，以及可选的远程可执行包（DOM插件在渲染器内的对应实现）
#[derive(Clone)]
pub struct PluginRegistration {
    pub constructor: PluginConstructor,
    pub bundle: Option<&'static str>,
}

/// 插件注册表
///
/// 名称到构造器的映射。未知插件名是显式的失败模式，而不是静默跳过。
#[derive(Default)]
pub struct PluginRegistry {
    entries: DashMap<String, PluginRegistration>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册表是否为空（尚未初始化）
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已注册插件数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 注册全部内置插件
    ///
    /// 可重复调用，重复注册会原样覆盖
    pub fn init(&self) {
        self.register(
            select_resource::NAME,
            Arc::new(|opts, deps| {
                Box::new(SelectResourcePlugin::new(opts, deps.resources.clone()))
            }),
            None,
        );
        self.register(
            fetch::NAME,
            Arc::new(|opts, deps| Box::new(FetchPlugin::new(opts, deps.http.clone()))),
            None,
        );
        self.register(
            browser_fetch::NAME,
            Arc::new(|opts, _deps| Box::new(BrowserFetchPlugin::new(opts))),
            None,
        );
        self.register(
            extract_urls::NAME,
            Arc::new(|opts, _deps| Box::new(ExtractUrlsPlugin::new(opts))),
            Some(extract_urls::BUNDLE),
        );
        self.register(
            extract_html_content::NAME,
            Arc::new(|opts, _deps| Box::new(ExtractHtmlContentPlugin::new(opts))),
            Some(extract_html_content::BUNDLE),
        );
        self.register(
            scroll::NAME,
            Arc::new(|opts, _deps| Box::new(ScrollPlugin::new(opts))),
            Some(scroll::BUNDLE),
        );
        self.register(
            insert_resources::NAME,
            Arc::new(|opts, deps| {
                Box::new(InsertResourcesPlugin::new(opts, deps.resources.clone()))
            }),
            None,
        );
        self.register(
            upsert_resource::NAME,
            Arc::new(|opts, deps| {
                Box::new(UpsertResourcePlugin::new(opts, deps.resources.clone()))
            }),
            None,
        );

        info!(
            "Plugin registry initialized, {} plugins registered",
            self.len()
        );
    }

    /// 注册一个插件
    pub fn register(
        &self,
        name: &str,
        constructor: PluginConstructor,
        bundle: Option<&'static str>,
    ) {
        self.entries
            .insert(name.to_string(), PluginRegistration { constructor, bundle });
    }

    /// 获取插件的远程执行包
    pub fn bundle(&self, name: &str) -> Result<&'static str, PluginError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;
        entry
            .bundle
            .ok_or_else(|| PluginError::MissingBundle(name.to_string()))
    }

    /// 按配置列表实例化插件
    ///
    /// 任一名称未注册即整体失败，不产出部分插件列表
    pub fn instantiate(
        &self,
        opts_list: &[PluginOpts],
        deps: &PluginDeps,
    ) -> Result<Vec<Box<dyn Plugin>>, PluginError> {
        opts_list
            .iter()
            .map(|opts| {
                let entry = self
                    .entries
                    .get(&opts.name)
                    .ok_or_else(|| PluginError::UnknownPlugin(opts.name.clone()))?;
                Ok((entry.constructor)(opts.clone(), deps))
            })
            .collect()
    }
}
