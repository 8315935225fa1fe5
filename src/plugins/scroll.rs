// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::browser::client::BrowserClient;
use crate::domain::models::plugin_opts::PluginOpts;
use crate::domain::models::project::Project;
use crate::domain::models::resource::Resource;
use crate::plugins::{ApplyResult, Plugin, PluginError};
use async_trait::async_trait;

pub const NAME: &str = "scroll";

/// 在渲染器内运行的实现。实例在一个渲染器会话内只创建一次，
/// 滚动计数随会话保留，跨多次调用持续累积。
pub const BUNDLE: &str = r#"
class ScrollPlugin {
  constructor(opts) {
    this.opts = opts || {};
    this.scroll_no = 0;
  }

  test(project, resource) {
    if (!resource) return false;
    // 动态子资源携带 scroll 动作时继续消费；静态资源只触发首轮
    if (resource.actions && resource.actions.length > 0) {
      return resource.actions.indexOf('scroll') !== -1;
    }
    return this.scroll_no === 0;
  }

  async apply(project, resource) {
    const maxScrollNo = this.opts.max_scroll_no !== undefined ? this.opts.max_scroll_no : 5;
    const delayMs = this.opts.delay_ms !== undefined ? this.opts.delay_ms : 1000;

    if (this.scroll_no >= maxScrollNo) {
      return { actions: [] };
    }

    const heightBefore = document.body.scrollHeight;
    window.scrollTo(0, document.body.scrollHeight);
    this.scroll_no += 1;
    await new Promise(resolve => setTimeout(resolve, delayMs));

    // 页面长高说明滚动带出了新内容，要求再走一遍流水线
    if (document.body.scrollHeight > heightBefore) {
      return { actions: ['scroll'] };
    }
    return { actions: [] };
  }
}
"#;

/// 滚动动作插件
///
/// 纯DOM写插件：本地侧只是占位，真正的实现是注入渲染器的远程包。
/// 滚动有效时返回的补丁带有非空 `actions`，把当前资源变成动态资源，
/// 驱动状态机派生子资源再次走完整条流水线。
pub struct ScrollPlugin {
    opts: PluginOpts,
}

impl ScrollPlugin {
    pub fn new(opts: PluginOpts) -> Self {
        Self { opts }
    }
}

#[async_trait]
impl Plugin for ScrollPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn opts(&self) -> &PluginOpts {
        &self.opts
    }

    // 只在渲染器内有意义，本地永不适用
    async fn test(
        &self,
        _project: &Project,
        _resource: Option<&Resource>,
    ) -> Result<bool, PluginError> {
        Ok(false)
    }

    async fn apply(
        &self,
        _project: &Project,
        _resource: Option<&Resource>,
        _browser: &dyn BrowserClient,
    ) -> Result<Option<ApplyResult>, PluginError> {
        Ok(None)
    }
}
