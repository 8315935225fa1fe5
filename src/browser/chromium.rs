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
use crate::config::settings::BrowserSettings;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Chromium渲染器客户端
///
/// 基于chromiumoxide实现的渲染器会话。一个客户端持有一个浏览器实例和
/// 一个页面，作为整个作业共享的会话；DOM插件在该页面的 window 上保留
/// 各自的远程实例状态，会话关闭后状态随之销毁，不会泄漏到下一个会话。
pub struct ChromiumClient {
    settings: BrowserSettings,
    session: Mutex<Option<Session>>,
    launched: AtomicBool,
}

struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumClient {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            session: Mutex::new(None),
            launched: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BrowserClient for ChromiumClient {
    /// 启动渲染器会话
    ///
    /// 已启动时直接返回。配置了远程调试地址时连接既有Chrome实例，
    /// 否则启动本地实例。
    async fn launch(&self) -> Result<(), BrowserError> {
        let mut guard = self.session.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let timeout = Duration::from_secs(self.settings.request_timeout.unwrap_or(30));

        let (browser, mut handler) = if let Some(url) = &self.settings.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url)
                .await
                .map_err(|e| BrowserError::Cdp(format!("Failed to connect to remote Chrome: {e}")))?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(timeout);

            if !self.settings.headless {
                builder = builder.with_head();
            }

            builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

            Browser::launch(builder.build().map_err(BrowserError::Cdp)?)
                .await
                .map_err(|e| BrowserError::Cdp(e.to_string()))?
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;

        *guard = Some(Session {
            browser,
            page,
            handler_task,
        });
        self.launched.store(true, Ordering::SeqCst);
        info!("Renderer session launched");

        Ok(())
    }

    fn is_launched(&self) -> bool {
        self.launched.load(Ordering::SeqCst)
    }

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(BrowserError::NotLaunched)?;

        session
            .page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;
        session
            .page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Cdp(e.to_string()))?;

        Ok(())
    }

    async fn evaluate(&self, code: &str) -> Result<Value, BrowserError> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(BrowserError::NotLaunched)?;

        let result = session
            .page
            .evaluate(code)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        // undefined 没有JSON对应物，按 null 处理
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            session
                .browser
                .close()
                .await
                .map_err(|e| BrowserError::Cdp(e.to_string()))?;
            session.handler_task.abort();
        }
        self.launched.store(false, Ordering::SeqCst);
        info!("Renderer session closed");

        Ok(())
    }
}
