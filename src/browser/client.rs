// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// 渲染器错误类型
#[derive(Error, Debug)]
pub enum BrowserError {
    /// 会话尚未启动
    #[error("Renderer session not launched")]
    NotLaunched,
    /// CDP协议错误
    #[error("Renderer error: {0}")]
    Cdp(String),
    /// 代码求值失败
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// 渲染器客户端特质
///
/// 核心把渲染器当作一条不透明的代码执行通道：注入一段代码，拿回
/// JSON可序列化的结果或错误。会话是进程级单例，跨整个作业共享。
#[async_trait]
pub trait BrowserClient: Send + Sync {
    /// 启动渲染器会话，可重复调用
    async fn launch(&self) -> Result<(), BrowserError>;

    /// 会话是否已启动
    fn is_launched(&self) -> bool;

    /// 导航到指定URL
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// 在当前页面上下文中求值一段代码，返回JSON结果
    async fn evaluate(&self, code: &str) -> Result<Value, BrowserError>;

    /// 关闭渲染器会话
    async fn close(&self) -> Result<(), BrowserError>;
}
