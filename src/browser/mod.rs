// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 渲染器会话实现（Chromium/CDP）
pub mod chromium;
/// 渲染器客户端契约
pub mod client;

pub use chromium::ChromiumClient;
pub use client::{BrowserClient, BrowserError};
