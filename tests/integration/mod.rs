// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 集成测试
///
/// 针对SQLite内存库运行仓库与端到端抓取流程测试
mod helpers;
mod repositories;
mod scrape_flow_test;
