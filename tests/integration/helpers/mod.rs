// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use harvestrs::browser::client::{BrowserClient, BrowserError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 连接SQLite内存库并应用全部迁移
pub async fn test_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to connect to in-memory sqlite");
    Migrator::up(&db, None)
        .await
        .expect("failed to apply migrations");
    Arc::new(db)
}

/// 测试用渲染器桩：不做任何事，记录是否被关闭
#[derive(Default)]
pub struct StubBrowserClient {
    pub closed: AtomicBool,
}

#[async_trait]
impl BrowserClient for StubBrowserClient {
    async fn launch(&self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn is_launched(&self) -> bool {
        true
    }

    async fn goto(&self, _url: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn evaluate(&self, _code: &str) -> Result<Value, BrowserError> {
        Ok(Value::Null)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
