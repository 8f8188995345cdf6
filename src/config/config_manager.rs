// ==========================================
// OpenSILEX 事件导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 全局配置作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（确保 config_kv 表存在）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value,
                                                       updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取 global 作用域全部配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取数值配置，格式错误时告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

/// 解析分隔符配置
///
/// auto / 空 → None；"\t" 或 tab → 制表符；其余取单个 ASCII 字符
fn parse_delimiter(raw: &str) -> Option<u8> {
    let value = raw.trim_matches(|c: char| c == ' ' || c == '\n' || c == '\r');
    if value.is_empty() || value.eq_ignore_ascii_case("auto") {
        return None;
    }
    if value == "\\t" || value == "\t" || value.eq_ignore_ascii_case("tab") {
        return Some(b'\t');
    }

    match value.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => {
            tracing::warn!(raw_value = %raw, "分隔符配置无效，改为自动探测");
            None
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_validation_token_ttl(&self) -> ConfigResult<Duration> {
        let secs = self.get_parsed_or_default(
            config_keys::VALIDATION_TOKEN_TTL_SECS,
            defaults::VALIDATION_TOKEN_TTL_SECS,
        )?;

        // 超出上限时缓存构建会直接 panic，按格式错误处理
        if secs > defaults::MAX_VALIDATION_TOKEN_TTL_SECS {
            tracing::warn!(
                config_key = config_keys::VALIDATION_TOKEN_TTL_SECS,
                raw_value = secs,
                max = defaults::MAX_VALIDATION_TOKEN_TTL_SECS,
                default = defaults::VALIDATION_TOKEN_TTL_SECS,
                "令牌有效期超出上限，使用默认值"
            );
            return Ok(Duration::from_secs(defaults::VALIDATION_TOKEN_TTL_SECS));
        }
        Ok(Duration::from_secs(secs))
    }

    async fn get_validation_cache_max_entries(&self) -> ConfigResult<u64> {
        self.get_parsed_or_default(
            config_keys::VALIDATION_CACHE_MAX_ENTRIES,
            defaults::VALIDATION_CACHE_MAX_ENTRIES,
        )
    }

    async fn get_csv_delimiter(&self) -> ConfigResult<Option<u8>> {
        let value = self.get_config_or_default(config_keys::CSV_DELIMITER, defaults::CSV_DELIMITER)?;
        Ok(parse_delimiter(&value))
    }

    async fn get_event_uri_prefix(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::EVENT_URI_PREFIX, defaults::EVENT_URI_PREFIX)?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(defaults::EVENT_URI_PREFIX.to_string());
        }
        Ok(value.to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 校验缓存
    pub const VALIDATION_TOKEN_TTL_SECS: &str = "validation_token_ttl_secs";
    pub const VALIDATION_CACHE_MAX_ENTRIES: &str = "validation_cache_max_entries";

    // CSV 格式
    pub const CSV_DELIMITER: &str = "csv_delimiter";

    // URI 生成
    pub const EVENT_URI_PREFIX: &str = "event_uri_prefix";
}

/// 默认值
pub mod defaults {
    pub const VALIDATION_TOKEN_TTL_SECS: u64 = 300;
    pub const MAX_VALIDATION_TOKEN_TTL_SECS: u64 = 7 * 24 * 3600; // 7 天
    pub const VALIDATION_CACHE_MAX_ENTRIES: u64 = 1000;
    pub const CSV_DELIMITER: &str = "auto";
    pub const EVENT_URI_PREFIX: &str = "http://www.opensilex.org/id/event/";
}
