// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use silex_event_import::config::{ConfigResult, ImportConfigReader};
use std::time::Duration;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub token_ttl: Duration,
    pub cache_max_entries: u64,
    pub csv_delimiter: Option<u8>,
    pub event_uri_prefix: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(300),
            cache_max_entries: 1000,
            csv_delimiter: None,
            event_uri_prefix: "http://test.opensilex.org/id/event/".to_string(),
        }
    }
}

impl MockConfig {
    /// 固定分隔符
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            csv_delimiter: Some(delimiter),
            ..Self::default()
        }
    }

    /// 短有效期（用于过期场景）
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            token_ttl: ttl,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_validation_token_ttl(&self) -> ConfigResult<Duration> {
        Ok(self.token_ttl)
    }

    async fn get_validation_cache_max_entries(&self) -> ConfigResult<u64> {
        Ok(self.cache_max_entries)
    }

    async fn get_csv_delimiter(&self) -> ConfigResult<Option<u8>> {
        Ok(self.csv_delimiter)
    }

    async fn get_event_uri_prefix(&self) -> ConfigResult<String> {
        Ok(self.event_uri_prefix.clone())
    }
}
