// ==========================================
// OpenSILEX 事件导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 校验缓存 =====

    /// 校验令牌有效期（缓存写入后过期时间）
    ///
    /// # 默认值
    /// - 300 秒
    async fn get_validation_token_ttl(&self) -> ConfigResult<Duration>;

    /// 校验缓存最大条目数
    ///
    /// # 默认值
    /// - 1000
    async fn get_validation_cache_max_entries(&self) -> ConfigResult<u64>;

    // ===== CSV 格式 =====

    /// CSV 分隔符
    ///
    /// # 返回
    /// - None: 自动探测
    /// - Some(b): 固定分隔符
    ///
    /// # 默认值
    /// - auto
    async fn get_csv_delimiter(&self) -> ConfigResult<Option<u8>>;

    // ===== URI 生成 =====

    /// 事件 URI 前缀（CSV 未提供 URI 时以 前缀 + UUID 生成）
    ///
    /// # 默认值
    /// - http://www.opensilex.org/id/event/
    async fn get_event_uri_prefix(&self) -> ConfigResult<String>;
}
