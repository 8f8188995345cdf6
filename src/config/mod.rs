// ==========================================
// OpenSILEX 事件导入 - 配置层
// ==========================================
// 职责: 导入流程配置管理（缓存、CSV 格式、URI 生成）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager};
pub use import_config_trait::{ConfigResult, ImportConfigReader};
