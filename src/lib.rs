// ==========================================
// OpenSILEX 事件导入 - 核心库
// ==========================================
// 功能: 事件 CSV 的校验与导入（校验 → 提交两步流程）
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与校验结果
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - CSV 校验管道
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域
pub use domain::{
    CsvCell, CsvValidationModel, EventKind, EventModel, MoveModel, PositionModel, ResponseStatus,
};

// 导入
pub use importer::{
    CachedCsvImporter, CsvImporter, EventCsvImportService, EventCsvImporter, ImportError,
    ValidationCache,
};

// API
pub use api::{ApiError, CsvValidationResponse, EventImportApi};

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 名称
pub const APP_NAME: &str = "OpenSILEX 事件导入";
