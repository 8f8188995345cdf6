// ==========================================
// OpenSILEX 事件导入 - 导入层
// ==========================================
// 职责: CSV → 事件草稿 的校验与导入管道
// 流程:
// 1. CSV 行读取（分隔符探测）
// 2. 表头校验
// 3. 逐行校验（通用列 + 类别扩展列）
// 4. URI 冲突检查 + 事务落库
// 5. 校验 → 提交两步流程的结果缓存
// ==========================================

pub mod cached_importer;
pub mod csv_reader;
pub mod error;
pub mod event_csv_importer;
pub mod event_schema;
pub mod header_validator;
pub mod import_service;
pub mod importer_trait;
pub mod row_validator;

// 重导出核心类型
pub use cached_importer::{checksum, CachedCsvImporter, ValidationCache, ValidationToken};
pub use csv_reader::{detect_delimiter, CsvRowReader};
pub use error::{ImportError, ImportResult};
pub use event_csv_importer::{EventCsvImporter, ImportPhase, ROWS_BEGIN_IDX};
pub use event_schema::{schema_for, BasicEventSchema, EventSchema, MoveEventSchema, EVENT_HEADER, MOVE_HEADER};
pub use header_validator::validate_header;
pub use import_service::EventCsvImportService;
pub use importer_trait::CsvImporter;
pub use row_validator::{validate_row, ColumnCursor};
