// ==========================================
// OpenSILEX 事件导入 - 领域模型层
// ==========================================
// 职责: 定义事件实体、校验结果、基础类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod event;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use event::{EventModel, MoveModel, PositionModel};
pub use types::{EventKind, ResponseStatus};
pub use validation::{CsvCell, CsvValidationModel, DuplicateUriError};
