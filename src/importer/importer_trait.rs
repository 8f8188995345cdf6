// ==========================================
// OpenSILEX 事件导入 - CSV 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// 实现者: EventCsvImportService（直接导入）、CachedCsvImporter（带校验缓存）
// ==========================================

use crate::domain::event::EventModel;
use crate::domain::types::EventKind;
use crate::domain::validation::CsvValidationModel;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// CsvImporter Trait
// ==========================================
#[async_trait]
pub trait CsvImporter: Send + Sync {
    /// 导入的事件类别
    fn kind(&self) -> EventKind;

    /// 校验（并在非仅校验模式下落库）一个 CSV 文件
    ///
    /// # 参数
    /// - file: 文件原始字节
    /// - validate_only: true = 仅校验
    ///
    /// # 返回
    /// - Ok(CsvValidationModel): 软错误汇总；仅校验且无错误时 objects 中保留草稿
    /// - Err: 硬错误（I/O、URI 格式、令牌、数据库）
    async fn import_csv(&self, file: &[u8], validate_only: bool) -> ImportResult<CsvValidationModel>;

    /// 直接落库已校验的草稿（跳过重新解析）
    ///
    /// # 返回
    /// - Ok(usize): 落库条数
    async fn commit_validated(&self, models: Vec<EventModel>) -> ImportResult<usize>;
}
