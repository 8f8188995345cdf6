// ==========================================
// OpenSILEX 事件导入 - 事件 Repository Trait
// ==========================================
// 职责: 定义事件存储接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::event::EventModel;
use crate::domain::types::EventKind;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::collections::HashSet;

// ==========================================
// EventRepository Trait
// ==========================================
// 实现者: EventRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// 写入单个事件（URI 必须已生成）
    async fn create(&self, kind: EventKind, event: &EventModel) -> RepositoryResult<()>;

    /// 批量写入事件（单事务，任一失败整体回滚）
    ///
    /// # 返回
    /// - Ok(usize): 写入的事件数
    async fn create_many(&self, kind: EventKind, events: &[EventModel]) -> RepositoryResult<usize>;

    /// 返回给定 URI 中已存在于存储的部分
    async fn existing_uris(&self, uris: &[String]) -> RepositoryResult<HashSet<String>>;

    /// 按 URI 查询事件（含关联对象与移动信息）
    async fn get_by_uri(&self, uri: &str) -> RepositoryResult<Option<EventModel>>;

    /// 事件总数
    async fn count_events(&self) -> RepositoryResult<usize>;
}
