// ==========================================
// OpenSILEX 事件导入 - 事件导入API
// ==========================================
// 职责: 封装 校验 / 导入 两步流程（通用事件、移动事件）
// 状态: 每个事件类别一个进程级校验缓存，随 API 实例存活
// 响应: Ok（校验通过）/ Created（已落库）/ BadRequest（存在软错误）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::event::EventModel;
use crate::domain::types::{EventKind, ResponseStatus};
use crate::domain::validation::CsvValidationModel;
use crate::importer::{
    schema_for, CachedCsvImporter, CsvImporter, EventCsvImportService, ValidationCache,
};
use crate::repository::{EventRepository, EventRepositoryImpl};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// 校验/导入响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvValidationDto {
    /// 单元格级错误汇总
    pub errors: CsvValidationModel,
    /// 校验通过时签发的令牌（提交时回传）
    pub validation_token: Option<String>,
    /// 落库的事件数
    pub nb_lines_imported: usize,
}

/// 校验/导入响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvValidationResponse {
    pub status: ResponseStatus,
    pub body: CsvValidationDto,
}

impl CsvValidationResponse {
    fn from_validation(validation: CsvValidationModel, validate_only: bool) -> Self {
        let status = if validation.has_errors() {
            ResponseStatus::BadRequest
        } else if validate_only {
            ResponseStatus::Ok
        } else {
            ResponseStatus::Created
        };

        Self {
            status,
            body: CsvValidationDto {
                validation_token: validation.validation_token().map(String::from),
                nb_lines_imported: validation.nb_object_imported(),
                errors: validation,
            },
        }
    }
}

/// 事件导入API
pub struct EventImportApi {
    repository: Arc<EventRepositoryImpl>,
    config: Arc<ConfigManager>,
    event_cache: ValidationCache,
    move_cache: ValidationCache,
}

impl EventImportApi {
    /// 打开数据库并创建API实例（自动建表）
    pub async fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Self::from_connection(Arc::new(Mutex::new(conn))).await
    }

    /// 从已建表的连接创建API实例
    pub async fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = Arc::new(
            ConfigManager::from_connection(Arc::clone(&conn))
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        );
        let repository = Arc::new(EventRepositoryImpl::from_connection(conn));

        let ttl = config
            .get_validation_token_ttl()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let max_entries = config
            .get_validation_cache_max_entries()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        info!(
            ttl_secs = ttl.as_secs(),
            max_entries = max_entries,
            "事件导入API初始化完成"
        );

        Ok(Self {
            repository,
            config,
            event_cache: ValidationCache::new(max_entries, ttl),
            move_cache: ValidationCache::new(max_entries, ttl),
        })
    }

    // ===== 通用事件 =====

    /// 校验通用事件 CSV（不落库）
    pub async fn validate_event_csv(&self, file: &[u8], creator: &str) -> ApiResult<CsvValidationResponse> {
        self.run(EventKind::Event, file, creator, None, true).await
    }

    /// 导入通用事件 CSV
    ///
    /// # 参数
    /// - token: 先前校验返回的令牌（None 时完整校验后落库）
    pub async fn import_event_csv(
        &self,
        file: &[u8],
        creator: &str,
        token: Option<&str>,
    ) -> ApiResult<CsvValidationResponse> {
        self.run(EventKind::Event, file, creator, token, false).await
    }

    // ===== 移动事件 =====

    /// 校验移动事件 CSV（不落库）
    pub async fn validate_move_csv(&self, file: &[u8], creator: &str) -> ApiResult<CsvValidationResponse> {
        self.run(EventKind::Move, file, creator, None, true).await
    }

    /// 导入移动事件 CSV
    pub async fn import_move_csv(
        &self,
        file: &[u8],
        creator: &str,
        token: Option<&str>,
    ) -> ApiResult<CsvValidationResponse> {
        self.run(EventKind::Move, file, creator, token, false).await
    }

    // ===== 查询 =====

    /// 按 URI 查询已导入事件
    pub async fn get_event(&self, uri: &str) -> ApiResult<Option<EventModel>> {
        Ok(self.repository.get_by_uri(uri).await?)
    }

    /// 已导入事件总数
    pub async fn count_events(&self) -> ApiResult<usize> {
        Ok(self.repository.count_events().await?)
    }

    fn cache_for(&self, kind: EventKind) -> &ValidationCache {
        match kind {
            EventKind::Event => &self.event_cache,
            EventKind::Move => &self.move_cache,
        }
    }

    async fn run(
        &self,
        kind: EventKind,
        file: &[u8],
        creator: &str,
        token: Option<&str>,
        validate_only: bool,
    ) -> ApiResult<CsvValidationResponse> {
        if creator.trim().is_empty() {
            return Err(ApiError::InvalidInput("创建人 URI 不能为空".to_string()));
        }

        let service = EventCsvImportService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.config),
            schema_for(kind),
            creator,
        );
        let importer = CachedCsvImporter::new(
            Arc::new(service),
            self.cache_for(kind).clone(),
            token.map(String::from),
        );

        let validation = importer.import_csv(file, validate_only).await?;
        let response = CsvValidationResponse::from_validation(validation, validate_only);

        info!(
            kind = %kind,
            validate_only = validate_only,
            status = ?response.status,
            errors = response.body.errors.error_count(),
            imported = response.body.nb_lines_imported,
            "CSV 请求处理完成"
        );
        Ok(response)
    }
}
