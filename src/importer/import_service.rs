// ==========================================
// OpenSILEX 事件导入 - 导入服务
// ==========================================
// 职责: 编排 单文件校验 → URI 冲突检查 → URI 生成 → 事务落库
// 依赖: EventRepository（存储）、ImportConfigReader（配置）
// ==========================================

use crate::config::config_manager::config_keys;
use crate::config::ImportConfigReader;
use crate::domain::event::EventModel;
use crate::domain::types::EventKind;
use crate::domain::validation::{CsvCell, CsvValidationModel};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::event_csv_importer::EventCsvImporter;
use crate::importer::event_schema::EventSchema;
use crate::importer::importer_trait::CsvImporter;
use crate::importer::row_validator::URI_COLUMN;
use crate::repository::EventRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// EventCsvImportService
// ==========================================
pub struct EventCsvImportService<R, C>
where
    R: EventRepository,
    C: ImportConfigReader,
{
    repository: Arc<R>,
    config: Arc<C>,
    schema: Arc<dyn EventSchema>,
    creator: String,
}

impl<R, C> EventCsvImportService<R, C>
where
    R: EventRepository,
    C: ImportConfigReader,
{
    /// 创建导入服务
    ///
    /// # 参数
    /// - repository: 事件仓储
    /// - config: 配置读取器
    /// - schema: 事件类别
    /// - creator: 创建人 URI（附加到每个草稿）
    pub fn new(
        repository: Arc<R>,
        config: Arc<C>,
        schema: Arc<dyn EventSchema>,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            config,
            schema,
            creator: creator.into(),
        }
    }

    async fn read_delimiter(&self) -> ImportResult<Option<u8>> {
        self.config
            .get_csv_delimiter()
            .await
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::CSV_DELIMITER.to_string(),
                message: e.to_string(),
            })
    }

    async fn read_uri_prefix(&self) -> ImportResult<String> {
        self.config
            .get_event_uri_prefix()
            .await
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::EVENT_URI_PREFIX.to_string(),
                message: e.to_string(),
            })
    }

    /// 解析并校验文件（同步，不跨 await 持有读取器）
    fn parse_file(
        &self,
        file: &[u8],
        validate_only: bool,
        delimiter: Option<u8>,
    ) -> ImportResult<(CsvValidationModel, Vec<EventModel>)> {
        let mut importer =
            EventCsvImporter::new(file, Arc::clone(&self.schema), self.creator.as_str(), delimiter)?
                .with_retained_drafts();
        importer.read_file(validate_only)?;

        let (validation, models) = importer.into_parts();
        if validate_only {
            // 仅校验模式的草稿保留在 validation.objects 中
            let retained = validation.objects().to_vec();
            return Ok((validation, retained));
        }
        Ok((validation, models))
    }

    /// 检查文件内重复 URI 与存储中已存在的 URI
    async fn check_uris(
        &self,
        models: &[EventModel],
        validation: &mut CsvValidationModel,
    ) -> ImportResult<()> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut candidates = Vec::new();

        for model in models {
            let uri = match model.uri.as_deref() {
                Some(u) => u,
                None => continue,
            };
            match first_seen.get(uri) {
                Some(previous_row) => {
                    validation.add_duplicate_uri_error(
                        CsvCell::new(model.row_index, 0, Some(uri.to_string()), URI_COLUMN),
                        *previous_row,
                    );
                }
                None => {
                    first_seen.insert(uri, model.row_index);
                    candidates.push(uri.to_string());
                }
            }
        }

        if candidates.is_empty() {
            return Ok(());
        }

        let existing = self.repository.existing_uris(&candidates).await?;
        for uri in &candidates {
            if existing.contains(uri) {
                let row_index = first_seen.get(uri.as_str()).copied().unwrap_or_default();
                validation.add_already_existing_uri_error(CsvCell::new(
                    row_index,
                    0,
                    Some(uri.clone()),
                    URI_COLUMN,
                ));
            }
        }

        debug!(
            checked = candidates.len(),
            existing = existing.len(),
            "URI 冲突检查完成"
        );
        Ok(())
    }
}

/// 为缺少 URI 的草稿生成 URI（前缀 + UUID）
pub fn assign_missing_uris(models: &mut [EventModel], prefix: &str) -> usize {
    let mut generated = 0;
    for model in models.iter_mut().filter(|m| m.uri.is_none()) {
        model.uri = Some(format!("{}{}", prefix, Uuid::new_v4()));
        generated += 1;
    }
    generated
}

#[async_trait]
impl<R, C> CsvImporter for EventCsvImportService<R, C>
where
    R: EventRepository,
    C: ImportConfigReader,
{
    fn kind(&self) -> EventKind {
        self.schema.kind()
    }

    #[instrument(skip(self, file), fields(kind = %self.schema.kind(), bytes = file.len()))]
    async fn import_csv(&self, file: &[u8], validate_only: bool) -> ImportResult<CsvValidationModel> {
        let delimiter = self.read_delimiter().await?;
        let (mut validation, models) = self.parse_file(file, validate_only, delimiter)?;

        if validation.has_errors() {
            info!(errors = validation.error_count(), "CSV 校验未通过");
            return Ok(validation);
        }

        self.check_uris(&models, &mut validation).await?;
        if validation.has_errors() {
            info!(errors = validation.error_count(), "URI 冲突检查未通过");
            return Ok(validation);
        }

        if validate_only {
            info!(rows = models.len(), "CSV 校验通过");
            return Ok(validation);
        }

        let count = self.commit_validated(models).await?;
        validation.set_nb_object_imported(count);
        Ok(validation)
    }

    async fn commit_validated(&self, mut models: Vec<EventModel>) -> ImportResult<usize> {
        if models.is_empty() {
            return Ok(0);
        }

        let prefix = self.read_uri_prefix().await?;
        let generated = assign_missing_uris(&mut models, &prefix);

        let count = self
            .repository
            .create_many(self.schema.kind(), &models)
            .await?;

        info!(
            kind = %self.schema.kind(),
            imported = count,
            generated_uris = generated,
            "事件导入完成"
        );
        Ok(count)
    }
}
