// ==========================================
// OpenSILEX 事件导入 - 带校验缓存的导入器
// ==========================================
// 职责: 校验 → 提交两步流程中避免重复解析
// 缓存: CRC32(文件字节) → {校验结果, 令牌}，容量 + 写入后 TTL 淘汰
// 流程:
// - 未命中: 委托导入；无错误时签发新令牌，仅校验结果写入缓存
// - 命中 + 仅校验: 直接返回缓存结果（同一令牌，不重新解析）
// - 命中 + 提交: 令牌必须一致；一致则移除条目（单次使用）并直接落库缓存草稿
// - 条目过期/被淘汰: 按未命中处理（静默重新校验，签发新令牌）
// ==========================================

use crate::domain::event::EventModel;
use crate::domain::types::EventKind;
use crate::domain::validation::CsvValidationModel;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::CsvImporter;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 缓存 TTL 上限（moka 拒绝超过 1000 年的 TTL）
const MAX_CACHE_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// 文件校验和
pub fn checksum(file: &[u8]) -> u32 {
    crc32fast::hash(file)
}

// ==========================================
// ValidationToken - 校验令牌
// ==========================================
// 非安全令牌，仅用于将提交请求关联到一次校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl ValidationToken {
    /// 签发新令牌
    pub fn generate(ttl: Duration) -> Self {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value: Uuid::new_v4().to_string(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// 缓存条目
#[derive(Debug, Clone)]
struct CachedValidation {
    validation: CsvValidationModel,
    token: ValidationToken,
}

// ==========================================
// ValidationCache - 进程级校验缓存
// ==========================================
// Clone 共享同一底层缓存
#[derive(Clone)]
pub struct ValidationCache {
    inner: Cache<u32, Arc<CachedValidation>>,
    ttl: Duration,
}

impl ValidationCache {
    /// 创建缓存
    ///
    /// # 参数
    /// - max_entries: 最大条目数
    /// - ttl: 写入后过期时间（同时作为令牌有效期，超过一年按一年计）
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let ttl = ttl.min(MAX_CACHE_TTL);
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 当前条目数（先执行挂起的淘汰任务）
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    /// 是否存在未过期的条目
    pub fn contains(&self, file: &[u8]) -> bool {
        self.inner.contains_key(&checksum(file))
    }

    fn get(&self, key: u32) -> Option<Arc<CachedValidation>> {
        self.inner.get(&key)
    }

    fn insert(&self, key: u32, entry: CachedValidation) {
        self.inner.insert(key, Arc::new(entry));
    }

    /// 仅在无条目时写入，返回最终留在缓存中的条目
    fn get_or_insert(&self, key: u32, entry: CachedValidation) -> Arc<CachedValidation> {
        self.inner
            .entry(key)
            .or_insert_with(|| Arc::new(entry))
            .into_value()
    }

    fn remove(&self, key: u32) -> Option<Arc<CachedValidation>> {
        self.inner.remove(&key)
    }
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(300))
    }
}

// ==========================================
// CachedCsvImporter
// ==========================================
// 每个请求新建一个（携带调用方令牌），缓存跨请求共享
pub struct CachedCsvImporter<D: CsvImporter> {
    delegate: Arc<D>,
    cache: ValidationCache,
    token: Option<String>,
}

impl<D: CsvImporter> CachedCsvImporter<D> {
    /// 创建导入器
    ///
    /// # 参数
    /// - delegate: 实际执行校验/落库的导入器
    /// - cache: 共享校验缓存
    /// - token: 提交时调用方出示的令牌（仅校验时可为 None）
    pub fn new(delegate: Arc<D>, cache: ValidationCache, token: Option<String>) -> Self {
        Self {
            delegate,
            cache,
            token,
        }
    }

    /// 未命中: 委托导入，无错误时签发令牌
    async fn import_on_miss(
        &self,
        key: u32,
        file: &[u8],
        validate_only: bool,
    ) -> ImportResult<CsvValidationModel> {
        let mut validation = self.delegate.import_csv(file, validate_only).await?;
        if validation.has_errors() {
            return Ok(validation);
        }

        let token = ValidationToken::generate(self.cache.ttl());
        validation.set_validation_token(token.value());

        // 已落库的结果不缓存，避免同一令牌重复提交
        if !validate_only {
            return Ok(validation);
        }

        // 并发校验同一文件时保留先写入的条目，所有调用方拿到同一令牌
        let minted = token.value().to_string();
        let entry = self
            .cache
            .get_or_insert(key, CachedValidation { validation, token });
        if entry.token.value() == minted {
            debug!(checksum = key, "校验结果已缓存");
        } else {
            debug!(checksum = key, "同一文件已由并发请求缓存，沿用其令牌");
        }
        Ok(entry.validation.clone())
    }

    /// 命中 + 提交: 校验令牌后直接落库缓存草稿
    async fn commit_cached(
        &self,
        key: u32,
        file: &[u8],
        cached_token: &str,
    ) -> ImportResult<CsvValidationModel> {
        if self.token.as_deref() != Some(cached_token) {
            warn!(checksum = key, "提交令牌与缓存的校验结果不匹配");
            return Err(ImportError::InvalidValidationToken);
        }

        // remove 只会将条目交给一个调用方
        let entry = match self.cache.remove(key) {
            Some(entry) => entry,
            None => {
                debug!(checksum = key, "缓存条目已被消费或过期，重新校验");
                return self.import_on_miss(key, file, false).await;
            }
        };

        if entry.token.value() != cached_token {
            // 期间文件被重新校验并签发了新令牌
            self.cache.insert(key, entry.as_ref().clone());
            warn!(checksum = key, "缓存条目已更新，提交令牌失效");
            return Err(ImportError::InvalidValidationToken);
        }

        let mut validation = entry.validation.clone();
        let models = validation.take_objects();
        let count = self.delegate.commit_validated(models).await?;
        validation.set_nb_object_imported(count);

        info!(checksum = key, imported = count, "使用缓存的校验结果完成导入");
        Ok(validation)
    }
}

#[async_trait]
impl<D: CsvImporter> CsvImporter for CachedCsvImporter<D> {
    fn kind(&self) -> EventKind {
        self.delegate.kind()
    }

    async fn import_csv(&self, file: &[u8], validate_only: bool) -> ImportResult<CsvValidationModel> {
        let key = checksum(file);

        let cached = self.cache.get(key).filter(|entry| {
            if entry.token.is_expired() {
                self.cache.remove(key);
                return false;
            }
            true
        });

        match cached {
            None => self.import_on_miss(key, file, validate_only).await,
            Some(entry) if validate_only => {
                debug!(checksum = key, "命中校验缓存");
                Ok(entry.validation.clone())
            }
            Some(entry) => {
                let cached_token = entry.token.value().to_string();
                self.commit_cached(key, file, &cached_token).await
            }
        }
    }

    async fn commit_validated(&self, models: Vec<EventModel>) -> ImportResult<usize> {
        self.delegate.commit_validated(models).await
    }
}
