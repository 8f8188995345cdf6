// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 文件数据库上的配置读写与持久化
// ==========================================


use silex_event_import::api::EventImportApi;
use silex_event_import::config::{config_keys, defaults, ConfigManager, ImportConfigReader};
use silex_event_import::logging;
use std::time::Duration;
use test_helpers::{create_test_db, insert_test_config, open_test_connection};

#[tokio::test]
async fn test_fresh_database_uses_defaults() {
    logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("config.db");
    let manager = ConfigManager::new(db_path.to_str().unwrap()).unwrap();

    assert_eq!(
        manager.get_validation_token_ttl().await.unwrap(),
        Duration::from_secs(defaults::VALIDATION_TOKEN_TTL_SECS)
    );
    assert_eq!(
        manager.get_validation_cache_max_entries().await.unwrap(),
        defaults::VALIDATION_CACHE_MAX_ENTRIES
    );
    assert_eq!(manager.get_csv_delimiter().await.unwrap(), None);
    assert_eq!(manager.get_event_uri_prefix().await.unwrap(), defaults::EVENT_URI_PREFIX);
    assert_eq!(manager.get_config_snapshot().unwrap(), "{}");
}

#[tokio::test]
async fn test_values_persist_across_instances() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    {
        let manager = ConfigManager::new(&db_path).unwrap();
        manager
            .set_config_value(config_keys::VALIDATION_TOKEN_TTL_SECS, "60")
            .unwrap();
        manager.set_config_value(config_keys::CSV_DELIMITER, ";").unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        manager.get_validation_token_ttl().await.unwrap(),
        Duration::from_secs(60)
    );
    assert_eq!(manager.get_csv_delimiter().await.unwrap(), Some(b';'));

    let snapshot: serde_json::Value =
        serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot[config_keys::CSV_DELIMITER], ";");
    assert_eq!(snapshot[config_keys::VALIDATION_TOKEN_TTL_SECS], "60");
}

#[tokio::test]
async fn test_invalid_values_fall_back() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_test_config(&conn, config_keys::VALIDATION_CACHE_MAX_ENTRIES, "many").unwrap();
        insert_test_config(&conn, config_keys::CSV_DELIMITER, "||").unwrap();
        insert_test_config(&conn, config_keys::EVENT_URI_PREFIX, "   ").unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        manager.get_validation_cache_max_entries().await.unwrap(),
        defaults::VALIDATION_CACHE_MAX_ENTRIES
    );
    assert_eq!(manager.get_csv_delimiter().await.unwrap(), None);
    assert_eq!(manager.get_event_uri_prefix().await.unwrap(), defaults::EVENT_URI_PREFIX);
}

#[tokio::test]
async fn test_get_config_or_default() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(manager.get_config_value("unknown_key").unwrap(), None);
    assert_eq!(
        manager.get_config_or_default("unknown_key", "fallback").unwrap(),
        "fallback"
    );
    manager.set_config_value("unknown_key", "set").unwrap();
    assert_eq!(
        manager.get_config_or_default("unknown_key", "fallback").unwrap(),
        "set"
    );
}

#[tokio::test]
async fn test_huge_token_ttl_does_not_break_api() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_test_config(&conn, config_keys::VALIDATION_TOKEN_TTL_SECS, "100000000000").unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        manager.get_validation_token_ttl().await.unwrap(),
        Duration::from_secs(defaults::VALIDATION_TOKEN_TTL_SECS)
    );

    let api = EventImportApi::new(&db_path).await;
    assert!(api.is_ok());
    assert_eq!(api.unwrap().count_events().await.unwrap(), 0);
}
