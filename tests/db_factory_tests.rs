//! Tests for repository factory and configuration file support.

use std::io::Write;

use ouribadah::db::repo_config::RepositoryConfig;
use ouribadah::db::{RepositoryBuilder, RepositoryFactory, RepositoryType};

#[tokio::test]
async fn test_factory_creates_local_repository() {
    let repo = RepositoryFactory::create_local();
    assert!(repo.health_check().await.is_ok());
}

#[tokio::test]
async fn test_builder_explicit_local() {
    let repo = RepositoryBuilder::new()
        .repository_type(RepositoryType::Local)
        .build()
        .await
        .unwrap();

    assert!(repo.health_check().await.is_ok());
}

#[tokio::test]
async fn test_factory_from_config_file_local() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.is_ok());
}

#[tokio::test]
async fn test_factory_rejects_missing_config_file() {
    let result = RepositoryFactory::from_config_file("/nonexistent/repository.toml").await;
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_unknown_repository_type() {
    let toml = r#"
[repository]
type = "sqlite"
"#;

    let config: RepositoryConfig = toml::from_str(toml).unwrap();
    assert!(config.repository_type().is_err());
}

#[test]
fn test_repository_type_parsing() {
    assert_eq!(
        "local".parse::<RepositoryType>().unwrap(),
        RepositoryType::Local
    );
    assert_eq!(
        "POSTGRES".parse::<RepositoryType>().unwrap(),
        RepositoryType::Postgres
    );
    assert!("mysql".parse::<RepositoryType>().is_err());
}
