//! tagpush の設定管理
//!
//! `tagpush.kdl` の探索とパース、CLI 指定との優先順位解決を行います。

pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::*;

use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_ENV: &str = "TAGPUSH_CONFIG";

/// カレントディレクトリで探すファイル名（優先順）
pub const CONFIG_CANDIDATES: [&str; 4] = [
    "tagpush.local.kdl",
    ".tagpush.local.kdl",
    "tagpush.kdl",
    ".tagpush.kdl",
];

/// tagpush のグローバル設定ディレクトリ（~/.config/tagpush）
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("tagpush"))
        .ok_or_else(|| ConfigError::InvalidConfig("設定ディレクトリが見つかりません".to_string()))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 TAGPUSH_CONFIG (直接パス指定)
/// 2. カレントディレクトリ: tagpush.local.kdl, .tagpush.local.kdl, tagpush.kdl, .tagpush.kdl
/// 3. ~/.config/tagpush/tagpush.kdl (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::ExplicitConfigMissing(path));
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_config_file_in(&current_dir) {
        return Ok(path);
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("tagpush.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigNotFound)
}

/// 指定ディレクトリ内で設定ファイルを探す
pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// 設定ファイルを探して読み込む
///
/// どこにも見つからない場合は `Ok(None)`。CLI 引数だけで実行できるため、
/// ファイルが無いこと自体はエラーにしない。
pub fn load_config() -> Result<Option<PublishConfig>> {
    match find_config_file() {
        Ok(path) => {
            tracing::debug!("Loading config: {}", path.display());
            parse_config_file(&path).map(Some)
        }
        Err(ConfigError::ConfigNotFound) => {
            tracing::debug!("No tagpush config file found");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_config_file_in_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("tagpush.kdl"), "// base").unwrap();
        fs::write(temp_dir.path().join(".tagpush.local.kdl"), "// local").unwrap();

        let found = find_config_file_in(temp_dir.path()).unwrap();
        assert!(found.ends_with(".tagpush.local.kdl"));
    }

    #[test]
    fn test_find_config_file_in_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(find_config_file_in(temp_dir.path()).is_none());
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("tagpush.kdl"), "// test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_ENV, find_config_file);

        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("tagpush.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        let result = temp_env::with_var(CONFIG_ENV, Some(config_path.as_os_str()), || {
            find_config_file()
        });
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.kdl");

        let result =
            temp_env::with_var(CONFIG_ENV, Some(missing.as_os_str()), find_config_file);
        assert!(matches!(result, Err(ConfigError::ExplicitConfigMissing(_))));
    }

    #[test]
    #[serial]
    fn test_load_config_from_env_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("tagpush.kdl");
        fs::write(
            &config_path,
            r#"
registry "registry.example.com"
namespace "crawler"
image "capture-service"
"#,
        )
        .unwrap();

        let config = temp_env::with_var(CONFIG_ENV, Some(config_path.as_os_str()), load_config)
            .unwrap()
            .unwrap();
        assert_eq!(config.registry.as_deref(), Some("registry.example.com"));
        assert_eq!(config.source.as_deref(), Some(config_path.as_path()));
    }
}
