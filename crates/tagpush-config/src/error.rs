use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: tagpush.local.kdl, .tagpush.local.kdl, tagpush.kdl, .tagpush.kdl\n\
        - ~/.config/tagpush/tagpush.kdl\n\
        または TAGPUSH_CONFIG 環境変数で直接指定できます"
    )]
    ConfigNotFound,

    #[error("TAGPUSH_CONFIG で指定されたファイルが存在しません: {0}")]
    ExplicitConfigMissing(std::path::PathBuf),

    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] tagpush_core::CoreError),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
