use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Tagging {reference} failed: {message}")]
    TagFailed { reference: String, message: String },

    #[error("Push of {reference} failed: {message}")]
    PushFailed { reference: String, message: String },

    #[error("Invalid tag: {tag}")]
    InvalidTag { tag: String },

    #[error("Authentication failed for {registry}: {message}")]
    AuthFailed { registry: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "Dockerfileが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. --dockerfile でパスを指定してください\n\
                     2. tagpush.kdl で明示的に指定してください:\n\
                        dockerfile \"Dockerfile.uv\"\n\
                     3. tagpush dockerfile <uv|requirements> で生成できます",
                    path.display()
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     --context または tagpush.kdl の context を確認してください。",
                    path.display()
                )
            }
            BuildError::BuildFailed(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。プッシュは実行されていません。",
                    msg
                )
            }
            BuildError::PushFailed { reference, message } => {
                format!(
                    "プッシュに失敗しました: {}\n理由: {}\n\
                     \n\
                     docker login でレジストリにログインしているか確認してください。\n\
                     先にプッシュ済みのタグはレジストリに残ります。",
                    reference, message
                )
            }
            BuildError::AuthFailed { registry, message } => {
                format!(
                    "レジストリ認証情報の取得に失敗しました: {}\n理由: {}\n\
                     \n\
                     ~/.docker/config.json または credential helper を確認してください。",
                    registry, message
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
