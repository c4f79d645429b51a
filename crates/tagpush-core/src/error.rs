use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("不正なイメージ参照です: '{reference}'\n理由: {reason}")]
    InvalidImageRef { reference: String, reason: String },

    #[error("不明な Dockerfile バリアントです: '{0}' (uv, requirements のいずれか)")]
    UnknownVariant(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
