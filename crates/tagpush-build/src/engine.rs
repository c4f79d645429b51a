//! イメージ操作の抽象化
//!
//! リリースパイプラインが必要とする3つの操作（ビルド、タグ付け、プッシュ）を
//! トレイトとして切り出し、Docker デーモン実装を提供します。

use crate::auth::RegistryAuth;
use crate::builder::ImageBuilder;
use crate::context::ContextBuilder;
use crate::error::BuildResult;
use crate::progress::BuildProgress;
use crate::pusher::ImagePusher;
use async_trait::async_trait;
use bollard::Docker;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// ビルド要求
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    /// タグ付きの完全な参照
    pub reference: String,
    pub build_args: BTreeMap<String, String>,
    pub no_cache: bool,
}

/// イメージ操作のバックエンド
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Dockerfile からイメージをビルドし `request.reference` のタグを付ける
    async fn build(&self, request: &BuildRequest) -> BuildResult<()>;

    /// `source` に `repository:tag` の参照を追加する
    async fn tag(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()>;

    /// `repository:tag` をプッシュし、完全な参照を返す
    async fn push(&self, repository: &str, tag: &str) -> BuildResult<String>;
}

/// Docker デーモン（bollard）によるバックエンド
pub struct DockerEngine {
    builder: ImageBuilder,
    pusher: ImagePusher,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self {
            builder: ImageBuilder::new(docker.clone()),
            pusher: ImagePusher::new(docker),
        }
    }

    /// 認証情報マネージャーを指定して作成
    pub fn with_auth(docker: Docker, auth: RegistryAuth) -> Self {
        Self {
            builder: ImageBuilder::new(docker.clone()),
            pusher: ImagePusher::with_auth(docker, auth),
        }
    }
}

#[async_trait]
impl ImageEngine for DockerEngine {
    async fn build(&self, request: &BuildRequest) -> BuildResult<()> {
        let progress = BuildProgress::new("ビルドコンテキストを作成中...");
        let context_data =
            match ContextBuilder::create_context(&request.context, &request.dockerfile) {
                Ok(data) => {
                    progress.finish_success(&format!(
                        "ビルドコンテキスト作成完了 ({} KB)",
                        data.len() / 1024
                    ));
                    data
                }
                Err(e) => {
                    progress.finish_error(&e.to_string());
                    return Err(e);
                }
            };

        self.builder
            .build_image(
                context_data,
                &request.reference,
                &request.build_args,
                request.no_cache,
            )
            .await
    }

    async fn tag(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()> {
        self.builder.tag_image(source, repository, tag).await
    }

    async fn push(&self, repository: &str, tag: &str) -> BuildResult<String> {
        self.pusher.push(repository, tag).await
    }
}
