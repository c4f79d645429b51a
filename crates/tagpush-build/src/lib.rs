//! tagpush のイメージ公開処理
//!
//! ビルドコンテキストの作成、Docker デーモンでのイメージビルド、
//! タグ付け、レジストリへのプッシュ、そしてそれらを一直線に実行する
//! リリースパイプラインを提供します。

pub mod auth;
pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod progress;
pub mod publisher;
pub mod pusher;

pub use auth::RegistryAuth;
pub use builder::ImageBuilder;
pub use context::ContextBuilder;
pub use engine::{BuildRequest, DockerEngine, ImageEngine};
pub use error::{BuildError, BuildResult};
pub use progress::BuildProgress;
pub use publisher::{PublishPlan, PublishReport, ReleasePublisher};
pub use pusher::{ImagePusher, validate_tag};
