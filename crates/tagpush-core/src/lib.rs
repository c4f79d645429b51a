//! tagpush のドメインモデル
//!
//! リリースタグ（`YYYYMMDD-HHMM`）、レジストリ上のイメージ参照、
//! パッケージ対象サービスの Dockerfile バリアントを提供します。

pub mod dockerfile;
pub mod error;
pub mod image;
pub mod tag;

pub use dockerfile::{DockerfileVariant, SERVICE_HOST, SERVICE_PORT};
pub use error::{CoreError, Result};
pub use image::{ImageRef, is_registry_host};
pub use tag::{LATEST, TAG_FORMAT, Tag};
