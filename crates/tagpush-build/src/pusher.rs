//! イメージプッシュ処理
//!
//! タグ付け済みのイメージをコンテナレジストリにプッシュします。
//! リトライは行わず、最初のエラーでそのまま失敗します。

use crate::auth::RegistryAuth;
use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::models::PushImageInfo;
use colored::Colorize;
use futures_util::StreamExt;
use std::io::Write;

/// Docker タグの最大長
const MAX_TAG_LEN: usize = 128;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher {
    docker: Docker,
    auth: RegistryAuth,
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self {
            docker,
            auth: RegistryAuth::new(),
        }
    }

    /// 認証情報マネージャーを指定して作成
    pub fn with_auth(docker: Docker, auth: RegistryAuth) -> Self {
        Self { docker, auth }
    }

    /// イメージをレジストリにプッシュ
    ///
    /// # Arguments
    /// * `repository` - リポジトリ名（レジストリ込み、タグなし）
    /// * `tag` - イメージタグ
    ///
    /// # Returns
    /// プッシュ成功時は完全なイメージ名を返す
    pub async fn push(&self, repository: &str, tag: &str) -> BuildResult<String> {
        let full_image = format!("{}:{}", repository, tag);

        validate_tag(tag)?;

        let credentials = self.auth.get_credentials(repository)?;

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        println!("  → {}", full_image.cyan());
        tracing::info!("Pushing {}", full_image);

        #[allow(deprecated)]
        let mut stream = self
            .docker
            .push_image(repository, Some(options), credentials);

        let mut last_status = String::new();
        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else {
                        handle_progress(&info, &mut last_status);
                    }
                }
                Err(e) => {
                    println!();
                    return Err(BuildError::PushFailed {
                        reference: full_image,
                        message: e.to_string(),
                    });
                }
            }
        }

        println!();

        if let Some(err) = error_message {
            return Err(BuildError::PushFailed {
                reference: full_image,
                message: err,
            });
        }

        tracing::info!("Pushed {}", full_image);
        Ok(full_image)
    }
}

/// タグのバリデーション
///
/// Docker タグの制約:
/// - 128文字以下
/// - 英数字、ピリオド、ハイフン、アンダースコアのみ
/// - 先頭はピリオドまたはハイフンではない
pub fn validate_tag(tag: &str) -> BuildResult<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > MAX_TAG_LEN {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max {})", tag.len(), MAX_TAG_LEN),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_'))
    {
        return Err(BuildError::InvalidTag {
            tag: format!("Invalid character '{}' in tag: {}", c, tag),
        });
    }

    Ok(())
}

/// プッシュ進捗を表示
fn handle_progress(info: &PushImageInfo, last_status: &mut String) {
    let Some(status) = &info.status else {
        return;
    };
    let progress = info.progress.as_deref().unwrap_or("");

    match status.as_str() {
        "Pushing" => {
            print!("\r  ↑ {} {}     ", status, progress);
            std::io::stdout().flush().ok();
        }
        "Pushed" => {
            println!("\r  {} Pushed                    ", "✓".green());
        }
        "Layer already exists" => {
            println!("\r  {} Layer already exists      ", "✓".green());
        }
        "Preparing" | "Waiting" => {
            // ノイズになるので表示しない
        }
        _ => {
            if status != last_status {
                println!("\r  ℹ {}                    ", status);
                *last_status = status.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag_accepts_release_tags() {
        assert!(validate_tag("20261019-0930").is_ok());
        assert!(validate_tag(tagpush_core::LATEST).is_ok());
        assert!(validate_tag("v1.2.3_rc").is_ok());
    }

    #[test]
    fn test_validate_tag_rejects_invalid() {
        assert!(validate_tag("").is_err());
        assert!(validate_tag("-leading").is_err());
        assert!(validate_tag(".leading").is_err());
        assert!(validate_tag("has:colon").is_err());
        assert!(validate_tag("has space").is_err());
        assert!(validate_tag(&"a".repeat(129)).is_err());
        assert!(validate_tag(&"a".repeat(128)).is_ok());
    }
}
