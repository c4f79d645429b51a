pub mod dockerfile;
pub mod publish;
pub mod tag;

use crate::ImageArgs;
use colored::Colorize;
use tagpush_config::{Overrides, PublishConfig};

/// 設定ファイルを読み込み、見つかった場合はパスを表示
pub(crate) fn load_config_with_notice() -> anyhow::Result<Option<PublishConfig>> {
    let config = tagpush_config::load_config()?;
    if let Some(source) = config.as_ref().and_then(|c| c.source.as_ref()) {
        println!("📄 設定ファイル: {}", source.display().to_string().cyan());
    }
    Ok(config)
}

impl From<ImageArgs> for Overrides {
    fn from(args: ImageArgs) -> Self {
        Self {
            registry: args.registry,
            namespace: args.namespace,
            image: args.image,
            ..Default::default()
        }
    }
}
