//! 設定モデルと優先順位解決

use crate::error::{ConfigError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tagpush_core::{DockerfileVariant, ImageRef};

/// デフォルトの Dockerfile パス
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// デフォルトのビルドコンテキスト
pub const DEFAULT_CONTEXT: &str = ".";

/// tagpush.kdl の内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishConfig {
    pub registry: Option<String>,
    pub namespace: Option<String>,
    pub image: Option<String>,
    pub dockerfile: Option<PathBuf>,
    pub variant: Option<DockerfileVariant>,
    pub context: Option<PathBuf>,
    pub build_args: BTreeMap<String, String>,
    /// 読み込んだファイルのパス（相対パスの基準になる）
    pub source: Option<PathBuf>,
}

impl PublishConfig {
    /// 相対パスの基準ディレクトリ
    ///
    /// `tagpush.kdl` のようにファイル名だけのパスはカレントディレクトリ基準。
    pub fn base_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent).map(|dir| {
            if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            }
        })
    }
}

/// CLI 引数・環境変数からの指定
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub registry: Option<String>,
    pub namespace: Option<String>,
    pub image: Option<String>,
    pub dockerfile: Option<PathBuf>,
    pub context: Option<PathBuf>,
}

/// 優先順位を解決した最終的な公開設定
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPublish {
    pub image: ImageRef,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub build_args: BTreeMap<String, String>,
}

/// 公開設定を解決
///
/// # Priority
/// 1. CLI 引数 / 環境変数
/// 2. 設定ファイル（dockerfile が無ければ variant のデフォルトファイル名）
/// 3. デフォルト値（設定ファイルがあればそのディレクトリ基準、無ければカレントディレクトリの
///    Dockerfile と "."）
///
/// image に `/` を含む完全な参照（`host/ns/name`）が指定された場合は、
/// registry / namespace の指定より優先する。
pub fn resolve_publish(
    overrides: &Overrides,
    config: Option<&PublishConfig>,
) -> Result<ResolvedPublish> {
    let image = resolve_image(overrides, config)?;

    let base_dir = config.and_then(PublishConfig::base_dir);
    let from_config = |path: Option<&PathBuf>| -> Option<PathBuf> {
        path.map(|p| match base_dir {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p.clone(),
        })
    };

    // dockerfile 未指定で variant があれば、そのバリアントのデフォルトファイル名
    let variant_file = config
        .and_then(|c| c.variant)
        .map(|v| PathBuf::from(v.default_file_name()));
    let dockerfile = overrides
        .dockerfile
        .clone()
        .or_else(|| from_config(config.and_then(|c| c.dockerfile.as_ref())))
        .or_else(|| from_config(variant_file.as_ref()))
        .or_else(|| base_dir.map(|dir| dir.join(DEFAULT_DOCKERFILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKERFILE));

    let context = overrides
        .context
        .clone()
        .or_else(|| from_config(config.and_then(|c| c.context.as_ref())))
        .or_else(|| base_dir.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTEXT));

    let build_args = config.map(|c| c.build_args.clone()).unwrap_or_default();

    Ok(ResolvedPublish {
        image,
        dockerfile,
        context,
        build_args,
    })
}

/// イメージ参照だけを解決（`tag` コマンドでも使用）
pub fn resolve_image(overrides: &Overrides, config: Option<&PublishConfig>) -> Result<ImageRef> {
    let pick = |cli: &Option<String>, file: Option<&Option<String>>| -> Option<String> {
        cli.clone().or_else(|| file.and_then(|v| v.clone()))
    };

    let image = pick(&overrides.image, config.map(|c| &c.image)).ok_or_else(|| {
        ConfigError::InvalidConfig(
            "イメージ名が指定されていません（--image または tagpush.kdl の image）".to_string(),
        )
    })?;

    if image.contains('/') {
        if overrides.registry.is_some() || overrides.namespace.is_some() {
            tracing::debug!(
                "Image '{}' is a full reference; ignoring registry/namespace overrides",
                image
            );
        }
        return Ok(ImageRef::parse(&image)?);
    }

    let registry = pick(&overrides.registry, config.map(|c| &c.registry)).ok_or_else(|| {
        ConfigError::InvalidConfig(
            "レジストリが指定されていません（--registry または tagpush.kdl の registry）"
                .to_string(),
        )
    })?;
    let namespace = pick(&overrides.namespace, config.map(|c| &c.namespace)).ok_or_else(|| {
        ConfigError::InvalidConfig(
            "名前空間が指定されていません（--namespace または tagpush.kdl の namespace）"
                .to_string(),
        )
    })?;

    Ok(ImageRef::new(registry, namespace, image)?)
}
