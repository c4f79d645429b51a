//! tagpush.kdl パーサー

use crate::error::{ConfigError, Result};
use crate::model::PublishConfig;
use kdl::{KdlDocument, KdlNode};
use std::path::{Path, PathBuf};
use tagpush_core::DockerfileVariant;

/// KDLファイルを PublishConfig にパース
pub fn parse_config_file(path: &Path) -> Result<PublishConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    config.source = Some(path.to_path_buf());
    Ok(config)
}

/// KDL文字列を PublishConfig にパース
pub fn parse_config(content: &str) -> Result<PublishConfig> {
    let doc: KdlDocument = content.parse()?;

    let mut config = PublishConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "registry" => config.registry = Some(first_string(node)?),
            "namespace" => config.namespace = Some(first_string(node)?),
            "image" => config.image = Some(first_string(node)?),
            "dockerfile" => config.dockerfile = Some(PathBuf::from(first_string(node)?)),
            "context" => config.context = Some(PathBuf::from(first_string(node)?)),
            "variant" => {
                let variant: DockerfileVariant = first_string(node)?.parse()?;
                config.variant = Some(variant);
            }
            "build-arg" => {
                let (key, value) = parse_build_arg(node)?;
                config.build_args.insert(key, value);
            }
            other => {
                tracing::debug!("Skipping unknown node in tagpush.kdl: {}", other);
            }
        }
    }

    Ok(config)
}

/// ノードの最初の引数を文字列として取得
fn first_string(node: &KdlNode) -> Result<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "{} には文字列の値が必要です",
                node.name().value()
            ))
        })
}

/// build-arg ノードをパース
///
/// `build-arg "KEY" "VALUE"` の位置引数形式のみ受け付ける
fn parse_build_arg(node: &KdlNode) -> Result<(String, String)> {
    let args: Vec<&str> = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .collect();

    match args.as_slice() {
        [key, value] if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(ConfigError::InvalidConfig(
            "build-arg は \"KEY\" \"VALUE\" の2つの文字列が必要です".to_string(),
        )),
    }
}
