//! パッケージ対象サービスの Dockerfile バリアント
//!
//! 依存関係のインストール方法だけが異なる2種類を持ちます。
//! どちらもコンテナ内で `HOST=0.0.0.0` / `PORT=8888` を設定し、
//! ポートを公開してサービスのエントリポイントを起動します。

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// コンテナ内でサービスが listen するホスト
pub const SERVICE_HOST: &str = "0.0.0.0";

/// コンテナ内でサービスが listen するポート
pub const SERVICE_PORT: u16 = 8888;

const BASE_IMAGE: &str = "python:3.12-slim";
const BROWSERS: &str = "chromium firefox webkit";

/// Dockerfile の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockerfileVariant {
    /// uv をブートストラップしてロックファイルから同期
    Uv,
    /// requirements.txt を pip で直接インストール
    #[default]
    Requirements,
}

impl DockerfileVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uv => "uv",
            Self::Requirements => "requirements",
        }
    }

    /// 生成時のデフォルトファイル名
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Uv => "Dockerfile.uv",
            Self::Requirements => "Dockerfile",
        }
    }

    /// Dockerfile の内容を生成
    pub fn render(&self) -> String {
        let install = match self {
            Self::Uv => "\
RUN pip install --no-cache-dir uv
COPY pyproject.toml uv.lock ./
RUN uv sync --frozen --no-dev --no-install-project
ENV PATH=\"/app/.venv/bin:$PATH\"",
            Self::Requirements => "\
COPY requirements.txt ./
RUN pip install --no-cache-dir -r requirements.txt",
        };

        format!(
            "# syntax=docker/dockerfile:1\n\
             FROM {base}\n\
             \n\
             ENV HOST={host} \\\n    PORT={port} \\\n    PYTHONUNBUFFERED=1\n\
             \n\
             WORKDIR /app\n\
             \n\
             {install}\n\
             RUN playwright install --with-deps {browsers}\n\
             \n\
             COPY . .\n\
             \n\
             EXPOSE {port}\n\
             \n\
             CMD [\"python\", \"main.py\"]\n",
            base = BASE_IMAGE,
            host = SERVICE_HOST,
            port = SERVICE_PORT,
            install = install,
            browsers = BROWSERS,
        )
    }
}

impl fmt::Display for DockerfileVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DockerfileVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uv" => Ok(Self::Uv),
            "requirements" | "pip" => Ok(Self::Requirements),
            other => Err(CoreError::UnknownVariant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_variants_set_runtime_environment() {
        for variant in [DockerfileVariant::Uv, DockerfileVariant::Requirements] {
            let content = variant.render();
            assert!(content.contains("ENV HOST=0.0.0.0"), "{}", variant);
            assert!(content.contains("PORT=8888"), "{}", variant);
            assert!(content.contains("EXPOSE 8888"), "{}", variant);
            assert!(content.contains("CMD [\"python\", \"main.py\"]"));
            assert!(content.contains("playwright install --with-deps"));
        }
    }

    #[test]
    fn test_variants_differ_only_in_install_step() {
        let uv = DockerfileVariant::Uv.render();
        let pip = DockerfileVariant::Requirements.render();

        assert!(uv.contains("uv sync --frozen"));
        assert!(!uv.contains("requirements.txt"));
        assert!(pip.contains("pip install --no-cache-dir -r requirements.txt"));
        assert!(!pip.contains("uv sync"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "uv".parse::<DockerfileVariant>().unwrap(),
            DockerfileVariant::Uv
        );
        assert_eq!(
            "Requirements".parse::<DockerfileVariant>().unwrap(),
            DockerfileVariant::Requirements
        );
        assert_eq!(
            "pip".parse::<DockerfileVariant>().unwrap(),
            DockerfileVariant::Requirements
        );
        assert!(matches!(
            "poetry".parse::<DockerfileVariant>(),
            Err(CoreError::UnknownVariant(_))
        ));
    }

    #[test]
    fn test_default_file_names() {
        assert_eq!(DockerfileVariant::Uv.default_file_name(), "Dockerfile.uv");
        assert_eq!(
            DockerfileVariant::Requirements.default_file_name(),
            "Dockerfile"
        );
    }
}
