//! レジストリ上のイメージ参照
//!
//! `<registry-host>/<namespace>/<image-name>` の形式を扱います。
//! タグは含めず、プッシュ時に [`ImageRef::with_tag`] で付与します。

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// タグなしのイメージ参照
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    registry: String,
    namespace: String,
    name: String,
}

impl ImageRef {
    /// 各要素を検証して作成
    pub fn new(
        registry: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let image = Self {
            registry: registry.into(),
            namespace: namespace.into(),
            name: name.into(),
        };
        image.validate()?;
        Ok(image)
    }

    /// `host/namespace/name` 形式の文字列をパース
    ///
    /// # Examples
    /// - `registry.example.com/crawler/capture` -> host=`registry.example.com`, ns=`crawler`
    /// - `localhost:5000/team/sub/app` -> host=`localhost:5000`, ns=`team/sub`
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidImageRef {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        if reference.contains('@') {
            return Err(invalid("ダイジェスト付きの参照は指定できません"));
        }

        let (registry, rest) = reference
            .split_once('/')
            .ok_or_else(|| invalid("<registry>/<namespace>/<name> の形式が必要です"))?;
        let (namespace, name) = rest
            .rsplit_once('/')
            .ok_or_else(|| invalid("<registry>/<namespace>/<name> の形式が必要です"))?;

        if name.contains(':') {
            return Err(invalid(
                "タグは指定できません（タグは実行時刻から自動生成されます）",
            ));
        }

        Self::new(registry, namespace, name)
    }

    fn validate(&self) -> Result<()> {
        let reference = self.repository();
        let invalid = |reason: String| CoreError::InvalidImageRef {
            reference: reference.clone(),
            reason,
        };

        if self.registry.is_empty() {
            return Err(invalid("レジストリが空です".to_string()));
        }
        if !self
            .registry
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'))
        {
            return Err(invalid(format!(
                "レジストリ '{}' に使用できない文字が含まれています",
                self.registry
            )));
        }
        // ドットもポートも無いホストは Docker Hub の名前空間として解釈されてしまう
        if !is_registry_host(&self.registry) {
            return Err(invalid(format!(
                "レジストリ '{}' はホスト名として解釈されません（ドット、ポート、または localhost が必要です）",
                self.registry
            )));
        }

        for segment in self.namespace.split('/') {
            if !is_path_component(segment) {
                return Err(invalid(format!(
                    "名前空間 '{}' が不正です（小文字英数字と . _ - のみ）",
                    self.namespace
                )));
            }
        }

        if !is_path_component(&self.name) {
            return Err(invalid(format!(
                "イメージ名 '{}' が不正です（小文字英数字と . _ - のみ）",
                self.name
            )));
        }

        Ok(())
    }

    /// 認証情報の検索に使うレジストリホスト
    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// タグなしのリポジトリ名（`host/namespace/name`）
    pub fn repository(&self) -> String {
        format!("{}/{}/{}", self.registry, self.namespace, self.name)
    }

    /// タグ付きの完全な参照（`host/namespace/name:tag`）
    pub fn with_tag(&self, tag: &str) -> String {
        format!("{}:{}", self.repository(), tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.registry, self.namespace, self.name)
    }
}

/// 参照の先頭要素を Docker がレジストリホストとして扱うか
///
/// `.` か `:` を含む、または `localhost` の場合のみ。それ以外は Docker Hub 上の名前空間になる。
pub fn is_registry_host(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

/// Docker のパスコンポーネント規則（小文字英数字で始まり、英数字と . _ - のみ）
fn is_path_component(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}
