//! リリースタグ
//!
//! 実行時刻から `YYYYMMDD-HHMM` 形式のタグを生成します。
//! 分単位の粒度しか持たないため、同じ分の中で2回実行すると同じタグになります。

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt;

/// タグの書式（chrono の strftime 形式）
pub const TAG_FORMAT: &str = "%Y%m%d-%H%M";

/// 常に最新イメージを指すフローティングタグ
pub const LATEST: &str = "latest";

/// タイムスタンプから導出したリリースタグ
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// 現在のローカル時刻からタグを生成
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// 任意のタイムゾーンの時刻からタグを生成（秒以下は切り捨て）
    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(at.format(TAG_FORMAT).to_string())
    }

    /// `YYYYMMDD-HHMM` 形式で、かつ実在する日時かどうか
    pub fn has_tag_shape(value: &str) -> bool {
        let bytes = value.as_bytes();
        bytes.len() == 13
            && bytes[8] == b'-'
            && bytes[..8].iter().all(u8::is_ascii_digit)
            && bytes[9..].iter().all(u8::is_ascii_digit)
            && NaiveDateTime::parse_from_str(value, TAG_FORMAT).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
