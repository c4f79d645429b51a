//! リリースパイプライン
//!
//! 1. 現在時刻からタグを算出（1回だけ）
//! 2. Dockerfile からイメージをビルド
//! 3. ビルドしたイメージにタグと `latest` を付与
//! 4. 両方の参照をプッシュ
//! 5. タグを含む完了メッセージを返す
//!
//! 分岐もリトライもロールバックもない一直線の処理で、どこかで失敗すれば
//! 以降のステップは実行しない。

use crate::engine::{BuildRequest, ImageEngine};
use crate::error::BuildResult;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tagpush_core::{ImageRef, LATEST, Tag};

/// 公開対象
#[derive(Debug, Clone, PartialEq)]
pub struct PublishPlan {
    pub image: ImageRef,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub build_args: BTreeMap<String, String>,
    pub no_cache: bool,
}

/// 公開結果
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    pub tag: Tag,
    /// `[タイムスタンプタグの参照, latest の参照]`
    pub references: [String; 2],
}

impl PublishReport {
    /// 完了メッセージ
    pub fn message(&self) -> String {
        format!(
            "✓ イメージを公開しました (tag: {})\n  {}\n  {}",
            self.tag, self.references[0], self.references[1]
        )
    }
}

pub struct ReleasePublisher<E> {
    engine: E,
}

impl<E: ImageEngine> ReleasePublisher<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 現在のローカル時刻のタグで公開
    pub async fn publish(&self, plan: &PublishPlan) -> BuildResult<PublishReport> {
        let tag = Tag::now();
        self.publish_with_tag(plan, tag).await
    }

    /// 算出済みのタグで公開
    pub async fn publish_with_tag(
        &self,
        plan: &PublishPlan,
        tag: Tag,
    ) -> BuildResult<PublishReport> {
        let repository = plan.image.repository();
        let tagged = plan.image.with_tag(tag.as_str());
        let latest = plan.image.with_tag(LATEST);

        tracing::info!("Publishing {} (tag: {})", repository, tag);

        let request = BuildRequest {
            dockerfile: plan.dockerfile.clone(),
            context: plan.context.clone(),
            reference: tagged.clone(),
            build_args: plan.build_args.clone(),
            no_cache: plan.no_cache,
        };
        tracing::debug!("Build request: {:?}", request);
        self.engine.build(&request).await?;

        self.engine.tag(&tagged, &repository, LATEST).await?;

        let mut pushed: Vec<String> = Vec::with_capacity(2);
        for push_tag in [tag.as_str(), LATEST] {
            match self.engine.push(&repository, push_tag).await {
                Ok(reference) => pushed.push(reference),
                Err(e) => {
                    if !pushed.is_empty() {
                        tracing::warn!(
                            "Registry left partially published; already pushed: {}",
                            pushed.join(", ")
                        );
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!("Published {} and {}", tagged, latest);

        Ok(PublishReport {
            tag,
            references: [tagged, latest],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Build(String),
        Tag { source: String, target: String },
        Push(String),
    }

    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<Call>>,
        fail_build: bool,
        fail_push_tag: Option<&'static str>,
    }

    impl RecordingEngine {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn pushes(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Push(r) => Some(r),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl ImageEngine for RecordingEngine {
        async fn build(&self, request: &BuildRequest) -> BuildResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Build(request.reference.clone()));
            if self.fail_build {
                return Err(BuildError::BuildFailed("RUN pip install failed".to_string()));
            }
            Ok(())
        }

        async fn tag(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()> {
            self.calls.lock().unwrap().push(Call::Tag {
                source: source.to_string(),
                target: format!("{}:{}", repository, tag),
            });
            Ok(())
        }

        async fn push(&self, repository: &str, tag: &str) -> BuildResult<String> {
            let reference = format!("{}:{}", repository, tag);
            self.calls.lock().unwrap().push(Call::Push(reference.clone()));
            if self.fail_push_tag == Some(tag) {
                return Err(BuildError::PushFailed {
                    reference,
                    message: "unauthorized".to_string(),
                });
            }
            Ok(reference)
        }
    }

    fn plan() -> PublishPlan {
        PublishPlan {
            image: ImageRef::new("registry.example.com", "crawler", "capture").unwrap(),
            dockerfile: PathBuf::from("Dockerfile"),
            context: PathBuf::from("."),
            build_args: BTreeMap::new(),
            no_cache: false,
        }
    }

    fn fixed_tag() -> Tag {
        Tag::from_datetime(&Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 15).unwrap())
    }

    #[tokio::test]
    async fn test_publish_runs_steps_in_order() {
        let publisher = ReleasePublisher::new(RecordingEngine::default());
        let report = publisher.publish_with_tag(&plan(), fixed_tag()).await.unwrap();

        let repo = "registry.example.com/crawler/capture";
        assert_eq!(
            publisher.engine().calls(),
            vec![
                Call::Build(format!("{}:20261019-0930", repo)),
                Call::Tag {
                    source: format!("{}:20261019-0930", repo),
                    target: format!("{}:latest", repo),
                },
                Call::Push(format!("{}:20261019-0930", repo)),
                Call::Push(format!("{}:latest", repo)),
            ]
        );
        assert_eq!(report.tag.as_str(), "20261019-0930");
    }

    #[tokio::test]
    async fn test_publish_creates_exactly_two_references() {
        let publisher = ReleasePublisher::new(RecordingEngine::default());
        let report = publisher.publish_with_tag(&plan(), fixed_tag()).await.unwrap();

        assert_eq!(
            report.references,
            [
                "registry.example.com/crawler/capture:20261019-0930".to_string(),
                "registry.example.com/crawler/capture:latest".to_string(),
            ]
        );
        assert_eq!(publisher.engine().pushes().len(), 2);
    }

    #[tokio::test]
    async fn test_build_failure_skips_push() {
        let engine = RecordingEngine {
            fail_build: true,
            ..Default::default()
        };
        let publisher = ReleasePublisher::new(engine);
        let err = publisher
            .publish_with_tag(&plan(), fixed_tag())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::BuildFailed(_)));
        assert_eq!(publisher.engine().calls().len(), 1);
        assert!(publisher.engine().pushes().is_empty());
    }

    #[tokio::test]
    async fn test_push_failure_on_first_tag_stops_pipeline() {
        let engine = RecordingEngine {
            fail_push_tag: Some("20261019-0930"),
            ..Default::default()
        };
        let publisher = ReleasePublisher::new(engine);
        let result = publisher.publish_with_tag(&plan(), fixed_tag()).await;

        assert!(result.is_err());
        // latest はプッシュされない
        assert_eq!(publisher.engine().pushes().len(), 1);
    }

    #[tokio::test]
    async fn test_push_failure_on_latest_leaves_partial_publish() {
        let engine = RecordingEngine {
            fail_push_tag: Some(LATEST),
            ..Default::default()
        };
        let publisher = ReleasePublisher::new(engine);
        let err = publisher
            .publish_with_tag(&plan(), fixed_tag())
            .await
            .unwrap_err();

        match err {
            BuildError::PushFailed { reference, .. } => {
                assert_eq!(reference, "registry.example.com/crawler/capture:latest");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(publisher.engine().pushes().len(), 2);
    }

    #[tokio::test]
    async fn test_same_tag_is_used_for_every_step() {
        let publisher = ReleasePublisher::new(RecordingEngine::default());
        let report = publisher.publish(&plan()).await.unwrap();

        assert!(Tag::has_tag_shape(report.tag.as_str()));
        let stamped = format!("registry.example.com/crawler/capture:{}", report.tag);
        let calls = publisher.engine().calls();
        assert_eq!(calls[0], Call::Build(stamped.clone()));
        assert_eq!(calls[2], Call::Push(stamped));
    }

    #[tokio::test]
    async fn test_same_minute_runs_overwrite_same_reference() {
        let first = Tag::from_datetime(&Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 1).unwrap());
        let second = Tag::from_datetime(&Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 58).unwrap());

        let publisher = ReleasePublisher::new(RecordingEngine::default());
        let a = publisher.publish_with_tag(&plan(), first).await.unwrap();
        let b = publisher.publish_with_tag(&plan(), second).await.unwrap();

        assert_eq!(a.tag, b.tag);
        assert_eq!(a.references, b.references);
    }

    #[tokio::test]
    async fn test_message_contains_tag() {
        let publisher = ReleasePublisher::new(RecordingEngine::default());
        let report = publisher.publish_with_tag(&plan(), fixed_tag()).await.unwrap();

        let message = report.message();
        assert!(message.contains("20261019-0930"));
        assert!(message.contains("registry.example.com/crawler/capture:latest"));
    }
}
