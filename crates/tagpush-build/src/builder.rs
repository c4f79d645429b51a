use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use colored::Colorize;
use futures_util::stream::StreamExt;
use std::collections::{BTreeMap, HashMap};

pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをビルド
    ///
    /// `reference` はタグ付きの完全な参照（例: `host/ns/app:20261019-0930`）。
    /// ビルド出力にエラーが含まれた時点で中断する。
    pub async fn build_image(
        &self,
        context_data: Vec<u8>,
        reference: &str,
        build_args: &BTreeMap<String, String>,
        no_cache: bool,
    ) -> BuildResult<()> {
        tracing::info!("Building image: {}", reference);

        let build_args_refs: HashMap<&str, &str> = build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: "Dockerfile",
            t: reference,
            buildargs: build_args_refs,
            nocache: no_cache,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            pull: true,    // ベースイメージを常にpull
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);
        if !build_args.is_empty() {
            tracing::debug!("Build args: {:?}", build_args);
        }

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => handle_build_output(output)?,
                Err(bollard::errors::Error::DockerStreamError { error }) => {
                    return Err(BuildError::BuildFailed(error));
                }
                Err(e) => return Err(BuildError::DockerConnection(e)),
            }
        }

        tracing::info!("Successfully built: {}", reference);
        Ok(())
    }

    /// 既存イメージに追加のタグを付ける
    pub async fn tag_image(&self, source: &str, repository: &str, tag: &str) -> BuildResult<()> {
        let target = format!("{}:{}", repository, tag);
        tracing::info!("Tagging {} as {}", source, target);

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: repository,
            tag,
        };

        self.docker
            .tag_image(source, Some(options))
            .await
            .map_err(|e| BuildError::TagFailed {
                reference: target,
                message: e.to_string(),
            })
    }
}

/// ビルド出力の処理
fn handle_build_output(output: bollard::models::BuildInfo) -> BuildResult<()> {
    if let Some(stream) = output.stream {
        print!("{}", stream);
    }

    if let Some(error) = output.error {
        return Err(BuildError::BuildFailed(error));
    }

    if let Some(error_detail) = output.error_detail {
        let error_msg = error_detail
            .message
            .unwrap_or_else(|| "Unknown build error".to_string());
        return Err(BuildError::BuildFailed(error_msg));
    }

    if let Some(status) = output.status {
        println!("{}", status.cyan());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{BuildInfo, ErrorDetail};

    #[test]
    fn test_handle_build_output_stream_is_ok() {
        let output = BuildInfo {
            stream: Some("Step 1/4 : FROM python:3.12-slim\n".to_string()),
            ..Default::default()
        };
        assert!(handle_build_output(output).is_ok());
    }

    #[test]
    fn test_handle_build_output_error_detail() {
        let output = BuildInfo {
            error_detail: Some(ErrorDetail {
                code: Some(1),
                message: Some("pip install failed".to_string()),
            }),
            ..Default::default()
        };
        match handle_build_output(output) {
            Err(BuildError::BuildFailed(msg)) => assert_eq!(msg, "pip install failed"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Docker接続が必要なため、通常のテストではスキップ
    async fn test_build_and_tag_simple_image() {
        let docker = Docker::connect_with_local_defaults().unwrap();
        let builder = ImageBuilder::new(docker);

        use crate::context::ContextBuilder;
        use std::fs;
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let dockerfile = temp_dir.path().join("Dockerfile");
        fs::write(&dockerfile, "FROM alpine:latest\nCMD echo 'test'").unwrap();

        let context_data = ContextBuilder::create_context(temp_dir.path(), &dockerfile).unwrap();

        builder
            .build_image(
                context_data,
                "localhost/tagpush/test:20260101-0000",
                &BTreeMap::new(),
                false,
            )
            .await
            .unwrap();
        builder
            .tag_image(
                "localhost/tagpush/test:20260101-0000",
                "localhost/tagpush/test",
                "latest",
            )
            .await
            .unwrap();

        assert!(
            builder
                .docker
                .inspect_image("localhost/tagpush/test:latest")
                .await
                .is_ok()
        );

        for reference in [
            "localhost/tagpush/test:20260101-0000",
            "localhost/tagpush/test:latest",
        ] {
            #[allow(deprecated)]
            builder
                .docker
                .remove_image(reference, None::<bollard::image::RemoveImageOptions>, None)
                .await
                .ok();
        }
    }
}
