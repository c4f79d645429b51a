use crate::ImageArgs;
use crate::docker;
use colored::Colorize;
use std::path::PathBuf;
use tagpush_build::{BuildError, DockerEngine, PublishPlan, RegistryAuth, ReleasePublisher};
use tagpush_config::{Overrides, resolve_publish};
use tagpush_core::{LATEST, Tag};

/// publish コマンドを処理
///
/// タグ算出 → ビルド → タグ付け → プッシュ → 完了表示 の順に一度だけ実行する。
pub async fn handle(
    image: ImageArgs,
    dockerfile: Option<PathBuf>,
    context: Option<PathBuf>,
    no_cache: bool,
    docker_config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = super::load_config_with_notice()?;

    let overrides = Overrides {
        dockerfile,
        context,
        ..Overrides::from(image)
    };
    let resolved = resolve_publish(&overrides, config.as_ref())?;

    // Docker に接続する前に入力ファイルを確認
    if !resolved.dockerfile.is_file() {
        let e = BuildError::DockerfileNotFound(resolved.dockerfile.clone());
        eprintln!("{} {}", "✗".red().bold(), e.user_message());
        return Err(e.into());
    }
    if !resolved.context.is_dir() {
        let e = BuildError::ContextNotFound(resolved.context.clone());
        eprintln!("{} {}", "✗".red().bold(), e.user_message());
        return Err(e.into());
    }

    // タグはここで一度だけ算出し、以降の全ステップで使い回す
    let tag = Tag::now();

    println!("{}", "イメージを公開中...".green());
    println!("  → Image: {}", resolved.image.repository().cyan());
    println!("  → Tags: {}, {}", tag.as_str().cyan(), LATEST.cyan());
    println!(
        "  → Dockerfile: {}",
        resolved.dockerfile.display().to_string().cyan()
    );
    println!(
        "  → Context: {}",
        resolved.context.display().to_string().cyan()
    );

    println!();
    println!("{}", "Dockerに接続中...".blue());
    let docker_conn = docker::init_docker_with_error_handling().await?;

    let engine = match docker_config {
        Some(dir) => {
            tracing::debug!("Using Docker config dir: {}", dir.display());
            DockerEngine::with_auth(docker_conn, RegistryAuth::from_config_dir(&dir))
        }
        None => DockerEngine::new(docker_conn),
    };
    let publisher = ReleasePublisher::new(engine);
    let plan = PublishPlan {
        image: resolved.image,
        dockerfile: resolved.dockerfile,
        context: resolved.context,
        build_args: resolved.build_args,
        no_cache,
    };

    println!();
    println!("{}", "🔨 ビルド中...".green().bold());

    match publisher.publish_with_tag(&plan, tag).await {
        Ok(report) => {
            println!();
            println!("{}", report.message().green().bold());
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "✗".red().bold(), e.user_message());
            Err(anyhow::anyhow!("イメージの公開に失敗しました: {}", e))
        }
    }
}
