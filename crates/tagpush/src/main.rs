mod commands;
mod docker;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tagpush_core::DockerfileVariant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagpush")]
#[command(about = "ビルドして、刻んで、届ける。タイムスタンプタグでイメージを公開", long_about = None)]
struct Cli {
    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// イメージ参照の指定（CLI > 環境変数 > tagpush.kdl）
#[derive(Args, Debug, Clone, Default)]
pub struct ImageArgs {
    /// レジストリホスト (例: registry.example.com)
    #[arg(long, env = "TAGPUSH_REGISTRY")]
    pub registry: Option<String>,
    /// 名前空間 (例: crawler)
    #[arg(long, env = "TAGPUSH_NAMESPACE")]
    pub namespace: Option<String>,
    /// イメージ名、または host/namespace/name 形式の完全な参照
    #[arg(long, env = "TAGPUSH_IMAGE")]
    pub image: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドし、タイムスタンプタグと latest を付けてプッシュ
    Publish {
        #[command(flatten)]
        image: ImageArgs,
        /// 使用する Dockerfile (デフォルト: Dockerfile)
        #[arg(short = 'f', long)]
        dockerfile: Option<PathBuf>,
        /// ビルドコンテキストのディレクトリ
        #[arg(short, long)]
        context: Option<PathBuf>,
        /// ビルドキャッシュを使わない
        #[arg(long)]
        no_cache: bool,
        /// レジストリ認証に使う Docker 設定ディレクトリ (デフォルト: $DOCKER_CONFIG または ~/.docker)
        #[arg(long, value_name = "DIR")]
        docker_config: Option<PathBuf>,
    },
    /// 今公開した場合に使われるタグを表示（Dockerには触れない）
    Tag {
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Dockerfile を生成
    Dockerfile {
        /// バリアント (uv, requirements)。省略時は tagpush.kdl の variant
        variant: Option<DockerfileVariant>,
        /// 出力先ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 既存ファイルを上書きする
        #[arg(long)]
        force: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Publish {
            image,
            dockerfile,
            context,
            no_cache,
            docker_config,
        } => {
            commands::publish::handle(image, dockerfile, context, no_cache, docker_config).await
        }
        Commands::Tag { image } => commands::tag::handle(image),
        Commands::Dockerfile {
            variant,
            output,
            force,
        } => commands::dockerfile::handle(variant, output.as_deref(), force),
        Commands::Version => {
            println!("tagpush {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// ログは stderr に出力（stdout は Dockerfile 生成などの出力に使う）
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!(
            "warn,tagpush={level},tagpush_core={level},tagpush_config={level},tagpush_build={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
