use colored::Colorize;
use std::path::Path;
use tagpush_core::DockerfileVariant;

/// dockerfile コマンドを処理
///
/// バリアントの優先順位: 引数 > tagpush.kdl の variant > requirements
pub fn handle(
    variant: Option<DockerfileVariant>,
    output: Option<&Path>,
    force: bool,
) -> anyhow::Result<()> {
    let variant = match variant {
        Some(v) => v,
        None => tagpush_config::load_config()?
            .and_then(|c| c.variant)
            .unwrap_or_default(),
    };
    tracing::debug!("Rendering Dockerfile variant: {}", variant);

    let content = variant.render();

    let Some(path) = output else {
        print!("{}", content);
        return Ok(());
    };

    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} は既に存在します（上書きするには --force を指定してください）",
            path.display()
        ));
    }

    std::fs::write(path, content)?;
    println!(
        "{} {} を生成しました ({})",
        "✓".green(),
        path.display().to_string().cyan(),
        variant
    );

    Ok(())
}
