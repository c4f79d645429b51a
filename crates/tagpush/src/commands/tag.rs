use crate::ImageArgs;
use colored::Colorize;
use tagpush_config::{Overrides, resolve_image};
use tagpush_core::{LATEST, Tag};

/// tag コマンドを処理
///
/// イメージ名が分かればタグ付きの参照も表示する。Docker には接続しない。
pub fn handle(image: ImageArgs) -> anyhow::Result<()> {
    let tag = Tag::now();

    let config = tagpush_config::load_config()?;
    let overrides = Overrides::from(image);
    let has_image =
        overrides.image.is_some() || config.as_ref().is_some_and(|c| c.image.is_some());

    println!("{}", tag);

    if has_image {
        let image = resolve_image(&overrides, config.as_ref())?;
        println!("  {}", image.with_tag(tag.as_str()).cyan());
        println!("  {}", image.with_tag(LATEST).cyan());
    }

    Ok(())
}
