use anyhow::Result;
use catalog_image_sweep::catalog_ops::AuditLog;
use catalog_image_sweep::cli::{self, remove_images};
use clap::Parser;

/// Remove the images listed in products.csv (by variant sku) and publish
/// every touched product.
#[derive(Parser, Debug)]
#[command(name = "remove_images", version)]
struct Args {
    /// Only write the planned actions to output.log
    #[arg(long = "dryRun", visible_alias = "dry-run", default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log = AuditLog::default();
    let client = cli::bootstrap("remove_images", &log)?;

    let cfg = remove_images::RemoveImagesConfig {
        dry_run: args.dry_run,
        ..Default::default()
    };
    let result = remove_images::run(&client, &log, &cfg).await;
    cli::finish("remove_images", &log, result);
    Ok(())
}
