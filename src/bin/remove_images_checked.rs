use anyhow::Result;
use catalog_image_sweep::catalog_ops::AuditLog;
use catalog_image_sweep::cli::{self, remove_images_checked};
use clap::Parser;

/// Remove the images listed in products.csv from every variant of each
/// product, republishing only products that are already published.
#[derive(Parser, Debug)]
#[command(name = "remove_images_checked", version)]
struct Args {
    /// Only write the planned actions to output.log
    #[arg(long = "dryRun", visible_alias = "dry-run", default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log = AuditLog::default();
    let client = cli::bootstrap("remove_images_checked", &log)?;

    let cfg = remove_images_checked::RemoveImagesCheckedConfig {
        dry_run: args.dry_run,
        ..Default::default()
    };
    let result = remove_images_checked::run(&client, &log, &cfg).await;
    cli::finish("remove_images_checked", &log, result);
    Ok(())
}
