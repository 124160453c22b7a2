use anyhow::Result;
use catalog_image_sweep::catalog_ops::AuditLog;
use catalog_image_sweep::cli::{self, remove_numbered_images};
use clap::Parser;

/// Scan the whole catalog and remove staged images whose URL carries an
/// auto-numbered suffix such as `photo(2).jpg`.
#[derive(Parser, Debug)]
#[command(name = "remove_numbered_images", version)]
struct Args {
    /// Only write the planned actions to output.log
    #[arg(long = "dryRun", visible_alias = "dry-run", default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log = AuditLog::default();
    let client = cli::bootstrap("remove_numbered_images", &log)?;

    let cfg = remove_numbered_images::RemoveNumberedImagesConfig {
        dry_run: args.dry_run,
        ..Default::default()
    };
    let result = remove_numbered_images::run(&client, &log, &cfg).await;
    cli::finish("remove_numbered_images", &log, result);
    Ok(())
}
