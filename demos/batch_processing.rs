//! Resize a folder with four workers and print every failure
//!
//! ```text
//! cargo run --example batch_processing -- ./photos ./photos-small 800x600
//! ```

use batch_resize::{init_logging, BatchConfig, BatchResizeError, BatchResizer, LoggingConfig, Size};
use std::env;
use std::process;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::default());

    let mut args = env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "./".to_string());
    let output = args.next();
    let size: Size = args.next().as_deref().unwrap_or("500x500").parse()?;

    let config = BatchConfig::new(input, output, size).workers(4);
    let resizer = BatchResizer::new(config);

    let planned = resizer.plan().await?;
    println!("Processing {} files...", planned.len());

    match resizer.run().await {
        Ok(summary) => {
            println!(
                "Resized {} files in {}ms",
                summary.succeeded, summary.elapsed_ms
            );
        }
        Err(BatchResizeError::Batch(report)) => {
            for failure in report.sorted() {
                eprintln!("{}: {}", failure.path.display(), failure.error);
            }
            eprintln!("{} of {} files failed", report.len(), report.submitted);
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
