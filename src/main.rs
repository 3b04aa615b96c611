//! otel-transform CLI entry point.

use otel_transform::cli::{self, Cli};
use otel_transform::core::Result;

fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    cli::execute(cli)
}
