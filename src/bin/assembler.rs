use anyhow::Result;
use crossenv::cli;

fn main() -> Result<()> {
    cli::run()
}
