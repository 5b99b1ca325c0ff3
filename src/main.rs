//! Design Token Compiler Binary

use std::process;
use tokenc::EnhancedCli;

fn main() {
    let mut cli = EnhancedCli::new();

    if let Err(e) = cli.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
