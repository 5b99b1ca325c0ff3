// FILE: src/cli/handlers.rs
use crate::{compile_files_with_options, decode_document, resolve_aliases, CompilationStats, Result, TokenError};

use std::fs;
use std::path::Path;

// --- RESOLVE ---
pub fn handle_resolve_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let inputs: Vec<String> = matches
        .get_many::<String>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let options = cli.build_compile_options(matches)?;

    eprintln!("🔨 Resolving {}", inputs.join(", "));
    let (output, stats) = compile_files_with_options(&inputs, &options)?;

    match matches.get_one::<String>("output") {
        Some(output_path) => {
            fs::write(output_path, &output)?;
            eprintln!("✅ Wrote {} ({} bytes)", output_path, stats.output_size);
        }
        None => println!("{}", output),
    }
    eprintln!("   Time: {}ms", cli.elapsed_ms());

    if matches.get_flag("stats") {
        print_detailed_stats(&stats)?;
    }
    Ok(())
}

fn print_detailed_stats(stats: &CompilationStats) -> Result<()> {
    let report = serde_json::to_string_pretty(stats)
        .map_err(|e| TokenError::invalid_format(format!("JSON serialization error: {}", e)))?;
    eprintln!("\n📊 Compilation Statistics:\n{}", report);
    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = matches
        .get_one::<String>("input")
        .ok_or_else(|| TokenError::invalid_format("Missing input path"))?;
    let recursive = matches.get_flag("recursive");

    if Path::new(input_path).is_dir() {
        check_directory(cli, input_path, recursive)
    } else {
        check_single_file(cli, Path::new(input_path))
    }
}

fn check_single_file(cli: &super::EnhancedCli, input_path: &Path) -> Result<()> {
    let options = cli.config_options()?;
    let result = fs::read_to_string(input_path)
        .map_err(|e| TokenError::FileNotFound {
            path: format!("{}: {}", input_path.display(), e),
        })
        .and_then(|source| decode_document(&source, &options.decode))
        .and_then(|root| resolve_aliases(&root).map_err(Into::into));

    match result {
        Ok(resolved) => {
            println!("✅ {} - {} tokens, no issues found", input_path.display(), resolved.leaf_count());
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", input_path.display(), e);
            Err(e)
        }
    }
}

fn check_directory(cli: &super::EnhancedCli, dir_path: &str, recursive: bool) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    let walker = walkdir::WalkDir::new(dir_path).max_depth(if recursive { usize::MAX } else { 1 });
    for entry in walker {
        let entry = entry.map_err(|e| {
            TokenError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == "json") {
            total_files += 1;
            if check_single_file(cli, entry.path()).is_err() {
                error_files += 1;
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(TokenError::invalid_format(format!("{} files have errors", error_files)))
    } else {
        Ok(())
    }
}
