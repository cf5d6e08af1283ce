/*!
 * Command-line interface for copcon
 */

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use copcon::clipboard::copy_to_clipboard;
use copcon::config::{Args, Config};
use copcon::diagnostics::default_diagnostics;
use copcon::diff::diff_section;
use copcon::filter::FileFilter;
use copcon::reader::ContentReader;
use copcon::report::{write_report, Delivery, Report, RunSummary};
use copcon::tokenizer::{count_usage, Cl100kTokenizer};
use copcon::tree::TreeRenderer;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "copcon", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();

    match run(args) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> copcon::Result<String> {
    let diagnostics = default_diagnostics();

    let config = Config::from_args(args, diagnostics.as_ref());
    config.validate()?;

    // Fails before any traversal if the patterns cannot be loaded
    let filter = FileFilter::from_files(
        config.ignore_dirs.clone(),
        config.ignore_files.clone(),
        config.ignore_file.as_deref(),
        config.target_file.as_deref(),
        Arc::clone(&diagnostics),
    )?;

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));

    progress.set_message(format!(
        "📂 Rendering tree of {}",
        config.target_dir.display()
    ));
    let tree = TreeRenderer::new(&config.target_dir, config.max_depth, &filter)
        .with_diagnostics(Arc::clone(&diagnostics))
        .render();

    progress.set_message("📄 Reading file contents");
    let contents = ContentReader::new(&config.target_dir, &filter, config.exclude_hidden)
        .with_diagnostics(Arc::clone(&diagnostics))
        .read_all();
    let contents = match contents {
        Ok(contents) => contents,
        Err(e) => {
            progress.finish_and_clear();
            return Err(e);
        }
    };

    let git_diff = config.git_diff.then(|| {
        progress.set_message("🔍 Collecting git diff");
        diff_section(&config.target_dir)
    });

    let project_name = config.project_name();
    let report = Report {
        project_name: &project_name,
        tree: &tree.rendered,
        contents: &contents,
        git_diff: git_diff.as_deref(),
    }
    .render();

    progress.set_message("🔢 Counting tokens");
    let tokenizer = Cl100kTokenizer::new()?;
    let usage = count_usage(&contents, git_diff.as_deref(), &tokenizer);

    progress.finish_and_clear();

    let delivery = match &config.output_file {
        Some(path) => {
            write_report(&report, path)?;
            Delivery::File(path.clone())
        }
        None => {
            copy_to_clipboard(&report)?;
            Delivery::Clipboard
        }
    };

    let summary = RunSummary {
        directory_count: tree.directory_count,
        file_count: tree.file_count,
        usage,
        ignore_file: config.ignore_file.clone(),
        target_file: config.target_file.clone(),
        delivery,
    };

    Ok(summary.render())
}
