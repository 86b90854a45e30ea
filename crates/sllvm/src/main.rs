use clap::Parser;
use color_eyre::eyre::bail;
use sllvm::report::log_diagnostics;
use sllvm::settings::to_yaml;
use sllvm::{Args, init_logging, render_summary, resolve_config};
use sllvm_core::{NpyFiles, Task, pipeline};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config = resolve_config(&args)?;

    if args.dump_config {
        print!("{}", to_yaml(&config)?);
        return Ok(());
    }

    init_logging(&config.results_root, &args.log_level)?;

    let task = Task::from(args.task);
    tracing::info!(task = %task, argument = %config.argument, "starting batch");
    let summary = pipeline::run(task, &config, &NpyFiles)?;

    log_diagnostics(&summary);
    print!("{}", render_summary(&summary));

    let missing = summary.diagnostics.missing_count();
    if args.strict && missing > 0 {
        bail!("{missing} cells could not be loaded");
    }

    tracing::info!("sllvm finished");
    Ok(())
}
