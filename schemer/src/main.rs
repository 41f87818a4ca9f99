use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{LevelFilter, debug};

use schemer::{
    commit::commit,
    config::SchemerConfig,
    ctx::AppContext,
    generate::generate,
    report::RunReport,
    survey::survey,
};

/// Regenerates XML schema reference topics.
#[derive(Parser, Debug)]
#[command(name = "schemer", version, about, long_about = None)]
struct Cli {
    /// Project configuration file.
    #[arg(short, long, global = true, default_value = SchemerConfig::FILE_NAME)]
    config: PathBuf,

    /// Overrides `topics_root`.
    #[arg(long, global = true)]
    topics_root: Option<PathBuf>,

    /// Overrides `topics_folder`.
    #[arg(long, global = true)]
    topics_folder: Option<String>,

    /// Overrides `xsd`.
    #[arg(long, global = true)]
    xsd: Option<PathBuf>,

    /// Overrides `overrides`.
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,

    /// Overrides `date` (MM/DD/YYYY).
    #[arg(long, global = true)]
    date: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Survey the schema and generate topics, optionally committing them.
    Run(RunArgs),
    /// Survey the schema and print the topic tree without writing anything.
    Survey,
    /// Print the JSON Schema of the configuration file.
    ConfigSchema,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Delete superseded legacy topics after generating.
    #[arg(long)]
    commit: bool,

    /// List what commit would delete without deleting it.
    #[arg(long, requires = "commit")]
    dry_run: bool,

    /// Remove the generated directory left by an earlier run first.
    #[arg(long)]
    clean: bool,

    /// Also write every non-empty log to this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn load_context(&self, report: &mut RunReport) -> anyhow::Result<AppContext> {
        let mut config = SchemerConfig::load(&self.config)?;
        if let Some(root) = &self.topics_root {
            config.topics_root = root.clone();
        }
        if let Some(folder) = &self.topics_folder {
            config.topics_folder = folder.clone();
        }
        if let Some(xsd) = &self.xsd {
            config.xsd = xsd.clone();
        }
        if let Some(overrides) = &self.overrides {
            config.overrides = Some(overrides.clone());
        }
        if let Some(date) = &self.date {
            config.date = Some(date.clone());
        }
        debug!("{config:#?}");
        config.into_context(report)
    }
}

fn run(cli: &Cli, args: &RunArgs) -> anyhow::Result<()> {
    let mut report = RunReport::new();
    let ctx = cli.load_context(&mut report)?;
    ctx.check_legacy_dir()?;
    if args.clean {
        ctx.clean_generated_dir()?;
    }

    let tree = survey(&ctx, ctx.load_schema()?)?;
    tree.print();

    generate(&ctx, &tree, &mut report)?;
    if args.commit {
        commit(&ctx, &tree, args.dry_run, &mut report)?;
    }

    report.print();
    if let Some(dir) = &args.log_dir {
        let written = report
            .write_logs(dir)
            .with_context(|| format!("failed to write logs to {}", dir.display()))?;
        for path in written {
            println!("Wrote {}", path.display());
        }
    }

    println!();
    if report.is_clean() {
        println!("{}", "Done.".green().bold());
    } else {
        println!("{}", "Done, with entries that need attention.".yellow().bold());
    }
    Ok(())
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Run(args) => run(cli, args),
        Command::Survey => {
            let mut report = RunReport::new();
            let ctx = cli.load_context(&mut report)?;
            let tree = survey(&ctx, ctx.load_schema()?)?;
            tree.print();
            report.print();
            Ok(())
        }
        Command::ConfigSchema => {
            println!("{}", SchemerConfig::json_schema()?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("Error: {e:?}").red());
            ExitCode::FAILURE
        }
    }
}
