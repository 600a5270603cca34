//! Weave CLI - Command line interface
//!
//! Project-based generation - all targets come from weave.json

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{debug, info, Level};

mod config;
mod logging;
mod platform;

use crate::config::{parse_level, to_tracing_level, LogConfig};
use crate::logging::LogFormat;
use crate::platform::print_error;
use weave_api::{
    init_config, GeneratedFile, LogLevel, ProjectConfig, RunConfig, WeaveError, Weaver,
    PROJECT_FILE,
};
use weave_vfs::{NativeFileSystem, VirtualFileSystem};

/// 生成结果的输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Go source
    Go,
    /// Providers and file paths as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "weave",
    about = "Compile-time dependency injection - generates provider functions",
    version
)]
struct Cli {
    /// Project file path
    #[arg(value_name = "CONFIG", default_value = PROJECT_FILE)]
    config: PathBuf,

    /// Print generated files instead of writing them
    #[arg(long)]
    stdout: bool,

    /// Output format for --stdout and error reports
    #[arg(long, value_enum, default_value_t = OutputFormat::Go)]
    format: OutputFormat,

    /// Disable hoisting for every target
    #[arg(long)]
    no_hoist: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Log level for the declaration parser
    #[arg(long, value_name = "LEVEL", value_parser = parse_level)]
    log_parser: Option<Level>,

    /// Log level for the declaration finder
    #[arg(long, value_name = "LEVEL", value_parser = parse_level)]
    log_finder: Option<Level>,

    /// Log level for graph loading
    #[arg(long, value_name = "LEVEL", value_parser = parse_level)]
    log_loader: Option<Level>,

    /// Log level for hoisting
    #[arg(long, value_name = "LEVEL", value_parser = parse_level)]
    log_hoist: Option<Level>,

    /// Log level for code generation
    #[arg(long, value_name = "LEVEL", value_parser = parse_level)]
    log_generator: Option<Level>,
}

impl Cli {
    fn log_config(&self, project: &ProjectConfig) -> LogConfig {
        let mut log_config = LogConfig::default();
        if let Some(level) = project.log.as_deref().and_then(LogLevel::parse) {
            log_config.global = to_tracing_level(level);
        }
        LogConfig {
            parser: self.log_parser,
            finder: self.log_finder,
            loader: self.log_loader,
            hoist: self.log_hoist,
            generator: self.log_generator,
            ..log_config
        }
        .with_verbosity(self.verbose)
    }
}

fn main() {
    let cli = Cli::parse();
    let vfs: Arc<dyn VirtualFileSystem> = Arc::new(NativeFileSystem::new());
    let json = cli.format == OutputFormat::Json;

    let mut project = match read_project(vfs.as_ref(), &cli.config) {
        Ok(project) => project,
        Err(e) => {
            print_error(&e, vfs.as_ref(), json);
            process::exit(1);
        }
    };
    logging::init(&cli.log_config(&project), cli.log_format);

    if cli.no_hoist {
        disable_hoisting(&mut project);
    }

    if let Err(e) = run(&cli, &project, vfs.clone()) {
        print_error(&e, vfs.as_ref(), json);
        process::exit(1);
    }
}

fn run(cli: &Cli, project: &ProjectConfig, vfs: Arc<dyn VirtualFileSystem>) -> Result<(), WeaveError> {
    let root = project_root(&cli.config);
    let run_config = RunConfig::from_project(project, &root, vfs.as_ref())?;
    debug!(target: "weave::cli", module = %run_config.module, root = %root.display(), "Resolved project");

    // Initialize API config (global singleton for convenience)
    init_config(run_config);
    let weaver = Weaver::from_global(vfs);

    let files = weaver.generate_project(project)?;
    if cli.stdout {
        print_files(&files, cli.format);
    } else {
        weaver.write(&files)?;
        for file in &files {
            println!("{}: wrote {}", file.target, file.path.display());
        }
    }
    info!(target: "weave::cli", targets = files.len(), "Done");
    Ok(())
}

/// Read and parse the project file
fn read_project(vfs: &dyn VirtualFileSystem, path: &Path) -> Result<ProjectConfig, WeaveError> {
    if !vfs.is_file(path) {
        return Err(WeaveError::Config(format!(
            "'{}' not found; create a project file listing the targets to generate",
            path.display()
        )));
    }
    let content = vfs.read_to_string(path)?;
    ProjectConfig::from_json(&content)
        .map_err(|e| WeaveError::Config(format!("failed to parse '{}': {}", path.display(), e)))
}

/// Project root is the directory holding the project file
fn project_root(config: &Path) -> PathBuf {
    match config.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn disable_hoisting(project: &mut ProjectConfig) {
    project.hoist = false;
    for target in &mut project.targets {
        target.hoist = Some(false);
    }
}

fn print_files(files: &[GeneratedFile], format: OutputFormat) {
    match format {
        OutputFormat::Go => {
            for (i, file) in files.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("// {}", file.path.display());
                print!("{}", file.source);
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(files) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: failed to serialize output: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_config::TargetConfig;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["weave"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("weave.json"));
        assert!(!cli.stdout);
        assert_eq!(cli.format, OutputFormat::Go);
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "weave",
            "app/weave.json",
            "--stdout",
            "--format",
            "json",
            "--no-hoist",
            "-vv",
            "--log-loader",
            "trace",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("app/weave.json"));
        assert!(cli.stdout && cli.no_hoist);
        assert_eq!(cli.format, OutputFormat::Json);

        let log_config = cli.log_config(&ProjectConfig::default());
        assert_eq!(log_config.global, Level::DEBUG);
        assert_eq!(log_config.loader, Some(Level::TRACE));
        assert!(Cli::try_parse_from(["weave", "--log-hoist", "loud"]).is_err());
    }

    #[test]
    fn test_project_log_level() {
        let cli = Cli::try_parse_from(["weave"]).unwrap();
        let project = ProjectConfig {
            log: Some("debug".to_string()),
            ..Default::default()
        };
        assert_eq!(cli.log_config(&project).global, Level::DEBUG);
    }

    #[test]
    fn test_project_root() {
        assert_eq!(project_root(Path::new("weave.json")), PathBuf::from("."));
        assert_eq!(
            project_root(Path::new("/work/app/weave.json")),
            PathBuf::from("/work/app")
        );
    }

    #[test]
    fn test_disable_hoisting() {
        let mut project = ProjectConfig {
            hoist: true,
            targets: vec![TargetConfig {
                hoist: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        };
        disable_hoisting(&mut project);
        assert!(!project.hoist);
        assert_eq!(project.targets[0].hoist, Some(false));
    }
}
