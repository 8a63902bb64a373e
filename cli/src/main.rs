use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use command_signature_compiler::catalog::{collect_definition_paths, load_definitions};
use command_signature_compiler::config::DEFAULT_CONFIG_FILE;
use command_signature_compiler::output::{
    OutputFormat, format_catalog, format_command, format_plan,
};
use command_signature_compiler::plan::build_plan;
use command_signature_compiler::{CatalogConfig, build_catalog, compile};
use command_signature_core::SignatureDefinition;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "signature-compile")]
#[command(about = "Compile declarative console command signatures")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile one signature and print the compiled command.
    Compile(CompileArgs),
    /// Print the registration plan a dispatcher would apply.
    Plan(PlanArgs),
    /// Compile every definition file into a command catalog.
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// Signature file, or `-` to read from stdin.
    #[arg(long)]
    input: PathBuf,
    /// Command description attached to the compiled command.
    #[arg(long)]
    description: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Signature file, or `-` to read from stdin.
    #[arg(long)]
    input: PathBuf,
    /// Command description attached to the base route.
    #[arg(long)]
    description: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Definition files and/or directories (default: the config's discovery paths).
    inputs: Vec<PathBuf>,
    /// Catalog configuration file (default: .signatures.yml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the catalog to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Number of parallel compile jobs.
    #[arg(long)]
    jobs: Option<usize>,
    /// Name of the CLI application the catalog describes.
    #[arg(long)]
    cli_name: Option<String>,
    /// Comma-separated base commands to leave out.
    #[arg(long)]
    exclude: Option<String>,
    /// Print the registration plan instead of the compiled commands.
    #[arg(long)]
    plan: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Compile(args) => run_compile(args),
        Command::Plan(args) => run_plan(args),
        Command::Catalog(args) => run_catalog(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(err) = result {
        eprintln!("warning: failed to initialize logging: {err}");
    }
}

fn run_compile(args: CompileArgs) -> Result<(), String> {
    let definition = read_definition(&args.input, args.description)?;
    let command = compile(&definition);
    debug!(command = %command.base_command, "Compiled signature");

    let rendered = format_command(&command, args.format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<(), String> {
    let definition = read_definition(&args.input, args.description)?;
    let plan = build_plan(&[compile(&definition)]);

    let rendered = format_plan(&plan, args.format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_catalog(args: CatalogArgs) -> Result<(), String> {
    let (mut config, config_dir) = load_config(args.config.as_deref())?;

    if let Some(jobs) = args.jobs {
        if jobs == 0 {
            return Err("--jobs must be greater than 0".to_string());
        }
        config.jobs = Some(jobs);
    }
    if let Some(cli_name) = args.cli_name {
        config.cli_name = cli_name;
    }
    config.exclude.extend(parse_csv_list(args.exclude));

    let inputs = if args.inputs.is_empty() {
        config
            .discovery_paths
            .iter()
            .map(|path| config_dir.join(path))
            .collect()
    } else {
        args.inputs
    };
    if inputs.is_empty() {
        return Err(format!(
            "No definition inputs given and no discovery_paths configured in {DEFAULT_CONFIG_FILE}"
        ));
    }

    let paths = collect_definition_paths(&inputs).map_err(|err| err.to_string())?;
    let definitions = load_definitions(&paths).map_err(|err| err.to_string())?;
    let catalog = build_catalog(&definitions, &config).map_err(|err| err.to_string())?;

    let rendered = if args.plan {
        format_plan(&catalog.plan(), args.format)?
    } else {
        format_catalog(&catalog, args.format)?
    };

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{}\n", rendered.trim_end()))
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            info!(path = %path.display(), commands = catalog.commands.len(), "Wrote catalog");
            eprintln!(
                "Wrote {} commands to {}",
                catalog.commands.len(),
                path.display()
            );
        }
        None => println!("{}", rendered.trim_end()),
    }

    Ok(())
}

/// Loads the explicit config file, or the default one from the working
/// directory when it exists. Returns the directory relative paths resolve
/// against.
fn load_config(path: Option<&Path>) -> Result<(CatalogConfig, PathBuf), String> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok((CatalogConfig::default(), PathBuf::from(".")));
            }
            default
        }
    };

    let config = CatalogConfig::load(&path)
        .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    debug!(path = %path.display(), "Loaded catalog config");
    Ok((config, dir))
}

fn read_definition(
    input: &Path,
    description: Option<String>,
) -> Result<SignatureDefinition, String> {
    let signature = if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        text
    } else {
        fs::read_to_string(input)
            .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?
    };

    let mut definition = SignatureDefinition::new(&signature);
    definition.description = description;
    Ok(definition)
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_list() {
        assert_eq!(
            parse_csv_list(Some(" debug, ,serve ".to_string())),
            vec!["debug", "serve"]
        );
        assert!(parse_csv_list(None).is_empty());
    }

    #[test]
    fn test_load_config_resolves_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yml");
        fs::write(&path, "version: \"1.0\"\ncli_name: artisan\n").unwrap();

        let (config, config_dir) = load_config(Some(&path)).unwrap();
        assert_eq!(config.cli_name, "artisan");
        assert_eq!(config_dir, dir.path());
    }

    #[test]
    fn test_load_config_missing_explicit_file_fails() {
        let err = load_config(Some(Path::new("/definitely/missing.yml"))).unwrap_err();
        assert!(err.contains("Failed to load config"));
    }

    #[test]
    fn test_cli_parses_catalog_arguments() {
        let cli = Cli::try_parse_from([
            "signature-compile",
            "-vv",
            "catalog",
            "commands",
            "--jobs",
            "2",
            "--format",
            "markdown",
            "--plan",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Catalog(args) = cli.command else {
            panic!("expected catalog command");
        };
        assert_eq!(args.inputs, vec![PathBuf::from("commands")]);
        assert_eq!(args.jobs, Some(2));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.plan);
    }
}
