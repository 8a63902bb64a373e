//! Definition discovery and catalog building.
//!
//! Signature definitions live in files: raw signature text (`.sig`,
//! `.signature`) or YAML/JSON documents holding one definition or a list of
//! them. This module collects those files, loads them, and compiles every
//! definition into a [`CommandCatalog`].

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use command_signature_core::{ParsedCommand, SignatureDefinition};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::plan::{RegistrationPlan, build_plan};
use crate::signature::compile;

/// Version of the catalog output format.
pub const CATALOG_FORMAT_VERSION: &str = "1.0.0";

const SIGNATURE_EXTENSIONS: &[&str] = &["sig", "signature"];
const DOCUMENT_EXTENSIONS: &[&str] = &["yml", "yaml", "json"];

/// Compiled commands of one CLI application.
#[derive(Debug, Clone, Serialize)]
pub struct CommandCatalog<'h> {
    /// Catalog format version.
    pub version: String,
    pub cli_name: String,
    /// RFC 3339 timestamp of the build.
    pub generated_at: String,
    /// Compiled commands sorted by base command.
    pub commands: Vec<ParsedCommand<'h>>,
    /// Base commands left out by the configuration.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl CommandCatalog<'_> {
    /// Builds the registration plan for every command in the catalog.
    pub fn plan(&self) -> RegistrationPlan {
        build_plan(&self.commands)
    }

    /// Finds a compiled command by base command.
    pub fn find_command(&self, base_command: &str) -> Option<&ParsedCommand<'_>> {
        self.commands
            .iter()
            .find(|cmd| cmd.base_command == base_command)
    }
}

/// A definition document holds a single definition or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionDocument {
    Many(Vec<SignatureDefinition>),
    One(SignatureDefinition),
}

impl DefinitionDocument {
    fn into_vec(self) -> Vec<SignatureDefinition> {
        match self {
            Self::Many(definitions) => definitions,
            Self::One(definition) => vec![definition],
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.contains(&ext))
}

fn is_definition_file(path: &Path) -> bool {
    has_extension(path, SIGNATURE_EXTENSIONS) || has_extension(path, DOCUMENT_EXTENSIONS)
}

/// Collects definition file paths from input files and/or directories.
///
/// Directories are scanned one level deep; files with unrelated extensions
/// are skipped there but rejected when named explicitly.
pub fn collect_definition_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(CatalogError::InvalidInput(
            "No definition paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_definition_file(&path) {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if !is_definition_file(input) {
                return Err(CatalogError::InvalidInput(format!(
                    "Definition file '{}' must end in .sig, .signature, .yml, .yaml or .json",
                    input.display()
                )));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(CatalogError::InvalidInput(format!(
            "Definition path '{}' does not exist",
            input.display(),
        )));
    }

    if paths.is_empty() {
        return Err(CatalogError::InvalidInput(
            "No definition files found in provided paths".to_string(),
        ));
    }

    Ok(paths.into_iter().collect())
}

/// Loads every definition from `paths`, in path order.
pub fn load_definitions(paths: &[PathBuf]) -> Result<Vec<SignatureDefinition>> {
    let mut definitions = Vec::new();

    for path in paths {
        let raw = fs::read_to_string(path)?;
        let source = path.display().to_string();

        let loaded = if has_extension(path, SIGNATURE_EXTENSIONS) {
            vec![SignatureDefinition::new(&raw)]
        } else if has_extension(path, &["json"]) {
            serde_json::from_str::<DefinitionDocument>(&raw)?.into_vec()
        } else {
            serde_yaml::from_str::<DefinitionDocument>(&raw)?.into_vec()
        };

        debug!(path = %source, count = loaded.len(), "Loaded signature definitions");
        definitions.extend(loaded.into_iter().map(|mut definition| {
            definition.source.get_or_insert_with(|| source.clone());
            definition
        }));
    }

    Ok(definitions)
}

/// Compiles `definitions` into a catalog.
///
/// Compilation runs on a dedicated thread pool; results are filtered by the
/// configuration and sorted by base command so output is deterministic.
pub fn build_catalog<'h>(
    definitions: &'h [SignatureDefinition],
    config: &CatalogConfig,
) -> Result<CommandCatalog<'h>> {
    let jobs = config
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(definitions.len()));
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let compiled: Vec<ParsedCommand<'h>> = pool.install(|| {
        definitions
            .par_iter()
            .map(|definition| compile(definition))
            .collect()
    });

    let mut commands = Vec::with_capacity(compiled.len());
    let mut skipped = Vec::new();
    for command in compiled {
        // Hidden namespaces still carry the routes of their sub-commands.
        let hidden_skipped =
            command.is_hidden && !command.is_namespace_command && !config.include_hidden;
        if config.is_excluded(&command.base_command) || hidden_skipped {
            skipped.push(command.base_command);
            continue;
        }
        commands.push(command);
    }
    commands.sort_by(|a, b| a.base_command.cmp(&b.base_command));
    skipped.sort();

    info!(
        commands = commands.len(),
        skipped = skipped.len(),
        jobs,
        "Built command catalog"
    );

    Ok(CommandCatalog {
        version: CATALOG_FORMAT_VERSION.to_string(),
        cli_name: config.cli_name.clone(),
        generated_at: Utc::now().to_rfc3339(),
        commands,
        skipped,
    })
}

fn default_parallel_jobs(definition_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(8).min(definition_count.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_collect_definition_paths_filters_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        let sig = write(dir.path(), "hello.sig", "hello {name}");
        let yaml = write(dir.path(), "make.yml", "signature: make");
        write(dir.path(), "notes.txt", "ignore");

        let paths = collect_definition_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(paths, vec![sig, yaml]);
    }

    #[test]
    fn test_collect_definition_paths_rejects_explicit_unknown_file() {
        let dir = tempfile::tempdir().unwrap();
        let txt = write(dir.path(), "notes.txt", "ignore");

        let err = collect_definition_paths(&[txt]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[test]
    fn test_collect_definition_paths_rejects_missing_and_empty() {
        assert!(collect_definition_paths(&[]).is_err());
        assert!(collect_definition_paths(&[PathBuf::from("/definitely/not/here")]).is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(collect_definition_paths(&[dir.path().to_path_buf()]).is_err());
    }

    #[test]
    fn test_load_definitions_from_all_formats() {
        let dir = tempfile::tempdir().unwrap();
        let sig = write(dir.path(), "a.sig", "hello\n{name : Who}\n");
        let yaml = write(
            dir.path(),
            "b.yaml",
            "- signature: \"make:\\n{model : Model}\"\n  description: Generators\n- signature: serve\n",
        );
        let json = write(
            dir.path(),
            "c.json",
            r#"{"signature": "queue\\n{--tries=3 : Tries}", "description": "Work the queue"}"#,
        );

        let definitions = load_definitions(&[sig.clone(), yaml, json]).unwrap();
        assert_eq!(definitions.len(), 4);
        assert_eq!(definitions[0].signature, "hello\n{name : Who}\n");
        assert_eq!(definitions[0].source.as_deref(), Some(sig.display().to_string().as_str()));
        assert_eq!(definitions[1].description.as_deref(), Some("Generators"));
        assert_eq!(definitions[2].signature, "serve");
        assert_eq!(definitions[3].description.as_deref(), Some("Work the queue"));
    }

    #[test]
    fn test_load_definitions_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let json = write(dir.path(), "bad.json", "{not json");

        let err = load_definitions(&[json]).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_build_catalog_sorts_and_filters() {
        let definitions = vec![
            SignatureDefinition::new("zeta {name}"),
            SignatureDefinition::new("#internal"),
            SignatureDefinition::new("alpha:\n{run : Run}"),
            SignatureDefinition::new("debug"),
        ];
        let config = CatalogConfig {
            exclude: vec!["debug".to_string()],
            include_hidden: false,
            jobs: Some(2),
            ..CatalogConfig::default()
        };

        let catalog = build_catalog(&definitions, &config).unwrap();
        let names: Vec<&str> = catalog
            .commands
            .iter()
            .map(|cmd| cmd.base_command.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(catalog.skipped, vec!["debug", "internal"]);
        assert_eq!(catalog.version, CATALOG_FORMAT_VERSION);
        assert!(catalog.generated_at.contains('T'));
        assert!(catalog.find_command("alpha").unwrap().is_namespace_command);
    }

    #[test]
    fn test_build_catalog_keeps_hidden_namespaces() {
        let definitions = vec![
            SignatureDefinition::new("#ops:\n{sync : Sync}\n{--quiet : Quiet}"),
            SignatureDefinition::new("#internal"),
        ];
        let config = CatalogConfig {
            include_hidden: false,
            ..CatalogConfig::default()
        };

        let catalog = build_catalog(&definitions, &config).unwrap();
        assert_eq!(catalog.commands.len(), 1);
        assert_eq!(catalog.skipped, vec!["internal"]);

        let plan = catalog.plan();
        assert_eq!(plan.route_names(), vec!["ops:sync"]);
        assert!(plan.find_route("ops:sync").unwrap().hidden);
        assert_eq!(plan.root_options.len(), 1);
    }

    #[test]
    fn test_build_catalog_plan_covers_all_commands() {
        let definitions = vec![
            SignatureDefinition::new("alpha:\n{run : Run}\n{stop : Stop}"),
            SignatureDefinition::new("beta"),
        ];
        let catalog = build_catalog(&definitions, &CatalogConfig::default()).unwrap();

        let plan = catalog.plan();
        assert_eq!(
            plan.route_names(),
            vec!["alpha", "alpha:run", "alpha:stop", "beta"]
        );
    }

    #[test]
    fn test_parallel_build_matches_sequential_compile() {
        let definitions: Vec<SignatureDefinition> = (0..32)
            .map(|i| SignatureDefinition::new(&format!("cmd{i:02}\n{{--n={i} : N}}")))
            .collect();
        let config = CatalogConfig {
            jobs: Some(4),
            ..CatalogConfig::default()
        };

        let catalog = build_catalog(&definitions, &config).unwrap();
        for (definition, command) in definitions.iter().zip(&catalog.commands) {
            assert_eq!(*command, compile(definition));
        }
    }

    #[test]
    fn test_default_parallel_jobs_is_non_zero_and_bounded_by_workload() {
        assert_eq!(default_parallel_jobs(0), 1);
        assert_eq!(default_parallel_jobs(1), 1);
        assert!(default_parallel_jobs(1000) <= 8);
    }
}
