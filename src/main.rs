//! Command-line interface for hedvalidator

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use hedvalidator::input::{ColumnSpec, HedInputReader};
#[cfg(feature = "cli")]
use hedvalidator::report::{format_issues, format_row_issues};
#[cfg(feature = "cli")]
use hedvalidator::{Issue, SchemaDictionary, TagValidator, ValidatorConfig};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "hedvalidator")]
#[command(author, version, about = "HED annotation string validator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(clap::Args, Debug)]
struct RuleArgs {
    /// JSON file with a validator configuration
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Report warnings
    #[arg(short, long)]
    warnings: bool,

    /// Skip checks against the schema
    #[arg(long)]
    no_semantic: bool,

    /// Output issues as JSON
    #[arg(short, long)]
    json: bool,
}

#[cfg(feature = "cli")]
impl RuleArgs {
    fn config(&self) -> Result<ValidatorConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::from_json(&fs::read_to_string(path)?)?,
            None => ValidatorConfig::default(),
        };
        if self.warnings {
            config = config.with_warnings(true);
        }
        if self.no_semantic {
            config = config.with_semantic_validation(false);
        }
        Ok(config)
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate HED strings given on the command line
    Validate {
        /// Path to the HED schema (XML or JSON)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,

        /// HED strings to validate
        #[arg(value_name = "STRING", required = true)]
        strings: Vec<String>,
    },

    /// Validate the tag columns of a tab-separated file
    ValidateFile {
        /// Path to the HED schema (XML or JSON)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// 1-based tag columns, e.g. 2,3
        #[arg(short, long, default_value = "2")]
        columns: String,

        /// Column prefix, e.g. 3=Event/Label/ (repeatable)
        #[arg(short, long, value_name = "COLUMN=PREFIX")]
        prefix: Vec<String>,

        /// The file has no header row
        #[arg(long)]
        no_headers: bool,

        #[command(flatten)]
        rules: RuleArgs,

        /// Path to the TSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Summarize a HED schema
    Inspect {
        /// Path to the HED schema (XML or JSON)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            schema,
            rules,
            strings,
        } => cmd_validate(schema, rules, strings),
        Commands::ValidateFile {
            schema,
            columns,
            prefix,
            no_headers,
            rules,
            file,
        } => cmd_validate_file(schema, columns, prefix, no_headers, rules, file),
        Commands::Inspect { schema, json } => cmd_inspect(schema, json),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

#[cfg(feature = "cli")]
fn load_validator(
    schema_path: &Path,
    rules: &RuleArgs,
) -> Result<TagValidator, Box<dyn std::error::Error>> {
    let schema = SchemaDictionary::from_file(schema_path)?;
    Ok(TagValidator::new(Arc::new(schema), rules.config()?))
}

#[cfg(feature = "cli")]
fn has_errors<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> bool {
    issues.into_iter().any(Issue::is_error)
}

/// Returns `Ok(false)` when any error-severity issue was found
#[cfg(feature = "cli")]
fn cmd_validate(
    schema_path: PathBuf,
    rules: RuleArgs,
    strings: Vec<String>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let validator = load_validator(&schema_path, &rules)?;

    let results: Vec<(String, Vec<Issue>)> = strings
        .into_iter()
        .map(|s| {
            let issues = validator.validate_hed_string(&s);
            (s, issues)
        })
        .collect();
    let clean = !results.iter().any(|(_, issues)| has_errors(issues));

    if rules.json {
        let output: Vec<_> = results
            .iter()
            .map(|(s, issues)| serde_json::json!({ "string": s, "issues": issues }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (s, issues) in &results {
            if issues.is_empty() {
                println!("✓ {}", s);
            } else {
                println!("✗ {}", s);
                print!("{}", format_issues(issues));
            }
        }
    }
    Ok(clean)
}

#[cfg(feature = "cli")]
fn cmd_validate_file(
    schema_path: PathBuf,
    columns: String,
    prefixes: Vec<String>,
    no_headers: bool,
    rules: RuleArgs,
    file: PathBuf,
) -> Result<bool, Box<dyn std::error::Error>> {
    let validator = load_validator(&schema_path, &rules)?;

    let mut spec = ColumnSpec::new(ColumnSpec::parse_columns(&columns)?).with_headers(!no_headers);
    for prefix in &prefixes {
        let (column, prefix) = ColumnSpec::parse_prefix(prefix)?;
        spec = spec.with_prefix(column, prefix);
    }

    let rows = HedInputReader::new(validator, spec).validate_file(&file)?;
    let clean = !rows.iter().any(|row| has_errors(&row.issues));

    if rules.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("✓ {}: no issues", file.display());
    } else {
        print!("{}", format_row_issues(&rows));
    }
    Ok(clean)
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: PathBuf, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let schema = SchemaDictionary::from_file(&schema_path)?;

    let required: Vec<&str> = schema.required_nodes().map(|n| n.path()).collect();
    let unique: Vec<&str> = schema.unique_nodes().map(|n| n.path()).collect();

    if json {
        let unit_classes: Vec<_> = schema
            .unit_classes()
            .map(|uc| {
                serde_json::json!({
                    "name": uc.name(),
                    "units": uc.units().collect::<Vec<_>>(),
                    "default": uc.default_unit(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "version": schema.version(),
            "nodes": schema.len(),
            "roots": schema.roots().map(|n| n.name()).collect::<Vec<_>>(),
            "required": required,
            "unique": unique,
            "unitClasses": unit_classes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(true);
    }

    println!("Schema: {}", schema_path.display());
    println!("Version: {}", schema.version().unwrap_or("(unversioned)"));
    println!("Nodes: {}", schema.len());
    println!(
        "Top-level tags: {}",
        schema.roots().map(|n| n.name()).collect::<Vec<_>>().join(", ")
    );

    println!("\n=== Required ===");
    for path in &required {
        println!("  {}", path);
    }
    println!("\n=== Unique ===");
    for path in &unique {
        println!("  {}", path);
    }
    println!("\n=== Unit Classes ===");
    for uc in schema.unit_classes() {
        println!(
            "  {} [{}] (default {})",
            uc.name(),
            uc.units().collect::<Vec<_>>().join(", "),
            uc.default_unit()
        );
    }
    Ok(true)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
