//! Dobby CLI - Transform enrollment exports to the SN upload format
//!
//! # Main Commands
//!
//! ```bash
//! dobby transform alumnos.csv            # Transform to data/<timestamp>-alumnos-upload-sn.csv
//! dobby transform alumnos.csv -o out.csv # Transform to a given file
//! dobby validate alumnos.csv             # Report issues without writing anything
//! ```
//!
//! # Reference Commands
//!
//! ```bash
//! dobby stages                           # Show the pipeline stages
//! dobby lookups                          # Dump the built-in lookup tables as JSON
//! ```
//!
//! Every option can also be set through a `DOBBY_*` environment variable or
//! a `.env` file.

use chrono::Local;
use clap::{Parser, Subcommand};
use dobby::logs::setup_logger;
use dobby::{
    check_table, render_issues, stages_description, write_issue_report, Lookups, RunSummary,
    TextEncoding, TransformConfig, Transformer,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Issues listed on the console before the rest is summarized.
const CONSOLE_ISSUE_LIMIT: usize = 20;

#[derive(Parser)]
#[command(name = "dobby")]
#[command(about = "Transform student enrollment exports to the SN upload format", long_about = None)]
#[command(version)]
struct Cli {
    /// Print the run log to stderr (filter with DOBBY_LOG)
    #[arg(short, long, global = true, env = "DOBBY_VERBOSE")]
    verbose: bool,

    /// Log file, rolled daily as <name>.YYYY-MM-DD.<ext>
    #[arg(long, global = true, env = "DOBBY_LOG_FILE", default_value = "logs/dobby.log")]
    log_file: PathBuf,

    /// Do not write a log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads an export.
#[derive(clap::Args)]
struct InputArgs {
    /// Input CSV export
    input: PathBuf,

    /// JSON configuration file (flags override it)
    #[arg(long, env = "DOBBY_CONFIG")]
    config: Option<PathBuf>,

    /// JSON lookup tables replacing the built-in ones
    #[arg(long, env = "DOBBY_LOOKUPS")]
    lookups: Option<PathBuf>,

    /// Field separator
    #[arg(long, env = "DOBBY_SEPARATOR")]
    separator: Option<char>,

    /// Input encoding (utf-8, utf-8-sig, latin-1, windows-1252, auto)
    #[arg(long, env = "DOBBY_INPUT_ENCODING")]
    input_encoding: Option<TextEncoding>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full transformation: export CSV → SN upload CSV
    Transform {
        #[command(flatten)]
        source: InputArgs,

        /// Output file (default: data/YYYY-MM-DD-HHMM-alumnos-upload-sn.csv)
        #[arg(short, long, env = "DOBBY_OUTPUT")]
        output: Option<PathBuf>,

        /// School RBD
        #[arg(long, env = "DOBBY_RBD")]
        rbd: Option<i64>,

        /// Academic year
        #[arg(long, env = "DOBBY_YEAR")]
        year: Option<i32>,

        /// Location label
        #[arg(long, env = "DOBBY_LOCAL")]
        local: Option<String>,

        /// Output encoding (utf-8, utf-8-sig, latin-1, windows-1252)
        #[arg(long, env = "DOBBY_OUTPUT_ENCODING")]
        output_encoding: Option<TextEncoding>,

        /// Skip RUT and email validation
        #[arg(long)]
        skip_validation: bool,

        /// Also check every output row against the strict upload record
        #[arg(long)]
        strict: bool,

        /// Run the pipeline without writing the output file
        #[arg(long)]
        dry_run: bool,

        /// Write the summary and all issues to a JSON file
        #[arg(long, env = "DOBBY_REPORT")]
        report: Option<PathBuf>,
    },

    /// Run the pipeline with all validations and report issues
    Validate {
        #[command(flatten)]
        source: InputArgs,
    },

    /// Show the pipeline stages
    Stages,

    /// Dump the built-in lookup tables as JSON
    Lookups {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    // Flushes the log file on drop.
    let log_guard = match setup_logger(cli.verbose, log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("⚠️  Logging disabled: {}", e);
            None
        }
    };

    let result = match cli.command {
        Commands::Transform {
            source,
            output,
            rbd,
            year,
            local,
            output_encoding,
            skip_validation,
            strict,
            dry_run,
            report,
        } => {
            let options = TransformFlags {
                rbd,
                year,
                local,
                output_encoding,
                skip_validation,
            };
            cmd_transform(
                &source,
                options,
                output.as_deref(),
                strict,
                dry_run,
                report.as_deref(),
            )
        }

        Commands::Validate { source } => cmd_validate(&source),

        Commands::Stages => cmd_stages(),

        Commands::Lookups { output } => cmd_lookups(output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}

/// Flags of `transform` that override the configuration.
struct TransformFlags {
    rbd: Option<i64>,
    year: Option<i32>,
    local: Option<String>,
    output_encoding: Option<TextEncoding>,
    skip_validation: bool,
}

fn build_config(
    source: &InputArgs,
    flags: Option<TransformFlags>,
) -> Result<TransformConfig, Box<dyn std::error::Error>> {
    let mut config = match &source.config {
        Some(path) => TransformConfig::from_file(path)?,
        None => TransformConfig::default(),
    };

    if let Some(separator) = source.separator {
        config.field_separator = separator;
    }
    if let Some(encoding) = source.input_encoding {
        config.input_encoding = encoding;
    }

    if let Some(flags) = flags {
        if let Some(rbd) = flags.rbd {
            config.school_id = rbd;
        }
        if let Some(year) = flags.year {
            config.academic_year = year;
        }
        if let Some(local) = flags.local {
            config.location_label = local;
        }
        if let Some(encoding) = flags.output_encoding {
            config.output_encoding = encoding;
        }
        if flags.skip_validation {
            config.validate_identifier = false;
            config.validate_email = false;
        }
    }
    Ok(config)
}

fn build_transformer(
    source: &InputArgs,
    config: TransformConfig,
) -> Result<Transformer, Box<dyn std::error::Error>> {
    let lookups = match &source.lookups {
        Some(path) => {
            eprintln!("   Lookups: {}", path.display());
            Lookups::from_file(path)?
        }
        None => Lookups::default(),
    };
    Ok(Transformer::with_lookups(config, lookups)?)
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data").join(format!(
        "{}-alumnos-upload-sn.csv",
        Local::now().format("%Y-%m-%d-%H%M")
    ))
}

fn format_separator(c: char) -> String {
    match c {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_transform(
    source: &InputArgs,
    flags: TransformFlags,
    output: Option<&Path>,
    strict: bool,
    dry_run: bool,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", source.input.display());

    let config = build_config(source, Some(flags))?;
    eprintln!(
        "   RBD: {}  Year: {}  Local: {}",
        config.school_id, config.academic_year, config.location_label
    );
    eprintln!("   Separator: '{}'", format_separator(config.field_separator));
    if !config.validate_identifier && !config.validate_email {
        eprintln!("   Validation: skipped");
    }

    let transformer = build_transformer(source, config)?;
    let result = transformer.transform_file(&source.input)?;
    let summary = RunSummary::from_output(&result);

    eprintln!();
    eprint!("{}", summary.render());

    if result.has_issues() {
        eprintln!("\n⚠️  Validation issues:");
        eprint!("{}", render_issues(&result.issues, Some(CONSOLE_ISSUE_LIMIT)));
    }

    if strict {
        let strict_issues = check_table(&result.table);
        if strict_issues.is_empty() {
            eprintln!("\n✔️  Strict check: all {} rows conform", result.table.row_count());
        } else {
            eprintln!(
                "\n⚠️  Strict check: {} problems in {} rows",
                strict_issues.len(),
                strict_issues.affected_rows().len()
            );
            eprint!("{}", render_issues(&strict_issues, Some(CONSOLE_ISSUE_LIMIT)));
        }
    }

    if let Some(report_path) = report {
        write_issue_report(&summary, &result.issues, report_path)?;
        eprintln!("   💾 Issue report saved to: {}", report_path.display());
    }

    if dry_run {
        eprintln!("\n🔍 Dry run: output not written");
    } else {
        let path = output.map(Path::to_path_buf).unwrap_or_else(default_output_path);
        transformer.save(&result.table, &path)?;
        eprintln!("\n💾 Output written to: {}", path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_validate(source: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", source.input.display());

    let mut config = build_config(source, None)?;
    config.validate_identifier = true;
    config.validate_email = true;

    let transformer = build_transformer(source, config)?;
    let result = transformer.transform_file(&source.input)?;

    eprintln!(
        "\n📊 Results: {} rows, {} issues",
        result.table.row_count(),
        result.issues.len()
    );

    if result.has_issues() {
        eprint!("{}", render_issues(&result.issues, Some(CONSOLE_ISSUE_LIMIT)));
        return Err(format!(
            "{} rows failed validation",
            result.issues.affected_rows().len()
        )
        .into());
    }

    eprintln!("   ✅ All rows valid!");
    Ok(())
}

fn cmd_stages() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", stages_description());
    Ok(())
}

fn cmd_lookups(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = Lookups::default().to_json()?;
    match output {
        Some(p) => {
            fs::write(p, &json)?;
            eprintln!("💾 Lookups written to: {}", p.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
