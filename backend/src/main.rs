//! popstat CLI - World Bank population analysis
//!
//! # Commands
//!
//! ```bash
//! popstat analyze                       # Full run: summary, charts, processed CSV
//! popstat analyze --config run.json     # Same, with a configuration file
//! popstat summary --top 20              # Only print the statistics
//! popstat reshape data.csv -o long.csv  # Wide to long (+ growth) as CSV
//! popstat example-config                # Print the default configuration
//! ```

use clap::{Parser, Subcommand};
use popstat::logs::log_error;
use popstat::{
    basic_analysis, detect_year_columns, growth_rates, load_data, load_table, render_summary,
    reshape, run_analysis, write_growth_csv, write_population_csv, AnalysisConfig,
};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "popstat")]
#[command(about = "Analyze World Bank population data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: load → reshape → growth → summary → charts → CSV
    Analyze {
        /// Configuration file (JSON)
        #[arg(short, long, env = "POPSTAT_CONFIG")]
        config: Option<PathBuf>,

        /// Input CSV file (overrides the configuration)
        #[arg(short, long, env = "POPSTAT_INPUT")]
        input: Option<PathBuf>,

        /// Directory for relative output paths
        #[arg(long, env = "POPSTAT_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Drop regional and income aggregates
        #[arg(long)]
        exclude_aggregates: bool,

        /// Also write the Chart.js JSON of each chart to this directory
        #[arg(long)]
        chart_json: Option<PathBuf>,

        /// Also write the summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },

    /// Reshape a wide CSV into long rows
    Reshape {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Omit the growth rate column
        #[arg(long)]
        no_growth: bool,

        /// Lines before the header row
        #[arg(long, default_value = "4")]
        skip_rows: usize,
    },

    /// Print the basic statistics only
    Summary {
        /// Configuration file (JSON)
        #[arg(short, long, env = "POPSTAT_CONFIG")]
        config: Option<PathBuf>,

        /// Input CSV file (overrides the configuration)
        #[arg(short, long, env = "POPSTAT_INPUT")]
        input: Option<PathBuf>,

        /// Number of countries listed
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show the default configuration
    ExampleConfig,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            config,
            input,
            output_dir,
            exclude_aggregates,
            chart_json,
            summary_json,
        } => cmd_analyze(
            config.as_deref(),
            input,
            output_dir.as_deref(),
            exclude_aggregates,
            chart_json,
            summary_json,
        ),

        Commands::Reshape {
            input,
            output,
            no_growth,
            skip_rows,
        } => cmd_reshape(&input, output.as_deref(), no_growth, skip_rows),

        Commands::Summary { config, input, top } => cmd_summary(config.as_deref(), input, top),

        Commands::ExampleConfig => cmd_example_config(),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>, input: Option<PathBuf>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => {
            eprintln!("⚙️  Config: {}", path.display());
            AnalysisConfig::from_json_file(path)?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(input) = input {
        config.input_path = input;
    }
    Ok(config)
}

fn cmd_analyze(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    output_dir: Option<&Path>,
    exclude_aggregates: bool,
    chart_json: Option<PathBuf>,
    summary_json: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path, input)?;
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
        config.output_paths = config.output_paths.in_dir(dir);
    }
    config.exclude_aggregates |= exclude_aggregates;
    if chart_json.is_some() {
        config.output_paths.chart_json_dir = chart_json;
    }
    if summary_json.is_some() {
        config.output_paths.summary_json = summary_json;
    }

    println!("WORLD BANK POPULATION DATA ANALYSIS");
    println!("==================================");

    let result = run_analysis(&config)?;
    print!("{}", render_summary(&result.summary));

    println!("\nAnalysis complete! Results saved to:");
    for path in &result.written {
        println!("- {}", path.display());
    }
    Ok(())
}

fn cmd_reshape(
    input: &Path,
    output: Option<&Path>,
    no_growth: bool,
    skip_rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (table, _) = load_table(input, skip_rows)?;
    let years = detect_year_columns(&table);
    let long = reshape(&table, &years)?;
    eprintln!("⚙️  Reshaped: {} rows", long.len());

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    if no_growth {
        write_population_csv(writer, &long)?;
    } else {
        write_growth_csv(writer, &growth_rates(&long))?;
    }

    if let Some(path) = output {
        eprintln!("   💾 Saved to: {}", path.display());
    }
    Ok(())
}

fn cmd_summary(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    top: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path, input)?;
    let data = load_data(&config)?;

    let top = top.unwrap_or(config.top_n_summary);
    let summary = basic_analysis(&data.long, top, data.metadata.indicator_name())
        .ok_or("No records to analyze")?;
    print!("{}", render_summary(&summary));
    Ok(())
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AnalysisConfig::default().to_json()?);
    Ok(())
}
