use br_app::{
    AppResult, ReportParams, ReportProgressEvent, ReportRequest, error_trace, model_service,
    report_service,
};
use br_core::timing::{enable_timing, sim_timing};
use br_scan::LineQuery;
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

mod render;

#[derive(Parser)]
#[command(name = "br-cli")]
#[command(about = "3-HP biorefinery report generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the biorefinery and print the report
    Report {
        /// Directory searched recursively for the model file
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Annual operating hours
        #[arg(long, default_value_t = ReportParams::default().operating_hours)]
        operating_hours: f64,
        /// Feedstock price in USD/kg
        #[arg(long, default_value_t = ReportParams::default().feedstock_price)]
        feedstock_price: f64,
        /// Electricity price in USD/kWh
        #[arg(long, default_value_t = ReportParams::default().electricity_price)]
        electricity_price: f64,
        /// Income tax rate as a fraction (0.35 = 35 %)
        #[arg(long, default_value_t = ReportParams::default().income_tax)]
        income_tax: f64,
        /// Target internal rate of return as a fraction
        #[arg(long, default_value_t = ReportParams::default().irr)]
        irr: f64,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Print phase timings (same as setting BR_TIMING)
        #[arg(long)]
        timing: bool,
    },
    /// Validate model file syntax and structure
    Validate {
        /// Path to the model YAML or JSON file
        model_path: PathBuf,
    },
    /// List systems in a model
    Systems {
        /// Path to the model YAML or JSON file
        model_path: PathBuf,
    },
    /// Find files whose given line holds an f-string with a backslash
    FindLine {
        /// Directory to walk
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Exact file name to check
        #[arg(long, default_value = br_scan::DEFAULT_FILE_NAME)]
        file_name: String,
        /// 1-based line number to check
        #[arg(long, default_value_t = br_scan::DEFAULT_LINE_NUMBER)]
        line: usize,
        /// Print every match instead of stopping at the first
        #[arg(long)]
        all: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result: Result<(), Box<dyn Error>> = match cli.command {
        Commands::Report {
            root,
            operating_hours,
            feedstock_price,
            electricity_price,
            income_tax,
            irr,
            format,
            timing,
        } => {
            if timing {
                enable_timing();
            }
            let params = ReportParams {
                operating_hours,
                feedstock_price,
                electricity_price,
                income_tax,
                irr,
            };
            cmd_report(&root, params, format)
        }
        Commands::Validate { model_path } => cmd_validate(&model_path).map_err(Into::into),
        Commands::Systems { model_path } => cmd_systems(&model_path).map_err(Into::into),
        Commands::FindLine {
            root,
            file_name,
            line,
            all,
        } => cmd_find_line(&root, file_name, line, all),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            clear_progress_line();
            eprintln!("Error: {}", error_trace(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn cmd_report(
    root: &Path,
    params: ReportParams,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let request = ReportRequest {
        root,
        params,
        cache: None,
    };
    let show_progress = format == OutputFormat::Text;
    sim_timing::reset_all();

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let report = report_service::generate_report_with_progress(
        &request,
        Some(&mut |event: ReportProgressEvent| {
            if !show_progress {
                return;
            }
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            clear_progress_line();
            println!("✓ Report completed: {}", report.report_id);
            render::print_report(&report);
            render::print_timing_summary(&report.timing);
            sim_timing::print_summary();
        }
    }
    Ok(())
}

fn cmd_validate(model_path: &Path) -> AppResult<()> {
    println!("Validating model: {}", model_path.display());
    let model = model_service::load_model(model_path)?;
    model_service::validate_model(&model)?;
    println!("✓ Model is valid");
    Ok(())
}

fn cmd_systems(model_path: &Path) -> AppResult<()> {
    let model = model_service::load_model(model_path)?;
    let systems = model_service::list_systems(&model);

    if systems.is_empty() {
        println!("No systems found in model");
    } else {
        println!("Systems in model:");
        for sys in systems {
            println!(
                "  {} - {} ({} feeds, {} units, {} products)",
                sys.id, sys.name, sys.feed_count, sys.unit_count, sys.product_count
            );
        }
    }
    Ok(())
}

fn cmd_find_line(
    root: &Path,
    file_name: String,
    line_number: usize,
    all: bool,
) -> Result<(), Box<dyn Error>> {
    let query = LineQuery {
        file_name,
        line_number,
    };

    let matches = if all {
        br_scan::scan(root, &query)?
    } else {
        br_scan::find_first(root, &query)?.into_iter().collect()
    };

    if matches.is_empty() {
        println!(
            "No {} with an f-string backslash on line {} under {}",
            query.file_name,
            query.line_number,
            root.display()
        );
    }
    for found in &matches {
        println!("{}:{}", found.path.display(), found.line_number);
        println!("  {}", found.line.trim_end());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &ReportProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}
