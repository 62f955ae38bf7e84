use clap::Parser;
use invoice_organizer_lib::data::DataPreview;
use invoice_organizer_lib::opener::open_folder;
use invoice_organizer_lib::{
    DataFileError, Organizer, OrganizerConfig, OrganizerError, ProgressEvent, RunState,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "invoice-organizer")]
#[command(
    about = "Organize PDF invoices into location/requester/supplier folders",
    long_about = None
)]
struct Cli {
    /// CSV or spreadsheet with one purchase order per row
    #[arg(long, short = 'd')]
    data_file: Option<PathBuf>,

    /// Flat folder holding the `<invoice>.pdf` files
    #[arg(long, short = 'p')]
    pdf_dir: Option<PathBuf>,

    /// Where to build the folder structure [default: ./<outputFolderName>]
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// JSON config file overriding column names and placeholders
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the data preview and stop
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Print the summary and folder tree as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Open the output folder when done
    #[arg(long, default_value_t = false)]
    open: bool,
}

/// Paths picked for a run
struct Selection {
    data_file: PathBuf,
    pdf_dir: PathBuf,
    output_dir: PathBuf,
}

/// Missing paths count as an abandoned selection
fn select_paths(cli: &Cli, config: &OrganizerConfig) -> Result<Selection, OrganizerError> {
    let data_file = cli
        .data_file
        .clone()
        .ok_or_else(|| OrganizerError::UserCancelled("no data file selected".to_string()))?;
    let pdf_dir = cli
        .pdf_dir
        .clone()
        .ok_or_else(|| OrganizerError::UserCancelled("no PDF folder selected".to_string()))?;

    let output_dir = match &cli.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| OrganizerError::OutputDirectory {
                path: PathBuf::from("."),
                source: e,
            })?
            .join(&config.output_folder_name),
    };

    Ok(Selection {
        data_file,
        pdf_dir,
        output_dir,
    })
}

fn render_progress(pdf_extension: String) -> Box<dyn Fn(&ProgressEvent) + Send + Sync> {
    Box::new(move |event: &ProgressEvent| match event {
        ProgressEvent::FolderCreated { path, depth } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            println!("{}Folder created: {}", "  ".repeat(depth.saturating_sub(1)), name);
        }
        ProgressEvent::Copied {
            invoice,
            destination,
            ..
        } => {
            println!(
                "      Copied: {}{} -> {}",
                invoice,
                pdf_extension,
                destination
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
        }
        ProgressEvent::NotFound { invoice, .. } => {
            println!("      Not found: {}{}", invoice, pdf_extension);
        }
        ProgressEvent::CopyFailed {
            invoice, message, ..
        } => {
            println!("      Error copying {}{}: {}", invoice, pdf_extension, message);
        }
    })
}

fn report_error(err: &OrganizerError, config: &OrganizerConfig) -> ExitCode {
    match err {
        OrganizerError::UserCancelled(_) => eprintln!("Operation cancelled: {err}"),
        OrganizerError::DataFile(DataFileError::MissingColumns(_)) => {
            eprintln!("ERROR: {err}");
            eprintln!("The file must contain these columns:");
            for col in config.required_columns() {
                eprintln!("  - {col}");
            }
        }
        _ => eprintln!("ERROR: {err}"),
    }
    tracing::error!("[Cli] {}", err);
    ExitCode::from(err.exit_code())
}

fn print_preview(preview: &DataPreview, json: bool) {
    if json {
        match serde_json::to_string_pretty(preview) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!("[Cli] Failed to serialize preview: {}", e),
        }
    } else {
        println!("{preview}");
    }
}

async fn run(cli: Cli) -> ExitCode {
    let config = match OrganizerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report_error(&e, &OrganizerConfig::default()),
    };

    let selection = match select_paths(&cli, &config) {
        Ok(selection) => selection,
        Err(e) => return report_error(&e, &config),
    };

    if !cli.json {
        println!("=== STARTING ORGANIZATION ===");
        println!("Data file: {}", selection.data_file.display());
        println!("PDF folder: {}", selection.pdf_dir.display());
        println!("Output folder: {}", selection.output_dir.display());
        println!("{}", "-".repeat(50));
    }

    let mut organizer = match Organizer::new(
        &selection.data_file,
        &selection.pdf_dir,
        &selection.output_dir,
        config.clone(),
    ) {
        Ok(organizer) => organizer,
        Err(e) => return report_error(&e, &config),
    };

    if !cli.json {
        organizer = organizer.with_progress(render_progress(config.pdf_extension.clone()));
    }

    // Reading the data file happens off the runtime so Ctrl-C is heard throughout
    let abort = organizer.abort_flag();
    let (preview_only, json) = (cli.preview, cli.json);
    let mut task = tokio::task::spawn_blocking(move || {
        let result = organizer.preview().and_then(|preview| {
            if preview_only || !json {
                print_preview(&preview, json);
            }
            if preview_only {
                Ok(None)
            } else {
                organizer.run().map(Some)
            }
        });
        (organizer, result)
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("[Cli] Interrupt received, stopping after the current record");
            abort.abort();
            task.await
        }
    };

    let (organizer, result) = match joined {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("[Cli] Organizer task failed: {}", e);
            eprintln!("ERROR: unexpected failure: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match result {
        Ok(None) => return ExitCode::SUCCESS,
        // The preview failed before the run started
        Err(e) if organizer.state() == RunState::Initialized => return report_error(&e, &config),
        other => other,
    };

    let summary = organizer.summary();
    let tree = organizer.directory_tree();

    if cli.json {
        let tree_value = tree.as_ref().ok();
        let payload = serde_json::json!({ "summary": summary, "tree": tree_value });
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!("[Cli] Failed to serialize summary: {}", e),
        }
    } else if summary.state != RunState::Failed {
        println!();
        println!("{summary}");
        match &tree {
            Ok(tree) => println!("\n{tree}"),
            Err(e) => eprintln!("Could not display structure: {e}"),
        }
    }

    if let Err(e) = result {
        return report_error(&e, &config);
    }

    if !cli.json {
        println!("\nPROCESS COMPLETED");
        println!("Check the organized folder at: {}", organizer.output_dir().display());
    }

    if cli.open && !open_folder(organizer.output_dir()) && !cli.json {
        println!("Could not open the folder automatically");
    }

    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    invoice_organizer_lib::init_tracing();
    let cli = Cli::parse();
    run(cli).await
}
