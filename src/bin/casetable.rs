/// CaseTable command-line viewer
///
/// Loads a case-record CSV and prints one page of it, optionally after a
/// search, a sort or a cleaning run.

use casetable::{CleaningConfig, Page, Session, SessionConfig, SortOrder, TableError};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "casetable", version, about = "Browse and clean case-record CSV files")]
struct Cli {
    /// CSV file to load
    file: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows per page (overrides the config file and CASETABLE_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<usize>,

    /// Page to print
    #[arg(long, default_value_t = 1)]
    page: i64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a page of the table as loaded
    Show,
    /// Keep rows whose column contains a keyword (case-insensitive)
    Search { column: String, keyword: String },
    /// Sort by a column
    Sort {
        column: String,
        #[arg(long)]
        descending: bool,
    },
    /// Run the cleaning pipeline and print the report
    Clean(CleanArgs),
    /// Report data-quality issues without changing anything
    Inspect,
}

#[derive(Args)]
struct CleanArgs {
    #[arg(long)]
    no_impute: bool,
    #[arg(long)]
    no_dedup: bool,
    #[arg(long)]
    no_case: bool,
    #[arg(long)]
    no_dates: bool,
    /// Write the cleaned table here
    #[arg(long)]
    output: Option<PathBuf>,
}

impl CleanArgs {
    fn config(&self) -> CleaningConfig {
        CleaningConfig::default()
            .with_imputation(!self.no_impute)
            .with_deduplication(!self.no_dedup)
            .with_case_standardization(!self.no_case)
            .with_date_coercion(!self.no_dates)
    }
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TableError> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(size) = cli.page_size {
        config = config.with_page_size(size);
    }
    if let Some(Command::Clean(args)) = &cli.command {
        config.cleaning = args.config();
    }

    let mut session = Session::new(config)?;
    session.open_csv(&cli.file);

    match &cli.command {
        None | Some(Command::Show) => {}
        Some(Command::Search { column, keyword }) => {
            session.search(column, keyword)?;
        }
        Some(Command::Sort { column, descending }) => {
            session.sort(column, SortOrder::from_ascending(!descending))?;
        }
        Some(Command::Clean(args)) => {
            let report = session.clean()?;
            println!("{}\n", report);
            if let Some(output) = &args.output {
                session.save_csv(output)?;
            }
        }
        Some(Command::Inspect) => {
            println!("{}", session.inspect()?);
            return Ok(());
        }
    }

    let page = if cli.page == 1 {
        session.current_page()?
    } else {
        session.goto_page(cli.page)?
    };
    print_page(session.current()?.columns(), &page, session.total_records());
    Ok(())
}

fn print_page(columns: &[String], page: &Page, total_records: usize) {
    println!("{}", columns.join("\t"));
    for row in page.rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.get(c).map(ToString::to_string).unwrap_or_default())
            .collect();
        println!("{}", cells.join("\t"));
    }
    println!(
        "\nPage {}/{}  Total records: {}",
        page.number(),
        page.total_pages(),
        total_records
    );
}
