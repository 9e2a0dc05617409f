//! sqlview - a terminal viewer for SQL Server tables and ad-hoc queries.

use sqlview::app::App;
use sqlview::cli::Cli;
use sqlview::config::{self, Config};
use sqlview::core::db::{open_session, Executor, QueryOutcome};
use sqlview::core::{Result, ViewerError};
use sqlview::logging;
use sqlview::results_grid::ResultsGrid;
use sqlview::tui::Tui;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse_args();

    let outcome = if cli.is_headless() {
        run_headless(&cli)
    } else {
        run_tui(&cli)
    };

    if let Err(e) = outcome {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e.detail());
        std::process::exit(1);
    }
}

fn load(cli: &Cli) -> Result<Config> {
    let mut config = config::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.database.validate()?;
    Ok(config)
}

/// Runs `--execute` and prints the result to stdout.
fn run_headless(cli: &Cli) -> Result<()> {
    logging::init_stderr_logging()?;
    let config = load(cli)?;
    let sql = cli.execute.as_deref().unwrap_or_default();

    let mut executor = Executor::new(open_session(&config.database)?);
    if let Some(database) = config.database.database.as_deref() {
        executor.use_database(database)?;
    }

    match executor.run_query(sql)? {
        QueryOutcome::Rows(result) => {
            let mut grid = ResultsGrid::new();
            grid.populate(&result.columns, &result.rows);
            let output = grid.export(&cli.format)?;
            if output.ends_with('\n') {
                print!("{output}");
            } else {
                println!("{output}");
            }
        }
        QueryOutcome::Command(result) => {
            println!("{} rows affected", result.rows_affected);
        }
    }
    executor.close();
    Ok(())
}

fn run_tui(cli: &Cli) -> Result<()> {
    let log_path = logging::init_file_logging()?;
    info!(log = %log_path.display(), "starting sqlview");
    let config = load(cli)?;

    let mut app = match open_session(&config.database) {
        Ok(session) => App::new(Some(Executor::new(session)), &config),
        Err(e) => {
            let mut app = App::new(None, &config);
            app.report(e);
            app
        }
    };
    app.startup(config.database.database.as_deref(), config.database.table.as_deref());

    let mut tui = Tui::new()?;
    tui.run(&mut app)
        .map_err(|e| ViewerError::Ui(format!("{} (log: {})", e.detail(), log_path.display())))
}
