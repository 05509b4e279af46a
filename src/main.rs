//! patchtoggle: toggle patches in patch files from the terminal.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use patchtoggle::app_state::{AppState, Session};
use patchtoggle::apply::{self, Outcome};
use patchtoggle::patch::{grid_position, Status};
use patchtoggle::plan::ChangePlan;
use patchtoggle::{config, input, ui};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "patchtoggle")]
#[command(about = "Toggle patches in patch files and save the choices", long_about = None)]
struct Args {
    /// Patch files or directories containing them
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// File extensions to match when searching directories
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,

    /// Print the patches in each file and exit
    #[arg(long)]
    list: bool,

    /// Enable the named patch (repeatable)
    #[arg(long, value_name = "NAME")]
    enable: Vec<String>,

    /// Disable the named patch (repeatable)
    #[arg(long, value_name = "NAME")]
    disable: Vec<String>,

    /// Disable every patch before applying --enable
    #[arg(long)]
    disable_all: bool,

    /// Apply the statuses in a JSON change plan
    #[arg(long, value_name = "FILE")]
    load_plan: Option<PathBuf>,

    /// Validate and print the change plan without writing
    #[arg(long)]
    dry_run: bool,

    /// Log more (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn is_batch(&self) -> bool {
        !self.enable.is_empty()
            || !self.disable.is_empty()
            || self.disable_all
            || self.load_plan.is_some()
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let interactive = !args.list && !args.is_batch();
    init_logging(args.verbose, interactive);

    let mut cfg = config::Config::load();

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions.clone_from(&args.ext);
    }

    let files = input::find_patch_files(args.paths.clone(), &cfg.file_extensions)?;
    if files.is_empty() {
        eprintln!("No matching files found");
        return Ok(());
    }

    let session = Session::load(&files);
    for error in &session.read_errors {
        eprintln!("File Error!\n\n{error}\n");
    }

    if args.list {
        print!("{}", format_list(&session, cfg.columns));
        return Ok(());
    }

    if session.is_empty() {
        eprintln!("No patches found in the selected files");
        return Ok(());
    }

    if args.is_batch() {
        return run_batch(session, &args);
    }

    run_tui(AppState::new(session))
}

fn init_logging(verbose: u8, interactive: bool) {
    // Log lines would corrupt the alternate screen.
    let level = match (interactive, verbose) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, _) => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Checkbox grid per file, followed by that file's parse warnings.
fn format_list(session: &Session, columns: usize) -> String {
    let columns = columns.max(1);
    let mut out = String::new();

    for (file, records) in session.records() {
        out.push_str(&format!("{}\n", file.display()));
        let labels: Vec<String> = records.iter().map(|r| r.label()).collect();
        let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        for (pos, (record, label)) in records.iter().zip(&labels).enumerate() {
            let (_, col) = grid_position(pos, columns);
            let mark = if record.status == Status::Enabled { 'x' } else { ' ' };
            if col == 0 {
                out.push_str("  ");
            }
            out.push_str(&format!("[{mark}] {label:<width$}"));
            if col + 1 == columns || pos + 1 == records.len() {
                out.push('\n');
            } else {
                out.push_str("  ");
            }
        }

        for warning in session.warnings.get(file).into_iter().flatten() {
            out.push_str(&format!("  warning: {warning}\n"));
        }
    }

    out
}

fn run_batch(mut session: Session, args: &Args) -> io::Result<()> {
    if let Some(plan_path) = &args.load_plan {
        let file_content = std::fs::read_to_string(plan_path)?;
        let plan: ChangePlan = serde_json::from_str(&file_content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        for miss in session.load_plan(plan) {
            eprintln!(
                "No patch named {} in {}",
                miss.change.name,
                miss.change.file.display()
            );
        }
    }

    if args.disable_all {
        session.disable_all();
    }
    for (names, status) in [
        (&args.enable, Status::Enabled),
        (&args.disable, Status::Disabled),
    ] {
        for name in names {
            if session.set_by_name(name, status) == 0 {
                eprintln!("No patch named {name}");
            }
        }
    }

    if args.dry_run {
        let json =
            serde_json::to_string_pretty(&session.change_plan()).map_err(io::Error::other)?;
        println!("{json}");
        let result = apply::validate_groups(session.records());
        if let Err(e) = result {
            eprintln!("{}\n\n{e}", e.title());
            std::process::exit(1);
        }
        return Ok(());
    }

    let result = session.apply();
    let outcome = Outcome::from(&result);
    match (result, outcome) {
        (Ok(report), _) => {
            println!(
                "Wrote {} file(s), {} unchanged",
                report.written.len(),
                report.unchanged.len()
            );
            Ok(())
        }
        (Err(_), outcome) => {
            eprintln!(
                "{}\n\n{}",
                outcome.title.unwrap_or_default(),
                outcome.message.unwrap_or_default()
            );
            std::process::exit(1);
        }
    }
}

fn run_tui(mut app: AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    } else if app.session.is_dirty() {
        eprintln!("Unapplied changes (not written):");
        let plan = app.session.change_plan();
        let json = serde_json::to_string_pretty(&plan).map_err(io::Error::other)?;
        println!("{json}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Up | KeyCode::Char('k') => app.move_up(),
                KeyCode::Down | KeyCode::Char('j') => app.move_down(),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_current(),
                KeyCode::Char('a') => app.apply(),
                KeyCode::Char('d') => app.disable_all(),
                KeyCode::Char('r') => app.restore_defaults(),
                _ => {}
            }
        }
    }
}
