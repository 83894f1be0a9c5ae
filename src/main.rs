use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use loan_schedule::edit::EditedRow;
use loan_schedule::export::{read_edited_rows, write_payment_view_csv, write_schedule_csv};
use loan_schedule::*;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::fs::File;
use std::path::PathBuf;
use std::process;

/// Build a monthly amortization schedule, optionally with edited payments
#[derive(Parser)]
#[command(name = "amortize", version)]
struct Cli {
    /// Amount financed
    #[arg(long, default_value_t = 100000.)]
    amount: f64,

    /// Annual interest rate, in percent
    #[arg(long, default_value_t = 7.25)]
    rate: f64,

    /// Term of the loan, in years
    #[arg(long, default_value_t = 30.)]
    term: f64,

    /// Loan start date (YYYY-MM-DD); payments fall on the 1st of following months
    #[arg(long)]
    start: Option<NaiveDate>,

    /// CSV of edited payments with an Amount column and optional Notes column
    #[arg(long)]
    edits: Option<PathBuf>,

    /// Write the schedule to this CSV file
    #[arg(long)]
    out: Option<PathBuf>,

    /// Export only Payment, Date, Amount and Notes
    #[arg(long)]
    view: bool,

    /// Number of schedule rows to print
    #[arg(long, default_value_t = 12)]
    rows: usize,

    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// `1234567.891` -> `1,234,567.89`
fn with_thousands(amt: f64) -> String {
    let text = format!("{:.2}", amt.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amt < 0. && text != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

/// Loan terms from the command line, held to the same minimums as the form.
fn loan_terms(cli: &Cli) -> Result<LoanTerms> {
    let terms = LoanTerms::new(cli.amount, cli.rate, cli.term, cli.start);
    terms.validate()?;
    Ok(terms)
}

fn run(cli: &Cli) -> Result<()> {
    let terms = loan_terms(cli)?;
    let mut state = ScheduleState::new(terms);
    info!("initial schedule has {} payments", state.schedule().get_pmt_count());

    if let Some(path) = &cli.edits {
        let rows: Vec<EditedRow> = read_edited_rows(File::open(path)?)?;
        state = recompute(&state, ScheduleEvent::ApplyEdits(rows))?;
        info!("applied edits from {}", path.display());
    }

    let schedule = state.schedule();
    let summary = ScheduleSummary::new(terms.principal, schedule);

    println!("{}", terms);
    println!("Total Paid:       {}", with_thousands(summary.total_paid));
    println!("Interest Paid:    {}", with_thousands(summary.interest_paid));
    match summary.percent_interest {
        Some(percent) => println!("Percent Interest: {}", percent),
        None => println!("Percent Interest: n/a"),
    }
    println!();

    for row in schedule.rows().iter().take(cli.rows) {
        println!("{}", row);
    }
    if schedule.get_pmt_count() > cli.rows {
        println!("... ({} more payments)", schedule.get_pmt_count() - cli.rows);
    }

    if let Some(path) = &cli.out {
        let file = File::create(path)?;
        if cli.view {
            write_payment_view_csv(&derive_payment_schedule_view(schedule), file)?;
        } else {
            write_schedule_csv(schedule, file)?;
        }
        println!("\nSchedule written to: {}", path.display());
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(cli.log_level.into()).init() {
        eprintln!("error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
