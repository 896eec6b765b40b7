use clap::{Parser, Subcommand, ValueEnum};
use footprint_core::news::{self, StaticNewsSource};
use footprint_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carbon")]
#[command(about = "Daily carbon footprint tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Session to read and record into
    #[arg(long, global = true, default_value = "default")]
    session: String,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record today's emissions (kg CO2e) and show the assessment
    Submit {
        #[arg(long, allow_hyphen_values = true)]
        travel: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        electricity: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        diet: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        shopping: Option<String>,
    },

    /// Show trend, averages, game state and headlines
    Dashboard {
        /// Skip the network lookup and show a sample headline
        #[arg(long)]
        offline: bool,
    },

    /// List retained snapshots, oldest first
    History,

    /// Show points, streak and badges
    Leaderboard,

    /// Show the inputs of the last submission
    Inputs,

    /// Export snapshot history
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a freshly generated session id
    SessionId,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    // Initialize logging
    footprint_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    if let Commands::SessionId = cli.command {
        println!("{}", SessionId::generate());
        return Ok(());
    }

    let session = SessionId::parse(&cli.session)?;
    let offline = matches!(cli.command, Commands::Dashboard { offline: true });
    let news_source: Box<dyn NewsSource> = if offline {
        Box::new(StaticNewsSource::sample())
    } else {
        news::source_from_config(&config.news)
    };

    let tracker = Tracker::new(FileSessionStore::in_data_dir(&data_dir), news_source)
        .with_news_limit(config.news.page_size);

    match cli.command {
        Commands::Submit {
            travel,
            electricity,
            diet,
            shopping,
        } => {
            let raw = RawInput {
                travel,
                electricity,
                diet,
                shopping,
            };
            cmd_submit(&tracker, &session, &raw)
        }
        Commands::Dashboard { .. } => cmd_dashboard(&tracker, &session),
        Commands::History => cmd_history(&tracker, &session),
        Commands::Leaderboard => cmd_leaderboard(&tracker, &session),
        Commands::Inputs => cmd_inputs(&tracker, &session),
        Commands::Export { format, output } => cmd_export(&tracker, &session, format, output),
        Commands::SessionId => Ok(()),
    }
}

fn cmd_submit(
    tracker: &Tracker<FileSessionStore>,
    session: &SessionId,
    raw: &RawInput,
) -> Result<()> {
    let outcome = tracker.submit(session, raw)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} FOOTPRINT", outcome.level.to_string().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Travel:      {:>8.2} kg", outcome.input.travel);
    println!("  Electricity: {:>8.2} kg", outcome.input.electricity);
    println!("  Diet:        {:>8.2} kg", outcome.input.diet);
    println!("  Shopping:    {:>8.2} kg", outcome.input.shopping);
    println!("  Total:       {:>8.2} kg CO2e", outcome.total);
    println!();
    println!("  Score: {}", outcome.score);
    println!("  {}", outcome.message);
    println!();
    println!(
        "  Diet ({}): {}",
        outcome.diet_report.category, outcome.diet_report.text
    );
    for tip in &outcome.diet_report.tips {
        println!("    → {}", tip);
    }
    println!();
    print_game(&outcome.game);
    for badge in &outcome.new_badges {
        println!("\n★ New badge: {}", badge);
    }
    println!("\n✓ Submission recorded!");
    Ok(())
}

fn cmd_dashboard(tracker: &Tracker<FileSessionStore>, session: &SessionId) -> Result<()> {
    let dashboard = tracker.get_dashboard(session)?;

    println!("Recent totals:");
    if dashboard.totals.is_empty() {
        println!("  (no submissions yet)");
    }
    for (label, total) in dashboard.labels.iter().zip(&dashboard.totals) {
        println!("  {}  {:>8.2} kg", label, total);
    }
    println!();

    match &dashboard.latest {
        Some(latest) => println!("Latest: {:.2} kg ({})", latest.total, latest.level),
        None => println!("Latest: -"),
    }
    println!("Average: {:.2} kg", dashboard.average);
    println!();
    print_game(&dashboard.game);
    println!();

    println!("News:");
    for item in &dashboard.news {
        match &item.url {
            Some(url) => println!("  • {} ({}) {}", item.title, item.source, url),
            None => println!("  • {} ({})", item.title, item.source),
        }
    }
    Ok(())
}

fn cmd_history(tracker: &Tracker<FileSessionStore>, session: &SessionId) -> Result<()> {
    let history = tracker.get_history(session)?;
    if history.is_empty() {
        println!("No submissions yet.");
        return Ok(());
    }

    println!(
        "{:<17} {:>8} {:>8} {:>8} {:>8} {:>8}  Level",
        "When", "Travel", "Elec", "Diet", "Shop", "Total"
    );
    for snap in &history {
        println!(
            "{:<17} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}  {}",
            snap.timestamp.format("%Y-%m-%d %H:%M"),
            snap.travel,
            snap.electricity,
            snap.diet,
            snap.shopping,
            snap.total,
            snap.level
        );
    }
    println!("\n{} of at most {} snapshots", history.len(), HISTORY_CAPACITY);
    Ok(())
}

fn cmd_leaderboard(tracker: &Tracker<FileSessionStore>, session: &SessionId) -> Result<()> {
    let game = tracker.get_leaderboard(session)?;
    print_game(&game);
    if let Some(last) = game.last_date {
        println!(
            "  Last submission: {}",
            last.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn cmd_inputs(tracker: &Tracker<FileSessionStore>, session: &SessionId) -> Result<()> {
    match tracker.last_inputs(session)? {
        Some(input) => {
            println!("travel = {}", input.travel);
            println!("electricity = {}", input.electricity);
            println!("diet = {}", input.diet);
            println!("shopping = {}", input.shopping);
        }
        None => println!("No saved inputs."),
    }
    Ok(())
}

fn cmd_export(
    tracker: &Tracker<FileSessionStore>,
    session: &SessionId,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ExportFormat::Json => {
            let json = tracker.export_json(session)?;
            writeln!(writer, "{}", json)?;
        }
        ExportFormat::Csv => {
            tracker.export_csv(session, &mut writer)?;
        }
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("✓ Exported history to {}", path.display());
    }
    Ok(())
}

fn print_game(game: &GameState) {
    println!("  Points: {}", game.points);
    println!("  Streak: {} day(s)", game.streak);
    if game.badges.is_empty() {
        println!("  Badges: none yet");
    } else {
        let names: Vec<&str> = game.badges.iter().map(Badge::name).collect();
        println!("  Badges: {}", names.join(", "));
    }
}
