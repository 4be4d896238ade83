use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use warbler_server::config::Database as DatabaseConfig;
use warbler_server::db::Database;
use warbler_server::seed::{seed_demo_data, DEMO_PASSWORD};

/// Warbler database maintenance
///
/// Creates, drops, resets and seeds the SQLite database the server runs on.
#[derive(Parser, Debug)]
#[command(name = "warbler-migrate")]
#[command(about = "Create, reset and seed the Warbler database", long_about = None)]
struct Args {
    /// Path or sqlite:// URL of the database
    #[arg(short, long, env = "DATABASE_URL", default_value = "warbler.db")]
    database: String,

    /// Skip confirmation prompts for destructive commands
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Create any missing tables
    Init,
    /// Drop every table
    Drop,
    /// Drop and recreate every table
    Reset,
    /// Delete every row but keep the tables
    Clear,
    /// Insert demo users, messages, follows and likes into an empty database
    Seed,
    /// Print row counts per table
    Stats,
}

impl Command {
    fn is_destructive(self) -> bool {
        matches!(self, Command::Drop | Command::Reset | Command::Clear)
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    println!("{} (y/N): ", prompt);
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_stats(db: &Database) -> Result<()> {
    println!();
    println!("Table counts");
    println!("============");
    for (table, count) in db.table_counts()? {
        println!("{:<10} {}", table, count);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = DatabaseConfig {
        url: args.database.clone(),
    };
    let path = config.path();
    println!("Database: {}", path);

    if args.command.is_destructive()
        && !args.yes
        && !confirm(&format!("This will delete all data in {}. Continue?", path))?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let db = Database::new(path)
        .with_context(|| format!("Failed to open database at {}", path))?;

    match args.command {
        Command::Init => {
            db.initialize()?;
            println!("Schema created");
        }
        Command::Drop => {
            db.drop_all()?;
            println!("All tables dropped");
        }
        Command::Reset => {
            db.drop_all()?;
            db.initialize()?;
            println!("Schema recreated");
        }
        Command::Clear => {
            db.initialize()?;
            db.clear()?;
            println!("All rows deleted");
        }
        Command::Seed => {
            db.initialize()?;
            let summary = seed_demo_data(&db)?;
            if summary.users == 0 {
                println!("Database already has users - nothing seeded.");
            } else {
                println!(
                    "Seeded {} users, {} messages, {} follows, {} likes",
                    summary.users, summary.messages, summary.follows, summary.likes
                );
                println!("Every demo account uses the password '{}'", DEMO_PASSWORD);
            }
        }
        Command::Stats => {
            db.initialize()?;
            print_stats(&db)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    run(&args)
}
