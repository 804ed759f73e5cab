//! Command-line entry point over the member/team store.
//!
//! # Responsibility
//! - Resolve configuration (file, then flag overrides) and open the store.
//! - Run seed/search/page/team commands and print one line per row.

use clap::{Args, Parser, Subcommand};
use log::{error, warn};
use memberquery_core::{
    core_version, init_logging, open_store, seed_roster, CoreConfig, MemberSearchCondition,
    MemberService, MemberTeamDto, PageRequest, PageStrategy, Profile, SqliteMemberRepository,
    SqliteTeamRepository, TeamRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "memberquery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Search members and teams in a SQLite store")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite file; overrides `db_path` from the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Seed the sample roster into an empty store on open.
    #[arg(long, global = true)]
    local: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert teamA, teamB and `count` members.
    Seed {
        #[arg(long, default_value_t = 100)]
        count: u32,
    },
    /// List every member matching the filters.
    Search(Filters),
    /// Print one page of matching members.
    Page {
        #[command(flatten)]
        filters: Filters,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// Use separate content and count queries.
        #[arg(long)]
        complex: bool,
    },
    /// List teams with their member ids.
    Teams,
    /// Print the core version.
    Version,
}

#[derive(Debug, Args)]
struct Filters {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    team_name: Option<String>,
    #[arg(long)]
    age_goe: Option<i32>,
    #[arg(long)]
    age_loe: Option<i32>,
}

impl From<Filters> for MemberSearchCondition {
    fn from(value: Filters) -> Self {
        Self {
            username: value.username,
            team_name: value.team_name,
            age_goe: value.age_goe,
            age_loe: value.age_loe,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_exit module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.effective_log_level(), log_dir)?;
    }

    if let Command::Version = cli.command {
        println!("memberquery_core version={}", core_version());
        return Ok(());
    }

    if let Some(warning) = check_command(&cli.command, &config)? {
        warn!("event=cli_config module=cli status=warn reason=in_memory_store");
        eprintln!("warning: {warning}");
    }

    let conn = open_store(&config).map_err(|err| err.to_string())?;
    let members = SqliteMemberRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let teams = SqliteTeamRepository::try_new(&conn).map_err(|err| err.to_string())?;

    match cli.command {
        Command::Seed { count } => {
            let summary = seed_roster(&conn, count).map_err(|err| err.to_string())?;
            println!(
                "seeded teamA={} teamB={} members={}",
                summary.team_a,
                summary.team_b,
                summary.members.len()
            );
        }
        Command::Search(filters) => {
            let service = MemberService::new(members, teams);
            let rows = service
                .search(&filters.into())
                .map_err(|err| err.to_string())?;
            rows.iter().for_each(print_row);
        }
        Command::Page {
            filters,
            page,
            size,
            complex,
        } => {
            let strategy = if complex {
                PageStrategy::Complex
            } else {
                PageStrategy::Simple
            };
            let service = MemberService::new(members, teams);
            let result = service
                .search_page(&filters.into(), &PageRequest::of(page, size), strategy)
                .map_err(|err| err.to_string())?;
            result.content().iter().for_each(print_row);
            println!(
                "page={} size={} rows={} total={} pages={}",
                result.number(),
                result.size(),
                result.number_of_elements(),
                result.total_elements(),
                result.total_pages()
            );
        }
        Command::Teams => {
            for team in teams.find_all_teams().map_err(|err| err.to_string())? {
                println!("{}\t{}\t{:?}", team.id, team.name, team.members());
            }
        }
        Command::Version => {}
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<CoreConfig, String> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if cli.local {
        config.profile = Profile::Local;
    }
    Ok(config)
}

/// Rejects command/config pairs that would seed twice or discard writes;
/// returns a warning for reads against a throwaway in-memory store.
fn check_command(command: &Command, config: &CoreConfig) -> Result<Option<String>, String> {
    let in_memory = config.db_path.is_none();
    match command {
        Command::Seed { .. } if config.profile == Profile::Local => Err(
            "`seed` cannot run under the local profile, which already seeds an empty store"
                .to_string(),
        ),
        Command::Seed { .. } if in_memory => Err(
            "`seed` needs --db or `db_path`; an in-memory store is discarded on exit".to_string(),
        ),
        Command::Search(_) | Command::Page { .. } | Command::Teams
            if in_memory && config.profile != Profile::Local =>
        {
            Ok(Some(
                "no --db or `db_path` given; reading an empty in-memory store".to_string(),
            ))
        }
        _ => Ok(None),
    }
}

fn print_row(row: &MemberTeamDto) {
    println!(
        "{}\t{}\t{}\t{}\t{}",
        row.member_id,
        row.username,
        row.age,
        row.team_id
            .map_or_else(|| "-".to_string(), |id| id.to_string()),
        row.team_name.as_deref().unwrap_or("-")
    );
}
