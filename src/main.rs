use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use dho::common::logging::init_logging;
use dho::common::names::{groups, labels};
use dho::common::{Asset, Configuration, DaoSettings, ManualClock, Name, ENV_PREFIX};
use dho::docgraph::{Content, ContentWrapper, FileStorage, MemoryStorage, Storage};
use dho::governance::ProposalType;
use dho::payroll::{derive_period_salary, usd_per_period, SalaryTerms};
use dho::Dao;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML); defaults plus DHO_* environment overrides when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a role and assignment through voting and claim its first periods
    Demo {
        /// Keep the document graph in this directory instead of in memory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the effective settings
    Config,
    /// Print the per-period compensation of an assignment
    Salary {
        /// Annual salary of the role, e.g. "150000.00 USD"
        annual_usd: String,
        /// Time share in percent
        #[arg(long, default_value_t = 100)]
        time_share: i64,
        /// Deferred share in percent
        #[arg(long, default_value_t = 0)]
        deferred: i64,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<DaoSettings> {
    let settings = match path {
        Some(path) => DaoSettings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => DaoSettings::from_env(ENV_PREFIX)?,
    };
    Ok(settings)
}

fn name(value: &str) -> Result<Name> {
    Ok(Name::new(value)?)
}

fn details(items: Vec<Content>) -> ContentWrapper {
    ContentWrapper::new().with_group(groups::DETAILS, items)
}

async fn run_demo(settings: DaoSettings, data_dir: Option<PathBuf>) -> Result<()> {
    let storage: Arc<dyn Storage> = match data_dir.or_else(|| settings.data_dir.clone()) {
        Some(dir) => Arc::new(FileStorage::new(dir)?),
        None => Arc::new(MemoryStorage::new()),
    };
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let dao = Dao::open(storage, settings.clone(), clock.clone()).await?;
    let voting = Duration::seconds(settings.voting_duration_sec + 1);

    let alice = name("alice")?;
    let bob = name("bob")?;
    for member in [&alice, &bob] {
        dao.enroll(member).await?;
        dao.issue(member, &"100.00 HVOICE".parse::<Asset>()?).await?;
    }
    let periods = dao.add_periods(4, Duration::days(7)).await?;
    let first_period = periods.first().context("no periods were added")?;

    let role = dao
        .propose(
            &alice,
            ProposalType::Role,
            details(vec![
                Content::new(labels::TITLE, "Underwater Basketweaver"),
                Content::new(labels::DESCRIPTION, "Weaves baskets under water"),
                Content::new(labels::ANNUAL_USD_SALARY, "150000.00 USD".parse::<Asset>()?),
                Content::new(labels::MIN_TIME_SHARE, 50i64),
                Content::new(labels::MIN_DEFERRED, 50i64),
            ]),
        )
        .await?;
    dao.vote(&alice, &role.hash, "pass", "").await?;
    dao.vote(&bob, &role.hash, "pass", "").await?;
    clock.advance(voting);
    let role = dao.close(&alice, &role.hash).await?.proposal;
    info!("Role {} passed", role.hash);

    let assignment = dao
        .propose(
            &bob,
            ProposalType::Assignment,
            details(vec![
                Content::new(labels::TITLE, "Bob weaves"),
                Content::new(labels::DESCRIPTION, "Bob takes the basketweaver role"),
                Content::new(labels::ASSIGNEE, bob.clone()),
                Content::new(labels::ROLE, role.hash),
                Content::new(labels::START_PERIOD, first_period.hash),
                Content::new(labels::PERIOD_COUNT, 3i64),
                Content::new(labels::TIME_SHARE, 100i64),
                Content::new(labels::DEFERRED, 50i64),
            ]),
        )
        .await?;
    dao.vote(&alice, &assignment.hash, "pass", "").await?;
    clock.advance(voting);
    let assignment = dao.close(&alice, &assignment.hash).await?.proposal;

    clock.advance(Duration::days(3));
    dao.adjust_commitment(&bob, &assignment.hash, 50, None).await?;

    clock.advance(Duration::days(21));
    loop {
        match dao.claim_next_period(&assignment.hash, &bob).await {
            Ok(receipt) => {
                println!("Claimed {} at {}", receipt.period.label, receipt.fraction);
                for payment in &receipt.payments {
                    println!("  {}", payment.amount);
                }
            }
            Err(e) => {
                println!("{}", e);
                break;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_ref())?;
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Demo { data_dir } => run_demo(settings, data_dir).await?,
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        Commands::Salary {
            annual_usd,
            time_share,
            deferred,
        } => {
            let annual: Asset = annual_usd.parse()?;
            let usd = usd_per_period(&annual)?;
            let salary = derive_period_salary(&usd, &SalaryTerms::new(&settings, time_share, deferred))?;
            println!("USD per period: {}", salary.usd);
            println!("HUSD:   {}", salary.husd);
            println!("HYPHA:  {}", salary.hypha);
            println!("HVOICE: {}", salary.hvoice);
            println!("SEEDS:  {}", salary.seeds);
        }
    }
    Ok(())
}
