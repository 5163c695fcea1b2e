use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{CrmApp, DroppableId};
use serde::Serialize;
use shared::{
    clock::SystemClock,
    domain::{ActivityId, ActivityKind, ContactStatus, DealId},
    error::{ApiError, CrmError},
};
use storage::LocalStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use views::{ActivityFilter, CompletionStatus, TimeRange, TimeWindow};

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Parser, Debug)]
#[command(name = "crm", about = "Sales pipeline, contacts and activities from the terminal")]
struct Cli {
    #[arg(long, default_value = "crm.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Dashboard,
    Pipeline {
        #[arg(long)]
        search: Option<String>,
    },
    Analytics {
        /// 30days, 3months, 6months or 12months.
        #[arg(long, default_value = "6months")]
        range: TimeRange,
    },
    Activities {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        window: TimeWindow,
        #[arg(long)]
        kind: Option<ActivityKind>,
        #[arg(long)]
        status: Option<CompletionStatus>,
    },
    Contacts {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ContactStatus>,
    },
    /// Drop a deal onto a stage column or card, as the board does.
    MoveDeal {
        deal: i64,
        target: String,
    },
    CompleteActivity {
        id: i64,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let offset = settings.utc_offset()?;
    let database_url = prepare_database_url(&settings.session_database_url);
    let local = LocalStore::new(&database_url)
        .await
        .context("failed to open session store")?;
    local
        .health_check()
        .await
        .context("session store is not answering")?;
    let mut app = CrmApp::demo(
        Arc::new(SystemClock),
        Arc::new(local),
        settings.login_latency(),
        settings.login_timeout(),
    );
    app.session().restore().await?;

    let now = Utc::now().with_timezone(&offset);

    match &cli.command {
        Command::Login { email, password } => {
            return match app.session().login(email, password).await {
                Ok(user) => print_json(&user),
                Err(err) => {
                    print_json(&err.api_error())?;
                    Err(err.into())
                }
            };
        }
        Command::Logout => {
            app.session().logout().await?;
            println!("signed out");
            return Ok(());
        }
        Command::Whoami => {
            match app.session().current_user().await {
                Some(user) => print_json(&user)?,
                None => println!("not signed in"),
            }
            return Ok(());
        }
        _ => {}
    }

    let Some(user) = app.session().current_user().await else {
        bail!("not signed in; run `crm login --email <email> --password <password>` first");
    };
    info!(user_id = user.id.0, "cli: session active");

    match cli.command {
        Command::Dashboard => print_json(&views::dashboard_summary(app.store(), now))?,
        Command::Pipeline { search } => {
            print_json(&views::pipeline_board(app.store(), search.as_deref()))?
        }
        Command::Analytics { range } => {
            print_json(&views::analytics_report(app.store(), range, now))?
        }
        Command::Activities {
            search,
            window,
            kind,
            status,
        } => {
            let filter = ActivityFilter {
                search,
                window,
                kind,
                status,
            };
            print_json(&views::activity_rows(app.store(), &filter, now))?
        }
        Command::Contacts { search, status } => print_json(&views::filter_contacts(
            app.store(),
            search.as_deref(),
            status,
        ))?,
        Command::MoveDeal { deal, target } => {
            match app.drop_deal(DealId(deal), Some(&DroppableId::new(target))) {
                Ok(outcome) => print_json(&outcome)?,
                Err(err) => return rejected(err),
            }
        }
        Command::CompleteActivity { id } => match app.complete_activity(ActivityId(id)) {
            Ok(activity) => print_json(&activity)?,
            Err(err) => return rejected(err),
        },
        Command::Login { .. } | Command::Logout | Command::Whoami => {}
    }

    Ok(())
}

/// Reports a store rejection in the same JSON shape as successful output.
fn rejected(err: CrmError) -> Result<()> {
    print_json(&ApiError::from(err.clone()))?;
    Err(err.into())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
