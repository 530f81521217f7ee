use anyhow::Result;
use clap::{Parser, Subcommand};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order};
use tracing::Level;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use survey_groups::common::UrlBuilder;
use survey_groups::config::{AppConfig, DEFAULT_CONFIG_FILE};
use survey_groups::database::entities::{question_groups, surveys};
use survey_groups::database::{
    establish_connection, get_database_url, migrate_database, MigrateDirection,
};
use survey_groups::errors::GroupError;
use survey_groups::services::{
    AdminSession, FlashLevel, GroupButtonRenderer, QuestionGroupService,
};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: String,
    /// Overrides the database path from the configuration
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    Group {
        #[clap(subcommand)]
        command: GroupCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand, Debug)]
enum GroupCommands {
    /// List the groups of a survey in its base language
    List {
        #[clap(short, long)]
        survey: i32,
    },
    /// Renumber group order sequentially
    Reorder {
        #[clap(short, long)]
        survey: i32,
        #[clap(short = 'L', long)]
        language: String,
        #[clap(short, long, default_value = "0")]
        position: i32,
    },
    /// Delete a group with its questions and assessments
    Delete {
        #[clap(short, long)]
        survey: i32,
        #[clap(short, long)]
        group: i32,
    },
    Describe {
        #[clap(short, long)]
        group: i32,
        #[clap(short = 'L', long)]
        language: String,
    },
    /// Print the admin action buttons of every group
    Buttons {
        #[clap(short, long)]
        survey: i32,
        #[clap(short, long)]
        user: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = AppConfig::load(&args.config)?;
    if let Some(database) = args.database {
        config.database = database;
    }

    match args.command {
        Commands::Db { command } => match command {
            DbCommands::Init => {
                info!("Initializing database: {}", config.database);
                migrate_database(&config.database, MigrateDirection::Up).await?;
            }
            DbCommands::Migrate { direction } => {
                info!("Running database migration: {:?}", direction);
                migrate_database(&config.database, direction).await?;
            }
        },
        Commands::Group { command } => {
            let db = establish_connection(&get_database_url(Some(&config.database))).await?;
            run_group_command(db, &config, command).await?;
        }
    }

    Ok(())
}

async fn run_group_command(
    db: DatabaseConnection,
    config: &AppConfig,
    command: GroupCommands,
) -> Result<()> {
    let service =
        QuestionGroupService::new(db.clone()).with_default_page_size(config.default_page_size);

    match command {
        GroupCommands::List { survey } => {
            for group in service.get_groups(survey).await? {
                println!("{}\t{}", group.gid, group.group_name);
            }
        }
        GroupCommands::Reorder {
            survey,
            language,
            position,
        } => {
            let touched = service
                .update_group_order(survey, &language, position)
                .await?;
            info!("Renumbered {} group row(s) in survey {}", touched, survey);
        }
        GroupCommands::Delete { survey, group } => {
            let session = AdminSession::new(0);
            match service.delete_with_dependency(group, survey, &session).await? {
                Some(rows) => info!("Deleted {} row(s) of group {}", rows, group),
                None => {
                    for flash in session.take_flashes() {
                        match flash.level {
                            FlashLevel::Error => warn!("{}", flash.message),
                            _ => info!("{}", flash.message),
                        }
                    }
                }
            }
        }
        GroupCommands::Describe { group, language } => {
            println!("{}", service.get_group_description(group, &language).await?);
        }
        GroupCommands::Buttons { survey, user } => {
            let base_language = surveys::Entity::find_by_id(survey)
                .one(&db)
                .await?
                .ok_or(GroupError::SurveyNotFound(survey))?
                .language;

            let groups = service
                .get_all_groups(
                    Condition::all()
                        .add(question_groups::Column::Sid.eq(survey))
                        .add(question_groups::Column::Language.eq(base_language)),
                    &[(question_groups::Column::GroupOrder, Order::Asc)],
                )
                .await?;

            let renderer = GroupButtonRenderer::new(db, UrlBuilder::new(&config.base_url))?;
            let session = AdminSession::new(user);
            for group in &groups {
                println!("{}\t{}", group.gid, renderer.render(group, &session).await?);
            }
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
