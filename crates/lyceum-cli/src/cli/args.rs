use crate::cli::{
    commands::{Commands, TeacherAction},
    handlers,
};
use crate::config::CliConfig;
use crate::error::Result;
use clap::Parser;
use clap_verbosity_flag::{OffLevel, Verbosity};
use std::path::PathBuf;

/// Lyceum CLI - course-management CRM from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "lyceum",
    author = "Lyceum Team",
    version,
    about = "Lyceum CLI - course-management CRM from the terminal",
    long_about = "Command-line client for the Lyceum course-management CRM.

SESSION:
  lyceum login                      # Sign in (session is kept between runs)
  lyceum whoami                     # Show the signed-in user
  lyceum change-password            # Change your password
  lyceum logout                     # Forget the session

PEOPLE:
  lyceum students ls --search ali   # Search active students
  lyceum teachers my-groups         # Groups you teach
  lyceum managers ls --all          # Active and archived managers

SCHEDULE:
  lyceum groups ls                  # List groups
  lyceum rooms                      # List rooms
  lyceum enrollments --group <id>   # Enrollments of a group

FINANCE:
  lyceum finance balance            # Global balance
  lyceum finance debtors            # Students with outstanding debt
  lyceum finance overview           # Last six months"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LYCEUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<OffLevel>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let config = CliConfig::load(self.config.as_deref())?;
        let json = self.json;

        match self.command {
            // Session
            Commands::Login { phone } => handlers::auth::handle_login(phone, &config).await,
            Commands::Logout => handlers::auth::handle_logout(&config),
            Commands::Whoami => handlers::auth::handle_whoami(&config, json),
            Commands::ChangePassword => handlers::auth::handle_change_password(&config).await,

            // People
            Commands::Students { action } => {
                handlers::people::handle_students(action, &config, json).await
            }
            Commands::Teachers { action } => match action {
                TeacherAction::Common(action) => {
                    handlers::people::handle_teachers(action, &config, json).await
                }
                TeacherAction::MyGroups => handlers::people::handle_my_groups(&config, json).await,
            },
            Commands::Managers { action } => {
                handlers::people::handle_managers(action, &config, json).await
            }

            // Schedule
            Commands::Groups { action } => {
                handlers::schedule::handle_groups(action, &config, json).await
            }
            Commands::Rooms => handlers::schedule::handle_rooms(&config, json).await,
            Commands::Enrollments { filters } => {
                handlers::schedule::handle_enrollments(filters, &config, json).await
            }

            // Finance
            Commands::Finance { action } => {
                handlers::finance::handle_finance(action, &config, json).await
            }

            // Configuration
            Commands::Config { action } => {
                handlers::config::handle_config(action, self.config.as_deref(), &config, json)
            }
        }
    }
}
