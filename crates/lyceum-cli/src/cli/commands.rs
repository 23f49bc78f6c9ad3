use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use lyceum_sdk::{EnrollmentStatus, ListQuery};

/// Main CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with phone number and password
    Login {
        /// Phone number (prompted when omitted)
        #[arg(long)]
        phone: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Change the password of the signed-in user
    ChangePassword,

    /// Manage students
    Students {
        #[command(subcommand)]
        action: PeopleAction,
    },

    /// Manage teachers
    Teachers {
        #[command(subcommand)]
        action: TeacherAction,
    },

    /// Manage managers
    Managers {
        #[command(subcommand)]
        action: PeopleAction,
    },

    /// Manage groups
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// List rooms
    Rooms,

    /// List enrollments
    Enrollments {
        #[command(flatten)]
        filters: EnrollmentFilters,
    },

    /// Finance reports
    Finance {
        #[command(subcommand)]
        action: FinanceAction,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions shared by students and managers
#[derive(Subcommand, Debug)]
pub enum PeopleAction {
    /// List records
    Ls {
        #[command(flatten)]
        filters: PeopleFilters,
    },

    /// Show one record
    Show {
        /// Record ID
        id: String,
    },

    /// Archive a record
    Archive {
        /// Record ID
        id: String,
    },

    /// Restore an archived record
    Restore {
        /// Record ID
        id: String,
    },
}

/// Teacher actions
#[derive(Subcommand, Debug)]
pub enum TeacherAction {
    #[command(flatten)]
    Common(PeopleAction),

    /// Groups taught by the signed-in teacher
    MyGroups,
}

/// Group actions
#[derive(Subcommand, Debug)]
pub enum GroupAction {
    /// List groups
    Ls {
        /// Search by group name
        #[arg(long)]
        search: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Deactivate a group
    Deactivate {
        /// Group ID
        id: String,

        /// Reason recorded with the deactivation
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Finance reports
#[derive(Subcommand, Debug)]
pub enum FinanceAction {
    /// Global balance
    Balance,

    /// Students with outstanding debt
    Debtors {
        /// Only list students owing at least this much
        #[arg(long)]
        min_debt: Option<f64>,
    },

    /// Income, expense and profit over a date range (last six months by default)
    Overview {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

/// Pagination flags
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = lyceum_common::defaults::DEFAULT_PAGE_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,
}

/// Filters for people listings
#[derive(clap::Args, Debug, Clone)]
pub struct PeopleFilters {
    /// Search by name or phone
    #[arg(long)]
    pub search: Option<String>,

    /// Only archived records
    #[arg(long, conflicts_with = "all")]
    pub archived: bool,

    /// Active and archived records
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

impl PeopleFilters {
    pub fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::default().page(self.page.page, self.page.limit);
        if let Some(search) = &self.search {
            query = query.search(search.clone());
        }
        if !self.all {
            query = query.active(!self.archived);
        }
        query
    }
}

/// Enrollment status as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Active,
    Paused,
    Left,
}

impl From<StatusArg> for EnrollmentStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => EnrollmentStatus::Active,
            StatusArg::Paused => EnrollmentStatus::Paused,
            StatusArg::Left => EnrollmentStatus::Left,
        }
    }
}

/// Filters for enrollment listings
#[derive(clap::Args, Debug, Clone)]
pub struct EnrollmentFilters {
    /// Only this student's enrollments
    #[arg(long)]
    pub student: Option<String>,

    /// Only this group's enrollments
    #[arg(long)]
    pub group: Option<String>,

    /// Only enrollments in this status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Joined on or after (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Joined on or before (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[command(flatten)]
    pub page: PageArgs,
}
