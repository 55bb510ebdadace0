use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{command, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

pub mod dto_model;
pub mod schedule_model;

use schedule_model::UserRole;

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Path to config.json, that contains the backend address and request settings.
/// 2. Path to session.json, where access and refresh tokens are kept between launches.
/// 3. Path to favorites.json, the list of groups and teachers the user marked.
/// 4. The action to perform.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "session.json")]
    pub session_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "favorites.json")]
    pub favorites_json_path: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the tokens in the session file
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a student account
    Register(RegisterArgs),
    /// Forget stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Find groups and teachers by a part of their number or name
    Search { query: String },
    /// Show the schedule of a group or a teacher
    View(ViewArgs),
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
    /// Schedule entries
    Entry {
        #[command(subcommand)]
        action: EntryCommand,
    },
    Group {
        #[command(subcommand)]
        action: GroupCommand,
    },
    Subgroup {
        #[command(subcommand)]
        action: SubgroupCommand,
    },
    Teacher {
        #[command(subcommand)]
        action: TeacherCommand,
    },
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },
    Faculty {
        #[command(subcommand)]
        action: FacultyCommand,
    },
    User {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Load everything an administrator manages and print how much there is
    Overview,
    /// Upload Excel files for bulk schedule import
    Import {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Download a group's schedule as PDF
    ExportPdf {
        group: String,
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub middle_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub group_number: Option<String>,
    #[arg(long)]
    pub subgroup_number: Option<String>,
    #[arg(long)]
    pub info: Option<String>,
}

/// Group-or-teacher choice shared by the viewer and favorites.
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct EntityArgs {
    #[arg(long)]
    pub group: Option<String>,
    #[arg(long)]
    pub teacher: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    pub entity: EntityArgs,
    /// Day inside the week to show; today when omitted
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
    /// Subgroup labels to keep; the whole group, without duplicates, when omitted
    #[arg(long = "subgroup", value_name = "LABEL")]
    pub subgroups: Vec<String>,
    #[arg(long, value_enum, default_value_t = ViewMode::Columns)]
    pub mode: ViewMode,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Columns,
    List,
    Calendar,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    List,
    Add(EntityArgs),
    Remove(EntityArgs),
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    /// Print an entry as an editable draft
    Show { id: u64 },
    /// Write an empty draft, optionally prefilled with a group
    Template {
        #[arg(long)]
        group: Option<String>,
        #[arg(long, value_name = "FILE", default_value = "draft.json")]
        output: PathBuf,
    },
    /// Create an entry from a draft, or update one when --id is given
    Save {
        #[arg(long, value_name = "FILE")]
        draft: PathBuf,
        #[arg(long)]
        id: Option<u64>,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    List,
    Add {
        number: String,
        direction: String,
        profile: String,
        faculty_id: u64,
    },
    Update {
        id: u64,
        number: String,
        direction: String,
        profile: String,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SubgroupCommand {
    List {
        #[arg(long)]
        group: Option<String>,
    },
    Add {
        group_number: String,
        number: String,
        #[arg(long, default_value_t = 0)]
        size: u32,
    },
    Update {
        id: u64,
        group_number: String,
        number: String,
        #[arg(long, default_value_t = 0)]
        size: u32,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum TeacherCommand {
    List,
    Add {
        name: String,
        post: String,
        faculty_id: u64,
    },
    Update { id: u64, name: String, post: String },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommand {
    List,
    Add { name: String, kind: String },
    Update { id: u64, name: String, kind: String },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum FacultyCommand {
    List,
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List,
    Role {
        id: u64,
        #[arg(value_enum)]
        role: UserRole,
        #[arg(long)]
        faculty_id: Option<u64>,
    },
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        middle_name: Option<String>,
        #[arg(long, value_enum, default_value_t = UserRole::Admin)]
        role: UserRole,
        #[arg(long)]
        faculty_id: Option<u64>,
    },
    Update {
        id: u64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        middle_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_enum)]
        role: Option<UserRole>,
        #[arg(long)]
        faculty_id: Option<u64>,
        #[arg(long)]
        group_number: Option<String>,
        #[arg(long)]
        subgroup_number: Option<String>,
    },
    Delete { id: u64 },
}

/// A model for describing configuration of the tool.
/// Consists of:
/// 1. Base URL of the schedule backend, including the API prefix
/// 2. Timeout for a single HTTP request, in seconds
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api/v1".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}
