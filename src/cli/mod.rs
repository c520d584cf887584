//! CLI commands for marsdb.

pub mod handlers;
pub mod output;

use crate::core::{Argon2Params, Gateway, MissionStatus, TaskStatus};
use crate::db::DbPath;
use crate::error::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marsdb")]
#[command(about = "Mars mission database")]
#[command(version)]
pub struct Cli {
    /// Path to the SQLite database (":memory:" for a throwaway one)
    #[arg(long, global = true, env = "MARSDB_PATH", default_value = DbPath::DEFAULT)]
    pub db: PathBuf,

    /// Argon2 memory cost in KiB for password hashing
    #[arg(
        long,
        global = true,
        env = "MARSDB_HASH_MEMORY_KIB",
        default_value_t = Argon2Params::DEFAULT_MEMORY_KIB
    )]
    pub hash_memory_kib: u32,

    /// Argon2 iteration count for password hashing
    #[arg(
        long,
        global = true,
        env = "MARSDB_HASH_ITERATIONS",
        default_value_t = Argon2Params::DEFAULT_ITERATIONS
    )]
    pub hash_iterations: u32,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Database location selected on the command line.
    pub fn db_path(&self) -> DbPath {
        DbPath::new(&self.db)
    }

    /// Password hashing cost selected on the command line.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.hash_memory_kib,
            iterations: self.hash_iterations,
            ..Argon2Params::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create all tables
    Init,

    /// Drop all tables
    Drop,

    /// Insert the demonstration data
    Seed,

    /// Drop, recreate and seed
    Reset,

    /// Print every table
    Dump {
        /// Only this table
        #[arg(long)]
        table: Option<String>,
        /// Emit JSON instead of text tables
        #[arg(long)]
        json: bool,
    },

    /// List available geographical objects
    Objects {
        #[arg(long)]
        json: bool,
    },

    /// List locations with their transport and status
    Locations {
        /// Only locations of this geographical object
        #[arg(long)]
        object: Option<i64>,
        #[arg(long)]
        json: bool,
    },

    /// List transports
    Transports {
        #[arg(long)]
        json: bool,
    },

    /// List mars stations
    Stations {
        #[arg(long)]
        json: bool,
    },

    /// Add a geographical object
    AddObject {
        /// Feature name, e.g. "Gale"
        feature: String,
        /// Feature type, e.g. "Crater, craters"
        #[arg(long = "type")]
        kind: String,
        /// Size in kilometres
        #[arg(long)]
        size: Option<i64>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        photo: Option<String>,
        /// Mark the object unavailable
        #[arg(long)]
        unavailable: bool,
    },

    /// Add a transport
    AddTransport {
        name: String,
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        photo: Option<String>,
    },

    /// Add a mars station
    AddStation {
        /// Request type, e.g. "research"
        type_status: String,
        #[arg(long)]
        created: NaiveDate,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        close: NaiveDate,
        #[arg(long)]
        scientist: i64,
        #[arg(long)]
        transport: i64,
        #[arg(long)]
        status: i64,
    },

    /// Link a geographical object to a station
    AddLocation {
        /// Geographical object ID
        object: i64,
        /// Mars station ID
        station: i64,
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        results: Option<String>,
    },

    /// Set the availability of a geographical object
    SetAvailability {
        /// Geographical object ID
        id: i64,
        /// true or false
        #[arg(action = ArgAction::Set)]
        available: bool,
    },

    /// Set task and mission labels of a status row
    SetStatus {
        /// Status ID
        id: i64,
        /// entered, in_operation, completed, canceled or deleted
        #[arg(long)]
        task: TaskStatus,
        /// success, loss or running
        #[arg(long)]
        mission: MissionStatus,
    },

    /// Check a login and password
    Login { login: String, password: String },
}

/// Run the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    let mut gateway = Gateway::connect(&cli.db_path(), cli.argon2_params())?;
    let result = dispatch(&mut gateway, cli.command);
    let closed = gateway.close();
    result.and(closed)
}

fn dispatch(gateway: &mut Gateway, command: Commands) -> Result<()> {
    match command {
        Commands::Init => handlers::handle_init(gateway),
        Commands::Drop => handlers::handle_drop(gateway),
        Commands::Seed => handlers::handle_seed(gateway),
        Commands::Reset => handlers::handle_reset(gateway),
        Commands::Dump { table, json } => handlers::handle_dump(gateway, table.as_deref(), json),
        Commands::Objects { json } => handlers::handle_objects(gateway, json),
        Commands::Locations { object, json } => handlers::handle_locations(gateway, object, json),
        Commands::Transports { json } => handlers::handle_transports(gateway, json),
        Commands::Stations { json } => handlers::handle_stations(gateway, json),
        Commands::AddObject {
            feature,
            kind,
            size,
            desc,
            photo,
            unavailable,
        } => handlers::handle_add_object(
            gateway,
            crate::core::NewGeographicalObject {
                kind,
                feature,
                size,
                describe: desc,
                url_photo: photo,
                status: !unavailable,
            },
        ),
        Commands::AddTransport {
            name,
            kind,
            desc,
            photo,
        } => handlers::handle_add_transport(
            gateway,
            crate::core::NewTransport {
                name,
                kind,
                describe: desc,
                url_photo: photo,
            },
        ),
        Commands::AddStation {
            type_status,
            created,
            from,
            close,
            scientist,
            transport,
            status,
        } => handlers::handle_add_station(
            gateway,
            crate::core::NewMarsStation {
                type_status,
                data_create: created,
                data_from: from,
                data_close: close,
                id_scientist: scientist,
                id_transport: transport,
                id_status: status,
            },
        ),
        Commands::AddLocation {
            object,
            station,
            purpose,
            results,
        } => handlers::handle_add_location(
            gateway,
            crate::core::NewLocation {
                id_geographical_object: object,
                id_mars_station: station,
                purpose,
                results,
            },
        ),
        Commands::SetAvailability { id, available } => {
            handlers::handle_set_availability(gateway, id, available)
        }
        Commands::SetStatus { id, task, mission } => {
            handlers::handle_set_status(gateway, id, task, mission)
        }
        Commands::Login { login, password } => handlers::handle_login(gateway, &login, &password),
    }
}
