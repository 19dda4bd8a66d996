//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use rand::RngCore;
use tracing::{error, info};

use crate::db::Database;
use crate::password::hash_password;
use crate::secret::SigningSecret;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "cardhall", about = "Card game backend with JWT authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "cardhall.db")]
    pub database: String,

    /// Path to file containing the JWT secret. Without it (and without
    /// JWT_SECRET) a fresh secret is generated at startup, invalidating
    /// tokens from previous runs
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Create a superadmin account on startup and print its generated password
    #[arg(long, num_args = 2, value_names = ["USERNAME", "EMAIL"])]
    pub create_superadmin: Option<Vec<String>>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the signing secret from the JWT_SECRET environment variable or a
/// secret file, or generate a fresh one. Returns None only when a
/// configured source cannot be used.
pub fn load_signing_secret(jwt_secret_file: Option<&str>) -> Option<SigningSecret> {
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            error!(
                "JWT secret is shorter than {} characters. Use a longer secret",
                MIN_JWT_SECRET_LENGTH
            );
            return None;
        }
        return Some(SigningSecret::from_string(secret));
    }

    if let Some(path) = jwt_secret_file {
        let secret = match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        };
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            error!(
                "JWT secret is shorter than {} characters. Use a longer secret",
                MIN_JWT_SECRET_LENGTH
            );
            return None;
        }
        return Some(SigningSecret::from_string(secret));
    }

    info!("Generated a fresh JWT signing secret; tokens from previous runs are now invalid");
    Some(SigningSecret::generate())
}

/// Open the database, logging on failure.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => Some(db),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Handle --create-superadmin: create the account with a generated
/// password and print it once.
pub async fn handle_create_superadmin(db: &Database, username: &str, email: &str) {
    match db.users().credential_taken(username, email).await {
        Ok(true) => {
            error!(username = %username, "Username or email already registered");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Failed to check superadmin availability");
            return;
        }
    }

    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    // Uppercase prefix keeps the generated password within the password policy
    let password = format!("SA{}", hex::encode(bytes));

    let Ok(password_hash) = hash_password(&password) else {
        error!("Failed to hash superadmin password");
        return;
    };

    let id = match db.users().create(username, email, &password_hash, None).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Failed to create superadmin");
            return;
        }
    };

    if let Err(e) = db.users().make_superadmin(id).await {
        error!(error = %e, "Failed to promote superadmin");
        return;
    }

    println!();
    println!("Superadmin created: {}", username);
    println!("Password: {}", password);
    println!();
}
