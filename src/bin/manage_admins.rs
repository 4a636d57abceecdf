//! CLI tool to manage administrator accounts.
//!
//! Usage:
//!   manage-admins migrate
//!   manage-admins create --username <name> --email <address> [--nom <display name>]
//!   manage-admins list
//!   manage-admins disable --username <name>
//!   manage-admins enable --username <name>
//!   manage-admins passwd --username <name>
//!
//! Passwords are read from `LOC_ADMIN_PASSWORD` so they never show up in the
//! shell history or the process list.

use std::env;

use locatif_lib::auth::{hash_password, validate_password_strength};
use locatif_lib::config::Config;
use locatif_lib::db::DbPool;
use locatif_lib::db::sessions;

const PASSWORD_VAR: &str = "LOC_ADMIN_PASSWORD";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    match command.as_str() {
        "migrate" => migrate(&pool).await,
        "create" => {
            let username = required_arg(&args, "--username");
            let email = required_arg(&args, "--email");
            let nom = optional_arg(&args, "--nom");
            migrate(&pool).await;
            create_admin(&pool, &username, &email, nom.as_deref()).await;
        }
        "list" | "ls" => list_admins(&pool).await,
        "disable" => {
            let username = required_arg(&args, "--username");
            set_actif(&pool, &username, false).await;
        }
        "enable" => {
            let username = required_arg(&args, "--username");
            set_actif(&pool, &username, true).await;
        }
        "passwd" => {
            let username = required_arg(&args, "--username");
            change_password(&pool, &username).await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn optional_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .skip(2)
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 3))
        .cloned()
}

fn required_arg(args: &[String], flag: &str) -> String {
    match optional_arg(args, flag) {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            eprintln!("Error: {} is required", flag);
            std::process::exit(1);
        }
    }
}

/// Read and check the password, then hash it.
fn password_hash_from_env() -> String {
    let password = match env::var(PASSWORD_VAR) {
        Ok(p) => p,
        Err(_) => {
            eprintln!("Error: set {} to the new password", PASSWORD_VAR);
            std::process::exit(1);
        }
    };
    if let Err(e) = validate_password_strength(&password) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}

async fn migrate(pool: &DbPool) {
    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }
}

async fn create_admin(pool: &DbPool, username: &str, email: &str, nom: Option<&str>) {
    let hash = password_hash_from_env();
    match pool.insert_administrateur(username, email, &hash, nom).await {
        Ok(admin) => {
            println!();
            println!("Administrator created:");
            println!("  ID:       {}", admin.id);
            println!("  Username: {}", admin.username);
            println!("  Email:    {}", admin.email);
            println!();
        }
        Err(e) => {
            eprintln!("Error creating administrator: {}", e);
            std::process::exit(1);
        }
    }
}

async fn list_admins(pool: &DbPool) {
    let admins = match pool.list_administrateurs().await {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error listing administrators: {}", e);
            std::process::exit(1);
        }
    };

    if admins.is_empty() {
        println!("No administrators found.");
        return;
    }

    println!();
    println!(
        "{:<6} {:<20} {:<32} {:<10} {:<20}",
        "ID", "USERNAME", "EMAIL", "STATUS", "LAST LOGIN"
    );
    println!("{}", "-".repeat(90));

    for admin in admins {
        let status = if admin.actif { "active" } else { "disabled" };
        let last_login = admin
            .last_login_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<6} {:<20} {:<32} {:<10} {:<20}",
            admin.id, admin.username, admin.email, status, last_login
        );
    }
    println!();
}

async fn set_actif(pool: &DbPool, username: &str, actif: bool) {
    match pool.set_administrateur_actif(username, actif).await {
        Ok(true) => {
            if !actif {
                revoke_sessions(pool, username).await;
            }
            println!(
                "Administrator {} {}.",
                username,
                if actif { "enabled" } else { "disabled" }
            );
        }
        Ok(false) => {
            eprintln!("Administrator not found: {}", username);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error updating administrator: {}", e);
            std::process::exit(1);
        }
    }
}

async fn change_password(pool: &DbPool, username: &str) {
    let hash = password_hash_from_env();
    match pool.set_administrateur_password(username, &hash).await {
        Ok(true) => {
            revoke_sessions(pool, username).await;
            println!("Password updated for {}.", username);
        }
        Ok(false) => {
            eprintln!("Administrator not found: {}", username);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error updating password: {}", e);
            std::process::exit(1);
        }
    }
}

/// Open sessions of the account stop working immediately.
async fn revoke_sessions(pool: &DbPool, username: &str) {
    let admin = match pool.find_administrateur_by_username(username).await {
        Ok(Some(admin)) => admin,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Warning: could not look up sessions: {}", e);
            return;
        }
    };
    match sessions::revoke_all_for_admin(pool.connection(), admin.id).await {
        Ok(0) => {}
        Ok(n) => println!("Revoked {} open session(s).", n),
        Err(e) => eprintln!("Warning: failed to revoke sessions: {}", e),
    }
}

fn print_usage() {
    println!("Usage: manage-admins <command> [options]");
    println!();
    println!("Commands:");
    println!("  migrate                              Apply pending database migrations");
    println!("  create --username <u> --email <e>    Create an administrator");
    println!("         [--nom <display name>]");
    println!("  list, ls                             List administrators");
    println!("  disable --username <u>               Disable an account and revoke its sessions");
    println!("  enable --username <u>                Re-enable an account");
    println!("  passwd --username <u>                Set a new password");
    println!();
    println!("The password for create/passwd is read from {}.", PASSWORD_VAR);
}
