//! CLI tool to manage user accounts.
//!
//! Usage:
//!   cargo run --bin manage-users -- list
//!   cargo run --bin manage-users -- set-role --id <user-id> --role <admin|editor|user>
//!   cargo run --bin manage-users -- activate --id <user-id>
//!   cargo run --bin manage-users -- deactivate --id <user-id>
//!
//! `set-role` is how the first administrator is bootstrapped after their
//! initial DingTalk login.

use std::env;

use pbi_access_lib::config::Config;
use pbi_access_lib::db::DbPool;
use pbi_access_lib::db::users::{self, UserChanges};
use pbi_access_lib::models::UserRole;

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

    let pool = match DbPool::new(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    match command.as_str() {
        "list" | "ls" => list_users(&pool).await,
        "set-role" => {
            let id = parse_id_arg(&args);
            let role = match arg_value(&args, &["--role", "-r"]).and_then(|r| UserRole::parse(&r)) {
                Some(r) => r,
                None => {
                    eprintln!("Error: --role must be one of admin, editor, user");
                    std::process::exit(1);
                }
            };
            apply(
                &pool,
                id,
                UserChanges {
                    role: Some(role),
                    ..Default::default()
                },
                &format!("role set to {}", role),
            )
            .await;
        }
        "activate" => {
            let id = parse_id_arg(&args);
            let changes = UserChanges {
                is_active: Some(true),
                ..Default::default()
            };
            apply(&pool, id, changes, "activated").await;
        }
        "deactivate" => {
            let id = parse_id_arg(&args);
            let changes = UserChanges {
                is_active: Some(false),
                ..Default::default()
            };
            apply(&pool, id, changes, "deactivated").await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn arg_value(args: &[String], names: &[&str]) -> Option<String> {
    let mut i = 2;
    while i < args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn parse_id_arg(args: &[String]) -> i32 {
    match arg_value(args, &["--id", "-i"]).map(|v| v.parse::<i32>()) {
        Some(Ok(id)) => id,
        Some(Err(_)) => {
            eprintln!("Error: --id must be a number");
            std::process::exit(1);
        }
        None => {
            eprintln!("Error: --id is required");
            std::process::exit(1);
        }
    }
}

async fn list_users(pool: &DbPool) {
    let rows = match users::list_with_groups(pool.connection()).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error listing users: {}", e);
            std::process::exit(1);
        }
    };

    if rows.is_empty() {
        println!("No users found.");
        return;
    }

    println!();
    println!(
        "{:<6} {:<24} {:<8} {:<10} {:<8} {}",
        "ID", "NAME", "ROLE", "STATUS", "BOUND", "GROUPS"
    );
    println!("{}", "-".repeat(80));

    for (user, groups) in rows {
        let status = if user.is_active { "active" } else { "disabled" };
        let bound = if user.is_bound() { "yes" } else { "no" };
        let name: String = if user.display_name.chars().count() > 22 {
            let head: String = user.display_name.chars().take(19).collect();
            format!("{}...", head)
        } else {
            user.display_name.clone()
        };
        let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();

        println!(
            "{:<6} {:<24} {:<8} {:<10} {:<8} {}",
            user.id,
            name,
            user.role,
            status,
            bound,
            group_names.join(", ")
        );
    }
    println!();
}

async fn apply(pool: &DbPool, id: i32, changes: UserChanges, what: &str) {
    match users::update(pool.connection(), id, changes).await {
        Ok(Some(user)) => {
            println!("User {} ({}) {}.", user.id, user.display_name, what);
        }
        Ok(None) => {
            eprintln!("User {} not found.", id);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error updating user: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("User management CLI");
    println!();
    println!("Usage:");
    println!("  manage-users list");
    println!("  manage-users set-role --id <user-id> --role <admin|editor|user>");
    println!("  manage-users activate --id <user-id>");
    println!("  manage-users deactivate --id <user-id>");
}
