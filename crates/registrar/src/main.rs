use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use registrar_core::types::{CreateEventInput, EventFilter};
use registrar_core::{Registrar, RequestContext};
use registrar_db::store::DbStore;
use registrar_feed::bus::ChangeBus;
use registrar_feed::types::ChangeSource;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "registrar")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Insert the demo event when the catalog is empty
    Seed,
    /// Print the OpenAPI document
    Openapi,
}

fn db_path() -> String {
    std::env::var("REGISTRAR_DB_PATH").unwrap_or_else(|_| ".registrar/registrar.db".to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => {
            let db_path = db_path();
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let port = std::env::var("REGISTRAR_PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(4870);
            let public_dir = std::env::var("REGISTRAR_PUBLIC_DIR").ok().map(PathBuf::from);
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
            let _ = cleanup_sessions(&db_path);
            let state = match registrar_serve::build_state(&db_path, public_dir) {
                Ok(state) => state,
                Err(err) => {
                    eprintln!("{} {err}", "error:".red().bold());
                    std::process::exit(1);
                }
            };
            println!("{} http://{addr}", "listening on".green().bold());
            if let Err(err) = registrar_serve::serve(state, addr).await {
                eprintln!("{} {err}", "serve error:".red().bold());
            }
        }
        Command::Seed => {
            if let Err(err) = seed(&db_path()) {
                eprintln!("{} {err}", "error:".red().bold());
                std::process::exit(1);
            }
        }
        Command::Openapi => {
            let spec = registrar_serve::openapi::generate_spec();
            println!("{spec}");
        }
    }
}

fn cleanup_sessions(path: &str) -> Result<(), String> {
    let conn = registrar_db::schema::open_and_migrate(path).map_err(|err| err.to_string())?;
    let sessions = registrar_db::session_repo::SessionRepo::new(&conn);
    let _ = sessions.cleanup(chrono::Utc::now());
    Ok(())
}

fn seed(path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = registrar_db::schema::open_and_migrate(path).map_err(|err| err.to_string())?;
    let registrar = Registrar::new(DbStore::new(conn), ChangeBus::new(16));
    let existing = registrar
        .events()
        .list(EventFilter::default())
        .map_err(|err| err.to_string())?;
    if !existing.is_empty() {
        println!("{}", "catalog already seeded, nothing to do".yellow());
        return Ok(());
    }
    let Some(date) = NaiveDate::from_ymd_opt(2025, 12, 8) else {
        return Err("invalid seed date".to_string());
    };
    let ctx = RequestContext::new(ChangeSource::Cli, None);
    let event = registrar
        .events()
        .create(
            &ctx,
            CreateEventInput {
                title: "2026 UX Design Trends".to_string(),
                description: "A walkthrough of the interaction patterns and tooling shifts we \
                              expect to define product design next year, with a live Q&A."
                    .to_string(),
                date,
                time: "15:00 EST".to_string(),
                max_seats: 200,
                price: 500,
                is_virtual: true,
            },
        )
        .map_err(|err| err.to_string())?;
    println!("{} {}", "seeded event".green().bold(), event.id);
    Ok(())
}
