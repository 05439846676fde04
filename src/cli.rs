// src/cli.rs
use crate::core::Database;
use crate::database::{JobOfferRepository, UserRoleRepository};
use crate::types::{NewJobOffer, Role};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "jobster")]
#[command(about = "Job matching backend: swipe API server and admin tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Use this SQLite file instead of the one in config.yaml
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Create the database and its tables
    Init,
    /// Manage user roles
    #[command(subcommand)]
    Roles(RoleCommand),
    /// Manage job offers
    #[command(subcommand)]
    Offers(OfferCommand),
    /// Print platform counts
    Stats,
}

#[derive(Subcommand)]
pub enum RoleCommand {
    /// Set a user's role, replacing any previous one
    Assign {
        user_id: String,
        role: Role,
        #[arg(long)]
        email: Option<String>,
    },
    /// List registered users
    List,
}

#[derive(Subcommand)]
pub enum OfferCommand {
    /// Import offers from a CSV file with a header row:
    /// title,description,company,location,contract_type,salary_range,requirements
    Import {
        csv_file: PathBuf,
        #[arg(long)]
        recruiter_id: String,
    },
    /// List all offers, newest first
    List,
}

pub async fn handle_command(command: Command, db: &Database, database_path: &Path) -> Result<()> {
    match command {
        Command::Serve => anyhow::bail!("serve is handled by the binary entry point"),

        Command::Init => {
            info!("Database initialized at: {}", database_path.display());
            println!("Database ready: {}", database_path.display());
            println!("  Tables: user_roles, job_offers, applications, cvs");
        }

        Command::Roles(RoleCommand::Assign {
            user_id,
            role,
            email,
        }) => {
            let assigned = UserRoleRepository::new(db.pool())
                .assign(&user_id, email.as_deref(), role)
                .await?;
            println!("{} is now {}", assigned.user_id, assigned.role);
        }

        Command::Roles(RoleCommand::List) => {
            let roles = UserRoleRepository::new(db.pool()).list().await?;
            if roles.is_empty() {
                println!("No registered users.");
            } else {
                println!("{:<38} {:<12} {:<30} {:<16}", "User", "Role", "Email", "Since");
                println!("{}", "-".repeat(98));
                for r in roles {
                    println!(
                        "{:<38} {:<12} {:<30} {:<16}",
                        r.user_id,
                        r.role.as_str(),
                        r.email.as_deref().unwrap_or("-"),
                        r.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        Command::Offers(OfferCommand::Import {
            csv_file,
            recruiter_id,
        }) => {
            let report = import_offers(db, &csv_file, &recruiter_id).await?;
            println!("Import completed:");
            println!("  Imported: {}", report.imported);
            println!("  Skipped:  {}", report.skipped);
        }

        Command::Offers(OfferCommand::List) => {
            let offers = JobOfferRepository::new(db.pool()).list_all().await?;
            if offers.is_empty() {
                println!("No job offers.");
            } else {
                println!(
                    "{:<38} {:<8} {:<30} {:<20} {:<16}",
                    "ID", "Status", "Title", "Company", "Created"
                );
                println!("{}", "-".repeat(116));
                for o in offers {
                    println!(
                        "{:<38} {:<8} {:<30} {:<20} {:<16}",
                        o.id,
                        o.status.as_str(),
                        o.title,
                        o.company,
                        o.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        Command::Stats => {
            let roles = UserRoleRepository::new(db.pool());
            let offers = JobOfferRepository::new(db.pool());
            println!("Users:        {}", roles.count().await?);
            println!("  Recruiters:  {}", roles.count_by_role(Role::Recruiter).await?);
            println!("  Job seekers: {}", roles.count_by_role(Role::JobSeeker).await?);
            println!("  Admins:      {}", roles.count_by_role(Role::Admin).await?);
            println!("Job offers:   {}", offers.count().await?);
            println!("  Active:      {}", offers.count_active().await?);
        }
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Bulk-create offers for one recruiter. Bad rows are logged and skipped.
pub async fn import_offers(db: &Database, csv_file: &Path, recruiter_id: &str) -> Result<ImportReport> {
    let content = tokio::fs::read_to_string(csv_file)
        .await
        .with_context(|| format!("Failed to read {}", csv_file.display()))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let repo = JobOfferRepository::new(db.pool());
    let mut report = ImportReport::default();

    for (line, result) in reader.deserialize::<NewJobOffer>().enumerate() {
        // Header is line 1.
        let row = line + 2;
        let offer = match result {
            Ok(offer) => offer,
            Err(e) => {
                warn!("Row {}: CSV parsing error: {}", row, e);
                report.skipped += 1;
                continue;
            }
        };

        match repo.create(recruiter_id, &offer).await {
            Ok(created) => {
                info!("Row {}: imported '{}' as {}", row, created.title, created.id);
                report.imported += 1;
            }
            Err(e) => {
                error!("Row {}: {}", row, e);
                report.skipped += 1;
            }
        }
    }

    info!(
        "Imported {} offers for recruiter {} ({} skipped)",
        report.imported, recruiter_id, report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["jobster", "roles", "assign", "u1", "recruiter"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Roles(RoleCommand::Assign { role: Role::Recruiter, .. }))
        ));

        let cli = Cli::try_parse_from(["jobster"]).unwrap();
        assert!(cli.command.is_none());

        assert!(Cli::try_parse_from(["jobster", "roles", "assign", "u1", "owner"]).is_err());
    }

    #[tokio::test]
    async fn test_import_offers_skips_bad_rows() {
        let db = Database::in_memory().await.unwrap();
        let path = std::env::temp_dir().join(format!("jobster_offers_{}.csv", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            "title,description,company,location,contract_type,salary_range,requirements\n\
             Dev Rust,Backend,Acme,Lyon,CDI,50k,\"Rust, SQL\"\n\
             ,Missing title,Acme,Lyon,CDI,,\n\
             Data Engineer,Pipelines,Acme,Paris,CDD,,Python\n",
        )
        .await
        .unwrap();

        let report = import_offers(&db, &path, "rec-1").await.unwrap();
        assert_eq!(
            report,
            ImportReport {
                imported: 2,
                skipped: 1
            }
        );

        let offers = JobOfferRepository::new(db.pool()).list_all().await.unwrap();
        assert_eq!(offers.len(), 2);
        let dev = offers.iter().find(|o| o.title == "Dev Rust").unwrap();
        assert_eq!(dev.requirements.as_deref(), Some("Rust, SQL"));
        let data = offers.iter().find(|o| o.title == "Data Engineer").unwrap();
        assert!(data.salary_range.is_none());

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
