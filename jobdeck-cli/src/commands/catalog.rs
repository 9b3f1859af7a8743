//! Job catalog command handlers

use anyhow::Result;
use colored::*;
use jobdeck_core::domain::job::ParameterKind;
use jobdeck_engine::Session;
use jobdeck_engine::service::ParameterField;

/// List jobs with their trigger forms
pub async fn list_jobs(session: &Session) -> Result<()> {
    session.refresh_catalog().await?;
    let catalog = session.catalog();
    let jobs = catalog.jobs();

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} job(s):", jobs.len()).bold());
    println!();
    for job in jobs.iter() {
        println!("  {} {}", "▸".cyan(), job.name.bold());
        for field in catalog.form(&job.name)? {
            print_field(&field);
        }
        println!();
    }

    Ok(())
}

pub async fn list_clusters(session: &Session) -> Result<()> {
    let clusters = session.catalog().list_clusters().await?;

    if clusters.is_empty() {
        println!("{}", "No clusters found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} cluster(s):", clusters.len()).bold());
    for cluster in clusters.iter() {
        let version = if cluster.release_version.is_empty() {
            "unknown version".dimmed()
        } else {
            cluster.release_version.normal()
        };
        println!("  {} {}  {}", "▸".cyan(), cluster.name.bold(), version);
    }

    Ok(())
}

fn print_field(field: &ParameterField) {
    let default = if field.default.is_empty() {
        "(no default)".dimmed()
    } else {
        field.default.normal()
    };

    match field.kind {
        ParameterKind::FreeText => {
            println!("    {} = {}", field.key.cyan(), default);
        }
        ParameterKind::ClusterSelect => {
            println!("    {} = {}  {}", field.key.cyan(), default, "[cluster]".dimmed());
            for choice in &field.choices {
                println!("        {}", choice.label.dimmed());
            }
        }
    }
}
