//! Leads dashboard.

use std::path::PathBuf;

use bread_client::AppContext;
use bread_client::export;
use bread_core::{Email, LeadId, LeadUpdate, NewLead};
use clap::Subcommand;

use super::{CommandError, emit, or_dash};

#[derive(Subcommand)]
pub enum LeadAction {
    /// List leads, newest first
    List,
    /// Show one lead
    Show { id: LeadId },
    /// Capture a lead
    Create {
        /// Lead's email address
        #[arg(long)]
        lead_email: Email,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    /// Change a lead's contact details
    Update {
        id: LeadId,
        #[arg(long)]
        lead_email: Option<Email>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    /// Delete a lead
    Delete { id: LeadId },
    /// Export every lead as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(ctx: &AppContext, action: LeadAction) -> Result<(), CommandError> {
    let leads = ctx.leads();

    match action {
        LeadAction::List => {
            let all = leads.list().await;
            for lead in &all {
                println!(
                    "{}  {:<32} {:<16} {:<16} {}",
                    lead.id,
                    lead.email,
                    or_dash(lead.phone.as_deref()),
                    or_dash(lead.username.as_deref()),
                    lead.created_at.format("%Y-%m-%d %H:%M"),
                );
            }
            println!("{} lead(s)", all.len());
        }
        LeadAction::Show { id } => {
            let lead = leads
                .get_by_id(id)
                .await
                .ok_or_else(|| CommandError::NotFound(format!("Lead {id}")))?;
            println!("Email:    {}", lead.email);
            println!("Phone:    {}", or_dash(lead.phone.as_deref()));
            println!("Username: {}", or_dash(lead.username.as_deref()));
            println!("Created:  {}", lead.created_at.to_rfc3339());
            println!("Updated:  {}", lead.updated_at.to_rfc3339());
        }
        LeadAction::Create {
            lead_email,
            phone,
            username,
        } => {
            let lead = leads
                .create(&NewLead {
                    email: lead_email,
                    phone,
                    username,
                })
                .await?;
            println!("Created lead {}", lead.id);
        }
        LeadAction::Update {
            id,
            lead_email,
            phone,
            username,
        } => {
            let changes = LeadUpdate {
                email: lead_email,
                phone,
                username,
            };
            if changes.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }
            let lead = leads.update(id, &changes).await?;
            println!("Updated lead {} ({})", lead.id, lead.email);
        }
        LeadAction::Delete { id } => {
            leads.delete(id).await?;
            println!("Deleted lead {id}");
        }
        LeadAction::Export { output } => {
            emit(&export::leads_csv(&leads.list().await), output.as_deref())?;
        }
    }
    Ok(())
}
