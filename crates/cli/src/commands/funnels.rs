use bread_client::AppContext;
use clap::Subcommand;

use super::{CommandError, or_dash};

#[derive(Subcommand)]
pub enum FunnelAction {
    /// List funnels, newest first
    List,
    /// Show the funnel served at a slug
    Show { slug: String },
}

pub async fn run(ctx: &AppContext, action: FunnelAction) -> Result<(), CommandError> {
    match action {
        FunnelAction::List => {
            let funnels = ctx.funnels().list().await;
            for funnel in &funnels {
                println!("{:<24} {}", funnel.slug, funnel.title);
            }
            println!("{} funnel(s)", funnels.len());
        }
        FunnelAction::Show { slug } => {
            let funnel = ctx
                .funnels()
                .get_by_slug(&slug)
                .await
                .ok_or_else(|| CommandError::NotFound(format!("Funnel '{slug}'")))?;
            println!("{}", funnel.title);
            println!("{}", funnel.description);
            println!("Image:   {}", or_dash(funnel.image_url.as_deref()));
            println!("Created: {}", funnel.created_at.format("%Y-%m-%d"));
        }
    }
    Ok(())
}
