use crate::session::Session;
use docvault_config::VaultConfig;
use docvault_core::{Result, ShareOptions};

pub async fn execute(
    config: &VaultConfig,
    id: &str,
    expiry_days: Option<u32>,
    max_views: Option<u32>,
) -> Result<()> {
    let options = options_from_flags(config.share_defaults, expiry_days, max_views)?;

    let session = Session::connect(config).await?;
    let id = session.open_menu(id)?;
    let link = session.controller.share(&id, Some(options)).await?;

    println!("{}", link.address);
    eprintln!(
        "Expires in {} days or after {} views, whichever comes first",
        options.expiry_days, options.max_views
    );
    Ok(())
}

fn options_from_flags(
    defaults: ShareOptions,
    expiry_days: Option<u32>,
    max_views: Option<u32>,
) -> Result<ShareOptions> {
    ShareOptions::new(
        defaults.is_public,
        expiry_days.unwrap_or(defaults.expiry_days.get()),
        max_views.unwrap_or(defaults.max_views.get()),
    )
}
