//! Interactive Google Drive walkthrough
//!
//! Signs in through the system browser, then lists the first page of files.
//!
//! Run with:
//! ```bash
//! export GDRIVE_CLIENT_ID=1234.apps.googleusercontent.com
//! export GDRIVE_REDIRECT_URI=com.googleusercontent.apps.1234:/oauth2redirect
//! cargo run --example drive_demo
//!
//! # Sign out afterwards
//! cargo run --example drive_demo -- sign-out
//! ```
//!
//! The redirect URI must be registered for the client ID. After consenting,
//! copy the URL the browser was redirected to and paste it into the terminal.

use core_runtime::logging::{init_logging, LoggingConfig};
use futures::StreamExt;
use gdrive_client::{AuthConfig, CoreConfig, DriveApi, DriveClient, ListFilesParams};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let config = CoreConfig::builder().auth(AuthConfig::from_env()?).build()?;
    let client = DriveClient::new(config);

    let mut signed_in = client.auth().is_signed_in_stream();
    tokio::spawn(async move {
        while let Some(state) = signed_in.next().await {
            info!(signed_in = state, "Session state");
        }
    });

    if env::args().nth(1).as_deref() == Some("sign-out") {
        client.auth().sign_out().await?;
        println!("Signed out.");
        return Ok(());
    }

    if !client.auth().is_signed_in().await? {
        client.auth().sign_in().await?;
        println!("Paste the redirect URL from the browser:");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let Some(redirect) = lines.next_line().await? else {
            warn!("No redirect URL given");
            return Ok(());
        };

        if !client.auth().handle_redirect(redirect.trim()).await? {
            println!(
                "That URL does not start with {}",
                client.auth().config().redirect_uri()
            );
            return Ok(());
        }
    }

    let about = client.drive().get_about().await?;
    println!(
        "Signed in as {} ({} of {} bytes used)",
        about.user.display_name,
        about.storage_quota.usage.as_deref().unwrap_or("?"),
        about.storage_quota.limit.as_deref().unwrap_or("unlimited"),
    );

    let page = client
        .drive()
        .list_files(ListFilesParams {
            query: Some("trashed=false".to_string()),
            order_by: Some("modifiedTime desc".to_string()),
            page_size: Some(20),
            ..Default::default()
        })
        .await?;

    for file in &page.files {
        let kind = if file.is_folder() { "dir " } else { "file" };
        println!("{} {:<44} {}", kind, file.id, file.name);
    }
    if page.next_page_token.is_some() {
        println!("(more files available)");
    }

    Ok(())
}
