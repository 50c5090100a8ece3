//! CLI commands

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use ootd_core::{Category, GalleryPager, SignupPayload};
use ootd_http::OotdClient;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;

/// Credentials used when no session can be restored
#[derive(Args, Clone)]
pub struct Credentials {
    #[arg(long, env = "OOTD_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "OOTD_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and print the signed-in user
    Login,

    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
    },

    /// Sign in, then sign out again
    Logout,

    /// Browse the closet page by page
    Clothes {
        /// Category filter (all, top, bottom, accessory, outerwear, dress, shoes)
        #[arg(long, default_value = "all")]
        category: Category,

        /// Items per page
        #[arg(long, default_value_t = ootd_core::DEFAULT_PAGE_LIMIT)]
        limit: u32,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// A random selection of items
    Random,

    /// Known style tags
    StyleTags,

    /// Outfit suggestions for an item
    Recommend { item_id: i64 },

    /// Delete an item
    Delete { id: i64 },

    /// Print the effective settings
    Config,
}

impl Commands {
    pub async fn execute(
        self,
        settings: &Settings,
        client: &OotdClient,
        credentials: Credentials,
    ) -> Result<()> {
        match self {
            Self::Config => print_json(settings),
            Self::Signup { username } => {
                let (email, password) = credentials.required()?;
                let session = client
                    .signup(&SignupPayload {
                        email,
                        username,
                        password,
                    })
                    .await?;
                print_json(&session.user)
            }
            Self::Login => {
                let session = sign_in(client, credentials).await?;
                print_json(&session.user)
            }
            Self::Logout => {
                sign_in(client, credentials).await?;
                let response = client.logout().await?;
                println!("{}", response.message);
                Ok(())
            }
            Self::Clothes {
                category,
                limit,
                pages,
            } => {
                sign_in(client, credentials).await?;
                let items = load_gallery(client, category, limit, pages).await?;
                print_json(&items)
            }
            Self::Random => {
                sign_in(client, credentials).await?;
                print_json(&client.api().random_clothes().await?)
            }
            Self::StyleTags => {
                sign_in(client, credentials).await?;
                print_json(&client.api().style_tags().await?)
            }
            Self::Recommend { item_id } => {
                sign_in(client, credentials).await?;
                print_json(&client.api().recommendations(item_id).await?)
            }
            Self::Delete { id } => {
                sign_in(client, credentials).await?;
                let response = client.api().delete_cloth(id).await?;
                println!("{}", response.message);
                Ok(())
            }
        }
    }
}

impl Credentials {
    fn required(self) -> Result<(String, String)> {
        match (self.email, self.password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => bail!("--email and --password (or OOTD_EMAIL / OOTD_PASSWORD) are required"),
        }
    }
}

/// Restore the session from the refresh cookie, or log in
async fn sign_in(client: &OotdClient, credentials: Credentials) -> Result<ootd_core::Session> {
    if let Some(session) = client.rehydrate().await {
        debug!("session restored");
        return Ok(session);
    }

    let (email, password) = credentials.required()?;
    let session = client
        .login(&email, &password)
        .await
        .context("login failed")?;
    info!(user = ?session.user.as_ref().map(|user| &user.username), "signed in");
    Ok(session)
}

async fn load_gallery(
    client: &OotdClient,
    category: Category,
    limit: u32,
    pages: u32,
) -> Result<Vec<ootd_core::ClothItem>> {
    let mut pager = GalleryPager::new(category, limit);

    pager.begin_load();
    let first = client
        .api()
        .clothes_page(pager.category(), pager.limit(), pager.next_offset())
        .await?;
    pager.apply_first_page(first);

    for _ in 1..pages {
        let Some(offset) = pager.request_next_page() else {
            break;
        };
        let page = client
            .api()
            .clothes_page(pager.category(), pager.limit(), offset)
            .await?;
        pager.apply_page(page);
    }

    debug!(page = pager.page(), has_more = pager.has_more(), "gallery loaded");
    Ok(pager.items().to_vec())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
