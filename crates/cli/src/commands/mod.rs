use clap::Subcommand;
use docvault_config::VaultConfig;
use docvault_core::{safe_file_name, Result};
use docvault_utils::tracing::document_span;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

pub mod documents;
pub mod open;
pub mod share;

#[derive(Subcommand)]
pub enum Commands {
    /// List your documents
    #[command(visible_alias = "ls")]
    List,

    /// Create a share link for a public document
    Share {
        /// Document id
        id: String,

        /// Days until the link expires
        #[arg(long)]
        expiry_days: Option<u32>,

        /// Number of views before the link stops working
        #[arg(long)]
        max_views: Option<u32>,
    },

    /// Flip a document between public and private
    Toggle {
        /// Document id
        id: String,
    },

    /// Delete a document
    #[command(visible_alias = "rm")]
    Delete {
        /// Document id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Download a document
    Download {
        /// Document id
        id: String,

        /// Where to write the file (defaults to the server's filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a file as a new document
    #[command(visible_alias = "up")]
    Upload {
        /// File to upload
        path: PathBuf,

        /// Category to file the document under
        #[arg(short, long)]
        category: String,

        /// Name to store instead of the file's own
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Change a document's name, category or content
    Edit {
        /// Document id
        id: String,

        /// Replacement content
        #[arg(long)]
        file: Option<PathBuf>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Open a shared link without signing in
    Open {
        /// Shareable address (`<origin>/shared/<token>`) or bare token
        address: String,

        /// Where to write content that cannot be shown in the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where to write fetched content: the explicit `--output`, else the
/// server-suggested name reduced to a bare file in the current directory.
pub(crate) fn output_path(output: Option<&Path>, suggested: &str, fallback: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(safe_file_name(suggested).unwrap_or_else(|| fallback.to_string())),
    }
}

impl Commands {
    pub async fn execute(self, config: Arc<VaultConfig>) -> Result<()> {
        match self {
            Commands::List => documents::list(&config).await,
            Commands::Share {
                id,
                expiry_days,
                max_views,
            } => {
                share::execute(&config, &id, expiry_days, max_views)
                    .instrument(document_span("share", &id))
                    .await
            }
            Commands::Toggle { id } => {
                documents::toggle(&config, &id)
                    .instrument(document_span("toggle", &id))
                    .await
            }
            Commands::Delete { id, yes } => {
                documents::delete(&config, &id, yes)
                    .instrument(document_span("delete", &id))
                    .await
            }
            Commands::Download { id, output } => {
                documents::download(&config, &id, output)
                    .instrument(document_span("download", &id))
                    .await
            }
            Commands::Upload {
                path,
                category,
                name,
            } => documents::upload(&config, &path, category, name).await,
            Commands::Edit {
                id,
                file,
                category,
                name,
            } => {
                documents::edit(&config, &id, file.as_deref(), category, name)
                    .instrument(document_span("edit", &id))
                    .await
            }
            Commands::Open { address, output } => open::execute(&config, &address, output).await,
        }
    }
}
