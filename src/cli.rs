//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use voe_core::api::types::{CreatedFilter, DmcaListParams, FileListParams, Pagination};

/// Command-line client for the VOE file-hosting API.
///
/// Every subcommand maps to one API operation and prints the result as
/// pretty JSON on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "voe")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API key (overrides the config file)
    #[arg(long, env = "VOE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/voe/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Per-request timeout in milliseconds (1-600000)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=600_000))]
    pub timeout_ms: Option<u64>,

    /// Attempts per request, including the first (1-10)
    #[arg(short = 'r', long, global = true, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub retries: Option<u32>,

    /// Base retry delay in milliseconds; attempt n waits n times this (1-60000)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=60_000))]
    pub retry_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// API operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show account details
    AccountInfo,
    /// Show per-day account statistics
    AccountStats,
    /// Show the server that accepts the next upload
    UploadServer,
    /// Upload a local file
    Upload {
        /// File to upload
        path: PathBuf,
        /// File name announced to the server (default: the path's file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Queue a remote upload from a URL
    RemoteUpload {
        /// Source URL
        url: String,
        /// Target folder id
        #[arg(long)]
        folder: Option<u64>,
    },
    /// List queued remote uploads
    RemoteUploads,
    /// Clone a file
    Clone {
        /// File code to clone
        file_code: String,
        /// Target folder id
        #[arg(long)]
        folder: Option<u64>,
    },
    /// Show details of one or more files
    Info {
        /// File codes
        #[arg(required = true)]
        file_codes: Vec<String>,
    },
    /// List files
    List(ListArgs),
    /// Rename a file
    Rename {
        /// File code
        file_code: String,
        /// New title
        title: String,
    },
    /// Move a file into a folder (0 is the root)
    Move {
        /// File code
        file_code: String,
        /// Target folder id
        folder_id: u64,
    },
    /// Delete one or more files
    Delete {
        /// File codes
        #[arg(required = true)]
        file_codes: Vec<String>,
    },
    /// List a folder (the root when no id is given)
    Folders {
        /// Folder id
        #[arg(long)]
        folder: Option<u64>,
    },
    /// Create a folder
    CreateFolder {
        /// Folder name
        name: String,
        /// Parent folder id
        #[arg(long)]
        parent: Option<u64>,
    },
    /// Rename a folder
    RenameFolder {
        /// Folder id
        folder_id: u64,
        /// New name
        name: String,
    },
    /// List recently deleted files
    Deleted(HistoryArgs),
    /// List files affected by DMCA notices
    Dmca(HistoryArgs),
    /// Show the current adblock-resistant domain
    Domain,
    /// Generate premium keys
    PremiumKeys {
        /// Validity of each key in days
        #[arg(long)]
        days: u32,
        /// Number of keys
        #[arg(long)]
        amount: u32,
    },
    /// Show the effective configuration
    Config,
}

/// Page selection.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Page number (from 1)
    #[arg(long)]
    pub page: Option<u32>,
    /// Results per page
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl From<PageArgs> for Pagination {
    fn from(args: PageArgs) -> Self {
        Self {
            page: args.page,
            per_page: args.per_page,
        }
    }
}

/// File listing filters.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    #[command(flatten)]
    pub pages: PageArgs,
    /// Only files in this folder
    #[arg(long)]
    pub folder: Option<i64>,
    /// Only files created after this date or unix timestamp
    #[arg(long)]
    pub created: Option<String>,
    /// Only files whose name contains this text
    #[arg(long)]
    pub name: Option<String>,
    /// Include preview data
    #[arg(long)]
    pub preview: bool,
}

impl ListArgs {
    /// Converts the flags into API filters.
    pub fn to_params(&self) -> FileListParams {
        FileListParams {
            pagination: self.pages.into(),
            fld_id: self.folder,
            created: self.created.as_deref().map(created_filter),
            name: self.name.clone(),
            preview: self.preview.then_some(true),
        }
    }
}

/// Deleted-file and DMCA listing filters.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub pages: PageArgs,
    /// Only the last N days
    #[arg(long)]
    pub last: Option<u32>,
    /// Only pending entries
    #[arg(long)]
    pub pending: bool,
}

impl HistoryArgs {
    /// Converts the flags into API filters.
    pub fn to_params(self) -> DmcaListParams {
        DmcaListParams {
            pagination: self.pages.into(),
            last: self.last,
            pending: self.pending.then_some(true),
        }
    }
}

/// A purely numeric value is a unix timestamp; anything else is a date.
fn created_filter(raw: &str) -> CreatedFilter {
    raw.parse::<i64>()
        .map_or_else(|_| CreatedFilter::Date(raw.to_string()), CreatedFilter::Timestamp)
}
