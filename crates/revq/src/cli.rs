use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "revq",
    version,
    about = "Track GitHub reviews you have received on your pull requests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Get reviews you have received
    Reviews {
        /// GitHub username
        #[arg(short, long)]
        username: String,

        /// GitHub personal access token (or set GITHUB_TOKEN)
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Filter by organization
        #[arg(short, long)]
        org: Option<String>,

        /// PR state filter: open, closed, all
        #[arg(short, long, default_value = "all")]
        state: String,

        /// Page number (echoed in the response, the list is not re-sliced)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Results per page (echoed in the response)
        #[arg(short = 'l', long, default_value_t = 30)]
        limit: u32,

        /// Only include reviews from the last N days
        #[arg(short = 'd', long)]
        days: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write a Markdown report to this file (in the current directory)
        #[arg(long, value_name = "FILENAME")]
        markdown: Option<String>,
    },

    /// Get review statistics
    Stats {
        /// GitHub username
        #[arg(short, long)]
        username: String,

        /// GitHub personal access token (or set GITHUB_TOKEN)
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Filter by organization
        #[arg(short, long)]
        org: Option<String>,

        /// Only include reviews from the last N days
        #[arg(short = 'd', long)]
        days: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
