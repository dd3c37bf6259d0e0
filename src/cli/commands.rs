use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "transferwatch", about = "Football transfer news extraction and polling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract transfer records from a text file ("-" for stdin)
    Extract {
        file: String,
        /// URL the text came from, used for source scoring
        #[arg(long, default_value = "")]
        source: String,
    },
    /// Show the reliability score and tier for a source URL
    Score { url: String },
    /// Run a single acquisition cycle and print the qualifying transfers
    Scan {
        /// URLs to scan (repeatable); defaults to the configured set
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Minimum fee in GBP (e.g. 50000000)
        #[arg(long)]
        min_fee: Option<f64>,
        /// Only transfers involving these clubs (repeatable)
        #[arg(long = "club")]
        clubs: Vec<String>,
        /// Minimum source score, 0-100
        #[arg(long)]
        min_confidence: Option<u8>,
    },
    /// Poll periodically until Ctrl-C
    Watch {
        /// Minutes between cycles; defaults to the configured interval
        #[arg(long)]
        interval: Option<u64>,
        /// URLs to poll (repeatable); defaults to the configured set
        #[arg(long = "url")]
        urls: Vec<String>,
    },
}
