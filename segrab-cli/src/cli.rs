use clap::Parser;
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Download an HLS stream into a single file",
    long_about = "Fetches an HLS playlist, follows master playlists to the highest-bandwidth\n\
                  variant, downloads every media segment in bounded concurrent batches and\n\
                  writes them to one output file in playback order."
)]
pub struct CliArgs {
    /// Playlist URL (master or media)
    #[arg(help = "URL of the HLS playlist to download")]
    pub url: String,

    /// Output file, created or truncated
    #[arg(help = "Path of the output file (created or truncated)")]
    pub output: PathBuf,

    /// Number of segments downloaded concurrently
    #[arg(
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Segments fetched per batch (maximum concurrent downloads)"
    )]
    pub concurrency: u32,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE", help = "Also write logs to this file (truncated on start)")]
    pub log_file: Option<PathBuf>,

    /// Show a progress bar
    #[arg(
        short = 'P',
        long = "progress",
        help = "Show a progress bar while segments are written"
    )]
    pub show_progress: bool,

    /// Custom HTTP headers for download requests
    #[arg(
        long = "header",
        short = 'H',
        help = "Add custom HTTP header to requests (can be used multiple times). Format: 'Name: Value'",
        value_name = "HEADER"
    )]
    pub headers: Vec<String>,

    #[arg(long, help = "User-Agent sent with every request")]
    pub user_agent: Option<String>,

    /// Overall request timeout in seconds
    #[arg(
        long,
        default_value = "0",
        help = "Overall timeout in seconds for HTTP requests (0 = none)"
    )]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "10",
        help = "Connection timeout in seconds (0 = none)"
    )]
    pub connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(
        long,
        default_value = "30",
        help = "Read timeout in seconds, maximum time between received chunks (0 = none)"
    )]
    pub read_timeout: u64,

    /// Maximum number of master playlists to follow
    #[arg(
        long,
        default_value = "8",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum number of nested master playlists to follow"
    )]
    pub max_depth: u32,

    /// Proxy URL; the scheme selects HTTP(S) or SOCKS5
    #[arg(
        long,
        help = "Proxy for all requests: http://host:port, socks5://host:port or host:port"
    )]
    pub proxy: Option<String>,

    /// Proxy username
    #[arg(long, requires = "proxy", help = "Username for proxy authentication")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, help = "Password for proxy authentication")]
    pub proxy_pass: Option<String>,

    /// Disable all proxy settings for downloads
    #[arg(
        long,
        help = "Disable all proxy settings (including system proxy) for downloads",
        conflicts_with = "proxy"
    )]
    pub no_proxy: bool,
}
