//! Runtime configuration for the `pingbot` binary.

use clap::Parser;

/// Default platform REST base URL.
const DEFAULT_API_BASE: &str = "https://mixer.com/api/v1";

/// Configuration for the `pingbot` process.
///
/// The bearer token is the only required input; everything else has a
/// sensible default.
#[derive(Debug, Parser)]
#[command(name = "pingbot", version, about = "Greets joiners and answers !ping in a channel's chat")]
pub struct Config {
    /// Bearer token for the platform API. Tokens from the issuance page
    /// are valid for one year.
    #[arg(long, env = "PINGBOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Base URL of the platform REST API.
    #[arg(long, env = "PINGBOT_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Channel to join instead of the bot's own channel.
    #[arg(long)]
    pub channel: Option<u64>,
}
