use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use contacts_core::{Credential, HttpTransport, PEOPLE_API};
use std::sync::Arc;

use crate::tools::ToolContext;

/// Startup configuration, read once from flags or the environment.
#[derive(Parser)]
#[command(name = "contacts-mcp")]
#[command(version)]
#[command(about = "MCP server for Google Contacts over stdio")]
pub struct Config {
    #[arg(
        long,
        env = "GOOGLE_ACCESS_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new(),
        help = "OAuth access token for the People API"
    )]
    pub token: String,

    #[arg(
        long,
        env = "PEOPLE_API_BASE_URL",
        default_value = PEOPLE_API,
        help = "Base URL of the People API"
    )]
    pub base_url: String,

    #[arg(
        long,
        env = "CONTACTS_MCP_LOG",
        default_value = "info",
        help = "Log level when RUST_LOG is unset"
    )]
    pub log_level: String,
}

impl Config {
    pub fn credential(&self) -> Credential {
        Credential::new(self.token.clone())
    }

    pub fn transport(&self) -> HttpTransport {
        HttpTransport::with_base_url(self.base_url.as_str())
    }

    pub fn context(&self) -> ToolContext {
        ToolContext::new(self.credential(), Arc::new(self.transport()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_flag_and_defaults() {
        let config = Config::try_parse_from(["contacts-mcp", "--token", "ya29.x"]).unwrap();
        assert_eq!(config.credential().token(), "ya29.x");
        assert_eq!(config.transport().base_url(), PEOPLE_API);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn base_url_override() {
        let config = Config::try_parse_from([
            "contacts-mcp",
            "--token",
            "t",
            "--base-url",
            "http://127.0.0.1:9000/v1/",
        ])
        .unwrap();
        assert_eq!(config.transport().base_url(), "http://127.0.0.1:9000/v1");
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(Config::try_parse_from(["contacts-mcp", "--token", ""]).is_err());
    }
}
