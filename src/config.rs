use std::net::SocketAddr;

use clap::{Args, Parser};

/// Keywords stripped from node names by default: traffic multipliers,
/// expiry/quota markers and provider announcement entries.
const DEFAULT_EXCLUDE_KEYWORDS: &str =
    "5x,10x,x5,x10,到期,剩余,流量,太旧,过期,时间,重置,试用,赠送,限速,低速,群,官网,客服,网站,更新,通知";

const DEFAULT_BACKEND_URLS: &str = "https://api.v1.mk/sub,https://api.wcc.best/sub,https://sub.id9.cc/sub,https://sub.yorun.me/sub";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStyle {
    /// `name` -> `name_1`
    Underscore,
    /// `name` -> `name [1]`
    Bracket,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Fail the request with a diagnostic when no node survives filtering.
    Error,
    /// Emit one synthetic placeholder node so the client still loads a config.
    Placeholder,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "subfuse",
    about = "Clash subscription aggregator",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    #[arg(
        long,
        value_name = "ADDR",
        env = "SUBFUSE_BIND",
        default_value = "127.0.0.1:8080"
    )]
    pub bind: SocketAddr,

    /// Subscription URLs, separated by newline, comma or semicolon.
    #[arg(
        long = "sub-urls",
        env = "SUBFUSE_SUB_URLS",
        value_name = "URLS",
        default_value = ""
    )]
    pub sub_urls: String,

    /// Conversion backends tried in order; the first one that yields nodes wins.
    #[arg(
        long = "backend-urls",
        env = "SUBFUSE_BACKEND_URLS",
        value_name = "URLS",
        default_value = DEFAULT_BACKEND_URLS
    )]
    pub backend_urls: String,

    /// Fetch the subscription URLs directly instead of going through a backend.
    #[arg(
        long,
        env = "SUBFUSE_DIRECT",
        value_name = "BOOL",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub direct: bool,

    #[arg(
        long = "user-agent",
        env = "SUBFUSE_USER_AGENT",
        value_name = "UA",
        default_value = "Clash.Meta/1.18.0"
    )]
    pub user_agent: String,

    #[arg(
        long = "fetch-timeout-secs",
        env = "SUBFUSE_FETCH_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = 20,
        value_parser = clap::value_parser!(u64).range(1..=120)
    )]
    pub fetch_timeout_secs: u64,

    /// Case-insensitive substrings; a node whose name contains one is dropped.
    #[arg(
        long = "exclude-keywords",
        env = "SUBFUSE_EXCLUDE_KEYWORDS",
        value_name = "WORDS",
        default_value = DEFAULT_EXCLUDE_KEYWORDS
    )]
    pub exclude_keywords: String,

    #[arg(
        long = "rename-style",
        env = "SUBFUSE_RENAME_STYLE",
        value_name = "STYLE",
        default_value = "underscore",
        value_enum
    )]
    pub rename_style: RenameStyle,

    #[arg(
        long = "on-empty",
        env = "SUBFUSE_ON_EMPTY",
        value_name = "POLICY",
        default_value = "error",
        value_enum
    )]
    pub on_empty: EmptyPolicy,

    /// When non-empty, requests must carry a matching `?token=` query value.
    #[arg(
        long = "access-token",
        env = "SUBFUSE_ACCESS_TOKEN",
        value_name = "TOKEN",
        default_value = ""
    )]
    pub access_token: String,

    /// Download filename advertised via Content-Disposition (without extension).
    #[arg(
        long,
        env = "SUBFUSE_FILENAME",
        value_name = "NAME",
        default_value = "subfuse"
    )]
    pub filename: String,
}

impl Config {
    pub fn subscription_urls(&self) -> Vec<String> {
        split_url_list(&self.sub_urls)
    }

    pub fn backends(&self) -> Vec<String> {
        split_url_list(&self.backend_urls)
    }

    pub fn exclusions(&self) -> Vec<String> {
        self.exclude_keywords
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Splits a newline/comma/semicolon-delimited URL list, trimming blanks.
pub fn split_url_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_when_flags_absent() {
        let cli = Cli::try_parse_from(["subfuse"]).unwrap();
        assert_eq!(cli.config.fetch_timeout_secs, 20);
        assert_eq!(cli.config.user_agent, "Clash.Meta/1.18.0");
        assert_eq!(cli.config.rename_style, RenameStyle::Underscore);
        assert_eq!(cli.config.on_empty, EmptyPolicy::Error);
        assert!(!cli.config.direct);
        assert_eq!(cli.config.backends().len(), 4);
        assert!(cli.config.subscription_urls().is_empty());
        assert!(cli.config.access_token.is_empty());
        assert_eq!(cli.config.filename, "subfuse");
    }

    #[test]
    fn rejects_invalid_fetch_timeout_secs() {
        let err = Cli::try_parse_from(["subfuse", "--fetch-timeout-secs", "0"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--fetch-timeout-secs"));
        assert!(msg.contains("1..=120"));
    }

    #[test]
    fn parses_direct_as_bool_value() {
        let cli = Cli::try_parse_from(["subfuse", "--direct", "yes"]).unwrap();
        assert!(cli.config.direct);
    }

    #[test]
    fn splits_url_list_on_all_delimiters() {
        let urls = split_url_list("https://a/sub\n https://b/sub ,;https://c/sub;\n");
        assert_eq!(urls, vec!["https://a/sub", "https://b/sub", "https://c/sub"]);
    }

    #[test]
    fn exclusions_are_lowercased() {
        let mut cli = Cli::try_parse_from(["subfuse"]).unwrap();
        cli.config.exclude_keywords = "5X, Trial ,".to_string();
        assert_eq!(cli.config.exclusions(), vec!["5x", "trial"]);
    }
}
