//! CLI argument definitions using clap

use crate::output::{OutputStyle, RenderOptions, TimeFormat};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spiry")]
#[command(version, disable_version_flag = true)]
#[command(about = "Look up domain name and TLS certificate expiration", long_about = None)]
#[command(after_help = "Environment variables:\n  SPIRY_DEBUG    print debug messages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Only display expiration date
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub bare: bool,

    /// Display output as JSON
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Display expiration date as UNIX timestamp
    #[arg(short, long, global = true, conflicts_with_all = ["rfc1123z", "rfc3339"])]
    pub unix: bool,

    /// Display expiration date as RFC1123Z timestamp
    #[arg(short, long, global = true, conflicts_with = "rfc3339")]
    pub rfc1123z: bool,

    /// Display expiration date as RFC3339 timestamp
    #[arg(short = 'R', long, global = true)]
    pub rfc3339: bool,

    /// Enable debug mode
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    /// Read settings from FILE instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up a domain's registration expiration via WHOIS
    Domain(DomainArgs),

    /// Look up the expiration of an endpoint's TLS certificate
    #[command(alias = "cert")]
    Certificate(CertificateArgs),
}

#[derive(Args, Debug)]
pub struct DomainArgs {
    /// Domain name to look up
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Use SERVER as a specific WHOIS server
    #[arg(short, long, value_name = "SERVER")]
    pub server: Option<String>,
}

#[derive(Args, Debug)]
pub struct CertificateArgs {
    /// Address to retrieve the TLS certificate from (host, host:port, or URL)
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Request the TLS certificate for domain NAME instead of ADDRESS
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Allow insecure server connections (certificates are never verified)
    #[arg(short = 'k', long)]
    pub insecure: bool,
}

impl Cli {
    /// Output layout and time format selected by the flags
    pub fn render_options(&self) -> RenderOptions {
        let style = if self.bare {
            OutputStyle::Bare
        } else if self.json {
            OutputStyle::Json
        } else {
            OutputStyle::Plain
        };

        let time = if self.unix {
            TimeFormat::Unix
        } else if self.rfc1123z {
            TimeFormat::Rfc1123z
        } else if self.rfc3339 {
            TimeFormat::Rfc3339
        } else {
            TimeFormat::Iso8601
        };

        RenderOptions { style, time }
    }

    /// Debug output requested by flag or a non-empty `SPIRY_DEBUG`
    pub fn debug_enabled(&self) -> bool {
        self.debug || std::env::var_os("SPIRY_DEBUG").is_some_and(|v| !v.is_empty())
    }
}
