//! Command implementations for spiry
//!
//! Each handler builds one resource from its arguments, resolves it, and
//! returns the rendered output for the binary to print.

use crate::cli::{CertificateArgs, Cli, Command, DomainArgs};
use crate::config::{Settings, TlsSettings, WhoisSettings};
use crate::models::{Certificate, Domain};
use crate::output::{render, RenderOptions};
use crate::utils::Result;

/// Run whichever subcommand `cli` selected
pub fn run(cli: &Cli, settings: &Settings) -> Result<String> {
    let options = cli.render_options();
    match &cli.command {
        Command::Domain(args) => run_domain(args, &settings.whois, &options),
        Command::Certificate(args) => run_certificate(args, &settings.tls, &options),
    }
}

/// Run the domain command
pub fn run_domain(args: &DomainArgs, settings: &WhoisSettings, options: &RenderOptions) -> Result<String> {
    let mut domain = Domain::from_settings(&args.domain, settings)?;
    if let Some(server) = &args.server {
        domain = domain.with_whois_server(server.as_str());
    }

    render(&mut domain, options)
}

/// Run the certificate command
pub fn run_certificate(
    args: &CertificateArgs,
    settings: &TlsSettings,
    options: &RenderOptions,
) -> Result<String> {
    if args.insecure {
        tracing::debug!("--insecure given; certificates are never verified");
    }

    let mut cert = Certificate::from_settings(&args.address, args.name.as_deref(), settings)?;
    render(&mut cert, options)
}
