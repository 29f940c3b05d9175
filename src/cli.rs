// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Commands:
// - company add/edit/rm/list   manage companies (groups of links)
// - link add/edit/rm           register, change or remove a link
// - list          show links with their last known status
// - check         probe every link (or just one) once, right now
// - watch         keep probing on an interval until Ctrl-C
// - stats         dashboard numbers
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "link-sentinel",
    version,
    about = "Keeps watch over your links and tells you when they go down",
    long_about = "link-sentinel stores your links grouped by company, probes them with HTTP HEAD \
                  requests, records status and response time, and reports when a link goes \
                  offline or comes back."
)]
pub struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path of the JSON store (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Whose links to work with (overrides the config file)
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage companies
    #[command(subcommand)]
    Company(CompanyCommand),

    /// Manage links
    #[command(subcommand)]
    Link(LinkCommand),

    /// List links with their last known status
    List {
        /// Only links of this company
        #[arg(long)]
        company: Option<Uuid>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check every link once, or only the one given
    ///
    /// Exits with 1 if a checked link is not online afterwards
    Check {
        link_id: Option<Uuid>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check every link now and then again every --interval minutes
    ///
    /// Example: link-sentinel watch --interval 10
    Watch {
        /// Minutes between passes (1-60)
        #[arg(long)]
        interval: Option<u32>,
    },

    /// Show dashboard statistics
    Stats(OutputArgs),
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    /// Register a company
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename a company or change its description
    Edit {
        company_id: Uuid,
        #[arg(long)]
        name: Option<String>,
        /// An empty string removes the description
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a company together with all of its links
    #[command(alias = "rm")]
    Remove { company_id: Uuid },

    /// List companies
    #[command(alias = "ls")]
    List(OutputArgs),
}

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    /// Register a link under a company
    ///
    /// Example: link-sentinel link add <COMPANY_ID> "Docs" docs.example.com
    Add {
        company_id: Uuid,
        name: String,
        /// http:// is assumed when no scheme is given
        url: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Change a link's name, URL, description or company
    ///
    /// The last known status is kept.
    /// Example: link-sentinel link edit <LINK_ID> --url https://docs.example.com/v2
    Edit {
        link_id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// An empty string removes the description
        #[arg(long)]
        description: Option<String>,
        /// Move the link to another company
        #[arg(long)]
        company: Option<Uuid>,
    },

    /// Remove a link
    #[command(alias = "rm")]
    Remove { link_id: Uuid },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_with_global_flags() {
        let cli = Cli::parse_from(["link-sentinel", "watch", "--interval", "15", "--user", "alice"]);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert!(matches!(cli.command, Commands::Watch { interval: Some(15) }));
    }

    #[test]
    fn test_parse_check_one_link() {
        let id = Uuid::new_v4();
        let cli = Cli::parse_from(["link-sentinel", "check", &id.to_string(), "--json"]);
        match cli.command {
            Commands::Check { link_id, output } => {
                assert_eq!(link_id, Some(id));
                assert!(output.json);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::parse_from(["link-sentinel", "check"]);
        assert!(matches!(cli.command, Commands::Check { link_id: None, .. }));
    }

    #[test]
    fn test_parse_edits_and_company_filter() {
        let id = Uuid::new_v4();
        let cli = Cli::parse_from(["link-sentinel", "link", "edit", &id.to_string(), "--url", "b.example.com"]);
        match cli.command {
            Commands::Link(LinkCommand::Edit { link_id, url, name, .. }) => {
                assert_eq!(link_id, id);
                assert_eq!(url.as_deref(), Some("b.example.com"));
                assert_eq!(name, None);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::parse_from(["link-sentinel", "company", "rm", &id.to_string()]);
        assert!(matches!(cli.command, Commands::Company(CompanyCommand::Remove { company_id }) if company_id == id));

        let cli = Cli::parse_from(["link-sentinel", "list", "--company", &id.to_string()]);
        assert!(matches!(cli.command, Commands::List { company: Some(c), .. } if c == id));
    }
}
