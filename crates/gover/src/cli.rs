use clap::{Args, Parser, Subcommand};
use gover_core::ActivationScope;
use gover_shell::ShellType;

#[derive(Debug, Parser)]
#[command(
    name = "gover",
    version,
    about = "Switch between installed Go toolchains",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log to stderr as well as the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the active version
    Current,
    /// Activate an installed version for this shell, the project or the system
    Use(UseArgs),
    /// Install shell integration into the startup file
    Init(InitArgs),
    /// Remove shell integration from the startup file
    Deinit(DeinitArgs),
    /// List installed versions
    #[command(alias = "ls")]
    List,
    /// List versions published on go.dev
    #[command(name = "list-remote", alias = "ls-remote")]
    ListRemote(ListRemoteArgs),
    /// Remove an installed version
    #[command(alias = "rm")]
    Uninstall(UninstallArgs),
}

#[derive(Debug, Args)]
pub struct UseArgs {
    /// Installed version, or `default` for the system version
    #[arg(id = "use_version", value_name = "VERSION")]
    pub version: String,

    /// Pin the version in the project marker of the working directory
    #[arg(long, conflicts_with = "system")]
    pub project: bool,

    /// Point the system-wide link at the version and make it the default
    #[arg(long)]
    pub system: bool,
}

impl UseArgs {
    #[must_use]
    pub fn scope(&self) -> ActivationScope {
        if self.system {
            ActivationScope::System
        } else if self.project {
            ActivationScope::Project
        } else {
            ActivationScope::Session
        }
    }
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Shell to configure; detected when omitted
    #[arg(long, value_parser = parse_shell)]
    pub shell: Option<ShellType>,

    /// Replace an existing gover block
    #[arg(long, conflicts_with = "check")]
    pub force: bool,

    /// Only report whether the integration is installed
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Args)]
pub struct DeinitArgs {
    /// Shell to clean up; detected when omitted
    #[arg(long, value_parser = parse_shell)]
    pub shell: Option<ShellType>,
}

#[derive(Debug, Args)]
pub struct ListRemoteArgs {
    /// Include betas and release candidates
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct UninstallArgs {
    #[arg(id = "uninstall_version", value_name = "VERSION")]
    pub version: String,
}

fn parse_shell(value: &str) -> Result<ShellType, String> {
    ShellType::from_name(value).ok_or_else(|| {
        let known: Vec<&str> = ShellType::ALL.iter().map(|shell| shell.name()).collect();
        format!("unknown shell `{value}` (expected one of: {})", known.join(", "))
    })
}
