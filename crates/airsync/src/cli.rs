//! Clap derive structures for the `airsync` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of crate-internal imports so `build.rs` can include it for man
//! page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// airsync -- vendor integrations and guest SSID provisioning
#[derive(Debug, Parser)]
#[command(
    name = "airsync",
    version,
    about = "Provision wireless networks and guest WiFi across vendor controllers",
    long_about = "Connect vendor controller accounts, import their wireless networks,\n\
        map SSID slots to roles, and push guest WiFi changes to every\n\
        network at once.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Workspace UUID (falls back to `default_workspace` in the config)
    #[arg(long, short = 'w', env = "AIRSYNC_WORKSPACE", global = true)]
    pub workspace: Option<String>,

    /// Config file path
    #[arg(long, env = "AIRSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AIRSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Per vendor call timeout in seconds (overrides the config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List supported vendors and whether they can be selected
    Vendors,

    /// Manage credentialed vendor integrations
    #[command(alias = "int")]
    Integrations(IntegrationsArgs),

    /// Browse organizations, networks, tags and SSIDs on the vendor side
    #[command(alias = "disc")]
    Discover(DiscoverArgs),

    /// Import vendor networks into the workspace
    Provision(ProvisionArgs),

    /// Inspect managed networks
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Enable the guest SSID (open, click-through splash) on networks
    Deploy(DeployArgs),

    /// Rename the guest SSID on every mapped network
    Rename(RenameArgs),

    /// Show guest WiFi rollout counts for the workspace
    GuestStatus,

    /// Manage CLI configuration and the vault key
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Integrations ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IntegrationsArgs {
    #[command(subcommand)]
    pub command: IntegrationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IntegrationsCommand {
    /// Validate credentials against the vendor and store them encrypted
    Create(CreateIntegrationArgs),

    /// List integrations in the workspace
    #[command(alias = "ls")]
    List,

    /// Delete an integration and every network imported through it
    #[command(alias = "rm")]
    Delete {
        /// Integration UUID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateIntegrationArgs {
    /// Vendor name (see `airsync vendors`)
    #[arg(long, default_value = "meraki")]
    pub vendor: String,

    /// Display name for the integration
    #[arg(long)]
    pub name: String,

    /// Vendor API key
    #[arg(long, env = "AIRSYNC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OAuth client id
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long)]
    pub client_secret: Option<String>,

    /// OAuth access token (ignored when an API key is given)
    #[arg(long)]
    pub access_token: Option<String>,

    /// OAuth refresh token
    #[arg(long)]
    pub refresh_token: Option<String>,

    /// Access token expiry (RFC 3339)
    #[arg(long, requires = "access_token")]
    pub expires_at: Option<String>,
}

// ── Discovery ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    #[command(subcommand)]
    pub command: DiscoverCommand,
}

/// Integration to browse through.
#[derive(Debug, Args)]
pub struct IntegrationRef {
    /// Integration UUID
    #[arg(long, short = 'i')]
    pub integration: String,
}

#[derive(Debug, Subcommand)]
pub enum DiscoverCommand {
    /// Organizations visible to the integration's credentials
    Orgs {
        #[command(flatten)]
        target: IntegrationRef,
    },

    /// Wireless networks in an organization
    Networks {
        #[command(flatten)]
        target: IntegrationRef,
        /// Organization id
        #[arg(long)]
        org: String,
    },

    /// Distinct device tags in an organization
    Tags {
        #[command(flatten)]
        target: IntegrationRef,
        /// Organization id
        #[arg(long)]
        org: String,
    },

    /// SSID slots on a vendor network
    Ssids {
        #[command(flatten)]
        target: IntegrationRef,
        /// Vendor network id
        #[arg(long)]
        network: String,
    },

    /// Device count on a vendor network
    Devices {
        #[command(flatten)]
        target: IntegrationRef,
        /// Vendor network id
        #[arg(long)]
        network: String,
    },
}

// ── Provisioning ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub target: IntegrationRef,

    /// Organization id
    #[arg(long)]
    pub org: String,

    /// Vendor network id (repeatable; SSID numbers are read from the first)
    #[arg(long = "network", short = 'n', required = true)]
    pub networks: Vec<String>,

    /// Device tag to record on the networks (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// SSID number to use for guest WiFi
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=14))]
    pub guest_ssid: Option<u8>,

    /// SSID number to use for IoT devices
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=14))]
    pub iot_ssid: Option<u8>,

    /// SSID number to use for employees
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=14))]
    pub employees_ssid: Option<u8>,

    /// Warn when the selected networks don't share the first one's SSID layout
    #[arg(long)]
    pub check_consistency: bool,
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List managed networks
    #[command(alias = "ls")]
    List {
        /// Only networks imported through this integration
        #[arg(long, short = 'i')]
        integration: Option<String>,
    },

    /// Show one managed network with its SSID mapping
    Get {
        /// Network UUID
        id: String,
    },
}

// ── Reconciliation ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Network UUID (repeatable)
    #[arg(long = "network", short = 'n', required_unless_present = "all")]
    pub networks: Vec<String>,

    /// Deploy to every managed network in the workspace
    #[arg(long, conflicts_with = "networks")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// New guest SSID name
    pub name: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file (with `--workspace` as the default workspace)
    Init {
        /// Generate a vault key and store it in the OS keyring
        #[arg(long)]
        generate_key: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Generate a new base64 vault key
    GenKey {
        /// Store the key in the OS keyring instead of printing it
        #[arg(long)]
        store: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
