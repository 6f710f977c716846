use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const FORKSWAP_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const FORKSWAP_BEFORE_HELP: &str = concat!(
    "forkswap ",
    env!("CARGO_PKG_VERSION"),
    " – switch between a local package fork and the published release\n\n",
    "\x1b[1;36mCommands\x1b[0m\n",
    "  local            Uninstall the package and install the local fork in editable mode.\n",
    "  official         Point pyproject manifests at the published package and install it.\n",
    "  status           Report which variant the environment imports (exit 1 if absent).\n",
);

/// Printed after a usage error so the operator sees the verbs.
pub const USAGE_GUIDANCE: &str = concat!(
    "Usage: forkswap <local|official|status>\n\n",
    "  local      switch to the local editable fork\n",
    "  official   switch to the officially published package\n",
    "  status     show which variant is active\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "forkswap",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = FORKSWAP_BEFORE_HELP,
    help_template = FORKSWAP_HELP_TEMPLATE
)]
pub struct ForkswapCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_name = "PATH",
        help = "Read [tool.forkswap] from this file instead of discovering pyproject.toml",
        global = true
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Replace any installed copy with an editable install of the local fork.",
        visible_alias = "switch-to-local",
        override_usage = "forkswap local [--dry-run]"
    )]
    Local(SwitchArgs),
    #[command(
        about = "Rewrite manifests to the published package, then install it.",
        visible_alias = "switch-to-official",
        override_usage = "forkswap official [--dry-run]"
    )]
    Official(SwitchArgs),
    #[command(about = "Report whether the local fork or the official package is active (read-only).")]
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SwitchArgs {
    #[arg(
        long,
        help = "Show the manifest edits and installer commands without running them"
    )]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {}
