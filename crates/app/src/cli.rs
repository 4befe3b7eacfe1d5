//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use openheaders_domain::{DarkModePreference, HeaderOperation, TabInfo};

#[derive(Parser)]
#[command(name = "openheaders")]
#[command(about = "Manage HTTP header profiles and preview the rules they produce")]
pub struct Cli {
    /// Directory holding the persisted state (overrides OPENHEADERS_STATE_DIR)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List profiles
    Profiles,

    /// Add a profile
    AddProfile {
        /// Profile name (defaults to "Profile N")
        name: Option<String>,
    },

    /// Remove a profile
    RemoveProfile {
        /// Profile id or name
        profile: String,
    },

    /// Make a profile the active one
    Activate {
        /// Profile id or name
        profile: String,
    },

    /// Add a header rule to a profile
    AddHeader {
        /// Profile id or name (defaults to the active profile)
        #[arg(short, long)]
        profile: Option<String>,

        /// Header name
        #[arg(short, long)]
        name: String,

        /// Header value
        #[arg(short, long, default_value = "")]
        value: String,

        /// Operation to apply
        #[arg(short, long, value_enum, default_value_t = OperationArg::Set)]
        operation: OperationArg,

        /// Modify the response instead of the request
        #[arg(long)]
        response: bool,
    },

    /// Add a URL filter to a profile
    AddFilter {
        /// Profile id or name (defaults to the active profile)
        #[arg(short, long)]
        profile: Option<String>,

        /// Match type (host_equals, host_ends_with, url_starts_with,
        /// path_starts_with, url_contains, localhost_port, dnr_url_filter, regex)
        #[arg(short, long, default_value = "dnr_url_filter")]
        match_type: String,

        /// Pattern to match
        pattern: String,

        /// Exclude matching URLs instead of including them
        #[arg(long)]
        exclude: bool,
    },

    /// Print the declarative rule the active profile produces for some tabs
    Rules {
        /// Open tab as ID=URL (repeatable)
        #[arg(short, long = "tab", value_parser = parse_tab)]
        tabs: Vec<TabInfo>,

        /// Focused tab id
        #[arg(short, long)]
        active: Option<i32>,
    },

    /// Explain whether the active profile applies to a URL
    Check {
        /// URL to evaluate
        url: String,
    },

    /// Export profiles to a JSON file
    Export {
        /// Output file
        output: PathBuf,

        /// Profile ids or names to export (all when omitted)
        #[arg(short, long = "profile")]
        profiles: Vec<String>,
    },

    /// Import profiles from an export file or a foreign profile list
    Import {
        /// Input file
        input: PathBuf,
    },

    /// Set the theme preference
    Theme {
        /// Theme
        #[arg(value_enum)]
        theme: ThemeArg,
    },

    /// Set the language preference ("auto" follows the browser)
    Language {
        /// Locale tag or "auto"
        language: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OperationArg {
    Set,
    Remove,
    Append,
}

impl From<OperationArg> for HeaderOperation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Set => Self::Set,
            OperationArg::Remove => Self::Remove,
            OperationArg::Append => Self::Append,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for DarkModePreference {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
            ThemeArg::System => Self::System,
        }
    }
}

fn parse_tab(raw: &str) -> Result<TabInfo, String> {
    let (id, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=URL, got '{raw}'"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|e| format!("invalid tab id '{id}': {e}"))?;
    Ok(TabInfo::new(id, url.trim()))
}
