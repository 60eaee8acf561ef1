use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use client_core::results::ContentTab;

#[derive(Parser, Debug)]
#[command(name = "applywise", about = "Resume and job-match analysis from the terminal")]
pub struct Cli {
    /// TOML settings file; defaults to ./applywise.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Base URL of the analysis service, e.g. http://127.0.0.1:8000/api/v1
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Bearer token for the current session.
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// -v for info, -vv for debug logging.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage uploaded resumes.
    #[command(subcommand)]
    Resumes(ResumeCommand),
    /// Match a resume against a job description.
    Analyze(AnalyzeArgs),
    /// Browse past analyses.
    #[command(subcommand)]
    Analyses(AnalysisCommand),
}

#[derive(Subcommand, Debug)]
pub enum ResumeCommand {
    List,
    /// Upload a .pdf or .docx resume.
    Upload { path: PathBuf },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub resume: String,
    /// Read the job description from a file.
    #[arg(long, conflicts_with = "job_text")]
    pub job_file: Option<PathBuf>,
    /// Job description text; stdin is read when neither this nor --job-file is given.
    #[arg(long)]
    pub job_text: Option<String>,
    #[arg(long)]
    pub job_url: Option<String>,
    /// Only print this tab of the result.
    #[arg(long, value_enum)]
    pub tab: Option<TabArg>,
}

#[derive(Subcommand, Debug)]
pub enum AnalysisCommand {
    List,
    Show {
        id: String,
        #[arg(long, value_enum)]
        tab: Option<TabArg>,
        /// Print the raw analysis record.
        #[arg(long)]
        json: bool,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    Email,
    Linkedin,
    Strategy,
}

impl From<TabArg> for ContentTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Email => ContentTab::Email,
            TabArg::Linkedin => ContentTab::LinkedIn,
            TabArg::Strategy => ContentTab::Strategy,
        }
    }
}
