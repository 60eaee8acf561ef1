//! One handler per subcommand. Every failure leaves as a [`UiError`].

use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::Context;
use client_core::{
    progress::StagePlan,
    results::{AnalysisView, ContentTab},
    AnalysisSession, ApplyClient, ProgressSimulator, SimulatorConfig,
};
use shared::{
    domain::{AnalysisId, ResumeId},
    protocol::ResumeSummary,
};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::info;

use crate::{
    cli::{AnalysisCommand, AnalyzeArgs, Command, ResumeCommand},
    controller::events::{UiError, UiErrorContext},
    render::{self, TerminalProgress},
};

pub struct App {
    pub client: ApplyClient,
    pub simulator: SimulatorConfig,
}

impl App {
    pub async fn dispatch(&self, command: Command) -> Result<(), UiError> {
        match command {
            Command::Resumes(ResumeCommand::List) => self
                .list_resumes()
                .await
                .map_err(|err| UiError::from_error(UiErrorContext::Listing, &err)),
            Command::Resumes(ResumeCommand::Upload { path }) => self
                .upload_resume(&path)
                .await
                .map_err(|err| UiError::from_error(UiErrorContext::Upload, &err)),
            Command::Resumes(ResumeCommand::Delete { id, yes }) => self
                .delete_resume(ResumeId::new(id), yes)
                .await
                .map_err(|err| UiError::from_error(UiErrorContext::Delete, &err)),
            Command::Analyze(args) => self.analyze(args).await,
            Command::Analyses(AnalysisCommand::List) => self
                .list_analyses()
                .await
                .map_err(|err| UiError::from_error(UiErrorContext::Listing, &err)),
            Command::Analyses(AnalysisCommand::Show { id, tab, json }) => self
                .show_analysis(&AnalysisId::new(id), tab.map(ContentTab::from), json)
                .await
                .map_err(|err| UiError::from_error(UiErrorContext::Detail, &err)),
            Command::Analyses(AnalysisCommand::Delete { id, yes }) => self
                .delete_analysis(AnalysisId::new(id), yes)
                .await
                .map_err(|err| UiError::from_error(UiErrorContext::Delete, &err)),
        }
    }

    async fn list_resumes(&self) -> anyhow::Result<()> {
        let resumes = self.client.list_resumes().await?;
        render::resumes(&mut io::stdout().lock(), &resumes)?;
        Ok(())
    }

    async fn upload_resume(&self, path: &Path) -> anyhow::Result<()> {
        let resume = self.client.upload_resume(path).await?;
        println!("Uploaded {} as {}", resume.filename, resume.id);
        Ok(())
    }

    async fn delete_resume(&self, id: ResumeId, yes: bool) -> anyhow::Result<()> {
        if !yes && !confirm_on_terminal().await? {
            println!("Kept resume {id}.");
            return Ok(());
        }
        self.client.delete_resume(&id).await?;
        println!("Deleted resume {id}.");
        Ok(())
    }

    async fn analyze(&self, args: AnalyzeArgs) -> Result<(), UiError> {
        let resume: ResumeSummary = self
            .client
            .get_resume(&ResumeId::new(args.resume.clone()))
            .await
            .with_context(|| format!("loading resume {}", args.resume))
            .map_err(|err| UiError::from_error(UiErrorContext::Analysis, &err))?
            .into();
        let description = job_description(&args)
            .await
            .map_err(|err| UiError::from_error(UiErrorContext::Analysis, &err))?;

        let simulator = ProgressSimulator::new(StagePlan::analysis(), self.simulator);
        let mut session = AnalysisSession::new(resume, simulator);
        session.set_job_description(description);
        session.set_job_url(args.job_url);

        eprintln!("Analyzing {} ...", session.resume().filename);
        let mut progress = TerminalProgress::new(io::stderr());
        let analysis_id = session
            .submit(&self.client, &mut progress)
            .await
            .map_err(|err| {
                UiError::from_error(UiErrorContext::Analysis, &anyhow::Error::new(err))
            })?;
        info!(%analysis_id, "showing analysis result");

        self.show_analysis(&analysis_id, args.tab.map(ContentTab::from), false)
            .await
            .map_err(|err| UiError::from_error(UiErrorContext::Detail, &err))
    }

    async fn list_analyses(&self) -> anyhow::Result<()> {
        let analyses = self.client.list_analyses().await?;
        render::history(&mut io::stdout().lock(), &analyses)?;
        Ok(())
    }

    async fn show_analysis(
        &self,
        id: &AnalysisId,
        tab: Option<ContentTab>,
        json: bool,
    ) -> anyhow::Result<()> {
        let analysis = self.client.get_analysis(id).await?;
        let mut out = io::stdout().lock();
        if json {
            serde_json::to_writer_pretty(&mut out, &analysis)?;
            writeln!(out)?;
        } else {
            render::analysis(&mut out, &AnalysisView::from(&analysis), tab)?;
        }
        Ok(())
    }

    async fn delete_analysis(&self, id: AnalysisId, yes: bool) -> anyhow::Result<()> {
        if !yes && !confirm_on_terminal().await? {
            println!("Kept analysis {id}.");
            return Ok(());
        }
        self.client.delete_analysis(&id).await?;
        println!("Deleted analysis {id}.");
        Ok(())
    }
}

async fn job_description(args: &AnalyzeArgs) -> anyhow::Result<String> {
    if let Some(text) = &args.job_text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.job_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read job description '{}'", path.display()));
    }
    eprintln!("Paste the job description, then press Ctrl-D:");
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("failed to read job description from stdin")?;
    Ok(text)
}

async fn confirm_on_terminal() -> io::Result<bool> {
    let mut input = BufReader::new(tokio::io::stdin());
    confirm(&mut input, &mut tokio::io::stderr()).await
}

/// Anything other than `y`/`yes` keeps the record.
async fn confirm(
    input: &mut (impl AsyncBufRead + Unpin),
    prompt: &mut (impl AsyncWrite + Unpin),
) -> io::Result<bool> {
    prompt.write_all(b"Are you sure? [y/N] ").await?;
    prompt.flush().await?;
    let mut answer = String::new();
    input.read_line(&mut answer).await?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(job_text: Option<&str>, job_file: Option<&Path>) -> AnalyzeArgs {
        AnalyzeArgs {
            resume: "r-1".into(),
            job_file: job_file.map(Path::to_path_buf),
            job_text: job_text.map(str::to_string),
            job_url: None,
            tab: None,
        }
    }

    #[tokio::test]
    async fn confirmation_defaults_to_no() {
        let mut prompt = Vec::new();
        assert!(!confirm(&mut &b"\n"[..], &mut prompt).await.expect("confirm"));
        assert!(!confirm(&mut &b"nope\n"[..], &mut prompt).await.expect("confirm"));
        assert!(!confirm(&mut &b""[..], &mut prompt).await.expect("confirm"));
        assert!(confirm(&mut &b" Yes \n"[..], &mut prompt).await.expect("confirm"));
        assert!(String::from_utf8(prompt)
            .expect("utf8")
            .starts_with("Are you sure? [y/N] "));
    }

    #[tokio::test]
    async fn inline_text_wins() {
        let text = job_description(&args(Some("Rust engineer"), None))
            .await
            .expect("text");
        assert_eq!(text, "Rust engineer");
    }

    #[tokio::test]
    async fn missing_job_file_is_reported() {
        let missing = std::env::temp_dir().join("applywise_no_such_job_description.txt");
        let err = job_description(&args(None, Some(&missing)))
            .await
            .expect_err("missing file");
        assert!(err.to_string().contains("failed to read job description"));
    }
}
