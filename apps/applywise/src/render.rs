//! Plain-text rendering for the terminal.

use std::io::{self, Write};

use client_core::{
    progress::{Stage, StageStatus},
    results::{AnalysisView, ContentTab, HistoryRow},
    ProgressListener,
};
use shared::protocol::{AnalysisSummary, ResumeSummary};

fn marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "[ ]",
        StageStatus::InProgress => "[>]",
        StageStatus::Completed => "[x]",
    }
}

/// Prints a stage line whenever its status changes.
pub struct TerminalProgress<W: Write + Send> {
    out: W,
    last: Vec<StageStatus>,
}

impl<W: Write + Send> TerminalProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, stages: &[Stage]) -> io::Result<()> {
        let all_pending = stages
            .iter()
            .all(|stage| stage.status == StageStatus::Pending);
        if all_pending && !self.last.is_empty() {
            writeln!(self.out, "Progress reset.")?;
        } else {
            for (index, stage) in stages.iter().enumerate() {
                if self.last.get(index) == Some(&stage.status) {
                    continue;
                }
                if stage.status == StageStatus::Pending {
                    continue;
                }
                writeln!(self.out, "{} {}", marker(stage.status), stage.label)?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write + Send> ProgressListener for TerminalProgress<W> {
    fn on_stages(&mut self, stages: &[Stage]) {
        if let Err(err) = self.write_frame(stages) {
            tracing::debug!("progress output failed: {err}");
        }
        self.last = stages.iter().map(|stage| stage.status).collect();
    }
}

pub fn resumes(out: &mut impl Write, resumes: &[ResumeSummary]) -> io::Result<()> {
    if resumes.is_empty() {
        return writeln!(out, "No resumes uploaded yet.");
    }
    for resume in resumes {
        let created = resume
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        writeln!(out, "{}  {}  {}", resume.id, created, resume.filename)?;
    }
    Ok(())
}

pub fn history(out: &mut impl Write, analyses: &[AnalysisSummary]) -> io::Result<()> {
    if analyses.is_empty() {
        return writeln!(out, "No analyses yet.");
    }
    for row in analyses.iter().map(HistoryRow::from) {
        writeln!(
            out,
            "{}  {}  {:>4} ({})",
            row.id,
            row.created,
            row.score.display(),
            row.score.band.label()
        )?;
    }
    Ok(())
}

/// Score, gaps, then either one tab or all of them.
pub fn analysis(
    out: &mut impl Write,
    view: &AnalysisView,
    tab: Option<ContentTab>,
) -> io::Result<()> {
    writeln!(
        out,
        "Match score: {} ({})",
        view.score.display(),
        view.score.band.label()
    )?;
    writeln!(out)?;
    writeln!(out, "Skill Gaps")?;
    match view.gaps_placeholder() {
        Some(placeholder) => writeln!(out, "  {placeholder}")?,
        None => {
            for gap in &view.gaps {
                writeln!(out, "  - {} [{}]", gap.skill, gap.importance.label())?;
                writeln!(out, "    {}", gap.recommendation)?;
            }
        }
    }

    let tabs: Vec<ContentTab> = match tab {
        Some(tab) => vec![tab],
        None => ContentTab::ALL.to_vec(),
    };
    for tab in tabs {
        writeln!(out)?;
        writeln!(out, "== {} ==", tab.title())?;
        for line in view.tab_lines(tab) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{progress::StagePlan, results::NO_GAPS_TEXT};
    use shared::{domain::ResumeId, protocol::Analysis};

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn progress_prints_only_changes() {
        let plan = StagePlan::analysis();
        let mut progress = TerminalProgress::new(Vec::new());
        let started = plan.start();
        progress.on_stages(&started);
        progress.on_stages(&started);
        progress.on_stages(&client_core::progress::advance(&started));

        let out = text(progress.into_inner());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3, "{out}");
        assert!(lines[0].starts_with("[>] "));
        assert!(lines[1].starts_with("[x] "));
        assert!(lines[2].starts_with("[>] "));
    }

    #[test]
    fn progress_announces_reset() {
        let plan = StagePlan::analysis();
        let mut progress = TerminalProgress::new(Vec::new());
        progress.on_stages(&plan.start());
        progress.on_stages(&plan.initial());
        assert!(text(progress.into_inner()).ends_with("Progress reset.\n"));
    }

    #[test]
    fn resume_list_shows_placeholder_dates() {
        let mut out = Vec::new();
        resumes(
            &mut out,
            &[ResumeSummary {
                id: ResumeId::new("r-1"),
                filename: "cv.pdf".into(),
                created_at: None,
            }],
        )
        .expect("render");
        assert_eq!(text(out), "r-1  unknown date  cv.pdf\n");
    }

    #[test]
    fn empty_analysis_renders_every_placeholder() {
        let analysis: Analysis = serde_json::from_str(r#"{"id":"a-1"}"#).expect("analysis");
        let mut out = Vec::new();
        super::analysis(&mut out, &AnalysisView::from(&analysis), None).expect("render");
        let out = text(out);
        assert!(out.starts_with("Match score: 0%"));
        assert!(out.contains(NO_GAPS_TEXT));
        for tab in ContentTab::ALL {
            assert!(out.contains(tab.title()));
        }
    }

    #[test]
    fn single_tab_omits_the_others() {
        let analysis: Analysis =
            serde_json::from_str(r#"{"id":"a-1","linkedin_dm":"Hello!"}"#).expect("analysis");
        let mut out = Vec::new();
        super::analysis(
            &mut out,
            &AnalysisView::from(&analysis),
            Some(ContentTab::LinkedIn),
        )
        .expect("render");
        let out = text(out);
        assert!(out.contains("Hello!"));
        assert!(!out.contains(ContentTab::Email.title()));
    }
}
