use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AnalysisId, ResumeId},
    error::ApiError,
    protocol::{
        Analysis, AnalysisCreated, AnalysisRequest, AnalysisSummary, Resume, ResumeSummary,
    },
};
use tracing::{debug, info, warn};
use url::Url;

pub mod credentials;
pub mod error;
pub mod progress;
pub mod results;
pub mod session;
pub mod simulator;

pub use credentials::{MissingTokenSource, StaticTokenSource, TokenSource};
pub use error::{ClientError, RunError};
pub use session::{AnalysisSession, SessionError};
pub use simulator::{ProgressListener, ProgressSimulator, SimulatorConfig};

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Submits an analysis request; the seam the progress simulator runs against.
#[async_trait]
pub trait AnalysisSubmitter: Send + Sync {
    async fn submit_analysis(&self, request: &AnalysisRequest)
        -> Result<AnalysisCreated, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFileKind {
    Pdf,
    Docx,
}

impl ResumeFileKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ResumeFileKind::Pdf => PDF_MIME,
            ResumeFileKind::Docx => DOCX_MIME,
        }
    }
}

/// Only PDF and DOCX resumes are accepted, judged by file extension.
pub fn resume_file_kind(filename: &str) -> Result<ResumeFileKind, ClientError> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Ok(ResumeFileKind::Pdf)
    } else if lower.ends_with(".docx") {
        Ok(ResumeFileKind::Docx)
    } else {
        Err(ClientError::UnsupportedFile(filename.to_string()))
    }
}

#[derive(Clone)]
pub struct ApplyClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApplyClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>) -> Result<Self, ClientError> {
        Self::with_http_client(Client::new(), base_url, tokens)
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|source| ClientError::Credentials { source })?;
        match token {
            Some(token) => {
                debug!("attaching session token to request");
                Ok(request.bearer_auth(token))
            }
            None => {
                warn!("no active session token found; sending request without credentials");
                Ok(request)
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorized(request).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_body(status.as_u16(), &body);
        warn!(status = status.as_u16(), code = ?err.code, "service rejected request: {}", err.message);
        Err(err.into())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(request).await?.text().await?;
        serde_json::from_str(&body).map_err(ClientError::Decode)
    }

    pub async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, ClientError> {
        self.send_json(self.http.get(self.endpoint("/resumes/")))
            .await
    }

    pub async fn get_resume(&self, resume_id: &ResumeId) -> Result<Resume, ClientError> {
        self.send_json(self.http.get(self.endpoint(&format!("/resumes/{resume_id}"))))
            .await
    }

    /// Uploads a resume from disk after checking its extension.
    pub async fn upload_resume(&self, path: &Path) -> Result<Resume, ClientError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        resume_file_kind(&filename)?;
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.upload_resume_bytes(&filename, bytes).await
    }

    pub async fn upload_resume_bytes(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Resume, ClientError> {
        let kind = resume_file_kind(filename)?;
        let size_bytes = bytes.len();
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(kind.mime_type())?;
        let form = multipart::Form::new().part("file", part);

        let resume: Resume = self
            .send_json(self.http.post(self.endpoint("/resumes/upload")).multipart(form))
            .await?;
        info!(resume_id = %resume.id, filename, size_bytes, "uploaded resume");
        Ok(resume)
    }

    pub async fn delete_resume(&self, resume_id: &ResumeId) -> Result<(), ClientError> {
        self.send(self.http.delete(self.endpoint(&format!("/resumes/{resume_id}"))))
            .await?;
        info!(%resume_id, "deleted resume");
        Ok(())
    }

    pub async fn create_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisCreated, ClientError> {
        let created: AnalysisCreated = self
            .send_json(self.http.post(self.endpoint("/analyses/")).json(request))
            .await?;
        info!(analysis_id = %created.id, resume_id = %request.resume_id, "analysis created");
        Ok(created)
    }

    pub async fn list_analyses(&self) -> Result<Vec<AnalysisSummary>, ClientError> {
        self.send_json(self.http.get(self.endpoint("/analyses/")))
            .await
    }

    pub async fn get_analysis(&self, analysis_id: &AnalysisId) -> Result<Analysis, ClientError> {
        self.send_json(self.http.get(self.endpoint(&format!("/analyses/{analysis_id}"))))
            .await
    }

    pub async fn delete_analysis(&self, analysis_id: &AnalysisId) -> Result<(), ClientError> {
        self.send(self.http.delete(self.endpoint(&format!("/analyses/{analysis_id}"))))
            .await?;
        info!(%analysis_id, "deleted analysis");
        Ok(())
    }
}

#[async_trait]
impl AnalysisSubmitter for ApplyClient {
    async fn submit_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisCreated, ClientError> {
        self.create_analysis(request).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
