use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use buildco_application::command_handler::CommandHandler;
use buildco_application::error::AppResult;
use buildco_domain::entity::Entity;
use buildco_domain::job_application::{ApplicationId, JobApplication};
use buildco_domain::ports::{EmailMessage, EmailSender, FileStorage, Repository};
use buildco_domain::value_object::{EmailAddress, PhoneNumber};
use buildco_macros::command;

/// 随申请上传的简历
#[derive(Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    /// 上限 5 MiB
    pub const MAX_BYTES: usize = 5 * 1024 * 1024;

    pub const ACCEPTED_TYPES: [&'static str; 3] = [
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ];
}

impl fmt::Debug for ResumeUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[command(
    name = "SubmitJobApplicationCommand",
    output = ApplicationId,
    invalidates = ["GetJobApplicationListQuery"]
)]
pub struct SubmitJobApplication {
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub experience_years: u8,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeUpload>,
}

pub struct SubmitJobApplicationHandler {
    applications: Arc<dyn Repository<JobApplication>>,
    files: Arc<dyn FileStorage>,
    email: Arc<dyn EmailSender>,
}

impl SubmitJobApplicationHandler {
    pub fn new(
        applications: Arc<dyn Repository<JobApplication>>,
        files: Arc<dyn FileStorage>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            applications,
            files,
            email,
        }
    }
}

#[async_trait]
impl CommandHandler<SubmitJobApplication> for SubmitJobApplicationHandler {
    async fn handle(&self, cmd: &SubmitJobApplication) -> AppResult<ApplicationId> {
        let mut application = JobApplication::submit(
            &cmd.applicant_name,
            EmailAddress::parse(&cmd.email)?,
            PhoneNumber::parse(&cmd.phone)?,
            &cmd.position,
            cmd.experience_years,
            cmd.cover_letter.clone(),
        )?;

        if let Some(resume) = &cmd.resume {
            let stored = self
                .files
                .upload(&resume.file_name, &resume.content_type, resume.bytes.clone())
                .await?;
            tracing::debug!(
                application.id = %application.id(),
                file.key = %stored.key,
                file.size = stored.size,
                "resume stored"
            );
            application.attach_resume(stored.key);
        }

        self.applications.save(&application).await?;

        let confirmation = EmailMessage::builder()
            .to(application.email().clone())
            .subject(format!("Application received: {}", application.position()))
            .body(format!(
                "Hi {}, thanks for applying. We will be in touch soon.",
                application.applicant_name()
            ))
            .build();
        if let Err(e) = self.email.send(confirmation).await {
            tracing::warn!(application.id = %application.id(), error = %e, "confirmation email not sent");
        }

        Ok(*application.id())
    }
}
