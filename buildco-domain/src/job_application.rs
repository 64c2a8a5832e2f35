//! 求职申请（JobApplication）
//!
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::value_object::{EmailAddress, PhoneNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ApplicationId {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Received,
    UnderReview,
    Interview,
    Hired,
    Declined,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::UnderReview => "under_review",
            Self::Interview => "interview",
            Self::Hired => "hired",
            Self::Declined => "declined",
        }
    }
}

/// 求职申请实体；简历文件由 `FileStorage` 保存，这里仅记录存储键
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    id: ApplicationId,
    applicant_name: String,
    email: EmailAddress,
    phone: PhoneNumber,
    position: String,
    experience_years: u8,
    cover_letter: Option<String>,
    resume_key: Option<String>,
    status: ApplicationStatus,
    submitted_at: DateTime<Utc>,
}

impl Entity for JobApplication {
    const TYPE: &'static str = "job_application";
    type Id = ApplicationId;

    fn id(&self) -> &ApplicationId {
        &self.id
    }
}

impl JobApplication {
    pub const MAX_EXPERIENCE_YEARS: u8 = 60;

    pub fn submit(
        applicant_name: impl Into<String>,
        email: EmailAddress,
        phone: PhoneNumber,
        position: impl Into<String>,
        experience_years: u8,
        cover_letter: Option<String>,
    ) -> DomainResult<Self> {
        let applicant_name = applicant_name.into().trim().to_string();
        let position = position.into().trim().to_string();

        if applicant_name.is_empty() {
            return Err(DomainError::invalid_value("applicant_name", "must not be empty"));
        }
        if position.is_empty() {
            return Err(DomainError::invalid_value("position", "must not be empty"));
        }
        if experience_years > Self::MAX_EXPERIENCE_YEARS {
            return Err(DomainError::invalid_value(
                "experience_years",
                format!("must be at most {}", Self::MAX_EXPERIENCE_YEARS),
            ));
        }

        Ok(Self {
            id: ApplicationId::generate(),
            applicant_name,
            email,
            phone,
            position,
            experience_years,
            cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
            resume_key: None,
            status: ApplicationStatus::default(),
            submitted_at: Utc::now(),
        })
    }

    pub fn attach_resume(&mut self, key: impl Into<String>) {
        self.resume_key = Some(key.into());
    }

    pub fn applicant_name(&self) -> &str {
        &self.applicant_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn experience_years(&self) -> u8 {
        self.experience_years
    }

    pub fn cover_letter(&self) -> Option<&str> {
        self.cover_letter.as_deref()
    }

    pub fn resume_key(&self) -> Option<&str> {
        self.resume_key.as_deref()
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn submitted_at(&self) -> &DateTime<Utc> {
        &self.submitted_at
    }
}
