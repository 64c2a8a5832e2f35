//! 命令校验器：在处理器之前以字段级错误拒绝不合法的输入
//!
use async_trait::async_trait;
use buildco_application::validation::{CommandValidator, ValidationReport};
use buildco_domain::job_application::JobApplication;
use buildco_domain::quote::MIN_DESCRIPTION_LEN;
use buildco_domain::value_object::{EmailAddress, PhoneNumber, ServiceType};

use crate::commands::{ResumeUpload, SubmitJobApplication, SubmitQuoteRequest};

fn check_contact(report: &mut ValidationReport, name_field: &str, name: &str, email: &str, phone: &str) {
    report.check(!name.trim().is_empty(), name_field, "name is required");
    report.check(
        EmailAddress::parse(email).is_ok(),
        "email",
        "a valid email address is required",
    );
    report.check(
        PhoneNumber::parse(phone).is_ok(),
        "phone",
        format!(
            "phone number must have {}-{} digits",
            PhoneNumber::MIN_DIGITS,
            PhoneNumber::MAX_DIGITS
        ),
    );
}

#[derive(Debug, Default)]
pub struct SubmitQuoteRequestValidator;

#[async_trait]
impl CommandValidator<SubmitQuoteRequest> for SubmitQuoteRequestValidator {
    async fn validate(&self, cmd: &SubmitQuoteRequest) -> ValidationReport {
        let mut report = ValidationReport::new();
        check_contact(&mut report, "customer_name", &cmd.customer_name, &cmd.email, &cmd.phone);

        report.check(
            cmd.service_type.parse::<ServiceType>().is_ok(),
            "service_type",
            format!(
                "service type must be one of: {}",
                ServiceType::ALL.map(|s| s.as_str()).join(", ")
            ),
        );
        report.check(
            cmd.description.trim().chars().count() >= MIN_DESCRIPTION_LEN,
            "description",
            format!("description must be at least {MIN_DESCRIPTION_LEN} characters"),
        );

        report
    }
}

#[derive(Debug, Default)]
pub struct SubmitJobApplicationValidator;

#[async_trait]
impl CommandValidator<SubmitJobApplication> for SubmitJobApplicationValidator {
    async fn validate(&self, cmd: &SubmitJobApplication) -> ValidationReport {
        let mut report = ValidationReport::new();
        check_contact(&mut report, "applicant_name", &cmd.applicant_name, &cmd.email, &cmd.phone);

        report.check(!cmd.position.trim().is_empty(), "position", "position is required");
        report.check(
            cmd.experience_years <= JobApplication::MAX_EXPERIENCE_YEARS,
            "experience_years",
            format!(
                "experience must be at most {} years",
                JobApplication::MAX_EXPERIENCE_YEARS
            ),
        );

        if let Some(resume) = &cmd.resume {
            report.check(!resume.bytes.is_empty(), "resume", "resume file is empty");
            report.check(
                resume.bytes.len() <= ResumeUpload::MAX_BYTES,
                "resume",
                "resume must be at most 5 MiB",
            );
            report.check(
                ResumeUpload::ACCEPTED_TYPES.contains(&resume.content_type.as_str()),
                "resume",
                "resume must be a PDF or Word document",
            );
        }

        report
    }
}
