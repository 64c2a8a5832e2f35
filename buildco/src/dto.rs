//! 查询输出的 DTO
//!
use std::collections::BTreeMap;

use buildco_domain::entity::Entity;
use buildco_domain::job_application::JobApplication;
use buildco_domain::quote::Quote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDto {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Quote> for QuoteDto {
    fn from(q: &Quote) -> Self {
        Self {
            id: q.id().to_string(),
            customer_name: q.customer_name().to_string(),
            email: q.email().to_string(),
            phone: q.phone().to_string(),
            service_type: q.service_type().to_string(),
            description: q.description().to_string(),
            status: q.status().to_string(),
            priority: q.priority().to_string(),
            admin_notes: q.admin_notes().map(str::to_string),
            created_at: *q.created_at(),
            updated_at: *q.updated_at(),
        }
    }
}

/// 分页后的报价列表；`total` 为过滤后、分页前的条数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteListDto {
    pub items: Vec<QuoteDto>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplicationDto {
    pub id: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub experience_years: u8,
    pub cover_letter: Option<String>,
    pub resume_key: Option<String>,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<&JobApplication> for JobApplicationDto {
    fn from(a: &JobApplication) -> Self {
        Self {
            id: a.id().to_string(),
            applicant_name: a.applicant_name().to_string(),
            email: a.email().to_string(),
            phone: a.phone().to_string(),
            position: a.position().to_string(),
            experience_years: a.experience_years(),
            cover_letter: a.cover_letter().map(str::to_string),
            resume_key: a.resume_key().map(str::to_string),
            status: a.status().as_str().to_string(),
            submitted_at: *a.submitted_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplicationListDto {
    pub items: Vec<JobApplicationDto>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

/// 后台首页统计（实时计算，不缓存）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatsDto {
    pub total_quotes: usize,
    pub quotes_by_status: BTreeMap<String, usize>,
    pub quotes_by_service: BTreeMap<String, usize>,
    /// 未关闭且为紧急优先级的报价
    pub urgent_open_quotes: usize,
    pub total_job_applications: usize,
    pub generated_at: Option<DateTime<Utc>>,
}
