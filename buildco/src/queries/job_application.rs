use std::sync::Arc;

use async_trait::async_trait;
use buildco_application::error::AppResult;
use buildco_application::query_handler::QueryHandler;
use buildco_domain::job_application::JobApplication;
use buildco_domain::ports::Repository;
use buildco_macros::query;

use super::paginate;
use crate::dto::{JobApplicationDto, JobApplicationListDto};

/// 求职申请列表，按提交时间倒序
#[query(name = "GetJobApplicationListQuery", output = JobApplicationListDto, ttl = 120)]
pub struct GetJobApplicationList {
    /// 职位名称（精确匹配，不区分大小写）
    pub position: Option<String>,
}

pub struct GetJobApplicationListHandler {
    applications: Arc<dyn Repository<JobApplication>>,
}

impl GetJobApplicationListHandler {
    pub fn new(applications: Arc<dyn Repository<JobApplication>>) -> Self {
        Self { applications }
    }
}

#[async_trait]
impl QueryHandler<GetJobApplicationList> for GetJobApplicationListHandler {
    async fn handle(&self, q: &GetJobApplicationList) -> AppResult<JobApplicationListDto> {
        let mut applications: Vec<JobApplication> = self
            .applications
            .find_all()
            .await?
            .into_iter()
            .filter(|a| {
                q.position
                    .as_deref()
                    .is_none_or(|p| a.position().eq_ignore_ascii_case(p.trim()))
            })
            .collect();
        applications.sort_by(|a, b| b.submitted_at().cmp(a.submitted_at()));

        let total = applications.len();
        let (page_items, page, limit) = paginate(applications, &q.envelope);

        Ok(JobApplicationListDto {
            items: page_items.iter().map(JobApplicationDto::from).collect(),
            total,
            page,
            limit,
        })
    }
}
