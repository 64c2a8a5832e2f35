use std::sync::Arc;

use async_trait::async_trait;
use buildco_application::error::AppResult;
use buildco_application::query_handler::QueryHandler;
use buildco_domain::job_application::JobApplication;
use buildco_domain::ports::Repository;
use buildco_domain::quote::Quote;
use buildco_domain::value_object::Priority;
use buildco_macros::query;
use chrono::Utc;

use crate::dto::DashboardStatsDto;

/// 后台首页统计；实时数据，不缓存
#[query(name = "GetDashboardStatsQuery", output = DashboardStatsDto, cache = false)]
pub struct GetDashboardStats {}

pub struct GetDashboardStatsHandler {
    quotes: Arc<dyn Repository<Quote>>,
    applications: Arc<dyn Repository<JobApplication>>,
}

impl GetDashboardStatsHandler {
    pub fn new(
        quotes: Arc<dyn Repository<Quote>>,
        applications: Arc<dyn Repository<JobApplication>>,
    ) -> Self {
        Self {
            quotes,
            applications,
        }
    }
}

#[async_trait]
impl QueryHandler<GetDashboardStats> for GetDashboardStatsHandler {
    async fn handle(&self, _q: &GetDashboardStats) -> AppResult<DashboardStatsDto> {
        let quotes = self.quotes.find_all().await?;
        let total_job_applications = self.applications.find_all().await?.len();

        let mut stats = DashboardStatsDto {
            total_quotes: quotes.len(),
            total_job_applications,
            generated_at: Some(Utc::now()),
            ..Default::default()
        };

        for quote in &quotes {
            *stats
                .quotes_by_status
                .entry(quote.status().to_string())
                .or_default() += 1;
            *stats
                .quotes_by_service
                .entry(quote.service_type().to_string())
                .or_default() += 1;
            if quote.priority() == Priority::Urgent && !quote.status().is_terminal() {
                stats.urgent_open_quotes += 1;
            }
        }

        Ok(stats)
    }
}
