//! 组装：创建协作方、分发器与中间件，并注册全部处理器与校验器
//!
//! 中间件顺序（由外到内）：日志 → 校验 → 性能 → 缓存失效。
//!
use std::sync::Arc;

use buildco_application::cache::{InMemoryQueryCache, QueryCache};
use buildco_application::config::DispatcherConfig;
use buildco_application::error::AppResult;
use buildco_application::middleware::{
    CacheInvalidationMiddleware, InMemoryMetrics, LoggingMiddleware, PerformanceMiddleware,
    ValidationMiddleware,
};
use buildco_application::{CommandDispatcher, QueryDispatcher};
use buildco_domain::job_application::JobApplication;
use buildco_domain::quote::Quote;

use crate::commands::{
    DeleteQuote, DeleteQuoteHandler, SetQuotePriority, SetQuotePriorityHandler,
    SubmitJobApplication, SubmitJobApplicationHandler, SubmitQuoteRequest,
    SubmitQuoteRequestHandler, UpdateQuoteStatus, UpdateQuoteStatusHandler,
};
use crate::infra::{InMemoryEmailSender, InMemoryFileStorage, InMemoryRepository};
use crate::queries::{
    GetDashboardStats, GetDashboardStatsHandler, GetJobApplicationList,
    GetJobApplicationListHandler, GetQuoteById, GetQuoteByIdHandler, GetQuoteList,
    GetQuoteListHandler,
};
use crate::validators::{SubmitJobApplicationValidator, SubmitQuoteRequestValidator};

/// 组装完成的应用；由调用方显式持有与传递
pub struct App {
    pub commands: CommandDispatcher,
    pub queries: QueryDispatcher,
    pub cache: Arc<InMemoryQueryCache>,
    pub metrics: Arc<InMemoryMetrics>,
    pub quotes: Arc<InMemoryRepository<Quote>>,
    pub applications: Arc<InMemoryRepository<JobApplication>>,
    pub email: Arc<InMemoryEmailSender>,
    pub files: Arc<InMemoryFileStorage>,
}

pub fn build_app(config: &DispatcherConfig) -> AppResult<App> {
    let cache = Arc::new(InMemoryQueryCache::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let quotes = Arc::new(InMemoryRepository::<Quote>::new());
    let applications = Arc::new(InMemoryRepository::<JobApplication>::new());
    let email = Arc::new(InMemoryEmailSender::new());
    let files = Arc::new(InMemoryFileStorage::new());

    let validation = ValidationMiddleware::new();
    validation.register::<SubmitQuoteRequest, _>(Arc::new(SubmitQuoteRequestValidator))?;
    validation.register::<SubmitJobApplication, _>(Arc::new(SubmitJobApplicationValidator))?;

    let shared_cache: Arc<dyn QueryCache> = cache.clone();

    let commands = CommandDispatcher::new(config)
        .with_middleware(LoggingMiddleware::new())
        .with_middleware(validation)
        .with_middleware(PerformanceMiddleware::new(
            metrics.clone(),
            config.slow_command_threshold,
        ))
        .with_middleware(CacheInvalidationMiddleware::new(shared_cache.clone()));

    commands.register::<SubmitQuoteRequest, _>(Arc::new(SubmitQuoteRequestHandler::new(
        quotes.clone(),
        email.clone(),
    )))?;
    commands.register::<UpdateQuoteStatus, _>(Arc::new(UpdateQuoteStatusHandler::new(
        quotes.clone(),
        email.clone(),
    )))?;
    commands.register::<SetQuotePriority, _>(Arc::new(SetQuotePriorityHandler::new(
        quotes.clone(),
    )))?;
    commands.register::<DeleteQuote, _>(Arc::new(DeleteQuoteHandler::new(quotes.clone())))?;
    commands.register::<SubmitJobApplication, _>(Arc::new(SubmitJobApplicationHandler::new(
        applications.clone(),
        files.clone(),
        email.clone(),
    )))?;

    let queries = QueryDispatcher::new(config, shared_cache);
    queries.register::<GetQuoteList, _>(Arc::new(GetQuoteListHandler::new(quotes.clone())))?;
    queries.register::<GetQuoteById, _>(Arc::new(GetQuoteByIdHandler::new(quotes.clone())))?;
    queries.register::<GetJobApplicationList, _>(Arc::new(GetJobApplicationListHandler::new(
        applications.clone(),
    )))?;
    queries.register::<GetDashboardStats, _>(Arc::new(GetDashboardStatsHandler::new(
        quotes.clone(),
        applications.clone(),
    )))?;

    tracing::info!(
        commands = ?commands.registered_commands(),
        queries = ?queries.registered_queries(),
        middleware = ?commands.middleware_names(),
        "application assembled"
    );

    Ok(App {
        commands,
        queries,
        cache,
        metrics,
        quotes,
        applications,
        email,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_use_case_is_routable() {
        let app = build_app(&DispatcherConfig::default()).unwrap();

        assert_eq!(
            app.commands.registered_commands(),
            vec![
                "DeleteQuoteCommand",
                "SetQuotePriorityCommand",
                "SubmitJobApplicationCommand",
                "SubmitQuoteRequestCommand",
                "UpdateQuoteStatusCommand",
            ]
        );
        assert_eq!(
            app.queries.registered_queries(),
            vec![
                "GetDashboardStatsQuery",
                "GetJobApplicationListQuery",
                "GetQuoteByIdQuery",
                "GetQuoteListQuery",
            ]
        );
        assert_eq!(
            app.commands.middleware_names(),
            vec!["logging", "validation", "performance", "cache-invalidation"]
        );
    }
}
