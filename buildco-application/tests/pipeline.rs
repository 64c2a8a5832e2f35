use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use buildco_application::cache::{InMemoryQueryCache, QueryCache, cache_key};
use buildco_application::command_bus::CommandBus;
use buildco_application::command_handler::CommandHandler;
use buildco_application::config::DispatcherConfig;
use buildco_application::envelope::{CommandEnvelope, Pagination, QueryEnvelope, SortSpec};
use buildco_application::error::{AppError, AppResult};
use buildco_application::middleware::{
    BoxAnySend, CacheInvalidationMiddleware, CommandCall, CommandMiddleware, InMemoryMetrics,
    LoggingMiddleware, Next, PerformanceMiddleware, ValidationMiddleware,
};
use buildco_application::query_bus::QueryBus;
use buildco_application::query_handler::QueryHandler;
use buildco_application::validation::{CommandValidator, ValidationReport};
use buildco_application::{CommandDispatcher, QueryDispatcher};
use buildco_macros::{command, query};
use serde::{Deserialize, Serialize};

#[command(name = "RenameProject", output = String, invalidates = ["ListProjects"])]
pub struct RenameProject {
    pub project: u32,
    pub name: String,
}

#[query(name = "ListProjects", output = Vec<ProjectDto>, ttl = 60)]
pub struct ListProjects {
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: u32,
    pub name: String,
}

fn rename(name: &str) -> RenameProject {
    RenameProject {
        envelope: CommandEnvelope::default(),
        project: 1,
        name: name.to_string(),
    }
}

fn list(owner: Option<&str>, envelope: QueryEnvelope) -> ListProjects {
    ListProjects {
        envelope,
        owner: owner.map(str::to_string),
    }
}

#[derive(Default)]
struct RenameHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl CommandHandler<RenameProject> for RenameHandler {
    async fn handle(&self, cmd: &RenameProject) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(cmd.name.clone())
    }
}

struct NameNotBlank;

#[async_trait]
impl CommandValidator<RenameProject> for NameNotBlank {
    async fn validate(&self, cmd: &RenameProject) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.check(!cmd.name.trim().is_empty(), "name", "name is required");
        report
    }
}

#[derive(Default)]
struct ListHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl QueryHandler<ListProjects> for ListHandler {
    async fn handle(&self, _q: &ListProjects) -> AppResult<Vec<ProjectDto>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(vec![ProjectDto {
            id: n,
            name: format!("project-{n}"),
        }])
    }
}

type Trace = Arc<Mutex<Vec<&'static str>>>;

struct Tracer {
    label: &'static str,
    trace: Trace,
}

#[async_trait]
impl CommandMiddleware for Tracer {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend> {
        self.trace.lock().unwrap().push(self.label);
        next.run(call).await
    }
}

#[tokio::test]
async fn middleware_runs_outermost_first() {
    let trace: Trace = Arc::default();
    let bus = CommandDispatcher::default()
        .with_middleware(Tracer {
            label: "outer",
            trace: trace.clone(),
        })
        .with_middleware(Tracer {
            label: "inner",
            trace: trace.clone(),
        });
    bus.register::<RenameProject, _>(Arc::new(RenameHandler::default()))
        .unwrap();

    bus.dispatch(rename("Harbor")).await.unwrap();

    assert_eq!(*trace.lock().unwrap(), vec!["outer", "inner"]);
    assert_eq!(bus.middleware_names(), vec!["outer", "inner"]);
}

#[tokio::test]
async fn unroutable_command_fails_before_any_middleware() {
    let trace: Trace = Arc::default();
    let bus = CommandDispatcher::default().with_middleware(Tracer {
        label: "outer",
        trace: trace.clone(),
    });

    let err = bus.dispatch(rename("Harbor")).await.unwrap_err();

    assert!(matches!(err, AppError::HandlerNotFound("RenameProject")));
    assert!(trace.lock().unwrap().is_empty());
}

#[tokio::test]
async fn validation_failure_never_invokes_the_handler() {
    let validation = ValidationMiddleware::new();
    validation
        .register::<RenameProject, _>(Arc::new(NameNotBlank))
        .unwrap();
    let metrics = Arc::new(InMemoryMetrics::new());

    let bus = CommandDispatcher::default()
        .with_middleware(LoggingMiddleware::new())
        .with_middleware(validation)
        .with_middleware(PerformanceMiddleware::new(
            metrics.clone(),
            Duration::from_secs(1),
        ));
    let handler = Arc::new(RenameHandler::default());
    bus.register::<RenameProject, _>(handler.clone()).unwrap();

    let result = bus.execute(rename("   ")).await;

    assert!(!result.success);
    assert_eq!(result.errors[0].field, "name");
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    // 校验在性能中间件之外，被拒绝的命令不产生指标
    assert!(metrics.stats("RenameProject").is_none());

    let ok = bus.execute(rename("Harbor")).await;
    assert!(ok.success);
    assert_eq!(ok.data.as_deref(), Some("Harbor"));
    assert_eq!(metrics.stats("RenameProject").unwrap().count, 1);
}

#[tokio::test]
async fn identical_queries_hit_the_cache() {
    let bus = QueryDispatcher::new(
        &DispatcherConfig::default(),
        Arc::new(InMemoryQueryCache::new()),
    );
    let handler = Arc::new(ListHandler::default());
    bus.register::<ListProjects, _>(handler.clone()).unwrap();

    let envelope = || {
        QueryEnvelope::builder()
            .pagination(Pagination::first(5).unwrap())
            .build()
    };

    let first = bus.dispatch(list(Some("ana"), envelope())).await.unwrap();
    let second = bus.dispatch(list(Some("ana"), envelope())).await.unwrap();
    let other = bus.dispatch(list(Some("ben"), envelope())).await.unwrap();

    assert_eq!(first.data, second.data);
    assert!(second.cache_hit);
    assert!(!other.cache_hit);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn cache_key_ignores_identity_but_not_shape() {
    let a = list(
        None,
        QueryEnvelope::builder()
            .user_id("u-1".to_string())
            .sort(SortSpec::desc("created_at"))
            .build()
            .with_filter("status", "pending")
            .with_filter("service", "roofing"),
    );
    let b = list(
        None,
        QueryEnvelope::builder()
            .user_id("u-2".to_string())
            .sort(SortSpec::desc("created_at"))
            .build()
            .with_filter("service", "roofing")
            .with_filter("status", "pending"),
    );
    assert_ne!(a.envelope.id(), b.envelope.id());
    assert_eq!(cache_key(&a).unwrap(), cache_key(&b).unwrap());

    let c = list(
        None,
        QueryEnvelope::builder()
            .sort(SortSpec::asc("created_at"))
            .build()
            .with_filter("status", "pending")
            .with_filter("service", "roofing"),
    );
    assert_ne!(cache_key(&a).unwrap(), cache_key(&c).unwrap());
}

#[tokio::test]
async fn successful_command_invalidates_declared_queries() {
    let cache: Arc<dyn QueryCache> = Arc::new(InMemoryQueryCache::new());
    let queries = QueryDispatcher::new(&DispatcherConfig::default(), cache.clone());
    let list_handler = Arc::new(ListHandler::default());
    queries
        .register::<ListProjects, _>(list_handler.clone())
        .unwrap();

    let commands =
        CommandDispatcher::default().with_middleware(CacheInvalidationMiddleware::new(cache));
    commands
        .register::<RenameProject, _>(Arc::new(RenameHandler::default()))
        .unwrap();

    queries
        .dispatch(list(None, QueryEnvelope::default()))
        .await
        .unwrap();
    assert!(
        queries
            .dispatch(list(None, QueryEnvelope::default()))
            .await
            .unwrap()
            .cache_hit
    );

    commands.dispatch(rename("Harbor")).await.unwrap();

    let fresh = queries
        .dispatch(list(None, QueryEnvelope::default()))
        .await
        .unwrap();
    assert!(!fresh.cache_hit);
    assert_eq!(list_handler.calls.load(Ordering::SeqCst), 2);
}

struct StoredName(Arc<Mutex<String>>);

#[async_trait]
impl CommandHandler<RenameProject> for StoredName {
    async fn handle(&self, cmd: &RenameProject) -> AppResult<String> {
        *self.0.lock().unwrap() = cmd.name.clone();
        Ok(cmd.name.clone())
    }
}

/// 先读取状态，再模拟一次耗时的下游调用
struct SlowRead(Arc<Mutex<String>>);

#[async_trait]
impl QueryHandler<ListProjects> for SlowRead {
    async fn handle(&self, _q: &ListProjects) -> AppResult<Vec<ProjectDto>> {
        let name = self.0.lock().unwrap().clone();
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(vec![ProjectDto { id: 1, name }])
    }
}

#[tokio::test(start_paused = true)]
async fn read_overlapping_a_write_does_not_cache_the_old_state() {
    let state = Arc::new(Mutex::new("draft".to_string()));
    let cache: Arc<dyn QueryCache> = Arc::new(InMemoryQueryCache::new());
    let queries = QueryDispatcher::new(&DispatcherConfig::default(), cache.clone());
    queries
        .register::<ListProjects, _>(Arc::new(SlowRead(state.clone())))
        .unwrap();
    let commands =
        CommandDispatcher::default().with_middleware(CacheInvalidationMiddleware::new(cache));
    commands
        .register::<RenameProject, _>(Arc::new(StoredName(state.clone())))
        .unwrap();

    let (in_flight, ()) = tokio::join!(
        queries.dispatch(list(None, QueryEnvelope::default())),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            commands.dispatch(rename("Harbor")).await.unwrap();
        }
    );
    assert_eq!(in_flight.unwrap().data.unwrap()[0].name, "draft");

    let after = queries
        .dispatch(list(None, QueryEnvelope::default()))
        .await
        .unwrap();
    assert!(!after.cache_hit);
    assert_eq!(after.data.unwrap()[0].name, "Harbor");

    let cached = queries
        .dispatch(list(None, QueryEnvelope::default()))
        .await
        .unwrap();
    assert!(cached.cache_hit);
    assert_eq!(cached.data.unwrap()[0].name, "Harbor");
}
