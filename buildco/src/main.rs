use anyhow::Context;
use buildco::commands::{SetQuotePriority, SubmitQuoteRequest, UpdateQuoteStatus};
use buildco::queries::{GetDashboardStats, GetQuoteList};
use buildco_application::command_bus::CommandBus;
use buildco_application::config::DispatcherConfig;
use buildco_application::envelope::{CommandEnvelope, Pagination, QueryEnvelope, SortSpec};
use buildco_application::query_bus::QueryBus;
use buildco_application::telemetry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = DispatcherConfig::from_env().context("reading dispatcher config")?;
    let app = buildco::build_app(&config)?;

    let envelope = CommandEnvelope::builder()
        .correlation_id("demo-session".to_string())
        .build();

    // 提交报价
    let submitted = app
        .commands
        .dispatch(SubmitQuoteRequest {
            envelope,
            customer_name: "Alice Nguyen".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            service_type: "residential".to_string(),
            description: "Two-storey extension with a new kitchen".to_string(),
        })
        .await?;
    let quote_id = submitted
        .data
        .context("submit returned no quote id")?
        .to_string();
    println!("submitted quote {quote_id} in {:?} ms", submitted.duration_ms);

    // 描述过短：校验失败，处理器不会执行
    let rejected = app
        .commands
        .execute(SubmitQuoteRequest {
            envelope: CommandEnvelope::default(),
            customer_name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            phone: "555 987 6543".to_string(),
            service_type: "roofing".to_string(),
            description: "Leak".to_string(),
        })
        .await;
    println!("rejected: success={}, errors={:?}", rejected.success, rejected.errors);

    // 审核流程
    app.commands
        .dispatch(SetQuotePriority {
            envelope: CommandEnvelope::default(),
            quote_id: quote_id.clone(),
            priority: "urgent".to_string(),
        })
        .await?;
    app.commands
        .dispatch(UpdateQuoteStatus {
            envelope: CommandEnvelope::default(),
            quote_id: quote_id.clone(),
            status: "reviewing".to_string(),
            admin_notes: Some("site visit scheduled".to_string()),
        })
        .await?;

    // 列表查询两次，第二次命中缓存
    for _ in 0..2 {
        let list = app
            .queries
            .dispatch(GetQuoteList {
                envelope: QueryEnvelope::builder()
                    .pagination(Pagination::first(5)?)
                    .sort(SortSpec::desc("created_at"))
                    .build(),
                search: None,
            })
            .await?;
        println!(
            "quote list: total={}, cache_hit={}",
            list.data.map(|d| d.total).unwrap_or_default(),
            list.cache_hit
        );
    }

    let stats = app
        .queries
        .dispatch(GetDashboardStats {
            envelope: QueryEnvelope::default(),
        })
        .await?;
    println!("dashboard: {}", serde_json::to_string_pretty(&stats.data)?);

    for (command, s) in app.metrics.snapshot() {
        println!(
            "{command}: count={}, failures={}, avg={} ms",
            s.count,
            s.failures,
            s.average_ms()
        );
    }
    println!("emails sent: {}", app.email.sent().len());

    Ok(())
}
