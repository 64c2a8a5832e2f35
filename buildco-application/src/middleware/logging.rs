use async_trait::async_trait;
use tokio::time::Instant;

use super::{BoxAnySend, CommandCall, CommandMiddleware, Next};
use crate::error::AppResult;

/// 记录命令开始与结束；失败时记录错误后原样返回，不吞错误
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandMiddleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend> {
        let envelope = call.envelope;
        tracing::info!(
            command.name = call.name,
            command.id = %envelope.id(),
            command.correlation_id = envelope.correlation_id(),
            command.user_id = envelope.user_id(),
            command.created_at = %envelope.created_at(),
            "command started"
        );

        let started = Instant::now();
        let out = next.run(call).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &out {
            Ok(_) => tracing::info!(
                command.name = call.name,
                command.id = %envelope.id(),
                duration.ms = elapsed_ms,
                "command completed"
            ),
            Err(e) => tracing::error!(
                command.name = call.name,
                command.id = %envelope.id(),
                duration.ms = elapsed_ms,
                error = %e,
                "command failed"
            ),
        }

        out
    }
}
