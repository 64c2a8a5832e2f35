use std::sync::Arc;

use async_trait::async_trait;
use buildco_application::command_handler::CommandHandler;
use buildco_application::error::AppResult;
use buildco_domain::entity::Entity;
use buildco_domain::error::DomainError;
use buildco_domain::ports::{EmailMessage, EmailSender, Repository};
use buildco_domain::quote::{Quote, QuoteId, QuoteStatus};
use buildco_domain::value_object::{EmailAddress, PhoneNumber, Priority, ServiceType};
use buildco_macros::command;
use tokio::sync::Mutex;

/// 客户提交报价申请
#[command(
    name = "SubmitQuoteRequestCommand",
    output = QuoteId,
    invalidates = ["GetQuoteListQuery"]
)]
pub struct SubmitQuoteRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub description: String,
}

#[command(
    name = "UpdateQuoteStatusCommand",
    invalidates = ["GetQuoteListQuery", "GetQuoteByIdQuery"]
)]
pub struct UpdateQuoteStatus {
    pub quote_id: String,
    pub status: String,
    pub admin_notes: Option<String>,
}

#[command(
    name = "SetQuotePriorityCommand",
    invalidates = ["GetQuoteListQuery", "GetQuoteByIdQuery"]
)]
pub struct SetQuotePriority {
    pub quote_id: String,
    pub priority: String,
}

#[command(
    name = "DeleteQuoteCommand",
    invalidates = ["GetQuoteListQuery", "GetQuoteByIdQuery"]
)]
pub struct DeleteQuote {
    pub quote_id: String,
}

async fn load(quotes: &dyn Repository<Quote>, raw_id: &str) -> AppResult<Quote> {
    let id: QuoteId = raw_id.parse()?;
    let quote = quotes
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found(Quote::TYPE, &id))?;
    Ok(quote)
}

pub struct SubmitQuoteRequestHandler {
    quotes: Arc<dyn Repository<Quote>>,
    email: Arc<dyn EmailSender>,
    /// 串行化"查重 + 保存"，并发的相同提交只有一个成功
    submissions: Mutex<()>,
}

impl SubmitQuoteRequestHandler {
    pub fn new(quotes: Arc<dyn Repository<Quote>>, email: Arc<dyn EmailSender>) -> Self {
        Self {
            quotes,
            email,
            submissions: Mutex::new(()),
        }
    }
}

#[async_trait]
impl CommandHandler<SubmitQuoteRequest> for SubmitQuoteRequestHandler {
    async fn handle(&self, cmd: &SubmitQuoteRequest) -> AppResult<QuoteId> {
        let email = EmailAddress::parse(&cmd.email)?;
        let phone = PhoneNumber::parse(&cmd.phone)?;
        let service_type: ServiceType = cmd.service_type.parse()?;

        let quote = Quote::submit(
            &cmd.customer_name,
            email,
            phone,
            service_type,
            &cmd.description,
        )?;

        // 同一邮箱、同一描述的待处理申请视为重复提交
        let submitting = self.submissions.lock().await;
        let duplicate = self.quotes.find_all().await?.into_iter().any(|q| {
            q.status() == QuoteStatus::Pending
                && q.email() == quote.email()
                && q.description() == quote.description()
        });
        if duplicate {
            return Err(DomainError::rule(
                "quote.duplicate_submission",
                "an identical quote request is already pending",
            )
            .into());
        }

        self.quotes.save(&quote).await?;
        drop(submitting);

        let confirmation = EmailMessage::builder()
            .to(quote.email().clone())
            .subject(format!("We received your {} quote request", quote.service_type()))
            .body(format!(
                "Hi {}, thanks for reaching out. Your reference is {}.",
                quote.customer_name(),
                quote.id()
            ))
            .build();
        if let Err(e) = self.email.send(confirmation).await {
            tracing::warn!(quote.id = %quote.id(), error = %e, "confirmation email not sent");
        }

        Ok(*quote.id())
    }
}

pub struct UpdateQuoteStatusHandler {
    quotes: Arc<dyn Repository<Quote>>,
    email: Arc<dyn EmailSender>,
}

impl UpdateQuoteStatusHandler {
    pub fn new(quotes: Arc<dyn Repository<Quote>>, email: Arc<dyn EmailSender>) -> Self {
        Self { quotes, email }
    }
}

#[async_trait]
impl CommandHandler<UpdateQuoteStatus> for UpdateQuoteStatusHandler {
    async fn handle(&self, cmd: &UpdateQuoteStatus) -> AppResult<()> {
        let mut quote = load(self.quotes.as_ref(), &cmd.quote_id).await?;
        let next: QuoteStatus = cmd.status.parse()?;

        quote.change_status(next, cmd.admin_notes.clone())?;
        self.quotes.save(&quote).await?;

        let notice = EmailMessage::builder()
            .to(quote.email().clone())
            .subject(format!("Your quote request is now {next}"))
            .body(format!(
                "Hi {}, the status of quote {} changed to {next}.",
                quote.customer_name(),
                quote.id()
            ))
            .build();
        if let Err(e) = self.email.send(notice).await {
            tracing::warn!(quote.id = %quote.id(), error = %e, "status email not sent");
        }

        Ok(())
    }
}

pub struct SetQuotePriorityHandler {
    quotes: Arc<dyn Repository<Quote>>,
}

impl SetQuotePriorityHandler {
    pub fn new(quotes: Arc<dyn Repository<Quote>>) -> Self {
        Self { quotes }
    }
}

#[async_trait]
impl CommandHandler<SetQuotePriority> for SetQuotePriorityHandler {
    async fn handle(&self, cmd: &SetQuotePriority) -> AppResult<()> {
        let mut quote = load(self.quotes.as_ref(), &cmd.quote_id).await?;
        let priority: Priority = cmd.priority.parse()?;

        quote.set_priority(priority)?;
        self.quotes.save(&quote).await?;
        Ok(())
    }
}

pub struct DeleteQuoteHandler {
    quotes: Arc<dyn Repository<Quote>>,
}

impl DeleteQuoteHandler {
    pub fn new(quotes: Arc<dyn Repository<Quote>>) -> Self {
        Self { quotes }
    }
}

#[async_trait]
impl CommandHandler<DeleteQuote> for DeleteQuoteHandler {
    async fn handle(&self, cmd: &DeleteQuote) -> AppResult<()> {
        let id: QuoteId = cmd.quote_id.parse()?;
        if !self.quotes.delete(&id).await? {
            return Err(DomainError::not_found(Quote::TYPE, id).into());
        }
        Ok(())
    }
}
