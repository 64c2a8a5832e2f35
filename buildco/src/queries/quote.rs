use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use buildco_application::envelope::{SortDirection, SortSpec};
use buildco_application::error::{AppError, AppResult};
use buildco_application::query_handler::QueryHandler;
use buildco_domain::entity::Entity;
use buildco_domain::error::DomainError;
use buildco_domain::ports::Repository;
use buildco_domain::quote::{Quote, QuoteId, QuoteStatus};
use buildco_domain::value_object::ServiceType;
use buildco_macros::query;

use super::paginate;
use crate::dto::{QuoteDto, QuoteListDto};

pub const FILTER_STATUS: &str = "status";
pub const FILTER_SERVICE: &str = "service_type";

/// 报价列表
///
/// 过滤：`status`、`service_type`；排序字段：`created_at`（缺省，降序）、`customer_name`、`priority`
#[query(name = "GetQuoteListQuery", output = QuoteListDto, ttl = 60)]
pub struct GetQuoteList {
    /// 客户名称包含（不区分大小写）
    pub search: Option<String>,
}

/// 报价详情
#[query(name = "GetQuoteByIdQuery", output = QuoteDto)]
pub struct GetQuoteById {
    pub id: String,
}

pub struct GetQuoteListHandler {
    quotes: Arc<dyn Repository<Quote>>,
}

impl GetQuoteListHandler {
    pub fn new(quotes: Arc<dyn Repository<Quote>>) -> Self {
        Self { quotes }
    }
}

/// 可排序字段
pub const SORT_FIELDS: [&str; 3] = ["created_at", "customer_name", "priority"];

fn compare(a: &Quote, b: &Quote, sort: &SortSpec) -> Ordering {
    let ord = match sort.field.as_str() {
        "customer_name" => a
            .customer_name()
            .to_lowercase()
            .cmp(&b.customer_name().to_lowercase()),
        "priority" => a.priority().cmp(&b.priority()),
        _ => a.created_at().cmp(b.created_at()),
    };

    match sort.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

#[async_trait]
impl QueryHandler<GetQuoteList> for GetQuoteListHandler {
    async fn handle(&self, q: &GetQuoteList) -> AppResult<QuoteListDto> {
        let envelope = &q.envelope;
        let sort = envelope
            .sort()
            .cloned()
            .unwrap_or_else(|| SortSpec::desc("created_at"));
        if !SORT_FIELDS.contains(&sort.field.as_str()) {
            return Err(AppError::InvalidQuery(format!(
                "cannot sort quotes by '{}'",
                sort.field
            )));
        }

        let status = envelope
            .filter_str(FILTER_STATUS)
            .map(str::parse::<QuoteStatus>)
            .transpose()?;
        let service = envelope
            .filter_str(FILTER_SERVICE)
            .map(str::parse::<ServiceType>)
            .transpose()?;
        let search = q.search.as_deref().map(str::to_lowercase);

        let mut quotes: Vec<Quote> = self
            .quotes
            .find_all()
            .await?
            .into_iter()
            .filter(|quote| status.is_none_or(|s| quote.status() == s))
            .filter(|quote| service.is_none_or(|s| quote.service_type() == s))
            .filter(|quote| {
                search
                    .as_deref()
                    .is_none_or(|s| quote.customer_name().to_lowercase().contains(s))
            })
            .collect();

        quotes.sort_by(|a, b| compare(a, b, &sort));

        let total = quotes.len();
        let (page_items, page, limit) = paginate(quotes, envelope);

        Ok(QuoteListDto {
            items: page_items.iter().map(QuoteDto::from).collect(),
            total,
            page,
            limit,
        })
    }
}

pub struct GetQuoteByIdHandler {
    quotes: Arc<dyn Repository<Quote>>,
}

impl GetQuoteByIdHandler {
    pub fn new(quotes: Arc<dyn Repository<Quote>>) -> Self {
        Self { quotes }
    }
}

#[async_trait]
impl QueryHandler<GetQuoteById> for GetQuoteByIdHandler {
    async fn handle(&self, q: &GetQuoteById) -> AppResult<QuoteDto> {
        let id: QuoteId = q.id.parse()?;
        let quote = self
            .quotes
            .find_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(Quote::TYPE, id))?;
        Ok(QuoteDto::from(&quote))
    }
}
