//! 报价申请（Quote）
//!
//! 客户提交的报价请求，由管理员审核、设置优先级并回复。
//!
use std::{fmt, str::FromStr};

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::value_object::{EmailAddress, PhoneNumber, Priority, ServiceType};

/// 描述的最短长度
pub const MIN_DESCRIPTION_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(Uuid);

impl QuoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for QuoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 报价状态
///
/// 合法流转：
/// - `Pending → Reviewing | Rejected`
/// - `Reviewing → Quoted | Rejected`
/// - `Quoted → Accepted | Rejected`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Reviewing,
    Quoted,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Quoted => "quoted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Pending, Reviewing)
                | (Pending, Rejected)
                | (Reviewing, Quoted)
                | (Reviewing, Rejected)
                | (Quoted, Accepted)
                | (Quoted, Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewing" => Ok(Self::Reviewing),
            "quoted" => Ok(Self::Quoted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::invalid_value(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// 报价申请实体
#[derive(Builder, Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[builder(default = QuoteId::generate())]
    id: QuoteId,
    customer_name: String,
    email: EmailAddress,
    phone: PhoneNumber,
    service_type: ServiceType,
    description: String,
    #[builder(default)]
    status: QuoteStatus,
    #[builder(default)]
    priority: Priority,
    admin_notes: Option<String>,
    #[builder(default = Utc::now())]
    created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    updated_at: DateTime<Utc>,
}

impl Entity for Quote {
    const TYPE: &'static str = "quote";
    type Id = QuoteId;

    fn id(&self) -> &QuoteId {
        &self.id
    }
}

impl Quote {
    /// 以客户提交的信息创建报价申请，校验描述长度与客户名称
    pub fn submit(
        customer_name: impl Into<String>,
        email: EmailAddress,
        phone: PhoneNumber,
        service_type: ServiceType,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        let customer_name = customer_name.into().trim().to_string();
        let description = description.into().trim().to_string();

        if customer_name.is_empty() {
            return Err(DomainError::invalid_value("customer_name", "must not be empty"));
        }
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(DomainError::invalid_value(
                "description",
                format!("must be at least {MIN_DESCRIPTION_LEN} characters"),
            ));
        }

        Ok(Self::builder()
            .customer_name(customer_name)
            .email(email)
            .phone(phone)
            .service_type(service_type)
            .description(description)
            .build())
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn admin_notes(&self) -> Option<&str> {
        self.admin_notes.as_deref()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    /// 状态流转；终态或非法流转返回 `InvalidStateTransition`
    pub fn change_status(&mut self, next: QuoteStatus, notes: Option<String>) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.status = next;
        if notes.is_some() {
            self.admin_notes = notes;
        }
        self.touch();
        Ok(())
    }

    /// 终态报价不可再调整优先级
    pub fn set_priority(&mut self, priority: Priority) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::rule(
                "quote.priority_after_close",
                format!("quote {} is already {}", self.id, self.status),
            ));
        }

        self.priority = priority;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
