//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!

use std::fmt;
use std::str::FromStr;

use buildco_macros::value_object;

use crate::error::{DomainError, DomainResult};

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 邮箱地址
///
/// ```
/// use buildco_domain::value_object::EmailAddress;
///
/// let email = EmailAddress::parse("alice@example.com").unwrap();
/// assert_eq!(email.value(), "alice@example.com");
/// assert!(EmailAddress::parse("alice.example.com").is_err());
/// ```
#[value_object]
#[derive(Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: impl AsRef<str>) -> DomainResult<Self> {
        let email = Self(raw.as_ref().trim().to_ascii_lowercase());
        email.validate()?;
        Ok(email)
    }
}

impl ValueObject for EmailAddress {
    type Error = DomainError;

    fn validate(&self) -> DomainResult<()> {
        let Some((local, domain)) = self.0.split_once('@') else {
            return Err(DomainError::invalid_value("email", "missing '@'"));
        };

        if local.is_empty() || domain.contains('@') || self.0.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_value("email", "malformed address"));
        }

        let labels_ok = domain.split('.').all(|l| !l.is_empty());
        if !domain.contains('.') || !labels_ok {
            return Err(DomainError::invalid_value("email", "malformed domain"));
        }

        Ok(())
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 电话号码（保留原始书写，校验 7~20 位数字）
#[value_object]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 7;
    pub const MAX_DIGITS: usize = 20;

    pub fn parse(raw: impl AsRef<str>) -> DomainResult<Self> {
        let phone = Self(raw.as_ref().trim().to_string());
        phone.validate()?;
        Ok(phone)
    }

    /// 仅保留数字的规范形式
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl ValueObject for PhoneNumber {
    type Error = DomainError;

    fn validate(&self) -> DomainResult<()> {
        let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.');
        let body = self.0.strip_prefix('+').unwrap_or(&self.0);
        if !body.chars().all(allowed) {
            return Err(DomainError::invalid_value("phone", "unexpected characters"));
        }

        let count = self.digits().len();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&count) {
            return Err(DomainError::invalid_value(
                "phone",
                format!(
                    "expected {}-{} digits, got {count}",
                    Self::MIN_DIGITS,
                    Self::MAX_DIGITS
                ),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 服务类型
#[value_object]
#[derive(Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Residential,
    Commercial,
    Renovation,
    Roofing,
    Plumbing,
    Electrical,
    Landscaping,
}

impl ServiceType {
    pub const ALL: [ServiceType; 7] = [
        Self::Residential,
        Self::Commercial,
        Self::Renovation,
        Self::Roofing,
        Self::Plumbing,
        Self::Electrical,
        Self::Landscaping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Renovation => "renovation",
            Self::Roofing => "roofing",
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::Landscaping => "landscaping",
        }
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| DomainError::invalid_value("service_type", format!("unknown service '{s}'")))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 处理优先级（由管理员设置）
#[value_object]
#[derive(Copy, Hash, Default, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(DomainError::invalid_value(
                "priority",
                format!("unknown priority '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_and_checked() {
        let e = EmailAddress::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(e.value(), "alice@example.com");

        for bad in ["", "alice", "@example.com", "alice@", "alice@example", "a b@x.io", "a@@x.io", "a@x..io"] {
            assert!(EmailAddress::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn phone_accepts_common_formats() {
        assert_eq!(PhoneNumber::parse("+1 (555) 123-4567").unwrap().digits(), "15551234567");
        assert!(PhoneNumber::parse("555-12").is_err());
        assert!(PhoneNumber::parse("555-1234x").is_err());
        assert!(PhoneNumber::parse("1".repeat(21)).is_err());
    }

    #[test]
    fn service_type_round_trips_through_str() {
        for t in ServiceType::ALL {
            assert_eq!(t.as_str().parse::<ServiceType>().unwrap(), t);
        }
        assert!("demolition".parse::<ServiceType>().is_err());
        assert_eq!(" Roofing ".parse::<ServiceType>().unwrap(), ServiceType::Roofing);
    }

    #[test]
    fn priority_orders_by_urgency() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::Low < Priority::Normal);
        assert_eq!(Priority::default(), Priority::Normal);
    }
}
