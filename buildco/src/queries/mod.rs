//! 读操作：查询定义与处理器
//!
//! 列表查询的过滤、分页与排序来自查询信封，它们与查询自身字段一起决定缓存键。
//!
mod dashboard;
mod job_application;
mod quote;

pub use dashboard::{GetDashboardStats, GetDashboardStatsHandler};
pub use job_application::{GetJobApplicationList, GetJobApplicationListHandler};
pub use quote::{GetQuoteById, GetQuoteByIdHandler, GetQuoteList, GetQuoteListHandler};

use buildco_application::envelope::QueryEnvelope;

/// 未指定分页时的每页条数
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 分页截取，返回 (当前页条目, page, limit)
fn paginate<T>(items: Vec<T>, envelope: &QueryEnvelope) -> (Vec<T>, u32, u32) {
    let (page, limit, offset) = match envelope.pagination() {
        Some(p) => (p.page(), p.limit(), p.offset()),
        None => (1, DEFAULT_PAGE_SIZE, 0),
    };

    let items = items.into_iter().skip(offset).take(limit as usize).collect();
    (items, page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildco_application::envelope::Pagination;

    fn paged(page: u32, limit: u32) -> QueryEnvelope {
        QueryEnvelope::builder()
            .pagination(Pagination::new(page, limit).unwrap())
            .build()
    }

    #[test]
    fn defaults_to_the_first_page() {
        let (items, page, limit) = paginate((0..30).collect::<Vec<u32>>(), &QueryEnvelope::default());
        assert_eq!((page, limit), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(items.len(), 20);
    }

    #[test]
    fn later_pages_skip_earlier_items() {
        let (items, _, _) = paginate((0..30).collect::<Vec<u32>>(), &paged(2, 20));
        assert_eq!(items, (20..30).collect::<Vec<u32>>());
    }

    #[test]
    fn page_far_past_the_end_is_empty() {
        let (items, page, limit) = paginate(vec![1, 2, 3], &paged(u32::MAX, u32::MAX));
        assert!(items.is_empty());
        assert_eq!((page, limit), (u32::MAX, u32::MAX));
    }
}
