use serde::{Deserialize, Serialize};

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    /// 根据请求参数和总数计算分页信息（page 从 1 开始，size 限制在 1..=100）
    pub fn new(page: Option<i64>, size: Option<i64>, total: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = size.unwrap_or(10).clamp(1, 100);
        let total_pages = if total == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            page,
            page_size,
            total,
            total_pages,
        }
    }

    /// 当前页在完整列表中的偏移量
    pub fn offset(&self) -> usize {
        ((self.page - 1) * self.page_size) as usize
    }
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResponse<T> {
    /// 对已排序的完整列表做内存分页
    pub fn from_sorted(all: Vec<T>, page: Option<i64>, size: Option<i64>) -> Self {
        let pagination = PaginationInfo::new(page, size, all.len() as i64);
        let items = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.page_size as usize)
            .collect();
        Self { items, pagination }
    }
}
