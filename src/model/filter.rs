//! Query parameters for `/process/read`.

use super::DataOrder;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

/// Selects datanodes and a time window for a read query.
///
/// ```rust
/// use iot_ticket::model::ReadFilter;
///
/// let mut filter = ReadFilter::new();
/// filter.add_datanode_at("V", "/Test/Path");
/// filter.set_from_date(0);
/// filter.set_limit(10);
/// assert_eq!(
///     filter.build_parameter_string(),
///     "?datanodes=Test/Path/V&fromdate=0&limit=10"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadFilter {
    datanodes: Vec<String>,
    from_date: Option<u64>,
    to_date: Option<u64>,
    limit: u32,
    order: DataOrder,
}

impl ReadFilter {
    /// Creates a filter that selects nothing and sets no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a datanode by name.
    pub fn add_datanode(&mut self, name: &str) {
        self.datanodes.push(name.into());
    }

    /// Selects a datanode by path and name, joined as `path/name`.
    ///
    /// One leading and one trailing `/` of `path` are dropped, so `/Test/Path/`
    /// and `Test/Path` select the same datanode.
    pub fn add_datanode_at(&mut self, name: &str, path: &str) {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.is_empty() {
            self.add_datanode(name);
            return;
        }

        let mut node = String::with_capacity(path.len() + name.len() + 1);
        node.push_str(path);
        node.push('/');
        node.push_str(name);
        self.datanodes.push(node);
    }

    /// The selectors added so far, in order.
    pub fn datanodes(&self) -> &[String] {
        &self.datanodes
    }

    /// Only return samples at or after `timestamp_ms`. Zero is a valid bound.
    pub fn set_from_date(&mut self, timestamp_ms: u64) {
        self.from_date = Some(timestamp_ms);
    }

    /// Only return samples at or before `timestamp_ms`.
    pub fn set_to_date(&mut self, timestamp_ms: u64) {
        self.to_date = Some(timestamp_ms);
    }

    /// Maximum number of samples per datanode; 0 leaves it to the server.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// Sample ordering.
    pub fn set_order(&mut self, order: DataOrder) {
        self.order = order;
    }

    /// Resets the filter to its freshly constructed state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Renders the query string, starting with `?`.
    pub fn build_parameter_string(&self) -> String {
        let mut params = String::from("?datanodes=");
        for (index, node) in self.datanodes.iter().enumerate() {
            if index > 0 {
                params.push(',');
            }
            params.push_str(node);
        }

        // Writing into a String cannot fail.
        if let Some(from) = self.from_date {
            let _ = write!(params, "&fromdate={}", from);
        }
        if let Some(to) = self.to_date {
            let _ = write!(params, "&todate={}", to);
        }
        if self.limit != 0 {
            let _ = write!(params, "&limit={}", self.limit);
        }
        if let Some(order) = self.order.as_query() {
            params.push_str("&order=");
            params.push_str(order);
        }

        params
    }
}
