//! Table-query builder for the remote data store.
//!
//! The store exposes PostgREST-style filtering: one query parameter per
//! column with an `op.value` payload (`store_id=eq.S1`,
//! `start_date=lt.2024-03-01T00:00:00Z`), plus `select` and `order`.
//! The builder keeps query assembly out of the client methods and makes
//! role scoping testable without a network.

/// Sort direction for `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn suffix(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableQuery {
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, SortOrder)>,
    limit: Option<usize>,
}

impl TableQuery {
    pub fn table(name: &str) -> Self {
        Self {
            table: name.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Column list, including foreign joins like `stores(name)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn lt(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), format!("lt.{}", value)));
        self
    }

    pub fn in_list(mut self, column: &str, values: &[String]) -> Self {
        self.filters
            .push((column.to_string(), format!("in.({})", values.join(","))));
        self
    }

    pub fn order(mut self, column: &str, direction: SortOrder) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, rows: usize) -> Self {
        self.limit = Some(rows);
        self
    }

    /// Render the query parameters in a stable order:
    /// select, filters (insertion order), order, limit.
    pub fn into_params(self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = self.select {
            params.push(("select".to_string(), select));
        }
        params.extend(self.filters);
        if let Some((column, direction)) = self.order {
            params.push((
                "order".to_string(),
                format!("{}.{}", column, direction.suffix()),
            ));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: TableQuery) -> Vec<(String, String)> {
        query.into_params()
    }

    #[test]
    fn test_eq_and_order() {
        let query = TableQuery::table("lessons")
            .select("id,start_date")
            .eq("store_id", "S1")
            .order("start_date", SortOrder::Descending);
        assert_eq!(query.table_name(), "lessons");
        assert_eq!(
            params(query),
            vec![
                ("select".to_string(), "id,start_date".to_string()),
                ("store_id".to_string(), "eq.S1".to_string()),
                ("order".to_string(), "start_date.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_lt_filter() {
        let query = TableQuery::table("lessons").lt("start_date", "2024-03-01T00:00:00Z");
        assert_eq!(
            params(query),
            vec![(
                "start_date".to_string(),
                "lt.2024-03-01T00:00:00Z".to_string()
            )]
        );
    }

    #[test]
    fn test_in_list_filter() {
        let query =
            TableQuery::table("lessons").in_list("store_id", &["S1".to_string(), "S2".to_string()]);
        assert_eq!(
            params(query),
            vec![("store_id".to_string(), "in.(S1,S2)".to_string())]
        );
    }

    #[test]
    fn test_limit_renders_last() {
        let query = TableQuery::table("lessons")
            .order("start_date", SortOrder::Ascending)
            .limit(200);
        assert_eq!(
            params(query),
            vec![
                ("order".to_string(), "start_date.asc".to_string()),
                ("limit".to_string(), "200".to_string()),
            ]
        );
    }
}
