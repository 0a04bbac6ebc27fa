use super::trace_statement;
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Complete SQL text with its `$1..$n` placeholders already written, plus the
/// values for them in order.
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
    tag: Option<String>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self::from_parts(sql.into(), Vec::new(), None)
    }

    pub(crate) fn from_parts(
        sql: String,
        params: Vec<Arc<dyn ToSql + Sync + Send>>,
        tag: Option<String>,
    ) -> Self {
        Self { sql, params, tag }
    }

    /// Associate a tag, reported with the statement in `jobly.sql` events.
    ///
    /// # Example
    /// ```ignore
    /// let company: Company = jobly::query("SELECT ... FROM companies WHERE handle = $1")
    ///     .tag("companies.get")
    ///     .bind(handle.to_string())
    ///     .fetch_one_as(&conn)
    ///     .await?;
    /// ```
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind the value for the next placeholder. The SQL text is not touched.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// Bind every value of `values`, in order.
    pub fn bind_all<T>(mut self, values: impl IntoIterator<Item = T>) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        for v in values {
            self.params.push(Arc::new(v));
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn traced_params(&self) -> Vec<&(dyn ToSql + Sync)> {
        trace_statement(self.tag.as_deref(), &self.sql, self.params.len());
        self.params_ref()
    }

    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let params = self.traced_params();
        conn.query(&self.sql, &params).await
    }

    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// First row; none is [`crate::JoblyError::NotFound`].
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        let params = self.traced_params();
        conn.query_one(&self.sql, &params).await
    }

    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let params = self.traced_params();
        conn.query_opt(&self.sql, &params).await
    }

    /// First row mapped to `T`, if there is one.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Number of rows affected.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let params = self.traced_params();
        conn.execute(&self.sql, &params).await
    }
}
