use super::Query;
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use std::fmt::Write;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Dynamic SQL whose `$n` placeholders are numbered as values are pushed.
///
/// Text and values can be appended in any interleaving; the placeholder
/// written by [`Sql::push_bind`] always matches the position of its value.
#[must_use]
pub struct Sql {
    text: String,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
    tag: Option<String>,
}

impl Sql {
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            text: initial_sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag, reported with the statement in `jobly.sql` events.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = Some(tag.into());
        self
    }

    /// Append raw SQL. Never pass user input here.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.text.push_str(sql);
        self
    }

    /// Append the next placeholder and bind `value` to it.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        let _ = write!(&mut self.text, "${}", self.params.len());
        self
    }

    pub fn sql(&self) -> &str {
        &self.text
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Freeze into a [`Query`] ready to execute.
    pub fn into_query(self) -> Query {
        Query::from_parts(self.text, self.params, self.tag)
    }

    /// Execute and map every row to `T`.
    pub async fn fetch_all_as<T: FromRow>(self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        self.into_query().fetch_all_as(conn).await
    }
}
