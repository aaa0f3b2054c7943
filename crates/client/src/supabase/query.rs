//! Table query builder for the REST endpoint.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{SupabaseClient, SupabaseError};

/// Media type that makes the store return one object instead of an array.
/// The store answers 406 when zero or several rows match.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A pending request against one table.
///
/// Filters are exact-match only (`col=eq.value`), which is all the services
/// need.
#[derive(Debug, Clone)]
pub struct Query {
    client: SupabaseClient,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub(super) fn new(client: SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Columns to return (defaults to `*`).
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// Sort by a single column.
    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the request URL for a read.
    pub(crate) fn read_url(&self) -> Result<Url, SupabaseError> {
        let mut url = self.client.table_url(&self.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", self.select.as_deref().unwrap_or("*"));
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
            if let Some((column, direction)) = &self.order {
                pairs.append_pair("order", &format!("{column}.{}", direction.as_str()));
            }
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    /// Build the request URL for a write; only filters apply.
    pub(crate) fn write_url(&self) -> Result<Url, SupabaseError> {
        let mut url = self.client.table_url(&self.table)?;
        if !self.filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
        }
        Ok(url)
    }

    /// Fetch every matching row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure, a non-success status or
    /// an undecodable body.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let url = self.read_url()?;
        let response = self
            .client
            .http()
            .get(url)
            .bearer_auth(self.client.bearer_token().await)
            .send()
            .await?;
        SupabaseClient::handle_response(response).await
    }

    /// Fetch exactly one matching row.
    ///
    /// # Errors
    ///
    /// Fails when zero or several rows match, in addition to the
    /// [`execute`](Self::execute) failure cases.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn single<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        let url = self.read_url()?;
        let response = self
            .client
            .http()
            .get(url)
            .header("Accept", SINGLE_OBJECT)
            .bearer_auth(self.client.bearer_token().await)
            .send()
            .await?;
        SupabaseClient::handle_response(response).await
    }

    /// Insert one row and return it as persisted.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` carrying the store's message when the insert
    /// is rejected.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn insert<B, T>(self, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.write_url()?;
        let response = self
            .client
            .http()
            .post(url)
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .bearer_auth(self.client.bearer_token().await)
            .json(body)
            .send()
            .await?;
        SupabaseClient::handle_response(response).await
    }

    /// Patch the single matching row and return it as persisted.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` when the update is rejected or does not match
    /// exactly one row.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn update<B, T>(self, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.write_url()?;
        let response = self
            .client
            .http()
            .patch(url)
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .bearer_auth(self.client.bearer_token().await)
            .json(body)
            .send()
            .await?;
        SupabaseClient::handle_response(response).await
    }

    /// Delete the matching rows.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` when the delete is rejected.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(self) -> Result<(), SupabaseError> {
        let url = self.write_url()?;
        let response = self
            .client
            .http()
            .delete(url)
            .bearer_auth(self.client.bearer_token().await)
            .send()
            .await?;
        SupabaseClient::handle_empty_response(response).await
    }
}
