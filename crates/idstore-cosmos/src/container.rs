//! Handles to provisioned containers.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use idstore_core::{StoreError, StoreResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{ContainerLink, DocumentBackend, DocumentQuery};
use crate::entities::Document;

/// A container that the provisioner confirmed exists.
///
/// Cheap to clone; all clones share the backend connection.
#[derive(Clone)]
pub struct Container {
    backend: Arc<dyn DocumentBackend>,
    link: ContainerLink,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}

impl Container {
    pub(crate) fn new(backend: Arc<dyn DocumentBackend>, link: ContainerLink) -> Self {
        Self { backend, link }
    }

    pub fn link(&self) -> &ContainerLink {
        &self.link
    }

    /// Inserts an entity that already carries its id.
    pub async fn create<T>(&self, entity: &T) -> StoreResult<T>
    where
        T: Document + Serialize + DeserializeOwned,
    {
        let document = serde_json::to_value(entity)?;
        let stored = self
            .backend
            .create_document(&self.link, entity.partition_key(), document)
            .await?;
        from_document(stored)
    }

    /// Replaces the stored document with the entity's id.
    pub async fn replace<T>(&self, entity: &T) -> StoreResult<T>
    where
        T: Document + Serialize + DeserializeOwned,
    {
        if entity.id().is_empty() {
            return Err(StoreError::not_found(format!(
                "cannot replace a document without id in {}",
                self.link
            )));
        }
        let document = serde_json::to_value(entity)?;
        let stored = self
            .backend
            .replace_document(&self.link, entity.id(), entity.partition_key(), document)
            .await?;
        from_document(stored)
    }

    /// Deletes a document by id within its partition.
    pub async fn delete(&self, id: &str, partition_key: &str) -> StoreResult<()> {
        self.backend
            .delete_document(&self.link, id, partition_key)
            .await
    }

    /// Runs a query and decodes every result.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: &DocumentQuery,
        partition_key: Option<&str>,
    ) -> StoreResult<Vec<T>> {
        self.backend
            .query_documents(&self.link, query, partition_key)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    /// Builds a lazy query over this container.
    ///
    /// A blank partition key is treated as absent and scans every partition.
    pub fn query<T: DeserializeOwned>(&self, partition_key: Option<&str>) -> Query<T> {
        Query {
            container: self.clone(),
            filter: DocumentQuery::all(),
            partition_key: partition_key
                .filter(|pk| !pk.trim().is_empty())
                .map(str::to_owned),
            _marker: PhantomData,
        }
    }
}

fn from_document<T: DeserializeOwned>(document: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(document)?)
}

/// A query that has not run yet.
///
/// Nothing is sent to the backend until [`Query::fetch_all`] or
/// [`Query::first`] is awaited, and every call runs the query again.
pub struct Query<T> {
    container: Container,
    filter: DocumentQuery,
    partition_key: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            filter: self.filter.clone(),
            partition_key: self.partition_key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("container", &self.container.link)
            .field("filter", &self.filter)
            .field("partition_key", &self.partition_key)
            .finish()
    }
}

impl<T: DeserializeOwned> Query<T> {
    /// Adds an equality condition.
    #[must_use]
    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filter = self.filter.eq(field, value);
        self
    }

    /// Adds a membership condition.
    #[must_use]
    pub fn is_in<I, V>(mut self, field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter = self.filter.is_in(field, values);
        self
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn filter(&self) -> &DocumentQuery {
        &self.filter
    }

    /// Runs the query and returns every match.
    pub async fn fetch_all(&self) -> StoreResult<Vec<T>> {
        self.container
            .fetch(&self.filter, self.partition_key.as_deref())
            .await
    }

    /// Runs the query and returns the first match, if any.
    pub async fn first(&self) -> StoreResult<Option<T>> {
        Ok(self.fetch_all().await?.into_iter().next())
    }
}
