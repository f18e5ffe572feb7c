use crate::domain::model::{Address, Laufliste, ListId, ListMembership};
use crate::domain::ports::{AddressSource, MembershipResolver};
use crate::utils::error::{MapError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads an address export and an optional list export from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    addresses_path: PathBuf,
    lists_path: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new(addresses_path: impl Into<PathBuf>, lists_path: Option<PathBuf>) -> Self {
        Self {
            addresses_path: addresses_path.into(),
            lists_path,
        }
    }

    async fn read_lists(&self) -> Result<Vec<Laufliste>> {
        let Some(path) = &self.lists_path else {
            return Ok(Vec::new());
        };
        let data = tokio::fs::read(path).await?;
        let lists: Vec<Laufliste> = serde_json::from_slice(&data)?;
        tracing::debug!("Read {} lists from {}", lists.len(), path.display());
        Ok(lists)
    }
}

#[async_trait]
impl AddressSource for JsonFileSource {
    async fn load_addresses(&self) -> Result<Vec<Address>> {
        let data = tokio::fs::read(&self.addresses_path)
            .await
            .map_err(|e| MapError::AddressSourceError {
                message: format!("{}: {}", self.addresses_path.display(), e),
            })?;
        let addresses: Vec<Address> = serde_json::from_slice(&data)?;
        tracing::debug!(
            "Read {} addresses from {}",
            addresses.len(),
            self.addresses_path.display()
        );
        Ok(addresses)
    }

    async fn load_memberships(&self) -> Result<Vec<ListMembership>> {
        Ok(self
            .read_lists()
            .await?
            .iter()
            .flat_map(Laufliste::memberships)
            .collect())
    }
}

#[async_trait]
impl MembershipResolver for JsonFileSource {
    async fn list_membership(&self, list_ids: &[ListId]) -> Result<Vec<ListMembership>> {
        let lists = self
            .read_lists()
            .await
            .map_err(|e| MapError::membership(e.to_string()))?;
        Ok(lists
            .iter()
            .filter(|list| list_ids.contains(&list.id))
            .flat_map(Laufliste::memberships)
            .collect())
    }
}
