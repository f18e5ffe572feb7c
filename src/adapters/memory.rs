use crate::domain::model::{Address, Laufliste, ListId, ListMembership};
use crate::domain::ports::{AddressSource, MembershipResolver};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Address and list data held in memory, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    addresses: Arc<RwLock<Vec<Address>>>,
    lists: Arc<RwLock<Vec<Laufliste>>>,
}

impl InMemorySource {
    pub fn new(addresses: Vec<Address>, lists: Vec<Laufliste>) -> Self {
        Self {
            addresses: Arc::new(RwLock::new(addresses)),
            lists: Arc::new(RwLock::new(lists)),
        }
    }

    /// Simulates a backend mutation such as list creation.
    pub fn upsert_list(&self, list: Laufliste) {
        let mut lists = self.lists.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        match lists.iter_mut().find(|existing| existing.id == list.id) {
            Some(existing) => *existing = list,
            None => lists.push(list),
        }
    }

    fn memberships_where(&self, keep: impl Fn(&Laufliste) -> bool) -> Vec<ListMembership> {
        let lists = self.lists.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        lists
            .iter()
            .filter(|list| keep(list))
            .flat_map(Laufliste::memberships)
            .collect()
    }
}

#[async_trait]
impl AddressSource for InMemorySource {
    async fn load_addresses(&self) -> Result<Vec<Address>> {
        let addresses = self
            .addresses
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(addresses.clone())
    }

    async fn load_memberships(&self) -> Result<Vec<ListMembership>> {
        Ok(self.memberships_where(|_| true))
    }
}

#[async_trait]
impl MembershipResolver for InMemorySource {
    async fn list_membership(&self, list_ids: &[ListId]) -> Result<Vec<ListMembership>> {
        Ok(self.memberships_where(|list| list_ids.contains(&list.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str, members: &[&str]) -> Laufliste {
        Laufliste {
            id: id.to_string(),
            name: None,
            color: "#00ff00".to_string(),
            assigned_to: Some("Mara".to_string()),
            member_address_ids: members.iter().map(|m| m.to_string()).collect(),
            assigned_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_membership_filters_by_list() {
        let source = InMemorySource::new(vec![], vec![list("a", &["x1", "x2"]), list("b", &["x3"])]);
        let rows = source.list_membership(&["b".to_string()]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].address_id, "x3");
        assert_eq!(source.load_memberships().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_list_is_visible_to_clones() {
        let source = InMemorySource::default();
        let handle = source.clone();
        handle.upsert_list(list("a", &["x1"]));
        handle.upsert_list(list("a", &["x1", "x2"]));
        assert_eq!(source.load_memberships().await.unwrap().len(), 2);
    }
}
