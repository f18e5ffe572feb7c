use crate::domain::model::{Address, AddressId, ListId, ListMembership};
use crate::domain::ports::AddressSource;
use crate::utils::error::Result;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Address/list join indexed by address id.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    by_address: HashMap<AddressId, Vec<ListMembership>>,
}

impl MembershipIndex {
    pub fn from_rows<I: IntoIterator<Item = ListMembership>>(rows: I) -> Self {
        let mut by_address: HashMap<AddressId, Vec<ListMembership>> = HashMap::new();
        for row in rows {
            let entry = by_address.entry(row.address_id.clone()).or_default();
            if !entry.iter().any(|existing| existing.list_id == row.list_id) {
                entry.push(row);
            }
        }
        Self { by_address }
    }

    pub fn lists_for(&self, address_id: &str) -> &[ListMembership] {
        self.by_address
            .get(address_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_member(&self, address_id: &str) -> bool {
        !self.lists_for(address_id).is_empty()
    }

    /// The membership that decides an address's color when several lists claim it.
    pub fn preferred(&self, address_id: &str) -> Option<&ListMembership> {
        preferred_membership(self.lists_for(address_id))
    }

    pub fn member_ids(&self, list_ids: &[ListId]) -> HashSet<AddressId> {
        let wanted: HashSet<&str> = list_ids.iter().map(String::as_str).collect();
        self.by_address
            .iter()
            .filter(|(_, rows)| rows.iter().any(|row| wanted.contains(row.list_id.as_str())))
            .map(|(address_id, _)| address_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

/// Most recent `assigned_at` wins; undated rows rank oldest; ties go to the
/// smallest list id.
pub fn preferred_membership(rows: &[ListMembership]) -> Option<&ListMembership> {
    rows.iter().max_by(|a, b| compare_recency(a, b))
}

fn compare_recency(a: &ListMembership, b: &ListMembership) -> Ordering {
    a.assigned_at
        .cmp(&b.assigned_at)
        .then_with(|| b.list_id.cmp(&a.list_id))
}

/// Read-only snapshot of addresses between explicit reloads.
#[derive(Debug, Clone, Default)]
pub struct AddressStore {
    addresses: Vec<Address>,
    positions: HashMap<AddressId, usize>,
    memberships: MembershipIndex,
    generation: u64,
}

impl AddressStore {
    pub fn new(addresses: Vec<Address>, memberships: Vec<ListMembership>) -> Self {
        let mut store = Self::default();
        store.replace(addresses, memberships);
        store
    }

    /// Pulls a fresh snapshot. On failure the previous snapshot stays in place.
    pub async fn reload<S: AddressSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let addresses = source.load_addresses().await?;
        let memberships = source.load_memberships().await?;
        self.replace(addresses, memberships);
        tracing::info!(
            "📍 Address store reloaded: {} addresses, {} with list memberships (generation {})",
            self.addresses.len(),
            self.memberships.len(),
            self.generation
        );
        Ok(())
    }

    fn replace(&mut self, addresses: Vec<Address>, memberships: Vec<ListMembership>) {
        self.positions = addresses
            .iter()
            .enumerate()
            .map(|(index, address)| (address.id.clone(), index))
            .collect();
        self.addresses = addresses;
        self.memberships = MembershipIndex::from_rows(memberships);
        self.generation += 1;
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn get(&self, id: &str) -> Option<&Address> {
        self.positions.get(id).map(|&index| &self.addresses[index])
    }

    pub fn memberships(&self) -> &MembershipIndex {
        &self.memberships
    }

    /// Addresses with usable coordinates, in store order.
    pub fn placeable(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter().filter(|address| address.is_placeable())
    }

    /// Store-ordered subset matching `ids`.
    pub fn select_ids<'a>(&'a self, ids: &'a HashSet<AddressId>) -> impl Iterator<Item = &'a Address> {
        self.addresses
            .iter()
            .filter(move |address| ids.contains(&address.id))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
