use crate::core::store::MembershipIndex;
use crate::domain::model::{Address, AddressId, AssignmentMode, FilterState, ParityMode, UnitStatus};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// List context for the assignment predicate.
#[derive(Debug, Clone, Copy)]
pub struct ListScope<'a> {
    pub memberships: &'a MembershipIndex,
    /// Resolved union of the focus-selected lists, when any list is selected.
    pub focus: Option<&'a HashSet<AddressId>>,
}

impl<'a> ListScope<'a> {
    pub fn unfocused(memberships: &'a MembershipIndex) -> Self {
        Self {
            memberships,
            focus: None,
        }
    }
}

/// An address that survived filtering. Counters are only present while a
/// status filter is active.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredAddress<'a> {
    pub address: &'a Address,
    pub visible_unit_count: Option<usize>,
    pub visible_potential_count: Option<usize>,
}

impl FilteredAddress<'_> {
    /// Units the marker label should count.
    pub fn unit_count(&self) -> usize {
        self.visible_unit_count
            .unwrap_or(self.address.units.len())
    }
}

#[derive(Debug, Clone)]
pub struct FilterPipeline {
    potential_statuses: BTreeSet<UnitStatus>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new([UnitStatus::Offen, UnitStatus::Potenzial, UnitStatus::Termin])
    }
}

impl FilterPipeline {
    pub fn new<I: IntoIterator<Item = UnitStatus>>(potential_statuses: I) -> Self {
        Self {
            potential_statuses: potential_statuses.into_iter().collect(),
        }
    }

    pub fn apply<'a>(
        &self,
        addresses: &'a [Address],
        filter: &FilterState,
        lists: ListScope<'_>,
    ) -> Vec<FilteredAddress<'a>> {
        let needle = filter.search_term.to_lowercase();

        addresses
            .iter()
            .filter(|address| matches_search(address, &needle))
            .filter(|address| matches_status(address, &filter.status_set))
            .filter(|address| matches_equals(address, filter))
            .filter(|address| matches_parity(&address.house_number, filter.parity_mode))
            .filter(|address| matches_lists(address, filter.assignment_mode, lists))
            .map(|address| self.annotate(address, filter))
            .collect()
    }

    fn annotate<'a>(&self, address: &'a Address, filter: &FilterState) -> FilteredAddress<'a> {
        if !filter.has_status_filter() {
            return FilteredAddress {
                address,
                visible_unit_count: None,
                visible_potential_count: None,
            };
        }

        let visible: Vec<&UnitStatus> = address
            .units
            .iter()
            .map(|unit| &unit.status)
            .filter(|status| filter.status_set.contains(*status))
            .collect();
        let potential = visible
            .iter()
            .filter(|status| self.potential_statuses.contains(**status))
            .count();

        FilteredAddress {
            address,
            visible_unit_count: Some(visible.len()),
            visible_potential_count: Some(potential),
        }
    }
}

fn matches_search(address: &Address, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        &address.street,
        &address.house_number,
        &address.postal_code,
        &address.city,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn matches_status(address: &Address, statuses: &BTreeSet<UnitStatus>) -> bool {
    statuses.is_empty()
        || address
            .units
            .iter()
            .any(|unit| statuses.contains(&unit.status))
}

fn matches_equals(address: &Address, filter: &FilterState) -> bool {
    let equals = |wanted: &Option<String>, actual: &str| {
        wanted.as_deref().map_or(true, |wanted| wanted == actual)
    };
    equals(&filter.street_equals, &address.street)
        && equals(&filter.city_equals, &address.city)
        && equals(&filter.postal_code_equals, &address.postal_code)
        && equals(&filter.house_number_equals, &address.house_number)
}

/// Integer house number, or `None` for values like "4a" or "".
pub fn parse_house_number(house_number: &str) -> Option<i64> {
    house_number.trim().parse().ok()
}

fn matches_parity(house_number: &str, parity: ParityMode) -> bool {
    match parity {
        ParityMode::All => true,
        ParityMode::Even => parse_house_number(house_number).is_some_and(|n| n % 2 == 0),
        ParityMode::Odd => parse_house_number(house_number).is_some_and(|n| n % 2 != 0),
    }
}

fn matches_lists(address: &Address, mode: AssignmentMode, lists: ListScope<'_>) -> bool {
    if let Some(focus) = lists.focus {
        return focus.contains(&address.id);
    }
    match mode {
        AssignmentMode::All => true,
        // both modes currently mean "no list membership at all"
        AssignmentMode::Unassigned | AssignmentMode::NoList => {
            !lists.memberships.is_member(&address.id)
        }
    }
}

/// Distinct values for the equality-filter pickers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub streets: BTreeSet<String>,
    pub cities: BTreeSet<String>,
    pub postal_codes: BTreeSet<String>,
    pub statuses: BTreeSet<UnitStatus>,
}

impl FilterOptions {
    pub fn from_addresses(addresses: &[Address]) -> Self {
        let mut options = Self::default();
        for address in addresses {
            insert_non_empty(&mut options.streets, &address.street);
            insert_non_empty(&mut options.cities, &address.city);
            insert_non_empty(&mut options.postal_codes, &address.postal_code);
            options
                .statuses
                .extend(address.units.iter().map(|unit| unit.status.clone()));
        }
        options
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

/// Aggregates over every address, including ones the map cannot place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub address_count: usize,
    pub unit_count: usize,
    pub unplaceable_count: usize,
    pub by_status: BTreeMap<UnitStatus, usize>,
}

impl StatusSummary {
    pub fn from_addresses<'a, I: IntoIterator<Item = &'a Address>>(addresses: I) -> Self {
        let mut summary = Self::default();
        for address in addresses {
            summary.address_count += 1;
            summary.unit_count += address.units.len();
            if !address.is_placeable() {
                summary.unplaceable_count += 1;
            }
            for unit in &address.units {
                *summary.by_status.entry(unit.status.clone()).or_insert(0) += 1;
            }
        }
        summary
    }
}
