#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lauflisten_map::domain::model::{Address, Laufliste, ListId, ListMembership, LngLat, Unit, UnitStatus};
use lauflisten_map::domain::ports::{MembershipResolver, Notifier};
use lauflisten_map::{InMemorySource, MapConfig, MapError, MapSession, RecordingSurface};
use std::sync::{Arc, Mutex};

pub const RED: &str = "#ef4444";
pub const BLUE: &str = "#3b82f6";

pub fn address(
    id: &str,
    street: &str,
    house_number: &str,
    city: &str,
    (lng, lat): (f64, f64),
    statuses: &[UnitStatus],
) -> Address {
    Address {
        id: id.to_string(),
        street: street.to_string(),
        house_number: house_number.to_string(),
        postal_code: if city == "Bonn" { "53111" } else { "50672" }.to_string(),
        city: city.to_string(),
        coordinates: LngLat::new(lng, lat),
        units: statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Unit {
                id: format!("{}-{}", id, i),
                floor: Some(format!("{}. OG", i)),
                position: None,
                status: status.clone(),
            })
            .collect(),
    }
}

/// Seven addresses around Köln-Ehrenfeld. a2, a3 and a5 sit inside
/// [`ehrenfeld_ring`]; a7 has no geocode.
pub fn addresses() -> Vec<Address> {
    use UnitStatus::*;
    vec![
        address("a1", "Hauptstraße", "1", "Köln", (6.900, 50.930), &[Potenzial]),
        address("a2", "Hauptstraße", "2", "Köln", (6.920, 50.940), &[Offen, KeinInteresse]),
        address("a3", "Venloer Straße", "3a", "Köln", (6.925, 50.945), &[Potenzial, Termin]),
        address("a4", "Bonner Straße", "4", "Bonn", (6.960, 50.960), &[Potenzial]),
        address("a5", "Venloer Straße", "8", "Köln", (6.930, 50.942), &[Neukunde]),
        address("a6", "Ringstraße", "11", "Köln", (6.880, 50.950), &[]),
        address("a7", "Hauptstraße", "5", "Köln", (0.0, 0.0), &[Potenzial]),
    ]
}

pub fn ehrenfeld_ring() -> Vec<LngLat> {
    vec![
        LngLat::new(6.91, 50.935),
        LngLat::new(6.94, 50.935),
        LngLat::new(6.94, 50.95),
        LngLat::new(6.91, 50.95),
    ]
}

/// L1 (red, March) holds a2 and a3. L2 (blue, April) holds a3 and a4.
pub fn lists() -> Vec<Laufliste> {
    vec![
        Laufliste {
            id: "L1".to_string(),
            name: Some("Ehrenfeld Nord".to_string()),
            color: RED.to_string(),
            assigned_to: Some("Mara".to_string()),
            member_address_ids: vec!["a2".to_string(), "a3".to_string()],
            assigned_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single(),
        },
        Laufliste {
            id: "L2".to_string(),
            name: Some("Ehrenfeld Süd".to_string()),
            color: BLUE.to_string(),
            assigned_to: Some("Jonas".to_string()),
            member_address_ids: vec!["a3".to_string(), "a4".to_string()],
            assigned_at: Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).single(),
        },
    ]
}

pub fn memberships() -> Vec<ListMembership> {
    lists().iter().flat_map(Laufliste::memberships).collect()
}

pub fn source() -> InMemorySource {
    InMemorySource::new(addresses(), lists())
}

pub fn ids(addresses: &[Address]) -> Vec<&str> {
    addresses.iter().map(|a| a.id.as_str()).collect()
}

/// Collects every reported failure.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    pub reports: Arc<Mutex<Vec<String>>>,
}

impl CollectingNotifier {
    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

impl Notifier for CollectingNotifier {
    fn report_error(&self, context: &str, error: &MapError) {
        self.reports
            .lock()
            .unwrap()
            .push(format!("{}: {}", context, error));
    }
}

/// Membership backend that is always down.
pub struct FailingResolver;

#[async_trait]
impl MembershipResolver for FailingResolver {
    async fn list_membership(&self, _list_ids: &[ListId]) -> lauflisten_map::Result<Vec<ListMembership>> {
        Err(MapError::membership("backend unavailable"))
    }
}

pub type TestSession = MapSession<RecordingSurface, CollectingNotifier>;

pub fn loaded_session() -> (TestSession, CollectingNotifier) {
    let notifier = CollectingNotifier::default();
    let mut session = MapSession::new(MapConfig::default(), RecordingSurface::new(), notifier.clone());
    session.load(addresses(), memberships());
    (session, notifier)
}
