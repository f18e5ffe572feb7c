use crate::core::filter::FilteredAddress;
use crate::core::store::MembershipIndex;
use crate::domain::model::{Address, AddressId};
use crate::domain::view::{MarkerColor, MarkerDescriptor, PopupContent, PopupUnit};
use std::collections::HashMap;

/// Marker colors for one recompute pass, resolved up front.
#[derive(Debug, Clone)]
pub struct ColorResolver {
    neutral: String,
    assigned: HashMap<AddressId, (MarkerColor, Option<String>)>,
}

impl ColorResolver {
    pub fn resolve<'a, I>(memberships: &MembershipIndex, addresses: I, neutral: &str) -> Self
    where
        I: IntoIterator<Item = &'a Address>,
    {
        let assigned = addresses
            .into_iter()
            .filter_map(|address| {
                let preferred = memberships.preferred(&address.id)?;
                let color = MarkerColor::AssignedTo {
                    list_id: preferred.list_id.clone(),
                    color: preferred.list_color.clone(),
                };
                Some((address.id.clone(), (color, preferred.list_name.clone())))
            })
            .collect();

        Self {
            neutral: neutral.to_string(),
            assigned,
        }
    }

    pub fn color_for(&self, address_id: &str) -> MarkerColor {
        self.assigned
            .get(address_id)
            .map(|(color, _)| color.clone())
            .unwrap_or(MarkerColor::Unassigned)
    }

    pub fn list_name_for(&self, address_id: &str) -> Option<&str> {
        self.assigned
            .get(address_id)
            .and_then(|(_, name)| name.as_deref())
    }

    pub fn paint<'a>(&'a self, color: &'a MarkerColor) -> &'a str {
        match color {
            MarkerColor::Unassigned => &self.neutral,
            MarkerColor::AssignedTo { color, .. } => color,
        }
    }
}

/// Holds the current marker set. Every recompute tears the old set down and
/// rebuilds it from scratch.
#[derive(Debug, Default)]
pub struct MarkerRenderer {
    markers: Vec<MarkerDescriptor>,
    passes: u64,
}

impl MarkerRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recompute(
        &mut self,
        addresses: &[FilteredAddress<'_>],
        colors: &ColorResolver,
    ) -> &[MarkerDescriptor] {
        self.markers = addresses
            .iter()
            .filter(|filtered| filtered.address.is_placeable())
            .map(|filtered| describe(filtered, colors))
            .collect();
        self.passes += 1;
        tracing::debug!(
            "Marker pass {}: {} markers from {} addresses",
            self.passes,
            self.markers.len(),
            addresses.len()
        );
        &self.markers
    }

    pub fn markers(&self) -> &[MarkerDescriptor] {
        &self.markers
    }

    pub fn find(&self, address_id: &str) -> Option<&MarkerDescriptor> {
        self.markers
            .iter()
            .find(|marker| marker.address_id == address_id)
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

fn describe(filtered: &FilteredAddress<'_>, colors: &ColorResolver) -> MarkerDescriptor {
    let address = filtered.address;
    let assignment = colors.color_for(&address.id);
    MarkerDescriptor {
        address_id: address.id.clone(),
        position: address.coordinates,
        color: colors.paint(&assignment).to_string(),
        label: filtered.unit_count(),
        popup: PopupContent {
            title: address.street_line(),
            subtitle: format!("{} {}", address.postal_code, address.city)
                .trim()
                .to_string(),
            list_name: colors.list_name_for(&address.id).map(str::to_string),
            units: address
                .units
                .iter()
                .map(|unit| PopupUnit {
                    floor: unit.floor.clone(),
                    position: unit.position.clone(),
                    status: unit.status.clone(),
                })
                .collect(),
        },
        assignment,
    }
}
