use crate::domain::model::{AssignmentMode, FilterState, ListId, LngLat, ParityMode, UnitStatus};
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_lng_lat, validate_path, validate_required_field, Validate,
};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliParity {
    All,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliAssignment {
    All,
    Unassigned,
    NoList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// Marker descriptors after filtering and focus
    Markers,
    /// Addresses inside --polygon, in store order
    Selection,
    /// Per-status unit counts over all addresses
    Summary,
    /// Distinct street/city/postal code values
    Options,
    /// Every command the map surface received
    Commands,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "lauflisten-map")]
#[command(about = "Inspect canvassing addresses the way the live map shows them")]
pub struct CliConfig {
    /// Address export (JSON array of addresses with nested units)
    #[arg(long)]
    pub addresses: String,

    /// List export (JSON array of Lauflisten with member address ids)
    #[arg(long)]
    pub lists: Option<String>,

    /// Map configuration (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = "")]
    pub search: String,

    /// Unit statuses, comma separated (e.g. potenzial,termin)
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,

    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub house_number: Option<String>,

    #[arg(long, value_enum, default_value = "all")]
    pub parity: CliParity,

    #[arg(long, value_enum, default_value = "all")]
    pub assignment: CliAssignment,

    /// Focus these list ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<ListId>,

    /// Polygon ring as "lng,lat;lng,lat;lng,lat"
    #[arg(long)]
    pub polygon: Option<String>,

    /// Fit as if the list sidebar were docked
    #[arg(long)]
    pub sidebar: bool,

    #[arg(long, value_enum, default_value = "markers")]
    pub output: OutputKind,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            search_term: self.search.clone(),
            status_set: self
                .status
                .iter()
                .filter(|s| !s.trim().is_empty())
                .filter_map(|s| s.parse::<UnitStatus>().ok())
                .collect(),
            street_equals: self.street.clone(),
            city_equals: self.city.clone(),
            postal_code_equals: self.postal_code.clone(),
            house_number_equals: self.house_number.clone(),
            parity_mode: match self.parity {
                CliParity::All => ParityMode::All,
                CliParity::Even => ParityMode::Even,
                CliParity::Odd => ParityMode::Odd,
            },
            assignment_mode: match self.assignment {
                CliAssignment::All => AssignmentMode::All,
                CliAssignment::Unassigned => AssignmentMode::Unassigned,
                CliAssignment::NoList => AssignmentMode::NoList,
            },
        }
    }

    pub fn polygon_ring(&self) -> Result<Option<Vec<LngLat>>> {
        self.polygon.as_deref().map(parse_ring).transpose()
    }
}

/// 解析 "lng,lat;lng,lat;..." 格式的多邊形頂點
pub fn parse_ring(raw: &str) -> Result<Vec<LngLat>> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let invalid = |reason: &str| MapError::InvalidConfigValueError {
                field: "polygon".to_string(),
                value: pair.to_string(),
                reason: reason.to_string(),
            };
            let (lng, lat) = pair
                .split_once(',')
                .ok_or_else(|| invalid("expected lng,lat"))?;
            let lng: f64 = lng.trim().parse().map_err(|_| invalid("longitude is not a number"))?;
            let lat: f64 = lat.trim().parse().map_err(|_| invalid("latitude is not a number"))?;
            Ok(LngLat::new(lng, lat))
        })
        .collect()
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("addresses", &self.addresses)?;
        validate_file_extension("addresses", &self.addresses, &["json"])?;
        if let Some(lists) = &self.lists {
            validate_path("lists", lists)?;
            validate_file_extension("lists", lists, &["json"])?;
        }
        if let Some(config) = &self.config {
            validate_path("config", config)?;
            validate_file_extension("config", config, &["toml"])?;
        }
        if self.output == OutputKind::Selection {
            validate_required_field("polygon", &self.polygon)?;
        }
        for vertex in self.polygon_ring()?.unwrap_or_default() {
            validate_lng_lat("polygon", vertex)?;
        }
        Ok(())
    }
}
