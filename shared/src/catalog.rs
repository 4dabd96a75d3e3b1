use serde::{Deserialize, Serialize};

/// Category of a redistricting plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapCategory {
    Current,
    Compact,
    Proportional,
    Competitive,
    Minority,
    DemAdvantage,
    GopAdvantage,
}

impl MapCategory {
    pub const ALL: [MapCategory; 7] = [
        MapCategory::Current,
        MapCategory::Compact,
        MapCategory::Proportional,
        MapCategory::Competitive,
        MapCategory::Minority,
        MapCategory::DemAdvantage,
        MapCategory::GopAdvantage,
    ];

    pub const fn title(&self) -> &'static str {
        match self {
            MapCategory::Current => "Current Map",
            MapCategory::Compact => "Compact Map",
            MapCategory::Proportional => "Proportional Map",
            MapCategory::Competitive => "Competitive Map",
            MapCategory::Minority => "Majority-Minority Optimized",
            MapCategory::DemAdvantage => "Democratic Advantage",
            MapCategory::GopAdvantage => "Republican Advantage",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            MapCategory::Current => "The official congressional plan used as a baseline.",
            MapCategory::Compact => "Districts optimized for geometric compactness.",
            MapCategory::Proportional => "Seats proportional to the statewide vote share.",
            MapCategory::Competitive => "Maximizes the number of highly competitive seats.",
            MapCategory::Minority => "Prioritizes minority opportunity districts.",
            MapCategory::DemAdvantage => "Illustrates a Democratic-optimized gerrymander.",
            MapCategory::GopAdvantage => "Illustrates a Republican-optimized gerrymander.",
        }
    }

    /// Wire identifier, matching the `map_type` column of the stat tables.
    pub const fn slug(&self) -> &'static str {
        match self {
            MapCategory::Current => "current",
            MapCategory::Compact => "compact",
            MapCategory::Proportional => "proportional",
            MapCategory::Competitive => "competitive",
            MapCategory::Minority => "minority",
            MapCategory::DemAdvantage => "dem-advantage",
            MapCategory::GopAdvantage => "gop-advantage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapLevel {
    National,
    State,
}

/// One selectable map, binding a boundary file to its category and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub category: MapCategory,
    pub level: MapLevel,
    pub state: Option<&'static str>,
    pub boundary_path: &'static str,
}

impl MapDescriptor {
    pub const fn description(&self) -> &'static str {
        self.category.description()
    }
}

pub const CATALOG: [MapDescriptor; 4] = [
    MapDescriptor {
        id: "national-current",
        title: "National – Current map",
        category: MapCategory::Current,
        level: MapLevel::National,
        state: None,
        boundary_path: "/maps/national_current.geojson",
    },
    MapDescriptor {
        id: "national-compact",
        title: "National – Compact map",
        category: MapCategory::Compact,
        level: MapLevel::National,
        state: None,
        boundary_path: "/maps/national_compact.geojson",
    },
    MapDescriptor {
        id: "example-west-current",
        title: "Example West – Current map",
        category: MapCategory::Current,
        level: MapLevel::State,
        state: Some("Example West"),
        boundary_path: "/maps/example-west_current.geojson",
    },
    MapDescriptor {
        id: "example-west-compact",
        title: "Example West – Compact map",
        category: MapCategory::Compact,
        level: MapLevel::State,
        state: Some("Example West"),
        boundary_path: "/maps/example-west_compact.geojson",
    },
];

pub fn find(id: &str) -> Option<&'static MapDescriptor> {
    CATALOG.iter().find(|descriptor| descriptor.id == id)
}

pub fn national_maps() -> Vec<&'static MapDescriptor> {
    CATALOG
        .iter()
        .filter(|descriptor| descriptor.level == MapLevel::National)
        .collect()
}

pub fn maps_for_state(state: &str) -> Vec<&'static MapDescriptor> {
    CATALOG
        .iter()
        .filter(|descriptor| descriptor.level == MapLevel::State && descriptor.state == Some(state))
        .collect()
}
