#![allow(clippy::too_many_lines)]
//! Static city-to-county table.
//!
//! Keys are uppercase, whitespace-collapsed city names. Every Connecticut
//! town is listed exactly once under its county, followed by villages and
//! post-office names that appear in registration and station addresses.
//!
//! Names shared across counties are decided here, never at lookup time:
//! `SHELTON` belongs to Fairfield.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// The 169 Connecticut towns, grouped by county. A town appears once.
const COUNTY_TOWNS: &[(&str, &[&str])] = &[
    (
        "Fairfield",
        &[
            "BETHEL",
            "BRIDGEPORT",
            "BROOKFIELD",
            "DANBURY",
            "DARIEN",
            "EASTON",
            "FAIRFIELD",
            "GREENWICH",
            "MONROE",
            "NEW CANAAN",
            "NEW FAIRFIELD",
            "NEWTOWN",
            "NORWALK",
            "REDDING",
            "RIDGEFIELD",
            "SHELTON",
            "SHERMAN",
            "STAMFORD",
            "STRATFORD",
            "TRUMBULL",
            "WESTON",
            "WESTPORT",
            "WILTON",
        ],
    ),
    (
        "Hartford",
        &[
            "AVON",
            "BERLIN",
            "BLOOMFIELD",
            "BRISTOL",
            "BURLINGTON",
            "CANTON",
            "EAST GRANBY",
            "EAST HARTFORD",
            "EAST WINDSOR",
            "ENFIELD",
            "FARMINGTON",
            "GLASTONBURY",
            "GRANBY",
            "HARTFORD",
            "HARTLAND",
            "MANCHESTER",
            "MARLBOROUGH",
            "NEW BRITAIN",
            "NEWINGTON",
            "PLAINVILLE",
            "ROCKY HILL",
            "SIMSBURY",
            "SOUTH WINDSOR",
            "SOUTHINGTON",
            "SUFFIELD",
            "WEST HARTFORD",
            "WETHERSFIELD",
            "WINDSOR",
            "WINDSOR LOCKS",
        ],
    ),
    (
        "Litchfield",
        &[
            "BARKHAMSTED",
            "BETHLEHEM",
            "BRIDGEWATER",
            "CANAAN",
            "COLEBROOK",
            "CORNWALL",
            "GOSHEN",
            "HARWINTON",
            "KENT",
            "LITCHFIELD",
            "MORRIS",
            "NEW HARTFORD",
            "NEW MILFORD",
            "NORFOLK",
            "NORTH CANAAN",
            "PLYMOUTH",
            "ROXBURY",
            "SALISBURY",
            "SHARON",
            "THOMASTON",
            "TORRINGTON",
            "WARREN",
            "WASHINGTON",
            "WATERTOWN",
            "WINCHESTER",
            "WOODBURY",
        ],
    ),
    (
        "Middlesex",
        &[
            "CHESTER",
            "CLINTON",
            "CROMWELL",
            "DEEP RIVER",
            "DURHAM",
            "EAST HADDAM",
            "EAST HAMPTON",
            "ESSEX",
            "HADDAM",
            "KILLINGWORTH",
            "MIDDLEFIELD",
            "MIDDLETOWN",
            "OLD SAYBROOK",
            "PORTLAND",
            "WESTBROOK",
        ],
    ),
    (
        "New Haven",
        &[
            "ANSONIA",
            "BEACON FALLS",
            "BETHANY",
            "BRANFORD",
            "CHESHIRE",
            "DERBY",
            "EAST HAVEN",
            "GUILFORD",
            "HAMDEN",
            "MADISON",
            "MERIDEN",
            "MIDDLEBURY",
            "MILFORD",
            "NAUGATUCK",
            "NEW HAVEN",
            "NORTH BRANFORD",
            "NORTH HAVEN",
            "ORANGE",
            "OXFORD",
            "PROSPECT",
            "SEYMOUR",
            "SOUTHBURY",
            "WALLINGFORD",
            "WATERBURY",
            "WEST HAVEN",
            "WOLCOTT",
            "WOODBRIDGE",
        ],
    ),
    (
        "New London",
        &[
            "BOZRAH",
            "COLCHESTER",
            "EAST LYME",
            "FRANKLIN",
            "GRISWOLD",
            "GROTON",
            "LEBANON",
            "LEDYARD",
            "LISBON",
            "LYME",
            "MONTVILLE",
            "NEW LONDON",
            "NORTH STONINGTON",
            "NORWICH",
            "OLD LYME",
            "PRESTON",
            "SALEM",
            "SPRAGUE",
            "STONINGTON",
            "VOLUNTOWN",
            "WATERFORD",
        ],
    ),
    (
        "Tolland",
        &[
            "ANDOVER",
            "BOLTON",
            "COLUMBIA",
            "COVENTRY",
            "ELLINGTON",
            "HEBRON",
            "MANSFIELD",
            "SOMERS",
            "STAFFORD",
            "TOLLAND",
            "UNION",
            "VERNON",
            "WILLINGTON",
        ],
    ),
    (
        "Windham",
        &[
            "ASHFORD",
            "BROOKLYN",
            "CANTERBURY",
            "CHAPLIN",
            "EASTFORD",
            "HAMPTON",
            "KILLINGLY",
            "PLAINFIELD",
            "POMFRET",
            "PUTNAM",
            "SCOTLAND",
            "STERLING",
            "THOMPSON",
            "WINDHAM",
            "WOODSTOCK",
        ],
    ),
];

/// Villages and post-office names mapped to the county of their town.
const VILLAGES: &[(&str, &str)] = &[
    ("COS COB", "Fairfield"),
    ("GEORGETOWN", "Fairfield"),
    ("OLD GREENWICH", "Fairfield"),
    ("RIVERSIDE", "Fairfield"),
    ("SANDY HOOK", "Fairfield"),
    ("SOUTHPORT", "Fairfield"),
    ("WEST REDDING", "Fairfield"),
    ("BROAD BROOK", "Hartford"),
    ("COLLINSVILLE", "Hartford"),
    ("KENSINGTON", "Hartford"),
    ("MARION", "Hartford"),
    ("MILLDALE", "Hartford"),
    ("NORTH GRANBY", "Hartford"),
    ("PLANTSVILLE", "Hartford"),
    ("SOUTH GLASTONBURY", "Hartford"),
    ("TARIFFVILLE", "Hartford"),
    ("UNIONVILLE", "Hartford"),
    ("WAREHOUSE POINT", "Hartford"),
    ("WEATOGUE", "Hartford"),
    ("WEST GRANBY", "Hartford"),
    ("WEST SIMSBURY", "Hartford"),
    ("WEST SUFFIELD", "Hartford"),
    ("FALLS VILLAGE", "Litchfield"),
    ("LAKEVILLE", "Litchfield"),
    ("OAKVILLE", "Litchfield"),
    ("PINE MEADOW", "Litchfield"),
    ("TERRYVILLE", "Litchfield"),
    ("WASHINGTON DEPOT", "Litchfield"),
    ("WINSTED", "Litchfield"),
    ("CENTERBROOK", "Middlesex"),
    ("HIGGANUM", "Middlesex"),
    ("IVORYTON", "Middlesex"),
    ("MOODUS", "Middlesex"),
    ("ROCKFALL", "Middlesex"),
    ("NORTHFORD", "New Haven"),
    ("YALESVILLE", "New Haven"),
    ("BALTIC", "New London"),
    ("GALES FERRY", "New London"),
    ("JEWETT CITY", "New London"),
    ("MYSTIC", "New London"),
    ("NIANTIC", "New London"),
    ("OAKDALE", "New London"),
    ("PAWCATUCK", "New London"),
    ("QUAKER HILL", "New London"),
    ("UNCASVILLE", "New London"),
    ("MANSFIELD CENTER", "Tolland"),
    ("ROCKVILLE", "Tolland"),
    ("STAFFORD SPRINGS", "Tolland"),
    ("STORRS", "Tolland"),
    ("STORRS MANSFIELD", "Tolland"),
    ("VERNON ROCKVILLE", "Tolland"),
    ("DANIELSON", "Windham"),
    ("DAYVILLE", "Windham"),
    ("MOOSUP", "Windham"),
    ("NORTH GROSVENORDALE", "Windham"),
    ("POMFRET CENTER", "Windham"),
    ("WILLIMANTIC", "Windham"),
];

static GLOBAL: LazyLock<CityCountyMap> = LazyLock::new(|| {
    let map = CityCountyMap::from_tables(COUNTY_TOWNS, VILLAGES);
    log::debug!("Built city-to-county table with {} entries", map.len());
    map
});

/// Immutable lookup from normalized city name to canonical county name.
#[derive(Debug, Clone)]
pub struct CityCountyMap {
    entries: BTreeMap<&'static str, &'static str>,
}

impl CityCountyMap {
    /// Returns the process-wide Connecticut table.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Builds a map from `(county, towns)` groups plus `(village, county)`
    /// aliases.
    ///
    /// If a name is listed more than once, the first listing wins and a
    /// warning is logged. Towns are inserted before villages.
    #[must_use]
    pub fn from_tables(
        towns: &[(&'static str, &[&'static str])],
        villages: &[(&'static str, &'static str)],
    ) -> Self {
        let mut entries = BTreeMap::new();

        let pairs = towns
            .iter()
            .flat_map(|(county, cities)| cities.iter().map(move |city| (*city, *county)))
            .chain(villages.iter().copied());

        for (city, county) in pairs {
            if let Some(existing) = entries.get(city) {
                log::warn!("{city} listed under both {existing} and {county}; keeping {existing}");
                continue;
            }
            entries.insert(city, county);
        }

        Self { entries }
    }

    /// Resolves a free-text city name to its canonical county.
    ///
    /// Lookup ignores case and surrounding whitespace, and collapses
    /// internal runs of whitespace. Returns `None` for unmapped cities.
    #[must_use]
    pub fn resolve(&self, city: &str) -> Option<&'static str> {
        let key = normalize_city_key(city);
        if key.is_empty() {
            return None;
        }
        self.entries.get(key.as_str()).copied()
    }

    /// Returns the mapped names (towns and villages) of `county`, in key
    /// order.
    #[must_use]
    pub fn cities_in(&self, county: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, c)| **c == county)
            .map(|(city, _)| *city)
            .collect()
    }

    /// Number of mapped names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalizes a city name into a lookup key: uppercase, trimmed, single
/// spaces between words.
#[must_use]
pub fn normalize_city_key(city: &str) -> String {
    city.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
