//! Dataset discovery and loading.
//!
//! Two layouts are supported inside a data directory:
//!
//! - `network.json`: a snapshot of finalized airport and route records,
//!   validated strictly by [`Network::new`].
//! - `airports.dat` + `routes.dat`: OpenFlights exports. Rows the network
//!   would reject (unknown endpoints, self loops, duplicates, multi-stop
//!   routes) are dropped here and counted in the logs.
//!
//! An optional `populations.csv` (`code,population`) supplies the population
//! attribute used for sampling.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::network::{Airport, Network, RouteRecord};

/// Environment variable overriding the default data directory.
pub const DATA_DIR_ENV: &str = "FLIGHTNET_DATA_DIR";
pub const SNAPSHOT_FILE: &str = "network.json";
pub const AIRPORTS_FILE: &str = "airports.dat";
pub const ROUTES_FILE: &str = "routes.dat";
pub const POPULATIONS_FILE: &str = "populations.csv";

/// OpenFlights marker for a missing value.
const NULL_FIELD: &str = "\\N";

/// Airport and route records ready to be turned into a [`Network`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkData {
    pub airports: Vec<Airport>,
    pub routes: Vec<RouteRecord>,
}

impl NetworkData {
    /// Attach populations by airport code, returning how many airports matched.
    pub fn apply_populations(&mut self, populations: &HashMap<String, u64>) -> usize {
        let mut matched = 0;
        for airport in &mut self.airports {
            if let Some(population) = populations.get(&airport.code) {
                airport.population = Some(*population);
                matched += 1;
            }
        }
        matched
    }

    pub fn into_network(self) -> Result<Network> {
        Network::new(self.airports, self.routes)
    }
}

/// Resolve the data directory: explicit path, then `FLIGHTNET_DATA_DIR`, then
/// the platform data directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let candidate = if let Some(path) = explicit {
        path.to_path_buf()
    } else if let Some(env_path) = env::var_os(DATA_DIR_ENV) {
        PathBuf::from(env_path)
    } else {
        ProjectDirs::from("", "", "flightnet")
            .ok_or(Error::ProjectDirsUnavailable)?
            .data_dir()
            .to_path_buf()
    };

    if candidate.is_dir() {
        Ok(candidate)
    } else {
        Err(Error::DatasetNotFound { path: candidate })
    }
}

/// Load and build the network stored in `dir`.
pub fn load_network(dir: &Path) -> Result<Network> {
    let snapshot = dir.join(SNAPSHOT_FILE);
    let airports = dir.join(AIRPORTS_FILE);
    let routes = dir.join(ROUTES_FILE);

    let mut data = if snapshot.is_file() {
        load_snapshot(&snapshot)?
    } else if airports.is_file() && routes.is_file() {
        load_openflights(&airports, &routes)?
    } else {
        let missing = if airports.is_file() { routes } else { airports };
        return Err(Error::DatasetNotFound { path: missing });
    };

    let populations = dir.join(POPULATIONS_FILE);
    if populations.is_file() {
        let table = load_populations(&populations)?;
        let matched = data.apply_populations(&table);
        debug!(matched, entries = table.len(), "applied population table");
    }

    let network = data.into_network()?;
    info!(
        path = %dir.display(),
        airports = network.len(),
        routes = network.route_count(),
        "loaded flight network"
    );
    Ok(network)
}

/// Read a JSON snapshot of airport and route records.
pub fn load_snapshot(path: &Path) -> Result<NetworkData> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Read OpenFlights `airports.dat` and `routes.dat` exports.
pub fn load_openflights(airports_path: &Path, routes_path: &Path) -> Result<NetworkData> {
    let airports = read_openflights_airports(File::open(airports_path)?)?;
    let known: HashSet<&str> = airports.iter().map(|a| a.code.as_str()).collect();
    let routes = read_openflights_routes(File::open(routes_path)?, &known)?;
    Ok(NetworkData { airports, routes })
}

/// Parse OpenFlights airport rows.
///
/// Rows without an IATA code or with unusable coordinates are skipped; for
/// repeated codes the first row wins.
pub fn read_openflights_airports<R: Read>(reader: R) -> Result<Vec<Airport>> {
    let mut csv_reader = openflights_reader(reader);
    let mut airports = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        match parse_airport(&row) {
            Some(airport) if seen.insert(airport.code.clone()) => airports.push(airport),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped airport rows without a usable code or coordinates");
    }
    Ok(airports)
}

/// Parse OpenFlights route rows, keeping nonstop routes between `known` airports.
pub fn read_openflights_routes<R: Read>(
    reader: R,
    known: &HashSet<&str>,
) -> Result<Vec<RouteRecord>> {
    let mut csv_reader = openflights_reader(reader);
    let mut routes = Vec::new();
    let mut seen = HashSet::new();
    let mut unknown = 0usize;
    let mut rejected = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        let Some(record) = parse_route(&row) else {
            rejected += 1;
            continue;
        };
        if !known.contains(record.source.as_str()) || !known.contains(record.destination.as_str())
        {
            unknown += 1;
            continue;
        }
        if record.source == record.destination || !seen.insert(record.clone()) {
            rejected += 1;
            continue;
        }
        routes.push(record);
    }

    if unknown > 0 || rejected > 0 {
        warn!(
            unknown_endpoints = unknown,
            rejected, "skipped route rows the network cannot represent"
        );
    }
    Ok(routes)
}

#[derive(Debug, Deserialize)]
struct PopulationRow {
    code: String,
    population: u64,
}

/// Read a `code,population` table with a header row.
pub fn load_populations(path: &Path) -> Result<HashMap<String, u64>> {
    read_populations(File::open(path)?)
}

pub fn read_populations<R: Read>(reader: R) -> Result<HashMap<String, u64>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut table = HashMap::new();
    for row in csv_reader.deserialize::<PopulationRow>() {
        let row = row?;
        if table.insert(row.code.clone(), row.population).is_some() {
            return Err(Error::DatasetValidation {
                message: format!("population listed twice for {}", row.code),
            });
        }
    }
    Ok(table)
}

fn openflights_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

fn field(row: &StringRecord, index: usize) -> Option<&str> {
    row.get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != NULL_FIELD)
}

// id, name, city, country, IATA, ICAO, latitude, longitude, ...
fn parse_airport(row: &StringRecord) -> Option<Airport> {
    let code = field(row, 4)?;
    let latitude: f64 = field(row, 6)?.parse().ok()?;
    let longitude: f64 = field(row, 7)?.parse().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(
        Airport::new(code, latitude, longitude)
            .with_name(field(row, 1).unwrap_or_default())
            .with_location(
                field(row, 2).unwrap_or_default(),
                field(row, 3).unwrap_or_default(),
            ),
    )
}

// airline, airline id, source, source id, destination, destination id, codeshare, stops, equipment
fn parse_route(row: &StringRecord) -> Option<RouteRecord> {
    let source = field(row, 2)?;
    let destination = field(row, 4)?;
    if field(row, 7).is_some_and(|stops| stops != "0") {
        return None;
    }
    let airline = field(row, 0).or_else(|| field(row, 1)).unwrap_or("N/A");
    Some(RouteRecord::new(source, destination, airline))
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIRPORTS: &str = r#"507,"London Heathrow Airport","London","United Kingdom","LHR","EGLL",51.4706,-0.461941,83,0,"E","Europe/London","airport","OurAirports"
3797,"John F Kennedy International Airport","New York","United States","JFK","KJFK",40.63980103,-73.77890015,13,-5,"A","America/New_York","airport","OurAirports"
9999,"No Code Field","Nowhere","Nowhere",\N,"XXXX",1.0,1.0,0,0,"U","\N","airport","OurAirports"
1,"Broken Latitude","Nowhere","Nowhere","BRK","BRKN",not-a-number,1.0,0,0,"U","\N","airport","OurAirports"
"#;

    const ROUTES: &str = "BA,1355,LHR,507,JFK,3797,,0,744\n\
        BA,1355,LHR,507,JFK,3797,,0,777\n\
        AA,24,JFK,3797,LHR,507,Y,0,777\n\
        XX,1,LHR,507,ZZZ,1,,0,320\n\
        XX,1,LHR,507,LHR,507,,0,320\n\
        YY,2,JFK,3797,LHR,507,,1,320\n";

    #[test]
    fn airports_without_code_or_coordinates_are_skipped() {
        let airports = read_openflights_airports(AIRPORTS.as_bytes()).unwrap();
        let codes: Vec<_> = airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["LHR", "JFK"]);
        assert_eq!(airports[0].name, "London Heathrow Airport");
        assert_eq!(airports[0].city, "London");
        assert_eq!(airports[0].population, None);
    }

    #[test]
    fn routes_are_cleaned_for_network_construction() {
        let known: HashSet<&str> = ["LHR", "JFK"].into_iter().collect();
        let routes = read_openflights_routes(ROUTES.as_bytes(), &known).unwrap();
        assert_eq!(
            routes,
            vec![
                RouteRecord::new("LHR", "JFK", "BA"),
                RouteRecord::new("JFK", "LHR", "AA"),
            ]
        );
    }

    #[test]
    fn populations_table_is_keyed_by_code() {
        let table = read_populations("code,population\nLHR, 8900000\nJFK,8300000\n".as_bytes())
            .unwrap();
        assert_eq!(table.get("LHR"), Some(&8_900_000));

        let mut data = NetworkData {
            airports: read_openflights_airports(AIRPORTS.as_bytes()).unwrap(),
            routes: Vec::new(),
        };
        assert_eq!(data.apply_populations(&table), 2);
        assert_eq!(data.airports[1].population, Some(8_300_000));
    }

    #[test]
    fn repeated_population_rows_are_rejected() {
        let err = read_populations("code,population\nLHR,1\nLHR,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::DatasetValidation { .. }));
    }
}
