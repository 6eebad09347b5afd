use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{self, FlightError};
use crate::model::*;

const ROUTE_PREFIX: &str = "airport:";

#[derive(Debug, Deserialize)]
struct AirportsResponse {
    airports: Vec<AirportEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportEntry {
    pub iata_code: String,
    #[serde(default)]
    pub routes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    currency: Option<String>,
    trips: Vec<Trip>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub origin: String,
    pub origin_name: String,
    pub destination: String,
    pub destination_name: String,
    pub dates: Vec<TripDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripDate {
    pub flights: Vec<FlightOccurrence>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOccurrence {
    pub time: [NaiveDateTime; 2],
    pub duration: String,
    pub flight_number: String,
    pub regular_fare: Option<RegularFare>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegularFare {
    pub fares: Vec<FareLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareLine {
    #[serde(rename = "type")]
    pub category: String,
    pub amount: f64,
    pub published_fare: f64,
}

/// A decoded availability response: the single trip plus the currency it is priced in.
#[derive(Debug, Clone)]
pub struct Availability {
    pub currency: Option<String>,
    pub trip: Trip,
}

/// Extracts the airport code from a route tag such as `airport:ATH`.
///
/// The first `airport:` marker anywhere in the tag that is followed by three
/// uppercase letters wins; text around it is ignored. Other route kinds
/// (`city:`, `country:`, ...) yield `None`.
pub fn parse_route(route: &str) -> Option<AirportCode> {
    route.match_indices(ROUTE_PREFIX).find_map(|(at, _)| {
        let code = route.get(at + ROUTE_PREFIX.len()..)?.get(..3)?;
        AirportCode::parse(code).ok()
    })
}

pub fn parse_airports(body: &str) -> Result<Vec<AirportEntry>, FlightError> {
    let response: AirportsResponse = serde_json::from_str(body).map_err(error::from_json_error)?;
    Ok(response.airports)
}

/// Connections advertised for `origin`, in upstream order and without deduplication.
///
/// An airport missing from the list is not an error; it has no connections.
pub fn connections_from(airports: &[AirportEntry], origin: &AirportCode) -> Vec<AirportCode> {
    let Some(entry) = airports.iter().find(|a| *origin == a.iata_code.as_str()) else {
        warn!(%origin, "airport not found in route list");
        return Vec::new();
    };

    entry
        .routes
        .iter()
        .filter_map(|route| {
            let code = parse_route(route);
            if code.is_none() {
                debug!(%origin, %route, "skipping non-airport route");
            }
            code
        })
        .collect()
}

pub fn parse_availability(body: &str) -> Result<Availability, FlightError> {
    let response: AvailabilityResponse =
        serde_json::from_str(body).map_err(error::from_json_error)?;

    let count = response.trips.len();
    let mut trips = response.trips.into_iter();
    match (trips.next(), count) {
        (Some(trip), 1) => Ok(Availability {
            currency: response.currency,
            trip,
        }),
        _ => Err(FlightError::Schema(format!(
            "expected exactly one trip, found {count}"
        ))),
    }
}

fn collect_fares(regular: Option<&RegularFare>) -> Fares {
    let mut fares = Fares::default();
    let lines = regular.map(|r| r.fares.as_slice()).unwrap_or_default();

    for line in lines {
        match FareCategory::from_tag(&line.category) {
            Some(category) => fares.set(
                category,
                FareQuote {
                    published: line.published_fare,
                    discounted: line.amount,
                },
            ),
            None => debug!(tag = %line.category, "ignoring fare line with unknown passenger type"),
        }
    }

    fares
}

/// Flattens trip → day → flight into one record per flight occurrence.
///
/// Days without flights contribute nothing. Order follows the response.
pub fn flatten(availability: &Availability) -> Vec<FlightRecord> {
    let trip = &availability.trip;
    let origin = Airport {
        code: trip.origin.clone(),
        name: trip.origin_name.clone(),
    };
    let destination = Airport {
        code: trip.destination.clone(),
        name: trip.destination_name.clone(),
    };

    trip.dates
        .iter()
        .filter(|day| !day.flights.is_empty())
        .flat_map(|day| day.flights.iter())
        .map(|flight| {
            let [departure, arrival] = flight.time;
            FlightRecord {
                origin: origin.clone(),
                destination: destination.clone(),
                departure,
                arrival,
                flight_number: flight.flight_number.clone(),
                duration: flight.duration.clone(),
                fares: collect_fares(flight.regular_fare.as_ref()),
                currency: availability.currency.clone(),
            }
        })
        .collect()
}

pub fn parse_flights(body: &str) -> Result<Vec<FlightRecord>, FlightError> {
    let availability = parse_availability(body)?;
    Ok(flatten(&availability))
}
