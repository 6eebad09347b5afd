use farescan::error::FlightError;
use farescan::model::AirportCode;
use farescan::parse::{connections_from, parse_airports, parse_availability, parse_flights, parse_route};
use serde_json::{json, Value};

fn code(s: &str) -> AirportCode {
    AirportCode::parse(s).unwrap()
}

fn fare(tag: &str, published: f64, amount: f64) -> Value {
    json!({ "type": tag, "amount": amount, "publishedFare": published, "count": 1 })
}

fn flight(number: &str, dep: &str, arr: &str, fares: Vec<Value>) -> Value {
    json!({
        "flightNumber": number,
        "time": [dep, arr],
        "duration": "02:50",
        "faresLeft": 4,
        "regularFare": { "fareKey": "X", "fares": fares }
    })
}

fn availability(trips: Vec<Value>) -> String {
    json!({ "currency": "PLN", "currPrecision": 2, "trips": trips }).to_string()
}

fn trip(dates: Vec<Value>) -> Value {
    json!({
        "origin": "POZ",
        "originName": "Poznan",
        "destination": "ATH",
        "destinationName": "Athens",
        "dates": dates
    })
}

fn all_fares() -> Vec<Value> {
    vec![
        fare("TEEN", 120.0, 120.0),
        fare("CHD", 90.0, 60.0),
        fare("ADT", 120.0, 100.0),
    ]
}

#[test]
fn route_accepts_airport_tags_only() {
    assert_eq!(parse_route("airport:ATH"), Some(code("ATH")));
    assert_eq!(parse_route("city:ATHENS"), None);
    assert_eq!(parse_route("airport:poz"), None);
    assert_eq!(parse_route("country:gr"), None);
    assert_eq!(parse_route("airport:AT"), None);
}

#[test]
fn route_marker_may_appear_mid_tag() {
    assert_eq!(parse_route("xairport:ATH"), Some(code("ATH")));
    assert_eq!(parse_route("x|airport:ATH"), Some(code("ATH")));
    assert_eq!(parse_route(" airport:ATH"), Some(code("ATH")));
    assert_eq!(parse_route("multiairport:LON"), Some(code("LON")));
    assert_eq!(parse_route("connecting|airport:ATH"), Some(code("ATH")));
}

#[test]
fn first_valid_marker_wins() {
    assert_eq!(parse_route("airport:ath|airport:STN"), Some(code("STN")));
    assert_eq!(parse_route("airport:airport:BGY"), Some(code("BGY")));
    assert_eq!(parse_route("airport:DUB|airport:STN"), Some(code("DUB")));
    assert_eq!(parse_route("airport:żó"), None);
}

#[test]
fn route_ignores_text_after_code() {
    assert_eq!(parse_route("airport:ATHX"), Some(code("ATH")));
}

#[test]
fn connections_follow_route_order_without_dedup() {
    let body = json!({
        "airports": [
            { "iataCode": "STN", "routes": ["airport:DUB"] },
            {
                "iataCode": "POZ",
                "name": "Poznan",
                "routes": ["airport:ATH", "city:ATHENS", "airport:poz", "airport:STN", "airport:ATH"]
            }
        ]
    })
    .to_string();

    let airports = parse_airports(&body).unwrap();
    let found = connections_from(&airports, &code("POZ"));
    assert_eq!(found, vec![code("ATH"), code("STN"), code("ATH")]);
}

#[test]
fn unknown_airport_has_no_connections() {
    let body = json!({ "airports": [{ "iataCode": "STN", "routes": ["airport:DUB"] }] }).to_string();
    let airports = parse_airports(&body).unwrap();
    assert!(connections_from(&airports, &code("XXX")).is_empty());
}

#[test]
fn airport_without_routes_has_no_connections() {
    let body = json!({ "airports": [{ "iataCode": "POZ" }] }).to_string();
    let airports = parse_airports(&body).unwrap();
    assert!(connections_from(&airports, &code("POZ")).is_empty());
}

#[test]
fn airports_missing_list_is_schema_error() {
    let err = parse_airports(r#"{"countries": []}"#).unwrap_err();
    assert!(matches!(err, FlightError::Schema(_)));
}

#[test]
fn malformed_body_is_decode_error() {
    assert!(matches!(parse_airports("<html>"), Err(FlightError::Decode(_))));
    assert!(matches!(parse_flights("{\"trips\": ["), Err(FlightError::Decode(_))));
}

#[test]
fn empty_days_are_skipped() {
    let body = availability(vec![trip(vec![
        json!({ "dateOut": "2020-06-25T00:00:00.000", "flights": [] }),
        json!({
            "dateOut": "2020-06-26T00:00:00.000",
            "flights": [
                flight("FR 1", "2020-06-26T06:15:00.000", "2020-06-26T09:05:00.000", all_fares()),
                flight("FR 2", "2020-06-26T18:00:00.000", "2020-06-26T20:50:00.000", all_fares())
            ]
        }),
        json!({ "dateOut": "2020-06-27T00:00:00.000", "flights": [] }),
    ])]);

    let records = parse_flights(&body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].flight_number, "FR 1");
    assert_eq!(records[1].flight_number, "FR 2");
}

#[test]
fn trip_fields_are_copied_into_each_record() {
    let body = availability(vec![trip(vec![json!({
        "flights": [flight("FR 1", "2020-06-26T06:15:00.000", "2020-06-26T09:05:00.000", all_fares())]
    })])]);

    let records = parse_flights(&body).unwrap();
    let r = &records[0];
    assert_eq!(r.origin.code, "POZ");
    assert_eq!(r.origin.name, "Poznan");
    assert_eq!(r.destination.code, "ATH");
    assert_eq!(r.destination.name, "Athens");
    assert_eq!(r.duration, "02:50");
    assert_eq!(r.currency.as_deref(), Some("PLN"));
    assert_eq!(r.departure.to_string(), "2020-06-26 06:15:00");
    assert_eq!(r.arrival.to_string(), "2020-06-26 09:05:00");
}

#[test]
fn fare_lines_fill_matching_categories() {
    let body = availability(vec![trip(vec![json!({
        "flights": [flight("FR 1", "2020-06-26T06:15:00.000", "2020-06-26T09:05:00.000", all_fares())]
    })])]);

    let fares = &parse_flights(&body).unwrap()[0].fares;
    let adult = fares.adult.unwrap();
    assert_eq!(adult.published, 120.0);
    assert_eq!(adult.discounted, 100.0);
    assert_eq!(fares.teen.unwrap().published, 120.0);
    assert_eq!(fares.child.unwrap().discounted, 60.0);
}

#[test]
fn missing_category_is_unset_not_zero() {
    let fares = vec![fare("ADT", 0.0, 0.0), fare("INF", 50.0, 50.0)];
    let body = availability(vec![trip(vec![json!({
        "flights": [flight("FR 1", "2020-06-26T06:15:00.000", "2020-06-26T09:05:00.000", fares)]
    })])]);

    let record = &parse_flights(&body).unwrap()[0];
    assert_eq!(record.fares.adult.unwrap().published, 0.0);
    assert!(record.fares.teen.is_none());
    assert!(record.fares.child.is_none());
    assert!(!record.fares.is_sold_out());
}

#[test]
fn flight_without_regular_fare_is_sold_out() {
    let body = availability(vec![trip(vec![json!({
        "flights": [{
            "flightNumber": "FR 9",
            "time": ["2020-06-26T06:15:00.000", "2020-06-26T09:05:00.000"],
            "duration": "02:50",
            "faresLeft": 0
        }]
    })])]);

    let record = &parse_flights(&body).unwrap()[0];
    assert!(record.fares.is_sold_out());
}

#[test]
fn zero_trips_is_schema_error() {
    let err = parse_availability(&availability(vec![])).unwrap_err();
    assert!(matches!(err, FlightError::Schema(_)));
}

#[test]
fn multiple_trips_is_schema_error() {
    let err = parse_availability(&availability(vec![trip(vec![]), trip(vec![])])).unwrap_err();
    assert!(err.to_string().contains("exactly one trip, found 2"));
}

#[test]
fn missing_flight_number_is_schema_error() {
    let body = availability(vec![trip(vec![json!({
        "flights": [{
            "time": ["2020-06-26T06:15:00.000", "2020-06-26T09:05:00.000"],
            "duration": "02:50"
        }]
    })])]);
    let err = parse_flights(&body).unwrap_err();
    assert_eq!(err.kind(), "schema");
}

#[test]
fn time_pair_must_have_two_entries() {
    let body = availability(vec![trip(vec![json!({
        "flights": [{
            "flightNumber": "FR 1",
            "time": ["2020-06-26T06:15:00.000"],
            "duration": "02:50"
        }]
    })])]);
    assert!(matches!(parse_flights(&body), Err(FlightError::Schema(_))));
}

#[test]
fn missing_currency_is_allowed() {
    let body = json!({ "trips": [trip(vec![])] }).to_string();
    let availability = parse_availability(&body).unwrap();
    assert!(availability.currency.is_none());
    assert!(availability.trip.dates.is_empty());
}
