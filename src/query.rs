use chrono::NaiveDate;

use crate::error::FlightError;
use crate::model::AirportCode;
use crate::window::DateWindow;

const DEFAULT_BASE_URL: &str = "https://www.ryanair.com";

/// Upstream locations. The availability `locale` segment decides the fare currency
/// (`pl-pl` yields PLN, `en-us` yields USD), so the presenter must agree with it.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub base_url: String,
    pub market: String,
    pub locale: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            market: "en-us".to_string(),
            locale: "pl-pl".to_string(),
        }
    }
}

impl Endpoints {
    pub fn airports_url(&self) -> String {
        format!(
            "{}/api/locate/4/common?embedded=airports,routes&market={}",
            self.base_url.trim_end_matches('/'),
            self.market
        )
    }

    pub fn availability_url(&self, query: &AvailabilityQuery) -> String {
        let params: Vec<String> = query
            .to_url_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!(
            "{}/api/booking/v4/{}/availability?{}",
            self.base_url.trim_end_matches('/'),
            self.locale,
            params.join("&")
        )
    }
}

/// One availability request: a single route over a single window.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub window: DateWindow,
}

impl AvailabilityQuery {
    /// The fixed one-adult, one-teen, one-child composition makes the upstream
    /// price every category in a single response.
    pub fn to_url_params(&self) -> Vec<(String, String)> {
        vec![
            ("ToUs".to_string(), "AGREED".to_string()),
            (
                "DateOut".to_string(),
                self.window.start.format("%Y-%m-%d").to_string(),
            ),
            ("Origin".to_string(), self.origin.to_string()),
            ("Destination".to_string(), self.destination.to_string()),
            ("FlexDaysOut".to_string(), self.window.span.to_string()),
            ("ADT".to_string(), "1".to_string()),
            ("TEEN".to_string(), "1".to_string()),
            ("CHD".to_string(), "1".to_string()),
        ]
    }
}

pub fn parse_date(date: &str) -> Result<NaiveDate, FlightError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| FlightError::InvalidDate(date.to_string()))
}

/// Normalises user input (`poz` becomes `POZ`) before validating it.
pub fn parse_airport(code: &str) -> Result<AirportCode, FlightError> {
    AirportCode::parse(&code.trim().to_uppercase())
}
