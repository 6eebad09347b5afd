use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::FlightError;

/// Three-letter uppercase IATA airport code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn parse(code: &str) -> Result<Self, FlightError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(FlightError::InvalidAirport(code.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for AirportCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareCategory {
    Adult,
    Teen,
    Child,
}

impl FareCategory {
    pub const ALL: [FareCategory; 3] = [Self::Adult, Self::Teen, Self::Child];

    /// Maps the upstream passenger type tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ADT" => Some(Self::Adult),
            "TEEN" => Some(Self::Teen),
            "CHD" => Some(Self::Child),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Adult => "ADT",
            Self::Teen => "TEEN",
            Self::Child => "CHD",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Adult => "Adults",
            Self::Teen => "Teens",
            Self::Child => "Children",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareQuote {
    pub published: f64,
    pub discounted: f64,
}

impl FareQuote {
    /// The discounted amount, only when it is strictly below the published fare.
    pub fn discount(&self) -> Option<f64> {
        (self.discounted < self.published).then_some(self.discounted)
    }
}

/// One slot per passenger category. `None` means the upstream sent no fare line
/// for that category, which is distinct from a zero-priced fare.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fares {
    pub adult: Option<FareQuote>,
    pub teen: Option<FareQuote>,
    pub child: Option<FareQuote>,
}

impl Fares {
    pub fn get(&self, category: FareCategory) -> Option<&FareQuote> {
        match category {
            FareCategory::Adult => self.adult.as_ref(),
            FareCategory::Teen => self.teen.as_ref(),
            FareCategory::Child => self.child.as_ref(),
        }
    }

    pub fn set(&mut self, category: FareCategory, quote: FareQuote) {
        let slot = match category {
            FareCategory::Adult => &mut self.adult,
            FareCategory::Teen => &mut self.teen,
            FareCategory::Child => &mut self.child,
        };
        *slot = Some(quote);
    }

    pub fn is_sold_out(&self) -> bool {
        self.adult.is_none() && self.teen.is_none() && self.child.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    pub origin: Airport,
    pub destination: Airport,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub flight_number: String,
    pub duration: String,
    pub fares: Fares,
    pub currency: Option<String>,
}
