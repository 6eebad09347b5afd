pub mod error;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod parse;
pub mod query;
pub mod table;
pub mod window;

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use error::FlightError;
use fetch::Transport;
use model::{AirportCode, FlightRecord};
use query::{AvailabilityQuery, Endpoints};
use window::{DateRange, DateWindow};

/// Notified by the multi-destination search each time a destination finishes.
pub trait Progress: Sync {
    fn destination_done(&self, destination: &AirportCode, done: usize, total: usize);
}

/// Progress sink that discards updates.
pub struct Silent;

impl Progress for Silent {
    fn destination_done(&self, _destination: &AirportCode, _done: usize, _total: usize) {}
}

/// Client for the airline's public route and availability endpoints.
///
/// Cloning is cheap; clones share the transport.
pub struct Scraper<T> {
    transport: Arc<T>,
    endpoints: Arc<Endpoints>,
}

impl<T> Clone for Scraper<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            endpoints: Arc::clone(&self.endpoints),
        }
    }
}

impl<T: Transport> Scraper<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport: Arc::new(transport),
            endpoints: Arc::new(endpoints),
        }
    }

    /// Airports directly reachable from `origin`, in the order the upstream lists them.
    pub async fn discover_connections(
        &self,
        origin: &AirportCode,
    ) -> Result<Vec<AirportCode>, FlightError> {
        let url = self.endpoints.airports_url();
        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|e| e.during(format!("discovering connections from {origin}")))?;
        let airports = parse::parse_airports(&body)
            .map_err(|e| e.during(format!("discovering connections from {origin}")))?;

        let connections = parse::connections_from(&airports, origin);
        info!(%origin, count = connections.len(), "discovered connections");
        Ok(connections)
    }

    /// Flights for one route within a single window (one upstream request).
    pub async fn fetch_flights(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        window: DateWindow,
    ) -> Result<Vec<FlightRecord>, FlightError> {
        let operation = || format!("fetching {origin} -> {destination} for {window}");
        let query = AvailabilityQuery {
            origin: origin.clone(),
            destination: destination.clone(),
            window,
        };
        let url = self.endpoints.availability_url(&query);

        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|e| e.during(operation()))?;
        let records = parse::parse_flights(&body).map_err(|e| e.during(operation()))?;

        debug!(%origin, %destination, %window, flights = records.len(), "window fetched");
        Ok(records)
    }

    /// Flights for one route over the whole range, in window order.
    pub async fn fetch_all_flights(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        range: DateRange,
    ) -> Result<Vec<FlightRecord>, FlightError> {
        let windows = range.windows();
        debug!(
            %origin,
            %destination,
            start = %range.start(),
            end = %range.end(),
            windows = windows.len(),
            "planned date windows"
        );

        let mut records = Vec::new();
        for window in windows {
            records.extend(self.fetch_flights(origin, destination, window).await?);
        }
        Ok(records)
    }
}

impl<T: Transport + 'static> Scraper<T> {
    /// Flights to every destination reachable from `origin`, concatenated in
    /// discovery order.
    ///
    /// With `concurrency > 1` up to that many destinations are fetched at once;
    /// output order is still discovery order. The first failure aborts the rest.
    pub async fn fetch_all_flights_from_airport(
        &self,
        origin: &AirportCode,
        range: DateRange,
        concurrency: usize,
        progress: &dyn Progress,
    ) -> Result<Vec<FlightRecord>, FlightError> {
        if concurrency == 0 {
            return Err(FlightError::Validation(
                "concurrency must be at least 1".into(),
            ));
        }

        let destinations = self.discover_connections(origin).await?;
        let total = destinations.len();

        if concurrency == 1 {
            let mut records = Vec::new();
            for (i, destination) in destinations.iter().enumerate() {
                records.extend(self.fetch_all_flights(origin, destination, range).await?);
                progress.destination_done(destination, i + 1, total);
            }
            return Ok(records);
        }

        let mut slots: Vec<Option<Vec<FlightRecord>>> = vec![None; total];
        let mut join_set = JoinSet::new();
        let mut done = 0;
        let mut pending = destinations.iter().cloned().enumerate();

        loop {
            while join_set.len() < concurrency {
                let Some((index, destination)) = pending.next() else {
                    break;
                };
                let scraper = self.clone();
                let origin = origin.clone();
                join_set.spawn(async move {
                    let result = scraper.fetch_all_flights(&origin, &destination, range).await;
                    (index, destination, result)
                });
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            let (index, destination, result) = match joined {
                Ok(output) => output,
                Err(e) => std::panic::resume_unwind(e.into_panic()),
            };

            match result {
                Ok(records) => {
                    slots[index] = Some(records);
                    done += 1;
                    progress.destination_done(&destination, done, total);
                }
                Err(e) => {
                    join_set.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(slots.into_iter().flatten().flatten().collect())
    }
}
