use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::{AirportCode, FareCategory, FareQuote, FlightRecord};

pub fn format_price(amount: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${amount:.2}"),
        "EUR" => format!("€{amount:.2}"),
        "GBP" => format!("£{amount:.2}"),
        "PLN" => format!("{amount:.2} zł"),
        "CZK" => format!("{amount:.2} Kč"),
        "HUF" => format!("{amount:.2} Ft"),
        "SEK" | "NOK" | "DKK" => format!("{amount:.2} kr"),
        "" => format!("{amount:.2}"),
        _ => format!("{amount:.2} {currency}"),
    }
}

/// Published price, plus the discounted price only when it is strictly lower.
pub fn format_fare(quote: Option<&FareQuote>, currency: &str) -> String {
    let Some(quote) = quote else {
        return "—".to_string();
    };
    let published = format_price(quote.published, currency);
    match quote.discount() {
        Some(discounted) => format!(
            "{published} / after discount: {}",
            format_price(discounted, currency)
        ),
        None => published,
    }
}

fn currency_for<'a>(record: &'a FlightRecord, currency: Option<&'a str>) -> &'a str {
    currency.or(record.currency.as_deref()).unwrap_or_default()
}

pub fn render(records: &[FlightRecord], currency: Option<&str>) -> String {
    let mut table = Table::new();
    let mut header = vec!["#", "Flight", "Route", "Depart", "Arrive", "Duration"];
    header.extend(FareCategory::ALL.iter().map(|c| c.label()));
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (i, record) in records.iter().enumerate() {
        let route = format!(
            "{} ({}) → {} ({})",
            record.origin.name, record.origin.code, record.destination.name, record.destination.code
        );
        let currency = currency_for(record, currency);
        let mut row = vec![
            (i + 1).to_string(),
            record.flight_number.clone(),
            route,
            record.departure.format("%Y-%m-%d %H:%M").to_string(),
            record.arrival.format("%Y-%m-%d %H:%M").to_string(),
            record.duration.clone(),
        ];
        row.extend(
            FareCategory::ALL
                .iter()
                .map(|&c| format_fare(record.fares.get(c), currency)),
        );
        table.add_row(row);
    }

    table.to_string()
}

/// One line per flight, for scripts.
pub fn format_compact(record: &FlightRecord, currency: Option<&str>) -> String {
    let currency = currency_for(record, currency);
    let fares = if record.fares.is_sold_out() {
        "sold out".to_string()
    } else {
        FareCategory::ALL
            .iter()
            .map(|&c| format!("{} {}", c.tag(), format_fare(record.fares.get(c), currency)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{} | {}>{} | {}>{} | {} | {}",
        record.flight_number,
        record.origin.code,
        record.destination.code,
        record.departure.format("%b%d %H:%M"),
        record.arrival.format("%H:%M"),
        record.duration,
        fares,
    )
}

pub fn render_connections(connections: &[AirportCode]) -> String {
    connections
        .iter()
        .enumerate()
        .map(|(i, code)| format!("{}. {code}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
