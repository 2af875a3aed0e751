use super::ui;
use crate::aggregator::{RateAggregator, consensus};
use crate::core::{Quote, REFERENCE_ASSET, RateError};
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

pub struct RateLookup {
    pub currency: String,
    pub rate: Result<f64, RateError>,
    pub quotes: Vec<Quote>,
}

/// Upper-cases and de-duplicates the requested codes, keeping their order.
pub fn normalize_currencies(currencies: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(currencies.len());
    for currency in currencies {
        let currency = currency.trim().to_uppercase();
        if !currency.is_empty() && !normalized.contains(&currency) {
            normalized.push(currency);
        }
    }
    normalized
}

pub async fn lookup_rates(
    aggregator: &RateAggregator,
    currencies: &[String],
    cancel: &CancellationToken,
) -> Vec<RateLookup> {
    let futures = currencies.iter().map(|currency| async move {
        let quotes = aggregator.fetch_quotes(currency, cancel).await;
        RateLookup {
            currency: currency.clone(),
            rate: consensus(currency, &quotes),
            quotes,
        }
    });
    join_all(futures).await
}

pub fn display_rates(lookups: &[RateLookup]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per {REFERENCE_ASSET})")),
        ui::header_cell("Sources"),
    ]);

    for lookup in lookups {
        let sources = lookup
            .quotes
            .iter()
            .map(|q| {
                if q.price().is_some() {
                    q.source.to_string()
                } else {
                    ui::style_text(q.source.as_str(), ui::StyleType::Subtle)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let rate = match &lookup.rate {
            Ok(rate) => ui::rate_cell(*rate),
            Err(e) => ui::error_cell(&e.to_string()),
        };
        table.add_row(vec![Cell::new(&lookup.currency), rate, Cell::new(sources)]);
    }

    table.to_string()
}

pub fn display_quotes(lookups: &[RateLookup]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Source"),
        ui::header_cell("Price"),
        ui::header_cell("Error"),
        ui::header_cell("Fetched (UTC)"),
    ]);

    for lookup in lookups {
        for quote in &lookup.quotes {
            let (price, error) = match &quote.outcome {
                Ok(price) => (ui::rate_cell(*price), Cell::new("")),
                Err(e) => (ui::na_cell(), ui::error_cell(&e.to_string())),
            };
            table.add_row(vec![
                Cell::new(&lookup.currency),
                Cell::new(quote.source),
                price,
                error,
                Cell::new(quote.fetched_at.format("%H:%M:%S")),
            ]);
        }
    }

    table.to_string()
}

/// Looks up and prints the rates. Fails only if no currency could be priced.
pub async fn run(
    aggregator: &RateAggregator,
    currencies: &[String],
    show_sources: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let currencies = normalize_currencies(currencies);
    if currencies.is_empty() {
        anyhow::bail!("No currency given");
    }

    let lookups = lookup_rates(aggregator, &currencies, cancel).await;

    println!("{}", ui::style_text("Rates", ui::StyleType::Title));
    println!("{}", display_rates(&lookups));
    if show_sources {
        println!("\n{}", ui::style_text("Quotes", ui::StyleType::Title));
        println!("{}", display_quotes(&lookups));
    }

    if lookups.iter().all(|l| l.rate.is_err()) {
        anyhow::bail!("No rate available for {}", currencies.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FetchError, SourceId};

    #[test]
    fn test_normalize_currencies() {
        let input = vec![
            "ngn".to_string(),
            " KES ".to_string(),
            "NGN".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_currencies(&input), vec!["NGN", "KES"]);
    }

    #[test]
    fn test_display_rates_and_quotes() {
        let lookups = vec![
            RateLookup {
                currency: "KES".to_string(),
                rate: Ok(145.5),
                quotes: vec![
                    Quote::new(SourceId::Binance, Ok(145.5)),
                    Quote::new(SourceId::Bitget, Ok(145.5)),
                ],
            },
            RateLookup {
                currency: "GHS".to_string(),
                rate: Err(RateError::NoValidRate {
                    currency: "GHS".to_string(),
                }),
                quotes: vec![Quote::new(SourceId::Binance, Err(FetchError::EmptyData))],
            },
        ];

        let rates = display_rates(&lookups);
        assert!(rates.contains("KES"));
        assert!(rates.contains("145.50"));
        assert!(rates.contains("GHS"));

        let quotes = display_quotes(&lookups);
        assert!(quotes.contains("binance"));
        assert!(quotes.contains("bitget"));
    }
}
