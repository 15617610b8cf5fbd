//! Console rendering and CSV export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Duration;

use pulse_core::{AggregateRow, AssetDescriptor, ExchangeCatalog};
use pulse_services::{CycleReport, ObservationStore};

/// Print one cycle's aggregate table to stdout.
pub fn print_cycle(report: &CycleReport) {
    println!();
    println!(
        "cycle {} | {} candidates, {} skipped | +{} new observations ({} total)",
        report.cycle,
        report.candidates.len(),
        report.skipped.len(),
        report.merged_new,
        report.store_size
    );

    if let Some(countries) = &report.available_countries {
        println!("no exchanges matched the country filter; available countries:");
        for country in countries {
            println!("  {}", country);
        }
        return;
    }

    for (exchange, reason) in &report.skipped {
        println!("  skipped {}: {}", exchange, reason);
    }

    if report.rows.is_empty() {
        println!("  (no observations yet)");
        return;
    }

    let mut rows: Vec<&AggregateRow> = report.rows.iter().collect();
    rows.sort_by(|a, b| b.volume_share_pct.cmp(&a.volume_share_pct));

    println!(
        "{:<16} {:>4} {:>14} {:>14} {:>8} {:>10} {:>10}  {}",
        "EXCHANGE", "OBS", "PRICE", "VOLUME", "SPREAD%", "VOL SHARE%", "SPAN", "LAST TRADE"
    );
    for row in rows {
        println!(
            "{:<16} {:>4} {:>14.4} {:>14.4} {:>8.2} {:>10} {:>10}  {}",
            row.exchange_id,
            row.num_observations,
            row.last_price_mean,
            row.last_volume_mean,
            row.spread_mean,
            row.volume_share_pct
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
            format_span(row.trade_time_span),
            row.trade_time_last.format("%Y-%m-%d %H:%M:%S"),
        );
    }
}

/// Print the exchange catalog, volume-ranked.
pub fn print_catalog(catalog: &ExchangeCatalog) {
    println!(
        "{:<24} {:<28} {:<24} {:>16}",
        "ID", "NAME", "COUNTRY", "24H VOL (BTC)"
    );
    for exchange in catalog.iter() {
        println!(
            "{:<24} {:<28} {:<24} {:>16}",
            exchange.id,
            exchange.name,
            exchange.country.as_deref().unwrap_or("-"),
            exchange
                .trade_volume_24h_btc
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

/// Print the top-assets listing.
pub fn print_assets(assets: &[AssetDescriptor]) {
    println!("{:<12} {:<24} {}", "SYMBOL", "ID", "NAME");
    for asset in assets {
        println!(
            "{:<12} {:<24} {}",
            asset.symbol.to_uppercase(),
            asset.id,
            asset.name
        );
    }
}

/// Write the accumulated observations as CSV, one row per observation.
pub fn write_observations_csv(path: &Path, store: &ObservationStore) -> io::Result<usize> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(
        writer,
        "exchange,last_price,last_volume,bid_ask_spread_pct,trade_time"
    )?;

    let mut observations: Vec<_> = store.iter().collect();
    observations.sort_by(|a, b| {
        (&a.exchange_id, a.trade_time).cmp(&(&b.exchange_id, b.trade_time))
    });

    for obs in &observations {
        writeln!(
            writer,
            "{},{},{},{},{}",
            obs.exchange_id,
            obs.last_price,
            obs.last_volume,
            obs.bid_ask_spread_pct,
            obs.trade_time.to_rfc3339()
        )?;
    }

    writer.flush()?;
    Ok(observations.len())
}

fn format_span(span: Duration) -> String {
    let total_secs = span.num_seconds();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}h{:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
