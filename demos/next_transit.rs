use std::env;

use exotransit::config::LookupConfig;
use exotransit::lookup::{LocationInput, TransitLookup, TransitRequest};
use exotransit::transit_errors::TransitError;

/// Print the next transit of a planet, optionally the next one visible from a site.
///
/// Usage:
///   next_transit <STAR> <PLANET> [--source catalog|none] [--period P --epoch T0]
///                [--site LON,LAT,ELEV] [--after TIME] [--config FILE.toml]
/// Examples:
///   RUST_LOG=info next_transit WASP-39 b --site -17.88,28.76,2396
///   next_transit Kepler-1 b --source none --period 2.47 --epoch 2454955.76
fn main() -> Result<(), TransitError> {
    env_logger::init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    let number = |name: &str| -> Result<Option<f64>, TransitError> {
        flag(name)
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|e| TransitError::InvalidArgument(format!("{name} {v}: {e}")))
            })
            .transpose()
    };

    let (star, planet) = match (args.first(), args.get(1)) {
        (Some(star), Some(planet)) if !star.starts_with("--") => (star.clone(), planet.clone()),
        _ => {
            eprintln!("usage: next_transit <STAR> <PLANET> [options]");
            return Err(TransitError::InvalidArgument(
                "a star name and a planet designator are required".into(),
            ));
        }
    };

    let config = match flag("--config") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| TransitError::InvalidConfig(format!("{path}: {e}")))?;
            LookupConfig::from_toml_str(&text)?
        }
        None => LookupConfig::default(),
    };

    let mut request = TransitRequest::new(star, planet);
    if let Some(source) = flag("--source") {
        request = request.source(source);
    }
    request.period_days = number("--period")?;
    request.epoch = number("--epoch")?;
    if let Some(site) = flag("--site") {
        let values = site
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TransitError::InvalidArgument(format!("--site {site}: {e}")))?;
        request = request.location(LocationInput::Triple(values));
    }
    if let Some(after) = flag("--after") {
        request = request.reference_time(after.as_str());
    }

    let lookup = TransitLookup::new(config)?;
    let report = lookup.find_next_transit(&request)?;

    println!("{report}");
    for advisory in &report.diagnostics {
        println!("  note: {advisory}");
    }
    Ok(())
}
