//! # Star name resolution
//!
//! A [`NameResolver`] turns a host-star name (e.g. `"WASP-39"`, `"HD 189733"`) into ICRS
//! coordinates. [`SesameResolver`] asks the CDS Sesame service, restricted to Simbad,
//! for its plain-text answer and reads the `%J` line:
//!
//! ```text
//! %J 217.32663183 -03.44450097 = 14:29:18.39 -03:26:40.2
//! ```
//!
//! The decimal pair is used when present; otherwise the sexagesimal pair after `=` is
//! converted.
//!
//! Unknown names, as well as an unreachable or timed-out service, surface as
//! [`TransitError::NotFound`].
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::constants::{Degree, SESAME_URL};
use crate::http_client::HttpClient;
use crate::transit_errors::TransitError;
use crate::visibility::SkyCoord;

static SESAME_J_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^%J\s+(?:([-+]?\d+(?:\.\d*)?)\s+([-+]?\d+(?:\.\d*)?))?\s*(?:=\s*(\S+)\s+(\S+))?",
    )
    .unwrap()
});

/// Resolves a star name to sky coordinates.
pub trait NameResolver {
    fn resolve_coordinates(&self, star_name: &str) -> Result<SkyCoord, TransitError>;
}

/// CDS Sesame name resolver.
#[derive(Debug, Clone)]
pub struct SesameResolver {
    client: HttpClient,
    base_url: String,
}

impl Default for SesameResolver {
    fn default() -> Self {
        Self::new(HttpClient::default(), SESAME_URL)
    }
}

impl SesameResolver {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        SesameResolver {
            client,
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, star_name: &str) -> Result<Url, TransitError> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_query(Some(star_name.trim()));
        Ok(url)
    }
}

impl NameResolver for SesameResolver {
    fn resolve_coordinates(&self, star_name: &str) -> Result<SkyCoord, TransitError> {
        let url = self.request_url(star_name)?;
        let answer = self.client.get_text(url.as_str()).map_err(|e| {
            TransitError::NotFound(format!("{star_name} (name resolver unavailable: {e})"))
        })?;

        parse_sesame_answer(&answer)
            .ok_or_else(|| TransitError::NotFound(star_name.to_string()))
    }
}

/// Extract the coordinates of a Sesame plain-text answer, `None` if nothing was found.
pub fn parse_sesame_answer(answer: &str) -> Option<SkyCoord> {
    let caps = SESAME_J_LINE.captures(answer)?;

    let decimal = caps.get(1).zip(caps.get(2)).and_then(|(ra, dec)| {
        Some((
            ra.as_str().parse::<f64>().ok()?,
            dec.as_str().parse::<f64>().ok()?,
        ))
    });

    let (ra, dec) = match decimal {
        Some(pair) => pair,
        None => {
            let (ra, dec) = caps.get(3).zip(caps.get(4))?;
            (
                parse_sexagesimal(ra.as_str())? * 15.0,
                parse_sexagesimal(dec.as_str())?,
            )
        }
    };
    SkyCoord::new(ra, dec).ok()
}

/// Parse `dd:mm:ss.s` / `dd mm ss.s` (or hours) into decimal units.
///
/// The sign of the first field applies to the whole value, so `-00:30:00` is `-0.5`.
pub fn parse_sexagesimal(s: &str) -> Option<Degree> {
    let s = s.trim();
    let negative = s.starts_with('-');
    let fields: Vec<f64> = s
        .trim_start_matches(['+', '-'])
        .split([':', ' '])
        .filter(|f| !f.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;

    if fields.is_empty() || fields.len() > 3 {
        return None;
    }
    let value = fields
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(v, scale)| v / scale)
        .sum::<f64>();

    Some(if negative { -value } else { value })
}
