//! # Exoplanet catalog access (TAP)
//!
//! This module builds table queries for an exoplanet archive speaking the **Table
//! Access Protocol** (TAP), sends them through a [`CatalogService`], and parses the
//! comma-separated answer into column-typed rows with `csv` + `serde`.
//!
//! ## Query shape
//!
//! ```text
//! select <columns> from <table> [where <col> <op> <val> [and <col> <op> <val> ...]]
//! ```
//!
//! sent as `?query=...&format=csv` to the synchronous TAP endpoint. Constraints are
//! `(column, operator, value)` triples ANDed in order.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use exotransit::catalog::{query_catalog, CatalogQuery, EphemerisRow, ExoplanetArchive};
//!
//! let archive = ExoplanetArchive::default();
//! let query = CatalogQuery::new(["pl_name", "default_flag", "tran_flag", "pl_orbper", "pl_tranmid"])
//!     .constraint("pl_name", "=", "'WASP-39 b'");
//! let rows: Vec<EphemerisRow> = query_catalog(&archive, &query)?;
//! # Ok::<(), exotransit::transit_errors::TransitError>(())
//! ```
//!
//! ## Cross-matching
//!
//! [`cross_match`] associates resolved host-star coordinates with the closest catalog
//! entry. The distance is the plain Euclidean distance in (ra, dec) degrees, without
//! the `cos(dec)` factor: it is only meaningful for very close pairs.
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::constants::{
    Degree, EXOPLANET_ARCHIVE_TAP_URL, DEFAULT_QUERY_FORMAT, PLANETARY_SYSTEMS_TABLE,
};
use crate::diagnostics::{Advisory, Diagnostics};
use crate::http_client::HttpClient;
use crate::selector::CatalogRecord;
use crate::transit_errors::TransitError;
use crate::visibility::SkyCoord;

/// One `where` clause of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConstraint {
    pub column: String,
    pub operator: String,
    pub value: String,
}

/// A tabular query against the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub columns: Vec<String>,
    pub table: String,
    pub constraints: Vec<QueryConstraint>,
    pub format: String,
}

impl CatalogQuery {
    /// Query selecting `columns` from the planetary-systems table, as CSV.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CatalogQuery {
            columns: columns.into_iter().map(Into::into).collect(),
            table: PLANETARY_SYSTEMS_TABLE.to_string(),
            constraints: Vec::new(),
            format: DEFAULT_QUERY_FORMAT.to_string(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Append a `column operator value` clause, ANDed with the previous ones.
    pub fn constraint(
        mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.constraints.push(QueryConstraint {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        });
        self
    }

    /// The ADQL statement, e.g. `select pl_name,ra,dec from ps where default_flag = 1`.
    pub fn statement(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.iter().join(",")
        };
        let mut statement = format!("select {columns} from {}", self.table);
        if !self.constraints.is_empty() {
            let clauses = self
                .constraints
                .iter()
                .map(|c| format!("{} {} {}", c.column, c.operator, c.value))
                .join(" and ");
            statement.push_str(" where ");
            statement.push_str(&clauses);
        }
        statement
    }

    /// Full request URL against the TAP endpoint `base_url`.
    pub fn to_url(&self, base_url: &str) -> Result<Url, TransitError> {
        let mut url = Url::parse(base_url)?;
        url.query_pairs_mut()
            .append_pair("query", &self.statement())
            .append_pair("format", &self.format);
        Ok(url)
    }
}

/// Source of raw tabular answers.
pub trait CatalogService {
    /// Run `query` and return the raw comma-separated answer (header line first).
    ///
    /// Transport failures and timeouts are reported as [`TransitError::CatalogQuery`].
    fn fetch(&self, query: &CatalogQuery) -> Result<String, TransitError>;

    /// Human-readable descriptor of `query`, attached to errors.
    fn describe(&self, query: &CatalogQuery) -> String {
        query.statement()
    }
}

/// Run `query` on `service` and deserialize every row into `T`.
///
/// Empty CSV fields deserialize to `None` for `Option` columns.
///
/// Errors
/// ----------
/// * [`TransitError::CatalogQuery`] carrying the query descriptor, on transport or parse failure.
pub fn query_catalog<T, S>(service: &S, query: &CatalogQuery) -> Result<Vec<T>, TransitError>
where
    T: DeserializeOwned,
    S: CatalogService + ?Sized,
{
    let body = service.fetch(query)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| TransitError::catalog(service.describe(query), e)))
        .collect()
}

/// NASA Exoplanet Archive, synchronous TAP endpoint.
#[derive(Debug, Clone)]
pub struct ExoplanetArchive {
    client: HttpClient,
    base_url: String,
}

impl Default for ExoplanetArchive {
    fn default() -> Self {
        Self::new(HttpClient::default(), EXOPLANET_ARCHIVE_TAP_URL)
    }
}

impl ExoplanetArchive {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        ExoplanetArchive {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl CatalogService for ExoplanetArchive {
    fn fetch(&self, query: &CatalogQuery) -> Result<String, TransitError> {
        let url = query.to_url(&self.base_url)?;
        self.client
            .get_text(url.as_str())
            .map_err(|e| TransitError::catalog(url.as_str(), e))
    }

    fn describe(&self, query: &CatalogQuery) -> String {
        query
            .to_url(&self.base_url)
            .map(String::from)
            .unwrap_or_else(|_| query.statement())
    }
}

/// `pl_name, ra, dec` row of the default planet solutions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateRow {
    pub pl_name: String,
    pub ra: Degree,
    pub dec: Degree,
}

/// `pl_name, default_flag, tran_flag, pl_orbper, pl_tranmid` row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EphemerisRow {
    pub pl_name: String,
    pub default_flag: u8,
    pub tran_flag: u8,
    pub pl_orbper: Option<f64>,
    pub pl_tranmid: Option<f64>,
}

impl From<&EphemerisRow> for CatalogRecord {
    fn from(row: &EphemerisRow) -> Self {
        CatalogRecord {
            is_default: row.default_flag == 1,
            shows_transit: row.tran_flag == 1,
            period_days: row.pl_orbper,
            transit_epoch: row.pl_tranmid,
        }
    }
}

/// Query returning the coordinates of every default planet solution.
pub fn coordinates_query() -> CatalogQuery {
    CatalogQuery::new(["pl_name", "ra", "dec"]).constraint("default_flag", "=", "1")
}

/// Query returning every published ephemeris.
pub fn ephemerides_query() -> CatalogQuery {
    CatalogQuery::new([
        "pl_name",
        "default_flag",
        "tran_flag",
        "pl_orbper",
        "pl_tranmid",
    ])
}

/// Catalog records of one planet, in catalog order.
pub fn records_for_planet(rows: &[EphemerisRow], pl_name: &str) -> Vec<CatalogRecord> {
    rows.iter()
        .filter(|row| row.pl_name == pl_name)
        .map(CatalogRecord::from)
        .collect()
}

/// Result of [`cross_match`].
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMatch {
    pub pl_name: String,
    pub distance_deg: Degree,
}

/// Find the catalog entry closest to `coords`.
///
/// Arguments
/// -----------------
/// * `star_name`: the name the user asked for; when the matched planet name does not
///   contain it, an [`Advisory::AssumedAlias`] is recorded and the match is kept.
/// * `planet_designator`: planet letter; planets of one system share their host
///   coordinates, so among equally distant rows the one named `"<host> <designator>"`
///   is preferred.
/// * `coords`: resolved coordinates of the host star.
/// * `rows`: catalog coordinates.
/// * `diagnostics`: advisory sink.
///
/// Errors
/// ----------
/// * [`TransitError::CatalogQuery`] if `rows` holds no usable coordinates.
pub fn cross_match(
    star_name: &str,
    planet_designator: &str,
    coords: &SkyCoord,
    rows: &[CoordinateRow],
    diagnostics: &mut Diagnostics,
) -> Result<CrossMatch, TransitError> {
    let best = rows
        .iter()
        .map(|row| {
            let distance = ((row.ra - coords.ra_deg).powi(2) + (row.dec - coords.dec_deg).powi(2))
                .sqrt();
            (row, distance)
        })
        .filter(|(_, d)| d.is_finite())
        .min_by(|(row_a, a), (row_b, b)| {
            a.total_cmp(b).then_with(|| {
                is_sibling(row_b, planet_designator).cmp(&is_sibling(row_a, planet_designator))
            })
        })
        .ok_or_else(|| {
            TransitError::catalog(
                coordinates_query().statement(),
                "no catalog coordinates to cross-match against",
            )
        })?;

    let (row, distance_deg) = best;
    if !row.pl_name.contains(star_name) {
        diagnostics.push(Advisory::AssumedAlias {
            star_name: star_name.to_string(),
            matched: row.pl_name.clone(),
        });
    }
    log::debug!("cross-matched {star_name} to {} ({distance_deg:.2e} deg)", row.pl_name);

    Ok(CrossMatch {
        pl_name: row.pl_name.clone(),
        distance_deg,
    })
}

fn is_sibling(row: &CoordinateRow, planet_designator: &str) -> bool {
    row.pl_name
        .rsplit_once(' ')
        .is_some_and(|(_, letter)| letter == planet_designator)
}

#[cfg(test)]
mod catalog_test {
    use super::*;

    struct CannedCatalog(&'static str);

    impl CatalogService for CannedCatalog {
        fn fetch(&self, _query: &CatalogQuery) -> Result<String, TransitError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_statement() {
        let query = coordinates_query();
        assert_eq!(
            query.statement(),
            "select pl_name,ra,dec from ps where default_flag = 1"
        );

        let query = CatalogQuery::new(["pl_name"])
            .table("pscomppars")
            .constraint("ra", ">", "10")
            .constraint("dec", "<", "0");
        assert_eq!(
            query.statement(),
            "select pl_name from pscomppars where ra > 10 and dec < 0"
        );
        assert_eq!(
            CatalogQuery::new(Vec::<String>::new()).statement(),
            "select * from ps"
        );
    }

    #[test]
    fn test_to_url() {
        let url = coordinates_query()
            .to_url(EXOPLANET_ARCHIVE_TAP_URL)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://exoplanetarchive.ipac.caltech.edu/TAP/sync?query=select+pl_name%2Cra%2Cdec+from+ps+where+default_flag+%3D+1&format=csv"
        );
    }

    #[test]
    fn test_parse_ephemeris_rows_with_missing_values() {
        let catalog = CannedCatalog(
            "pl_name,default_flag,tran_flag,pl_orbper,pl_tranmid\n\
             WASP-39 b,1,1,4.0552941,2455342.9688\n\
             WASP-39 b,0,1,,2456401.39763\n\
             WASP-39 b,0,1,4.05528,\n",
        );
        let rows: Vec<EphemerisRow> = query_catalog(&catalog, &ephemerides_query()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].pl_orbper, None);
        assert_eq!(rows[2].pl_tranmid, None);

        let records = records_for_planet(&rows, "WASP-39 b");
        assert!(records[0].is_default && records[0].shows_transit);
        assert_eq!(records[0].period_days, Some(4.0552941));
    }

    #[test]
    fn test_parse_error_carries_query() {
        let catalog = CannedCatalog("pl_name,ra,dec\nfoo,not-a-number,1.0\n");
        let err = query_catalog::<CoordinateRow, _>(&catalog, &coordinates_query()).unwrap_err();
        match err {
            TransitError::CatalogQuery { query, .. } => {
                assert_eq!(query, coordinates_query().statement())
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_cross_match() {
        let rows = vec![
            CoordinateRow {
                pl_name: "HD 189733 b".into(),
                ra: 300.18,
                dec: 22.71,
            },
            CoordinateRow {
                pl_name: "WASP-39 b".into(),
                ra: 217.33,
                dec: -3.44,
            },
        ];
        let mut diagnostics = Diagnostics::new();
        let coords = SkyCoord::new(217.3266, -3.4445).unwrap();

        let matched = cross_match("WASP-39", "b", &coords, &rows, &mut diagnostics).unwrap();
        assert_eq!(matched.pl_name, "WASP-39 b");
        assert!(diagnostics.is_empty());

        let matched = cross_match("BD-03 3572", "b", &coords, &rows, &mut diagnostics).unwrap();
        assert_eq!(matched.pl_name, "WASP-39 b");
        assert_eq!(
            diagnostics.advisories(),
            &[Advisory::AssumedAlias {
                star_name: "BD-03 3572".into(),
                matched: "WASP-39 b".into()
            }]
        );
    }

    #[test]
    fn test_cross_match_empty() {
        let mut diagnostics = Diagnostics::new();
        let coords = SkyCoord::new(1.0, 1.0).unwrap();
        assert!(matches!(
            cross_match("X", "b", &coords, &[], &mut diagnostics),
            Err(TransitError::CatalogQuery { .. })
        ));
    }

    #[test]
    fn test_cross_match_multi_planet_system() {
        let rows: Vec<CoordinateRow> = ["b", "c", "d"]
            .iter()
            .map(|letter| CoordinateRow {
                pl_name: format!("TRAPPIST-1 {letter}"),
                ra: 346.6223,
                dec: -5.0413,
            })
            .collect();
        let mut diagnostics = Diagnostics::new();
        let coords = SkyCoord::new(346.6224, -5.0414).unwrap();

        let matched = cross_match("TRAPPIST-1", "c", &coords, &rows, &mut diagnostics).unwrap();
        assert_eq!(matched.pl_name, "TRAPPIST-1 c");

        let matched = cross_match("TRAPPIST-1", "z", &coords, &rows, &mut diagnostics).unwrap();
        assert_eq!(matched.pl_name, "TRAPPIST-1 b");
    }

    /// Nothing listens on the discard port of the loopback interface.
    const CLOSED_PORT_URL: &str = "http://127.0.0.1:9/";

    #[test]
    fn test_unreachable_archive_reports_query_url() {
        let client = HttpClient::new(std::time::Duration::from_secs(1));
        let archive = ExoplanetArchive::new(client, CLOSED_PORT_URL);

        let res: Result<Vec<CoordinateRow>, _> = query_catalog(&archive, &coordinates_query());

        match res {
            Err(TransitError::CatalogQuery { query, reason }) => {
                assert!(query.starts_with(CLOSED_PORT_URL));
                assert!(query.contains("query=select"));
                assert!(query.contains("format=csv"));
                assert!(!reason.is_empty());
            }
            other => panic!("expected a catalog query error, got {other:?}"),
        }
    }
}
