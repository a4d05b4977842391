#![allow(dead_code)]
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use exotransit::catalog::{CatalogQuery, CatalogService};
use exotransit::config::LookupConfig;
use exotransit::lookup::{LocationInput, TransitLookup};
use exotransit::resolver::NameResolver;
use exotransit::transit_errors::TransitError;
use exotransit::visibility::{
    ObserverLocation, SkyCoord, VisibilityConstraints, VisibilityEvaluator,
};
use hifitime::Epoch;

pub const WASP39_RA: f64 = 217.32663183;
pub const WASP39_DEC: f64 = -3.44450097;

pub const COORDINATES_CSV: &str = "pl_name,ra,dec\n\
    HD 189733 b,300.1821223,22.7097759\n\
    WASP-39 b,217.3266477,-3.4444994\n\
    51 Peg b,344.3665854,20.7688446\n";

/// Resolves every name to the same coordinates, or to nothing.
pub struct FixedResolver {
    pub coords: Option<SkyCoord>,
    pub calls: Rc<Cell<usize>>,
}

impl FixedResolver {
    pub fn at(ra: f64, dec: f64) -> Self {
        FixedResolver {
            coords: Some(SkyCoord::new(ra, dec).unwrap()),
            calls: Rc::default(),
        }
    }

    pub fn unknown() -> Self {
        FixedResolver {
            coords: None,
            calls: Rc::default(),
        }
    }
}

impl NameResolver for FixedResolver {
    fn resolve_coordinates(&self, star_name: &str) -> Result<SkyCoord, TransitError> {
        self.calls.set(self.calls.get() + 1);
        self.coords
            .ok_or_else(|| TransitError::NotFound(star_name.to_string()))
    }
}

/// Answers coordinate queries and ephemeris queries with canned CSV bodies.
pub struct CannedCatalog {
    pub coordinates: String,
    pub ephemerides: String,
    pub queries: Rc<RefCell<Vec<String>>>,
}

impl CannedCatalog {
    pub fn new(ephemerides: &str) -> Self {
        CannedCatalog {
            coordinates: COORDINATES_CSV.to_string(),
            ephemerides: ephemerides.to_string(),
            queries: Rc::default(),
        }
    }
}

impl CatalogService for CannedCatalog {
    fn fetch(&self, query: &CatalogQuery) -> Result<String, TransitError> {
        self.queries.borrow_mut().push(query.statement());
        if query.columns.iter().any(|c| c == "ra") {
            Ok(self.coordinates.clone())
        } else {
            Ok(self.ephemerides.clone())
        }
    }
}

/// Catalog that always times out.
pub struct UnreachableCatalog;

impl CatalogService for UnreachableCatalog {
    fn fetch(&self, query: &CatalogQuery) -> Result<String, TransitError> {
        Err(TransitError::CatalogQuery {
            query: query.statement(),
            reason: "timed out".into(),
        })
    }
}

/// Evaluator with a fixed answer for the one-year pre-check and a visibility window
/// starting at `visible_from` for the per-transit checks.
pub struct ScriptedEvaluator {
    pub ever_observable: bool,
    pub visible_from: Option<Epoch>,
    pub range_calls: Rc<Cell<usize>>,
    pub instant_calls: Rc<Cell<usize>>,
}

impl ScriptedEvaluator {
    pub fn always_visible() -> Self {
        Self::visible_from(Some(Epoch::from_jde_tdb(0.0)))
    }

    pub fn never_visible() -> Self {
        ScriptedEvaluator {
            ever_observable: false,
            ..Self::visible_from(None)
        }
    }

    pub fn visible_from(from: Option<Epoch>) -> Self {
        ScriptedEvaluator {
            ever_observable: true,
            visible_from: from,
            range_calls: Rc::default(),
            instant_calls: Rc::default(),
        }
    }
}

impl VisibilityEvaluator for ScriptedEvaluator {
    fn is_observable_at(
        &self,
        _target: &SkyCoord,
        _location: &ObserverLocation,
        time: Epoch,
        _constraints: &VisibilityConstraints,
    ) -> Result<bool, TransitError> {
        self.instant_calls.set(self.instant_calls.get() + 1);
        Ok(self.visible_from.is_some_and(|from| time >= from))
    }

    fn is_ever_observable(
        &self,
        _target: &SkyCoord,
        _location: &ObserverLocation,
        _start: Epoch,
        _end: Epoch,
        _constraints: &VisibilityConstraints,
    ) -> Result<bool, TransitError> {
        self.range_calls.set(self.range_calls.get() + 1);
        Ok(self.ever_observable)
    }
}

pub fn lookup_with(
    resolver: FixedResolver,
    catalog: impl CatalogService + 'static,
    evaluator: ScriptedEvaluator,
) -> TransitLookup {
    TransitLookup::with_services(
        Box::new(resolver),
        Box::new(catalog),
        Box::new(evaluator),
        LookupConfig::default(),
    )
    .expect("default configuration is valid")
}

/// Roque de los Muchachos observatory.
pub fn la_palma() -> LocationInput {
    LocationInput::Triple(vec![-17.8792, 28.7606, 2396.0])
}
