//! Query model
//!
//! Parses an inbound search payload into a validated, immutable
//! [`SearchQuery`]. Validation is total: either every constraint holds and a
//! fully formed query comes back, or a [`ValidationError`] enumerating every
//! violated field is returned. Nothing here performs I/O.

use serde::{Deserialize, Serialize};

/// Which listings a search targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Rental,
    Sale,
    #[default]
    Both,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rental => "rental",
            Self::Sale => "sale",
            Self::Both => "both",
        }
    }

    /// Whether a search of this type should include rental listings
    pub fn includes_rentals(&self) -> bool {
        matches!(self, Self::Rental | Self::Both)
    }

    /// Whether a search of this type should include sale listings
    pub fn includes_sales(&self) -> bool {
        matches!(self, Self::Sale | Self::Both)
    }
}

impl std::str::FromStr for ListingType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rental" => Ok(Self::Rental),
            "sale" => Ok(Self::Sale),
            "both" => Ok(Self::Both),
            _ => Err(()),
        }
    }
}

/// Property type filter values, named as the upstream providers name them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HomeType {
    Condo,
    SingleFamily,
    Townhouse,
    MultiFamily,
    Apartment,
    Manufactured,
    Lot,
}

impl HomeType {
    /// Provider-facing identifier (Zillow filter key)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Condo => "CONDO",
            Self::SingleFamily => "SINGLE_FAMILY",
            Self::Townhouse => "TOWNHOUSE",
            Self::MultiFamily => "MULTI_FAMILY",
            Self::Apartment => "APARTMENT",
            Self::Manufactured => "MANUFACTURED",
            Self::Lot => "LOT",
        }
    }
}

impl std::str::FromStr for HomeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONDO" => Ok(Self::Condo),
            "SINGLE_FAMILY" => Ok(Self::SingleFamily),
            "TOWNHOUSE" => Ok(Self::Townhouse),
            "MULTI_FAMILY" => Ok(Self::MultiFamily),
            "APARTMENT" => Ok(Self::Apartment),
            "MANUFACTURED" => Ok(Self::Manufactured),
            "LOT" => Ok(Self::Lot),
            _ => Err(()),
        }
    }
}

/// Raw inbound search payload, before validation
///
/// Enum-valued fields stay strings here so that a bad value surfaces as a
/// field violation in the response body rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub listing_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_miles: Option<f64>,
    pub min_sale_price: Option<u32>,
    pub max_sale_price: Option<u32>,
    pub min_rent_price: Option<u32>,
    pub max_rent_price: Option<u32>,
    pub min_beds: Option<u32>,
    pub max_beds: Option<u32>,
    pub min_baths: Option<f64>,
    pub max_baths: Option<f64>,
    pub home_types: Option<Vec<String>>,
}

/// Default search radius in miles when the request leaves it unset
pub const DEFAULT_RADIUS_MILES: f64 = 10.0;

/// Validated search query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub listing_type: ListingType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_miles: f64,
    pub min_sale_price: Option<u32>,
    pub max_sale_price: Option<u32>,
    pub min_rent_price: Option<u32>,
    pub max_rent_price: Option<u32>,
    pub min_beds: Option<u32>,
    pub max_beds: Option<u32>,
    pub min_baths: Option<f64>,
    pub max_baths: Option<f64>,
    pub home_types: Vec<HomeType>,
}

impl SearchQuery {
    /// Validate a raw request into a query
    ///
    /// Every violated field is reported, not just the first one found.
    pub fn from_request(req: SearchRequest) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();

        let listing_type = match req.listing_type.as_deref() {
            None => ListingType::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                violations.push(FieldViolation::new(
                    "listing_type",
                    ViolationKind::InvalidEnum,
                    format!("unknown listing_type '{}', expected rental, sale or both", raw),
                ));
                ListingType::default()
            }),
        };

        if let Some(lat) = req.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                violations.push(FieldViolation::new(
                    "latitude",
                    ViolationKind::OutOfRange,
                    format!("latitude {} outside [-90, 90]", lat),
                ));
            }
        }
        if let Some(lon) = req.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                violations.push(FieldViolation::new(
                    "longitude",
                    ViolationKind::OutOfRange,
                    format!("longitude {} outside [-180, 180]", lon),
                ));
            }
        }

        let radius_miles = req.radius_miles.unwrap_or(DEFAULT_RADIUS_MILES);
        if !(radius_miles > 0.0) || !radius_miles.is_finite() {
            violations.push(FieldViolation::new(
                "radius_miles",
                ViolationKind::OutOfRange,
                format!("radius_miles must be a positive number, got {}", radius_miles),
            ));
        }

        check_bounds(&mut violations, "sale_price", req.min_sale_price, req.max_sale_price);
        check_bounds(&mut violations, "rent_price", req.min_rent_price, req.max_rent_price);
        check_bounds(&mut violations, "beds", req.min_beds, req.max_beds);
        check_bounds(&mut violations, "baths", req.min_baths, req.max_baths);

        let mut home_types = Vec::new();
        if let Some(raw_types) = &req.home_types {
            for raw in raw_types {
                match raw.parse() {
                    Ok(ht) => {
                        if !home_types.contains(&ht) {
                            home_types.push(ht);
                        }
                    }
                    Err(_) => violations.push(FieldViolation::new(
                        "home_types",
                        ViolationKind::InvalidEnum,
                        format!("unknown home type '{}'", raw),
                    )),
                }
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        Ok(Self {
            listing_type,
            latitude: req.latitude,
            longitude: req.longitude,
            radius_miles,
            min_sale_price: req.min_sale_price,
            max_sale_price: req.max_sale_price,
            min_rent_price: req.min_rent_price,
            max_rent_price: req.max_rent_price,
            min_beds: req.min_beds,
            max_beds: req.max_beds,
            min_baths: req.min_baths,
            max_baths: req.max_baths,
            home_types,
        })
    }

    /// Short human-readable location description for log lines and messages
    pub fn location_label(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("({:.4}, {:.4})", lat, lon),
            _ => "(unspecified location)".to_string(),
        }
    }
}

fn check_bounds<T: PartialOrd + std::fmt::Display>(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    min: Option<T>,
    max: Option<T>,
) {
    if let (Some(min), Some(max)) = (&min, &max) {
        if min > max {
            violations.push(FieldViolation::new(
                field,
                ViolationKind::InconsistentRange,
                format!("min_{field} ({min}) is greater than max_{field} ({max})"),
            ));
        }
    }
}

/// The kind of constraint a field violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    InvalidEnum,
    OutOfRange,
    InconsistentRange,
}

/// One violated field with its constraint kind and description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, kind: ViolationKind, message: String) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message,
        }
    }
}

/// Failed validation of a search request, listing every violated field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid search query: {}", self.summary())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Comma-joined field list, for error messages
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.field.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}
