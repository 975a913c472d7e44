//! Filter → predicate composition.
//!
//! Turns a set of optional filter criteria into an ordered list of templated
//! WHERE clauses with bound parameters and an ordering selection. User values
//! never appear in the SQL text; every clause references a numbered
//! placeholder and the matching value sits at the same position in the
//! parameter list. Ordering expressions come from a fixed template set.

use thiserror::Error;

/// Optional filter criteria for article queries.
///
/// Zero fields set is valid and matches every article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub category: Option<String>,
    pub min_score: Option<f64>,
    pub source_name: Option<String>,
    pub search_text: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidFilter {
    #[error("spatial filter requires both lat and lon")]
    IncompleteCoordinates,
    #[error("spatial filter radius must be positive, got {0}")]
    NonPositiveRadius(f64),
}

/// A value bound to a placeholder, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Text(String),
    Float(f64),
    Int(i64),
}

/// Ordering selection, by precedence: text relevance, explicit score filter,
/// spatial distance, publication recency.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    TextRelevance { query: String },
    RelevanceScore,
    Distance { lat: f64, lon: f64 },
    PublicationDate,
}

/// Composed predicate: conjunctive conditions, bound values, ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub(crate) conditions: Vec<String>,
    pub(crate) params: Vec<BindValue>,
    pub(crate) order: OrderBy,
}

impl Predicate {
    /// Number of present filter conditions. Zero means "match all rows".
    #[must_use]
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    #[must_use]
    pub fn order(&self) -> &OrderBy {
        &self.order
    }
}

/// Compose a filter into a predicate.
///
/// Each present field appends exactly one clause; the spatial clause binds
/// three parameters (lon, lat, radius in meters). Absent fields append
/// nothing, so an empty filter renders with no WHERE clause at all.
///
/// # Errors
///
/// Returns [`InvalidFilter`] when exactly one of lat/lon is supplied, when a
/// radius is supplied without both coordinates, or when radius ≤ 0.
pub fn compose(filter: &ArticleFilter) -> Result<Predicate, InvalidFilter> {
    let center = match (filter.lat, filter.lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        (None, None) => None,
        _ => return Err(InvalidFilter::IncompleteCoordinates),
    };
    if let Some(radius_km) = filter.radius_km {
        if center.is_none() {
            return Err(InvalidFilter::IncompleteCoordinates);
        }
        if radius_km <= 0.0 {
            return Err(InvalidFilter::NonPositiveRadius(radius_km));
        }
    }

    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(category) = &filter.category {
        params.push(BindValue::Text(category.clone()));
        conditions.push(format!("${} = ANY(categories)", params.len()));
    }

    if let Some(min_score) = filter.min_score {
        params.push(BindValue::Float(min_score));
        conditions.push(format!("relevance_score >= ${}", params.len()));
    }

    if let Some(source_name) = &filter.source_name {
        params.push(BindValue::Text(format!("%{source_name}%")));
        conditions.push(format!("source_name ILIKE ${}", params.len()));
    }

    if let Some(search_text) = &filter.search_text {
        params.push(BindValue::Text(search_text.clone()));
        conditions.push(format!(
            "search_vector @@ plainto_tsquery('english', ${})",
            params.len()
        ));
    }

    if let (Some((lat, lon)), Some(radius_km)) = (center, filter.radius_km) {
        params.push(BindValue::Float(lon));
        params.push(BindValue::Float(lat));
        params.push(BindValue::Float(radius_km * 1000.0));
        conditions.push(format!(
            "ST_DWithin(location, ST_SetSRID(ST_MakePoint(${}, ${}), 4326)::geography, ${})",
            params.len() - 2,
            params.len() - 1,
            params.len()
        ));
    }

    let order = if let Some(query) = &filter.search_text {
        OrderBy::TextRelevance {
            query: query.clone(),
        }
    } else if filter.min_score.is_some() {
        OrderBy::RelevanceScore
    } else if let Some((lat, lon)) = center {
        OrderBy::Distance { lat, lon }
    } else {
        OrderBy::PublicationDate
    };

    Ok(Predicate {
        conditions,
        params,
        order,
    })
}
