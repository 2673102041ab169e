//! Query-string to store-query translation.
//!
//! [`translate`] turns the recognized list parameters into a [`Query`]:
//!
//! | Parameter  | Effect                                              |
//! |------------|-----------------------------------------------------|
//! | `category` | equality on `category` (ignored when empty)         |
//! | `minPrice` | `price >= value`; a non-numeric value is rejected   |
//! | `fields`   | comma-separated top-level field names; blanks, dotted paths and `$` names are dropped |
//! | `sort`     | `price` sorts ascending by price; anything else is ignored |
//!
//! Every other parameter is ignored, and only the first occurrence of a repeated
//! parameter counts.

use crate::{
    error::{ResourceError, ResourceResult},
    query::{Filter, Query, SortDirection},
};

pub const CATEGORY_FIELD: &str = "category";
pub const PRICE_FIELD: &str = "price";

/// The only value of `sort` that has an effect.
const SORT_BY_PRICE: &str = "price";

/// Raw list parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub sort: Option<String>,
    pub fields: Option<String>,
}

impl QueryParams {
    /// Collects the recognized parameters from decoded query-string pairs.
    ///
    /// The first occurrence of each recognized key wins; anything else is ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = QueryParams::default();

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "category" => &mut params.category,
                "minPrice" => &mut params.min_price,
                "sort" => &mut params.sort,
                "fields" => &mut params.fields,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value.into());
            }
        }

        params
    }
}

/// Builds the store query for a list request.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidQuery`] when `minPrice` is present but is not a
/// finite number. A blank `minPrice` counts as absent.
pub fn translate(params: &QueryParams) -> ResourceResult<Query> {
    let mut builder = Query::builder();

    if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
        builder = builder.filter(Filter::eq(CATEGORY_FIELD, category));
    }

    if let Some(raw) = params.min_price.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        builder = builder.filter(Filter::gte(PRICE_FIELD, parse_min_price(raw)?));
    }

    if let Some(fields) = params.fields.as_deref() {
        builder = builder.project(
            fields
                .split(',')
                .map(str::trim)
                .filter(|field| is_projectable(field)),
        );
    }

    if params.sort.as_deref() == Some(SORT_BY_PRICE) {
        builder = builder.sort(PRICE_FIELD, SortDirection::Asc);
    }

    Ok(builder.build())
}

/// Projections name top-level fields only. Paths and operator-like names are
/// dropped so that every backend treats them the same way.
fn is_projectable(field: &str) -> bool {
    !field.starts_with('$') && !field.contains(['.', '\0'])
}

fn parse_min_price(raw: &str) -> ResourceResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ResourceError::InvalidQuery(format!("minPrice must be a number, got {raw:?}")))
}
