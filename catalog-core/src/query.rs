//! Query construction API for document stores.
//!
//! A [`Query`] is the store-level form of a list request: a filter expression, a
//! projection and an optional sort. Backends consume it through the [`QueryVisitor`]
//! trait so each one can render the filter in its own dialect.
//!
//! # Query Building
//!
//! ```ignore
//! use catalog_core::query::{Filter, Query, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("category", "office").and(Filter::gte("price", 1.0)))
//!     .project(["name", "price"])
//!     .sort("price", SortDirection::Asc)
//!     .build();
//! ```

use std::collections::BTreeSet;

use bson::Bson;

use crate::error::StoreError;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (0 to 9, A to Z).
    Asc,
    /// Descending order (9 to 0, Z to A).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Greater than or equal to.
    Gte,
}

/// A filter expression for querying documents.
///
/// Filters are conjunctions of field predicates. The order of the predicates inside
/// an `And` carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Names of every field this expression tests.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Expr::And(exprs) => exprs.iter().flat_map(Expr::fields).collect(),
            Expr::Field { field, .. } => vec![field.as_str()],
        }
    }
}

/// Helper for constructing filter expressions.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the specified value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where the field is greater than or equal to the specified value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Combines multiple expressions such that all must match.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }
}

/// The set of fields a query returns.
///
/// An empty projection returns every field. A non-empty projection returns only the
/// named fields; the identifier is included only when it is named explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection(BTreeSet<String>);

impl Projection {
    /// Creates a projection over the given field names, dropping blanks.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection(
            fields
                .into_iter()
                .map(Into::into)
                .filter(|field| !field.is_empty())
                .collect(),
        )
    }

    /// Whether this projection returns every field.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` is returned by this projection.
    pub fn includes(&self, field: &str) -> bool {
        self.is_empty() || self.0.contains(field)
    }

    /// The projected field names, in lexical order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A structured query for retrieving and filtering documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Optional filter expression. `None` matches every document.
    pub filter: Option<Expr>,
    /// Fields to return.
    pub projection: Projection,
    /// Sort specification for results.
    pub sort: Option<Sort>,
}

impl Query {
    /// Creates a new query matching every document.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Adds a filter expression, AND-ing it with any filter already present.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(match self.query.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Restricts the returned fields.
    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.projection = Projection::new(fields);
        self
    }

    /// Sets the sort specification for the query results.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<StoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
