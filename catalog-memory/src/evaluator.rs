//! Query expression evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for query expressions,
//! enabling filtering and comparison operations on BSON documents.

use std::cmp::Ordering;
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use catalog_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::StoreError,
};


/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that an `Int32` price compares equal to a
/// `Double` price of the same value, matching how the MongoDB query engine treats them.
#[derive(Debug, PartialEq)]
pub(crate) enum Comparable<'a> {
    /// Null or missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// ObjectId value
    ObjectId(ObjectId),
    /// String value
    String(&'a str),
    /// Any other value, compared structurally
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Rank of the value's type when sorting mixed types, after MongoDB's order:
    /// missing/null, numbers, strings, everything else.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Number(_) => 1,
            Comparable::String(_) => 2,
            Comparable::ObjectId(_) => 3,
            Comparable::Bool(_) => 4,
            Comparable::DateTime(_) => 5,
            Comparable::Other(_) => 6,
        }
    }

    /// Total order used for sorting. Values that cannot be ordered compare equal so
    /// that a stable sort keeps their original order.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        self.type_rank()
            .cmp(&other.type_rank())
            .then_with(|| self.partial_cmp(other).unwrap_or(Ordering::Equal))
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<bool, StoreError> {
        self.visit_expr(expr)
    }

    pub fn matches(document: &'a Document, expr: Option<&Expr>) -> bool {
        match expr {
            Some(expr) => DocumentEvaluator::new(document)
                .evaluate(expr)
                .unwrap_or(false),
            None => true,
        }
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        match self.document.get(field) {
            Some(field_value) => {
                let left = Comparable::from(field_value);
                let right = Comparable::from(value);

                Ok(match op {
                    FieldOp::Eq => left == right,
                    FieldOp::Gte => matches!(
                        left.partial_cmp(&right),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                })
            },
            None => Ok(false),
        }
    }
}
