//! Query translation from the catalog query AST to MongoDB query syntax.
//!
//! This module translates abstract query expressions, projections and sorts into
//! MongoDB BSON documents for execution by the MongoDB query engine.

use bson::{Document, Bson, doc};

use catalog_core::{
    error::StoreError,
    id::ID_FIELD,
    query::{QueryVisitor, Expr, FieldOp, Projection, Sort, SortDirection},
};


/// Translates query expressions into MongoDB filter documents.
///
/// This struct implements the [`QueryVisitor`] trait to convert abstract
/// query expressions into MongoDB's native BSON query syntax.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Renders an optional filter; no filter matches every document.
    pub fn filter(expr: Option<&Expr>) -> Result<Document, StoreError> {
        match expr {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }

    /// Renders an inclusion projection, or `None` when every field is wanted.
    ///
    /// MongoDB returns `_id` unless told otherwise, so it is excluded explicitly
    /// when the projection does not name it.
    pub fn projection(projection: &Projection) -> Option<Document> {
        if projection.is_empty() {
            return None;
        }

        let mut document = projection
            .fields()
            .map(|field| (field.to_string(), Bson::Int32(1)))
            .collect::<Document>();

        if !projection.includes(ID_FIELD) {
            document.insert(ID_FIELD, 0);
        }

        Some(document)
    }

    /// Renders a sort. Ties are broken by ascending `_id`, which is insertion order
    /// for generated identifiers; MongoDB leaves the order of ties unspecified.
    pub fn sort(sort: &Sort) -> Document {
        let mut document = doc! {
            sort.field.clone(): match sort.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            }
        };

        if sort.field != ID_FIELD {
            document.insert(ID_FIELD, 1);
        }

        document
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Gte => doc! { "$gte": value },
            }
        })
    }
}
