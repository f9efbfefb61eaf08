//! Request, query and response types.
//!
//! - [`request`] - raw and canonical search requests
//! - [`query`] - the compiled filter expression tree
//! - [`sort`] - compiled sort specifications
//! - [`page`] - backend windows and result pages
//! - [`response`] - the `FeatureCollection` envelope and links

pub mod page;
pub mod query;
pub mod request;
pub mod response;
pub mod sort;

pub use page::{CountRelation, MatchCount, ResultPage, Window};
pub use query::{Clause, CompiledQuery, Envelope, Operator, RangeBounds};
pub use request::{
    Bbox, Datetime, DatetimeFilter, Direction, FieldsSpec, RawSearchRequest, SearchRequest,
    SortBy, Transport,
};
pub use response::{Context, Link, ResponsePage};
pub use sort::{SortField, SortSpec};
