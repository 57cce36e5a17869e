pub mod api;
pub mod error;
pub mod field;
pub mod people;
pub mod schema;
pub mod testing;

pub use api::{ApiRequest, Credential, HttpTransport, Method, Query, Transport, PEOPLE_API};
pub use error::{Error, Result};
pub use field::{Emptiable, FieldInput};
pub use people::{
    ConnectionsPage, DeleteConfirmation, DirectoryPage, Person, SearchResult, SearchResults,
};
pub use schema::{AliasTable, FieldSpec, FieldType, InputSchema};
