mod http;

pub mod runner;

pub use http::{Error, HttpClient, HttpTransportErrorKind, Result};
