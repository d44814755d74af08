pub mod convert;
pub mod domain;
pub mod error;
