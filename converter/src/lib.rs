pub mod error;
pub mod executor;
pub mod generator;
pub mod power;
pub mod printer;
pub mod universal;

pub use error::ConvertError;
pub use executor::{Options, Strategy, convert, convert_str, execute};
pub use generator::{GenerateError, Generator};
pub use power::{PowerRelation, power_relation};
