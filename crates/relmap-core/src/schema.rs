pub mod db;

mod name;
pub use name::{Exact, Inflector, Pluralize};
