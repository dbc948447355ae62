use crate::domain::model::{Decoded, ParsePolicy};
use crate::utils::error::Result;

/// An entity persisted as one comma-delimited line.
pub trait Record: Sized {
    /// Field names in on-disk order.
    const FIELDS: &'static [&'static str];

    fn from_fields(fields: &[&str], policy: ParsePolicy) -> Result<Decoded<Self>>;

    fn to_fields(&self) -> Vec<String>;
}
