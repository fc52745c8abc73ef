pub mod filename;
pub mod lookup;
