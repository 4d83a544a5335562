pub mod enrichment;
pub mod lookup;

pub use enrichment::*;
pub use lookup::*;
