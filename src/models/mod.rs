// ============ Model implementations ============

pub(crate) mod rntn;

// Public model structs and option types (for type annotations)
pub use rntn::{RntnModel, RntnSource};
