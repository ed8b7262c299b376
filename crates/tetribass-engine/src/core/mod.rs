pub use self::{ghost::*, grid::*, piece::*};

pub(crate) mod ghost;
pub(crate) mod grid;
pub(crate) mod piece;
