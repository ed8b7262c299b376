pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding with the board or its bounds")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("piece colliding when swapping in the held piece")]
    PieceCollision(PieceCollisionError),
    #[display("hold already used for this piece")]
    HoldAlreadyUsed,
}
