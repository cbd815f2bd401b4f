pub mod board;
pub mod card;
pub mod category;
pub mod object;
pub mod session;
pub mod user;
