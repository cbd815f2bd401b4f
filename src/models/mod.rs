mod board;
mod card;
mod category;
mod object;
mod session;
mod user;

pub use board::*;
pub use card::*;
pub use category::*;
pub use object::*;
pub use session::*;
pub use user::*;
