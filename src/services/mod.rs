pub mod assets;
pub mod boards;
pub mod cards;
pub mod categories;
pub mod identity;
pub mod session_gate;

pub use assets::AssetUploader;
pub use boards::BoardRegistry;
pub use cards::{CardRegistry, NewCard};
pub use categories::CategoryRegistry;
pub use identity::{AuthSubscription, IdentityService};
pub use session_gate::{AuthOutcome, GateView, SessionGate};
