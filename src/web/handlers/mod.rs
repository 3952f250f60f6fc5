pub mod career_handlers;
pub mod profile_handlers;
pub mod system_handlers;

pub use career_handlers::*;
pub use profile_handlers::*;
pub use system_handlers::*;
