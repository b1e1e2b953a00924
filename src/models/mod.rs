pub mod appointment;
pub mod excerpt;
pub mod profile;
pub mod session;

pub use appointment::Appointment;
pub use excerpt::Excerpt;
pub use profile::{ProfileField, ProfileUpdate, UserProfile};
pub use session::Session;
