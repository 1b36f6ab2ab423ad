//! Value Objects - Immutable, identity-less domain primitives

mod delimiter;
mod email_address;
mod timezone;

pub use delimiter::Delimiter;
pub use email_address::EmailAddress;
pub use timezone::Timezone;
