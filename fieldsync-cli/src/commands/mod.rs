pub mod events;
pub mod fields;
pub mod sync;
