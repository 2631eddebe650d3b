pub mod document;
pub mod run;
pub mod setting;

pub use document::{Document, NewDocument};
pub use run::Run;
pub use setting::Setting;
