mod joined;
mod metadata;
mod record;

pub use joined::*;
pub use metadata::*;
pub use record::*;
