pub mod geom;
pub mod profile;
pub mod select;
pub mod sketch;

pub use geom::*;
pub use profile::*;
pub use select::*;
pub use sketch::*;
