//! Infrastructure layer

pub mod pbx;
pub mod screen_pop;
