//! Core value types for the daily fortune bot.
//!
//! Everything that depends on wall-clock time funnels through
//! [`Timezone::to_calendar_date`], so the generator and the delivery gate only
//! ever reason about discrete [`CalendarDate`]s.
pub mod calendar;
pub mod fortune;
pub mod message;
pub mod render;

pub use calendar::*;
pub use fortune::*;
pub use message::*;
pub use render::*;
