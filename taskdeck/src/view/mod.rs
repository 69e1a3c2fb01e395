//! View projections over the task mirror.
//!
//! Both projections are render models, not widgets: the list and the
//! calendar produce plain data for an external widget to draw, and
//! interactions come back through named methods instead of widget
//! callbacks. The list projects the filtered mirror; the calendar
//! deliberately projects the whole mirror so drag interactions never
//! act on hidden state.

pub mod calendar;
pub mod list;
