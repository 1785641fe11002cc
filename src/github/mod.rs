mod common;
mod event;
mod feed;
mod gdpr;

pub use event::Event;
pub use feed::{get_events, iter_events, parse_event};
pub use gdpr::iter_gdpr_events;

pub(crate) mod prelude {
    pub use super::Event;
    pub use super::{get_events, iter_gdpr_events};
}
