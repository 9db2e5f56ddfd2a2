//! Command flows used by the presentation layer.
//!
//! Each sub-module groups the flows of one screen.  They only go through
//! the [`UserStore`](crate::store::UserStore) command surface.

pub mod edit;
pub mod form;
pub mod users;
