//! Controller side: uplink listener, dispatcher and the text pipeline.

pub mod chunker;
pub mod dispatcher;
pub mod resolver;
pub mod sanitize;
pub mod uplink;
