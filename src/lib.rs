// Skylight
//
// Platform core for desktop accessibility and screen topology.
// Tracks accessible-object identities for assistive technology and keeps
// the virtual desktop / screen forest in sync with the display server.

pub mod config;
pub mod core;
pub mod platform;
pub mod prelude;
pub mod util;
