// handlers/public/mod.rs - No authentication required
//
// Anonymous complaint intake and token acquisition. The tenant of an intake
// request comes from the path, never from the body.
pub mod auth;
pub mod intake;
