// handlers/protected/mod.rs - Valid session required
//
// Every handler here reads `AuthUser` from request extensions and scopes its
// work to the caller's enterprise.
pub mod auth;
pub mod complaints;
