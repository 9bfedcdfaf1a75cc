// handlers/mod.rs - Three access tiers
//
// Public (no auth) → Protected (session) → Elevated (superadmin session).
// The tier decides which middleware `app::router` wraps around the routes.
pub mod elevated;
pub mod protected;
pub mod public;
