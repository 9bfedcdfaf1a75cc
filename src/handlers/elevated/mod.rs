// handlers/elevated/mod.rs - Superadmin session required
//
// Cross-tenant directory management.
pub mod enterprises;
pub mod users;
