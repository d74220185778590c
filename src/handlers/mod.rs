// Two security tiers: public (no auth: registration, login, and the
// emailed action links, which authenticate by signature instead of
// session) and protected (JWT auth, /api/* routes).
pub mod protected;
pub mod public;
