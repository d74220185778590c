pub mod requests; // /api/admin/requests - dashboard review path
