pub mod email_action; // GET /api/admin/email/{approve,reject}/:user_id
