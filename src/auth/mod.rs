// Admin sessions and the gate that checks them

pub mod gate;
pub mod password;
pub mod session;

pub use gate::gate_middleware;
pub use password::{check_password_hash, hash_password, verify_password};
pub use session::{Identity, Session, SessionManager, token_from_headers};
