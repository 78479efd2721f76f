pub mod cors;
pub mod tracing;

pub use cors::{AccessPolicy, access_policy_middleware};
pub use self::tracing::{REQUEST_ID_HEADER, request_id_middleware};
