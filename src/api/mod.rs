//! HTTP client side of the Idea API
//!
//! Authentication, the shared session, wire contracts, and body decoding.

pub mod auth;
pub mod decode;
mod session;
pub mod types;

pub use auth::authenticate;
pub use decode::{decode_response, decode_response_list};
pub use session::Session;
pub use types::{ApiReply, ApiRequest, ApiResponse, Credentials, HttpMethod, IdeaRequest};
