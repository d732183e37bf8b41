mod middleware;
mod public;

pub use middleware::{RequestContext, RequestOrigin, log_responses, set_request_context};
pub use public::{HttpState, RSS_CONTENT_TYPE, build_router};
