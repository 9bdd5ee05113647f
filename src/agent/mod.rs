pub mod channel;
pub mod events;
pub mod http;
pub mod prompts;

pub use channel::{AgentChannel, AgentMessage, MessageRole};
pub use events::{parse_event_line, AgentEvent, ParsedLine};
pub use http::HttpAgentChannel;
pub use prompts::{compose_scale, compose_substitution};
