//! OpenTelemetry semantic convention attribute names.
//!
//! GenAI attributes instrument bot function calls; messaging attributes
//! instrument message inserts and realtime channels. All constants are string
//! slices usable as `{ NAME } = value` fields in `tracing::info_span!`.
//!
//! Span naming convention: `"{operation} {target}"` (e.g., `"chat gpt-4o-mini"`,
//! `"subscribe msg:ana-bia"`).

// --- GenAI ---

/// The name of the operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "openai").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The identifier of the bot answering.
pub const GEN_AI_AGENT_ID: &str = "gen_ai.agent.id";

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

pub const PROVIDER_OPENAI: &str = "openai";

// --- Messaging ---

/// The messaging system (always [`MESSAGING_SYSTEM_REALTIME`] here).
pub const MESSAGING_SYSTEM: &str = "messaging.system";

/// Channel or table the operation targets.
pub const MESSAGING_DESTINATION_NAME: &str = "messaging.destination.name";

/// Kind of messaging operation (`"send"`, `"receive"`, `"subscribe"`).
pub const MESSAGING_OPERATION_TYPE: &str = "messaging.operation.type";

/// Identifier of the message being sent or received.
pub const MESSAGING_MESSAGE_ID: &str = "messaging.message.id";

pub const MESSAGING_SYSTEM_REALTIME: &str = "recomendify.realtime";

pub const OP_SEND: &str = "send";

pub const OP_RECEIVE: &str = "receive";

pub const OP_SUBSCRIBE: &str = "subscribe";
