//! Authentication flow state machine, results and notifications.

pub mod events;
pub mod machine;
pub mod sink;
pub mod state;

pub use events::{FlowEvent, FlowEventPayload, FlowId, FlowObserver, TracingObserver};
pub use machine::AuthFlowStateMachine;
pub use sink::{CallbackSink, FlowSink, NullSink};
pub use state::{FailureReason, FlowResult, FlowState, FlowStep, SuppressReason};
