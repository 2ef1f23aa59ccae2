// Job recommendation: a startup-loaded read-only dataset plus a
// deterministic rule-based matcher. No LLM involvement on this path.

pub mod dataset;
pub mod handlers;
pub mod matcher;
