//! Natural-language assist pipeline.
//!
//! A question flows classify → dispatch → format. Two classifier tiers:
//! - **Keyword rules** (local): an ordered first-match-wins rule list.
//! - **LLM** (remote): few-shot JSON classification for the richer
//!   intent set, used only when the rules fall through to help.

pub mod dispatch;
pub mod format;
pub mod llm;
pub mod rules;
pub mod tiered;

use async_trait::async_trait;

use fp_protocol::intent::{ConversationTurn, IntentResult};

/// A classifier tier: free text plus rolling history in, structured
/// intent out. Classifiers never fail — the worst case is a help or
/// error intent.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str, history: &[ConversationTurn]) -> IntentResult;

    /// Name of this tier (for logging).
    fn tier_name(&self) -> &str;
}

pub use rules::RuleClassifier;
pub use tiered::TieredClassifier;
