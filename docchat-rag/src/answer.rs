//! Answer generation trait.

use async_trait::async_trait;

use crate::error::Result;

/// Produces an answer to a question from a retrieved context block.
///
/// Treated as a slow, fallible external call that follows retrieval. The
/// pipeline only invokes it when at least one chunk was retrieved.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::AnswerGenerator;
///
/// let answer = generator.generate("How do refunds work?", &context).await?;
/// ```
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Answer `question` using only `context`.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}
