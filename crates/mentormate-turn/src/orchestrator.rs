//! Turn orchestrator: the server-side heart of a conversation turn.
//!
//! One invocation takes one user utterance through the fixed pipeline:
//! persist user message -> generate mentor reply -> persist mentor message ->
//! synthesize audio -> return the combined payload. No step is retried and
//! nothing runs out of order; synthesis never starts before the mentor
//! reply is generated and persisted.

use std::sync::Arc;

use uuid::Uuid;

use mentormate_core::types::{Message, Role};
use mentormate_storage::MessageRepository;

use crate::error::TurnError;
use crate::generation::GenerationClient;
use crate::synthesis::SynthesisClient;

/// Fixed system instruction biasing the generation backend's tone.
pub const PERSONA_INSTRUCTION: &str =
    "You are a mentor for Mentormate, providing concise, helpful advice.";

/// Combined result of a successfully processed turn.
///
/// Audio is transient: it exists only in this reply and in client state,
/// never in the store. `None` means synthesis failed and the turn degraded
/// to text-only.
#[derive(Debug)]
pub struct TurnReply {
    pub user_message: Message,
    pub mentor_message: Message,
    pub audio: Option<Vec<u8>>,
}

/// Composes the message store and the two outbound adapters into one
/// atomic-from-the-client's-view operation.
pub struct TurnOrchestrator {
    repository: MessageRepository,
    generation: Arc<dyn GenerationClient>,
    synthesis: Arc<dyn SynthesisClient>,
}

impl TurnOrchestrator {
    pub fn new(
        repository: MessageRepository,
        generation: Arc<dyn GenerationClient>,
        synthesis: Arc<dyn SynthesisClient>,
    ) -> Self {
        Self {
            repository,
            generation,
            synthesis,
        }
    }

    /// Process one conversation turn for the given owner.
    ///
    /// Exactly one mentor message is produced per successfully processed
    /// user message. Re-submitting identical text creates a new independent
    /// pair; there is no idempotency key.
    pub async fn submit_turn(&self, owner_id: Uuid, text: &str) -> Result<TurnReply, TurnError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        // Step 1: persist the user's utterance. Nothing downstream runs if
        // this fails.
        let user_message = self.repository.append(owner_id, Role::User, text)?;

        // Step 2: mentor reply text. The user message is already durable at
        // this point, so the failure carries it back to the caller.
        let mentor_text = match self.generation.generate(text, PERSONA_INSTRUCTION).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Mentor reply generation failed");
                return Err(TurnError::Generation {
                    detail: e.to_string(),
                    user_message: Box::new(user_message),
                });
            }
        };

        // Step 3: persist the mentor reply. Not retried; the generated text
        // is lost if this write fails.
        let mentor_message = self.repository.append(owner_id, Role::Mentor, &mentor_text)?;

        // Step 4: synthesize speech. A failed synthesis degrades the turn to
        // text-only rather than discarding the persisted pair.
        let audio = match self.synthesis.synthesize(&mentor_text).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed; returning text-only turn");
                None
            }
        };

        tracing::debug!(
            owner = %owner_id,
            user_id = %user_message.id,
            mentor_id = %mentor_message.id,
            has_audio = audio.is_some(),
            "Turn completed"
        );

        Ok(TurnReply {
            user_message,
            mentor_message,
            audio,
        })
    }

    /// The owner's full conversation, oldest first. Audio is never
    /// re-attached to history.
    pub fn history(&self, owner_id: Uuid) -> Result<Vec<Message>, TurnError> {
        Ok(self.repository.list_by_owner(owner_id)?)
    }

    /// Total number of stored messages across owners.
    pub fn stored_messages(&self) -> Result<u64, TurnError> {
        Ok(self.repository.count()?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::MockGenerationClient;
    use crate::synthesis::MockSynthesisClient;
    use mentormate_storage::Database;

    const ADVICE: &str = "Break big goals into small daily wins.";

    fn make_repo() -> MessageRepository {
        MessageRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn make_orchestrator(
        generation: Arc<MockGenerationClient>,
        synthesis: Arc<MockSynthesisClient>,
    ) -> TurnOrchestrator {
        TurnOrchestrator::new(make_repo(), generation, synthesis)
    }

    #[tokio::test]
    async fn test_successful_turn_persists_pair_in_order() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1, 2, 3]));
        let orch = make_orchestrator(Arc::clone(&generation), Arc::clone(&synthesis));
        let owner = Uuid::new_v4();

        let reply = orch
            .submit_turn(owner, "How do I stay motivated?")
            .await
            .unwrap();

        assert_eq!(reply.user_message.role, Role::User);
        assert_eq!(reply.user_message.text, "How do I stay motivated?");
        assert_eq!(reply.mentor_message.role, Role::Mentor);
        assert_eq!(reply.mentor_message.text, ADVICE);
        assert_eq!(reply.audio, Some(vec![1, 2, 3]));

        // Both messages are immediately readable, user first.
        let history = orch.history(owner).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], reply.user_message);
        assert_eq!(history[1], reply.mentor_message);
    }

    #[tokio::test]
    async fn test_empty_text_never_reaches_generation() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1]));
        let orch = make_orchestrator(Arc::clone(&generation), Arc::clone(&synthesis));
        let owner = Uuid::new_v4();

        let err = orch.submit_turn(owner, "").await.unwrap_err();
        assert!(matches!(err, TurnError::EmptyMessage));

        let err = orch.submit_turn(owner, "   \t\n").await.unwrap_err();
        assert!(matches!(err, TurnError::EmptyMessage));

        assert_eq!(generation.call_count(), 0);
        assert_eq!(synthesis.call_count(), 0);
        assert!(orch.history(owner).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_is_trimmed_before_persistence() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1]));
        let orch = make_orchestrator(generation, synthesis);
        let owner = Uuid::new_v4();

        let reply = orch.submit_turn(owner, "  hello  ").await.unwrap();
        assert_eq!(reply.user_message.text, "hello");
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_only_user_message() {
        let generation = Arc::new(MockGenerationClient::empty());
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1]));
        let orch = make_orchestrator(Arc::clone(&generation), Arc::clone(&synthesis));
        let owner = Uuid::new_v4();

        let err = orch.submit_turn(owner, "help me focus").await.unwrap_err();
        let user_message = match err {
            TurnError::Generation { user_message, .. } => *user_message,
            other => panic!("Expected Generation error, got {:?}", other),
        };
        assert_eq!(user_message.text, "help me focus");

        // Exactly one message stored: the user's. No mentor orphan, no audio.
        let history = orch.history(owner).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], user_message);
        assert_eq!(synthesis.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_degrades_to_text_only() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::failing());
        let orch = make_orchestrator(generation, Arc::clone(&synthesis));
        let owner = Uuid::new_v4();

        let reply = orch.submit_turn(owner, "how to focus?").await.unwrap();
        assert!(reply.audio.is_none());
        assert_eq!(synthesis.call_count(), 1);

        // Both messages were still persisted.
        let history = orch.history(owner).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, ADVICE);
    }

    #[tokio::test]
    async fn test_duplicate_submissions_create_independent_pairs() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1]));
        let orch = make_orchestrator(generation, synthesis);
        let owner = Uuid::new_v4();

        let first = orch.submit_turn(owner, "same text").await.unwrap();
        let second = orch.submit_turn(owner, "same text").await.unwrap();

        assert_ne!(first.user_message.id, second.user_message.id);
        assert_ne!(first.mentor_message.id, second.mentor_message.id);
        assert_eq!(orch.history(owner).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_turns_are_owner_scoped() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1]));
        let orch = make_orchestrator(generation, synthesis);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        orch.submit_turn(alice, "alice asks").await.unwrap();

        assert_eq!(orch.history(alice).unwrap().len(), 2);
        assert!(orch.history(bob).unwrap().is_empty());
        assert_eq!(orch.stored_messages().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_one_generation_call_per_turn() {
        let generation = Arc::new(MockGenerationClient::replying(ADVICE));
        let synthesis = Arc::new(MockSynthesisClient::returning(vec![1]));
        let orch = make_orchestrator(Arc::clone(&generation), Arc::clone(&synthesis));
        let owner = Uuid::new_v4();

        orch.submit_turn(owner, "one").await.unwrap();
        orch.submit_turn(owner, "two").await.unwrap();

        assert_eq!(generation.call_count(), 2);
        assert_eq!(synthesis.call_count(), 2);
    }
}
