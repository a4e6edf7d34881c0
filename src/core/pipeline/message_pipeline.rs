// Message pipeline - the single entry point for every inbound message.
//
// Direct messages from relay targets are forwarded and never moderated.
// Guild messages in watched channels go through detection and, when
// suppressed, through the executor.

use super::pipeline_models::{InboundMessage, PipelineOutcome};
use crate::core::actions::{ActionExecutor, ChatPlatform};
use crate::core::moderation::{Classifier, ModerationService};
use crate::core::relay::ConversationRouter;
use std::collections::HashSet;
use std::sync::Arc;

pub struct MessagePipeline<C: Classifier, P: ChatPlatform> {
    moderation: ModerationService<C>,
    executor: ActionExecutor<P>,
    router: Arc<ConversationRouter>,
    // Empty means every guild channel is watched
    watched_channels: HashSet<u64>,
}

impl<C: Classifier, P: ChatPlatform> MessagePipeline<C, P> {
    pub fn new(
        moderation: ModerationService<C>,
        executor: ActionExecutor<P>,
        router: Arc<ConversationRouter>,
        watched_channels: HashSet<u64>,
    ) -> Self {
        Self {
            moderation,
            executor,
            router,
            watched_channels,
        }
    }

    pub fn executor(&self) -> &ActionExecutor<P> {
        &self.executor
    }

    pub fn is_watched(&self, channel_id: u64) -> bool {
        self.watched_channels.is_empty() || self.watched_channels.contains(&channel_id)
    }

    pub async fn handle(&self, message: &InboundMessage) -> PipelineOutcome {
        if message.author_is_bot {
            return PipelineOutcome::IgnoredBot;
        }

        if message.is_direct() {
            return self.handle_direct(message).await;
        }

        if !self.is_watched(message.channel_id) {
            return PipelineOutcome::NotWatched;
        }

        let decision = self.moderation.evaluate(&message.content).await;
        if !decision.suppress {
            return PipelineOutcome::Passed(decision);
        }

        tracing::info!(
            author_id = message.author_id,
            channel_id = message.channel_id,
            confidence = decision.confidence,
            "Suppressing AI-generated message"
        );
        let outcome = self.executor.enforce(message, &decision).await;
        PipelineOutcome::Suppressed { decision, outcome }
    }

    async fn handle_direct(&self, message: &InboundMessage) -> PipelineOutcome {
        if !self.router.is_tracked(message.author_id) {
            tracing::debug!(author_id = message.author_id, "DM from untracked user");
            return PipelineOutcome::IgnoredDirectMessage;
        }

        // The entry can still expire between the two lookups
        let notification = match self.router.route_reply(
            message.author_id,
            &message.author_name,
            &message.content,
            &message.attachment_urls,
        ) {
            Some(notification) => notification,
            None => return PipelineOutcome::IgnoredDirectMessage,
        };

        let delivered = self.executor.forward_reply(&notification).await;
        PipelineOutcome::Relayed {
            requester_id: notification.requester_id,
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::testing::{RecordingPlatform, Sent};
    use crate::core::actions::{EnforcementOutcome, DEFAULT_NOTICE_TEMPLATE};
    use crate::core::moderation::{
        ClassificationError, ClassificationResult, DecisionReason, LabelScore, ModerationConfig,
        ModerationDecision, AI_LABEL, HUMAN_LABEL,
    };
    use crate::core::relay::RelayConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always answers with the same AI score
    struct FixedClassifier {
        ai_score: f32,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(
            &self,
            _text: &str,
            _labels: &[&str],
        ) -> Result<ClassificationResult, ClassificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ClassificationResult::new(vec![
                LabelScore::new(AI_LABEL, self.ai_score),
                LabelScore::new(HUMAN_LABEL, 1.0 - self.ai_score),
            ]))
        }
    }

    struct Fixture {
        pipeline: MessagePipeline<FixedClassifier, RecordingPlatform>,
        router: Arc<ConversationRouter>,
        calls: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn classifier_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn sent(&self) -> Vec<Sent> {
            self.pipeline.executor().platform().sent()
        }
    }

    fn fixture(ai_score: f32, watched: &[u64]) -> Fixture {
        let router = Arc::new(ConversationRouter::new(RelayConfig::default()));
        let calls = Arc::new(AtomicUsize::new(0));
        let moderation = ModerationService::new(
            FixedClassifier {
                ai_score,
                calls: Arc::clone(&calls),
            },
            ModerationConfig::default(),
        );
        let executor = ActionExecutor::new(
            RecordingPlatform::new(),
            Arc::clone(&router),
            DEFAULT_NOTICE_TEMPLATE.to_string(),
        );
        let pipeline = MessagePipeline::new(
            moderation,
            executor,
            Arc::clone(&router),
            watched.iter().copied().collect(),
        );
        Fixture {
            pipeline,
            router,
            calls,
        }
    }

    fn guild_message(author_id: u64, channel_id: u64, content: &str) -> InboundMessage {
        InboundMessage {
            message_id: 1,
            author_id,
            author_name: format!("user{}", author_id),
            channel_id,
            guild_id: Some(500),
            content: content.to_string(),
            attachment_urls: Vec::new(),
            author_is_bot: false,
        }
    }

    fn direct_message(author_id: u64, content: &str) -> InboundMessage {
        InboundMessage {
            guild_id: None,
            ..guild_message(author_id, 900, content)
        }
    }

    #[tokio::test]
    async fn test_ai_message_is_removed() {
        let fx = fixture(0.8, &[]);

        let outcome = fx
            .pipeline
            .handle(&guild_message(5, 10, "🙂 this is obviously a test message of length"))
            .await;

        match outcome {
            PipelineOutcome::Suppressed { decision, outcome } => {
                assert!(decision.suppress);
                assert_eq!(outcome, EnforcementOutcome::Removed { notice_posted: true });
            }
            other => panic!("expected suppression, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_human_message_passes() {
        let fx = fixture(0.3, &[]);

        let outcome = fx
            .pipeline
            .handle(&guild_message(5, 10, "see everyone at the meetup tonight"))
            .await;

        assert!(matches!(outcome, PipelineOutcome::Passed(ref d) if !d.suppress));
        assert!(fx.sent().is_empty());
    }

    #[tokio::test]
    async fn test_bot_messages_are_ignored() {
        let fx = fixture(0.99, &[]);
        let mut message = guild_message(5, 10, "a long message written by another bot");
        message.author_is_bot = true;

        assert_eq!(fx.pipeline.handle(&message).await, PipelineOutcome::IgnoredBot);
        assert_eq!(fx.classifier_calls(), 0);
    }

    #[tokio::test]
    async fn test_unwatched_channels_are_skipped() {
        let fx = fixture(0.99, &[10]);

        let outcome = fx
            .pipeline
            .handle(&guild_message(5, 11, "an AI sounding message in another channel"))
            .await;

        assert_eq!(outcome, PipelineOutcome::NotWatched);
        assert_eq!(fx.classifier_calls(), 0);
    }

    #[tokio::test]
    async fn test_numeric_message_never_classified() {
        let fx = fixture(0.99, &[]);

        let outcome = fx.pipeline.handle(&guild_message(5, 10, "12345678901")).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Passed(ModerationDecision::pass(DecisionReason::NumericOnly))
        );
        assert_eq!(fx.classifier_calls(), 0);
    }

    #[tokio::test]
    async fn test_tracked_dm_is_relayed_not_moderated() {
        let fx = fixture(0.99, &[]);
        fx.router.register(42, 7);

        let outcome = fx
            .pipeline
            .handle(&direct_message(7, "this reply reads like it came from a model"))
            .await;

        assert_eq!(
            outcome,
            PipelineOutcome::Relayed {
                requester_id: 42,
                delivered: 1
            }
        );
        assert_eq!(fx.classifier_calls(), 0);
        assert_eq!(
            fx.sent(),
            vec![Sent::User {
                user_id: 42,
                content: "user7 replied: this reply reads like it came from a model".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_untracked_dm_is_ignored() {
        let fx = fixture(0.99, &[]);

        let outcome = fx
            .pipeline
            .handle(&direct_message(8, "hello bot, who are you anyway?"))
            .await;

        assert_eq!(outcome, PipelineOutcome::IgnoredDirectMessage);
        assert_eq!(fx.classifier_calls(), 0);
        assert!(fx.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dm_from_requester_is_not_relayed() {
        let fx = fixture(0.99, &[]);
        fx.router.register(42, 7);

        // 42 asked the bot to DM 7; 42 is not a target itself
        let outcome = fx
            .pipeline
            .handle(&direct_message(42, "did they answer yet?"))
            .await;

        assert_eq!(outcome, PipelineOutcome::IgnoredDirectMessage);
        assert!(fx.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dm_command_then_reply_round_trip() {
        let fx = fixture(0.1, &[]);

        fx.pipeline
            .executor()
            .send_direct(42, 7, "can you join the call?")
            .await
            .unwrap();
        let outcome = fx
            .pipeline
            .handle(&direct_message(7, "yes, two minutes"))
            .await;

        assert_eq!(
            outcome,
            PipelineOutcome::Relayed {
                requester_id: 42,
                delivered: 1
            }
        );
    }
}
