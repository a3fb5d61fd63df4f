//! Orchestrator behaviour across response sources

mod common;

use aura_classifiers::{DistressClassifier, ModelHandle};
use aura_core::{ChatMode, ResponseSource, Severity};
use aura_responses::local::FALLBACK_REPLY;
use aura_responses::CRISIS_RESPONSE;
use aura_server::{handle_chat, AppContext, ChatError, ChatRequest, ServerConfig};
use common::*;
use std::sync::Arc;

#[tokio::test]
async fn test_empty_message_is_a_client_error() {
    let generator = Arc::new(FailingGenerator::default());
    let ctx = context().with_generator(generator.clone());

    for message in ["", "   \n"] {
        let err = handle_chat(&ctx, ChatRequest::new(message)).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_crisis_message_overrides_in_every_mode() {
    let ctx = context();
    for mode in ChatMode::ALL {
        let response = handle_chat(&ctx, ChatRequest::new("I want to kill myself").with_mode(mode))
            .await
            .unwrap();
        let distress = response.distress_detection.expect("override always reports");
        assert!(distress.is_distress);
        assert_eq!(distress.confidence, 1.0);
        assert_eq!(distress.severity, Severity::High);
        assert!(distress.requires_crisis_intervention);
    }
}

#[tokio::test]
async fn test_crisis_reply_on_local_path() {
    let ctx = context();
    let response = handle_chat(&ctx, ChatRequest::new("I want to END MY LIFE")).await.unwrap();
    assert_eq!(response.source, ResponseSource::TrainedModel);
    assert_eq!(response.response, CRISIS_RESPONSE);
}

#[tokio::test]
async fn test_professional_mode_prefers_anxiety_entry() {
    let ctx = context();
    let response = handle_chat(
        &ctx,
        ChatRequest::new("I'm feeling anxious about exams").with_mode(ChatMode::Professional),
    )
    .await
    .unwrap();
    assert_eq!(response.source, ResponseSource::CounselingDataset);
    assert_eq!(response.response, ANXIETY_REPLY);
    assert_eq!(response.mode, ChatMode::Professional);
}

#[tokio::test]
async fn test_friend_mode_skips_corpus() {
    let ctx = context();
    let response = handle_chat(&ctx, ChatRequest::new("I feel lonely at university")).await.unwrap();
    assert_eq!(response.source, ResponseSource::TrainedModel);
    assert_eq!(response.response, DIALOGUE_REPLY);
}

#[tokio::test]
async fn test_generation_failure_falls_back_to_trained_model() {
    let generator = Arc::new(FailingGenerator::default());
    let ctx = context().with_generator(generator.clone());

    let response = handle_chat(&ctx, ChatRequest::new("purple elephants").with_use_ai(true))
        .await
        .unwrap();
    assert_eq!(generator.calls(), 1);
    assert_eq!(response.source, ResponseSource::TrainedModel);
    assert_eq!(response.response, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_generation_success_with_references() {
    let generator = Arc::new(EchoGenerator::new("You're not alone in this."));
    let ctx = context().with_generator(generator.clone());

    let response = handle_chat(&ctx, ChatRequest::new("so anxious about my exams")).await.unwrap();
    assert_eq!(response.source, ResponseSource::Gemini);
    assert_eq!(response.response, "You're not alone in this.");

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("User message: so anxious about my exams"));
    assert!(prompts[0].contains(ANXIETY_REPLY));
    assert!(!prompts[0].contains("CRISIS PROTOCOL"));
}

#[tokio::test]
async fn test_use_ai_false_skips_generation() {
    let generator = Arc::new(EchoGenerator::new("unused"));
    let ctx = context().with_generator(generator.clone());

    let response = handle_chat(&ctx, ChatRequest::new("hello").with_use_ai(false)).await.unwrap();
    assert_eq!(response.source, ResponseSource::TrainedModel);
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_generated_reply_is_translated() {
    let ctx = context()
        .with_generator(Arc::new(EchoGenerator::new("Take a deep breath.")))
        .with_translator(Arc::new(TaggingTranslator));
    let response = handle_chat(&ctx, ChatRequest::new("hello").with_language("hi")).await.unwrap();
    assert_eq!(response.response, "[hi] Take a deep breath.");

    let english = handle_chat(&ctx, ChatRequest::new("hello").with_language("en")).await.unwrap();
    assert_eq!(english.response, "Take a deep breath.");
}

#[tokio::test]
async fn test_failed_translation_keeps_english() {
    let ctx = context()
        .with_generator(Arc::new(EchoGenerator::new("Take a deep breath.")))
        .with_translator(Arc::new(BrokenTranslator));
    let response = handle_chat(&ctx, ChatRequest::new("hello").with_language("es")).await.unwrap();
    assert_eq!(response.source, ResponseSource::Gemini);
    assert_eq!(response.response, "Take a deep breath.");
}

#[tokio::test]
async fn test_no_model_means_no_distress_detection() {
    let ctx = context();
    let response = handle_chat(&ctx, ChatRequest::new("hello")).await.unwrap();
    assert!(response.distress_detection.is_none());
}

#[tokio::test]
async fn test_loaded_model_reports_distress() {
    let ctx = AppContext::new(
        ServerConfig::default(),
        ModelHandle::with_model(trained_model()),
        corpus(),
        local_responder(),
    )
    .unwrap();

    let distressed = handle_chat(&ctx, ChatRequest::new("I feel hopeless and worthless every night"))
        .await
        .unwrap();
    let prediction = distressed.distress_detection.unwrap();
    assert!(prediction.is_distress);
    assert_ne!(prediction.severity, Severity::None);

    let calm = handle_chat(&ctx, ChatRequest::new("a sunny afternoon in the garden"))
        .await
        .unwrap();
    assert!(!calm.distress_detection.unwrap().is_distress);
}

#[tokio::test]
async fn test_failing_classifier_keeps_keyword_override() {
    let classifiers: [Arc<dyn DistressClassifier>; 2] =
        [Arc::new(ErroringClassifier), Arc::new(PanickingClassifier)];

    for classifier in classifiers {
        let name = classifier.name().to_string();
        let ctx = context().with_classifier(classifier);

        let crisis = handle_chat(&ctx, ChatRequest::new("I want to end my life"))
            .await
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        let distress = crisis.distress_detection.expect("override present");
        assert!(distress.requires_crisis_intervention, "{name}");
        assert_eq!(distress.confidence, 1.0);
        assert_eq!(crisis.response, CRISIS_RESPONSE);

        let calm = handle_chat(&ctx, ChatRequest::new("hello")).await.unwrap();
        assert!(calm.distress_detection.is_none(), "{name}");
        assert_eq!(calm.source, ResponseSource::TrainedModel);
    }
}
