//! Prompt assembly for hosted generation

use aura_core::ChatMode;
use aura_responses::wellness::helpline_lines;

const FRIEND_PERSONA: &str = "You are Aura, a friendly and empathetic mental health support chatbot. \
Respond in a casual, supportive, and relatable way. Use emojis occasionally. \
Show understanding and provide emotional support like a caring friend would. \
Keep responses concise (2-4 sentences). Be warm and approachable.";

const PROFESSIONAL_PERSONA: &str = "You are Aura, a professional mental health assistant. \
Provide structured, therapeutic responses with clinical insight. \
Ask thoughtful questions to understand the user's situation better. \
Offer evidence-based suggestions and coping strategies. \
Keep responses concise (2-4 sentences). Be professional yet compassionate.";

const DISCLAIMER: &str = "IMPORTANT: Always remind users that you're an AI assistant, not a \
replacement for professional help. If someone mentions self-harm, suicide, or severe crisis, \
provide crisis helpline information.";

pub fn persona(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Friend => FRIEND_PERSONA,
        ChatMode::Professional => PROFESSIONAL_PERSONA,
    }
}

/// Persona, disclaimer, crisis protocol (professional mode), reference
/// responses and the user message, in that order
pub fn build_prompt(message: &str, mode: ChatMode, references: &[&str]) -> String {
    let mut prompt = String::with_capacity(1024 + message.len());
    prompt.push_str(persona(mode));
    prompt.push_str("\n\n");
    prompt.push_str(DISCLAIMER);
    prompt.push_str("\n\n");

    if mode == ChatMode::Professional {
        prompt.push_str(
            "CRISIS PROTOCOL: If the user expresses thoughts of suicide or self-harm, respond with \
             empathy, encourage them to contact emergency services or one of these helplines, and \
             do not attempt to counsel the crisis yourself:\n",
        );
        prompt.push_str(&helpline_lines());
        prompt.push_str("\n\n");
    }

    if !references.is_empty() {
        prompt.push_str("Responses from trained counselors to similar situations, for reference:\n");
        for (i, reference) in references.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, reference.trim()));
        }
        prompt.push('\n');
    }

    prompt.push_str("User message: ");
    prompt.push_str(message);
    prompt.push_str("\n\nRespond appropriately:");
    prompt
}
