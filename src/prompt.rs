//! All user-facing language in one place: the system prompt, the streaming
//! suffix, and the canned reply texts the orchestrator and dispatcher hand
//! back to patients.

use crate::types::{ConversationContext, PendingRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful hospital assistant for admitted patients. Your role is to:

1. Help patients with their immediate needs:
   - Comfort-related requests (blankets, pillows, room temperature)
   - Basic necessities (water, food, personal items)
   - Assistance with mobility or positioning
   - Pain management needs
   - Bathroom assistance

2. Understand and relay medical care needs:
   - Current discomfort or pain (scale 1-10)
   - Medication timing or questions
   - Changes in symptoms
   - Concerns about treatment

3. Communication guidelines:
   - Be warm and empathetic
   - Address the patient respectfully
   - Ask one question at a time
   - Confirm understanding of requests
   - Prioritize urgent needs
   - Maintain a calm, reassuring tone

4. Response protocol:
   - For medical assistance: Use request_nurse_assistance (urgent/emergency needs)
   - For routine care: Use schedule_appointment (doctor visits, procedures)
   - Always clarify the urgency level of requests

Keep responses focused on understanding and addressing the patient's immediate needs while ensuring their comfort and safety.";

/// Appended in stream mode, where tool calling is disabled.
pub const STREAM_FOCUS: &str = "\n\nIMPORTANT: Focus on having a natural conversation. Ask questions to understand the patient's concerns.";

/// Build the per-turn system prompt with the caller-supplied context.
pub fn context_prompt(context: &ConversationContext) -> String {
    format!(
        "{}\n\nCurrent context:\n- Patient Room: {}\n- Department: {}\n- Previous Requests: {}\n\nBased on the conversation, determine if a nursing assistance request should be created.",
        SYSTEM_PROMPT,
        context.room.as_deref().unwrap_or("Unknown"),
        context.department.as_deref().unwrap_or("General"),
        context.previous_requests.as_deref().unwrap_or("None"),
    )
}

pub const GENERIC_APOLOGY: &str = "I apologize, but I encountered an error. Please try again or call for assistance using your bedside button.";

pub const REQUEST_APOLOGY: &str = "I apologize, but I encountered an error while creating your request. Please try again or call for assistance using your bedside button.";

pub const UNPROCESSABLE_APOLOGY: &str = "I apologize, but I couldn't process that request. Is there something else I can help you with?";

pub const DECLINE_ACK: &str = "I understand. I won't submit the request. Is there something else you'd like me to help you with?";

pub const EMPTY_STREAM_APOLOGY: &str = "I apologize, but I was unable to generate a response. Please try again.";

pub const STREAM_ERROR_TOKEN: &str = "An error occurred while processing your message.";

/// Confirmation question shown before a request is submitted.
pub fn confirmation_prompt(pending: &PendingRequest) -> String {
    format!(
        "I'll help you create a request for nursing assistance. Here's what I understand:\n\nPriority: {}\nDepartment: {}\nDescription: {}\nRoom: {}\n\nWould you like me to submit this request? Please confirm with \"yes\" or \"no\".",
        pending.priority.as_str(),
        pending.department.as_str(),
        pending.description,
        pending.room,
    )
}

/// Summary returned after the patient confirms a pending request.
pub fn submitted_summary(pending: &PendingRequest) -> String {
    format!(
        "Perfect! I've submitted your request for assistance:\n\nPriority: {}\nDepartment: {}\nDescription: {}\nRoom: {}\n\nA nurse will be notified and will assist you soon.",
        pending.priority.as_str(),
        pending.department.as_str(),
        pending.description,
        pending.room,
    )
}

/// Summary returned when a request is created without a confirmation step.
pub fn created_summary(pending: &PendingRequest) -> String {
    format!(
        "I've created a request for nursing assistance:\n\nPriority: {}\nDepartment: {}\nDescription: {}\nRoom: {}\n\nA nurse will be notified and will assist you soon.",
        pending.priority.as_str(),
        pending.department.as_str(),
        pending.description,
        pending.room,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Department, Priority};

    #[test]
    fn context_prompt_embeds_caller_context() {
        let context = ConversationContext {
            room: Some("204".to_string()),
            department: Some("Cardiology".to_string()),
            previous_requests: Some("blanket".to_string()),
            ..Default::default()
        };
        let prompt = context_prompt(&context);
        assert!(prompt.contains("- Patient Room: 204"));
        assert!(prompt.contains("- Department: Cardiology"));
        assert!(prompt.contains("- Previous Requests: blanket"));
    }

    #[test]
    fn context_prompt_defaults_missing_fields() {
        let prompt = context_prompt(&ConversationContext::default());
        assert!(prompt.contains("- Patient Room: Unknown"));
        assert!(prompt.contains("- Department: General"));
        assert!(prompt.contains("- Previous Requests: None"));
    }

    #[test]
    fn confirmation_prompt_asks_for_yes_or_no() {
        let pending = PendingRequest::new(
            Priority::High,
            "pain",
            Department::Emergency,
            "204",
            None,
        );
        let text = confirmation_prompt(&pending);
        assert!(text.contains("Priority: high"));
        assert!(text.contains("\"yes\" or \"no\""));
    }
}
