// Interview prompt templates.
// Candidate-facing step messages and the LLM prompt for question generation.

pub const GREETING: &str = "Hello! I'm TalentScout's hiring assistant. \
    I'll collect your basic details and tech stack, then ask a few tailored technical questions. \
    You can type 'bye' to finish at any time.";

pub const ASK_FULL_NAME: &str = "To start, what is your full name?";
pub const ASK_EMAIL: &str = "Thanks! What is your email address?";
pub const ASK_PHONE: &str = "And your phone number?";
pub const ASK_EXPERIENCE: &str = "How many years of professional experience do you have?";
pub const ASK_POSITION: &str = "Great! What position are you interested in?";
pub const ASK_LOCATION: &str = "Thank you! What is your current location?";
pub const ASK_TECH_STACK: &str = "Please list your tech stack (programming languages, frameworks, \
    databases, tools), separated by commas.";

pub const CONCLUSION: &str = "Thank you for completing the screening! \
    We'll review your details and reach out about next steps.";
pub const CONCLUSION_EARLY: &str = "Thanks for your time! The screening has ended. \
    Feel free to start again whenever you're ready.";
pub const SESSION_ENDED: &str = "This screening session has already ended.";

pub const RECORD_SAVED: &str = "Your details have been stored securely.";
pub const RECORD_NOT_SAVED_NO_CONSENT: &str =
    "As requested, your details have not been stored.";

pub const GENERATION_UNAVAILABLE: &str = "I couldn't reach the question service just now, \
    so we'll skip the technical questions for this session. \
    You can retry the screening later to answer them.";
pub const GENERATION_MALFORMED: &str = "I wasn't able to prepare technical questions \
    for your stack, so we'll skip them for this session.";
pub const ANSWER_TRUNCATED: &str = "(Your answer was long, so it was truncated.)";

/// System prompt for technical question generation.
pub const QUESTION_GEN_SYSTEM: &str = crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Question generation prompt template. Replace `{tech_stack}` with a JSON
/// array of technology names before sending.
pub const QUESTION_GEN_PROMPT_TEMPLATE: &str = r#"You are screening a software candidate.

Tech stack JSON:
{tech_stack}

Generate exactly 3 concise technical questions for EACH technology above,
tailored to practical proficiency. Use the technology name exactly as given
as the topic.

Output JSON with this EXACT schema:
{"questions":[{"topic":"<tech>","questions":["q1","q2","q3"]}]}"#;

/// Formats the first technical question shown to the candidate.
pub fn first_question(topic: &str, question: &str) -> String {
    format!("I have prepared some technical questions for you. Let's start with {topic}: {question}")
}

/// Formats a follow-up question, announcing a topic change when it happens.
pub fn next_question(topic: &str, question: &str, new_topic: bool) -> String {
    if new_topic {
        format!("Thanks! Now let's move on to {topic}: {question}")
    } else {
        format!("Thanks! Next question on {topic}: {question}")
    }
}
