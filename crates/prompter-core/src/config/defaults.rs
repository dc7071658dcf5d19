//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Prompter".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

pub fn default_gemini_fallback_model() -> String {
    "gemini-1.5-pro".to_string()
}

pub fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_temperature() -> f32 {
    0.9
}

pub fn default_top_k() -> u32 {
    1
}

pub fn default_top_p() -> f32 {
    1.0
}

pub fn default_max_output_tokens() -> u32 {
    2048
}

pub fn default_safety_threshold() -> String {
    "BLOCK_MEDIUM_AND_ABOVE".to_string()
}

pub fn default_prompt_file() -> String {
    "prompts/default.txt".to_string()
}

pub fn default_credentials_path() -> String {
    "config/credentials.json".to_string()
}

pub fn default_fallback_prompt() -> String {
    "Answer the user's question \"{{user_message}}\" concisely.".to_string()
}

pub fn default_unavailable_prompt() -> String {
    "The prompt document could not be loaded. Tell the user, briefly and politely, \
     that the service is temporarily unavailable and to try again later."
        .to_string()
}

pub fn default_api_error() -> String {
    "Sorry, something went wrong while talking to the AI. Please try again in a little while."
        .to_string()
}

pub fn default_unexpected_error() -> String {
    "Sorry, an unexpected error occurred.".to_string()
}

pub fn default_invalid_input() -> String {
    "I couldn't understand that message. Could you ask a bit more specifically?".to_string()
}

pub fn default_processing() -> String {
    "Generating a response...".to_string()
}

pub fn default_fallback_notice() -> String {
    "replying failed, so here is the message directly".to_string()
}

pub fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_api_port() -> u16 {
    3000
}
