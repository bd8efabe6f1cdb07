//! Prompt text for every request the crate sends.

use reverie_shared::{tri_state_label, ContentType, DreamDraft};

use crate::language::language_name;

pub const INTERPRETATION_SYSTEM_PROMPT: &str = "You are a multilingual dream interpreter. \
You always answer in the same language as the dream description you are given. \
Respond with a single JSON object and nothing else, using exactly these keys: \
\"dreamName\" (a short evocative title), \
\"quickOverview\" (two or three sentences), \
\"inDepthInterpretation\" (a detailed analysis of symbols and emotions), \
\"dailyLifeConnection\" (how the dream may relate to the dreamer's waking life), \
\"recommendations\" (a single string of practical suggestions, one per line), \
\"refinedDescription\" (the dream description rewritten with corrected spelling and grammar, same language). \
Every value must be a string.";

/// User message for an interpretation request.
pub fn interpretation_user_prompt(draft: &DreamDraft, language_code: &str) -> String {
    let language = language_name(language_code);
    format!(
        "Interpret the following dream.\n\
         \n\
         Dream description: {description}\n\
         Woke up during the dream: {woke}\n\
         Negative emotions: {negative}\n\
         Intensity (1-10): {intensity}\n\
         \n\
         The dream was written in {language} ({code}). \
         Your response MUST be written entirely in {language}, including the dream name. \
         Use the JSON keys exactly as specified, in English.",
        description = draft.description.trim(),
        woke = tri_state_label(draft.did_wake_up),
        negative = tri_state_label(draft.had_negative_emotions),
        intensity = draft.intensity_level,
        code = language_code,
    )
}

pub const CONTENT_SYSTEM_PROMPT: &str = "You are an expert on sleep science, dream research and \
lucid dreaming who writes short, accurate and encouraging educational pieces.";

fn topic_brief(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::DailyRitual => {
            "a calming daily ritual that helps the reader remember and reflect on their dreams"
        }
        ContentType::LucidDreaming => {
            "a practical lucid dreaming lesson with concrete techniques the reader can try tonight"
        }
        ContentType::DreamingFact => {
            "a surprising, scientifically grounded fact about dreaming and the research behind it"
        }
    }
}

/// JSON-mode prompt that enumerates the required fields.
pub fn strict_content_prompt(content_type: ContentType) -> String {
    format!(
        "Write {brief}.\n\
         Respond with a single JSON object with exactly these fields:\n\
         - \"title\": string\n\
         - \"introduction\": string\n\
         - \"sections\": array of objects, each with \"heading\" (string) and \"content\" (string), at least two entries\n\
         - \"conclusion\": string\n\
         Do not include any other text.",
        brief = topic_brief(content_type),
    )
}

/// Prose prompt whose answer is parsed by the freeform parser.
pub fn freeform_content_prompt(content_type: ContentType) -> String {
    let section_word = match content_type {
        ContentType::LucidDreaming => "Technique",
        ContentType::DreamingFact => "Key Point",
        ContentType::DailyRitual => "Section",
    };
    format!(
        "Write {brief}.\n\
         Format the answer as plain text:\n\
         Title: <title>\n\
         Introduction: <one short paragraph>\n\
         {section_word} 1: <heading>\n\
         <one or two paragraphs>\n\
         (two to four numbered parts in total)\n\
         Conclusion: <one short paragraph>",
        brief = topic_brief(content_type),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretation_prompt_carries_metadata_and_language() {
        let draft = DreamDraft::new("Soñé que volaba", Some(false), None, 8);
        let prompt = interpretation_user_prompt(&draft, "es");
        assert!(prompt.contains("Soñé que volaba"));
        assert!(prompt.contains("Woke up during the dream: No"));
        assert!(prompt.contains("Negative emotions: Not specified"));
        assert!(prompt.contains("Intensity (1-10): 8"));
        assert!(prompt.contains("MUST be written entirely in Spanish"));
    }

    #[test]
    fn strict_prompt_lists_required_fields() {
        for ty in ContentType::ALL {
            let prompt = strict_content_prompt(ty);
            for field in ["\"title\"", "\"introduction\"", "\"sections\"", "\"heading\"", "\"conclusion\""] {
                assert!(prompt.contains(field), "{ty}: missing {field}");
            }
        }
    }
}
