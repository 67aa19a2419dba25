//! Fixed prompt templates and the language code→name table.
//!
//! Each provider-calling executor builds its chat messages from one of
//! these templates so its behavior stays concretely defined rather than
//! ad hoc per call site.

use crate::executors::helpers::Persona;
use crate::providers::ChatMessage;

/// Shared cap most prompt-calling executors instruct the model to respect.
pub const PROVIDER_OUTPUT_CHAR_CAP: usize = 2500;

/// `promptEnhancer`: with `notes`, apply enhancement instructions to the
/// prompt; without, enrich a simple prompt with composition/lighting/style/mood.
#[must_use]
pub fn enhance(prompt: &str, notes: Option<&str>) -> Vec<ChatMessage> {
    let system = match notes {
        Some(_) => {
            "You are a prompt enhancement assistant. Apply the user's enhancement \
             instructions to the original prompt, preserving its core intent. \
             Output only the enhanced prompt."
        }
        None => {
            "You are a prompt enhancement assistant. Enrich the given prompt with \
             vivid composition, lighting, style, and mood detail while preserving its \
             core intent. Output only the enhanced prompt."
        }
    };
    let user = match notes {
        Some(notes) => format!(
            "Prompt:\n{prompt}\n\nEnhancement instructions:\n{notes}\n\n\
             Respond in no more than {PROVIDER_OUTPUT_CHAR_CAP} characters."
        ),
        None => format!("Prompt:\n{prompt}\n\nRespond in no more than {PROVIDER_OUTPUT_CHAR_CAP} characters."),
    };
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// `translator`: translate to the resolved language name only.
#[must_use]
pub fn translate(text: &str, language_name: &str) -> Vec<ChatMessage> {
    let system = format!(
        "You are a translation assistant. Translate the given text to {language_name}. \
         Output only the translation, no more than {PROVIDER_OUTPUT_CHAR_CAP} characters."
    );
    vec![ChatMessage::system(system), ChatMessage::user(text.to_string())]
}

/// `grammarFix`: correct grammar/spelling/punctuation, optionally nudging tone.
#[must_use]
pub fn grammar_fix(text: &str, style: Option<&str>) -> Vec<ChatMessage> {
    let mut system = "You are a grammar correction assistant. Fix grammar, spelling, \
         and punctuation while preserving the original structure and length."
        .to_string();
    if let Some(style) = style {
        system.push_str(&format!(" Nudge the tone toward this style: {style}."));
    }
    vec![ChatMessage::system(system), ChatMessage::user(text.to_string())]
}

/// `storyTeller`: bold, non-repeating literary narrative in markdown.
#[must_use]
pub fn storyteller(idea: &str, tags: Option<&str>) -> Vec<ChatMessage> {
    let mut system = format!(
        "You are a literary storyteller. Write a bold, non-repeating narrative in \
         markdown (headings and italics allowed, no bold text), focused on words, \
         emotion, and atmosphere rather than visual description. \
         Respond in no more than {PROVIDER_OUTPUT_CHAR_CAP} characters."
    );
    if let Some(tags) = tags {
        system.push_str(&format!(" Let these tags steer tone and theme: {tags}."));
    }
    vec![ChatMessage::system(system), ChatMessage::user(idea.to_string())]
}

/// `compressor`: shorter rendering preserving all information.
#[must_use]
pub fn compress(text: &str) -> Vec<ChatMessage> {
    let system = "You are a text compression assistant. Produce a shorter rendering \
         of the input that preserves all information. Output only the compressed text."
        .to_string();
    vec![ChatMessage::system(system), ChatMessage::user(text.to_string())]
}

/// `inject_persona`: weave persona physical traits into existing references,
/// never adding clothing, never dropping original scene content.
#[must_use]
pub fn inject_persona(personas: &[Persona], prompt: &str) -> Vec<ChatMessage> {
    let roster = personas
        .iter()
        .map(|p| format!("- {}: {}", p.name, p.description))
        .collect::<Vec<_>>()
        .join("\n");
    let system = format!(
        "You are a persona-injection assistant. Weave each character's physical \
         traits into existing references to them in the prompt. Never add clothing \
         descriptions and never drop any original scene content. \
         Respond in no more than {PROVIDER_OUTPUT_CHAR_CAP} characters.\n\nCharacters:\n{roster}"
    );
    vec![ChatMessage::system(system), ChatMessage::user(prompt.to_string())]
}

/// A vision-describer system prompt instructing a rich, reconstructable description.
#[must_use]
pub fn describe_image_system_prompt() -> &'static str {
    "You are an image description assistant. Describe this image in enough detail \
     that someone could reconstruct its composition, subjects, colors, lighting, and \
     mood without seeing it."
}

/// ISO 639-1-ish language code → human-readable name. Unrecognized codes pass
/// through verbatim.
#[must_use]
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "tr" => "Turkish",
        "pl" => "Polish",
        "nl" => "Dutch",
        "sv" => "Swedish",
        "da" => "Danish",
        "no" => "Norwegian",
        "fi" => "Finnish",
        "cs" => "Czech",
        "el" => "Greek",
        "he" => "Hebrew",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "id" => "Indonesian",
        "ms" => "Malay",
        "uk" => "Ukrainian",
        "ro" => "Romanian",
        other => other,
    }
}
