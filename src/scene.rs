//! Canonical scene-prompt vocabulary and per-node-type model defaults.
//!
//! Both tables are fixed, read-only data exposed as plain functions over
//! `match` arms rather than mutable statics: replacing a table at startup
//! (if ever needed) means swapping the function, not mutating shared state
//! in place.

/// The fixed key order `sceneBuilder` composes its prompt blocks in.
pub const SCENE_ATTRIBUTE_KEYS: &[&str] = &[
    "imageStyle",
    "lighting",
    "timeOfDay",
    "weather",
    "cameraAngle",
    "cameraLens",
    "mood",
];

/// Look up the canonical prompt text for one scene attribute's value.
///
/// Returns `None` if `attribute` isn't a recognized block or `value` isn't a
/// recognized option within that block.
#[must_use]
pub fn scene_block_text(attribute: &str, value: &str) -> Option<&'static str> {
    match attribute {
        "imageStyle" => image_style(value),
        "lighting" => lighting(value),
        "timeOfDay" => time_of_day(value),
        "weather" => weather(value),
        "cameraAngle" => camera_angle(value),
        "cameraLens" => camera_lens(value),
        "mood" => mood(value),
        _ => None,
    }
}

fn image_style(value: &str) -> Option<&'static str> {
    Some(match value {
        "photorealistic" => "Photorealistic style with lifelike detail and natural lighting",
        "anime" => "Anime art style with vibrant colors and expressive features",
        "oil-painting" => "Oil painting style with rich textures and visible brushstrokes",
        "watercolor" => "Watercolor style with soft edges and translucent washes",
        "digital-art" => "Digital art style with clean lines and vivid colors",
        "comic-book" => "Comic book style with bold outlines and dynamic poses",
        "3d-render" => "3D rendered style with realistic materials and lighting",
        "pixel-art" => "Pixel art style with retro aesthetic and limited palette",
        "pencil-sketch" => "Pencil sketch style with detailed shading and line work",
        "cinematic" => "Cinematic style with dramatic lighting and film-quality composition",
        _ => return None,
    })
}

fn lighting(value: &str) -> Option<&'static str> {
    Some(match value {
        "natural" => "Natural ambient lighting from the environment",
        "dramatic" => "Dramatic lighting with strong contrasts and deep shadows",
        "soft" => "Soft diffused lighting with gentle shadows",
        "neon" => "Neon lighting with vibrant glowing colors",
        "golden-hour" => "Golden hour lighting with warm amber tones",
        "moonlight" => "Cool moonlight illumination with blue-silver tones",
        "studio" => "Professional studio lighting with controlled highlights",
        "backlit" => "Backlit scene with silhouette effects and rim lighting",
        _ => return None,
    })
}

fn time_of_day(value: &str) -> Option<&'static str> {
    Some(match value {
        "dawn" => "Early dawn with soft pink and orange sky",
        "morning" => "Bright morning light with clear skies",
        "noon" => "Midday with overhead sun and minimal shadows",
        "afternoon" => "Warm afternoon light with lengthening shadows",
        "sunset" => "Sunset with rich orange and purple hues across the sky",
        "dusk" => "Dusk with fading light and deep blue atmosphere",
        "night" => "Nighttime setting with dark skies and artificial or moonlight",
        _ => return None,
    })
}

fn weather(value: &str) -> Option<&'static str> {
    Some(match value {
        "clear" => "Clear weather with blue skies",
        "cloudy" => "Overcast sky with diffused light",
        "rainy" => "Rainy atmosphere with wet surfaces and falling rain",
        "snowy" => "Snow-covered scene with falling snowflakes",
        "foggy" => "Foggy atmosphere with limited visibility and mystery",
        "stormy" => "Stormy weather with dark clouds and dramatic atmosphere",
        _ => return None,
    })
}

fn camera_angle(value: &str) -> Option<&'static str> {
    Some(match value {
        "eye-level" => "Shot from eye level, natural perspective",
        "low-angle" => "Low angle shot looking upward, conveying power and grandeur",
        "high-angle" => "High angle shot looking downward, showing scope and context",
        "birds-eye" => "Bird's eye view from directly above",
        "dutch-angle" => "Tilted dutch angle creating tension and unease",
        "close-up" => "Close-up shot with tight framing on the subject",
        "wide-shot" => "Wide establishing shot showing the full scene",
        _ => return None,
    })
}

fn camera_lens(value: &str) -> Option<&'static str> {
    Some(match value {
        "standard" => "Standard 50mm lens with natural perspective",
        "wide-angle" => "Wide-angle lens capturing expansive scenes with slight distortion",
        "telephoto" => "Telephoto lens with compressed perspective and shallow depth of field",
        "macro" => "Macro lens with extreme close-up detail",
        "fisheye" => "Fisheye lens with extreme wide-angle barrel distortion",
        "tilt-shift" => "Tilt-shift lens creating miniature effect with selective focus",
        _ => return None,
    })
}

fn mood(value: &str) -> Option<&'static str> {
    Some(match value {
        "peaceful" => "Peaceful and serene atmosphere",
        "mysterious" => "Mysterious and enigmatic mood with hidden elements",
        "joyful" => "Bright and joyful energy with warmth",
        "melancholic" => "Melancholic and contemplative mood with muted tones",
        "epic" => "Epic and grandiose atmosphere with awe-inspiring scale",
        "horror" => "Dark horror atmosphere with unsettling elements",
        "romantic" => "Romantic and dreamy mood with soft atmosphere",
        "futuristic" => "Futuristic and sci-fi mood with advanced technology elements",
        _ => return None,
    })
}

/// One node type's default `(provider_id, model, temperature)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelDefault {
    pub provider_id: &'static str,
    pub model: &'static str,
    pub temperature: f64,
}

/// Look up the per-type model default for `node_type`, if one exists.
///
/// `imageGenerator`, `consistentCharacter`, and `sceneBuilder` have no entry
/// here and always fall through to the model resolver's third tier.
#[must_use]
pub fn model_default(node_type: &str) -> Option<ModelDefault> {
    const MISTRAL_MINISTRAL: ModelDefault = ModelDefault {
        provider_id: "mistral",
        model: "ministral-14b-2512",
        temperature: 0.7,
    };
    Some(match node_type {
        "grammarFix" | "compressor" | "promptEnhancer" | "initialPrompt" | "translator" => MISTRAL_MINISTRAL,
        "storyTeller" => ModelDefault {
            provider_id: "mistral",
            model: "labs-mistral-small-creative",
            temperature: 0.95,
        },
        "imageDescriber" => ModelDefault {
            provider_id: "claude",
            model: "",
            temperature: 0.7,
        },
        _ => return None,
    })
}
