//! Prompt construction for critiques and persona generation.
//!
//! The analysis mode is derived from which of persona and situation the user
//! filled in. Single images get the walkthrough prompt; two or three images
//! get the A/B comparison prompt with labelled screens.

use serde::Serialize;
use uxtester_types::{AnalysisRequest, ClassifiedError, ImagePart};

/// Longest accepted persona keyword, in characters.
pub const MAX_PERSONA_KEYWORD_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Neither persona nor situation given
    AiAuto,
    PersonaBased,
    SituationBased,
    /// Both persona and situation given
    Custom,
}

impl AnalysisMode {
    pub fn determine(persona: Option<&str>, situation: Option<&str>) -> Self {
        match (non_blank(persona).is_some(), non_blank(situation).is_some()) {
            (true, true) => Self::Custom,
            (true, false) => Self::PersonaBased,
            (false, true) => Self::SituationBased,
            (false, false) => Self::AiAuto,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::AiAuto => "AI automatic analysis",
            Self::PersonaBased => "Persona-based analysis",
            Self::SituationBased => "Situation-based analysis",
            Self::Custom => "Persona and situation analysis",
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn role_preamble(persona: Option<&str>, situation: Option<&str>, comparing: bool) -> String {
    let persona = non_blank(persona);
    let situation = non_blank(situation);
    let task = if comparing {
        "try each screen as if you were really using it and compare them, then"
    } else {
        "walk through this screen as a real user would, then"
    };
    match (persona, situation) {
        (None, None) => format!(
            "You are an experienced UX expert. With a meticulous, critical eye and a user-centred point of view, {task} "
        ),
        (Some(p), None) => format!(
            "Role immersion: you are now \"{p}\".\n\nFully take on this persona's traits, goals, everyday pain points and needs. Staying in character, {task} "
        ),
        (None, Some(s)) => format!(
            "You are a UX expert, but right now you are fully immersed in this situation: \"{s}\". Keeping its context, constraints and emotional state in mind, {task} "
        ),
        (Some(p), Some(s)) => format!(
            "Full role immersion: you are now \"{p}\", and you are in this situation: \"{s}\".\n\nFeel its context, constraints and time pressure. In that frame of mind, {task} "
        ),
    }
}

const WALKTHROUGH_BODY: &str = "analyze the UI in depth.

## Step-by-step user journey
While imagining you are completing a real task, think aloud at each step about:
1. **What you see** - the elements that catch your eye first
2. **What you would do next** - which control you would touch, and why
3. **How you feel** - confused, comfortable, anxious (use emoji 🤔😊😤)
4. **What you expect** - what the next screen should show

## Detailed analysis
### 1. First impression and emotional response
### 2. User journey simulation
### 3. Usability and accessibility
### 4. Emotional evaluation
- **Best part** and **most frustrating part**, with concrete reasons
- **Overall difficulty** on a scale of 1 (very hard) to 10 (very easy)
### 5. Critical improvement suggestions
- Point out even small annoyances, with concrete fixes and priorities

Write candidly and naturally, as a real user thinking to themselves.
";

/// Prompt for a single-image critique.
pub fn build_analysis_prompt(persona: Option<&str>, situation: Option<&str>) -> String {
    let mut prompt = role_preamble(persona, situation, false);
    prompt.push_str(WALKTHROUGH_BODY);
    prompt
}

/// Screen labels: "Screen A/B" for up to two images, numbered otherwise.
pub fn screen_labels(count: usize) -> Vec<String> {
    if count <= 2 {
        ["A", "B"].iter().take(count).map(|l| format!("Screen {l}")).collect()
    } else {
        (1..=count).map(|n| format!("Screen {n}")).collect()
    }
}

/// Prompt for an A/B comparison of `count` images.
pub fn build_comparison_prompt(
    count: usize,
    persona: Option<&str>,
    situation: Option<&str>,
) -> String {
    let labels = screen_labels(count);
    let mut prompt = role_preamble(persona, situation, true);
    prompt.push_str(&format!(
        "analyze the following {count} UI screens from an A/B testing perspective.\n\n"
    ));
    prompt.push_str("## Experience-based comparison\n### 1. First impressions compared\n");
    prompt.push_str("### 2. Each screen in depth\n");
    for label in &labels {
        prompt.push_str(&format!(
            "\n**{label} walkthrough**\n- User journey simulation\n- Thought flow: what you see, what to do next, how you feel, what you expect\n- Best and most frustrating parts\n- Difficulty score (1 very hard to 10 very easy)\n- Critical improvements\n"
        ));
    }
    prompt.push_str(
        "\n### 3. Side-by-side comparison\n- Usability\n- Emotional satisfaction\n- Trust\n- Efficiency\n- Error prevention\n",
    );
    prompt.push_str(
        "\n### 4. Recommendation\n- The strongest screen and why\n- Recommendations per situation or user group\n- An ideal screen combining the strengths of each\n- A prioritised improvement roadmap\n",
    );
    prompt.push_str(&format!(
        "\nClearly refer to the screens as {}, and convey a real user's honest thoughts and feelings throughout.",
        labels.join(", ")
    ));
    prompt
}

/// Build the critique request for `images`, picking the prompt by image count.
pub fn critique_request(
    images: Vec<ImagePart>,
    persona: Option<&str>,
    situation: Option<&str>,
) -> AnalysisRequest {
    let prompt = if images.len() <= 1 {
        build_analysis_prompt(persona, situation)
    } else {
        build_comparison_prompt(images.len(), persona, situation)
    };
    AnalysisRequest::new(images, prompt)
}

/// Trim and check a persona keyword.
pub fn validate_persona_keyword(keyword: &str) -> Result<&str, ClassifiedError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ClassifiedError::validation("keyword", "Please enter a keyword."));
    }
    if keyword.chars().count() > MAX_PERSONA_KEYWORD_CHARS {
        return Err(ClassifiedError::validation(
            "keyword",
            format!("Keywords are limited to {MAX_PERSONA_KEYWORD_CHARS} characters."),
        ));
    }
    Ok(keyword)
}

/// Prompt asking the model to write a user persona around `keyword`.
pub fn build_persona_prompt(keyword: &str) -> String {
    format!(
        "[Role] You are a product design expert who plans and designs a fan community and merchandise service.

[Background] Fans grow through a fan journey of five stages: discovery, exploration, purchase, immersion and devotion. Newcomers mostly stay in discovery and exploration; core fans have reached immersion and devotion. Fandoms revolve around seven activities: content consumption, information gathering, fan-to-fan communication, support, event participation, collecting and creation.

[Instructions] Based on this background, create a concrete user persona reflecting the keyword: {keyword}

The persona must include:
1. Basic information (age range, gender, occupation)
2. Fan journey stage
3. Main fandom activities
4. Purpose and patterns of using the service
5. Expected value and experience

Write it in natural, specific language."
    )
}
