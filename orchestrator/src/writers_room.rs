//! Writers room sessions
//!
//! A session opens with one lead specialist. Two more specialists then
//! respond to the lead's material concurrently, and everything is collected
//! into a single session report.

use std::fmt::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use futures_util::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dispatch::ModelDispatcher;
use crate::error::OrchestratorError;
use crate::llm::{Message, ThinkingMode};
use crate::prompts::writers::{session_follow_up, session_lead, SessionBrief};

/// Model used for every writers room call unless configured otherwise
pub const DEFAULT_WRITERS_MODEL: &str = "ollama";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    CharacterDevelopment,
    PlotDevelopment,
    DialogueWriting,
    WorldBuilding,
    StoryOutlining,
    GenreConsultation,
}

impl SessionType {
    pub const ALL: [SessionType; 6] = [
        Self::CharacterDevelopment,
        Self::PlotDevelopment,
        Self::DialogueWriting,
        Self::WorldBuilding,
        Self::StoryOutlining,
        Self::GenreConsultation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CharacterDevelopment => "character_development",
            Self::PlotDevelopment => "plot_development",
            Self::DialogueWriting => "dialogue_writing",
            Self::WorldBuilding => "world_building",
            Self::StoryOutlining => "story_outlining",
            Self::GenreConsultation => "genre_consultation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CharacterDevelopment => "Character Development",
            Self::PlotDevelopment => "Plot Development",
            Self::DialogueWriting => "Dialogue Writing",
            Self::WorldBuilding => "World Building",
            Self::StoryOutlining => "Story Outlining",
            Self::GenreConsultation => "Genre Consultation",
        }
    }

    /// Lead step followed by the two specialists who respond to it
    pub fn plan(&self) -> &'static SessionPlan {
        match self {
            Self::CharacterDevelopment => &CHARACTER_DEVELOPMENT,
            Self::PlotDevelopment => &PLOT_DEVELOPMENT,
            Self::DialogueWriting => &DIALOGUE_WRITING,
            Self::WorldBuilding => &WORLD_BUILDING,
            Self::StoryOutlining => &STORY_OUTLINING,
            Self::GenreConsultation => &GENRE_CONSULTATION,
        }
    }
}

impl FromStr for SessionType {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| OrchestratorError::UnknownSessionType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Specialist {
    CharacterDeveloper,
    PlotArchitect,
    DialogueCoach,
    WorldBuilder,
    GenreConsultant,
    ToneDirector,
}

impl Specialist {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CharacterDeveloper => "character_developer",
            Self::PlotArchitect => "plot_architect",
            Self::DialogueCoach => "dialogue_coach",
            Self::WorldBuilder => "world_builder",
            Self::GenreConsultant => "genre_consultant",
            Self::ToneDirector => "tone_director",
        }
    }

    /// Role name as written in prompts
    pub fn role(&self) -> &'static str {
        match self {
            Self::CharacterDeveloper => "character developer",
            Self::PlotArchitect => "plot architect",
            Self::DialogueCoach => "dialogue coach",
            Self::WorldBuilder => "world builder",
            Self::GenreConsultant => "genre consultant",
            Self::ToneDirector => "tone director",
        }
    }
}

#[derive(Debug)]
pub struct SessionStep {
    pub title: &'static str,
    pub specialist: Specialist,
    pub focus: &'static str,
    pub thinking: ThinkingMode,
}

#[derive(Debug)]
pub struct SessionPlan {
    pub lead: SessionStep,
    pub follow_ups: [SessionStep; 2],
}

use Specialist::*;
use ThinkingMode::{High, Medium};

const fn step(
    title: &'static str,
    specialist: Specialist,
    thinking: ThinkingMode,
    focus: &'static str,
) -> SessionStep {
    SessionStep {
        title,
        specialist,
        focus,
        thinking,
    }
}

static CHARACTER_DEVELOPMENT: SessionPlan = SessionPlan {
    lead: step(
        "Character Profile",
        CharacterDeveloper,
        High,
        "Create the character: name, role, core traits, backstory and what they want.",
    ),
    follow_ups: [
        step(
            "Plot Integration",
            PlotArchitect,
            Medium,
            "Give this character an arc and list the key story moments they drive.",
        ),
        step(
            "Character Voice",
            DialogueCoach,
            Medium,
            "Describe how this character speaks and write a few sample lines.",
        ),
    ],
};

static PLOT_DEVELOPMENT: SessionPlan = SessionPlan {
    lead: step(
        "Plot Structure",
        PlotArchitect,
        High,
        "Lay out a three-act structure with the key beats of each act.",
    ),
    follow_ups: [
        step(
            "Character Arcs",
            CharacterDeveloper,
            Medium,
            "Map how each main character changes across this structure.",
        ),
        step(
            "Genre Considerations",
            GenreConsultant,
            Medium,
            "List the genre conventions this plot uses or breaks and what readers will expect.",
        ),
    ],
};

static DIALOGUE_WRITING: SessionPlan = SessionPlan {
    lead: step(
        "Dialogue Samples",
        DialogueCoach,
        Medium,
        "Write a short exchange of dialogue for the topic with a clear subtext.",
    ),
    follow_ups: [
        step(
            "Character Consistency",
            CharacterDeveloper,
            Medium,
            "Check that each voice matches its speaker's personality.",
        ),
        step(
            "Emotional Impact",
            ToneDirector,
            Medium,
            "Compare the intended emotional effect with what the lines actually do.",
        ),
    ],
};

static WORLD_BUILDING: SessionPlan = SessionPlan {
    lead: step(
        "World Details",
        WorldBuilder,
        High,
        "Describe the setting, its history, its rules and the places that matter.",
    ),
    follow_ups: [
        step(
            "Genre Integration",
            GenreConsultant,
            Medium,
            "Show how this world supports the genre and where it could push further.",
        ),
        step(
            "Atmospheric Consistency",
            ToneDirector,
            Medium,
            "Check that mood and atmosphere hold together across the setting.",
        ),
    ],
};

static STORY_OUTLINING: SessionPlan = SessionPlan {
    lead: step(
        "Story Outline",
        PlotArchitect,
        High,
        "Outline the story chapter by chapter with the turning points marked.",
    ),
    follow_ups: [
        step(
            "Character Integration",
            CharacterDeveloper,
            Medium,
            "Place the characters in the outline and note where each one grows.",
        ),
        step(
            "Setting Integration",
            WorldBuilder,
            Medium,
            "Attach a location and its atmosphere to each part of the outline.",
        ),
    ],
};

static GENRE_CONSULTATION: SessionPlan = SessionPlan {
    lead: step(
        "Genre Analysis",
        GenreConsultant,
        Medium,
        "Analyse the genre: its conventions, audience expectations and common pitfalls.",
    ),
    follow_ups: [
        step(
            "Tone Guidance",
            ToneDirector,
            Medium,
            "Recommend a tone that fits this genre analysis and how to sustain it.",
        ),
        step(
            "Plotting Guidance",
            PlotArchitect,
            Medium,
            "Suggest plot structures and pacing that suit this genre.",
        ),
    ],
};

/// Input for one writers room session
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionRequest {
    /// One of the session type names, e.g. `character_development`
    #[serde(default = "default_session_type")]
    pub session_type: String,

    #[serde(default, alias = "session_topic")]
    pub topic: String,

    #[serde(default = "default_genre")]
    pub genre: String,

    #[serde(default = "default_tone")]
    pub tone: String,

    #[serde(default = "default_style", alias = "collaboration_style")]
    pub style: String,

    #[serde(default = "default_duration", alias = "session_duration")]
    pub duration: String,

    #[serde(default, alias = "specific_requirements")]
    pub requirements: Vec<String>,
}

fn default_session_type() -> String {
    SessionType::CharacterDevelopment.as_str().to_string()
}

fn default_genre() -> String {
    "horror".to_string()
}

fn default_tone() -> String {
    "dark".to_string()
}

fn default_style() -> String {
    "roundtable".to_string()
}

fn default_duration() -> String {
    "medium".to_string()
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            session_type: default_session_type(),
            topic: String::new(),
            genre: default_genre(),
            tone: default_tone(),
            style: default_style(),
            duration: default_duration(),
            requirements: Vec::new(),
        }
    }
}

impl SessionRequest {
    pub fn new(session_type: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            session_type: session_type.into(),
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    fn brief(&self) -> SessionBrief<'_> {
        SessionBrief {
            topic: &self.topic,
            genre: &self.genre,
            tone: &self.tone,
            style: &self.style,
            duration: &self.duration,
            requirements: &self.requirements,
        }
    }
}

/// One specialist's part of a session
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub title: String,
    pub specialist: Specialist,
    /// Model output, or `Error: {message}`
    pub text: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Short id for referring back to this session
    pub session_id: String,
    pub session_type: SessionType,
    pub topic: String,
    pub genre: String,
    pub tone: String,
    pub style: String,
    pub duration: String,
    pub generated_at: DateTime<Local>,
    /// Lead first, then follow-ups in plan order
    pub contributions: Vec<Contribution>,
    pub duration_ms: u64,
}

fn title_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl SessionReport {
    pub fn render(&self) -> String {
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "# Writers Room: {}\n\n\
             - **Topic:** {}\n\
             - **Genre:** {}\n\
             - **Tone:** {}\n\
             - **Style:** {}\n\
             - **Duration:** {}\n\
             - **Session ID:** {}\n\
             - **Generated:** {}\n\n",
            self.session_type.display_name(),
            self.topic,
            title_case(&self.genre),
            title_case(&self.tone),
            title_case(&self.style),
            title_case(&self.duration),
            self.session_id,
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
        );

        for contribution in &self.contributions {
            let _ = write!(
                out,
                "## {} ({})\n\n{}\n\n---\n\n",
                contribution.title,
                contribution.specialist.role(),
                contribution.text
            );
        }

        let _ = write!(
            out,
            "## Session Notes\n\n\
             - Specialists contributing: {} of {}\n\
             - Reference session {} in follow-up writing work\n\n",
            self.contributions.iter().filter(|c| c.success).count(),
            self.contributions.len(),
            self.session_id
        );
        out
    }
}

/// Runs writers room sessions against a single model
pub struct WritersRoom {
    dispatcher: Arc<ModelDispatcher>,
    model: String,
}

impl WritersRoom {
    pub fn new(dispatcher: Arc<ModelDispatcher>) -> Self {
        Self {
            dispatcher,
            model: DEFAULT_WRITERS_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn call(
        &self,
        prompt: String,
        thinking: ThinkingMode,
    ) -> Result<String, OrchestratorError> {
        self.dispatcher
            .generate(&[Message::user(prompt)], &self.model, thinking)
            .await
            .map_err(|source| OrchestratorError::AgentExecutionFailed {
                agent: "writers_room".to_string(),
                model: self.model.clone(),
                source,
            })
    }

    /// Run one session
    ///
    /// An unknown session type or empty topic fails before any model call. A
    /// failed lead fails the session; failed follow-ups are reported inline.
    pub async fn run(&self, request: &SessionRequest) -> Result<SessionReport, OrchestratorError> {
        let session_type: SessionType = request.session_type.parse()?;
        if request.topic.trim().is_empty() {
            return Err(OrchestratorError::missing_field("writers_room", "topic"));
        }

        let start = Instant::now();
        let session_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let plan = session_type.plan();
        let brief = request.brief();

        tracing::info!(
            session_id = %session_id,
            session_type = session_type.as_str(),
            model = %self.model,
            "Writers room session started"
        );

        let lead = &plan.lead;
        let lead_output = self
            .call(
                session_lead(&brief, lead.title, lead.specialist.role(), lead.focus),
                lead.thinking,
            )
            .await?;

        let follow_ups = join_all(plan.follow_ups.iter().map(|step| {
            let prompt = session_follow_up(
                &brief,
                step.title,
                step.specialist.role(),
                step.focus,
                (lead.title, lead.specialist.role(), &lead_output),
            );
            async move {
                match self.call(prompt, step.thinking).await {
                    Ok(text) => Contribution {
                        title: step.title.to_string(),
                        specialist: step.specialist,
                        text,
                        success: true,
                    },
                    Err(e) => {
                        tracing::warn!(
                            specialist = step.specialist.as_str(),
                            error = %e,
                            "Specialist failed"
                        );
                        Contribution {
                            title: step.title.to_string(),
                            specialist: step.specialist,
                            text: format!("Error: {}", e),
                            success: false,
                        }
                    }
                }
            }
        }))
        .await;

        let mut contributions = Vec::with_capacity(1 + follow_ups.len());
        contributions.push(Contribution {
            title: lead.title.to_string(),
            specialist: lead.specialist,
            text: lead_output,
            success: true,
        });
        contributions.extend(follow_ups);

        Ok(SessionReport {
            session_id,
            session_type,
            topic: request.topic.clone(),
            genre: request.genre.clone(),
            tone: request.tone.clone(),
            style: request.style.clone(),
            duration: request.duration.clone(),
            generated_at: Local::now(),
            contributions,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ProviderRegistry, ScriptedProvider};
    use serde_json::json;

    fn room(provider: &Arc<ScriptedProvider>) -> WritersRoom {
        WritersRoom::new(Arc::new(ModelDispatcher::new(ProviderRegistry::scripted(
            provider.clone(),
        ))))
    }

    #[test]
    fn test_session_type_names() {
        for session_type in SessionType::ALL {
            assert_eq!(session_type.as_str().parse::<SessionType>().unwrap(), session_type);
        }
        let err = "musical_number".parse::<SessionType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown session type: musical_number");
    }

    #[test]
    fn test_plans_use_distinct_specialists() {
        for session_type in SessionType::ALL {
            let plan = session_type.plan();
            let [a, b] = &plan.follow_ups;
            assert_ne!(plan.lead.specialist, a.specialist, "{}", session_type.as_str());
            assert_ne!(plan.lead.specialist, b.specialist, "{}", session_type.as_str());
            assert_ne!(a.specialist, b.specialist, "{}", session_type.as_str());
        }
    }

    #[tokio::test]
    async fn test_every_session_type_runs_three_specialists() {
        let expected = [
            ["Character Profile", "Plot Integration", "Character Voice"],
            ["Plot Structure", "Character Arcs", "Genre Considerations"],
            ["Dialogue Samples", "Character Consistency", "Emotional Impact"],
            ["World Details", "Genre Integration", "Atmospheric Consistency"],
            ["Story Outline", "Character Integration", "Setting Integration"],
            ["Genre Analysis", "Tone Guidance", "Plotting Guidance"],
        ];

        for (session_type, titles) in SessionType::ALL.into_iter().zip(expected) {
            let provider = Arc::new(ScriptedProvider::new());
            let request =
                SessionRequest::new(session_type.as_str(), "A motel that rents by the hour");

            let report = room(&provider).run(&request).await.unwrap();

            let got: Vec<_> = report.contributions.iter().map(|c| c.title.as_str()).collect();
            assert_eq!(got, titles, "{}", session_type.as_str());
            assert!(report.contributions.iter().all(|c| c.success));
            assert_eq!(report.session_type, session_type);

            let calls = provider.calls();
            assert_eq!(calls.len(), 3);
            assert!(calls.iter().all(|c| c.model == "ollama"));
            assert!(calls[0].prompt.starts_with(&format!("# Writers Room: {}", titles[0])));
            assert_eq!(calls[0].thinking_mode, session_type.plan().lead.thinking);
        }
    }

    #[tokio::test]
    async fn test_follow_ups_see_lead_output() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply_when("# Writers Room: World Details", "A flooded mall, 1987"),
        );
        let request = SessionRequest::new("world_building", "Mall after closing")
            .with_genre("slasher")
            .with_tone("tense")
            .with_requirement("Keep it PG-13");

        let report = room(&provider).run(&request).await.unwrap();

        assert_eq!(report.contributions[0].text, "A flooded mall, 1987");
        let calls = provider.calls();
        assert!(calls[0].prompt.contains("- **Genre:** slasher"));
        assert!(calls[0].prompt.contains("- Keep it PG-13"));
        for call in &calls[1..] {
            assert!(call
                .prompt
                .contains("## World Details (from the world builder)\nA flooded mall, 1987"));
        }
    }

    #[tokio::test]
    async fn test_unknown_session_type_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::new());
        let request = SessionRequest::new("musical_number", "Anything");

        let err = room(&provider).run(&request).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::UnknownSessionType(ref t) if t == "musical_number"
        ));
        assert!(err.is_caller_error());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_topic() {
        let provider = Arc::new(ScriptedProvider::new());
        let err = room(&provider)
            .run(&SessionRequest::new("plot_development", "  "))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Missing required field 'topic' for agent writers_room");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_lead_failure_fails_session() {
        let provider = Arc::new(
            ScriptedProvider::new().fail_when("# Writers Room: Genre Analysis", "offline"),
        );
        let request = SessionRequest::new("genre_consultation", "Folk horror");

        let err = room(&provider).run(&request).await.unwrap_err();
        assert!(!err.is_caller_error());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_failure_is_inline() {
        let provider = Arc::new(
            ScriptedProvider::new().fail_when("# Writers Room: Emotional Impact", "offline"),
        );
        let request = SessionRequest::new("dialogue_writing", "Two clerks at closing time");

        let report = room(&provider).run(&request).await.unwrap();

        assert!(report.contributions[1].success);
        assert!(!report.contributions[2].success);
        assert!(report.contributions[2].text.starts_with("Error: "));
        assert!(report.render().contains("- Specialists contributing: 2 of 3\n"));
    }

    #[tokio::test]
    async fn test_render_and_configured_model() {
        let provider = Arc::new(ScriptedProvider::new());
        let room = room(&provider).with_model("claude-haiku");
        let request: SessionRequest = serde_json::from_value(json!({
            "session_type": "story_outlining",
            "session_topic": "The last video store",
            "collaboration_style": "brainstorm",
            "session_duration": "long"
        }))
        .unwrap();

        let report = room.run(&request).await.unwrap();
        let text = report.render();

        assert_eq!(report.session_id.len(), 8);
        assert!(text.starts_with(
            "# Writers Room: Story Outlining\n\n- **Topic:** The last video store\n"
        ));
        assert!(text.contains(
            "- **Genre:** Horror\n- **Tone:** Dark\n- **Style:** Brainstorm\n- **Duration:** Long\n"
        ));
        assert!(text.contains(&format!("- **Session ID:** {}\n", report.session_id)));
        assert!(text.contains("## Setting Integration (world builder)\n\n"));
        assert!(provider.calls().iter().all(|c| c.model == "claude-haiku"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cosmic_horror"), "Cosmic Horror");
        assert_eq!(title_case("DARK"), "Dark");
        assert_eq!(title_case(""), "");
    }
}
