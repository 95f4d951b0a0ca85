//! Narrator port - flavour text and images for what happens in the empire
//!
//! The simulation never waits on narration. It queues [`NarrativeRequest`]s,
//! the runtime hands them to a [`Narrator`] on a spawned task, and whatever
//! comes back is appended to the log between ticks. Any failure simply
//! means there is no narrative.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{BuildingStyle, Era};
use crate::llm::client::LlmClient;
use crate::llm::context::EmpireContext;
use crate::simulation::crisis::Crisis;

/// Something the simulation would like narrated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NarrativeRequest {
    Chronicle(EmpireContext),
    EraTransition(Era),
    CrisisLog { crisis: Crisis, solved: bool },
    EmpireSnapshot {
        context: EmpireContext,
        style: BuildingStyle,
    },
}

/// What the narrator produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Narration {
    Text(String),
    /// Image URL or data URI
    Image(String),
}

/// Asynchronous narrative collaborator
///
/// `Ok(None)` means the narrator had nothing to say.
pub trait Narrator: Send + Sync + 'static {
    fn chronicle(
        &self,
        context: &EmpireContext,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    fn era_transition(&self, era: Era) -> impl Future<Output = Result<Option<String>>> + Send;

    fn crisis_log(
        &self,
        crisis: &Crisis,
        solved: bool,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    fn empire_snapshot(
        &self,
        context: &EmpireContext,
        style: BuildingStyle,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Run one request, turning every failure into "no narrative"
pub async fn narrate<N: Narrator>(narrator: &N, request: &NarrativeRequest) -> Option<Narration> {
    let result = match request {
        NarrativeRequest::Chronicle(ctx) => narrator.chronicle(ctx).await.map(|t| t.map(Narration::Text)),
        NarrativeRequest::EraTransition(era) => {
            narrator.era_transition(*era).await.map(|t| t.map(Narration::Text))
        }
        NarrativeRequest::CrisisLog { crisis, solved } => narrator
            .crisis_log(crisis, *solved)
            .await
            .map(|t| t.map(Narration::Text)),
        NarrativeRequest::EmpireSnapshot { context, style } => narrator
            .empire_snapshot(context, *style)
            .await
            .map(|i| i.map(Narration::Image)),
    };

    match result {
        Ok(Some(Narration::Text(text))) if text.trim().is_empty() => None,
        Ok(narration) => narration,
        Err(e) => {
            tracing::warn!("Narration failed: {}", e);
            None
        }
    }
}

/// Narrator for offline play: never says anything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    async fn chronicle(&self, _context: &EmpireContext) -> Result<Option<String>> {
        Ok(None)
    }

    async fn era_transition(&self, _era: Era) -> Result<Option<String>> {
        Ok(None)
    }

    async fn crisis_log(&self, _crisis: &Crisis, _solved: bool) -> Result<Option<String>> {
        Ok(None)
    }

    async fn empire_snapshot(
        &self,
        _context: &EmpireContext,
        _style: BuildingStyle,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

/// An optional narrator: `None` behaves like [`SilentNarrator`]
impl<N: Narrator> Narrator for Option<N> {
    async fn chronicle(&self, context: &EmpireContext) -> Result<Option<String>> {
        match self {
            Some(n) => n.chronicle(context).await,
            None => Ok(None),
        }
    }

    async fn era_transition(&self, era: Era) -> Result<Option<String>> {
        match self {
            Some(n) => n.era_transition(era).await,
            None => Ok(None),
        }
    }

    async fn crisis_log(&self, crisis: &Crisis, solved: bool) -> Result<Option<String>> {
        match self {
            Some(n) => n.crisis_log(crisis, solved).await,
            None => Ok(None),
        }
    }

    async fn empire_snapshot(
        &self,
        context: &EmpireContext,
        style: BuildingStyle,
    ) -> Result<Option<String>> {
        match self {
            Some(n) => n.empire_snapshot(context, style).await,
            None => Ok(None),
        }
    }
}

const NARRATOR_SYSTEM: &str = "You are the chronicler of a civilization-building game. \
Write short, atmospheric, slightly dramatic prose. Never use lists or headings.";

/// Narrator backed by an LLM HTTP API
pub struct LlmNarrator {
    client: LlmClient,
}

impl LlmNarrator {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LlmClient::from_env()?))
    }
}

/// Chronicle prompt for the current empire
pub fn chronicle_prompt(ctx: &EmpireContext) -> String {
    let mut prompt = format!(
        "Current state of the civilization:\n{}\n\
         Write a short, epic 2-3 sentence chronicle entry about this civilization. \
         Mention how the {} climate shapes daily life.",
        ctx.summary(),
        ctx.climate
    );
    if ctx.idle > ctx.population as i64 / 2 {
        prompt.push_str(" Many people have no work.");
    } else if ctx.idle < 0 {
        prompt.push_str(" There are not enough hands for all the work.");
    }
    prompt
}

pub fn era_prompt(era: Era) -> String {
    format!(
        "The civilization has entered a new era: {}. \
         Write an inspiring 2 sentence message celebrating the progress of its people.",
        era
    )
}

pub fn crisis_prompt(crisis: &Crisis, solved: bool) -> String {
    let outcome = if solved {
        "THE PEOPLE OVERCAME THIS CRISIS"
    } else {
        "THE CRISIS HARMED THE CIVILIZATION"
    };
    format!(
        "A crisis struck the civilization: {} ({}).\nOutcome: {}.\n\
         Write a single dramatic sentence for the chronicle.",
        crisis.name, crisis.description, outcome
    )
}

/// Image prompt in the empire's dominant architectural style
pub fn snapshot_prompt(ctx: &EmpireContext, style: BuildingStyle) -> String {
    let atmosphere = match style {
        BuildingStyle::Military => {
            "Strong fortress walls, military banners, disciplined, dark and red tones."
        }
        BuildingStyle::Economic => {
            "Busy markets, golden rooftops, trade caravans, rich and amber tones."
        }
        BuildingStyle::None => "Peaceful village, balanced architecture, harmonious colors.",
    };
    let buildings = ctx
        .buildings
        .iter()
        .map(|(name, count)| format!("{} {}", count, name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Digital concept art of a civilization city. Era: {}. Climate: {}. \
         Buildings visible: {}. Atmosphere: {} High quality, detailed, isometric view.",
        ctx.era,
        ctx.climate,
        if buildings.is_empty() { "Small settlement".to_string() } else { buildings },
        atmosphere
    )
}

impl Narrator for LlmNarrator {
    async fn chronicle(&self, context: &EmpireContext) -> Result<Option<String>> {
        let text = self.client.complete(NARRATOR_SYSTEM, &chronicle_prompt(context)).await?;
        Ok(Some(text))
    }

    async fn era_transition(&self, era: Era) -> Result<Option<String>> {
        let text = self.client.complete(NARRATOR_SYSTEM, &era_prompt(era)).await?;
        Ok(Some(text))
    }

    async fn crisis_log(&self, crisis: &Crisis, solved: bool) -> Result<Option<String>> {
        let text = self
            .client
            .complete(NARRATOR_SYSTEM, &crisis_prompt(crisis, solved))
            .await?;
        Ok(Some(text))
    }

    async fn empire_snapshot(
        &self,
        context: &EmpireContext,
        style: BuildingStyle,
    ) -> Result<Option<String>> {
        self.client.generate_image(&snapshot_prompt(context, style)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CivError;
    use crate::core::config::SimulationConfig;
    use crate::simulation::crisis::CrisisCatalog;
    use crate::simulation::state::Simulation;

    struct FailingNarrator;

    impl Narrator for FailingNarrator {
        async fn chronicle(&self, _context: &EmpireContext) -> Result<Option<String>> {
            Err(CivError::LlmError("connection refused".into()))
        }

        async fn era_transition(&self, _era: Era) -> Result<Option<String>> {
            Ok(Some("   ".into()))
        }

        async fn crisis_log(&self, crisis: &Crisis, solved: bool) -> Result<Option<String>> {
            Ok(Some(format!("{} {}", crisis.id, solved)))
        }

        async fn empire_snapshot(
            &self,
            _context: &EmpireContext,
            _style: BuildingStyle,
        ) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn context() -> EmpireContext {
        EmpireContext::from_state(&Simulation::new(SimulationConfig::default()).state)
    }

    #[tokio::test]
    async fn test_failures_become_no_narrative() {
        let narrator = FailingNarrator;

        assert_eq!(narrate(&narrator, &NarrativeRequest::Chronicle(context())).await, None);
        assert_eq!(
            narrate(&narrator, &NarrativeRequest::EraTransition(Era::Industrial)).await,
            None,
            "Blank text counts as nothing"
        );

        let storm = CrisisCatalog::with_defaults().get("storm").cloned().unwrap();
        assert_eq!(
            narrate(&narrator, &NarrativeRequest::CrisisLog { crisis: storm, solved: true }).await,
            Some(Narration::Text("storm true".into()))
        );
    }

    #[tokio::test]
    async fn test_silent_narrator() {
        let request = NarrativeRequest::EmpireSnapshot {
            context: context(),
            style: BuildingStyle::None,
        };
        assert_eq!(narrate(&SilentNarrator, &request).await, None);
    }

    #[test]
    fn test_snapshot_prompt_follows_style() {
        let ctx = context();
        assert!(snapshot_prompt(&ctx, BuildingStyle::Military).contains("fortress walls"));
        assert!(snapshot_prompt(&ctx, BuildingStyle::Economic).contains("golden rooftops"));
        assert!(snapshot_prompt(&ctx, BuildingStyle::None).contains("Small settlement"));
    }

    #[test]
    fn test_crisis_prompt_outcome() {
        let plague = CrisisCatalog::with_defaults().get("plague").cloned().unwrap();
        assert!(crisis_prompt(&plague, false).contains("HARMED"));
        assert!(crisis_prompt(&plague, true).contains("OVERCAME"));
    }
}
