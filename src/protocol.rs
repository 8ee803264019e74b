//! Wire types shared by the HTTP API and the `/ws` channel. Field names are camelCase;
//! WebSocket messages are tagged by a snake_case `type`.

use serde::{Deserialize, Serialize};

use crate::domain::{AnswerValue, GameMode, Position, QuestionType, Runners, Scenario, ScenarioCategory};
use crate::validate::ball_zone_coordinates;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartRound(StartRoundIn),
    NextPrompt {
        #[serde(rename = "roundId")]
        round_id: String,
    },
    SubmitAnswer(WsAnswerIn),
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    RoundStarted(RoundStartedOut),
    Prompt(PromptOut),
    AnswerResult(AnswerOut),
    Error {
        message: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsAnswerIn {
    pub round_id: String,
    pub choice: usize,
    #[serde(default)]
    pub elapsed_ms: u64,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRoundIn {
    pub mode: GameMode,
    /// Primary focus first, optional secondary second.
    #[serde(default)]
    pub focus: Vec<Position>,
    /// Overrides the configured weak-spot count for weak-spot rounds.
    #[serde(default)]
    pub weak_spot_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStartedOut {
    pub round_id: String,
    pub mode: GameMode,
    pub total: usize,
}

/// What the field diagram needs to draw the situation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationOut {
    pub scenario_id: String,
    pub title: String,
    pub category: ScenarioCategory,
    pub runners: Runners,
    pub ball_zone: String,
    pub ball_xy: Option<(f32, f32)>,
}

impl SituationOut {
    pub fn from_scenario(s: &Scenario) -> Self {
        Self {
            scenario_id: s.id.clone(),
            title: s.title.clone(),
            category: s.category,
            runners: s.situation.runners,
            ball_zone: s.situation.ball_zone.clone(),
            ball_xy: ball_zone_coordinates(&s.situation.ball_zone),
        }
    }
}

/// A resolved prompt as shown to the player. The correct index is withheld.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOut {
    pub round_id: String,
    pub index: usize,
    pub total: usize,
    pub situation: SituationOut,
    pub position: Position,
    pub question_type: QuestionType,
    pub options: Vec<AnswerValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub choice: usize,
    #[serde(default)]
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub correct: bool,
    pub correct_index: usize,
    pub correct_answer: AnswerValue,
    pub explanation: String,
    pub score: u32,
    pub answered: usize,
    pub total: usize,
    pub finished: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummaryOut {
    pub id: String,
    pub title: String,
    pub category: ScenarioCategory,
    pub difficulty: Option<String>,
    pub roles: Vec<Position>,
}

pub fn to_summary(s: &Scenario) -> ScenarioSummaryOut {
    ScenarioSummaryOut {
        id: s.id.clone(),
        title: s.title.clone(),
        category: s.category,
        difficulty: s.prompt_plan.as_ref().and_then(|p| p.difficulty.clone()),
        roles: s.roles.keys().copied().collect(),
    }
}

#[derive(Serialize)]
pub struct ReloadOut {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct WeakSpotQuery {
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}
