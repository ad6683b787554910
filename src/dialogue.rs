//! Per-session dialogue state machine.
//!
//! A [`Session`] walks through five stages:
//!
//! ```text
//! AwaitingProfile ──► Ready ──► Questioning ──► Finalizing ──► Done
//! ```
//!
//! Transitions are strictly monotonic. The question loop alternates
//! [`Session::ask_next`] (bot question, no turn consumed) with
//! [`Session::submit_answer`] (user answer, one turn consumed); when the
//! turn budget runs out the session enters `Finalizing` and the engine runs
//! the summarize/retrieve/answer pipeline (see [`crate::engine`]).
//!
//! The generation instruction is cumulative by contract: every `ask_next`
//! re-sends the full running instruction, extended with the newest user
//! answer, through one [`Conversation`] handle per session. The collaborator
//! is never trusted to remember dialogue state on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

use tracing::debug;

use crate::config::EngineConfig;
use crate::gateway::{Conversation, GenerationGateway};
use crate::message::{render_transcript, Message};
use crate::profile::{EquipmentProfile, ProfileDraft, ProfileField};
use crate::session::SessionId;
use crate::types::DiagError;

/// Lifecycle stage of a session. Ordered: a session never moves backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Profile fields still incomplete.
    AwaitingProfile,
    /// Profile complete, no turns taken.
    Ready,
    /// At least one answer taken, budget not yet exhausted.
    Questioning,
    /// Turn budget exhausted; summarization and retrieval pending.
    Finalizing,
    /// Final answer produced. Terminal.
    Done,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AwaitingProfile => "awaiting_profile",
            Stage::Ready => "ready",
            Stage::Questioning => "questioning",
            Stage::Finalizing => "finalizing",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic conversation: transcript, turn bookkeeping, and the
/// cumulative generation instruction.
pub struct Session {
    id: SessionId,
    stage: Stage,
    turn_count: u32,
    max_turns: u32,
    transcript: Vec<Message>,
    draft: ProfileDraft,
    profile: Option<EquipmentProfile>,
    auxiliary_context: Option<String>,
    instruction: String,
    conversation: Option<Box<dyn Conversation>>,
    final_answer: Option<String>,
}

impl Session {
    pub(crate) fn new(id: SessionId, config: &EngineConfig) -> Self {
        Self {
            id,
            stage: Stage::AwaitingProfile,
            turn_count: 0,
            max_turns: config.max_turns,
            transcript: Vec::new(),
            draft: ProfileDraft::new(),
            profile: None,
            auxiliary_context: None,
            instruction: String::new(),
            conversation: None,
            final_answer: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    #[must_use]
    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Turns left before finalization.
    #[must_use]
    pub fn interactions_remaining(&self) -> u32 {
        self.max_turns - self.turn_count
    }

    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// The completed profile, once all five fields are in.
    #[must_use]
    pub fn profile(&self) -> Option<&EquipmentProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    /// Monotonic stage assignment; regressions are a bug.
    fn advance(&mut self, next: Stage) {
        debug_assert!(next >= self.stage, "stage must never regress");
        if next > self.stage {
            debug!(session = %self.id, from = %self.stage, to = %next, "stage transition");
            self.stage = next;
        }
    }

    /// Submits one profile field.
    ///
    /// Only legal in `AwaitingProfile`. Once the fifth field lands the
    /// session becomes `Ready`; with a zero turn budget it goes straight to
    /// `Finalizing` over an empty transcript.
    pub fn submit_profile_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<Stage, DiagError> {
        if self.stage != Stage::AwaitingProfile {
            return Err(DiagError::InvalidStage {
                op: "submit_profile_field",
                stage: self.stage.to_string(),
            });
        }
        if let Some(profile) = self.draft.submit(field, value)? {
            self.profile = Some(profile);
            if self.max_turns == 0 {
                self.advance(Stage::Finalizing);
            } else {
                self.advance(Stage::Ready);
            }
        }
        Ok(self.stage)
    }

    /// Attaches auxiliary context (an image caption), at most once.
    pub fn attach_context(&mut self, caption: impl Into<String>) -> Result<(), DiagError> {
        if self.auxiliary_context.is_some() {
            return Err(DiagError::ContextAlreadySet);
        }
        self.auxiliary_context = Some(caption.into());
        Ok(())
    }

    #[must_use]
    pub fn auxiliary_context(&self) -> Option<&str> {
        self.auxiliary_context.as_deref()
    }

    /// Asks the next diagnostic question.
    ///
    /// Legal in `Ready` or `Questioning` while no bot question is pending.
    /// The first call seeds the cumulative instruction from the profile and
    /// auxiliary context; later calls extend it with the newest user answer.
    /// The full instruction is sent through this session's [`Conversation`]
    /// handle and the returned question is appended to the transcript as a
    /// bot message. `turn_count` is not touched here.
    pub async fn ask_next(
        &mut self,
        gateway: &dyn GenerationGateway,
    ) -> Result<String, DiagError> {
        if !matches!(self.stage, Stage::Ready | Stage::Questioning) {
            return Err(DiagError::InvalidStage {
                op: "ask_next",
                stage: self.stage.to_string(),
            });
        }
        if self
            .transcript
            .last()
            .is_some_and(|last| last.has_role(Message::BOT))
        {
            return Err(DiagError::QuestionPending);
        }

        // Build the candidate instruction first and commit it only after a
        // successful send, so a collaborator failure leaves the session
        // exactly as it was.
        let instruction = if self.instruction.is_empty() {
            let profile = self.profile.as_ref().ok_or(DiagError::InvalidStage {
                op: "ask_next",
                stage: Stage::AwaitingProfile.as_str().to_string(),
            })?;
            opening_instruction(profile, self.auxiliary_context.as_deref())
        } else {
            let mut extended = self.instruction.clone();
            if let Some(answer) = self
                .transcript
                .last()
                .filter(|last| last.has_role(Message::USER))
            {
                extended.push_str(&format!(" Previous user response: {}", answer.content));
            }
            extended
        };

        let conversation = self
            .conversation
            .get_or_insert_with(|| gateway.start_conversation());
        let question = conversation.send(&instruction).await?;
        self.instruction = instruction;
        self.transcript.push(Message::bot(&question));
        Ok(question)
    }

    /// Records a user answer and consumes one turn.
    ///
    /// An empty or whitespace-only answer is the designed signal to
    /// re-request the current question: it fails with
    /// [`DiagError::EmptyAnswer`] and changes nothing. A real answer is
    /// appended to the transcript; exhausting the budget enters
    /// `Finalizing`, otherwise the session is `Questioning` and the caller
    /// asks again.
    pub fn submit_answer(&mut self, text: &str) -> Result<Stage, DiagError> {
        if !matches!(self.stage, Stage::Ready | Stage::Questioning) {
            return Err(DiagError::InvalidStage {
                op: "submit_answer",
                stage: self.stage.to_string(),
            });
        }
        if !self
            .transcript
            .last()
            .is_some_and(|last| last.has_role(Message::BOT))
        {
            return Err(DiagError::InvalidStage {
                op: "submit_answer",
                stage: format!("{} with no pending question", self.stage),
            });
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DiagError::EmptyAnswer);
        }

        self.transcript.push(Message::user(trimmed));
        self.turn_count += 1;
        if self.turn_count >= self.max_turns {
            self.advance(Stage::Finalizing);
        } else {
            self.advance(Stage::Questioning);
        }
        Ok(self.stage)
    }

    /// Renders the full transcript for summarization.
    #[must_use]
    pub fn rendered_transcript(&self) -> String {
        render_transcript(&self.transcript)
    }

    /// Stores the final answer and closes the session.
    ///
    /// Only legal in `Finalizing`. Idempotent against a concurrent
    /// completion: once `Done`, a late duplicate result is discarded and the
    /// first stored answer wins.
    pub(crate) fn record_final_answer(&mut self, answer: String) -> Result<(), DiagError> {
        match self.stage {
            Stage::Finalizing => {
                self.final_answer = Some(answer);
                self.advance(Stage::Done);
                Ok(())
            }
            Stage::Done => Ok(()),
            other => Err(DiagError::InvalidStage {
                op: "record_final_answer",
                stage: other.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("turn_count", &self.turn_count)
            .field("max_turns", &self.max_turns)
            .field("transcript_len", &self.transcript.len())
            .finish_non_exhaustive()
    }
}

/// Builds the opening (and thereafter cumulative) dialogue instruction.
///
/// The wording is a wire contract with the generation collaborator: one
/// question at a time, and from the second question on a fixed four-option
/// multiple-choice format whose last option is always the open-ended
/// "Others" fallback.
#[must_use]
pub fn opening_instruction(profile: &EquipmentProfile, auxiliary: Option<&str>) -> String {
    let caption = auxiliary.unwrap_or("none provided");
    format!(
        "You have been provided with specific details about a piece of equipment:\n\
         - Type: {equipment_type}\n\
         - Company: {brand}\n\
         - Model: {model}\n\
         - Fuel Type: {fuel}\n\
         - Year: {year}, with the following image description provided: {caption}.\n\n\
         IMPORTANT RULES:\n\
         For the FIRST message:\n\
         - Start with something related to \"hello, what seems to be the issue with your {model}?\"\n\
         - DO NOT ask questions about details already known from the above information\n\
         - Ask only ONE specific question at a time\n\n\
         For ALL SUBSEQUENT messages you MUST follow this EXACT format:\n\
         [Your diagnostic question]\n\n\
         1. [First answer option]\n\
         2. [Second answer option]\n\
         3. [Third answer option]\n\
         4. Others: [Describe your specific situation]\n\n\
         General Rules:\n\
         - ALWAYS include the numbers 1-4 with the exact format shown above\n\
         - Options must be answers/statements, not questions\n\
         - Always use \"4. Others: \" as the last option\n\
         - Progress from basic to more complex diagnostics\n\
         - Use simple, clear English\n\n\
         Begin by asking a precise, targeted question about the equipment's current problem or condition.",
        equipment_type = profile.equipment_type,
        brand = profile.brand,
        model = profile.model,
        fuel = profile.fuel_type,
        year = profile.year,
        caption = caption,
    )
}

/// Builds the transcript summarization prompt.
#[must_use]
pub fn summary_prompt(rendered_transcript: &str) -> String {
    format!(
        "Summarize the following conversation, focusing on the key diagnostic \
         information about the equipment:\n\n{rendered_transcript}\n\n\
         Provide a concise summary that highlights:\n\
         - The main issue or problem discussed\n\
         - Key symptoms or observations\n\
         - Any potential diagnostic insights\n\
         - Recommended next steps"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::AwaitingProfile < Stage::Ready);
        assert!(Stage::Ready < Stage::Questioning);
        assert!(Stage::Questioning < Stage::Finalizing);
        assert!(Stage::Finalizing < Stage::Done);
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::AwaitingProfile).unwrap();
        assert_eq!(json, "\"awaiting_profile\"");
    }

    fn session_with_profile(max_turns: u32) -> Session {
        let config = EngineConfig::default().with_max_turns(max_turns);
        let mut session = Session::new(SessionId::generate(), &config);
        session
            .submit_profile_field(ProfileField::EquipmentType, "car")
            .unwrap();
        session
            .submit_profile_field(ProfileField::FuelType, "petrol")
            .unwrap();
        session.submit_profile_field(ProfileField::Brand, "Tata").unwrap();
        session.submit_profile_field(ProfileField::Model, "Nexon").unwrap();
        session.submit_profile_field(ProfileField::Year, "2020").unwrap();
        session
    }

    #[test]
    fn profile_completion_makes_ready() {
        let session = session_with_profile(2);
        assert_eq!(session.stage(), Stage::Ready);
        assert_eq!(session.interactions_remaining(), 2);
    }

    #[test]
    fn zero_budget_finalizes_immediately() {
        let session = session_with_profile(0);
        assert_eq!(session.stage(), Stage::Finalizing);
        assert!(session.transcript().is_empty());
        assert_eq!(session.rendered_transcript(), "");
    }

    #[test]
    fn profile_fields_rejected_after_ready() {
        let mut session = session_with_profile(2);
        let err = session
            .submit_profile_field(ProfileField::Brand, "again")
            .unwrap_err();
        assert!(matches!(err, DiagError::InvalidStage { op, .. } if op == "submit_profile_field"));
    }

    #[test]
    fn context_attaches_once() {
        let config = EngineConfig::default();
        let mut session = Session::new(SessionId::generate(), &config);
        session.attach_context("a dented rear bumper").unwrap();
        assert_eq!(session.auxiliary_context(), Some("a dented rear bumper"));
        assert!(matches!(
            session.attach_context("again"),
            Err(DiagError::ContextAlreadySet)
        ));
    }

    #[test]
    fn answer_without_pending_question_is_rejected() {
        let mut session = session_with_profile(2);
        let err = session.submit_answer("it rattles").unwrap_err();
        assert!(matches!(err, DiagError::InvalidStage { .. }));
        assert_eq!(session.turn_count(), 0);
    }

    #[test]
    fn opening_instruction_mentions_profile_and_caption() {
        let session = session_with_profile(2);
        let prompt = opening_instruction(session.profile().unwrap(), Some("scratched door"));
        assert!(prompt.contains("Nexon"));
        assert!(prompt.contains("petrol"));
        assert!(prompt.contains("scratched door"));
        assert!(prompt.contains("4. Others:"));
    }

    #[test]
    fn summary_prompt_embeds_transcript() {
        let prompt = summary_prompt("bot: q\nuser: a");
        assert!(prompt.contains("bot: q\nuser: a"));
        assert!(prompt.contains("Recommended next steps"));
    }
}
