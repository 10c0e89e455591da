use async_trait::async_trait;
use feelio_core::{
    safety, DialogueOrchestrator, DialogueSettings, EmotionLabel, FeelioError, FeelioResult,
    DialogueState, PaceHint, PacingDecision, ReplySink, SessionRecord, TextGenerator,
    UtteranceSource, APOLOGY, FAREWELL,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Returns canned replies in order; errors once exhausted. Records every prompt it sees.
struct ScriptedGenerator {
    replies: Mutex<VecDeque<FeelioResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<FeelioResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> FeelioResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FeelioError::Generation("script exhausted".into())))
    }
}

struct ScriptedCapture {
    lines: VecDeque<Option<String>>,
}

impl ScriptedCapture {
    fn new(lines: &[Option<&str>]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.map(str::to_string)).collect(),
        }
    }
}

#[async_trait]
impl UtteranceSource for ScriptedCapture {
    async fn capture(&mut self) -> Option<String> {
        self.lines.pop_front().flatten()
    }

    fn is_closed(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Default)]
struct RecordingSink {
    delivered: Vec<(String, PacingDecision)>,
    fail: bool,
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn deliver(&mut self, text: &str, pacing: PacingDecision) -> FeelioResult<()> {
        self.delivered.push((text.to_string(), pacing));
        if self.fail {
            return Err(FeelioError::Delivery("speaker unplugged".into()));
        }
        Ok(())
    }
}

fn ok(s: &str) -> FeelioResult<String> {
    Ok(s.to_string())
}

#[tokio::test]
async fn crisis_override_logs_and_continues() {
    let gen = ScriptedGenerator::new(vec![ok("That sounds heavy. Let's breathe together."), ok("summary")]);
    let mut o = DialogueOrchestrator::new(gen.clone(), DialogueSettings::default());

    let crisis = o.process_turn("I want to die", EmotionLabel::Sad).await;
    assert!(crisis.is_crisis());
    assert_eq!(crisis.text(), safety::crisis_response());
    assert_eq!(crisis.pacing(), PacingDecision::crisis());
    assert!(gen.prompts().is_empty(), "crisis turns never reach the generator");

    let next = o.process_turn("thanks, that helps a little", EmotionLabel::Sad).await;
    assert!(!next.is_crisis());
    assert_eq!(next.text(), "That sounds heavy. Let's breathe together.");

    let turns = o.log().recent_turns(10);
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].ai, safety::crisis_response());
    assert!(!o.is_terminated());
}

#[tokio::test]
async fn generator_failure_becomes_apology() {
    let gen = ScriptedGenerator::new(vec![
        Err(FeelioError::Generation("timeout".into())),
        ok("   **   "),
    ]);
    let mut o = DialogueOrchestrator::new(gen, DialogueSettings::default());

    let first = o.process_turn("hello there", EmotionLabel::Neutral).await;
    assert_eq!(first.text(), APOLOGY);
    let second = o.process_turn("hello again", EmotionLabel::Neutral).await;
    assert_eq!(second.text(), APOLOGY);
    assert_eq!(o.log().len(), 2);
}

#[tokio::test]
async fn fusion_prompt_carries_turn_context() {
    let gen = ScriptedGenerator::new(vec![ok("a"), ok("b"), ok("c"), ok("d")]);
    let mut o = DialogueOrchestrator::new(gen.clone(), DialogueSettings::default());

    for label in [EmotionLabel::Sad, EmotionLabel::Sad, EmotionLabel::Happy] {
        o.process_turn("just talking", label).await;
    }
    let long = vec!["word"; 25].join(" ");
    let outcome = o.process_turn(&format!("I'm fine {}", long), EmotionLabel::Happy).await;
    assert_eq!(outcome.pacing().pace_hint, PaceHint::Slower);

    let prompts = gen.prompts();
    assert!(prompts[0].contains("EMOTION TRAJECTORY: steady so far."));
    let last = prompts.last().unwrap();
    assert!(last.contains("EMOTION TRAJECTORY: from sad toward happy."));
    assert!(last.contains("CONTRADICTION FLAG: none noted."));
    assert!(last.contains("PACE HINT: slower."));
}

#[tokio::test]
async fn run_exits_on_farewell_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let settings = DialogueSettings {
        session_logs_path: Some(dir.path().to_path_buf()),
        ..DialogueSettings::default()
    };
    let gen = ScriptedGenerator::new(vec![ok("Glad you're here."), ok("- trend\n- concerns\n- actions")]);
    let mut o = DialogueOrchestrator::new(gen.clone(), settings);

    let mut capture = ScriptedCapture::new(&[None, Some("hi, rough week"), Some("   "), Some("ok bye"), Some("never read")]);
    let mut sink = RecordingSink::default();
    let cancel = Arc::new(AtomicBool::new(false));

    let summary = o.run(&mut capture, &mut sink, &EmotionLabel::Sad, cancel).await;

    assert_eq!(sink.delivered.len(), 2);
    assert_eq!(sink.delivered[1].0, FAREWELL);
    assert_eq!(summary.turns, 1);
    assert_eq!(summary.summary.as_deref(), Some("- trend\n- concerns\n- actions"));
    assert!(gen.prompts().last().unwrap().contains("Recent emotions: [\"sad\"]"));

    let path = summary.saved_to.expect("session file written");
    let record = SessionRecord::load(&path).unwrap();
    assert_eq!(record.turns.len(), 1);
    assert_eq!(record.turns[0].user, "hi, rough week");
    assert_eq!(record.turns[0].emotion, EmotionLabel::Sad);
    assert_eq!(capture.lines.len(), 1);
}

#[tokio::test]
async fn delivery_failure_does_not_end_the_session() {
    let gen = ScriptedGenerator::new(vec![ok("one"), ok("two")]);
    let mut o = DialogueOrchestrator::new(gen, DialogueSettings::default());
    let mut capture = ScriptedCapture::new(&[Some("first"), Some("second")]);
    let mut sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };

    let summary = o
        .run(&mut capture, &mut sink, &EmotionLabel::Neutral, Arc::new(AtomicBool::new(false)))
        .await;
    assert_eq!(sink.delivered.len(), 2);
    assert_eq!(summary.turns, 2);
    // script exhausted before the summary request
    assert!(summary.summary.is_none());
    assert!(summary.saved_to.is_none());
}

#[tokio::test]
async fn cancellation_stops_before_the_next_turn() {
    let gen = ScriptedGenerator::new(vec![]);
    let mut o = DialogueOrchestrator::new(gen, DialogueSettings::default());
    let mut capture = ScriptedCapture::new(&[Some("hello")]);
    let mut sink = RecordingSink::default();
    let cancel = Arc::new(AtomicBool::new(true));

    let summary = o.run(&mut capture, &mut sink, &EmotionLabel::Neutral, cancel.clone()).await;
    assert!(cancel.load(Ordering::SeqCst));
    assert!(sink.delivered.is_empty());
    assert_eq!(summary.turns, 0);
    assert!(o.is_terminated());
}

#[tokio::test]
async fn turns_after_goodbye_are_refused() {
    let gen = ScriptedGenerator::new(vec![ok("should never be used")]);
    let mut o = DialogueOrchestrator::new(gen.clone(), DialogueSettings::default());

    assert!(o.process_turn("ok bye", EmotionLabel::Neutral).await.is_exit());
    let again = o.process_turn("hello again", EmotionLabel::Sad).await;

    assert!(again.is_already_ended());
    assert_eq!(o.state(), DialogueState::Terminated);
    assert!(o.log().is_empty());
    assert!(o.history().is_empty());
    assert!(gen.prompts().is_empty());
}

#[tokio::test]
async fn run_on_an_ended_dialogue_reads_nothing() {
    let gen = ScriptedGenerator::new(vec![]);
    let mut o = DialogueOrchestrator::new(gen, DialogueSettings::default());
    o.process_turn("goodbye", EmotionLabel::Neutral).await;

    let mut capture = ScriptedCapture::new(&[Some("still there?")]);
    let mut sink = RecordingSink::default();
    let summary = o
        .run(&mut capture, &mut sink, &EmotionLabel::Neutral, Arc::new(AtomicBool::new(false)))
        .await;

    assert!(sink.delivered.is_empty());
    assert_eq!(capture.lines.len(), 1);
    assert_eq!(summary.turns, 0);
}

#[tokio::test]
async fn farewell_wins_over_crisis_language() {
    let gen = ScriptedGenerator::new(vec![]);
    let mut o = DialogueOrchestrator::new(gen, DialogueSettings::default());

    let outcome = o.process_turn("I can't stop thinking about suicide", EmotionLabel::Sad).await;

    assert!(outcome.is_exit());
    assert!(!outcome.is_crisis());
    assert_eq!(outcome.text(), FAREWELL);
    assert!(o.log().is_empty());
}
