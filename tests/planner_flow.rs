use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use glossy_travel::genai::{ChatReply, ChatTurn, GenAiError, SpeechClip, TravelModel};
use glossy_travel::planner::{NarrationOutcome, Planner, TurnOutcome, TurnReport};
use glossy_travel::session::{SessionStore, TripSession};
use glossy_travel::travel::export::to_plain_text;
use glossy_travel::travel::extract::strip_fenced_block;
use glossy_travel::travel::{APOLOGY, GroundingLink, Role, TravelStyle};
use tokio::sync::Notify;

const PARIS_REPLY: &str = r#"¡Qué buena elección! Aquí tienes tu escapada.

```json
{
  "title": "Paris Getaway",
  "summary": "Tres días de arte, cafés y luces.",
  "steps": [
    { "time": "09:00 AM", "title": "Torre Eiffel", "description": "Sube al mirador temprano.", "location": "Tour Eiffel, Paris" },
    { "time": "02:00 PM", "title": "Louvre", "description": "La Gioconda y mucho más.", "location": "Musée du Louvre" }
  ]
}
```"#;

const ROME_REPLY: &str = "```json\n{\"title\":\"Roma\",\"summary\":\"Eterna\",\"steps\":[{\"time\":\"10:00\",\"title\":\"Coliseo\",\"description\":\"lento\",\"location\":\"Colosseo\"},{\"time\":\"12:00\",\"title\":\"Foro\",\"description\":\"Ruinas\",\"location\":\"Foro Romano\"},{\"time\":\"18:00\",\"title\":\"Trastevere\",\"description\":\"Cena\",\"location\":\"Trastevere\"}]}\n```";

/// Scripted model: replies are consumed in order; an empty script fails.
#[derive(Default)]
struct MockModel {
    replies: Mutex<VecDeque<Result<ChatReply, GenAiError>>>,
    turns: Mutex<Vec<ChatTurn>>,
    image_prompts: Mutex<Vec<String>>,
    speech_gate: Notify,
}

impl MockModel {
    fn with_replies(replies: Vec<Result<ChatReply, GenAiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    fn reply(text: &str) -> Result<ChatReply, GenAiError> {
        Ok(ChatReply {
            text: text.to_string(),
            links: vec![GroundingLink {
                uri: "https://example.com/paris".to_string(),
                title: "Guía".to_string(),
            }],
        })
    }

    fn calls(&self) -> usize {
        self.turns.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TravelModel for MockModel {
    async fn send_message(&self, turn: ChatTurn) -> Result<ChatReply, GenAiError> {
        self.turns.lock().unwrap().push(turn);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenAiError::EmptyReply))
    }

    async fn generate_hero_image(&self, prompt: &str) -> Option<String> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        Some("data:image/png;base64,AAAA".to_string())
    }

    async fn generate_speech(&self, text: &str) -> Option<SpeechClip> {
        // "lento" descriptions wait until the test releases them.
        if text == "lento" {
            self.speech_gate.notified().await;
        }
        Some(SpeechClip {
            mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
            data: vec![0; 8],
        })
    }
}

fn setup(model: &Arc<MockModel>) -> (Planner, TripSession) {
    let planner = Planner::new(model.clone());
    let session = SessionStore::new().create();
    (planner, session)
}

fn completed(outcome: TurnOutcome) -> TurnReport {
    match outcome {
        TurnOutcome::Completed(report) => report,
        other => panic!("expected a completed turn, got {other:?}"),
    }
}

#[tokio::test]
async fn test_paris_scenario() {
    let model = MockModel::with_replies(vec![MockModel::reply(PARIS_REPLY)]);
    let (planner, session) = setup(&model);

    let report = completed(planner.submit_turn(&session, "Plan a 3-day Paris trip").await);
    report.hero_task.expect("hero request started").await.unwrap();

    let itinerary = session.itinerary().expect("itinerary adopted");
    assert_eq!(itinerary.title, "Paris Getaway");
    assert_eq!(itinerary.steps.len(), 2);
    assert_eq!(session.map_query(), "Tour Eiffel, Paris");
    assert_eq!(
        model.image_prompts.lock().unwrap().as_slice(),
        ["Tour Eiffel, Paris landscape view".to_string()]
    );
    assert!(session.hero_image().is_some());

    let messages = session.messages();
    let reply = messages.last().unwrap();
    assert_eq!(reply.role, Role::Model);
    assert_eq!(reply.grounding_links.len(), 1);
    assert!(!strip_fenced_block(&reply.text).contains("Paris Getaway"));
}

#[tokio::test]
async fn test_history_and_preferences_reach_the_model() {
    let model = MockModel::with_replies(vec![MockModel::reply("Hola")]);
    let (planner, session) = setup(&model);
    session.set_style(TravelStyle::Gastronomic);

    completed(planner.submit_turn(&session, "Quiero comer bien").await);

    let turns = model.turns.lock().unwrap();
    assert_eq!(turns[0].prompt, "Quiero comer bien");
    // Only the greeting precedes the prompt.
    assert_eq!(turns[0].history.len(), 1);
    assert_eq!(turns[0].history[0].role, Role::Model);
    assert_eq!(turns[0].style, TravelStyle::Gastronomic);
    assert!(turns[0].location.is_none());
}

#[tokio::test]
async fn test_failed_call_appends_one_apology() {
    let model = MockModel::with_replies(vec![Err(GenAiError::Status {
        status: 503,
        body: "unavailable".to_string(),
    })]);
    let (planner, session) = setup(&model);
    let before = session.message_count();

    let report = completed(planner.submit_turn(&session, "hola").await);

    assert!(!report.succeeded);
    assert!(report.hero_task.is_none());
    let messages = session.messages();
    assert_eq!(messages.len(), before + 2);
    assert_eq!(messages[before].role, Role::User);
    assert_eq!(messages[before + 1].role, Role::Model);
    assert_eq!(messages[before + 1].text, APOLOGY);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_blank_input_makes_no_call() {
    let model = MockModel::with_replies(Vec::new());
    let (planner, session) = setup(&model);

    for input in ["", "   ", "\n\t"] {
        assert!(matches!(
            planner.submit_turn(&session, input).await,
            TurnOutcome::Ignored
        ));
    }
    assert_eq!(session.message_count(), 1);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_newer_itinerary_replaces_older_and_plain_reply_keeps_it() {
    let model = MockModel::with_replies(vec![
        MockModel::reply(PARIS_REPLY),
        MockModel::reply(ROME_REPLY),
        MockModel::reply("Sin plan esta vez.\n```json\n{ roto\n```"),
    ]);
    let (planner, session) = setup(&model);

    completed(planner.submit_turn(&session, "París").await);
    completed(planner.submit_turn(&session, "Mejor Roma").await);
    assert_eq!(session.itinerary().unwrap().title, "Roma");

    let report = completed(planner.submit_turn(&session, "¿Y el clima?").await);
    assert!(report.itinerary.is_none());
    assert_eq!(session.itinerary().unwrap().title, "Roma");
    assert_eq!(session.message_count(), 7);
}

#[tokio::test]
async fn test_export_is_stable() {
    let model = MockModel::with_replies(vec![MockModel::reply(PARIS_REPLY)]);
    let (planner, session) = setup(&model);
    completed(planner.submit_turn(&session, "París").await);

    let itinerary = session.itinerary().unwrap();
    let first = to_plain_text(&itinerary);
    assert_eq!(first, to_plain_text(&itinerary));
    assert!(first.starts_with("TRIP: Paris Getaway\n\nSUMMARY: "));
}

#[tokio::test]
async fn test_narration_for_later_step_supersedes_earlier() {
    let model = MockModel::with_replies(vec![MockModel::reply(ROME_REPLY)]);
    let (planner, session) = setup(&model);
    completed(planner.submit_turn(&session, "Roma").await);

    // Step 0 ("lento") waits on the gate.
    let slow = {
        let planner = planner.clone();
        let session = session.clone();
        tokio::spawn(async move { planner.toggle_narration(&session, 0).await })
    };
    while session.narration() != Some(0) {
        tokio::task::yield_now().await;
    }

    let fast = planner.toggle_narration(&session, 2).await;
    assert!(matches!(fast, NarrationOutcome::Playing(_)));
    assert_eq!(session.narration(), Some(2));

    model.speech_gate.notify_one();
    assert_eq!(slow.await.unwrap(), NarrationOutcome::Superseded);
    assert_eq!(session.narration(), Some(2));
    assert_eq!(session.narration_clip().map(|(i, _)| i), Some(2));
}

#[tokio::test]
async fn test_narration_toggle_twice_stops() {
    let model = MockModel::with_replies(vec![MockModel::reply(ROME_REPLY)]);
    let (planner, session) = setup(&model);
    completed(planner.submit_turn(&session, "Roma").await);

    let NarrationOutcome::Playing(audio) = planner.toggle_narration(&session, 1).await else {
        panic!("expected audio");
    };
    assert_eq!(audio.content_type, "audio/wav");

    assert_eq!(
        planner.toggle_narration(&session, 1).await,
        NarrationOutcome::Stopped
    );
    assert_eq!(session.narration(), None);
    assert!(session.narration_clip().is_none());
}

#[tokio::test]
async fn test_finish_narration_only_clears_matching_step() {
    let model = MockModel::with_replies(vec![MockModel::reply(ROME_REPLY)]);
    let (planner, session) = setup(&model);
    completed(planner.submit_turn(&session, "Roma").await);

    planner.toggle_narration(&session, 1).await;
    assert!(!planner.finish_narration(&session, 0));
    assert_eq!(session.narration(), Some(1));
    assert!(planner.finish_narration(&session, 1));
    assert_eq!(session.narration(), None);
}

#[tokio::test]
async fn test_step_image_moves_map_focus() {
    let model = MockModel::with_replies(Vec::new());
    let (planner, session) = setup(&model);

    assert!(planner.request_hero_image(&session, "Musée du Louvre").await);
    assert_eq!(session.map_query(), "Musée du Louvre");
    assert_eq!(
        model.image_prompts.lock().unwrap().as_slice(),
        ["Musée du Louvre".to_string()]
    );
}
