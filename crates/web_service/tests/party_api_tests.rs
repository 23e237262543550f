use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web, App, Error,
};
use checklist_core::{ChecklistDocument, ChecklistTemplate, ToggleTarget};
use party_sync::{DocumentStore, MemoryDocumentStore, PartyKey};
use serde_json::{json, Value};
use url::Url;
use web_service::server::{app_config, AppState};

async fn setup_test_environment() -> (
    impl Service<Request, Response = ServiceResponse, Error = Error>,
    Arc<MemoryDocumentStore>,
) {
    let store = Arc::new(MemoryDocumentStore::new());
    let app_state = web::Data::new(AppState::new(
        store.clone(),
        ChecklistTemplate::builtin().expect("builtin template"),
        PartyKey::default_party(),
        Url::parse("http://party.test/").expect("url"),
    ));

    let app =
        test::init_service(App::new().app_data(app_state.clone()).configure(app_config)).await;
    (app, store)
}

fn toggle_request(party: &str, body: Value) -> Request {
    test::TestRequest::post()
        .uri(&format!("/v1/parties/{party}/toggle"))
        .set_json(body)
        .to_request()
}

/// Next SSE chunk that carries an event, skipping keep-alive comments
async fn next_event<B>(body: &mut Pin<Box<B>>) -> String
where
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    loop {
        let chunk = tokio::time::timeout(
            Duration::from_secs(2),
            std::future::poll_fn(|cx| body.as_mut().poll_next(cx)),
        )
        .await
        .expect("event within timeout")
        .expect("stream open")
        .expect("chunk");
        let text = String::from_utf8(chunk.to_vec()).expect("utf8");
        if text.contains("event:") {
            return text;
        }
    }
}

#[actix_web::test]
async fn test_health() {
    let (app, _store) = setup_test_environment().await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(&body[..], b"OK");
}

#[actix_web::test]
async fn test_get_creates_party_from_template() {
    let (app, store) = setup_test_environment().await;

    let req = test::TestRequest::get()
        .uri("/v1/parties/bday-7")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["party_id"], "bday-7");
    assert_eq!(body["progress"], json!({"completed": 0, "total": 24, "percent": 0}));
    assert_eq!(body["document"]["sections"].as_array().unwrap().len(), 5);

    let key = PartyKey::new("bday-7").unwrap();
    assert!(store.get(&key).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_toggle_updates_progress_and_persists() {
    let (app, store) = setup_test_environment().await;

    let body: Value = test::call_and_read_body_json(
        &app,
        toggle_request("main-party", json!({"sectionId": "morning", "taskId": "task1"})),
    )
    .await;

    assert_eq!(body["changed"], true);
    assert_eq!(body["party_id"], "main-party");
    assert_eq!(body["progress"]["completed"], 1);
    assert_eq!(body["progress"]["percent"], 4);

    let stored = store
        .get(&PartyKey::default_party())
        .await
        .unwrap()
        .expect("stored document");
    assert!(stored.task("morning", "task1").unwrap().is_completed);
}

#[actix_web::test]
async fn test_toggle_subtask() {
    let (app, _store) = setup_test_environment().await;

    let body: Value = test::call_and_read_body_json(
        &app,
        toggle_request(
            "main-party",
            json!({"sectionId": "morning", "taskId": "task4", "subtaskId": "sub1"}),
        ),
    )
    .await;

    assert_eq!(body["changed"], true);
    let task4 = &body["document"]["sections"][0]["tasks"][3];
    assert_eq!(task4["id"], "task4");
    assert_eq!(task4["isCompleted"], false);
    assert_eq!(task4["subTasks"][0]["isCompleted"], true);
}

#[actix_web::test]
async fn test_toggle_twice_restores_document() {
    let (app, _store) = setup_test_environment().await;
    let target = json!({"sectionId": "afternoon", "taskId": "task9"});

    let _: Value =
        test::call_and_read_body_json(&app, toggle_request("main-party", target.clone())).await;
    let body: Value =
        test::call_and_read_body_json(&app, toggle_request("main-party", target)).await;

    assert_eq!(body["progress"]["completed"], 0);
    let document: ChecklistDocument = serde_json::from_value(body["document"].clone()).unwrap();
    assert_eq!(document, ChecklistTemplate::builtin().unwrap().document());
}

#[actix_web::test]
async fn test_toggle_unknown_node_is_noop() {
    let (app, _store) = setup_test_environment().await;

    let body: Value = test::call_and_read_body_json(
        &app,
        toggle_request("main-party", json!({"sectionId": "morning", "taskId": "nope"})),
    )
    .await;

    assert_eq!(body["changed"], false);
    assert_eq!(body["progress"]["completed"], 0);
}

#[actix_web::test]
async fn test_invalid_party_id_is_bad_request() {
    let (app, _store) = setup_test_environment().await;

    let req = test::TestRequest::get()
        .uri("/v1/parties/not%20valid")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"]["type"], "invalid_party_id");
}

#[actix_web::test]
async fn test_malformed_session_header_is_unauthorized() {
    let (app, _store) = setup_test_environment().await;

    let req = test::TestRequest::get()
        .uri("/v1/parties/main-party")
        .insert_header(("X-Party-Session", "definitely-not-a-uuid"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_session_round_trip() {
    let (app, _store) = setup_test_environment().await;

    let req = test::TestRequest::post().uri("/v1/session").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["session_id"].as_str().expect("session id").to_string();

    let req = test::TestRequest::post()
        .uri("/v1/session")
        .insert_header(("X-Party-Session", session_id.as_str()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["session_id"], session_id);
}

#[actix_web::test]
async fn test_new_parties_are_distinct_and_shareable() {
    let (app, store) = setup_test_environment().await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post().uri("/v1/parties").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;

        let party_id = body["party_id"].as_str().unwrap().to_string();
        let share_url = Url::parse(body["share_url"].as_str().unwrap()).unwrap();
        assert_eq!(
            share_url.query_pairs().find(|(k, _)| k == "party").map(|(_, v)| v.into_owned()),
            Some(party_id.clone())
        );
        ids.push(party_id);
    }

    assert_ne!(ids[0], ids[1]);
    assert_eq!(store.list_keys().await.unwrap().len(), 2);
}

#[actix_web::test]
async fn test_put_replaces_document() {
    let (app, _store) = setup_test_environment().await;

    let document = ChecklistTemplate::builtin()
        .unwrap()
        .document()
        .toggled(&ToggleTarget::task("postParty", "task19"));

    let req = test::TestRequest::put()
        .uri("/v1/parties/main-party")
        .set_json(&document)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["progress"]["completed"], 1);

    let req = test::TestRequest::get()
        .uri("/v1/parties/main-party")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let stored: ChecklistDocument = serde_json::from_value(body["document"].clone()).unwrap();
    assert_eq!(stored, document);
}

#[actix_web::test]
async fn test_put_invalid_document_is_unprocessable() {
    let (app, _store) = setup_test_environment().await;

    let payload = json!({
        "sections": [
            {"id": "a", "title": "A", "timeframe": "now", "tasks": []},
            {"id": "a", "title": "B", "timeframe": "later", "tasks": []}
        ]
    });
    let req = test::TestRequest::put()
        .uri("/v1/parties/main-party")
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_page_renders_requested_party() {
    let (app, store) = setup_test_environment().await;

    let req = test::TestRequest::get().uri("/?party=garden-bash").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();

    assert!(html.contains("<title>Party Prep Checklist</title>"));
    assert!(html.contains("data-party=\"garden-bash\""));
    assert!(html.contains("0% Complete"));
    assert!(store
        .get(&PartyKey::new("garden-bash").unwrap())
        .await
        .unwrap()
        .is_some());
}

#[actix_web::test]
async fn test_page_falls_back_to_default_party() {
    let (app, _store) = setup_test_environment().await;

    let req = test::TestRequest::get().uri("/?party=%3Cscript%3E").to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();

    assert!(html.contains("data-party=\"main-party\""));
    assert!(!html.contains("<script>alert"));
}

#[actix_web::test]
async fn test_event_feed_sends_snapshot_then_changes() {
    let (app, _store) = setup_test_environment().await;

    let req = test::TestRequest::get()
        .uri("/v1/parties/main-party/events")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let mut body = Box::pin(res.into_body());

    let first = next_event(&mut body).await;
    assert!(first.contains("event: document"));
    assert!(first.contains("\"percent\":0"));

    let _: Value = test::call_and_read_body_json(
        &app,
        toggle_request("main-party", json!({"sectionId": "morning", "taskId": "task1"})),
    )
    .await;

    let second = next_event(&mut body).await;
    assert!(second.contains("event: document"));
    assert!(second.contains("\"percent\":4"));
}
