pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::editor::handlers as editor;
use crate::generation::handlers as ai;
use crate::imports::handlers as imports;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::readiness_handler))
        .route("/api/v1/me", get(resumes::handle_me))
        // Resume API
        .route("/api/v1/resumes", get(resumes::handle_list_resumes))
        .route("/api/v1/resumes/:id", delete(resumes::handle_delete_resume))
        .route("/api/v1/resumes/:id/export", get(resumes::handle_export))
        .route(
            "/api/v1/resumes/:id/customization",
            put(resumes::handle_save_customization),
        )
        .route("/api/v1/resumes/:id/import", post(imports::handle_import))
        // Editor API
        .route(
            "/api/v1/resumes/:id/editor",
            post(editor::handle_open_editor)
                .get(editor::handle_get_editor)
                .delete(editor::handle_close_editor),
        )
        .route("/api/v1/resumes/:id/editor/name", put(editor::handle_rename))
        .route(
            "/api/v1/resumes/:id/editor/sections/:kind",
            put(editor::handle_set_section),
        )
        .route(
            "/api/v1/resumes/:id/editor/sections/:kind/skip",
            post(editor::handle_skip_section),
        )
        .route("/api/v1/resumes/:id/editor/order", put(editor::handle_reorder))
        .route("/api/v1/resumes/:id/editor/next", post(editor::handle_next))
        .route("/api/v1/resumes/:id/editor/back", post(editor::handle_back))
        .route(
            "/api/v1/resumes/:id/editor/confirm-skip",
            post(editor::handle_confirm_skip),
        )
        .route("/api/v1/resumes/:id/editor/cancel", post(editor::handle_cancel))
        .route("/api/v1/resumes/:id/editor/save", post(editor::handle_save))
        // Uploads and AI assistance
        .route(
            "/api/v1/uploads/extract",
            post(imports::handle_extract).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/ai/summary", post(ai::handle_generate_summary))
        .route("/api/v1/ai/description", post(ai::handle_generate_description))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::{CookieSessionAuthenticator, SESSION_COOKIE};
    use crate::config::Config;
    use crate::document::value::PersonalDetails;
    use crate::document::{PartialDocument, ResumeDraft, SectionKind, SectionValue};
    use crate::editor::EditorRegistry;
    use crate::generation::testing::ScriptedTextGenerator;
    use crate::persistence::session_store::InMemorySessionStore;
    use crate::persistence::testing::InMemoryResumeRepository;
    use crate::persistence::PersistenceGateway;

    struct TestApp {
        router: Router,
        repo: Arc<InMemoryResumeRepository>,
        generator: Arc<ScriptedTextGenerator>,
        owner: Uuid,
    }

    fn build(generator: ScriptedTextGenerator) -> TestApp {
        let repo = Arc::new(InMemoryResumeRepository::new());
        let generator = Arc::new(generator);
        let state = AppState {
            db: PgPoolOptions::new()
                .connect_lazy("postgres://localhost/cvforge_test")
                .unwrap(),
            gateway: PersistenceGateway::new(repo.clone(), Arc::new(InMemorySessionStore::new())),
            authenticator: Arc::new(CookieSessionAuthenticator),
            generator: generator.clone(),
            editors: EditorRegistry::new(std::time::Duration::from_secs(60)),
            config: Config::for_tests(),
        };
        TestApp {
            router: build_router(state),
            repo,
            generator,
            owner: Uuid::new_v4(),
        }
    }

    fn cookie_for(user_id: Uuid) -> String {
        let session = json!({
            "user_id": user_id,
            "email": "jane@x.com",
            "expires_at": (Utc::now() + Duration::hours(1)).timestamp_millis(),
        });
        format!("{SESSION_COOKIE}={}", urlencoding::encode(&session.to_string()))
    }

    impl TestApp {
        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::COOKIE, cookie_for(self.owner));
            let body = match body {
                Some(value) => {
                    request = request.header(header::CONTENT_TYPE, "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };
            let response = self
                .router
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }

    fn editor_uri(resume_id: Uuid, rest: &str) -> String {
        format!("/api/v1/resumes/{resume_id}/editor{rest}")
    }

    #[tokio::test]
    async fn test_health_needs_no_session() {
        let app = build(ScriptedTextGenerator::default());
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthenticated() {
        let app = build(ScriptedTextGenerator::default());
        let request = Request::post(editor_uri(Uuid::new_v4(), ""))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_returns_cookie_owner() {
        let app = build(ScriptedTextGenerator::default());
        let (status, body) = app.send(Method::GET, "/api/v1/me", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], app.owner.to_string());
        assert_eq!(body["email"], "jane@x.com");
    }

    #[tokio::test]
    async fn test_editing_flow_saves_on_next() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();

        let (status, view) = app.send(Method::POST, &editor_uri(id, ""), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["origin"], "new");
        assert_eq!(view["resume_name"], "My Resume");

        let (status, body) = app.send(Method::POST, &editor_uri(id, "/next"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "PERSONAL_DETAILS_INCOMPLETE");

        let (status, _) = app
            .send(
                Method::PUT,
                &editor_uri(id, "/sections/personal_details"),
                Some(json!({"name": "Jane Doe", "email": "jane@x.com"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.send(Method::POST, &editor_uri(id, "/next"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["navigation"]["outcome"], "transitioned");
        assert_eq!(body["navigation"]["section"], "skills");
        assert_eq!(body["editor"]["origin"], "persisted");

        let stored = app.repo.stored(id).await.unwrap();
        assert_eq!(stored.sections.personal_details().name, "Jane Doe");

        let (status, list) = app.send(Method::GET, "/api/v1/resumes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["resume_id"], id.to_string());
    }

    #[tokio::test]
    async fn test_incomplete_section_needs_skip_confirmation() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();
        app.send(Method::POST, &editor_uri(id, ""), None).await;
        app.send(
            Method::PUT,
            &editor_uri(id, "/sections/personal_details"),
            Some(json!({"name": "Jane", "email": "jane@x.com"})),
        )
        .await;
        app.send(Method::POST, &editor_uri(id, "/back"), Some(json!({"target": "education"})))
            .await;
        app.send(
            Method::PUT,
            &editor_uri(id, "/sections/education"),
            Some(json!([{"school_name": "MIT"}])),
        )
        .await;

        let (status, body) = app.send(Method::POST, &editor_uri(id, "/next"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["navigation"]["outcome"], "awaiting_confirmation");
        assert_eq!(body["navigation"]["display_name"], "Education");
        assert_eq!(body["editor"]["nav"]["state"], "awaiting_skip_confirmation");

        let (_, body) = app.send(Method::POST, &editor_uri(id, "/cancel"), None).await;
        assert_eq!(body["navigation"]["outcome"], "stayed");
        assert_eq!(body["editor"]["active_section"], "education");

        let (status, _) = app.send(Method::POST, &editor_uri(id, "/confirm-skip"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        app.send(Method::POST, &editor_uri(id, "/next"), None).await;
        let (status, body) = app.send(Method::POST, &editor_uri(id, "/confirm-skip"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["navigation"]["section"], "projects");
        let stored = app.repo.stored(id).await.unwrap();
        assert!(stored.skipped.contains(&SectionKind::Education));
    }

    #[tokio::test]
    async fn test_section_edits_are_shape_checked() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();
        app.send(Method::POST, &editor_uri(id, ""), None).await;

        let (status, _) = app
            .send(Method::PUT, &editor_uri(id, "/sections/skills"), Some(json!("Rust")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(Method::PUT, &editor_uri(id, "/sections/hobbies"), Some(json!([])))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                Method::PUT,
                &editor_uri(id, "/sections/personal_details"),
                Some(json!(["Jane", "jane@x.com"])),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(Method::POST, &editor_uri(id, "/sections/personal_details/skip"), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CANNOT_SKIP_MANDATORY");

        let (status, view) = app
            .send(
                Method::PUT,
                &editor_uri(id, "/order"),
                Some(json!({"order": ["links", "personal_details", "skills"]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["sections"][0]["kind"], "personal_details");
        assert_eq!(view["sections"][1]["kind"], "links");
    }

    #[tokio::test]
    async fn test_unopened_editor_is_not_found() {
        let app = build(ScriptedTextGenerator::default());
        let (status, _) = app
            .send(
                Method::PUT,
                &editor_uri(Uuid::new_v4(), "/name"),
                Some(json!({"resume_name": "CV"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_owners_resume_is_forbidden() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();
        app.repo
            .insert(Uuid::new_v4(), ResumeDraft::new(id).snapshot())
            .await;

        let (status, _) = app.send(Method::POST, &editor_uri(id, ""), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/v1/resumes/{id}/import"),
                Some(json!({"raw_text": "Jane Doe"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_import_is_adopted_by_next_open() {
        let mut sections = BTreeMap::new();
        sections.insert(
            SectionKind::PersonalDetails,
            SectionValue::PersonalDetails(PersonalDetails {
                name: "Jane Doe".into(),
                email: "jane@x.com".into(),
                ..Default::default()
            }),
        );
        sections.insert(SectionKind::Skills, SectionValue::Skills(vec!["Rust".into()]));
        let app = build(ScriptedTextGenerator {
            parsed: Some(PartialDocument {
                resume_name: Some("Imported CV".into()),
                sections,
            }),
            ..Default::default()
        });
        let id = Uuid::new_v4();
        app.send(Method::POST, &editor_uri(id, ""), None).await;

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/v1/resumes/{id}/import"),
                Some(json!({"raw_text": "Jane Doe, jane@x.com. Skills: Rust"})),
            )
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["sections"], json!(["personal_details", "skills"]));

        // The open editor was closed by the import.
        let (status, _) = app.send(Method::GET, &editor_uri(id, ""), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(
            app.generator.last_raw_text.lock().unwrap().as_deref(),
            Some("Jane Doe, jane@x.com. Skills: Rust")
        );

        let (_, view) = app.send(Method::POST, &editor_uri(id, ""), None).await;
        assert_eq!(view["origin"], "imported");
        assert_eq!(view["resume_name"], "Imported CV");
        assert_eq!(view["sections"][1]["kind"], "skills");
        assert_eq!(view["sections"][1]["value"], json!(["Rust"]));
    }

    #[tokio::test]
    async fn test_summary_requires_material_and_open_editor() {
        let app = build(ScriptedTextGenerator {
            summary: Some("Seasoned engineer.".into()),
            ..Default::default()
        });
        let id = Uuid::new_v4();
        let request = json!({"resume_id": id});

        let (status, _) = app.send(Method::POST, "/api/v1/ai/summary", Some(request.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        app.send(Method::POST, &editor_uri(id, ""), None).await;
        let (status, _) = app.send(Method::POST, "/api/v1/ai/summary", Some(request.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        app.send(Method::PUT, &editor_uri(id, "/sections/skills"), Some(json!(["Rust"])))
            .await;
        let (status, body) = app.send(Method::POST, "/api/v1/ai/summary", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Seasoned engineer.");
    }

    #[tokio::test]
    async fn test_description_failures_are_bad_gateway() {
        let app = build(ScriptedTextGenerator::default());
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/ai/description",
                Some(json!({"section": "skills", "context": {}})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/ai/description",
                Some(json!({"section": "projects", "context": {"project_name": "cvforge"}})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_ERROR");
    }

    #[tokio::test]
    async fn test_description_is_returned_for_entry_context() {
        let app = build(ScriptedTextGenerator {
            description: Some("Led the migration to Rust.".into()),
            ..Default::default()
        });
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/ai/description",
                Some(json!({
                    "section": "employment_history",
                    "context": {"company_name": "Acme", "position": "Engineer"}
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "Led the migration to Rust.");

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/ai/description",
                Some(json!({"section": "employment_history", "context": ["Acme", "Engineer"]})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_and_customization_of_saved_resume() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();

        let (status, _) = app.send(Method::GET, &format!("/api/v1/resumes/{id}/export"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        app.repo.insert(app.owner, ResumeDraft::new(id).snapshot()).await;
        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/v1/resumes/{id}/customization"),
                Some(json!({"template": "modern", "theme": "slate"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["font"], "garamond");

        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/v1/resumes/{id}/customization"),
                Some(json!({"font": "comic_sans"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, export) = app.send(Method::GET, &format!("/api/v1/resumes/{id}/export"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(export["customization"]["template"], "modern");
        assert_eq!(export["customization"]["theme"], "slate");
        assert_eq!(export["sections"].as_array().unwrap().len(), 8);
        assert_eq!(export["sections"][0]["kind"], "personal_details");
    }

    #[tokio::test]
    async fn test_delete_closes_editor() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();
        app.repo.insert(app.owner, ResumeDraft::new(id).snapshot()).await;
        app.send(Method::POST, &editor_uri(id, ""), None).await;

        let (status, _) = app.send(Method::DELETE, &format!("/api/v1/resumes/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(app.repo.stored(id).await.is_none());
        let (status, _) = app.send(Method::GET, &editor_uri(id, ""), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_of_unsaved_resume_still_closes_editor() {
        let mut sections = BTreeMap::new();
        sections.insert(SectionKind::Skills, SectionValue::Skills(vec!["Rust".into()]));
        let app = build(ScriptedTextGenerator {
            parsed: Some(PartialDocument {
                resume_name: None,
                sections,
            }),
            ..Default::default()
        });
        let id = Uuid::new_v4();
        app.send(
            Method::POST,
            &format!("/api/v1/resumes/{id}/import"),
            Some(json!({"raw_text": "Skills: Rust"})),
        )
        .await;
        app.send(Method::POST, &editor_uri(id, ""), None).await;

        let (status, _) = app.send(Method::DELETE, &format!("/api/v1/resumes/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(Method::GET, &editor_uri(id, ""), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, view) = app.send(Method::POST, &editor_uri(id, ""), None).await;
        assert_eq!(view["origin"], "new");
        assert_eq!(view["sections"][1]["value"], json!([]));
    }

    #[tokio::test]
    async fn test_stale_skip_confirmation_is_dropped_by_direct_skip() {
        let app = build(ScriptedTextGenerator::default());
        let id = Uuid::new_v4();
        app.send(Method::POST, &editor_uri(id, ""), None).await;
        app.send(
            Method::PUT,
            &editor_uri(id, "/sections/personal_details"),
            Some(json!({"name": "Jane", "email": "jane@x.com"})),
        )
        .await;
        app.send(
            Method::PUT,
            &editor_uri(id, "/sections/education"),
            Some(json!([{
                "school_name": "MIT",
                "degree": "BSc",
                "field_of_study": "Physics",
                "start_date": "2015"
            }])),
        )
        .await;
        app.send(
            Method::POST,
            &editor_uri(id, "/back"),
            Some(json!({"target": "employment_history"})),
        )
        .await;
        app.send(
            Method::PUT,
            &editor_uri(id, "/sections/employment_history"),
            Some(json!([{"company_name": "Acme"}])),
        )
        .await;
        let (_, body) = app
            .send(Method::POST, &editor_uri(id, "/next"), Some(json!({"target": "projects"})))
            .await;
        assert_eq!(body["navigation"]["outcome"], "awaiting_confirmation");

        let (status, view) = app
            .send(Method::POST, &editor_uri(id, "/sections/employment_history/skip"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["active_section"], "education");
        assert_eq!(view["nav"]["state"], "idle");

        let (status, _) = app.send(Method::POST, &editor_uri(id, "/confirm-skip"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, view) = app.send(Method::GET, &editor_uri(id, ""), None).await;
        assert_eq!(view["sections"][3]["kind"], "education");
        assert_eq!(view["sections"][3]["skipped"], false);
        assert_eq!(view["sections"][3]["value"][0]["school_name"], "MIT");
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_upload() {
        let app = build(ScriptedTextGenerator::default());
        let boundary = "cvforge-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not a resume\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::post("/api/v1/uploads/extract")
            .header(header::COOKIE, cookie_for(app.owner))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Unsupported file type"));
    }
}
