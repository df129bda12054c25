//! End-to-end scenarios through the in-process worker

#![allow(clippy::unwrap_used, clippy::expect_used)]

use probar_netwait::prelude::*;
use std::time::Duration;

fn suite() -> (Arc<MockServiceWorker>, InterceptionSuite, NetworkContext) {
    let worker = Arc::new(MockServiceWorker::new());
    let mut suite = InterceptionSuite::new(worker.clone(), NetwaitConfig::default());
    suite.setup().unwrap();
    let ctx = suite.before_each().unwrap().clone();
    (worker, suite, ctx)
}

mod rest_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delayed_todo_is_awaited() {
        let (worker, _suite, ctx) = suite();
        ctx.install_request(
            "GET",
            "https://api.test/todos/1",
            InstallOptions::new()
                .alias("todo")
                .respond(|_, res| Ok(res.json(&json!({"id": 1, "title": "X"}))?.with_delay(1000))),
        )
        .unwrap();

        let page = worker.clone();
        tokio::spawn(async move {
            page.fetch(CapturedRequest::get("https://api.test/todos/1"))
                .await;
        });

        let start = tokio::time::Instant::now();
        let call = ctx.wait_for_request("@todo").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));

        let response = call.response.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, ResponseBody::Json(json!({"id": 1, "title": "X"})));
        assert_eq!(ctx.get_request_calls("@todo").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reinstall_accumulates_under_one_key() {
        let (worker, _suite, ctx) = suite();
        let first = ctx
            .install_request(
                "GET",
                "/todos/:id",
                InstallOptions::new().reply(MockResponse::json(&json!({"v": 1})).unwrap()),
            )
            .unwrap();
        worker.fetch(CapturedRequest::get("/todos/1")).await;

        let second = ctx
            .install_request(
                "GET",
                "/todos/:id",
                InstallOptions::new().reply(MockResponse::json(&json!({"v": 2})).unwrap()),
            )
            .unwrap();
        worker.fetch(CapturedRequest::get("/todos/2")).await;

        assert_eq!(first, second);
        let calls = ctx.get_request_calls(&first).unwrap();
        assert_eq!(calls.len(), 2);

        let latest = ctx.wait_for_request(&first).await.unwrap();
        assert_eq!(latest.response.unwrap().body, ResponseBody::Json(json!({"v": 2})));
    }

    #[tokio::test]
    async fn plain_text_body_kept_raw() {
        let (worker, _suite, ctx) = suite();
        ctx.install_request(
            "GET",
            "/health",
            InstallOptions::new().respond(|_, res| Ok(res.text("OK"))),
        )
        .unwrap();
        worker.fetch(CapturedRequest::get("/health")).await;

        let call = ctx.wait_for_request("GET:/health").await.unwrap();
        assert_eq!(
            call.response.unwrap().body,
            ResponseBody::Text("OK".to_string())
        );
    }

    #[tokio::test]
    async fn method_case_and_query_string_ignored() {
        let (worker, _suite, ctx) = suite();
        let key = ctx
            .install_request("get", "/search", InstallOptions::new().reply(MockResponse::text("hit")))
            .unwrap();
        let response = worker
            .fetch(CapturedRequest::get("https://app.test/search?q=rust#top"))
            .await;
        assert_eq!(response.body_string(), "hit");
        assert_eq!(ctx.get_request_calls(&key).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unmocked_request_passes_through_and_is_tracked() {
        let worker = Arc::new(
            MockServiceWorker::new().with_upstream(|request| {
                MockResponse::text(&format!("upstream {}", request.path()))
            }),
        );
        let mut suite = InterceptionSuite::new(worker.clone(), NetwaitConfig::default());
        suite.setup().unwrap();
        let ctx = suite.before_each().unwrap().clone();
        ctx.install_request("GET", "/profile", InstallOptions::new().alias("profile"))
            .unwrap();

        let response = worker.fetch(CapturedRequest::get("/profile")).await;
        assert_eq!(response.body_string(), "upstream /profile");

        let call = ctx.wait_for_request("@profile").await.unwrap();
        assert_eq!(
            call.response.unwrap().body,
            ResponseBody::Text("upstream /profile".to_string())
        );
    }
}

mod graphql_tests {
    use super::*;

    #[tokio::test]
    async fn aliased_mutation_is_awaited() {
        let (worker, _suite, ctx) = suite();
        let key = ctx
            .install_mutation(
                "UpdateCourse",
                InstallOptions::new()
                    .alias("updateCourse")
                    .respond(|_, res| res.data(&json!({"updateCourse": {"id": 7}}))),
            )
            .unwrap();
        assert_eq!(key, "UpdateCourse");

        worker
            .fetch(CapturedRequest::graphql(
                "https://api.test/graphql",
                "UpdateCourse",
                "mutation UpdateCourse { updateCourse { id } }",
            ))
            .await;

        let call = ctx.wait_for_mutation("@updateCourse").await.unwrap();
        let by_name = ctx.wait_for_mutation("UpdateCourse").await.unwrap();
        assert_eq!(by_name, call);
        assert_eq!(
            call.response.unwrap().body,
            ResponseBody::Json(json!({"data": {"updateCourse": {"id": 7}}}))
        );
        assert_eq!(ctx.get_mutation_calls("@updateCourse").unwrap().len(), 1);
        assert!(matches!(
            ctx.get_query_calls("UpdateCourse"),
            Err(NetwaitError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn graphql_errors_are_decoded() {
        let (worker, _suite, ctx) = suite();
        ctx.install_query(
            "Courses",
            InstallOptions::new().respond(|_, res| res.errors(&["boom"])),
        )
        .unwrap();
        worker
            .fetch(CapturedRequest::graphql("/graphql", "Courses", "query Courses { id }"))
            .await;

        let call = ctx.wait_for_query("Courses").await.unwrap();
        let body = call.response.unwrap().body;
        let json = body.as_json().unwrap();
        assert_eq!(json["errors"][0]["message"], "boom");
    }
}

mod ordering_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_before_and_after_completion_agree() {
        let (worker, _suite, ctx) = suite();
        ctx.install_request(
            "GET",
            "/todos/1",
            InstallOptions::new()
                .alias("todo")
                .respond(|_, res| Ok(res.json(&json!({"id": 1}))?.with_delay(200))),
        )
        .unwrap();

        let waiter = ctx.clone();
        let early = tokio::spawn(async move { waiter.wait_for_request("@todo").await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        worker.fetch(CapturedRequest::get("/todos/1")).await;

        let early = early.await.unwrap().unwrap();
        let late = ctx.wait_for_request("@todo").await.unwrap();
        assert_eq!(early, late);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_names_alias_and_key() {
        let worker = Arc::new(MockServiceWorker::new());
        let config =
            NetwaitConfig::default().with_wait(WaitOptions::new().with_timeout(500).with_poll_interval(20));
        let mut suite = InterceptionSuite::new(worker, config);
        suite.setup().unwrap();
        let ctx = suite.before_each().unwrap().clone();
        ctx.install_request("GET", "/never", InstallOptions::new().alias("never"))
            .unwrap();

        let err = ctx.wait_for_request("@never").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Timed out after 500ms waiting for @never — GET /never"
        );
    }

    #[tokio::test]
    async fn explicit_wait_options_override_config() {
        let (_worker, _suite, ctx) = suite();
        let options = WaitOptions::new().with_timeout(10).with_poll_interval(5);
        let err = ctx
            .wait_for(Category::Query, "Missing", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, NetwaitError::Timeout { ms: 10, .. }));
    }
}

mod reset_tests {
    use super::*;

    #[tokio::test]
    async fn reset_between_tests_forgets_keys() {
        let (worker, mut suite, ctx) = suite();
        let key = ctx
            .install_request("GET", "/todos/1", InstallOptions::new().alias("todo"))
            .unwrap();
        worker.fetch(CapturedRequest::get("/todos/1")).await;
        assert_eq!(ctx.get_request_calls(&key).unwrap().len(), 1);

        let next = suite.before_each().unwrap().clone();
        assert!(matches!(
            next.get_request_calls(&key),
            Err(NetwaitError::NotFound { .. })
        ));
        assert!(matches!(
            next.get_request_calls("@todo"),
            Err(NetwaitError::AliasNotFound { .. })
        ));

        suite.teardown().unwrap();
        assert!(!worker.is_active());
    }
}

mod fixture_tests {
    use super::*;

    #[tokio::test]
    async fn fixture_backed_route() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("todos.json"), r#"[{"id": 1}, {"id": 2}]"#).unwrap();

        let worker = Arc::new(MockServiceWorker::new());
        let config = NetwaitConfig::default().with_fixtures_dir(dir.path());
        let mut suite = InterceptionSuite::new(worker.clone(), config);
        suite.setup().unwrap();
        let ctx = suite.before_each().unwrap().clone();

        ctx.install_fixture_request("GET", "/todos", Some("todos"), &FixtureMock::new("todos"))
            .unwrap();
        worker.fetch(CapturedRequest::get("https://api.test/todos/")).await;

        let call = ctx.wait_for_request("@todos").await.unwrap();
        assert_eq!(
            call.response.unwrap().body,
            ResponseBody::Json(json!([{"id": 1}, {"id": 2}]))
        );
    }
}
